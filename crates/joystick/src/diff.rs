use smallvec::{Array, SmallVec};

use crate::capability::{
    representable_directions, AxisCapability, ButtonCapability, DpadState,
};
use crate::control::{Axis, AxisValue, Button, Dpad, BUTTON_VALUE_DOWN};
use crate::device::Device;
use crate::event::{AxisSlot, ButtonSlot, DpadSlot, Payload};
use crate::report::{AxisSample, ButtonSample, Report};
use crate::threshold::PressureThresholds;

/// Delta payloads of one frame, in emission order.
pub(crate) type FrameDelta = SmallVec<[Payload; 4]>;

/// Apply one report to the device and collect the per-class deltas.
///
/// Only controls of the current layout accept samples; snapshots still cover
/// every control so event slots line up with control indices.
///
/// Samples are applied in report order; change flags compare the state at
/// the end of the frame with the state at its start, so a control that
/// moves and returns within one frame produces nothing.
pub(crate) fn diff_frame(
    device: &Device,
    report: &Report,
    thresholds: PressureThresholds,
) -> FrameDelta {
    let controls = device.controls();
    let active = controls.active();
    let mut delta = FrameDelta::new();

    let axes = &controls.axes()[..active.axes];
    if let Some(slots) = diff_axes(device, controls.axes(), axes, &report.axes, "axis") {
        delta.push(Payload::Axes(slots));
    }
    let buttons = &controls.buttons()[..active.buttons];
    if let Some(slots) =
        diff_buttons(device, controls.buttons(), buttons, &report.buttons, thresholds)
    {
        delta.push(Payload::Buttons(slots));
    }
    let accelerometers = &controls.accelerometers()[..active.accelerometers];
    if let Some(slots) = diff_axes(
        device,
        controls.accelerometers(),
        accelerometers,
        &report.accelerometers,
        "accelerometer",
    ) {
        delta.push(Payload::Accelerometers(slots));
    }
    let dpads = &controls.dpads()[..active.dpads];
    if let Some(slots) = diff_dpads(device, controls.dpads(), dpads, &report.dpads) {
        delta.push(Payload::Dpads(slots));
    }
    delta
}

/// Collapse a raw value of a digital axis to its sign.
fn collapse_digital(value: i16) -> i16 {
    match value {
        0 => 0,
        v if v < 0 => i16::MIN,
        _ => i16::MAX,
    }
}

fn merge_axis(axis: &Axis, sample: &AxisSample) -> AxisValue {
    let digital = !axis.is_accelerometer() && !axis.has_capability(AxisCapability::Analog);
    let normalize = |v: i16| if digital { collapse_digital(v) } else { v };
    let current = axis.value();
    AxisValue {
        x: sample.x.map_or(current.x, normalize),
        y: sample.y.map_or(current.y, normalize),
        z: sample.z.map_or(current.z, normalize),
    }
}

fn diff_axes<A: Array<Item = AxisSlot>>(
    device: &Device,
    axes: &[Axis],
    active: &[Axis],
    samples: &[(usize, AxisSample)],
    class: &str,
) -> Option<SmallVec<A>> {
    if samples.is_empty() {
        return None;
    }
    let before: SmallVec<[AxisValue; 4]> = axes.iter().map(Axis::value).collect();

    for (index, sample) in samples {
        let Some(axis) = active.get(*index) else {
            print_debug!("{0}: dropped {class} sample for index {index}", device.identity());
            continue;
        };
        if sample.max_dimension() > axis.dimensions() {
            print_debug!(
                "{0}: dropped {class} sample for missing dimension on index {index}",
                device.identity()
            );
            continue;
        }
        axis.store(merge_axis(axis, sample));
    }

    let mut any_changed = false;
    let slots = axes
        .iter()
        .zip(before)
        .map(|(axis, before)| {
            let value = axis.value();
            let changed = value != before;
            any_changed |= changed;
            AxisSlot { value, changed }
        })
        .collect();
    any_changed.then_some(slots)
}

fn diff_buttons(
    device: &Device,
    buttons: &[Button],
    active: &[Button],
    samples: &[(usize, ButtonSample)],
    thresholds: PressureThresholds,
) -> Option<SmallVec<[ButtonSlot; 16]>> {
    if samples.is_empty() {
        return None;
    }
    let before: SmallVec<[(u16, bool); 16]> =
        buttons.iter().map(|b| (b.value(), b.is_down())).collect();

    for (index, sample) in samples {
        let Some(button) = active.get(*index) else {
            print_debug!("{0}: dropped button sample for index {index}", device.identity());
            continue;
        };
        if button.has_capability(ButtonCapability::Inaccessible) {
            print_debug!(
                "{0}: dropped sample for inaccessible button {index}",
                device.identity()
            );
            continue;
        }
        match *sample {
            ButtonSample::Digital(down) => {
                let value = if down { BUTTON_VALUE_DOWN } else { 0 };
                button.store(value, down);
            }
            ButtonSample::Analog(value) => {
                if !button.has_capability(ButtonCapability::Analog) {
                    print_debug!(
                        "{0}: dropped pressure sample for digital button {index}",
                        device.identity()
                    );
                    continue;
                }
                let down = thresholds.next_state(button.is_down(), value);
                button.store(value, down);
            }
        }
    }

    let mut any_changed = false;
    let slots = buttons
        .iter()
        .zip(before)
        .map(|(button, (value_before, down_before))| {
            let slot = ButtonSlot {
                value: button.value(),
                state: button.state(),
                value_changed: button.value() != value_before,
                state_changed: button.is_down() != down_before,
            };
            any_changed |= slot.value_changed || slot.state_changed;
            slot
        })
        .collect();
    any_changed.then_some(slots)
}

fn diff_dpads(
    device: &Device,
    dpads: &[Dpad],
    active: &[Dpad],
    samples: &[(usize, u32)],
) -> Option<SmallVec<[DpadSlot; 2]>> {
    if samples.is_empty() {
        return None;
    }
    let before: SmallVec<[DpadState; 2]> = dpads.iter().map(Dpad::state).collect();

    for (index, raw) in samples {
        let Some(dpad) = active.get(*index) else {
            print_debug!("{0}: dropped dpad sample for index {index}", device.identity());
            continue;
        };
        let state = DpadState::from_known(u64::from(*raw))
            .intersect(representable_directions(dpad.capabilities()));
        dpad.store(state);
    }

    let mut any_changed = false;
    let slots = dpads
        .iter()
        .zip(before)
        .map(|(dpad, before)| {
            let state = dpad.state();
            let changed = state != before;
            any_changed |= changed;
            DpadSlot { state, changed }
        })
        .collect();
    any_changed.then_some(slots)
}

#[cfg(test)]
mod tests {
    use joystick_bit_mask::Bitable;

    use super::*;
    use crate::capability::{DpadCapability, DpadDirection};
    use crate::control::ButtonState;
    use crate::device::{AxisDescriptor, ButtonDescriptor, DeviceDescriptor, DpadDescriptor};
    use crate::family::ButtonRole;

    fn device() -> Device {
        Device::new(1, "pad".into(), 0, DeviceDescriptor::standard_gamepad("Pad"))
    }

    fn buttons(delta: &FrameDelta) -> &[ButtonSlot] {
        delta
            .iter()
            .find_map(|p| match p {
                Payload::Buttons(slots) => Some(slots.as_slice()),
                _ => None,
            })
            .expect("button payload")
    }

    #[test]
    fn identical_report_produces_nothing() {
        let device = device();
        let report = Report::new()
            .axis(0, AxisSample::xy(1000, -1000))
            .button(0, ButtonSample::Digital(true))
            .dpad(0, DpadDirection::North.bit() as u32);
        assert_eq!(diff_frame(&device, &report, PressureThresholds::DEFAULT).len(), 3);
        assert!(diff_frame(&device, &report, PressureThresholds::DEFAULT).is_empty());
    }

    #[test]
    fn classes_are_emitted_in_fixed_order() {
        let desc = DeviceDescriptor::standard_gamepad("Pad").with_accelerometers(1);
        let device = Device::new(1, "pad".into(), 0, desc);
        let report = Report::new()
            .dpad(0, DpadDirection::South.bit() as u32)
            .accelerometer(0, AxisSample::xyz(1, 2, 3))
            .button(1, ButtonSample::Digital(true))
            .axis(1, AxisSample::x(5));
        let delta = diff_frame(&device, &report, PressureThresholds::DEFAULT);
        let order: Vec<_> = delta
            .iter()
            .map(|p| match p {
                Payload::Axes(_) => "axis",
                Payload::Buttons(_) => "button",
                Payload::Accelerometers(_) => "accelerometer",
                Payload::Dpads(_) => "dpad",
                Payload::None => "none",
            })
            .collect();
        assert_eq!(order, ["axis", "button", "accelerometer", "dpad"]);
    }

    #[test]
    fn absent_dimensions_keep_their_value() {
        let device = device();
        let thresholds = PressureThresholds::DEFAULT;
        diff_frame(&device, &Report::new().axis(0, AxisSample::xy(10, 20)), thresholds);
        diff_frame(&device, &Report::new().axis(0, AxisSample::y(-5)), thresholds);
        assert_eq!(device.axis(0).unwrap().value(), AxisValue::new(10, -5, 0));
    }

    #[test]
    fn samples_for_missing_dimensions_are_dropped() {
        let device = device();
        let report = Report::new()
            .axis(0, AxisSample::xyz(1, 2, 3))
            .axis(1, AxisSample::x(7));
        let delta = diff_frame(&device, &report, PressureThresholds::DEFAULT);
        assert_eq!(delta.len(), 1);
        assert_eq!(device.axis(0).unwrap().value(), AxisValue::NEUTRAL);
        assert_eq!(device.axis(1).unwrap().value().x, 7);
    }

    #[test]
    fn digital_axes_collapse_to_extremes() {
        let desc = DeviceDescriptor::new("hat")
            .with_axis(AxisDescriptor::new(2, &[AxisCapability::Left]));
        let device = Device::new(1, "hat".into(), 0, desc);
        diff_frame(
            &device,
            &Report::new().axis(0, AxisSample::xy(-3, 12)),
            PressureThresholds::DEFAULT,
        );
        assert_eq!(device.axis(0).unwrap().value(), AxisValue::new(i16::MIN, i16::MAX, 0));
    }

    #[test]
    fn hysteresis_crossings() {
        let device = device();
        let thresholds = PressureThresholds::DEFAULT;
        let trigger = 6;
        let press = |value: u16| {
            let delta = diff_frame(
                &device,
                &Report::new().button(trigger, ButtonSample::Analog(value)),
                thresholds,
            );
            buttons(&delta)[trigger]
        };

        assert!(!press(32767).state_changed);
        let slot = press(32768);
        assert!(slot.state_changed);
        assert_eq!(slot.state, ButtonState::Down);
        assert!(!press(32769).state_changed);
        assert!(!press(16385).state_changed);
        assert!(!press(16384).state_changed);
        let slot = press(16383);
        assert!(slot.state_changed);
        assert_eq!(slot.state, ButtonState::Up);
    }

    #[test]
    fn pressure_for_digital_button_is_dropped() {
        let device = device();
        let report = Report::new()
            .button(0, ButtonSample::Analog(50000))
            .button(1, ButtonSample::Digital(true))
            .button(40, ButtonSample::Digital(true));
        let delta = diff_frame(&device, &report, PressureThresholds::DEFAULT);
        let slots = buttons(&delta);
        assert!(!slots[0].value_changed);
        assert!(slots[1].state_changed);
        assert_eq!(slots[1].value, BUTTON_VALUE_DOWN);
    }

    #[test]
    fn move_and_return_within_a_frame_is_not_a_change() {
        let device = device();
        let report = Report::new()
            .button(2, ButtonSample::Digital(true))
            .button(2, ButtonSample::Digital(false));
        assert!(diff_frame(&device, &report, PressureThresholds::DEFAULT).is_empty());
    }

    #[test]
    fn detached_controls_reject_samples() {
        let desc = DeviceDescriptor::new("pad")
            .with_axis(AxisDescriptor::new(2, &[AxisCapability::Analog]))
            .with_axis(AxisDescriptor::new(2, &[AxisCapability::Analog]))
            .with_dpad(DpadDescriptor::new(&[]))
            .with_dpad(DpadDescriptor::new(&[]))
            .with_accelerometers(1);
        let device = Device::new(1, "pad".into(), 0, desc);
        let reduced = DeviceDescriptor::new("pad")
            .with_axis(AxisDescriptor::new(2, &[AxisCapability::Analog]))
            .with_dpad(DpadDescriptor::new(&[]));
        assert!(device.reconfigure(reduced));

        let report = Report::new()
            .axis(1, AxisSample::xy(100, 100))
            .dpad(1, DpadDirection::North.bit() as u32)
            .accelerometer(0, AxisSample::xyz(1, 2, 3));
        assert!(diff_frame(&device, &report, PressureThresholds::DEFAULT).is_empty());
        assert_eq!(device.axis(1).unwrap().value(), AxisValue::NEUTRAL);

        let delta = diff_frame(
            &device,
            &Report::new().axis(0, AxisSample::x(5)),
            PressureThresholds::DEFAULT,
        );
        match delta.as_slice() {
            [Payload::Axes(slots)] => {
                assert_eq!(slots.len(), 2);
                assert!(slots[0].changed);
                assert!(!slots[1].changed);
            }
            other => panic!("expected one axis payload, got {other:?}"),
        }
    }

    #[test]
    fn dpad_masks_unknown_and_unrepresentable_bits() {
        let desc = DeviceDescriptor::new("dpads")
            .with_dpad(DpadDescriptor::new(&[]))
            .with_dpad(DpadDescriptor::new(&[DpadCapability::EightWay]))
            .with_button(ButtonDescriptor::new(ButtonRole::Unknown, &[]));
        let device = Device::new(1, "dpads".into(), 0, desc);
        let north = DpadDirection::North.bit() as u32;
        let north_east = DpadDirection::NorthEast.bit() as u32;
        let thresholds = PressureThresholds::DEFAULT;

        let delta = diff_frame(
            &device,
            &Report::new().dpad(0, north | north_east).dpad(1, north | north_east),
            thresholds,
        );
        assert_eq!(delta.len(), 1);
        assert_eq!(device.dpad(0).unwrap().state(), DpadState::from(DpadDirection::North));
        assert_eq!(device.dpad(1).unwrap().state().count(), 2);

        let noisy = Report::new()
            .dpad(0, north | north_east | 1 | (1 << 20))
            .dpad(1, north | north_east | (1 << 31));
        assert!(diff_frame(&device, &noisy, thresholds).is_empty());
    }
}
