use ahash::AHashMap;
use sdl2::controller::{Axis as SdlAxis, Button as SdlButton, GameController};
use sdl2::event::Event as SdlEvent;
use sdl2::joystick::{HatState, Joystick};
use sdl2::{EventPump, GameControllerSubsystem, JoystickSubsystem, Sdl};

use crate::access::DeviceOpener;
use crate::capability::{AxisCapability, DeviceType, DpadCapability, DpadDirection};
use crate::device::{
    AxisDescriptor, ButtonDescriptor, DeviceDescriptor, DeviceIdentity, DpadDescriptor,
};
use crate::error::{Error, Result};
use crate::family::ButtonRole;
use crate::report::{AxisSample, ButtonSample, Report};
use crate::transport::{Readiness, Transport, TransportMessage};

use joystick_bit_mask::Bitable;

/// Buttons of the standard gamepad layout, in descriptor order.
const GAMEPAD_BUTTONS: [Option<SdlButton>; 13] = [
    Some(SdlButton::A),
    Some(SdlButton::B),
    Some(SdlButton::X),
    Some(SdlButton::Y),
    Some(SdlButton::LeftShoulder),
    Some(SdlButton::RightShoulder),
    None,
    None,
    Some(SdlButton::Back),
    Some(SdlButton::Start),
    Some(SdlButton::Guide),
    Some(SdlButton::LeftStick),
    Some(SdlButton::RightStick),
];

const LEFT_TRIGGER: usize = 6;
const RIGHT_TRIGGER: usize = 7;

enum Handle {
    Controller(GameController),
    Joystick(Joystick),
}

struct Attached {
    identity: DeviceIdentity,
    handle: Handle,
}

/// SDL2-backed discovery of joysticks and game controllers.
///
/// SDL opens devices itself, so the resource-access callbacks are not used.
/// SDL has no wakeup descriptor either: readiness fires once at bind, after
/// that the caller dispatches on its own cadence.
pub struct SdlTransport {
    joystick: JoystickSubsystem,
    controller: GameControllerSubsystem,
    event_pump: EventPump,
    attached: AHashMap<u32, Attached>,
    _sdl: Sdl,
}

impl SdlTransport {
    pub fn new() -> Result<Self> {
        let sdl = sdl2::init().map_err(Error::Transport)?;
        let joystick = sdl.joystick().map_err(Error::Transport)?;
        let controller = sdl.game_controller().map_err(Error::Transport)?;
        let event_pump = sdl.event_pump().map_err(Error::Transport)?;
        Ok(Self {
            joystick,
            controller,
            event_pump,
            attached: AHashMap::new(),
            _sdl: sdl,
        })
    }

    /// Identity from the device GUID, suffixed to tell identical devices apart.
    fn identity_for(&self, guid: &str) -> DeviceIdentity {
        let mut slot = 0;
        loop {
            let candidate = format!("sdl:{guid}#{slot}");
            if !self
                .attached
                .values()
                .any(|a| a.identity.as_str() == candidate)
            {
                return DeviceIdentity::new(candidate);
            }
            slot += 1;
        }
    }

    fn attach(&mut self, device_index: u32, out: &mut Vec<TransportMessage>) {
        let guid = match self.joystick.device_guid(device_index) {
            Ok(guid) => guid.string(),
            Err(err) => {
                print_warning!("sdl device {device_index}: {err}");
                return;
            }
        };
        let identity = self.identity_for(&guid);

        let (instance, handle, descriptor) = if self.controller.is_game_controller(device_index) {
            match self.controller.open(device_index) {
                Ok(pad) => {
                    let descriptor = DeviceDescriptor::standard_gamepad(pad.name());
                    (pad.instance_id(), Handle::Controller(pad), descriptor)
                }
                Err(err) => {
                    print_warning!("sdl controller {device_index}: {err}");
                    return;
                }
            }
        } else {
            match self.joystick.open(device_index) {
                Ok(stick) => {
                    let descriptor = joystick_descriptor(&stick);
                    (stick.instance_id(), Handle::Joystick(stick), descriptor)
                }
                Err(err) => {
                    print_warning!("sdl joystick {device_index}: {err}");
                    return;
                }
            }
        };

        print_info!("attached {0} as {identity}", descriptor.name);
        self.attached.insert(
            instance,
            Attached {
                identity: identity.clone(),
                handle,
            },
        );
        out.push(TransportMessage::Added {
            identity,
            descriptor,
        });
    }

    fn detach(&mut self, instance: u32, out: &mut Vec<TransportMessage>) {
        if let Some(attached) = self.attached.remove(&instance) {
            print_info!("detached {0}", attached.identity);
            out.push(TransportMessage::Removed {
                identity: attached.identity,
            });
        }
    }
}

fn joystick_descriptor(stick: &Joystick) -> DeviceDescriptor {
    let mut descriptor = DeviceDescriptor::new(stick.name()).with_type(DeviceType::Joystick);
    let axes = stick.num_axes();
    for pair in 0..axes.div_ceil(2) {
        let dimensions = if pair * 2 + 1 < axes { 2 } else { 1 };
        descriptor =
            descriptor.with_axis(AxisDescriptor::new(dimensions, &[AxisCapability::Analog]));
    }
    for _ in 0..stick.num_buttons() {
        descriptor = descriptor.with_button(ButtonDescriptor::new(ButtonRole::Unknown, &[]));
    }
    for _ in 0..stick.num_hats() {
        descriptor = descriptor.with_dpad(DpadDescriptor::new(&[DpadCapability::EightWay]));
    }
    descriptor
}

fn hat_directions(state: HatState) -> u32 {
    let directions: &[DpadDirection] = match state {
        HatState::Centered => &[],
        HatState::Up => &[DpadDirection::North],
        HatState::Right => &[DpadDirection::East],
        HatState::Down => &[DpadDirection::South],
        HatState::Left => &[DpadDirection::West],
        HatState::RightUp => &[DpadDirection::NorthEast],
        HatState::RightDown => &[DpadDirection::SouthEast],
        HatState::LeftUp => &[DpadDirection::NorthWest],
        HatState::LeftDown => &[DpadDirection::SouthWest],
    };
    directions.iter().fold(0, |bits, d| bits | d.bit() as u32)
}

/// Scale a trigger axis, 0 to 32767, to button pressure.
fn trigger_pressure(value: i16) -> u16 {
    let value = u32::from(value.max(0).unsigned_abs());
    (value * u32::from(u16::MAX) / i16::MAX as u32) as u16
}

fn controller_report(pad: &GameController) -> Report {
    let mut report = Report::new()
        .axis(0, AxisSample::xy(pad.axis(SdlAxis::LeftX), pad.axis(SdlAxis::LeftY)))
        .axis(1, AxisSample::xy(pad.axis(SdlAxis::RightX), pad.axis(SdlAxis::RightY)));
    for (index, button) in GAMEPAD_BUTTONS.iter().enumerate() {
        if let Some(button) = button {
            report.push_button(index, ButtonSample::Digital(pad.button(*button)));
        }
    }
    report.push_button(
        LEFT_TRIGGER,
        ButtonSample::Analog(trigger_pressure(pad.axis(SdlAxis::TriggerLeft))),
    );
    report.push_button(
        RIGHT_TRIGGER,
        ButtonSample::Analog(trigger_pressure(pad.axis(SdlAxis::TriggerRight))),
    );

    let mut dpad = 0;
    for (button, direction) in [
        (SdlButton::DPadUp, DpadDirection::North),
        (SdlButton::DPadRight, DpadDirection::East),
        (SdlButton::DPadDown, DpadDirection::South),
        (SdlButton::DPadLeft, DpadDirection::West),
    ] {
        if pad.button(button) {
            dpad |= direction.bit() as u32;
        }
    }
    report.dpad(0, dpad)
}

fn joystick_report(stick: &Joystick) -> Report {
    let mut report = Report::new();
    let axes = stick.num_axes();
    for pair in 0..axes.div_ceil(2) {
        let x = stick.axis(pair * 2).unwrap_or(0);
        let sample = match stick.axis(pair * 2 + 1) {
            Ok(y) if pair * 2 + 1 < axes => AxisSample::xy(x, y),
            _ => AxisSample::x(x),
        };
        report.push_axis(pair as usize, sample);
    }
    for index in 0..stick.num_buttons() {
        if let Ok(down) = stick.button(index) {
            report.push_button(index as usize, ButtonSample::Digital(down));
        }
    }
    for index in 0..stick.num_hats() {
        if let Ok(state) = stick.hat(index) {
            report.push_dpad(index as usize, hat_directions(state));
        }
    }
    report
}

impl Transport for SdlTransport {
    fn bind_seat(
        &mut self,
        seat: &str,
        _opener: &mut dyn DeviceOpener,
        readiness: Readiness,
    ) -> Result<()> {
        print_debug!("sdl transport ignores seat {seat}");
        readiness.notify();
        Ok(())
    }

    fn poll(
        &mut self,
        _opener: &mut dyn DeviceOpener,
        out: &mut Vec<TransportMessage>,
    ) -> Result<()> {
        let events: Vec<SdlEvent> = self.event_pump.poll_iter().collect();
        for event in events {
            match event {
                SdlEvent::JoyDeviceAdded { which, .. } => self.attach(which, out),
                SdlEvent::JoyDeviceRemoved { which, .. } => self.detach(which, out),
                _ => {}
            }
        }

        for attached in self.attached.values() {
            let report = match &attached.handle {
                Handle::Controller(pad) => controller_report(pad),
                Handle::Joystick(stick) => joystick_report(stick),
            };
            out.push(TransportMessage::Frame {
                identity: attached.identity.clone(),
                report,
            });
        }
        Ok(())
    }
}
