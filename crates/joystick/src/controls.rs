use crate::control::{Axis, AxisClass, AxisValue, Button, DeviceId, Dpad};
use crate::capability::{ButtonCapability, DpadState};
use crate::device::DeviceDescriptor;

/// Ordered buttons, axes, dpads and accelerometers of one device.
///
/// Indices are assigned once and stay valid for the lifetime of the device.
/// A layout change may append controls but never drops existing ones;
/// controls beyond the current layout stay addressable but inactive.
#[derive(Debug, Default)]
pub(crate) struct ControlRegistry {
    buttons: Vec<Button>,
    axes: Vec<Axis>,
    dpads: Vec<Dpad>,
    accelerometers: Vec<Axis>,
    active: ActiveCounts,
}

/// Number of controls per class present in the current layout.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ActiveCounts {
    pub(crate) buttons: usize,
    pub(crate) axes: usize,
    pub(crate) dpads: usize,
    pub(crate) accelerometers: usize,
}

impl ControlRegistry {
    pub(crate) fn build(device: DeviceId, descriptor: &DeviceDescriptor) -> Self {
        let mut registry = Self::default();
        registry.reconfigure(device, descriptor);
        registry
    }

    pub(crate) fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub(crate) fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub(crate) fn dpads(&self) -> &[Dpad] {
        &self.dpads
    }

    pub(crate) fn accelerometers(&self) -> &[Axis] {
        &self.accelerometers
    }

    pub(crate) fn active(&self) -> ActiveCounts {
        self.active
    }

    /// Apply a new layout. Controls missing from `descriptor` are reset to
    /// neutral, and buttons among them become inaccessible.
    pub(crate) fn reconfigure(&mut self, device: DeviceId, descriptor: &DeviceDescriptor) {
        let family = descriptor.family;

        for (i, button) in self.buttons.iter().enumerate() {
            match descriptor.buttons.get(i) {
                Some(desc) => button.reconfigure(desc.role, desc.capabilities),
                None => {
                    let mut caps = button.capabilities();
                    caps.insert(ButtonCapability::Inaccessible);
                    button.reconfigure(button.role(), caps);
                    button.store(0, false);
                }
            }
        }
        for (i, desc) in descriptor.buttons.iter().enumerate().skip(self.buttons.len()) {
            self.buttons
                .push(Button::new(device, family, i, desc.role, desc.capabilities));
        }

        for (i, axis) in self.axes.iter().enumerate() {
            match descriptor.axes.get(i) {
                Some(desc) => axis.reconfigure(desc.dimensions, desc.capabilities),
                None => axis.store(AxisValue::NEUTRAL),
            }
        }
        for (i, desc) in descriptor.axes.iter().enumerate().skip(self.axes.len()) {
            self.axes.push(Axis::new(
                device,
                AxisClass::Stick,
                i,
                desc.dimensions,
                desc.capabilities,
            ));
        }

        for (i, dpad) in self.dpads.iter().enumerate() {
            match descriptor.dpads.get(i) {
                Some(desc) => dpad.reconfigure(desc.capabilities),
                None => dpad.store(DpadState::empty()),
            }
        }
        for (i, desc) in descriptor.dpads.iter().enumerate().skip(self.dpads.len()) {
            self.dpads.push(Dpad::new(device, i, desc.capabilities));
        }

        for accel in self.accelerometers.iter().skip(descriptor.accelerometers) {
            accel.store(AxisValue::NEUTRAL);
        }
        for i in self.accelerometers.len()..descriptor.accelerometers {
            self.accelerometers.push(Axis::new(
                device,
                AxisClass::Accelerometer,
                i,
                3,
                Default::default(),
            ));
        }

        self.active = ActiveCounts {
            buttons: descriptor.buttons.len(),
            axes: descriptor.axes.len(),
            dpads: descriptor.dpads.len(),
            accelerometers: descriptor.accelerometers,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{AxisCapability, ButtonCapabilities, DpadCapability};
    use crate::device::{AxisDescriptor, ButtonDescriptor, DpadDescriptor};
    use crate::family::ButtonRole;

    fn descriptor(buttons: usize, axes: usize) -> DeviceDescriptor {
        let mut desc = DeviceDescriptor::new("test");
        for _ in 0..buttons {
            desc = desc.with_button(ButtonDescriptor::new(ButtonRole::Unknown, &[]));
        }
        for _ in 0..axes {
            desc = desc.with_axis(AxisDescriptor::new(2, &[AxisCapability::Analog]));
        }
        desc.with_dpad(DpadDescriptor::new(&[DpadCapability::EightWay]))
            .with_accelerometers(1)
    }

    #[test]
    fn build_assigns_sequential_indices() {
        let registry = ControlRegistry::build(1, &descriptor(3, 2));
        assert_eq!(registry.buttons().len(), 3);
        assert_eq!(registry.axes().len(), 2);
        assert_eq!(registry.dpads().len(), 1);
        assert_eq!(registry.accelerometers().len(), 1);
        for (i, button) in registry.buttons().iter().enumerate() {
            assert_eq!(button.index(), i);
        }
        assert!(registry.accelerometers()[0].is_accelerometer());
    }

    #[test]
    fn reconfigure_appends_and_keeps_existing_handles() {
        let mut registry = ControlRegistry::build(1, &descriptor(2, 1));
        let first = registry.buttons()[0].watch();
        registry.reconfigure(1, &descriptor(4, 1));
        assert_eq!(registry.buttons().len(), 4);
        assert!(first.is_alive());
        assert_eq!(registry.buttons()[3].index(), 3);
    }

    #[test]
    fn reconfigure_marks_missing_buttons_inaccessible() {
        let mut registry = ControlRegistry::build(1, &descriptor(3, 1));
        registry.buttons()[2].store(u16::MAX, true);
        registry.reconfigure(1, &descriptor(2, 1));

        let dropped = &registry.buttons()[2];
        assert_eq!(registry.buttons().len(), 3);
        assert!(dropped.has_capability(ButtonCapability::Inaccessible));
        assert_eq!(dropped.value(), 0);
        assert!(!registry.buttons()[0].has_capability(ButtonCapability::Inaccessible));
        assert_eq!(registry.buttons()[0].capabilities(), ButtonCapabilities::empty());
    }

    #[test]
    fn active_counts_follow_the_layout() {
        let mut registry = ControlRegistry::build(1, &descriptor(3, 2));
        registry.reconfigure(1, &descriptor(1, 1).with_accelerometers(0));
        let active = registry.active();
        assert_eq!((active.buttons, active.axes, active.accelerometers), (1, 1, 0));
        assert_eq!(registry.axes().len(), 2);

        registry.reconfigure(1, &descriptor(3, 2));
        assert_eq!(registry.active().axes, 2);
    }
}
