use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::capability::{
    AxisCapabilities, AxisCapability, ButtonCapabilities, ButtonCapability,
    DeviceType, DeviceTypes, DpadCapabilities, DpadCapability,
};
use crate::control::{Axis, Button, DeviceId, Dpad, Watch};
use crate::controls::ControlRegistry;
use crate::family::{ButtonRole, DeviceFamily};

/// Transport-level identity of a physical device, e.g. a sysfs path or a
/// controller GUID. Stable across unplug and replug of the same device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceIdentity(Box<str>);

impl DeviceIdentity {
    pub fn new(id: impl Into<Box<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DeviceIdentity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DeviceIdentity {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonDescriptor {
    pub role: ButtonRole,
    pub capabilities: ButtonCapabilities,
}

impl ButtonDescriptor {
    pub fn new(role: ButtonRole, capabilities: &[ButtonCapability]) -> Self {
        Self {
            role,
            capabilities: ButtonCapabilities::new(capabilities),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisDescriptor {
    /// Populated dimensions, 1 to 3.
    pub dimensions: u8,
    pub capabilities: AxisCapabilities,
}

impl AxisDescriptor {
    pub fn new(dimensions: u8, capabilities: &[AxisCapability]) -> Self {
        Self {
            dimensions,
            capabilities: AxisCapabilities::new(capabilities),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DpadDescriptor {
    pub capabilities: DpadCapabilities,
}

impl DpadDescriptor {
    pub fn new(capabilities: &[DpadCapability]) -> Self {
        Self {
            capabilities: DpadCapabilities::new(capabilities),
        }
    }
}

/// Capability layout of a device as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceDescriptor {
    pub name: String,
    pub types: DeviceTypes,
    pub family: DeviceFamily,
    pub buttons: Vec<ButtonDescriptor>,
    pub axes: Vec<AxisDescriptor>,
    pub dpads: Vec<DpadDescriptor>,
    pub accelerometers: usize,
}

impl DeviceDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, device_type: DeviceType) -> Self {
        self.types.insert(device_type);
        self
    }

    pub fn with_family(mut self, family: DeviceFamily) -> Self {
        self.family = family;
        self
    }

    pub fn with_button(mut self, button: ButtonDescriptor) -> Self {
        self.buttons.push(button);
        self
    }

    pub fn with_axis(mut self, axis: AxisDescriptor) -> Self {
        self.axes.push(axis);
        self
    }

    pub fn with_dpad(mut self, dpad: DpadDescriptor) -> Self {
        self.dpads.push(dpad);
        self
    }

    pub fn with_accelerometers(mut self, count: usize) -> Self {
        self.accelerometers = count;
        self
    }

    /// Layout of a standard dual-stick gamepad.
    ///
    /// Axes: left stick, right stick. Buttons: south, east, west, north,
    /// left/right shoulder, left/right analog trigger, select, start, system,
    /// left/right stick click. One four-way dpad.
    pub fn standard_gamepad(name: impl Into<String>) -> Self {
        use crate::capability::ButtonCapability as B;

        Self::new(name)
            .with_type(DeviceType::Gamepad)
            .with_family(DeviceFamily::Gamepad)
            .with_axis(AxisDescriptor::new(2, &[AxisCapability::Left, AxisCapability::Analog]))
            .with_axis(AxisDescriptor::new(2, &[AxisCapability::Right, AxisCapability::Analog]))
            .with_button(ButtonDescriptor::new(ButtonRole::South, &[B::Right, B::Confirm]))
            .with_button(ButtonDescriptor::new(ButtonRole::East, &[B::Right, B::Cancel]))
            .with_button(ButtonDescriptor::new(ButtonRole::West, &[B::Right]))
            .with_button(ButtonDescriptor::new(ButtonRole::North, &[B::Right]))
            .with_button(ButtonDescriptor::new(
                ButtonRole::LeftShoulder,
                &[B::Left, B::Shoulder, B::Back],
            ))
            .with_button(ButtonDescriptor::new(
                ButtonRole::RightShoulder,
                &[B::Right, B::Shoulder, B::Forward],
            ))
            .with_button(ButtonDescriptor::new(
                ButtonRole::LeftTrigger,
                &[B::Left, B::Trigger, B::Analog],
            ))
            .with_button(ButtonDescriptor::new(
                ButtonRole::RightTrigger,
                &[B::Right, B::Trigger, B::Analog],
            ))
            .with_button(ButtonDescriptor::new(ButtonRole::Select, &[B::Left, B::Select]))
            .with_button(ButtonDescriptor::new(ButtonRole::Start, &[B::Right, B::Start]))
            .with_button(ButtonDescriptor::new(ButtonRole::System, &[B::System]))
            .with_button(ButtonDescriptor::new(ButtonRole::LeftStick, &[B::Left]))
            .with_button(ButtonDescriptor::new(ButtonRole::RightStick, &[B::Right]))
            .with_dpad(DpadDescriptor::new(&[DpadCapability::Left]))
    }
}

pub(crate) struct DeviceInner {
    id: DeviceId,
    identity: DeviceIdentity,
    name: Box<str>,
    user_index: u32,
    family: DeviceFamily,
    types: Cell<DeviceTypes>,
    descriptor: RefCell<DeviceDescriptor>,
    controls: RefCell<ControlRegistry>,
    removed: Cell<bool>,
}

/// A device owned by a context. Cloning acquires a reference, dropping
/// releases it; the device outlives its removal while referenced.
#[derive(Clone)]
pub struct Device(Rc<DeviceInner>);

impl Device {
    pub(crate) fn new(
        id: DeviceId,
        identity: DeviceIdentity,
        user_index: u32,
        descriptor: DeviceDescriptor,
    ) -> Self {
        let controls = ControlRegistry::build(id, &descriptor);
        Self(Rc::new(DeviceInner {
            id,
            identity,
            name: descriptor.name.as_str().into(),
            user_index,
            family: descriptor.family,
            types: Cell::new(descriptor.types),
            descriptor: RefCell::new(descriptor),
            controls: RefCell::new(controls),
            removed: Cell::new(false),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.0.identity
    }

    /// Small integer identifying this device within its context.
    pub fn user_index(&self) -> u32 {
        self.0.user_index
    }

    pub fn family(&self) -> DeviceFamily {
        self.0.family
    }

    pub fn types(&self) -> DeviceTypes {
        self.0.types.get()
    }

    /// A device may have several types; check the most specific one first.
    pub fn has_type(&self, device_type: DeviceType) -> bool {
        self.0.types.get().contains(device_type)
    }

    pub fn button_count(&self) -> usize {
        self.controls().buttons().len()
    }

    pub fn axis_count(&self) -> usize {
        self.controls().axes().len()
    }

    pub fn dpad_count(&self) -> usize {
        self.controls().dpads().len()
    }

    pub fn accelerometer_count(&self) -> usize {
        self.controls().accelerometers().len()
    }

    /// Button at a 0-based index, `None` if out of range.
    pub fn button(&self, index: usize) -> Option<Button> {
        self.controls().buttons().get(index).cloned()
    }

    pub fn axis(&self, index: usize) -> Option<Axis> {
        self.controls().axes().get(index).cloned()
    }

    pub fn dpad(&self, index: usize) -> Option<Dpad> {
        self.controls().dpads().get(index).cloned()
    }

    pub fn accelerometer(&self, index: usize) -> Option<Axis> {
        self.controls().accelerometers().get(index).cloned()
    }

    pub fn buttons(&self) -> Vec<Button> {
        self.controls().buttons().to_vec()
    }

    pub fn axes(&self) -> Vec<Axis> {
        self.controls().axes().to_vec()
    }

    pub fn dpads(&self) -> Vec<Dpad> {
        self.controls().dpads().to_vec()
    }

    /// True once the transport reported the device gone.
    pub fn is_removed(&self) -> bool {
        self.0.removed.get()
    }

    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub fn watch(&self) -> Watch {
        Watch::new(&self.0)
    }

    pub fn downgrade(&self) -> WeakDevice {
        WeakDevice(Rc::downgrade(&self.0))
    }

    pub(crate) fn id(&self) -> DeviceId {
        self.0.id
    }

    pub(crate) fn controls(&self) -> Ref<'_, ControlRegistry> {
        self.0.controls.borrow()
    }

    pub(crate) fn mark_removed(&self) {
        self.0.removed.set(true);
    }

    /// Apply a new layout. Returns false if nothing changed.
    ///
    /// Name and family are fixed at creation; changes to them are ignored.
    pub(crate) fn reconfigure(&self, mut descriptor: DeviceDescriptor) -> bool {
        if descriptor.family != self.0.family {
            print_debug!(
                "family change ignored - {0} {1} -> {2}",
                self.0.identity,
                self.0.family,
                descriptor.family
            );
            descriptor.family = self.0.family;
        }
        if descriptor.name != *self.0.name {
            print_debug!(
                "name change ignored - {0} {1:?}",
                self.0.identity,
                descriptor.name
            );
            descriptor.name = self.0.name.to_string();
        }
        if *self.0.descriptor.borrow() == descriptor {
            return false;
        }
        self.0
            .controls
            .borrow_mut()
            .reconfigure(self.0.id, &descriptor);
        self.0.types.set(descriptor.types);
        *self.0.descriptor.borrow_mut() = descriptor;
        true
    }
}

impl PartialEq for Device {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Device {}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("identity", &self.0.identity)
            .field("name", &self.0.name)
            .field("user_index", &self.0.user_index)
            .field("types", &self.types())
            .field("removed", &self.is_removed())
            .finish()
    }
}

/// Non-owning device reference.
#[derive(Clone)]
pub struct WeakDevice(Weak<DeviceInner>);

impl WeakDevice {
    pub fn upgrade(&self) -> Option<Device> {
        self.0.upgrade().map(Device)
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl fmt::Debug for WeakDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakDevice")
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_gamepad_layout() {
        let device = Device::new(
            1,
            "pad0".into(),
            0,
            DeviceDescriptor::standard_gamepad("Pad"),
        );
        assert_eq!(device.axis_count(), 2);
        assert_eq!(device.button_count(), 13);
        assert_eq!(device.dpad_count(), 1);
        assert!(device.has_type(DeviceType::Gamepad));
        assert!(!device.has_type(DeviceType::Wheel));

        let trigger = device.button(6).expect("left trigger");
        assert!(trigger.has_capability(ButtonCapability::Analog));
        assert!(trigger.has_capability(ButtonCapability::Trigger));
        assert!(device.button(13).is_none());
        assert!(device.axis(2).is_none());
    }

    #[test]
    fn device_types_are_not_exclusive() {
        let desc = DeviceDescriptor::new("Wheel pad")
            .with_type(DeviceType::Gamepad)
            .with_type(DeviceType::Wheel);
        let device = Device::new(1, "wheel".into(), 3, desc);
        assert!(device.has_type(DeviceType::Gamepad));
        assert!(device.has_type(DeviceType::Wheel));
        assert_eq!(device.user_index(), 3);
    }

    #[test]
    fn device_outlives_weak_references_only_while_held() {
        let device = Device::new(1, "pad0".into(), 0, DeviceDescriptor::standard_gamepad("Pad"));
        let weak = device.downgrade();
        let button_watch = device.button(0).map(|b| b.watch()).unwrap();
        assert!(weak.upgrade().is_some());

        drop(device);
        assert!(weak.upgrade().is_none());
        assert!(!button_watch.is_alive());
    }

    #[test]
    fn reconfigure_detects_identical_layout() {
        let desc = DeviceDescriptor::standard_gamepad("Pad");
        let device = Device::new(1, "pad0".into(), 0, desc.clone());
        assert!(!device.reconfigure(desc.clone()));

        let extended = desc.with_type(DeviceType::Remote).with_accelerometers(1);
        assert!(device.reconfigure(extended));
        assert!(device.has_type(DeviceType::Remote));
        assert_eq!(device.accelerometer_count(), 1);
    }

    #[test]
    fn reconfigure_ignores_name_changes() {
        let desc = DeviceDescriptor::standard_gamepad("Pad");
        let device = Device::new(1, "pad0".into(), 0, desc.clone());
        let mut renamed = desc;
        renamed.name = "Pad (wireless)".to_owned();
        assert!(!device.reconfigure(renamed));
        assert_eq!(device.name(), "Pad");
    }
}
