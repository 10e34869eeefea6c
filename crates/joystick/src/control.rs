use std::any::Any;
use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::capability::{
    AxisCapabilities, AxisCapability, ButtonCapabilities, ButtonCapability,
    DpadCapabilities, DpadCapability, DpadState,
};
use crate::family::{compare_roles, ButtonRole, DeviceFamily};

/// Engine-wide unique id of a device object. Never reused within a context.
pub(crate) type DeviceId = u64;

/// Value of a pressed digital button.
pub const BUTTON_VALUE_DOWN: u16 = u16::MAX;

/// Position of an axis or accelerometer. 0 is neutral on every dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct AxisValue {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl AxisValue {
    pub const NEUTRAL: AxisValue = AxisValue { x: 0, y: 0, z: 0 };

    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }
}

/// Logical state of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ButtonState {
    #[default]
    Up,
    Down,
}

impl ButtonState {
    pub fn is_down(self) -> bool {
        self == ButtonState::Down
    }
}

impl From<bool> for ButtonState {
    fn from(down: bool) -> Self {
        if down {
            ButtonState::Down
        } else {
            ButtonState::Up
        }
    }
}

/// Observes whether a refcounted object has been reclaimed, without keeping
/// it alive.
#[derive(Clone)]
pub struct Watch(Weak<dyn Any>);

impl Watch {
    pub(crate) fn new<T: Any>(rc: &Rc<T>) -> Self {
        let weak: Weak<dyn Any> = Rc::downgrade(rc) as Weak<dyn Any>;
        Self(weak)
    }

    /// True until the last strong handle is dropped.
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl fmt::Debug for Watch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watch").field("alive", &self.is_alive()).finish()
    }
}

struct ButtonInner {
    device: DeviceId,
    family: DeviceFamily,
    index: usize,
    role: Cell<ButtonRole>,
    capabilities: Cell<ButtonCapabilities>,
    value: Cell<u16>,
    down: Cell<bool>,
}

/// A physical button. Cloning acquires a reference, dropping releases it.
#[derive(Clone)]
pub struct Button(Rc<ButtonInner>);

impl Button {
    pub(crate) fn new(
        device: DeviceId,
        family: DeviceFamily,
        index: usize,
        role: ButtonRole,
        capabilities: ButtonCapabilities,
    ) -> Self {
        Self(Rc::new(ButtonInner {
            device,
            family,
            index,
            role: Cell::new(role),
            capabilities: Cell::new(capabilities),
            value: Cell::new(0),
            down: Cell::new(false),
        }))
    }

    pub fn index(&self) -> usize {
        self.0.index
    }

    pub fn role(&self) -> ButtonRole {
        self.0.role.get()
    }

    pub fn capabilities(&self) -> ButtonCapabilities {
        self.0.capabilities.get()
    }

    pub fn has_capability(&self, cap: ButtonCapability) -> bool {
        self.0.capabilities.get().contains(cap)
    }

    /// Current logical state as of the last dispatch.
    pub fn state(&self) -> ButtonState {
        self.0.down.get().into()
    }

    /// Current pressure as of the last dispatch, 0 is up and 65535 fully down.
    pub fn value(&self) -> u16 {
        self.0.value.get()
    }

    /// Compare perceived priority against another button of the same device.
    ///
    /// Returns `None` when the buttons belong to different devices.
    pub fn compare_priority(&self, other: &Button) -> Option<Ordering> {
        if self.0.device != other.0.device {
            return None;
        }
        Some(compare_roles(self.0.family, self.role(), other.role()))
    }

    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub fn watch(&self) -> Watch {
        Watch::new(&self.0)
    }

    pub(crate) fn device_id(&self) -> DeviceId {
        self.0.device
    }

    pub(crate) fn is_down(&self) -> bool {
        self.0.down.get()
    }

    pub(crate) fn store(&self, value: u16, down: bool) {
        self.0.value.set(value);
        self.0.down.set(down);
    }

    pub(crate) fn reconfigure(&self, role: ButtonRole, capabilities: ButtonCapabilities) {
        self.0.role.set(role);
        self.0.capabilities.set(capabilities);
    }
}

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("index", &self.index())
            .field("role", &self.role())
            .field("capabilities", &self.capabilities())
            .field("value", &self.value())
            .finish()
    }
}

/// What an [`Axis`] handle measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AxisClass {
    Stick,
    Accelerometer,
}

struct AxisInner {
    device: DeviceId,
    class: AxisClass,
    index: usize,
    dimensions: Cell<u8>,
    capabilities: Cell<AxisCapabilities>,
    value: Cell<AxisValue>,
}

/// An axis with up to three dimensions. Accelerometers use the same handle.
#[derive(Clone)]
pub struct Axis(Rc<AxisInner>);

impl Axis {
    pub(crate) fn new(
        device: DeviceId,
        class: AxisClass,
        index: usize,
        dimensions: u8,
        capabilities: AxisCapabilities,
    ) -> Self {
        Self(Rc::new(AxisInner {
            device,
            class,
            index,
            dimensions: Cell::new(dimensions.clamp(1, 3)),
            capabilities: Cell::new(capabilities),
            value: Cell::new(AxisValue::NEUTRAL),
        }))
    }

    pub fn index(&self) -> usize {
        self.0.index
    }

    /// Number of populated dimensions, 1 to 3.
    pub fn dimensions(&self) -> u8 {
        self.0.dimensions.get()
    }

    pub fn capabilities(&self) -> AxisCapabilities {
        self.0.capabilities.get()
    }

    pub fn has_capability(&self, cap: AxisCapability) -> bool {
        self.0.capabilities.get().contains(cap)
    }

    pub fn is_accelerometer(&self) -> bool {
        self.0.class == AxisClass::Accelerometer
    }

    /// Current position as of the last dispatch.
    pub fn value(&self) -> AxisValue {
        self.0.value.get()
    }

    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub fn watch(&self) -> Watch {
        Watch::new(&self.0)
    }

    pub(crate) fn device_id(&self) -> DeviceId {
        self.0.device
    }

    pub(crate) fn class(&self) -> AxisClass {
        self.0.class
    }

    pub(crate) fn store(&self, value: AxisValue) {
        self.0.value.set(value);
    }

    pub(crate) fn reconfigure(&self, dimensions: u8, capabilities: AxisCapabilities) {
        self.0.dimensions.set(dimensions.clamp(1, 3));
        self.0.capabilities.set(capabilities);
    }
}

impl fmt::Debug for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Axis")
            .field("index", &self.index())
            .field("class", &self.0.class)
            .field("capabilities", &self.capabilities())
            .field("value", &self.value())
            .finish()
    }
}

struct DpadInner {
    device: DeviceId,
    index: usize,
    capabilities: Cell<DpadCapabilities>,
    state: Cell<DpadState>,
}

/// A directional pad with four or eight directions.
#[derive(Clone)]
pub struct Dpad(Rc<DpadInner>);

impl Dpad {
    pub(crate) fn new(device: DeviceId, index: usize, capabilities: DpadCapabilities) -> Self {
        Self(Rc::new(DpadInner {
            device,
            index,
            capabilities: Cell::new(capabilities),
            state: Cell::new(DpadState::empty()),
        }))
    }

    pub fn index(&self) -> usize {
        self.0.index
    }

    pub fn capabilities(&self) -> DpadCapabilities {
        self.0.capabilities.get()
    }

    pub fn has_capability(&self, cap: DpadCapability) -> bool {
        self.0.capabilities.get().contains(cap)
    }

    /// Directions held as of the last dispatch.
    pub fn state(&self) -> DpadState {
        self.0.state.get()
    }

    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub fn watch(&self) -> Watch {
        Watch::new(&self.0)
    }

    pub(crate) fn device_id(&self) -> DeviceId {
        self.0.device
    }

    pub(crate) fn store(&self, state: DpadState) {
        self.0.state.set(state);
    }

    pub(crate) fn reconfigure(&self, capabilities: DpadCapabilities) {
        self.0.capabilities.set(capabilities);
    }
}

impl fmt::Debug for Dpad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dpad")
            .field("index", &self.index())
            .field("capabilities", &self.capabilities())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_button(device: DeviceId, index: usize, role: ButtonRole) -> Button {
        Button::new(device, DeviceFamily::Gamepad, index, role, ButtonCapabilities::empty())
    }

    #[test]
    fn handles_count_references() {
        let button = make_button(1, 0, ButtonRole::South);
        let watch = button.watch();
        assert_eq!(button.ref_count(), 1);

        let extra = button.clone();
        assert_eq!(button.ref_count(), 2);
        drop(button);
        assert!(watch.is_alive());
        assert_eq!(extra.ref_count(), 1);

        drop(extra);
        assert!(!watch.is_alive());
    }

    #[test]
    fn priority_is_undefined_across_devices() {
        let a = make_button(1, 0, ButtonRole::LeftTrigger);
        let b = make_button(1, 1, ButtonRole::LeftShoulder);
        let foreign = make_button(2, 1, ButtonRole::LeftShoulder);

        assert_eq!(a.compare_priority(&b), Some(Ordering::Greater));
        assert_eq!(b.compare_priority(&a), Some(Ordering::Less));
        assert_eq!(a.compare_priority(&foreign), None);
    }

    #[test]
    fn new_axis_reads_neutral() {
        let axis = Axis::new(1, AxisClass::Stick, 0, 2, AxisCapabilities::empty());
        assert_eq!(axis.value(), AxisValue::NEUTRAL);
        assert_eq!(axis.dimensions(), 2);
        assert!(!axis.is_accelerometer());
    }

    #[test]
    fn axis_dimensions_are_clamped() {
        let axis = Axis::new(1, AxisClass::Stick, 0, 9, AxisCapabilities::empty());
        assert_eq!(axis.dimensions(), 3);
        axis.reconfigure(0, AxisCapabilities::empty());
        assert_eq!(axis.dimensions(), 1);
    }
}
