use std::fmt;

use smallvec::SmallVec;

use crate::capability::DpadState;
use crate::control::{Axis, AxisClass, AxisValue, Button, ButtonState, Dpad};
use crate::device::Device;

/// Kind of an [`Event`].
///
/// Lifecycle events describe the device itself; the other kinds describe
/// state deltas of one control class. `Sync` closes a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    DeviceAdded,
    DeviceRemoved,
    DeviceChanged,
    Sync,
    Axis,
    Button,
    Accelerometer,
    Dpad,
}

impl EventType {
    /// Stable numeric code of the event kind.
    pub fn code(self) -> u32 {
        match self {
            EventType::DeviceAdded => 1,
            EventType::DeviceRemoved => 2,
            EventType::DeviceChanged => 3,
            EventType::Sync => 100,
            EventType::Axis => 200,
            EventType::Button => 300,
            EventType::Accelerometer => 400,
            EventType::Dpad => 500,
        }
    }

    pub fn is_lifecycle(self) -> bool {
        matches!(
            self,
            EventType::DeviceAdded | EventType::DeviceRemoved | EventType::DeviceChanged
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AxisSlot {
    pub(crate) value: AxisValue,
    pub(crate) changed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ButtonSlot {
    pub(crate) value: u16,
    pub(crate) state: ButtonState,
    pub(crate) value_changed: bool,
    pub(crate) state_changed: bool,
}

impl ButtonSlot {
    fn changed(&self) -> bool {
        self.value_changed || self.state_changed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DpadSlot {
    pub(crate) state: DpadState,
    pub(crate) changed: bool,
}

/// Values of every control of one class at the time of the event, indexed
/// like the device's controls.
#[derive(Debug, Default)]
pub(crate) enum Payload {
    #[default]
    None,
    Axes(SmallVec<[AxisSlot; 4]>),
    Buttons(SmallVec<[ButtonSlot; 16]>),
    Accelerometers(SmallVec<[AxisSlot; 1]>),
    Dpads(SmallVec<[DpadSlot; 2]>),
}

/// A discrete event popped from a context.
///
/// Events have a single owner and are released by dropping them. The device
/// handle they carry is a counted reference; clone it to keep the device
/// alive past the event.
pub struct Event {
    kind: EventType,
    device: Device,
    payload: Payload,
}

impl Event {
    pub(crate) fn lifecycle(kind: EventType, device: Device) -> Self {
        Self {
            kind,
            device,
            payload: Payload::None,
        }
    }

    pub(crate) fn sync(device: Device) -> Self {
        Self::lifecycle(EventType::Sync, device)
    }

    pub(crate) fn delta(device: Device, payload: Payload) -> Self {
        let kind = match payload {
            Payload::Axes(_) => EventType::Axis,
            Payload::Buttons(_) => EventType::Button,
            Payload::Accelerometers(_) => EventType::Accelerometer,
            Payload::Dpads(_) => EventType::Dpad,
            Payload::None => EventType::Sync,
        };
        Self {
            kind,
            device,
            payload,
        }
    }

    pub fn event_type(&self) -> EventType {
        self.kind
    }

    /// Device the event belongs to. Not an extra reference; clone it to keep it.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Release the event. Equivalent to dropping it.
    pub fn destroy(self) {}

    fn axis_slot(&self, axis: &Axis) -> Option<&AxisSlot> {
        if axis.device_id() != self.device.id() || axis.class() != AxisClass::Stick {
            return None;
        }
        match &self.payload {
            Payload::Axes(slots) => slots.get(axis.index()),
            _ => None,
        }
    }

    fn accelerometer_slot(&self, accel: &Axis) -> Option<&AxisSlot> {
        if accel.device_id() != self.device.id() || accel.class() != AxisClass::Accelerometer {
            return None;
        }
        match &self.payload {
            Payload::Accelerometers(slots) => slots.get(accel.index()),
            _ => None,
        }
    }

    fn button_slot(&self, button: &Button) -> Option<&ButtonSlot> {
        if button.device_id() != self.device.id() {
            return None;
        }
        match &self.payload {
            Payload::Buttons(slots) => slots.get(button.index()),
            _ => None,
        }
    }

    fn dpad_slot(&self, dpad: &Dpad) -> Option<&DpadSlot> {
        if dpad.device_id() != self.device.id() {
            return None;
        }
        match &self.payload {
            Payload::Dpads(slots) => slots.get(dpad.index()),
            _ => None,
        }
    }

    /// False for axes of other devices and for non-axis events.
    pub fn axis_has_changed(&self, axis: &Axis) -> bool {
        self.axis_slot(axis).is_some_and(|s| s.changed)
    }

    /// Axis position carried by this event, neutral if the axis is not part
    /// of it. Dimensions the axis lacks read 0.
    pub fn axis_value(&self, axis: &Axis) -> AxisValue {
        self.axis_slot(axis).map_or(AxisValue::NEUTRAL, |s| s.value)
    }

    pub fn button_value_has_changed(&self, button: &Button) -> bool {
        self.button_slot(button).is_some_and(|s| s.value_changed)
    }

    pub fn button_state_has_changed(&self, button: &Button) -> bool {
        self.button_slot(button).is_some_and(|s| s.state_changed)
    }

    /// Pressure carried by this event, 0 if the button is not part of it.
    pub fn button_value(&self, button: &Button) -> u16 {
        self.button_slot(button).map_or(0, |s| s.value)
    }

    pub fn button_state(&self, button: &Button) -> ButtonState {
        self.button_slot(button)
            .map_or(ButtonState::Up, |s| s.state)
    }

    pub fn accelerometer_has_changed(&self, accel: &Axis) -> bool {
        self.accelerometer_slot(accel).is_some_and(|s| s.changed)
    }

    pub fn accelerometer_value(&self, accel: &Axis) -> AxisValue {
        self.accelerometer_slot(accel)
            .map_or(AxisValue::NEUTRAL, |s| s.value)
    }

    pub fn dpad_has_changed(&self, dpad: &Dpad) -> bool {
        self.dpad_slot(dpad).is_some_and(|s| s.changed)
    }

    /// Directions held at the time of the event. Only representable
    /// directions are ever set.
    pub fn dpad_state(&self, dpad: &Dpad) -> DpadState {
        self.dpad_slot(dpad).map_or(DpadState::empty(), |s| s.state)
    }

    /// Number of controls flagged as changed in this event.
    pub fn changed_count(&self) -> usize {
        match &self.payload {
            Payload::None => 0,
            Payload::Axes(s) => s.iter().filter(|s| s.changed).count(),
            Payload::Accelerometers(s) => s.iter().filter(|s| s.changed).count(),
            Payload::Buttons(s) => s.iter().filter(|s| s.changed()).count(),
            Payload::Dpads(s) => s.iter().filter(|s| s.changed).count(),
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("type", &self.kind)
            .field("device", &self.device.identity())
            .field("changed", &self.changed_count())
            .finish()
    }
}
