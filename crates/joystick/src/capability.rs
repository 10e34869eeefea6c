use joystick_bit_derive::Bit;
use joystick_bit_mask::{Bitable, Bitmask};

/// Capabilities of a button. Raw bits start at bit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Bit)]
pub enum ButtonCapability {
    /// Assigned to the left hand.
    Left,
    /// Assigned to the right hand.
    Right,
    Trigger,
    Shoulder,
    /// Pressure sensitive; reports values between logical up and down.
    Analog,
    Start,
    Select,
    /// The designated "System" or "Home" button.
    System,
    /// Confirms dialogs.
    Confirm,
    /// Cancels dialogs.
    Cancel,
    /// Proceeds to the next page.
    Forward,
    /// Returns to the previous page.
    Back,
    /// Not reachable in the current device configuration, e.g. SL/SR on a
    /// Joy-Con attached to the console.
    Inaccessible,
}

/// Capabilities of an axis. Raw bits start at bit 16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Bit)]
#[bit(offset = 16)]
pub enum AxisCapability {
    Left,
    Right,
    Analog,
}

/// Capabilities of a dpad. Raw bits start at bit 24.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Bit)]
#[bit(offset = 24)]
pub enum DpadCapability {
    Left,
    Right,
    /// Eight directions instead of four.
    EightWay,
}

/// Physical kind of a device. A device may have several types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Bit)]
pub enum DeviceType {
    Joystick,
    Gamepad,
    Wheel,
    /// The T in HOTAS.
    Throttle,
    Pedals,
    Remote,
}

/// Dpad directions, encoded from bit 1 upwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Bit)]
#[bit(offset = 1)]
pub enum DpadDirection {
    North,
    East,
    South,
    West,
    NorthEast,
    SouthEast,
    SouthWest,
    NorthWest,
}

pub type ButtonCapabilities = Bitmask<ButtonCapability>;
pub type AxisCapabilities = Bitmask<AxisCapability>;
pub type DpadCapabilities = Bitmask<DpadCapability>;
pub type DeviceTypes = Bitmask<DeviceType>;
pub type DpadState = Bitmask<DpadDirection>;

/// Directions a four-way dpad can report.
pub const CARDINAL_DIRECTIONS: DpadState = Bitmask::from_value(
    (1 << 1) | (1 << 2) | (1 << 3) | (1 << 4),
);

/// Checks a single flag in a capability set.
#[inline]
pub fn has_capability<T: Bitable>(set: Bitmask<T>, flag: T) -> bool {
    set.contains(flag)
}

/// Directions representable on a dpad with the given capabilities.
pub fn representable_directions(caps: DpadCapabilities) -> DpadState {
    if caps.contains(DpadCapability::EightWay) {
        DpadState::all()
    } else {
        CARDINAL_DIRECTIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_ranges_do_not_overlap() {
        assert_eq!(ButtonCapability::ALL & AxisCapability::ALL, 0);
        assert_eq!(ButtonCapability::ALL & DpadCapability::ALL, 0);
        assert_eq!(AxisCapability::ALL & DpadCapability::ALL, 0);
        assert_eq!(AxisCapability::Left.bit(), 1 << 16);
        assert_eq!(DpadCapability::Left.bit(), 1 << 24);
    }

    #[test]
    fn capabilities_are_additive() {
        let caps = ButtonCapabilities::new(&[
            ButtonCapability::Left,
            ButtonCapability::Trigger,
            ButtonCapability::Analog,
        ]);
        assert!(has_capability(caps, ButtonCapability::Left));
        assert!(has_capability(caps, ButtonCapability::Trigger));
        assert!(has_capability(caps, ButtonCapability::Analog));
        assert!(!has_capability(caps, ButtonCapability::Right));
    }

    #[test]
    fn undefined_raw_bits_are_never_reported() {
        let caps = AxisCapabilities::from_known(u64::MAX);
        assert_eq!(caps.count(), 3);
        let caps = AxisCapabilities::from_known(ButtonCapability::ALL);
        assert!(caps.is_empty());
    }

    #[test]
    fn dpad_direction_bits_match_wire_encoding() {
        assert_eq!(DpadDirection::North.bit(), 1 << 1);
        assert_eq!(DpadDirection::NorthWest.bit(), 1 << 8);
        assert_eq!(CARDINAL_DIRECTIONS.count(), 4);
        assert!(CARDINAL_DIRECTIONS.contains(DpadDirection::West));
        assert!(!CARDINAL_DIRECTIONS.contains(DpadDirection::NorthEast));
    }

    #[test]
    fn four_way_dpads_cannot_report_diagonals() {
        let four = representable_directions(DpadCapabilities::empty());
        let eight = representable_directions(DpadCapability::EightWay.into());
        assert!(!four.contains(DpadDirection::SouthEast));
        assert!(eight.contains(DpadDirection::SouthEast));
    }
}
