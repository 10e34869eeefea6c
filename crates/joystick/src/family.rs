use std::cmp::Ordering;
use std::fmt;

/// Layout class of a device. Selects the button priority table and the
/// default pressure thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceFamily {
    #[default]
    Generic,
    Gamepad,
    FlightStick,
    Wheel,
    Throttle,
    Pedals,
    Remote,
}

impl DeviceFamily {
    pub const ALL: [DeviceFamily; 7] = [
        DeviceFamily::Generic,
        DeviceFamily::Gamepad,
        DeviceFamily::FlightStick,
        DeviceFamily::Wheel,
        DeviceFamily::Throttle,
        DeviceFamily::Pedals,
        DeviceFamily::Remote,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DeviceFamily::Generic => "generic",
            DeviceFamily::Gamepad => "gamepad",
            DeviceFamily::FlightStick => "flight_stick",
            DeviceFamily::Wheel => "wheel",
            DeviceFamily::Throttle => "throttle",
            DeviceFamily::Pedals => "pedals",
            DeviceFamily::Remote => "remote",
        }
    }

    /// Parse a family name as written in configuration files.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    fn priority_table(self) -> &'static [(ButtonRole, Rank)] {
        match self {
            DeviceFamily::Gamepad => GAMEPAD_PRIORITY,
            DeviceFamily::FlightStick => FLIGHT_STICK_PRIORITY,
            DeviceFamily::Wheel => WHEEL_PRIORITY,
            _ => &[],
        }
    }
}

impl fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Physical role of a button within its device family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ButtonRole {
    #[default]
    Unknown,
    // Gamepad face buttons
    South,
    East,
    West,
    North,
    LeftShoulder,
    RightShoulder,
    LeftTrigger,
    RightTrigger,
    Select,
    Start,
    System,
    LeftStick,
    RightStick,
    // Flight stick
    PrimaryTrigger,
    SecondaryTrigger,
    Thumb,
    // Wheel
    ShiftUp,
    ShiftDown,
    Horn,
    /// Family-specific button without a named role.
    Other(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Shoulders,
    Menu,
    Stick,
    Paddles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hand {
    Left,
    Right,
    Center,
}

/// Position of a role in its family's priority table. Roles compare only
/// within one group, and only on the same hand or against a center role.
#[derive(Debug, Clone, Copy)]
struct Rank {
    group: Group,
    hand: Hand,
    level: u8,
}

const fn rank(group: Group, hand: Hand, level: u8) -> Rank {
    Rank { group, hand, level }
}

const GAMEPAD_PRIORITY: &[(ButtonRole, Rank)] = &[
    (ButtonRole::LeftTrigger, rank(Group::Shoulders, Hand::Left, 2)),
    (ButtonRole::LeftShoulder, rank(Group::Shoulders, Hand::Left, 1)),
    (ButtonRole::RightTrigger, rank(Group::Shoulders, Hand::Right, 2)),
    (ButtonRole::RightShoulder, rank(Group::Shoulders, Hand::Right, 1)),
    (ButtonRole::System, rank(Group::Menu, Hand::Center, 2)),
    (ButtonRole::Select, rank(Group::Menu, Hand::Left, 1)),
    (ButtonRole::Start, rank(Group::Menu, Hand::Right, 1)),
];

const FLIGHT_STICK_PRIORITY: &[(ButtonRole, Rank)] = &[
    (ButtonRole::PrimaryTrigger, rank(Group::Stick, Hand::Right, 3)),
    (ButtonRole::SecondaryTrigger, rank(Group::Stick, Hand::Right, 2)),
    (ButtonRole::Thumb, rank(Group::Stick, Hand::Right, 1)),
];

const WHEEL_PRIORITY: &[(ButtonRole, Rank)] = &[
    (ButtonRole::Horn, rank(Group::Paddles, Hand::Center, 2)),
    (ButtonRole::ShiftDown, rank(Group::Paddles, Hand::Left, 1)),
    (ButtonRole::ShiftUp, rank(Group::Paddles, Hand::Right, 1)),
];

fn lookup(family: DeviceFamily, role: ButtonRole) -> Option<Rank> {
    family
        .priority_table()
        .iter()
        .find(|(r, _)| *r == role)
        .map(|(_, rank)| *rank)
}

/// Compare two button roles of the same device family.
///
/// Unrelated or unknown roles are equal.
pub fn compare_roles(family: DeviceFamily, a: ButtonRole, b: ButtonRole) -> Ordering {
    let (Some(a), Some(b)) = (lookup(family, a), lookup(family, b)) else {
        return Ordering::Equal;
    };
    if a.group != b.group {
        return Ordering::Equal;
    }
    let comparable =
        a.hand == b.hand || a.hand == Hand::Center || b.hand == Hand::Center;
    if comparable {
        a.level.cmp(&b.level)
    } else {
        Ordering::Equal
    }
}
