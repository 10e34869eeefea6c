use ahash::AHashMap;

use crate::config::ConfigError;
use crate::family::DeviceFamily;

/// Analog-to-digital collapse thresholds for pressure-sensitive buttons.
///
/// An up button goes down once the pressure reaches `rising`; a down button
/// goes up once the pressure drops below `falling`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressureThresholds {
    rising: u16,
    falling: u16,
}

impl PressureThresholds {
    pub const DEFAULT: PressureThresholds = PressureThresholds {
        rising: 32768,
        falling: 16384,
    };

    pub fn new(rising: u16, falling: u16) -> Result<Self, ConfigError> {
        if falling == 0 || falling >= rising {
            return Err(ConfigError::InvalidThresholds { rising, falling });
        }
        Ok(Self { rising, falling })
    }

    pub fn rising(&self) -> u16 {
        self.rising
    }

    pub fn falling(&self) -> u16 {
        self.falling
    }

    /// Logical state after observing `value`, given the previous state.
    #[inline]
    pub fn next_state(&self, was_down: bool, value: u16) -> bool {
        if was_down {
            value >= self.falling
        } else {
            value >= self.rising
        }
    }

    /// Built-in thresholds of a device family.
    pub fn family_default(family: DeviceFamily) -> Self {
        match family {
            // Pedals and wheel paddles rest partially pressed more often.
            DeviceFamily::Wheel | DeviceFamily::Pedals => PressureThresholds {
                rising: 24576,
                falling: 12288,
            },
            _ => Self::DEFAULT,
        }
    }
}

impl Default for PressureThresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Per-family threshold overrides.
#[derive(Debug, Clone, Default)]
pub struct ThresholdTable {
    default: Option<PressureThresholds>,
    families: AHashMap<DeviceFamily, PressureThresholds>,
}

impl ThresholdTable {
    /// Override thresholds for every family without its own entry.
    pub fn set_default(&mut self, thresholds: PressureThresholds) {
        self.default = Some(thresholds);
    }

    pub fn set(&mut self, family: DeviceFamily, thresholds: PressureThresholds) {
        self.families.insert(family, thresholds);
    }

    pub fn get(&self, family: DeviceFamily) -> PressureThresholds {
        if let Some(thresholds) = self.families.get(&family) {
            return *thresholds;
        }
        self.default
            .unwrap_or_else(|| PressureThresholds::family_default(family))
    }
}
