use smallvec::SmallVec;

/// Reported position of an axis. `None` dimensions were not part of the
/// report and keep their previous value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisSample {
    pub x: Option<i16>,
    pub y: Option<i16>,
    pub z: Option<i16>,
}

impl AxisSample {
    pub fn x(x: i16) -> Self {
        Self {
            x: Some(x),
            ..Self::default()
        }
    }

    pub fn y(y: i16) -> Self {
        Self {
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn xy(x: i16, y: i16) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: None,
        }
    }

    pub fn xyz(x: i16, y: i16, z: i16) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }

    /// Highest dimension present in the sample, 0 if empty.
    pub(crate) fn max_dimension(&self) -> u8 {
        if self.z.is_some() {
            3
        } else if self.y.is_some() {
            2
        } else if self.x.is_some() {
            1
        } else {
            0
        }
    }
}

/// Reported state of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonSample {
    /// Logical down (`true`) or up.
    Digital(bool),
    /// Pressure, 0 to 65535. Only valid for analog buttons.
    Analog(u16),
}

/// One logical hardware frame of a device: the absolute state of every
/// control the transport read in that frame, keyed by control index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub(crate) axes: SmallVec<[(usize, AxisSample); 4]>,
    pub(crate) buttons: SmallVec<[(usize, ButtonSample); 16]>,
    pub(crate) accelerometers: SmallVec<[(usize, AxisSample); 1]>,
    pub(crate) dpads: SmallVec<[(usize, u32); 2]>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axis(mut self, index: usize, sample: AxisSample) -> Self {
        self.axes.push((index, sample));
        self
    }

    pub fn button(mut self, index: usize, sample: ButtonSample) -> Self {
        self.buttons.push((index, sample));
        self
    }

    pub fn accelerometer(mut self, index: usize, sample: AxisSample) -> Self {
        self.accelerometers.push((index, sample));
        self
    }

    /// Raw direction bits, see [`DpadDirection`](crate::DpadDirection).
    pub fn dpad(mut self, index: usize, directions: u32) -> Self {
        self.dpads.push((index, directions));
        self
    }

    pub fn push_axis(&mut self, index: usize, sample: AxisSample) {
        self.axes.push((index, sample));
    }

    pub fn push_button(&mut self, index: usize, sample: ButtonSample) {
        self.buttons.push((index, sample));
    }

    pub fn push_accelerometer(&mut self, index: usize, sample: AxisSample) {
        self.accelerometers.push((index, sample));
    }

    pub fn push_dpad(&mut self, index: usize, directions: u32) {
        self.dpads.push((index, directions));
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
            && self.buttons.is_empty()
            && self.accelerometers.is_empty()
            && self.dpads.is_empty()
    }
}
