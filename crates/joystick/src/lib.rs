//! Device-state and event-normalization engine for game controllers.
//!
//! A [`Context`] binds a [`Transport`] to a seat, turns the raw per-device
//! reports it delivers into a FIFO of ordered [`Event`]s, and exposes every
//! device as a refcounted [`Device`] with typed buttons, axes and dpads.
//!
//! ```no_run
//! use joystick::{Context, EventType, ScriptedTransport};
//!
//! let ctx: Context = Context::without_access();
//! let (transport, _script) = ScriptedTransport::new();
//! ctx.assign_seat("seat0", transport)?;
//!
//! while let Some(event) = ctx.get_event() {
//!     if event.event_type() == EventType::DeviceAdded {
//!         let device = event.device();
//!         println!("{} with {} buttons", device.name(), device.button_count());
//!     }
//! }
//! # Ok::<(), joystick::Error>(())
//! ```

#[macro_use]
mod logging;

mod access;
mod capability;
mod config;
mod context;
mod control;
mod controls;
mod device;
mod diff;
mod engine;
mod error;
mod event;
mod family;
mod queue;
mod registry;
mod report;
mod threshold;
mod transport;

pub use joystick_bit_mask::{Bitable, Bitmask};

pub use crate::access::{
    access_fn, DenyAccess, DeviceOpener, Errno, Fd, FnAccess, ResourceAccess,
    DEFAULT_OPEN_FLAGS, O_CLOEXEC, O_NONBLOCK, O_RDONLY, O_RDWR,
};
pub use crate::capability::{
    has_capability, representable_directions, AxisCapabilities, AxisCapability,
    ButtonCapabilities, ButtonCapability, DeviceType, DeviceTypes, DpadCapabilities,
    DpadCapability, DpadDirection, DpadState, CARDINAL_DIRECTIONS,
};
pub use crate::config::{ConfigError, EngineConfig};
pub use crate::context::Context;
pub use crate::control::{
    Axis, AxisValue, Button, ButtonState, Dpad, Watch, BUTTON_VALUE_DOWN,
};
pub use crate::device::{
    AxisDescriptor, ButtonDescriptor, Device, DeviceDescriptor, DeviceIdentity,
    DpadDescriptor, WeakDevice,
};
pub use crate::error::{Error, Result};
pub use crate::event::{Event, EventType};
pub use crate::family::{compare_roles, ButtonRole, DeviceFamily};
pub use crate::logging::setup as setup_logging;
pub use crate::report::{AxisSample, ButtonSample, Report};
pub use crate::threshold::{PressureThresholds, ThresholdTable};
#[cfg(feature = "sdl2-backend")]
pub use crate::transport::SdlTransport;
pub use crate::transport::{
    Readiness, ScriptHandle, ScriptedTransport, Transport, TransportMessage,
};
