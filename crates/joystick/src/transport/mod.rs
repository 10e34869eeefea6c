//! Device discovery and raw input, as consumed by the engine.

mod scripted;
#[cfg(feature = "sdl2-backend")]
mod sdl;

use crossbeam_channel::Sender;

use crate::access::DeviceOpener;
use crate::device::{DeviceDescriptor, DeviceIdentity};
use crate::error::Result;
use crate::report::Report;

pub use scripted::{ScriptHandle, ScriptedTransport};
#[cfg(feature = "sdl2-backend")]
pub use sdl::SdlTransport;

/// One unit of transport output, drained by `Context::dispatch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportMessage {
    /// A device appeared.
    Added {
        identity: DeviceIdentity,
        descriptor: DeviceDescriptor,
    },
    /// A device is gone.
    Removed { identity: DeviceIdentity },
    /// The capability layout of a live device changed.
    Changed {
        identity: DeviceIdentity,
        descriptor: DeviceDescriptor,
    },
    /// Absolute state of the controls read in one hardware frame.
    Frame {
        identity: DeviceIdentity,
        report: Report,
    },
}

impl TransportMessage {
    pub fn identity(&self) -> &DeviceIdentity {
        match self {
            TransportMessage::Added { identity, .. }
            | TransportMessage::Removed { identity }
            | TransportMessage::Changed { identity, .. }
            | TransportMessage::Frame { identity, .. } => identity,
        }
    }

    pub fn is_lifecycle(&self) -> bool {
        !matches!(self, TransportMessage::Frame { .. })
    }
}

/// Wakes the context's readiness receiver. Notifications coalesce.
#[derive(Debug, Clone)]
pub struct Readiness(Sender<()>);

impl Readiness {
    pub(crate) fn new(sender: Sender<()>) -> Self {
        Self(sender)
    }

    /// Signal that data is pending. Never blocks.
    pub fn notify(&self) {
        let _ = self.0.try_send(());
    }
}

/// Source of device lifecycle and state reports.
pub trait Transport {
    /// Start discovery on a seat. Called once per context.
    fn bind_seat(
        &mut self,
        seat: &str,
        opener: &mut dyn DeviceOpener,
        readiness: Readiness,
    ) -> Result<()>;

    /// Append everything currently available to `out`. Must not block.
    fn poll(
        &mut self,
        opener: &mut dyn DeviceOpener,
        out: &mut Vec<TransportMessage>,
    ) -> Result<()>;

    /// Release every device node still open. Called when the context is dropped.
    fn shutdown(&mut self, _opener: &mut dyn DeviceOpener) {}
}
