use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use ahash::AHashMap;

use crate::access::{DeviceOpener, Fd, DEFAULT_OPEN_FLAGS};
use crate::device::{DeviceDescriptor, DeviceIdentity};
use crate::error::{Error, Result};
use crate::report::Report;
use crate::transport::{Readiness, Transport, TransportMessage};

#[derive(Debug, Default)]
struct Script {
    pending: VecDeque<TransportMessage>,
    nodes: AHashMap<DeviceIdentity, String>,
    open: AHashMap<DeviceIdentity, Fd>,
    readiness: Option<Readiness>,
    seat: Option<String>,
}

impl Script {
    fn push(&mut self, message: TransportMessage) {
        self.pending.push_back(message);
        if let Some(readiness) = &self.readiness {
            readiness.notify();
        }
    }

    fn open_node(
        &mut self,
        identity: &DeviceIdentity,
        opener: &mut dyn DeviceOpener,
    ) -> Result<()> {
        if self.open.contains_key(identity) {
            return Ok(());
        }
        let Some(path) = self.nodes.get(identity) else {
            return Ok(());
        };
        match opener.open(path, DEFAULT_OPEN_FLAGS) {
            Ok(fd) => {
                self.open.insert(identity.clone(), fd);
                Ok(())
            }
            Err(errno) => Err(Error::Open {
                path: path.clone(),
                errno,
            }),
        }
    }

    fn close_node(&mut self, identity: &DeviceIdentity, opener: &mut dyn DeviceOpener) {
        if let Some(fd) = self.open.remove(identity) {
            opener.close(fd);
        }
    }
}

/// In-memory transport fed through a [`ScriptHandle`].
///
/// Replays recorded input and drives tests. Devices registered with a node
/// path are opened through the context's resource-access callbacks.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Rc<RefCell<Script>>,
}

/// Feeds messages into a [`ScriptedTransport`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ScriptHandle {
    script: Rc<RefCell<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> (Self, ScriptHandle) {
        let transport = Self::default();
        let handle = ScriptHandle {
            script: transport.script.clone(),
        };
        (transport, handle)
    }
}

impl ScriptHandle {
    pub fn add_device(&self, identity: impl Into<DeviceIdentity>, descriptor: DeviceDescriptor) {
        self.script.borrow_mut().push(TransportMessage::Added {
            identity: identity.into(),
            descriptor,
        });
    }

    /// Announce a device backed by a node that must be opened first.
    pub fn add_device_node(
        &self,
        identity: impl Into<DeviceIdentity>,
        path: impl Into<String>,
        descriptor: DeviceDescriptor,
    ) {
        let identity = identity.into();
        let mut script = self.script.borrow_mut();
        script.nodes.insert(identity.clone(), path.into());
        script.push(TransportMessage::Added {
            identity,
            descriptor,
        });
    }

    pub fn remove_device(&self, identity: impl Into<DeviceIdentity>) {
        self.script.borrow_mut().push(TransportMessage::Removed {
            identity: identity.into(),
        });
    }

    pub fn change_device(&self, identity: impl Into<DeviceIdentity>, descriptor: DeviceDescriptor) {
        self.script.borrow_mut().push(TransportMessage::Changed {
            identity: identity.into(),
            descriptor,
        });
    }

    pub fn frame(&self, identity: impl Into<DeviceIdentity>, report: Report) {
        self.script.borrow_mut().push(TransportMessage::Frame {
            identity: identity.into(),
            report,
        });
    }

    /// Seat the transport was bound to, if any.
    pub fn seat(&self) -> Option<String> {
        self.script.borrow().seat.clone()
    }

    /// Descriptors currently held open through the resource-access callbacks.
    pub fn open_count(&self) -> usize {
        self.script.borrow().open.len()
    }

    pub fn pending(&self) -> usize {
        self.script.borrow().pending.len()
    }
}

impl Transport for ScriptedTransport {
    fn bind_seat(
        &mut self,
        seat: &str,
        opener: &mut dyn DeviceOpener,
        readiness: Readiness,
    ) -> Result<()> {
        let mut script = self.script.borrow_mut();
        let announced: Vec<DeviceIdentity> = script
            .pending
            .iter()
            .filter(|m| matches!(m, TransportMessage::Added { .. }))
            .map(|m| m.identity().clone())
            .collect();
        for identity in &announced {
            if let Err(err) = script.open_node(identity, opener) {
                for opened in &announced {
                    script.close_node(opened, opener);
                }
                return Err(err);
            }
        }
        if !script.pending.is_empty() {
            readiness.notify();
        }
        script.readiness = Some(readiness);
        script.seat = Some(seat.to_owned());
        Ok(())
    }

    fn poll(
        &mut self,
        opener: &mut dyn DeviceOpener,
        out: &mut Vec<TransportMessage>,
    ) -> Result<()> {
        let mut script = self.script.borrow_mut();
        while let Some(message) = script.pending.pop_front() {
            match &message {
                TransportMessage::Added { identity, .. } => {
                    if let Err(err) = script.open_node(identity, opener) {
                        print_warning!("skipping device {identity}: {err}");
                        continue;
                    }
                }
                TransportMessage::Removed { identity } => script.close_node(identity, opener),
                _ => {}
            }
            out.push(message);
        }
        Ok(())
    }

    fn shutdown(&mut self, opener: &mut dyn DeviceOpener) {
        let mut script = self.script.borrow_mut();
        let open: Vec<DeviceIdentity> = script.open.keys().cloned().collect();
        for identity in &open {
            script.close_node(identity, opener);
        }
        script.readiness = None;
    }
}
