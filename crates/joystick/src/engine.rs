use ahash::AHashMap;

use crate::config::EngineConfig;
use crate::device::{Device, DeviceDescriptor, DeviceIdentity};
use crate::diff::diff_frame;
use crate::event::{Event, EventType};
use crate::queue::EventQueue;
use crate::registry::DeviceRegistry;
use crate::report::Report;
use crate::transport::TransportMessage;

/// Messages of one identity within a dispatch.
#[derive(Default)]
struct Batch {
    lifecycle: Vec<TransportMessage>,
    frames: Vec<Report>,
}

/// Device registry, diffing and event queue of one context.
#[derive(Debug, Default)]
pub(crate) struct Engine {
    pub(crate) registry: DeviceRegistry,
    pub(crate) queue: EventQueue,
    pub(crate) config: EngineConfig,
}

impl Engine {
    pub(crate) fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Turn one drain of transport output into queued events.
    ///
    /// Messages are grouped per identity, in the order identities first
    /// appear. For each identity, lifecycle messages are applied first, then
    /// the frames that arrived after the last of them, against the resulting
    /// device.
    pub(crate) fn process(&mut self, messages: Vec<TransportMessage>) {
        let mut order: Vec<DeviceIdentity> = Vec::new();
        let mut batches: AHashMap<DeviceIdentity, Batch> = AHashMap::new();
        for message in messages {
            let identity = message.identity().clone();
            let batch = batches.entry(identity.clone()).or_insert_with(|| {
                order.push(identity);
                Batch::default()
            });
            match message {
                TransportMessage::Frame { report, .. } => batch.frames.push(report),
                lifecycle => {
                    // Earlier frames belong to the previous device or layout.
                    if !batch.frames.is_empty() {
                        print_debug!(
                            "dropped {0} frames preceding a lifecycle change of {1}",
                            batch.frames.len(),
                            lifecycle.identity()
                        );
                        batch.frames.clear();
                    }
                    batch.lifecycle.push(lifecycle);
                }
            }
        }

        for identity in order {
            if let Some(batch) = batches.remove(&identity) {
                self.process_batch(&identity, batch);
            }
        }
    }

    fn process_batch(&mut self, identity: &DeviceIdentity, batch: Batch) {
        let mut last_lifecycle: Option<Device> = None;
        for message in batch.lifecycle {
            if let Some(device) = self.apply_lifecycle(message) {
                last_lifecycle = Some(device);
            }
        }

        let mut synced = false;
        if !batch.frames.is_empty() {
            match self.registry.get(identity).cloned() {
                Some(device) => {
                    let thresholds = self.config.thresholds_for(device.family());
                    for report in &batch.frames {
                        let delta = diff_frame(&device, report, thresholds);
                        if delta.is_empty() {
                            continue;
                        }
                        for payload in delta {
                            self.queue.push(Event::delta(device.clone(), payload));
                        }
                        self.queue.push(Event::sync(device.clone()));
                        synced = true;
                    }
                }
                None => print_debug!(
                    "dropped {0} frames for unknown device {identity}",
                    batch.frames.len()
                ),
            }
        }

        if !synced {
            if let Some(device) = last_lifecycle {
                self.queue.push(Event::sync(device));
            }
        }
    }

    /// Apply a lifecycle message, returning the device it was queued for.
    fn apply_lifecycle(&mut self, message: TransportMessage) -> Option<Device> {
        match message {
            TransportMessage::Added {
                identity,
                descriptor,
            } => {
                if let Some(device) = self.registry.get(&identity).cloned() {
                    print_debug!("{identity} added twice, treating as change");
                    return self.change(device, descriptor);
                }
                let device = self.registry.add(identity, descriptor);
                print_info!(
                    "device added - {0} ({1}) as index {2}",
                    device.name(),
                    device.identity(),
                    device.user_index()
                );
                self.queue
                    .push(Event::lifecycle(EventType::DeviceAdded, device.clone()));
                Some(device)
            }
            TransportMessage::Removed { identity } => {
                let Some(device) = self.registry.remove(&identity) else {
                    print_debug!("removal of unknown device {identity}");
                    return None;
                };
                print_info!("device removed - {0} ({1})", device.name(), identity);
                self.queue
                    .push(Event::lifecycle(EventType::DeviceRemoved, device.clone()));
                Some(device)
            }
            TransportMessage::Changed {
                identity,
                descriptor,
            } => {
                let Some(device) = self.registry.get(&identity).cloned() else {
                    print_debug!("change of unknown device {identity}");
                    return None;
                };
                self.change(device, descriptor)
            }
            TransportMessage::Frame { .. } => None,
        }
    }

    fn change(&mut self, device: Device, descriptor: DeviceDescriptor) -> Option<Device> {
        if !device.reconfigure(descriptor) {
            return None;
        }
        print_info!("device changed - {0} ({1})", device.name(), device.identity());
        self.queue
            .push(Event::lifecycle(EventType::DeviceChanged, device.clone()));
        Some(device)
    }

    /// Retire every live device without queueing events.
    pub(crate) fn shutdown(&mut self) {
        self.registry.clear();
        self.queue.clear();
    }
}
