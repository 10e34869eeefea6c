use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;

use crate::control::DeviceId;
use crate::device::{Device, DeviceDescriptor, DeviceIdentity, WeakDevice};

/// Device ids are unique per process, so controls of devices in different
/// contexts never compare as siblings.
static NEXT_DEVICE_ID: AtomicU64 = AtomicU64::new(1);

/// Live devices of a context, and the identity to user-index memory that
/// survives remove and re-add cycles.
#[derive(Debug, Default)]
pub(crate) struct DeviceRegistry {
    live: AHashMap<DeviceIdentity, Device>,
    indices: AHashMap<DeviceIdentity, u32>,
    retired: Vec<WeakDevice>,
    next_index: u32,
}

impl DeviceRegistry {
    pub(crate) fn get(&self, identity: &DeviceIdentity) -> Option<&Device> {
        self.live.get(identity)
    }

    /// Live devices ordered by user index.
    pub(crate) fn devices(&self) -> Vec<Device> {
        let mut devices: Vec<Device> = self.live.values().cloned().collect();
        devices.sort_by_key(Device::user_index);
        devices
    }

    pub(crate) fn len(&self) -> usize {
        self.live.len()
    }

    /// Create a device for an identity that is not live.
    pub(crate) fn add(&mut self, identity: DeviceIdentity, descriptor: DeviceDescriptor) -> Device {
        let user_index = self.allocate_index(&identity);
        let id: DeviceId = NEXT_DEVICE_ID.fetch_add(1, Ordering::Relaxed);
        let device = Device::new(id, identity.clone(), user_index, descriptor);
        self.live.insert(identity, device.clone());
        device
    }

    /// Retire a live device. The returned handle stays valid while referenced.
    pub(crate) fn remove(&mut self, identity: &DeviceIdentity) -> Option<Device> {
        let device = self.live.remove(identity)?;
        device.mark_removed();
        self.retired.retain(WeakDevice::is_alive);
        self.retired.push(device.downgrade());
        Some(device)
    }

    /// Drop every live device, returning them in user-index order.
    pub(crate) fn clear(&mut self) -> Vec<Device> {
        let devices = self.devices();
        for device in &devices {
            device.mark_removed();
        }
        self.live.clear();
        devices
    }

    fn index_in_use(&mut self, index: u32) -> bool {
        self.retired.retain(WeakDevice::is_alive);
        self.live.values().any(|d| d.user_index() == index)
            || self
                .retired
                .iter()
                .filter_map(WeakDevice::upgrade)
                .any(|d| d.user_index() == index)
    }

    fn allocate_index(&mut self, identity: &DeviceIdentity) -> u32 {
        if let Some(&index) = self.indices.get(identity) {
            if !self.index_in_use(index) {
                return index;
            }
            print_debug!("user index {index} of {identity} is still referenced");
        }
        let index = self.next_index;
        self.next_index += 1;
        self.indices.insert(identity.clone(), index);
        index
    }
}
