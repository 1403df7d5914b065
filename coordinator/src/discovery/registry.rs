use chrono::Utc;
use parking_lot::Mutex;

use common::{DeviceAddr, DeviceType, DiscoveryError, Responder, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(usize),
    Updated(usize),
}

struct Inner {
    entries: Vec<Responder>,
    dropped: u64,
}

/// Bounded registry of discovered devices, keyed by address.
///
/// One writer (the collector) and any number of readers share this
/// through an `Arc`; every operation takes the lock exactly once, so
/// concurrent insert/snapshot interleavings are safe. Entries keep
/// first-seen order; a repeated response from a known address updates
/// the stored entry in place rather than appending a duplicate. Once
/// `capacity` distinct addresses are present, responses from new
/// addresses are dropped and counted.
pub struct ResponderRegistry {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl ResponderRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: Vec::with_capacity(capacity),
                dropped: 0,
            }),
            capacity,
        }
    }

    pub fn insert(&self, address: DeviceAddr, device_type: DeviceType) -> Result<InsertOutcome> {
        let mut inner = self.inner.lock();
        if let Some(index) = inner.entries.iter().position(|r| r.address == address) {
            inner.entries[index].device_type = device_type;
            inner.entries[index].discovered_at = Utc::now();
            return Ok(InsertOutcome::Updated(index));
        }
        if inner.entries.len() >= self.capacity {
            inner.dropped += 1;
            return Err(DiscoveryError::CapacityExceeded(self.capacity));
        }
        inner.entries.push(Responder {
            address,
            device_type,
            discovered_at: Utc::now(),
        });
        Ok(InsertOutcome::Inserted(inner.entries.len() - 1))
    }

    /// Entries in first-seen order.
    pub fn snapshot(&self) -> Vec<Responder> {
        self.inner.lock().entries.clone()
    }

    pub fn count(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Responses from new addresses discarded because the registry was
    /// full.
    pub fn dropped(&self) -> u64 {
        self.inner.lock().dropped
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.count() >= self.capacity
    }

    /// Reset for a new discovery round. Clears entries and the drop
    /// counter; the owning application calls this between rounds.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.dropped = 0;
    }
}
