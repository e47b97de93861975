use crate::error::{Result, TransportError};
use crate::traits::{Downstream, Upstream};

/// Depth-one handshake register.
///
/// An occupied link is a producer holding `valid` with a stable payload; the
/// item stays in place until the consumer takes it. A producer may only offer
/// into a vacant link.
#[derive(Debug, Clone)]
pub struct Link<T> {
    slot: Option<T>,
    transfers: u64,
}

impl<T> Link<T> {
    pub const fn new() -> Self {
        Self {
            slot: None,
            transfers: 0,
        }
    }

    /// Producer `valid`.
    pub fn is_valid(&self) -> bool {
        self.slot.is_some()
    }

    /// Room for the producer to offer the next item.
    pub fn is_vacant(&self) -> bool {
        self.slot.is_none()
    }

    /// Offer an item. Fails if the previous one has not been taken.
    pub fn offer(&mut self, item: T) -> Result<()> {
        if self.slot.is_some() {
            return Err(TransportError::LinkOccupied);
        }
        self.slot = Some(item);
        Ok(())
    }

    /// Drop any pending item (reset).
    pub fn clear(&mut self) {
        self.slot = None;
    }

    /// Number of completed transfers since creation.
    pub fn transfers(&self) -> u64 {
        self.transfers
    }
}

impl<T> Default for Link<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Upstream<T> for Link<T> {
    fn peek(&self) -> Option<&T> {
        self.slot.as_ref()
    }

    fn take(&mut self) -> Option<T> {
        let item = self.slot.take()?;
        self.transfers += 1;
        Some(item)
    }
}

impl<T> Downstream<T> for Link<T> {
    type Error = TransportError;

    fn is_ready_for(&self, _item: &T) -> bool {
        self.is_vacant()
    }

    fn accept(&mut self, item: T) -> Result<()> {
        self.offer(item)
    }
}
