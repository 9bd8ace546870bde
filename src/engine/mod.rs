mod error;
mod mutations;
mod queries;

pub use error::EngineError;
pub use queries::ItemFilter;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;
use ulid::Ulid;

use crate::model::ItemState;

pub type SharedItemState = Arc<RwLock<ItemState>>;

/// In-memory booking engine: one interval set per item, one write lock per
/// item. The check-then-insert in `book_item` and the removal in
/// `cancel_booking` each run under that lock, so availability decisions and
/// the mutations they authorize are never interleaved.
pub struct BookingService {
    items: DashMap<Ulid, SharedItemState>,
    /// Reverse lookup: rental id → item id.
    booking_to_item: DashMap<Ulid, Ulid>,
}

impl Default for BookingService {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingService {
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
            booking_to_item: DashMap::new(),
        }
    }

    pub fn get_item_state(&self, id: &Ulid) -> Option<SharedItemState> {
        self.items.get(id).map(|e| e.value().clone())
    }

    pub fn item_for_booking(&self, booking_id: &Ulid) -> Option<Ulid> {
        self.booking_to_item.get(booking_id).map(|e| *e.value())
    }

    pub(super) fn register_item(&self, id: Ulid, state: ItemState) {
        self.items.insert(id, Arc::new(RwLock::new(state)));
    }

    pub(super) fn register_booking(&self, booking_id: Ulid, item_id: Ulid) {
        self.booking_to_item.insert(booking_id, item_id);
    }

    pub(super) fn unregister_booking(&self, booking_id: &Ulid) {
        self.booking_to_item.remove(booking_id);
    }

    /// Clone out the shared item states so callers can lock them without
    /// holding a map shard entry across an await.
    pub(super) fn item_states(&self) -> Vec<SharedItemState> {
        self.items.iter().map(|e| e.value().clone()).collect()
    }

    /// Lookup rental → item, get the item, acquire its write lock.
    pub(super) async fn resolve_booking_write(
        &self,
        booking_id: &Ulid,
    ) -> Result<(Ulid, tokio::sync::OwnedRwLockWriteGuard<ItemState>), EngineError> {
        let item_id = self
            .item_for_booking(booking_id)
            .ok_or(EngineError::BookingNotFound(*booking_id))?;
        let rs = self
            .get_item_state(&item_id)
            .ok_or(EngineError::ItemNotFound(item_id))?;
        let guard = rs.write_owned().await;
        Ok((item_id, guard))
    }
}
