use ulid::Ulid;

use crate::model::{Booking, ItemState, ItemView, Slot, Span};

use super::{BookingService, EngineError};

impl BookingService {
    /// Register a new item with an empty interval set. Field validation is
    /// the caller's job; the engine treats the catalog fields as opaque.
    pub fn create_item(&self, name: String, description: String, price_per_day: f64) -> ItemView {
        let id = Ulid::new();
        let state = ItemState::new(id, name, description, price_per_day);
        let view = state.to_view();
        self.register_item(id, state);
        view
    }

    /// Accept `[span.start, span.end)` on the item if it clears its two
    /// would-be neighbors, generating a fresh rental id. The availability
    /// check and the insert run under the item's write lock as one unit,
    /// so two concurrent requests for the same range admit exactly one.
    pub async fn book_item(&self, item_id: Ulid, span: Span) -> Result<Booking, EngineError> {
        let rs = self
            .get_item_state(&item_id)
            .ok_or(EngineError::ItemNotFound(item_id))?;
        let mut guard = rs.write().await;

        let at = guard.rentals.insertion_point(span.start);
        if !guard.rentals.is_range_available(at, &span) {
            return Err(EngineError::RangeConflict { item_id, span });
        }

        let booking_id = Ulid::new();
        guard.rentals.insert_at(at, Slot { id: booking_id, span });
        self.register_booking(booking_id, item_id);
        Ok(Booking {
            id: booking_id,
            item_id,
            span,
        })
    }

    /// Remove an accepted rental. Returns the owning item's id. Repeated
    /// cancellation of the same id fails with `BookingNotFound`, including
    /// when two cancels race past the index lookup — the loser finds the
    /// slot already gone once it holds the lock.
    pub async fn cancel_booking(&self, booking_id: Ulid) -> Result<Ulid, EngineError> {
        let (item_id, mut guard) = self.resolve_booking_write(&booking_id).await?;
        match guard.rentals.remove(booking_id) {
            Some(_) => {
                self.unregister_booking(&booking_id);
                Ok(item_id)
            }
            None => Err(EngineError::BookingNotFound(booking_id)),
        }
    }
}
