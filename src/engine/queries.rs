use ulid::Ulid;

use crate::model::{Booking, ItemState, ItemView};

use super::{BookingService, EngineError};

/// One catalog predicate. The source's query-string dispatch table becomes
/// an enumerated filter applied with a `match`.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemFilter {
    Name(String),
    Price(f64),
    PriceGt(f64),
    PriceLt(f64),
    PriceGte(f64),
    PriceLte(f64),
}

impl ItemFilter {
    pub fn matches(&self, item: &ItemState) -> bool {
        match self {
            ItemFilter::Name(name) => item.name == *name,
            ItemFilter::Price(p) => item.price_per_day == *p,
            ItemFilter::PriceGt(p) => item.price_per_day > *p,
            ItemFilter::PriceLt(p) => item.price_per_day < *p,
            ItemFilter::PriceGte(p) => item.price_per_day >= *p,
            ItemFilter::PriceLte(p) => item.price_per_day <= *p,
        }
    }
}

impl BookingService {
    pub async fn get_item(&self, item_id: Ulid) -> Result<ItemView, EngineError> {
        let rs = self
            .get_item_state(&item_id)
            .ok_or(EngineError::ItemNotFound(item_id))?;
        let guard = rs.read().await;
        Ok(guard.to_view())
    }

    /// Items passing every filter, rentals expanded, in creation order.
    pub async fn list_items(&self, filters: &[ItemFilter]) -> Vec<ItemView> {
        let mut views = Vec::new();
        for rs in self.item_states() {
            let guard = rs.read().await;
            if filters.iter().all(|f| f.matches(&guard)) {
                views.push(guard.to_view());
            }
        }
        // Map iteration order is arbitrary; ids are ULIDs, so sorting by id
        // recovers creation order.
        views.sort_by_key(|v| v.id);
        views
    }

    /// The item's rentals in stored order (start-ascending).
    pub async fn list_item_bookings(&self, item_id: Ulid) -> Result<Vec<Booking>, EngineError> {
        let rs = self
            .get_item_state(&item_id)
            .ok_or(EngineError::ItemNotFound(item_id))?;
        let guard = rs.read().await;
        Ok(guard
            .rentals
            .slots()
            .iter()
            .map(|s| Booking {
                id: s.id,
                item_id,
                span: s.span,
            })
            .collect())
    }
}
