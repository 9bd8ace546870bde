use ulid::Ulid;

use crate::model::Span;

#[derive(Debug)]
pub enum EngineError {
    ItemNotFound(Ulid),
    BookingNotFound(Ulid),
    RangeConflict { item_id: Ulid, span: Span },
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::ItemNotFound(id) => write!(f, "item not found: {id}"),
            EngineError::BookingNotFound(id) => write!(f, "rental not found: {id}"),
            EngineError::RangeConflict { item_id, span } => {
                write!(
                    f,
                    "item {item_id} not available for [{}, {})",
                    span.start, span.end
                )
            }
        }
    }
}

impl std::error::Error for EngineError {}
