use ulid::Ulid;

/// Unix milliseconds — the only time type.
pub type Ms = i64;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// One accepted rental inside an item's interval set: a span tagged with
/// the rental's identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub id: Ulid,
    pub span: Span,
}

/// Sorted, non-overlapping collection of an item's rentals.
///
/// Structural invariant, preserved by every operation: slots are ascending
/// by `span.start` and no two spans overlap. Because of it, availability of
/// a new span is decided by its two would-be neighbors alone.
#[derive(Debug, Clone, Default)]
pub struct IntervalSet {
    slots: Vec<Slot>,
}

impl IntervalSet {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Smallest index whose slot starts at or after `new_start` — the unique
    /// position where a slot with that start keeps the sequence sorted.
    /// Ties land before the existing equal-start slot (such a tie always
    /// fails the availability check anyway).
    pub fn insertion_point(&self, new_start: Ms) -> usize {
        self.slots.partition_point(|s| s.span.start < new_start)
    }

    /// Whether `span` fits at `idx` without touching either neighbor.
    /// Half-open semantics: a rental ending exactly when another starts is
    /// not a conflict.
    pub fn is_range_available(&self, idx: usize, span: &Span) -> bool {
        if idx > 0 && self.slots[idx - 1].span.end > span.start {
            return false;
        }
        if let Some(next) = self.slots.get(idx)
            && next.span.start < span.end
        {
            return false;
        }
        true
    }

    /// Splice `slot` in at `idx`. The caller must have verified availability
    /// at that same index while holding exclusive access; no re-validation
    /// happens here.
    pub fn insert_at(&mut self, idx: usize, slot: Slot) {
        debug_assert!(self.is_range_available(idx, &slot.span));
        self.slots.insert(idx, slot);
    }

    /// Excise the slot with the given rental id, if present.
    pub fn remove(&mut self, id: Ulid) -> Option<Slot> {
        let pos = self.slots.iter().position(|s| s.id == id)?;
        Some(self.slots.remove(pos))
    }
}

/// A rentable item: opaque catalog fields plus its interval set.
#[derive(Debug, Clone)]
pub struct ItemState {
    pub id: Ulid,
    pub name: String,
    pub description: String,
    pub price_per_day: f64,
    pub rentals: IntervalSet,
}

impl ItemState {
    pub fn new(id: Ulid, name: String, description: String, price_per_day: f64) -> Self {
        Self {
            id,
            name,
            description,
            price_per_day,
            rentals: IntervalSet::new(),
        }
    }

    /// Expand the interval set into full rental records, in stored
    /// (start-ascending) order.
    pub fn to_view(&self) -> ItemView {
        ItemView {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            price_per_day: self.price_per_day,
            rentals: self
                .rentals
                .slots()
                .iter()
                .map(|s| Booking {
                    id: s.id,
                    item_id: self.id,
                    span: s.span,
                })
                .collect(),
        }
    }
}

/// An accepted rental. Immutable once created; only ever deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Booking {
    pub id: Ulid,
    pub item_id: Ulid,
    pub span: Span,
}

/// An item with its rentals expanded — what queries return.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemView {
    pub id: Ulid,
    pub name: String,
    pub description: String,
    pub price_per_day: f64,
    pub rentals: Vec<Booking>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(start: Ms, end: Ms) -> Slot {
        Slot {
            id: Ulid::new(),
            span: Span::new(start, end),
        }
    }

    /// Slots at [100,200) and [300,400).
    fn two_slot_set() -> IntervalSet {
        let mut set = IntervalSet::new();
        set.insert_at(0, slot(100, 200));
        set.insert_at(1, slot(300, 400));
        set
    }

    #[test]
    fn span_basics() {
        let s = Span::new(100, 200);
        assert_eq!(s.duration_ms(), 100);
        assert!(s.overlaps(&Span::new(150, 250)));
        assert!(!s.overlaps(&Span::new(200, 300))); // adjacent, not overlapping
    }

    #[test]
    fn insertion_point_empty() {
        let set = IntervalSet::new();
        assert_eq!(set.insertion_point(500), 0);
    }

    #[test]
    fn insertion_point_positions() {
        let set = two_slot_set();
        assert_eq!(set.insertion_point(50), 0);
        assert_eq!(set.insertion_point(100), 0); // tie goes before the equal start
        assert_eq!(set.insertion_point(150), 1);
        assert_eq!(set.insertion_point(300), 1);
        assert_eq!(set.insertion_point(500), 2);
    }

    #[test]
    fn empty_set_accepts_anything() {
        let set = IntervalSet::new();
        assert!(set.is_range_available(0, &Span::new(0, 1)));
        assert!(set.is_range_available(0, &Span::new(100, 10_000)));
    }

    #[test]
    fn adjacent_ranges_available() {
        let set = two_slot_set();
        // Ends exactly where the first slot begins.
        let before = Span::new(50, 100);
        assert!(set.is_range_available(set.insertion_point(before.start), &before));
        // Starts exactly where the first slot ends.
        let between = Span::new(200, 300);
        assert!(set.is_range_available(set.insertion_point(between.start), &between));
        let after = Span::new(400, 500);
        assert!(set.is_range_available(set.insertion_point(after.start), &after));
    }

    #[test]
    fn exact_duplicate_unavailable() {
        let set = two_slot_set();
        let dup = Span::new(100, 200);
        assert!(!set.is_range_available(set.insertion_point(dup.start), &dup));
    }

    #[test]
    fn overlaps_unavailable() {
        let set = two_slot_set();
        let cases = [
            Span::new(150, 250),  // straddles a slot's end
            Span::new(50, 150),   // straddles a slot's start
            Span::new(120, 180),  // contained within a slot
            Span::new(50, 250),   // contains a slot
            Span::new(150, 350),  // bridges both slots
        ];
        for span in cases {
            let idx = set.insertion_point(span.start);
            assert!(!set.is_range_available(idx, &span), "{span:?} should conflict");
        }
    }

    #[test]
    fn insert_keeps_sort_order() {
        let mut set = IntervalSet::new();
        for span in [Span::new(300, 400), Span::new(100, 200), Span::new(500, 600)] {
            let idx = set.insertion_point(span.start);
            assert!(set.is_range_available(idx, &span));
            set.insert_at(idx, Slot { id: Ulid::new(), span });
        }
        let starts: Vec<Ms> = set.slots().iter().map(|s| s.span.start).collect();
        assert_eq!(starts, vec![100, 300, 500]);
    }

    #[test]
    fn remove_middle_preserves_order() {
        let mut set = IntervalSet::new();
        let ids: Vec<Ulid> = (0..3).map(|_| Ulid::new()).collect();
        for (i, &id) in ids.iter().enumerate() {
            let span = Span::new((i as Ms) * 100, (i as Ms) * 100 + 50);
            set.insert_at(set.insertion_point(span.start), Slot { id, span });
        }
        let removed = set.remove(ids[1]);
        assert_eq!(removed.map(|s| s.id), Some(ids[1]));
        assert_eq!(set.len(), 2);
        assert_eq!(set.slots()[0].id, ids[0]);
        assert_eq!(set.slots()[1].id, ids[2]);
    }

    #[test]
    fn remove_nonexistent_returns_none() {
        let mut set = two_slot_set();
        assert!(set.remove(Ulid::new()).is_none());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn freed_range_becomes_available() {
        let mut set = two_slot_set();
        let id = set.slots()[0].id;
        let span = set.slots()[0].span;
        assert!(!set.is_range_available(set.insertion_point(span.start), &span));
        set.remove(id).unwrap();
        assert!(set.is_range_available(set.insertion_point(span.start), &span));
    }

    #[test]
    fn item_view_expands_rentals() {
        let mut item = ItemState::new(Ulid::new(), "hammer".into(), "".into(), 30.0);
        let span = Span::new(100, 200);
        let rental_id = Ulid::new();
        item.rentals.insert_at(0, Slot { id: rental_id, span });

        let view = item.to_view();
        assert_eq!(view.rentals.len(), 1);
        assert_eq!(view.rentals[0].id, rental_id);
        assert_eq!(view.rentals[0].item_id, item.id);
        assert_eq!(view.rentals[0].span, span);
    }
}
