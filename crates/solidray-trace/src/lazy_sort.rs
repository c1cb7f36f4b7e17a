//! Incrementally sorted slices.
//!
//! Most pixel rays stop after the first few candidates of a zone, so the
//! zone list is only sorted as far as it is read. The sorted prefix starts
//! at a configured length and doubles whenever a reader walks past it.

/// A slice whose prefix `[..sorted]` is in order and no larger than any
/// element after it.
pub(crate) struct LazySort<'s, T> {
    items: &'s mut [T],
    sorted: usize,
    first: usize,
}

impl<'s, T: Ord + Copy> LazySort<'s, T> {
    /// Wrap `items`; the first extension sorts at least `first` elements.
    pub(crate) fn new(items: &'s mut [T], first: usize) -> Self {
        Self {
            items,
            sorted: 0,
            first: first.max(1),
        }
    }

    /// The `k`-th smallest element, sorting more of the slice if needed.
    pub(crate) fn get(&mut self, k: usize) -> Option<T> {
        while k >= self.sorted {
            if self.sorted == self.items.len() {
                return None;
            }
            self.extend();
        }
        Some(self.items[k])
    }

    /// Length of the sorted prefix.
    pub(crate) fn sorted(&self) -> usize {
        self.sorted
    }

    fn extend(&mut self) {
        let len = self.items.len();
        let end = self.first.max(2 * self.sorted).min(len);
        let rest = &mut self.items[self.sorted..];
        let take = end - self.sorted;
        if take < rest.len() {
            rest.select_nth_unstable(take - 1);
        }
        rest[..take].sort_unstable();
        self.sorted = end;
    }
}
