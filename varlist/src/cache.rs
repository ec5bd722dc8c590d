use alloc::vec::Vec;

use crate::fenwick::Fenwick;

/// Result of [`HeightCache::set`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SetOutcome {
    /// The item was unmeasured; the total moved by `delta` (measured height minus estimate).
    Inserted { delta: f64 },
    /// The identical height was already stored.
    Unchanged,
    /// A different height was already stored without an invalidation in between. The newer
    /// value was kept and the total moved by `delta`.
    Overwritten { previous: f64, delta: f64 },
    /// `index` is outside the current sequence.
    OutOfBounds,
    /// The height is NaN, infinite or negative and was not cached.
    Rejected,
}

impl SetOutcome {
    /// Returns `true` when the stored heights changed.
    pub fn changed(&self) -> bool {
        matches!(self, Self::Inserted { .. } | Self::Overwritten { .. })
    }
}

/// Measured heights for an item sequence, with estimates for everything unmeasured.
///
/// Unknown heights are tracked explicitly, so a genuinely zero-height row is distinct from a
/// row that was never measured. Effective heights (measured, or the default estimate) are
/// mirrored in a Fenwick tree:
/// - `get`, `set`: `O(1)` / `O(log n)`
/// - `prefix_height`, `index_at_offset`: `O(log n)`
/// - `total_height`: `O(1)`, adjusted by the delta of every `set`
#[derive(Clone, Debug)]
pub struct HeightCache {
    default_estimate: f64,
    heights: Vec<Option<f64>>,
    measured: usize,
    sums: Fenwick,
}

impl HeightCache {
    pub fn new(len: usize, default_estimate: f64) -> Self {
        Self {
            default_estimate,
            heights: alloc::vec![None; len],
            measured: 0,
            sums: Fenwick::from_heights(core::iter::repeat_n(default_estimate, len)),
        }
    }

    /// Number of items in the sequence (`N`).
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Number of measured entries. Never exceeds [`Self::len`].
    pub fn measured_count(&self) -> usize {
        self.measured
    }

    pub fn default_estimate(&self) -> f64 {
        self.default_estimate
    }

    /// Effective height of `index`: the measurement if present, else the default estimate.
    ///
    /// Indexes past the end also report the default estimate.
    pub fn get(&self, index: usize) -> f64 {
        self.measured(index).unwrap_or(self.default_estimate)
    }

    pub fn measured(&self, index: usize) -> Option<f64> {
        self.heights.get(index).copied().flatten()
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.measured(index).is_some()
    }

    /// Records a measurement.
    pub fn set(&mut self, index: usize, height: f64) -> SetOutcome {
        let Some(slot) = self.heights.get_mut(index) else {
            return SetOutcome::OutOfBounds;
        };
        if !height.is_finite() || height < 0.0 {
            vwarn!(index, height, "HeightCache::set: rejected height");
            return SetOutcome::Rejected;
        }

        match *slot {
            Some(previous) if previous == height => SetOutcome::Unchanged,
            Some(previous) => {
                vwarn!(
                    index,
                    previous,
                    height,
                    "HeightCache::set: item re-measured without invalidation"
                );
                *slot = Some(height);
                let delta = height - previous;
                self.sums.add(index, delta);
                SetOutcome::Overwritten { previous, delta }
            }
            None => {
                *slot = Some(height);
                self.measured += 1;
                let delta = height - self.default_estimate;
                self.sums.add(index, delta);
                SetOutcome::Inserted { delta }
            }
        }
    }

    /// Sum of effective heights over the whole sequence.
    pub fn total_height(&self) -> f64 {
        self.sums.total()
    }

    /// Cumulative effective height of all items before `index` (clamped to the sequence).
    pub fn prefix_height(&self, index: usize) -> f64 {
        self.sums.prefix_sum(index)
    }

    /// Index of the item covering `offset`, or `None` when the sequence is empty.
    ///
    /// Offsets at or past the total height map to the last item.
    pub fn index_at_offset(&self, offset: f64) -> Option<usize> {
        let last = self.len().checked_sub(1)?;
        Some(self.sums.count_ending_at_or_before(offset).min(last))
    }

    /// Number of items that start strictly before `offset`.
    pub fn count_starting_before(&self, offset: f64) -> usize {
        if self.is_empty() || offset <= 0.0 {
            return 0;
        }
        // Item `k` starts at prefix(k); every item ending before `offset` is followed by one
        // that starts before it.
        (self.sums.count_ending_before(offset) + 1).min(self.len())
    }

    /// Forgets every measurement; all items fall back to the default estimate.
    pub fn invalidate_all(&mut self) {
        vdebug!(
            len = self.len(),
            measured = self.measured,
            "HeightCache::invalidate_all"
        );
        let len = self.len();
        self.reset(len);
    }

    /// Drops entries for indexes `>= new_len`. No-op if the sequence is not longer than that.
    pub fn prune(&mut self, new_len: usize) {
        if new_len >= self.len() {
            return;
        }
        let dropped = self.heights[new_len..].iter().filter(|h| h.is_some()).count();
        self.heights.truncate(new_len);
        self.measured -= dropped;
        self.sums.truncate(new_len);
    }

    /// Extends the sequence with unmeasured items.
    pub fn grow(&mut self, new_len: usize) {
        while self.heights.len() < new_len {
            self.heights.push(None);
            self.sums.push(self.default_estimate);
        }
    }

    /// Resizes to `new_len`, keeping measurements of surviving items.
    pub fn resize(&mut self, new_len: usize) {
        if new_len < self.len() {
            self.prune(new_len);
        } else {
            self.grow(new_len);
        }
    }

    /// Replaces the cache with `new_len` unmeasured items.
    pub fn reset(&mut self, new_len: usize) {
        self.heights.clear();
        self.heights.resize(new_len, None);
        self.measured = 0;
        self.sums = Fenwick::from_heights(core::iter::repeat_n(self.default_estimate, new_len));
    }

    /// Changes the estimate used for unmeasured items, keeping every measurement.
    pub fn set_default_estimate(&mut self, default_estimate: f64) {
        if self.default_estimate == default_estimate {
            return;
        }
        self.default_estimate = default_estimate;
        self.sums =
            Fenwick::from_heights(self.heights.iter().map(|h| h.unwrap_or(default_estimate)));
    }

    /// Iterates measured entries in index order.
    pub fn for_each_measured(&self, mut f: impl FnMut(usize, f64)) {
        for (i, h) in self.heights.iter().enumerate() {
            if let Some(h) = h {
                f(i, *h);
            }
        }
    }

    /// Indexes in `[from, from + count)` that are still unmeasured, in ascending order.
    pub(crate) fn unmeasured_in(
        &self,
        from: usize,
        count: usize,
    ) -> impl Iterator<Item = usize> + '_ {
        let end = from.saturating_add(count).min(self.len());
        (from.min(end)..end).filter(move |&i| self.heights[i].is_none())
    }
}
