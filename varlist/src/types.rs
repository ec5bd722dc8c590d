use core::ops;

/// The slice of items to materialize.
///
/// `start_offset` is the cumulative height of every item before `start_index`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleRange {
    pub start_index: usize,
    pub end_index: usize, // exclusive
    pub start_offset: f64,
}

impl VisibleRange {
    pub const EMPTY: Self = Self {
        start_index: 0,
        end_index: 0,
        start_offset: 0.0,
    };

    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn indices(&self) -> ops::Range<usize> {
        self.start_index..self.end_index
    }
}

/// What the host surface renders: items `[start_index, end_index)` stacked from
/// `start_offset`, inside a scrollable region `total_height` tall.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderPlan {
    pub start_index: usize,
    pub end_index: usize, // exclusive
    pub start_offset: f64,
    pub total_height: f64,
}

impl RenderPlan {
    pub fn new(range: VisibleRange, total_height: f64) -> Self {
        Self {
            start_index: range.start_index,
            end_index: range.end_index,
            start_offset: range.start_offset,
            total_height,
        }
    }

    pub fn range(&self) -> VisibleRange {
        VisibleRange {
            start_index: self.start_index,
            end_index: self.end_index,
            start_offset: self.start_offset,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn indices(&self) -> ops::Range<usize> {
        self.start_index..self.end_index
    }
}

/// One row of a [`RenderPlan`], positioned in content coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlannedItem {
    pub index: usize,
    pub start: f64,
    /// Effective height (the default estimate while unmeasured).
    pub height: f64,
    pub measured: bool,
}

impl PlannedItem {
    pub fn end(&self) -> f64 {
        self.start + self.height
    }
}
