use alloc::vec::Vec;

/// Measured heights captured by [`crate::Virtualizer::export_measurements`].
///
/// Heights depend on the container width and on the item sequence, so both are recorded and
/// checked on import.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasurementSnapshot {
    pub width: f64,
    pub version: u64,
    /// `(index, height)` pairs, ascending by index.
    pub entries: Vec<(usize, f64)>,
}

impl MeasurementSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
