/// Scroll position and container geometry, as last reported by the host.
///
/// Only the scroll and resize handlers write this; the engine never adjusts it on its own.
/// All fields are finite and `>= 0.0`: setters clamp anything else to `0.0`.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportState {
    pub scroll_offset: f64,
    pub container_height: f64,
    /// Cross-axis size. Row heights depend on it (wrapped text); `0.0` means not laid out yet.
    pub container_width: f64,
}

impl ViewportState {
    pub fn new(scroll_offset: f64, container_width: f64, container_height: f64) -> Self {
        Self {
            scroll_offset: sanitize(scroll_offset),
            container_height: sanitize(container_height),
            container_width: sanitize(container_width),
        }
    }

    pub(crate) fn set_scroll_offset(&mut self, offset: f64) -> bool {
        let offset = sanitize(offset);
        if self.scroll_offset == offset {
            return false;
        }
        self.scroll_offset = offset;
        true
    }

    /// Applies a container resize and returns whether the width changed.
    pub(crate) fn set_container_size(&mut self, width: f64, height: f64) -> bool {
        let width = sanitize(width);
        self.container_height = sanitize(height);
        if self.container_width == width {
            return false;
        }
        self.container_width = width;
        true
    }

    /// Scroll offset plus container height.
    pub fn viewport_end(&self) -> f64 {
        self.scroll_offset + self.container_height
    }
}

pub(crate) fn sanitize(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}
