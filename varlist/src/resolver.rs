//! Viewport → item range resolution.

use crate::{HeightCache, ViewportState, VisibleRange};

/// Computes the buffered range of items to render for `viewport`.
///
/// The raw start is the first item whose end lies past `scroll_offset`; the raw end
/// (exclusive) is one past the last item starting before `scroll_offset + container_height`.
/// Both are then widened by the buffers and clamped to `[0, N]`. `start_offset` is the exact
/// cumulative height before the *buffered* start.
///
/// - An empty sequence or a zero-height container yields [`VisibleRange::EMPTY`].
/// - A scroll offset at or past the total height (e.g. after the sequence shrank) clamps the
///   raw start to the last item instead of producing an out-of-bounds range.
///
/// Runs in `O(log N)` using the cache's prefix index.
pub fn resolve(
    viewport: &ViewportState,
    cache: &HeightCache,
    buffer_before: usize,
    buffer_after: usize,
) -> VisibleRange {
    let count = cache.len();
    if count == 0 || viewport.container_height <= 0.0 {
        return VisibleRange::EMPTY;
    }

    let raw_start = cache
        .index_at_offset(viewport.scroll_offset)
        .unwrap_or(0);
    let raw_end = cache
        .count_starting_before(viewport.viewport_end())
        .max(raw_start + 1);

    buffered(cache, raw_start, raw_end, buffer_before, buffer_after)
}

/// Reference implementation of [`resolve`] that walks the items in order.
///
/// `O(N)` per call. Useful to cross-check the indexed resolver and for very short lists.
pub fn resolve_linear(
    viewport: &ViewportState,
    cache: &HeightCache,
    buffer_before: usize,
    buffer_after: usize,
) -> VisibleRange {
    let count = cache.len();
    if count == 0 || viewport.container_height <= 0.0 {
        return VisibleRange::EMPTY;
    }

    let scroll = viewport.scroll_offset;
    let view_end = viewport.viewport_end();
    let mut raw_start = None;
    let mut raw_end = 0usize;
    let mut acc = 0.0f64;
    for i in 0..count {
        if acc >= view_end && raw_start.is_some() {
            break;
        }
        let end = acc + cache.get(i);
        if raw_start.is_none() && end > scroll {
            raw_start = Some(i);
        }
        if acc < view_end {
            raw_end = i + 1;
        }
        acc = end;
    }

    let raw_start = raw_start.unwrap_or(count - 1);
    let raw_end = raw_end.max(raw_start + 1);
    buffered(cache, raw_start, raw_end, buffer_before, buffer_after)
}

fn buffered(
    cache: &HeightCache,
    raw_start: usize,
    raw_end: usize,
    buffer_before: usize,
    buffer_after: usize,
) -> VisibleRange {
    let start_index = raw_start.saturating_sub(buffer_before);
    let end_index = raw_end.saturating_add(buffer_after).min(cache.len());
    VisibleRange {
        start_index,
        end_index,
        start_offset: cache.prefix_height(start_index),
    }
}
