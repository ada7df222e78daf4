//! Block window pagination.

/// Inclusive `(from, to)` windows covering `[start, head)`.
///
/// Windows are strictly increasing and never overlap. A zero `window` is treated as 1.
pub fn block_windows(start: u64, head: u64, window: u64) -> impl Iterator<Item = (u64, u64)> {
    let window = window.max(1);
    let mut next = start;
    std::iter::from_fn(move || {
        if next >= head {
            return None;
        }
        let from = next;
        let to = from.saturating_add(window).min(head) - 1;
        next = to + 1;
        Some((from, to))
    })
}
