pub const DEFAULT_MAX_VISIBLE_PAGES: usize = 5;

/// Page numbers to render around `current`, at most `max_visible` of them.
///
/// The window starts half a window before `current` and is cut at `total_pages`; it is
/// not shifted back when it runs off the end.
pub fn visible_pages(current: u32, total_pages: u32, max_visible: usize) -> Vec<u32> {
    if total_pages == 0 || max_visible == 0 {
        return Vec::new();
    }
    let max_visible = u32::try_from(max_visible).unwrap_or(u32::MAX);
    let current = current.clamp(1, total_pages);
    let start = current.saturating_sub(max_visible / 2).max(1);
    let end = start.saturating_add(max_visible - 1).min(total_pages);
    (start..=end).collect()
}
