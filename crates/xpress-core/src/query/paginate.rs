// Page arithmetic. Pages are 1-based.

/// Number of page buttons shown at once.
pub const PAGE_WINDOW: usize = 5;

/// `ceil(total / page_size)`; zero when there is nothing to show.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}

/// Clamp a requested page into `[1, max(1, total_pages)]`.
pub(crate) fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// The slice of `items` on `page` (clamped), `page_size` rows per page.
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> &[T] {
    let page_size = page_size.max(1);
    let page = clamp_page(page, total_pages(items.len(), page_size));
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(items.len());
    items.get(start..end).unwrap_or_default()
}

/// The page numbers to offer as buttons: every page when there are at most
/// [`PAGE_WINDOW`], else a window of five around `current` that sticks to
/// either end.
pub fn page_window(current: usize, total_pages: usize) -> Vec<usize> {
    if total_pages <= PAGE_WINDOW {
        return (1..=total_pages).collect();
    }
    let current = clamp_page(current, total_pages);
    let half = PAGE_WINDOW / 2;
    let first = if current <= half + 1 {
        1
    } else if current + half >= total_pages {
        total_pages + 1 - PAGE_WINDOW
    } else {
        current - half
    };
    (first..first + PAGE_WINDOW).collect()
}

/// "Showing {start} to {end} of {total} entries" for `page`.
pub fn showing_text(page: usize, page_size: usize, total: usize) -> String {
    if total == 0 {
        return "Showing 0 to 0 of 0 entries".into();
    }
    let page_size = page_size.max(1);
    let page = clamp_page(page, total_pages(total, page_size));
    let start = (page - 1) * page_size + 1;
    let end = (page * page_size).min(total);
    format!("Showing {start} to {end} of {total} entries")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_reconstruct_the_list() {
        let items: Vec<u32> = (0..23).collect();
        for size in 1..=30 {
            let pages = total_pages(items.len(), size);
            let rebuilt: Vec<u32> = (1..=pages)
                .flat_map(|p| paginate(&items, size, p).iter().copied())
                .collect();
            assert_eq!(rebuilt, items, "page size {size}");
        }
    }

    #[test]
    fn out_of_range_pages_clamp() {
        let items: Vec<u32> = (0..25).collect();
        assert_eq!(paginate(&items, 10, 0), &items[..10]);
        assert_eq!(paginate(&items, 10, 99), &items[20..]);
        assert!(paginate::<u32>(&[], 10, 3).is_empty());
    }

    #[test]
    fn window_shapes() {
        assert_eq!(page_window(2, 3), vec![1, 2, 3]);
        assert_eq!(page_window(1, 9), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(3, 9), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(5, 9), vec![3, 4, 5, 6, 7]);
        assert_eq!(page_window(8, 9), vec![5, 6, 7, 8, 9]);
        assert_eq!(page_window(9, 9), vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn showing_text_bounds() {
        assert_eq!(showing_text(1, 10, 23), "Showing 1 to 10 of 23 entries");
        assert_eq!(showing_text(3, 10, 23), "Showing 21 to 23 of 23 entries");
        assert_eq!(showing_text(1, 10, 0), "Showing 0 to 0 of 0 entries");
    }
}
