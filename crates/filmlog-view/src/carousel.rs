//! Fixed-window carousel over an in-memory list.

/// Items shown per carousel page.
pub const CAROUSEL_PAGE_SIZE: usize = 5;

/// Rendered width of one item, in pixels.
pub const ITEM_WIDTH_PX: i64 = 200;

/// Horizontal margin on each side of an item, in pixels.
pub const ITEM_MARGIN_PX: i64 = 20;

/// Pages through `items` five at a time, clamped at both ends.
#[derive(Debug, Clone)]
pub struct Carousel<T> {
    items: Vec<T>,
    page: usize,
}

impl<T> Default for Carousel<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> Carousel<T> {
    /// Creates a carousel on its first page.
    #[must_use]
    pub const fn new(items: Vec<T>) -> Self {
        Self { items, page: 0 }
    }

    /// Current page index.
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    /// Number of pages (`0` for an empty list).
    #[must_use]
    pub const fn page_count(&self) -> usize {
        self.items.len().div_ceil(CAROUSEL_PAGE_SIZE)
    }

    const fn last_page(&self) -> usize {
        self.page_count().saturating_sub(1)
    }

    /// Whether a previous page exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 0
    }

    /// Whether a next page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.last_page()
    }

    /// Moves one page back. Returns `false` on the first page.
    pub const fn prev_page(&mut self) -> bool {
        if self.has_prev() {
            self.page = self.page.saturating_sub(1);
            true
        } else {
            false
        }
    }

    /// Moves one page forward. Returns `false` on the last page.
    pub const fn next_page(&mut self) -> bool {
        if self.has_next() {
            self.page = self.page.saturating_add(1);
            true
        } else {
            false
        }
    }

    /// Items of the current page.
    #[must_use]
    pub fn window(&self) -> &[T] {
        self.items
            .chunks(CAROUSEL_PAGE_SIZE)
            .nth(self.page)
            .unwrap_or_default()
    }

    /// Mutable items of the current page.
    pub fn window_mut(&mut self) -> &mut [T] {
        let page = self.page;
        self.items
            .chunks_mut(CAROUSEL_PAGE_SIZE)
            .nth(page)
            .unwrap_or_default()
    }

    /// Horizontal track offset: `-page * (width + 2 * margin) * page_size`.
    #[must_use]
    pub fn offset_px(&self) -> i64 {
        let stride = ITEM_WIDTH_PX.saturating_add(ITEM_MARGIN_PX.saturating_mul(2));
        let page = i64::try_from(self.page).unwrap_or(i64::MAX);
        let page_size = i64::try_from(CAROUSEL_PAGE_SIZE).unwrap_or(i64::MAX);
        0_i64.saturating_sub(page.saturating_mul(stride).saturating_mul(page_size))
    }

    /// All items.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// All items, mutable (like toggles update them in place).
    pub fn items_mut(&mut self) -> &mut [T] {
        &mut self.items
    }

    /// Replaces the items, keeping the page when it is still valid.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.page = self.page.min(self.last_page());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn test_page_count() {
        // Arrange & Act & Assert
        assert_eq!(Carousel::new(numbers(0)).page_count(), 0);
        assert_eq!(Carousel::new(numbers(5)).page_count(), 1);
        assert_eq!(Carousel::new(numbers(6)).page_count(), 2);
        assert_eq!(Carousel::new(numbers(20)).page_count(), 4);
    }

    #[test]
    fn test_clamped_at_both_ends() {
        // Arrange
        let mut carousel = Carousel::new(numbers(12));

        // Act
        let moved_back = carousel.prev_page();
        let moves: Vec<bool> = (0..5).map(|_| carousel.next_page()).collect();

        // Assert
        assert!(!moved_back);
        assert_eq!(moves, vec![true, true, false, false, false]);
        assert_eq!(carousel.page(), 2);
        assert_eq!(carousel.window(), &[10, 11]);
    }

    #[test]
    fn test_page_stays_in_range_for_any_clicks() {
        // Arrange
        let clicks = [true, true, false, true, true, true, false, false, false, false, true];
        for n in 0..=16 {
            let mut carousel = Carousel::new(numbers(n));
            let last = n.div_ceil(CAROUSEL_PAGE_SIZE).saturating_sub(1);

            for &forward in &clicks {
                // Act
                if forward {
                    carousel.next_page();
                } else {
                    carousel.prev_page();
                }

                // Assert
                assert!(carousel.page() <= last, "n={n} page={}", carousel.page());
            }
        }
    }

    #[test]
    fn test_empty_carousel_stays_at_zero() {
        // Arrange
        let mut carousel = Carousel::<u8>::default();

        // Act
        carousel.next_page();

        // Assert
        assert_eq!(carousel.page(), 0);
        assert!(carousel.window().is_empty());
        assert!(!carousel.has_next());
    }

    #[test]
    fn test_offset_px() {
        // Arrange
        let mut carousel = Carousel::new(numbers(15));

        // Act
        let first = carousel.offset_px();
        carousel.next_page();
        let second = carousel.offset_px();
        carousel.next_page();
        let third = carousel.offset_px();

        // Assert
        assert_eq!(first, 0);
        assert_eq!(second, -1200);
        assert_eq!(third, -2400);
    }

    #[test]
    fn test_set_items_clamps_page() {
        // Arrange
        let mut carousel = Carousel::new(numbers(15));
        carousel.next_page();
        carousel.next_page();

        // Act
        carousel.set_items(numbers(4));

        // Assert
        assert_eq!(carousel.page(), 0);
        assert_eq!(carousel.window(), &[0, 1, 2, 3]);
    }
}
