//! Incremental list: a visible prefix that grows one page per sentinel hit.

use anyhow::{Result, bail};

/// Page size used by every post list.
pub const POST_PAGE_SIZE: usize = 5;

/// Marker for the end of the rendered prefix.
///
/// Only the sentinel of the current generation can extend the list. Every
/// change to the visible prefix starts a new generation, so a sentinel
/// obtained before the change is inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentinel {
    generation: u64,
}

/// In-memory list revealed `page_size` items at a time.
#[derive(Debug, Clone)]
pub struct IncrementalList<T> {
    items: Vec<T>,
    page_size: usize,
    visible: usize,
    generation: u64,
}

impl<T> IncrementalList<T> {
    /// Creates a list showing its first page.
    ///
    /// # Errors
    ///
    /// Returns an error if `page_size` is 0.
    pub fn new(items: Vec<T>, page_size: usize) -> Result<Self> {
        if page_size == 0 {
            bail!("page size must be greater than 0");
        }
        let visible = items.len().min(page_size);
        Ok(Self {
            items,
            page_size,
            visible,
            generation: 0,
        })
    }

    /// Items currently rendered.
    #[must_use]
    pub fn visible(&self) -> &[T] {
        self.items.get(..self.visible).unwrap_or(&self.items)
    }

    /// Length of the rendered prefix.
    #[must_use]
    pub const fn visible_len(&self) -> usize {
        self.visible
    }

    /// Every loaded item, rendered or not.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Total number of loaded items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no items are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items revealed per page.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Whether another page can be revealed.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.visible < self.items.len()
    }

    /// Sentinel for the current rendering.
    #[must_use]
    pub const fn sentinel(&self) -> Sentinel {
        Sentinel {
            generation: self.generation,
        }
    }

    /// Handles the sentinel entering the viewport.
    ///
    /// Returns `true` if another page was revealed.
    pub fn on_intersect(&mut self, sentinel: Sentinel) -> bool {
        if sentinel.generation != self.generation || !self.has_more() {
            return false;
        }
        self.visible = self
            .visible
            .saturating_add(self.page_size)
            .min(self.items.len());
        self.bump();
        true
    }

    /// Removes matching items, keeping the rendered prefix length.
    ///
    /// Returns the number of removed items.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !pred(item));
        let removed = before.saturating_sub(self.items.len());
        if removed > 0 {
            self.visible = self.visible.min(self.items.len());
            self.bump();
        }
        removed
    }

    /// Replaces the items and shows the first page again.
    pub fn reset(&mut self, items: Vec<T>) {
        self.visible = items.len().min(self.page_size);
        self.items = items;
        self.bump();
    }

    const fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}
