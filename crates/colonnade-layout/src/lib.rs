#![forbid(unsafe_code)]

//! Masonry column layout allocation.
//!
//! This crate is the placement engine for a masonry grid: fixed-width
//! columns, variable item heights, greedy shortest-column packing.
//!
//! - [`LayoutConfig`] - validated, immutable grid geometry
//! - [`ColumnAllocator`] - mutable column state and placement decisions
//! - [`overlay`] - optional exclusion-zone extension for overlay widgets
//!
//! The allocator is pure layout state. Given an item's rendered height it
//! decides which column the item lands in and reports the absolute pixel
//! offset; callers apply positions to their own render tree. No I/O, no
//! clocks, no rendering.
//!
//! # Example
//!
//! ```
//! use colonnade_layout::{ColumnAllocator, LayoutConfig};
//!
//! let config = LayoutConfig::new(250.0).gutter(10.0).outside_gutter(20.0);
//! let mut alloc = ColumnAllocator::new(config, 1060.0)?;
//!
//! assert_eq!(alloc.column_count(), 3);
//! let pos = alloc.next_position(100.0);
//! assert_eq!(pos.column, 0);
//! assert_eq!(pos.top, 10.0);
//! # Ok::<(), colonnade_layout::ConfigError>(())
//! ```

pub mod overlay;

use std::fmt;

pub use overlay::{OverlayMeasure, OverlayOffsets, offsets_for_overlay};

/// Errors from invalid [`LayoutConfig`] values.
///
/// Raised synchronously at construction and fatal to the would-be allocator
/// instance; there is no recovery path other than fixing the config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// `item_width` must be a positive, finite pixel value.
    NonPositiveItemWidth(f32),
    /// `gutter` must be a non-negative, finite pixel value.
    NegativeGutter(f32),
    /// `outside_gutter` must be a non-negative, finite pixel value.
    NegativeOutsideGutter(f32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveItemWidth(got) => {
                write!(f, "item width must be positive and finite, got {got}")
            }
            Self::NegativeGutter(got) => {
                write!(f, "gutter must be non-negative and finite, got {got}")
            }
            Self::NegativeOutsideGutter(got) => {
                write!(f, "outside gutter must be non-negative and finite, got {got}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Immutable grid geometry, bound to one allocator lifetime.
///
/// All fields are CSS-style pixel values. Defaulting happens once here, at
/// construction: `outside_gutter` falls back to `gutter` when unset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    item_width: f32,
    gutter: f32,
    outside_gutter: Option<f32>,
    sidebar_reserved: bool,
}

impl LayoutConfig {
    /// Create a config for cells of the given pixel width, with no gutters
    /// and no sidebar reservation.
    pub fn new(item_width: f32) -> Self {
        Self {
            item_width,
            gutter: 0.0,
            outside_gutter: None,
            sidebar_reserved: false,
        }
    }

    /// Set the pixel gap between adjacent columns.
    #[must_use]
    pub fn gutter(mut self, gutter: f32) -> Self {
        self.gutter = gutter;
        self
    }

    /// Set the pixel margin reserved on the outer left/right edges of the
    /// whole grid. Defaults to the inner gutter when unset.
    #[must_use]
    pub fn outside_gutter(mut self, outside_gutter: f32) -> Self {
        self.outside_gutter = Some(outside_gutter);
        self
    }

    /// Reserve column 0 for a persistent side panel.
    ///
    /// Placement never targets column 0 while more than one column fits;
    /// when only one column fits the reservation is waived, since there is
    /// nowhere else to put items.
    #[must_use]
    pub fn sidebar_reserved(mut self, reserved: bool) -> Self {
        self.sidebar_reserved = reserved;
        self
    }

    /// Pixel width of one grid cell.
    #[inline]
    pub fn item_width(&self) -> f32 {
        self.item_width
    }

    /// Pixel gap between adjacent columns.
    #[inline]
    pub fn inner_gutter(&self) -> f32 {
        self.gutter
    }

    /// Pixel margin on the grid's outer edges.
    #[inline]
    pub fn edge_gutter(&self) -> f32 {
        self.outside_gutter.unwrap_or(self.gutter)
    }

    /// Whether column 0 is reserved for a side panel.
    #[inline]
    pub fn is_sidebar_reserved(&self) -> bool {
        self.sidebar_reserved
    }

    /// Combined width of a cell plus one inner gutter.
    #[inline]
    pub(crate) fn cell_width(&self) -> f32 {
        self.item_width + self.gutter
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.item_width.is_finite() && self.item_width > 0.0) {
            return Err(ConfigError::NonPositiveItemWidth(self.item_width));
        }
        if !(self.gutter.is_finite() && self.gutter >= 0.0) {
            return Err(ConfigError::NegativeGutter(self.gutter));
        }
        let edge = self.edge_gutter();
        if !(edge.is_finite() && edge >= 0.0) {
            return Err(ConfigError::NegativeOutsideGutter(edge));
        }
        Ok(())
    }
}

/// Where an item lands: absolute pixel offsets plus the chosen column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Absolute top offset in pixels.
    pub top: f32,
    /// Absolute left offset in pixels.
    pub left: f32,
    /// Zero-based column index the item was packed into.
    pub column: usize,
}

/// Layout metrics the caller needs to size the containing element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    /// Height of the tallest column, in pixels.
    pub list_height: f32,
    /// Current visual width of the grid, in pixels.
    pub list_width: f32,
    /// Number of columns currently fitting the viewport.
    pub column_count: usize,
    /// Items placed since the last reset.
    pub item_count: usize,
}

/// Mutable masonry column state: one running height per fitting column.
///
/// Each [`next_position`](Self::next_position) call extends exactly one
/// column (the shortest eligible one, ties to the lowest index) by the
/// item's height plus one gutter. [`reset`](Self::reset) recomputes the
/// column count from the stored viewport width and zeroes all state except
/// the config.
///
/// The allocator never reads a global viewport. Callers report width
/// changes through [`set_viewport_width`](Self::set_viewport_width) and
/// decide when a reset is warranted via
/// [`fits_in_window`](Self::fits_in_window), so rapid resize streams can be
/// coalesced upstream without reflowing on every pixel.
#[derive(Debug, Clone)]
pub struct ColumnAllocator {
    config: LayoutConfig,
    viewport_width: f32,
    columns: Vec<f32>,
    list_height: f32,
    list_width: f32,
    item_count: usize,
}

impl ColumnAllocator {
    /// Create an allocator for the given config and initial viewport width.
    ///
    /// Validates the config and performs the initial [`reset`](Self::reset).
    pub fn new(config: LayoutConfig, viewport_width: f32) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut alloc = Self {
            config,
            viewport_width,
            columns: Vec::new(),
            list_height: 0.0,
            list_width: 0.0,
            item_count: 0,
        };
        alloc.reset();
        Ok(alloc)
    }

    /// The immutable grid geometry this allocator was built with.
    #[inline]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// The viewport width the allocator last heard about.
    #[inline]
    pub fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    /// Record a new viewport width.
    ///
    /// Does not touch column state; callers check
    /// [`fits_in_window`](Self::fits_in_window) and reset when the fitted
    /// column count actually changed.
    pub fn set_viewport_width(&mut self, width: f32) {
        self.viewport_width = width;
    }

    /// Number of columns that fit the current viewport, clamped to at
    /// least 1.
    ///
    /// The inner gutter sits only between columns, never on the outer left
    /// or right edge of the group; the outside gutter is subtracted from
    /// both edges up front.
    pub fn column_count(&self) -> usize {
        let usable = self.viewport_width - 2.0 * self.config.edge_gutter();
        let n = (usable / self.config.cell_width()).floor();
        if n.is_finite() && n >= 1.0 { n as usize } else { 1 }
    }

    /// Reinitialize column state for the current viewport.
    ///
    /// Column heights become all-zero with length [`column_count`]
    /// (recomputed), and `item_count`, `list_width`, and `list_height` are
    /// zeroed. The config survives. Idempotent: resetting twice with no
    /// placements in between is a no-op after the first call.
    ///
    /// [`column_count`]: Self::column_count
    pub fn reset(&mut self) {
        let n = self.column_count();
        self.columns.clear();
        self.columns.resize(n, 0.0);
        self.list_height = 0.0;
        self.list_width = 0.0;
        self.item_count = 0;
    }

    /// Reset, then seed per-column starting heights from `offsets`.
    ///
    /// This is the hook for the [`overlay`] exclusion-zone extension: items
    /// packed into a seeded column start below the overlay occupying its
    /// top. Offsets shorter than the column count leave the remaining
    /// columns at zero; longer ones are truncated. Negative entries clamp
    /// to zero.
    ///
    /// Seeds are placement state, not content: `list_height` stays zero
    /// until an item actually lands.
    pub fn reset_with_offsets(&mut self, offsets: &[f32]) {
        self.reset();
        for (column, offset) in self.columns.iter_mut().zip(offsets) {
            *column = offset.max(0.0);
        }
    }

    /// True iff the viewport still fits exactly the columns laid out at the
    /// last reset.
    ///
    /// Lets callers detect "the window grew or shrank enough that the
    /// column count changed" without resetting on every resize event.
    #[inline]
    pub fn fits_in_window(&self) -> bool {
        self.column_count() == self.columns.len()
    }

    /// Decide where the next item of the given rendered height lands.
    ///
    /// Picks the shortest eligible column (ties to the lowest index),
    /// reserving column 0 when the config asks for a sidebar and more than
    /// one column fits. Extends that column by `item_height` plus one
    /// gutter and returns the absolute pixel offsets for the caller to
    /// apply.
    pub fn next_position(&mut self, item_height: f32) -> Position {
        debug_assert!(
            item_height >= 0.0,
            "item height must be non-negative, got {item_height}"
        );
        if self.columns.is_empty() {
            // Degenerate viewport: clamp to a single column rather than
            // fail. column_count() never returns 0, so this only guards a
            // state that shouldn't be reachable.
            self.reset();
        }

        let gutter = self.config.inner_gutter();
        let first = usize::from(self.config.is_sidebar_reserved() && self.columns.len() > 1);

        // Filtered minimum over eligible indices; strict `<` keeps ties on
        // the lowest index.
        let mut column = first;
        for (i, height) in self.columns.iter().enumerate().skip(first + 1) {
            if *height < self.columns[column] {
                column = i;
            }
        }

        let top = self.columns[column] + gutter;
        let left = column as f32 * self.config.cell_width();
        self.columns[column] += item_height + gutter;

        if self.columns[column] > self.list_height {
            self.list_height = self.columns[column];
        }

        self.item_count += 1;
        if self.item_count <= self.columns.len() {
            // Width reflects min(items placed, columns) so a sparse first
            // page can be centered instead of stretching to the viewport.
            let used = self.item_count.min(self.columns.len());
            self.list_width = self.config.cell_width() * used as f32 - gutter;
        }

        Position { top, left, column }
    }

    /// Height of the tallest column, in pixels.
    ///
    /// Non-decreasing between resets.
    #[inline]
    pub fn list_height(&self) -> f32 {
        self.list_height
    }

    /// Current visual width of the grid, in pixels.
    #[inline]
    pub fn list_width(&self) -> f32 {
        self.list_width
    }

    /// Items placed since the last reset.
    #[inline]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// The running filled height of every column, left to right.
    #[inline]
    pub fn column_heights(&self) -> &[f32] {
        &self.columns
    }

    /// Snapshot of the metrics the caller needs to size the containing
    /// element.
    pub fn metrics(&self) -> LayoutMetrics {
        LayoutMetrics {
            list_height: self.list_height,
            list_width: self.list_width,
            column_count: self.columns.len(),
            item_count: self.item_count,
        }
    }
}
