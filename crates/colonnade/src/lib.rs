#![forbid(unsafe_code)]

//! Colonnade public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users. It
//! re-exports the common types from the internal crates and offers the
//! attach-style [`AllocatorHandle`] used by view layers that only need
//! placement and metrics.
//!
//! # Example
//!
//! ```
//! let config = colonnade::LayoutConfig::new(250.0)
//!     .gutter(10.0)
//!     .outside_gutter(20.0);
//! let mut grid = colonnade::attach(config, 1060.0)?;
//!
//! let placement = grid.place(120.0);
//! assert_eq!(placement.top, 10.0);
//! assert_eq!(grid.metrics().column_count, 3);
//! # Ok::<(), colonnade::ConfigError>(())
//! ```

// --- Layout re-exports ------------------------------------------------------

pub use colonnade_layout::{
    ColumnAllocator, ConfigError, LayoutConfig, LayoutMetrics, Position, overlay,
    overlay::{OverlayMeasure, OverlayOffsets, offsets_for_overlay},
};

// --- List re-exports --------------------------------------------------------

pub use colonnade_list::{
    Debouncer, FetchError, FetchOutcome, FetchRequest, ListController, Page, Phase, Tick,
};

/// Pixel offsets handed to the view layer.
///
/// The outward contract deliberately omits the column index; view layers
/// position elements absolutely and never need it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Absolute top offset in pixels.
    pub top: f32,
    /// Absolute left offset in pixels.
    pub left: f32,
}

impl From<Position> for Placement {
    fn from(position: Position) -> Self {
        Self {
            top: position.top,
            left: position.left,
        }
    }
}

/// Attach a masonry grid to a container of the given viewport width.
///
/// Validates the config and returns a handle bound to it for the handle's
/// lifetime. Invalid geometry (non-positive item width, negative gutters)
/// fails here, synchronously, and the caller must fix the config.
pub fn attach(config: LayoutConfig, viewport_width: f32) -> Result<AllocatorHandle, ConfigError> {
    Ok(AllocatorHandle {
        inner: ColumnAllocator::new(config, viewport_width)?,
    })
}

/// Minimal placement surface for view layers.
///
/// Wraps a [`ColumnAllocator`] and narrows its API to the four operations a
/// template/render layer needs: place, reset, metrics, and the
/// viewport/refit pair driving resize handling. Hosts that need the full
/// controller use [`ListController`] directly.
#[derive(Debug, Clone)]
pub struct AllocatorHandle {
    inner: ColumnAllocator,
}

impl AllocatorHandle {
    /// Place the next item of the given rendered height.
    pub fn place(&mut self, rendered_height: f32) -> Placement {
        self.inner.next_position(rendered_height).into()
    }

    /// Discard all placements and refit the column count to the current
    /// viewport.
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Sizing metrics for the containing element.
    pub fn metrics(&self) -> LayoutMetrics {
        self.inner.metrics()
    }

    /// Report a viewport width change.
    pub fn set_viewport_width(&mut self, width: f32) {
        self.inner.set_viewport_width(width);
    }

    /// Whether the columns laid out at the last reset still fit the
    /// viewport.
    pub fn fits_in_window(&self) -> bool {
        self.inner.fits_in_window()
    }

    /// Borrow the underlying allocator.
    pub fn allocator(&self) -> &ColumnAllocator {
        &self.inner
    }

    /// Take the underlying allocator, e.g. to hand it to a
    /// [`ListController`].
    pub fn into_allocator(self) -> ColumnAllocator {
        self.inner
    }
}
