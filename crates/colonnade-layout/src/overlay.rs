#![forbid(unsafe_code)]

//! Exclusion-zone extension: flow the grid around an overlay widget.
//!
//! Some hosts pin a widget (a category selector, a filter rail) over the
//! top of the grid's leading columns. This module computes per-column
//! starting offsets so items pack *below* the overlay instead of under it,
//! and suggests a widened overlay width snapped to the nearest cell border
//! so the overlay's right edge lines up with the grid.
//!
//! This is deliberately an extension, not part of the core placement rule:
//! feed the returned offsets to
//! [`ColumnAllocator::reset_with_offsets`](crate::ColumnAllocator::reset_with_offsets)
//! before replaying items. The coverage heuristics are kept exactly as the
//! host application stated them (minimum two covered columns on multi-column
//! grids, odd remainders extend the covered run by one) and are not
//! tightened here.
//!
//! Applying [`OverlayOffsets::suggested_width`] can change the overlay's
//! own rendered height. Re-measurement is host-driven: re-measure the
//! overlay and call [`offsets_for_overlay`] again until the height settles.
//! There is no internal fixpoint loop.

use crate::ColumnAllocator;

/// Measured geometry of the overlay widget, reported by the host after
/// render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayMeasure {
    /// Rendered width of the overlay's content, in pixels.
    pub width: f32,
    /// Rendered height of the overlay's outer box, in pixels.
    pub height: f32,
}

/// Result of an overlay offset computation.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayOffsets {
    /// Per-column starting heights, left to right. Zero entries are
    /// uncovered columns flanking the overlay.
    pub offsets: Vec<f32>,
    /// Overlay width grown to the nearest cell border (capped by the
    /// viewport minus the outside gutters), or `None` on single-column
    /// grids where the overlay should keep its natural width.
    pub suggested_width: Option<f32>,
}

/// Compute which columns the overlay covers and how to distribute the
/// uncovered ones.
///
/// Coverage rule: the overlay covers
/// `max(ceil(width / cell), min(occupied_columns, 2))` columns, where
/// `occupied_columns` is capped by items actually placed (a sparse grid
/// narrower than the viewport centers, so coverage follows the visual
/// width, not the fitted width). With a reserved sidebar and a sparse
/// grid, one extra column is counted to account for the unused sidebar
/// lane. When the uncovered remainder is odd, the covered run extends by
/// one so the flanks split evenly. Width-derived coverage is capped at the
/// fitted column count; a non-finite width contributes no coverage.
pub fn offsets_for_overlay(alloc: &ColumnAllocator, overlay: OverlayMeasure) -> OverlayOffsets {
    let config = alloc.config();
    let cell = config.item_width() + config.inner_gutter();

    let fitted = alloc.column_heights().len();
    let mut columns = fitted.min(alloc.item_count());
    if config.is_sidebar_reserved() && columns < fitted && columns > 1 {
        columns += 1;
    }

    // Coverage beyond the fitted columns is meaningless (the seed vector
    // gets truncated to the column count anyway), so the cap also keeps a
    // bogus measure — runaway or non-finite width — from sizing a huge
    // vector.
    let by_width = (overlay.width / cell).ceil();
    let by_width = if by_width.is_finite() && by_width > 0.0 {
        (by_width as usize).min(fitted)
    } else {
        0
    };
    let mut covered = by_width.max(columns.min(2));
    let mut offsets = vec![overlay.height; covered];

    let mut uncovered = columns.saturating_sub(covered);
    if uncovered % 2 != 0 {
        // Odd remainder: widen the covered run so the flanks match.
        uncovered -= 1;
        offsets.push(overlay.height);
        covered += 1;
    }

    let flank = uncovered / 2;
    for _ in 0..flank {
        offsets.insert(0, 0.0);
        offsets.push(0.0);
    }

    let suggested_width = if columns > 1 {
        let snapped = covered as f32 * cell - config.inner_gutter();
        let max = alloc.viewport_width() - 2.0 * config.edge_gutter();
        Some(snapped.min(max))
    } else {
        None
    };

    OverlayOffsets {
        offsets,
        suggested_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LayoutConfig;

    // 5 fitted columns: floor((1340 - 40) / 260) = 5.
    fn five_column_alloc(items: usize) -> ColumnAllocator {
        let config = LayoutConfig::new(250.0).gutter(10.0).outside_gutter(20.0);
        let mut alloc = ColumnAllocator::new(config, 1340.0).unwrap();
        for _ in 0..items {
            alloc.next_position(100.0);
        }
        alloc
    }

    #[test]
    fn narrow_overlay_covers_two_columns_minimum() {
        let alloc = five_column_alloc(5);
        let out = offsets_for_overlay(
            &alloc,
            OverlayMeasure {
                width: 120.0,
                height: 64.0,
            },
        );
        // ceil(120/260) = 1, bumped to the 2-column minimum; 3 uncovered is
        // odd, so coverage extends to 3 and one zero flanks each side.
        assert_eq!(out.offsets, vec![0.0, 64.0, 64.0, 64.0, 0.0]);
    }

    #[test]
    fn wide_overlay_covers_by_width() {
        let alloc = five_column_alloc(5);
        let out = offsets_for_overlay(
            &alloc,
            OverlayMeasure {
                width: 700.0,
                height: 40.0,
            },
        );
        // ceil(700/260) = 3 covered, 2 uncovered split one per side.
        assert_eq!(out.offsets, vec![0.0, 40.0, 40.0, 40.0, 0.0]);
    }

    #[test]
    fn even_remainder_splits_without_extension() {
        let mut alloc = five_column_alloc(0);
        alloc.set_viewport_width(1080.0); // floor((1080-40)/260) = 4
        alloc.reset();
        for _ in 0..4 {
            alloc.next_position(100.0);
        }
        let out = offsets_for_overlay(
            &alloc,
            OverlayMeasure {
                width: 120.0,
                height: 50.0,
            },
        );
        assert_eq!(out.offsets, vec![0.0, 50.0, 50.0, 0.0]);
    }

    #[test]
    fn sparse_grid_caps_coverage_at_item_count() {
        let alloc = five_column_alloc(2);
        let out = offsets_for_overlay(
            &alloc,
            OverlayMeasure {
                width: 120.0,
                height: 30.0,
            },
        );
        assert_eq!(out.offsets, vec![30.0, 30.0]);
    }

    #[test]
    fn sidebar_counts_an_extra_column_when_sparse() {
        let config = LayoutConfig::new(250.0)
            .gutter(10.0)
            .outside_gutter(20.0)
            .sidebar_reserved(true);
        let mut alloc = ColumnAllocator::new(config, 1340.0).unwrap();
        for _ in 0..3 {
            alloc.next_position(100.0);
        }
        let out = offsets_for_overlay(
            &alloc,
            OverlayMeasure {
                width: 120.0,
                height: 30.0,
            },
        );
        // 3 items on 5 fitted columns, plus one for the sidebar lane = 4
        // occupied; 2 covered, flanks split one per side.
        assert_eq!(out.offsets, vec![0.0, 30.0, 30.0, 0.0]);
    }

    #[test]
    fn single_column_grid_keeps_natural_width() {
        let config = LayoutConfig::new(250.0).gutter(10.0);
        let mut alloc = ColumnAllocator::new(config, 260.0).unwrap();
        alloc.next_position(80.0);
        let out = offsets_for_overlay(
            &alloc,
            OverlayMeasure {
                width: 200.0,
                height: 44.0,
            },
        );
        assert_eq!(out.suggested_width, None);
        assert_eq!(out.offsets, vec![44.0]);
    }

    #[test]
    fn suggested_width_snaps_to_cell_border() {
        let alloc = five_column_alloc(5);
        let out = offsets_for_overlay(
            &alloc,
            OverlayMeasure {
                width: 700.0,
                height: 40.0,
            },
        );
        // 3 covered columns: 3*260 - 10.
        assert_eq!(out.suggested_width, Some(770.0));
    }

    #[test]
    fn oversized_overlay_caps_coverage_at_fitted_columns() {
        let alloc = five_column_alloc(5);
        let out = offsets_for_overlay(
            &alloc,
            OverlayMeasure {
                width: 5000.0,
                height: 40.0,
            },
        );
        // ceil(5000/260) = 20, capped at the 5 fitted columns; suggested
        // width snaps to the full grid: 5*260 - 10.
        assert_eq!(out.offsets, vec![40.0; 5]);
        assert_eq!(out.suggested_width, Some(1290.0));
    }

    #[test]
    fn overlay_wider_than_grid_still_terminates() {
        let alloc = five_column_alloc(3);
        let out = offsets_for_overlay(
            &alloc,
            OverlayMeasure {
                width: 5000.0,
                height: 40.0,
            },
        );
        assert_eq!(out.offsets, vec![40.0; 5]);
    }

    #[test]
    fn runaway_overlay_width_stays_bounded() {
        let alloc = five_column_alloc(5);
        for width in [1.0e9, f32::MAX] {
            let out = offsets_for_overlay(
                &alloc,
                OverlayMeasure {
                    width,
                    height: 40.0,
                },
            );
            assert_eq!(out.offsets, vec![40.0; 5]);
            assert_eq!(out.suggested_width, Some(1290.0));
        }
    }

    #[test]
    fn non_finite_overlay_width_falls_back_to_minimum_coverage() {
        let alloc = five_column_alloc(5);
        for width in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let out = offsets_for_overlay(
                &alloc,
                OverlayMeasure {
                    width,
                    height: 64.0,
                },
            );
            // Same as a narrow overlay: 2-column minimum, extended to 3 for
            // the odd remainder, one zero flank each side.
            assert_eq!(out.offsets, vec![0.0, 64.0, 64.0, 64.0, 0.0]);
        }
    }
}
