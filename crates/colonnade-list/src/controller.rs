#![forbid(unsafe_code)]

//! Incremental list controller.
//!
//! [`ListController`] bridges a paginated result source with a
//! [`ColumnAllocator`]: it decides when to request more data (scroll
//! triggers), when to discard and refetch (filter changes), and when to
//! recompute positions without refetching (viewport resizes that change the
//! fitted column count).
//!
//! # Fetch model
//!
//! The controller owns no executor and performs no I/O. It issues
//! [`FetchRequest`] values describing the page the host must load; the host
//! performs the call however it likes and hands the outcome back through
//! [`ListController::complete_fetch`]. Each request is stamped with the
//! epoch current at issue time, so a completion that arrives after a filter
//! change is recognized as stale and silently discarded — it never touches
//! the allocator or the item list.
//!
//! # Lifecycle
//!
//! ```text
//! Idle --load_initial--> Loading --page--> Populating --mounts--> Settled
//! Settled --scroll, !eof--> Loading            (short page -> Eof)
//! Settled --filter change--> Loading           (items discarded, epoch+1)
//! Settled --resize, !fits--> Settled           (relayout, no refetch)
//! Loading --failure--> Failed --retry--> Loading
//! ```
//!
//! Everything is single-threaded and synchronous; the only "async" parts
//! are the host's fetches and the debounce deadlines, which the host drives
//! by calling [`ListController::tick_at`].

use std::fmt;
use std::time::{Duration, Instant};

use colonnade_layout::{ColumnAllocator, LayoutMetrics, Position};
use tracing::{debug, trace};

use crate::debounce::Debouncer;

/// Quiet period for coalescing window resize bursts.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(50);
/// Quiet period for coalescing scroll-near-bottom triggers.
pub const SCROLL_DEBOUNCE: Duration = Duration::from_millis(100);

/// Opaque failure from the fetch collaborator.
///
/// The message is surfaced to the user verbatim; the controller attaches no
/// interpretation and never retries on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    message: String,
}

impl FetchError {
    /// Wrap a collaborator error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The verbatim collaborator message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FetchError {}

/// A page fetch the host must perform on the controller's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    /// Filter-context epoch captured at issue time.
    pub epoch: u64,
    /// Index of the first item requested.
    pub from: usize,
    /// Maximum number of items requested.
    pub limit: usize,
}

/// One page of results from the collaborator.
#[derive(Debug, Clone)]
pub struct Page<T> {
    items: Vec<T>,
    eof: Option<bool>,
}

impl<T> Page<T> {
    /// A page with EOF inferred: fewer items than requested means the
    /// result set is exhausted.
    pub fn new(items: Vec<T>) -> Self {
        Self { items, eof: None }
    }

    /// Override the inferred EOF marker with an explicit one.
    #[must_use]
    pub fn eof(mut self, eof: bool) -> Self {
        self.eof = Some(eof);
        self
    }
}

/// Lifecycle phase of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No fetch issued yet for the current filter context.
    Idle,
    /// A page fetch is in flight.
    Loading,
    /// Items appended, awaiting rendered-height reports from the host.
    Populating,
    /// All received items are measured and placed; more pages may exist.
    Settled,
    /// Settled, and the result set is exhausted.
    Eof,
    /// The last fetch failed; waiting for an explicit retry.
    Failed,
}

/// Result of handing a fetch completion back to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Page accepted: this many items appended, with the resulting EOF
    /// marker.
    Appended {
        /// Items appended from this page.
        count: usize,
        /// Whether this page exhausted the result set.
        eof: bool,
    },
    /// The fetch failed; the error is recorded and no layout state changed.
    Failed,
    /// The completion belonged to a superseded context and was discarded.
    Stale,
}

/// Work produced by a [`ListController::tick_at`] poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tick {
    /// A page fetch the host must start, if a scroll trigger became due.
    pub fetch: Option<FetchRequest>,
    /// Recomputed `(index, position)` pairs, if a settled resize changed
    /// the fitted column count. Empty when no relayout happened.
    pub relayout: Vec<(usize, Position)>,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    item: T,
    height: Option<f32>,
    position: Option<Position>,
}

/// Orchestrates incremental fetch, placement, and relayout for one list
/// view.
///
/// Generic over the opaque item payload `T` (the controller only ever
/// cares about an item's rendered pixel height) and the opaque filter
/// payload `Q` handed back to the host alongside each fetch.
///
/// Each list view owns one controller, one allocator, and one epoch
/// counter; multiple lists on a page are fully independent.
#[derive(Debug)]
pub struct ListController<T, Q> {
    allocator: ColumnAllocator,
    query: Q,
    page_size: usize,
    phase: Phase,
    epoch: u64,
    eof: bool,
    in_flight: Option<FetchRequest>,
    last_error: Option<FetchError>,
    items: Vec<Slot<T>>,
    /// Number of leading slots that have been placed; slots are only ever
    /// placed in arrival order.
    placed: usize,
    resize: Debouncer,
    scroll: Debouncer,
    pending_viewport: Option<f32>,
}

impl<T, Q> ListController<T, Q> {
    /// Create a controller around an allocator, an initial filter payload,
    /// and the page size to request from the collaborator.
    pub fn new(allocator: ColumnAllocator, query: Q, page_size: usize) -> Self {
        Self {
            allocator,
            query,
            page_size,
            phase: Phase::Idle,
            epoch: 0,
            eof: false,
            in_flight: None,
            last_error: None,
            items: Vec::new(),
            placed: 0,
            resize: Debouncer::new(RESIZE_DEBOUNCE),
            scroll: Debouncer::new(SCROLL_DEBOUNCE),
            pending_viewport: None,
        }
    }

    /// Override the resize quiet period.
    #[must_use]
    pub fn resize_debounce(mut self, delay: Duration) -> Self {
        self.resize = Debouncer::new(delay);
        self
    }

    /// Override the scroll quiet period.
    #[must_use]
    pub fn scroll_debounce(mut self, delay: Duration) -> Self {
        self.scroll = Debouncer::new(delay);
        self
    }

    /// Current lifecycle phase.
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current filter-context epoch.
    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The active filter payload.
    #[inline]
    pub fn query(&self) -> &Q {
        &self.query
    }

    /// Number of items currently held (measured or not).
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the controller holds no items.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The items in arrival order.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.items.iter().map(|slot| &slot.item)
    }

    /// The placed position of an item, if it has been measured and placed.
    pub fn position(&self, index: usize) -> Option<Position> {
        self.items.get(index).and_then(|slot| slot.position)
    }

    /// The error from the last failed fetch, if the controller is waiting
    /// for a retry.
    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    /// Shared view of the allocator (metrics, column heights).
    #[inline]
    pub fn allocator(&self) -> &ColumnAllocator {
        &self.allocator
    }

    /// Mutable allocator access, for hosts applying the overlay extension
    /// before a relayout.
    #[inline]
    pub fn allocator_mut(&mut self) -> &mut ColumnAllocator {
        &mut self.allocator
    }

    /// Layout metrics passthrough.
    pub fn metrics(&self) -> LayoutMetrics {
        self.allocator.metrics()
    }

    /// Issue the first page fetch for the current filter context.
    ///
    /// Returns `None` unless the controller is idle.
    pub fn load_initial(&mut self) -> Option<FetchRequest> {
        if self.phase != Phase::Idle {
            return None;
        }
        Some(self.issue(0))
    }

    /// Discard all items, advance the epoch, reset the allocator, and issue
    /// a fresh initial fetch.
    ///
    /// Any in-flight fetch keeps running on the host side; its completion
    /// will carry the old epoch and be discarded. A pending scroll trigger
    /// is cancelled (it referred to the discarded list); a pending resize
    /// stays pending, since the viewport change outlives the filter.
    pub fn change_filter(&mut self, query: Q) -> FetchRequest {
        self.epoch += 1;
        debug!(epoch = self.epoch, "filter changed, discarding result list");
        self.query = query;
        self.items.clear();
        self.placed = 0;
        self.eof = false;
        self.in_flight = None;
        self.last_error = None;
        self.scroll.cancel();
        self.allocator.reset();
        self.phase = Phase::Idle;
        self.issue(0)
    }

    /// Re-issue the failed fetch after a human-triggered retry.
    ///
    /// Returns `None` unless the controller is in [`Phase::Failed`].
    pub fn retry(&mut self) -> Option<FetchRequest> {
        if self.phase != Phase::Failed {
            return None;
        }
        Some(self.issue(self.items.len()))
    }

    /// Hand a fetch outcome back to the controller.
    ///
    /// Completions for superseded requests (filter changed while the fetch
    /// was in flight) are discarded without touching any state. Failures
    /// record the error verbatim and leave the layout untouched.
    pub fn complete_fetch(
        &mut self,
        request: FetchRequest,
        result: Result<Page<T>, FetchError>,
    ) -> FetchOutcome {
        if self.in_flight != Some(request) {
            debug!(
                stale_epoch = request.epoch,
                current_epoch = self.epoch,
                "discarding stale fetch completion"
            );
            return FetchOutcome::Stale;
        }
        self.in_flight = None;

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                debug!(error = %err, "page fetch failed");
                self.last_error = Some(err);
                self.phase = Phase::Failed;
                return FetchOutcome::Failed;
            }
        };

        let count = page.items.len();
        self.eof = page.eof.unwrap_or(count < request.limit);
        trace!(count, eof = self.eof, "page appended");

        self.items.extend(page.items.into_iter().map(|item| Slot {
            item,
            height: None,
            position: None,
        }));

        self.phase = if count == 0 {
            self.settled_phase()
        } else {
            Phase::Populating
        };

        FetchOutcome::Appended {
            count,
            eof: self.eof,
        }
    }

    /// Report an item's rendered pixel height, measured by the host after
    /// mount.
    ///
    /// Items are placed into the allocator strictly in arrival order, so a
    /// height reported out of order is recorded and held until every
    /// earlier item has been measured. Returns the `(index, position)`
    /// pairs placed as a result of this report (possibly several, possibly
    /// none yet).
    pub fn item_mounted(&mut self, index: usize, height: f32) -> Vec<(usize, Position)> {
        let Some(slot) = self.items.get_mut(index) else {
            return Vec::new();
        };
        if slot.position.is_some() {
            // Already placed; re-measurement only happens through relayout.
            return Vec::new();
        }
        slot.height = Some(height);
        self.place_ready()
    }

    /// Record a scroll-near-bottom trigger at `now`.
    ///
    /// The trigger is debounced; the fetch (if any) is issued by the next
    /// [`tick_at`](Self::tick_at) after the quiet period.
    pub fn scroll_near_bottom(&mut self) {
        self.scroll_near_bottom_at(Instant::now());
    }

    /// Time-injected variant of [`scroll_near_bottom`](Self::scroll_near_bottom).
    pub fn scroll_near_bottom_at(&mut self, now: Instant) {
        self.scroll.trigger_at(now);
    }

    /// Record a viewport width change at `now`.
    ///
    /// Latest-wins: only the width from the most recent event in a burst is
    /// applied, by the next [`tick_at`](Self::tick_at) after the quiet
    /// period.
    pub fn viewport_resized(&mut self, width: f32) {
        self.viewport_resized_at(width, Instant::now());
    }

    /// Time-injected variant of [`viewport_resized`](Self::viewport_resized).
    pub fn viewport_resized_at(&mut self, width: f32, now: Instant) {
        self.pending_viewport = Some(width);
        self.resize.trigger_at(now);
    }

    /// Poll debounce deadlines now.
    pub fn tick(&mut self) -> Tick {
        self.tick_at(Instant::now())
    }

    /// Poll debounce deadlines at `now`, producing any due work.
    ///
    /// A settled resize applies the most recent viewport width and, only if
    /// the fitted column count actually changed, resets the allocator and
    /// replays every measured item in arrival order — positions are
    /// recomputed, the data is kept. A settled scroll trigger issues the
    /// next page fetch unless one is already in flight, the list is empty,
    /// or the result set is exhausted.
    pub fn tick_at(&mut self, now: Instant) -> Tick {
        let mut tick = Tick::default();

        if self.resize.poll_at(now) {
            if let Some(width) = self.pending_viewport.take() {
                self.allocator.set_viewport_width(width);
            }
            if !self.allocator.fits_in_window() {
                tick.relayout = self.relayout();
            }
        }

        if self.scroll.poll_at(now) {
            tick.fetch = self.next_page();
        }

        tick
    }

    /// Earliest pending debounce deadline, for hosts that schedule their
    /// next poll instead of polling every frame.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        match (
            self.resize.time_until_fire(now),
            self.scroll.time_until_fire(now),
        ) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Drop all pending debounce triggers, e.g. when the list view is
    /// detached.
    pub fn cancel_timers(&mut self) {
        self.resize.cancel();
        self.scroll.cancel();
        self.pending_viewport = None;
    }

    fn issue(&mut self, from: usize) -> FetchRequest {
        let request = FetchRequest {
            epoch: self.epoch,
            from,
            limit: self.page_size,
        };
        debug!(
            epoch = request.epoch,
            from = request.from,
            limit = request.limit,
            "issuing page fetch"
        );
        self.in_flight = Some(request);
        self.last_error = None;
        self.phase = Phase::Loading;
        request
    }

    fn next_page(&mut self) -> Option<FetchRequest> {
        // Mirrors the gating at the trigger site: a list that never loaded,
        // is still loading or populating, already failed, or has reached
        // EOF does not fetch again.
        if self.phase != Phase::Settled || self.in_flight.is_some() || self.items.is_empty() {
            return None;
        }
        Some(self.issue(self.items.len()))
    }

    fn settled_phase(&self) -> Phase {
        if self.eof { Phase::Eof } else { Phase::Settled }
    }

    /// Place the longest measured prefix of unplaced slots, in order.
    fn place_ready(&mut self) -> Vec<(usize, Position)> {
        let mut placed = Vec::new();
        while let Some(slot) = self.items.get_mut(self.placed) {
            let Some(height) = slot.height else { break };
            let position = self.allocator.next_position(height);
            slot.position = Some(position);
            placed.push((self.placed, position));
            self.placed += 1;
        }
        if self.phase == Phase::Populating && self.placed == self.items.len() {
            self.phase = self.settled_phase();
        }
        placed
    }

    fn relayout(&mut self) -> Vec<(usize, Position)> {
        self.allocator.reset();
        self.placed = 0;
        for slot in &mut self.items {
            slot.position = None;
        }
        let placed = self.place_ready();
        debug!(
            columns = self.allocator.column_count(),
            replayed = placed.len(),
            "relayout after column-count change"
        );
        placed
    }
}
