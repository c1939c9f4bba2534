#![forbid(unsafe_code)]

//! Incremental list orchestration for colonnade masonry grids.
//!
//! This crate sits between a paginated result source and a
//! [`colonnade_layout::ColumnAllocator`]:
//!
//! - [`ListController`] - the per-view state machine: fetch gating, epoch
//!   tracking, item mounting, and resize-triggered relayout
//! - [`Debouncer`] - fixed-delay, latest-wins coalescing for resize and
//!   scroll bursts
//!
//! The controller performs no I/O itself. It emits [`FetchRequest`] values
//! for the host to execute and consumes the outcomes, discarding any
//! completion whose filter context has been superseded. All internal
//! activity is reported through `tracing` at debug/trace level.

pub mod controller;
pub mod debounce;

pub use controller::{
    FetchError, FetchOutcome, FetchRequest, ListController, Page, Phase, RESIZE_DEBOUNCE,
    SCROLL_DEBOUNCE, Tick,
};
pub use debounce::Debouncer;
