//! Failure attribution and reporting.
//!
//! - [`Location`]: nearest-user-frame resolution with source echo
//! - [`UnevaluatedRegistry`]: assertions built but never terminated
//! - [`Theme`]: light/dark snippet coloring
//! - [`interrupt`]: signal-driven cancellation flag

pub mod interrupt;
pub mod location;
pub mod source;
pub mod theme;
pub mod unevaluated;

pub use interrupt::{
    INTERRUPTED, InterruptFlag, assert_not_interrupted, assert_not_interrupted_by, interrupted,
};
pub use location::{
    Location, LocationKey, citation_block, cite_nearest, has_citation, is_harness_symbol,
};
pub use theme::Theme;
pub use unevaluated::{UNEVALUATED_HEADER, UnevaluatedRegistry};
