// Iron Lotus: Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # justest-core
//!
//! Assertion and eventual-consistency primitives for reconciler tests.
//!
//! - [`T`] is the uniform test handle, with [`Root`], [`Child`], [`Inverse`],
//!   [`Retrying`] and [`MockT`] variants
//! - [`Value`] models actual values, [`ValueExtractor`] resolves them
//! - [`Matcher`] is the predicate contract
//! - [`eventual`] retries matchers with `within` and `for` semantics
//! - [`with`] starts the fluent DSL
//!
//! ## Example
//!
//! ```rust,ignore
//! use justest_core::{Root, with};
//! use std::time::Duration;
//!
//! let t = Root::new();
//! with(&t)
//!     .verify(Value::func(move || environment_status(&client)))
//!     .will(be_equal_to("Ready"))
//!     .within(Duration::from_secs(30), Duration::from_millis(500));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::significant_drop_tightening)]

pub mod config;
pub mod diagnostics;
pub mod dsl;
pub mod error;
pub mod eventual;
pub mod extract;
pub mod handle;
pub mod matcher;
pub mod value;

pub use config::{Config, DarkMode, InterruptSignal, config, configure};
pub use diagnostics::{Location, assert_not_interrupted};
pub use dsl::{Asserter, Assertion, Verifier, with};
pub use error::{JustestError, Result};
pub use eventual::Probe;
pub use extract::{
    ChannelExtractor, Extractor, FuncExtractor, PointerExtractor, ValueExtractor,
    extract_same_value, extractor_unsupported, extractor_value_len, numeric_extractor,
    numeric_ordering,
};
pub use handle::{Child, Cleanup, HandleId, HandleKind, Inverse, MockT, Retrying, Root, T, get_helper, root_of};
pub use matcher::Matcher;
pub use value::{Buffer, Channel, ChannelSender, Func, Kind, Pointer, Value};
