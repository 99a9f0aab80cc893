// Iron Lotus: Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # justest-test
//!
//! Simulated producers and the falsification suite for justest.
//!
//! This crate provides:
//! - **Converging resource**: a reconciled object whose `Ready` condition
//!   flips to `True` after a configurable number of reconciles
//! - **Controller**: a background thread reconciling a resource on a period
//! - **Flapping probe**: a health check that passes for a while, then fails
//! - **Falsification tests**: numbered tests that try to refute each claim
//!   the harness makes
//!
//! ## Example
//!
//! ```rust,ignore
//! use justest_core::{Root, Value, with};
//! use justest_matchers::{ConditionExpectation, ConditionStatus, have_conditions};
//! use justest_test::{Controller, ConvergingResource};
//!
//! let t = Root::new();
//! let resource = ConvergingResource::new("preview-env", 3);
//! let _controller = Controller::spawn(resource.clone(), Duration::from_millis(20))?;
//! with(&t)
//!     .verify(resource.status_func())
//!     .will(have_conditions(vec![
//!         ConditionExpectation::new("Ready").status(ConditionStatus::True),
//!     ]))
//!     .within(Duration::from_secs(2), Duration::from_millis(50));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod probe;
pub mod resource;

pub use error::{ReconcileError, Result};
pub use probe::FlappingProbe;
pub use resource::{Controller, ConvergingResource, ResourceStatus};
