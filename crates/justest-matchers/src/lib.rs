// Iron Lotus: Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # justest-matchers
//!
//! Built-in matchers for the justest DSL.
//!
//! | Matcher | Passes when |
//! |---------|-------------|
//! | [`be_equal_to`] | every actual equals the expected value |
//! | [`be_greater_than`], [`be_less_than`], [`be_between`] | numeric bounds hold |
//! | [`be_nil`], [`be_empty`] | actuals are nil, or have length zero |
//! | [`say`] | text output matches a regular expression |
//! | [`succeed`], [`fail`] | the trailing error is absent, or present |
//! | [`not`] | the inner matcher fails |
//! | [`eventually`] | the inner matcher passes before a deadline |
//! | [`have_conditions`] | status conditions satisfy expectations |

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod condition;
pub mod equality;
pub mod eventually;
pub mod inversion;
pub mod ordering;
pub mod presence;
pub mod resolve;
pub mod success;
pub mod text;

pub use condition::{
    Condition, ConditionExpectation, ConditionParseError, ConditionStatus, HaveConditions,
    condition_equivalent, have_conditions, parse_conditions,
};
pub use equality::{Comparator, EqualTo, be_equal_to, diff_comparator, equal_to};
pub use eventually::{Eventually, eventually};
pub use inversion::{Not, not};
pub use ordering::{Ordered, be_between, be_greater_than, be_less_than};
pub use presence::{BeEmpty, BeNil, be_empty, be_nil};
pub use success::{Fail, Succeed, fail, succeed};
pub use text::{Say, say, say_regex};
