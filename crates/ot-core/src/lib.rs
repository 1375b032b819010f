//! # ot-core: Document Model and Normalizer for OpenTrials Records
//!
//! Records returned by the OpenTrials API use `snake_case` keys and carry
//! timestamps as plain strings. This crate turns such a record into a
//! uniform shape: `camelCase` keys everywhere and real date values at the
//! leaves whose key marks them as a date.
//!
//! ## Key Design Principles
//!
//! 1. **Closed document model.** [`Document`] is an exhaustive tagged union
//!    over JSON shapes plus a `Date` leaf. Every traversal is a `match`, not
//!    a duck-typed probe.
//!
//! 2. **Shape preservation.** Normalization never adds or drops a field and
//!    never reorders a mapping. Only keys are renamed and leaves replaced.
//!
//! 3. **Lenient dates.** An unparseable timestamp becomes
//!    [`DateValue::Invalid`] instead of an error, so one malformed field
//!    never fails a whole record.
//!
//! 4. **Explicit configuration.** [`TidyConfig`] is an immutable value merged
//!    from defaults and a per-call [`TidyOverride`]. Nothing is read from
//!    process-wide state.
//!
//! ## Crate Policy
//!
//! - No I/O. Fetching and population live in `ot-client`.
//! - No `.unwrap()` outside tests.

pub mod casing;
pub mod config;
pub mod document;
pub mod error;
pub mod normalize;
pub mod temporal;

pub use casing::camel_case;
pub use config::{DateKey, TidyConfig, TidyOverride};
pub use document::{DateValue, Document, Mapping};
pub use error::CoreError;
pub use normalize::normalize;
pub use temporal::parse_date;
