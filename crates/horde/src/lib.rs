//! Client for a Stable Horde-style asynchronous generation provider.
//!
//! The workflow has three parts, mirroring the life of a job:
//!
//! 1. [`submit`] -- submit a request against an ordered list of model-name
//!    fallback groups until one is accepted.
//! 2. [`poll`] -- drive the status state machine on a fixed interval under
//!    a bounded attempt budget.
//! 3. The caller resolves the terminal [`poll::PollOutcome`] to an
//!    HTTP-visible result.

pub mod api;
pub mod config;
pub mod payload;
pub mod poll;
pub mod submit;
