//! Actix middleware applied to every route.
//!
//! [`Trace`] assigns each request a [`crate::TraceId`] and echoes it back in
//! the `trace-id` response header.

pub mod trace;

pub use trace::Trace;
