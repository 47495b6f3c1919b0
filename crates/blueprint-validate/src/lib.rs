//! Validation on both sides of a submission.
//!
//! The server checks every resolved field and reports all messages per key.
//! Clients get a [`ValidationSchema`] built from the same fields and the same
//! rule evaluator, reporting the first failure per key.

mod client;
mod server;

pub use client::{Coercion, FieldRule, FirstErrors, ValidationSchema};
pub use server::{FieldErrors, validate_collection, validate_schema};
