//! Contact form handling.
//!
//! This module turns a raw request body into a validated submission:
//!
//! ```text
//! body bytes → decode_form() → fields → ContactSubmission::from_fields() → ContactSubmission
//! ```

pub mod decoder;
pub mod submission;

pub use decoder::{decode_form, FormDecodeError};
pub use submission::{ContactSubmission, MissingFields, REQUIRED_FIELDS};
