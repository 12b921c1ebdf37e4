//! Contact submission validation.

use std::collections::HashMap;

use thiserror::Error;

/// Fields every submission must carry, in reporting order.
pub const REQUIRED_FIELDS: [&str; 3] = ["name", "email", "message"];

/// A validated contact form submission.
///
/// All three fields are non-empty. `email` is taken as typed; it is only
/// used as a reply-to address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Required fields that were absent or empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required fields: {}", .0.join(", "))]
pub struct MissingFields(pub Vec<&'static str>);

impl MissingFields {
    pub fn fields(&self) -> &[&'static str] {
        &self.0
    }
}

impl ContactSubmission {
    /// Validate decoded form fields.
    ///
    /// A key that is absent and a key whose value is empty both count as
    /// missing.
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, MissingFields> {
        let present = |key: &str| fields.get(key).filter(|v| !v.is_empty());

        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|key| present(*key).is_none())
            .collect();

        match (present("name"), present("email"), present("message")) {
            (Some(name), Some(email), Some(message)) => Ok(ContactSubmission {
                name: name.clone(),
                email: email.clone(),
                message: message.clone(),
            }),
            _ => Err(MissingFields(missing)),
        }
    }
}
