//! Portfolio contact relay.
//!
//! Accepts contact form submissions over HTTP and forwards each one as an
//! email to a fixed recipient over authenticated SMTP, so a static site can
//! send mail without shipping credentials to the browser.
//!
//! ## Architecture
//!
//! ```text
//! POST /contact → decode_form → ContactSubmission → compose → Mailer::send → JSON response
//! ```

pub mod config;
pub mod form;
pub mod mail;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use form::{decode_form, ContactSubmission, MissingFields};
pub use mail::{compose, MailError, Mailer, OutboundMessage, SmtpMailer};
pub use web::{router, AppState, HandlerOutcome};
