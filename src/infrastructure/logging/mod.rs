//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - Pretty or JSON stderr output
//! - Optional rolling JSON log files
//! - Credential scrubbing for remote URLs and git output

pub mod credential_scrubbing;
pub mod logger;

pub use credential_scrubbing::{scrub_credentials, CredentialScrubber};
pub use logger::LoggerImpl;
