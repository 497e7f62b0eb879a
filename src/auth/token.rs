//! Token models: redacted secrets, caller-supplied credentials, and exchange results.

pub mod credential;
pub mod result;
pub mod secret;
