//! Shared-secret HMAC signatures on inbound partner traffic.
//!
//! Every signed page load and webhook carries a `t=<unix-seconds>,v1=<hex>` string. The `v1`
//! value is `hex(HMAC-SHA256(secret, canonical_json(payload) + "." + t))`, where `t` is the raw
//! timestamp text exactly as received. Verification is a pure function of the header, payload,
//! secret, and the instant passed in.

pub mod canonical;
pub mod header;
pub mod verifier;

pub use canonical::*;
pub use header::*;
pub use verifier::*;
