//! Caller-side helpers around the core: bearer signing for partner API calls and per-tenant
//! single-flight guards.

pub mod request_signer;
pub mod single_flight;

pub use request_signer::*;
pub use single_flight::*;
