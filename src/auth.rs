//! Auth-domain identifiers, scope sets, credential inputs, and token results.

pub mod id;
pub mod scope;
pub mod token;

pub use id::*;
pub use scope::*;
pub use token::{credential::*, result::*, secret::*};
