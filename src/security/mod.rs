//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Proxied request:
//!     → identity.rs (resolve session identity, set user_id header)
//!     → headers.rs (strip hop-by-hop, add X-Forwarded-For)
//!     → Pass to transport
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any session verification failure
//! - No trust in client input: the identity header is always overwritten

pub mod headers;
pub mod identity;

pub use identity::{AccessMode, Authorizer, IdentityResolver, IDENTITY_HEADER};
