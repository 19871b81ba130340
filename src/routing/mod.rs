//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path below /prx)
//!     → router.rs (take first segment as service name)
//!     → registry.rs (service name → scheme + authority)
//!     → Rewritten request, or unresolved request + RoutingError
//!
//! Registry construction (at startup):
//!     ServiceConfig[]
//!     → Parse scheme and authority
//!     → Freeze as immutable ServiceRegistry
//! ```
//!
//! # Design Decisions
//! - Registry built at startup, immutable at runtime
//! - Deterministic: same path always resolves to the same target
//! - Unresolved requests are not rejected here; they fail at the transport

pub mod registry;
pub mod router;

pub use registry::{RegistryError, ServiceRegistry, ServiceTarget};
pub use router::{ResolvedService, RoutingError, ServiceRouter};
