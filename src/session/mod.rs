//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! Request Cookie header
//!     → cookie.rs (verify signature, decode payload, check age)
//!     → Session (typed accessors over string-keyed values)
//!
//! Token exchange success:
//!     Session mutated → cookie.rs (encode, sign) → Set-Cookie on response
//! ```
//!
//! # Design Decisions
//! - Sessions live only for the request/response pair; nothing is kept server side
//! - Verification failures are errors, absent cookies are not

pub mod cookie;
pub mod store;

pub use cookie::CookieSessionStore;
pub use store::{Session, SessionError, SessionStore, NAME, USER_ID};
