//! Session handling.
//!
//! - [`SearchContext`] - The caller's session and identity
//! - [`SessionToken`] - Opaque session handle, the session part of cache keys
//! - [`SessionLifecycle`] - Session-end notifications used for cache teardown

mod context;
mod lifecycle;

pub use context::{SearchContext, SessionToken};
pub use lifecycle::{SessionEndCallback, SessionLifecycle, SessionRegistry};
