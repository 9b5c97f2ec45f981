//! Authorization and identifier checks performed before any business logic.

mod actor;
pub mod resource;

pub use actor::{AccessDenied, AccessDeniedExt, Actor, Operation};
pub use resource::{ResourceGuard, ResourceGuardError};
