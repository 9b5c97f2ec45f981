//! HTTP plumbing shared by every slice router.

mod actor;
mod error;
mod health;
mod payload;
mod router;
mod state;

pub use error::ApiError;
pub use payload::Payload;
pub use router::system_router;
pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateErrorExt, ApiStateInner};

/// Header carrying the authenticated user id.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header carrying the role of the authenticated user.
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
/// Optional display name, recorded in the audit trail.
pub const ACTOR_NAME_HEADER: &str = "x-actor-name";
