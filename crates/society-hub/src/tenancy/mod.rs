//! Session-scoped tenant selection and the collaborators that hydrate it.

mod context;
mod directory;

pub use context::{ContextError, SessionView, TenantContext};
pub use directory::{IdentityProvider, IdentityState, Membership, SocietyDirectory};
