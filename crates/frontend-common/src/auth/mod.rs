//! Session context and route guards

pub mod context;
pub mod guard;

// Re-export commonly used items
pub use context::{
    use_current_user, use_session, SessionAction, SessionContext, SessionProvider, SessionState,
};
pub use guard::{use_redirect_message, RedirectQuery, RequireAdmin, RequireSession};
