pub mod auth;
pub mod session;

pub use auth::{CurrentUser, require_auth, set_current_user};
pub use session::{Session, SessionConfig};
