mod registry;
mod session;
mod sync;
mod token;

pub use registry::PlaylistRegistry;
pub use session::SessionManager;
pub use sync::SyncManager;
pub use sync::SyncOutcome;
pub use token::TokenManager;
