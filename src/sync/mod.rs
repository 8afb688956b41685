pub mod bridge;
pub mod document;
pub mod identity;
pub mod intelligence;
pub mod keyring;
pub mod session;

pub use bridge::PersistenceBridge;
pub use document::{DocumentStore, HttpDocumentStore};
pub use identity::{HttpIdentityProvider, IdentityProvider};
pub use intelligence::{ChatReply, HttpIntelligence, TaskIntelligence};
pub use session::SessionCache;
