//! In-memory implementations backed by `HashMap`s behind a tokio `Mutex`.

mod credential;
mod message;
mod registry;

pub use credential::InMemoryCredentialStore;
pub use message::InMemoryMessageStore;
pub use registry::InMemoryConnectionRegistry;
