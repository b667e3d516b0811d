mod credential_store;
mod security_events;

pub use credential_store::*;
pub use security_events::*;
