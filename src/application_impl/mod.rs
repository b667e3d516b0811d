mod auth_service_impl;
mod security_event_log;

pub use auth_service_impl::*;
pub use security_event_log::*;

#[cfg(test)]
mod tests;
