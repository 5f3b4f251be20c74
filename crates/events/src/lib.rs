//! `storefront-events` — event mechanics shared by client-side stores.
//!
//! Domain-agnostic: the `Event` trait, envelopes, the decide/evolve executor
//! and the listener registry used for change notification.

pub mod envelope;
pub mod event;
pub mod handler;
pub mod listeners;

pub use envelope::EventEnvelope;
pub use event::Event;
pub use handler::execute;
pub use listeners::{Listeners, Subscription};
