//! # Application Layer
//!
//! Services that drive faucet top-ups and paced transfers, and the
//! controller a presentation layer talks to.
//!
//! - [`controller`]: User intents and state snapshots
//! - [`services`]: Faucet service, dispatcher, automation loop, balance monitor
//! - [`session`]: Connected account and balance refresh
//! - [`notifications`]: User-visible messages
//! - [`error`]: Application errors

pub mod controller;
pub mod error;
pub mod notifications;
pub mod services;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{AppSnapshot, AutosenderApp};
pub use error::{AppError, AppResult};
pub use notifications::{
    BroadcastNotifier, Notification, NotificationLevel, Notifier, TracingNotifier,
};
