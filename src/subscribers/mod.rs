//! # Event subscribers for the engine runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and built-in implementations for handling events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! controller ── publish(Event) ──► Bus ──► subscriber listener ──► SubscriberSet
//!                                                                     │
//!                                                      ┌──────────────┼─────────┐
//!                                                      ▼              ▼         ▼
//!                                                  LogWriter       Metrics    Custom
//! ```

mod set;
mod subscriber;

#[cfg(feature = "logging")]
mod embedded;

pub use set::SubscriberSet;
pub use subscriber::Subscribe;

pub(crate) use set::panic_message;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
