//! `remedi` binary support: CLI, dataset loading, the notification outbox
//! and the per-minute scheduler loop.

pub mod cli;
pub mod error;
pub mod outbox;
pub mod scheduler;
pub mod store;
