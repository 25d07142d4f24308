//! Shared configuration, errors and domain records for the Remedi workspace.

pub mod config;
pub mod error;
pub mod types;
