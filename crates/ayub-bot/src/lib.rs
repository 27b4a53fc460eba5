//! Ayub group-digest bot.
//!
//! Message dispatch, command resolution and the multi-turn configuration
//! wizard live here; platform delivery, completion and persistence are
//! behind the workspace client crates.

pub mod commands;
pub mod config;
pub mod digest;
pub mod dispatch;
pub mod error;
pub mod wizard;
