//! Switchboard Test Utils
//!
//! Shared test data for the switchboard crate. Everything here is plain data: JSON
//! fixtures shaped like Discord API payloads and serenity model values built by
//! deserializing those payloads.
//!
//! # Overview
//!
//! - **fixture**: Raw JSON command payloads, as `serde_json::Value`
//! - **serenity**: Serenity model values built from the fixtures
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::{fixture::attributes, serenity::create_test_command};
//!
//! let raw = attributes::ping();
//! let command = create_test_command(1, "ping", "Check latency", None);
//! ```

pub mod fixture;
pub mod serenity;
