//! Serenity model values for tests.
//!
//! Values are created by deserializing fixture JSON, the same way serenity builds them
//! from Discord's responses.
//!
//! # Available Factories
//!
//! - `command::create_test_command` - Create Serenity application `Command` objects

pub mod command;

pub use command::create_test_command;
