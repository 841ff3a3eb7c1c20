//! Domain models shared by the registry, router, middleware and reconciliation layers.
//!
//! Serenity types are converted into these models at the gateway boundary so the
//! dispatch core can be exercised without a live Discord connection.

pub mod definition;
pub mod reply;
pub mod source;

pub use definition::{CommandDefinition, CommandKind, ContextMenuTarget, OptionChoice, OptionKind, OptionSpec};
pub use reply::Reply;
pub use source::{ChatMessage, FocusedOption, InteractionData, InteractionEvent, Source};
