//! escape-lens - preview and round-trip edit escaped string literals
//!
//! The core is the per-character escape codec in [`escape`]: a literal's
//! [`StyleMap`] records whether each special character was written
//! single-escaped (`\n`) or double-escaped (`\\n`), and decode/encode use it
//! so that an edited literal keeps every character's own convention.
//!
//! Around it sit the single-line [`locator`], the [`session`] coordinator
//! that drives an edit through a scratch copy, and an Elm-style
//! `Msg` → [`update`](update::update) → `Cmd` loop for integrations.

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod error;
pub mod escape;
pub mod locator;
pub mod messages;
pub mod model;
pub mod preview;
pub mod runtime;
pub mod scratch;
pub mod session;
pub mod syntax;
pub mod tracing;
pub mod update;

// Re-export commonly used types
pub use commands::Cmd;
pub use config::LensConfig;
pub use error::{EditError, ScratchError};
pub use escape::{decode, encode, EscapeStyle, Special, StyleMap};
pub use locator::{locate_literal, LiteralSpan, LocatedLiteral};
pub use messages::Msg;
pub use model::AppModel;
pub use session::{EditCoordinator, EditRequest, Replacement};
