//! # Engine Module
//!
//! The stateful mutation layer of the editor. Every change to a document goes through a
//! [`commands::Command`] so that it can be undone and redone with the exact identities it
//! created or removed.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Editor settings, their builder and TOML loading
//! - **Error Handling** ([`error`]) - Errors surfaced by the session I/O paths
//! - **Annotations** ([`annotations`]) - Charge badges and retrosynthesis arrows drawn over the graph
//! - **Document** ([`document`]) - The molecule, its annotations and the viewport commands act on
//! - **Commands** ([`commands`]) - The command contract and every concrete edit
//! - **History** ([`history`]) - The bounded undo/redo manager
//!
//! Graph and command paths never fail: a command whose targets are gone does nothing and
//! reports it through `tracing`. Only configuration and file I/O return errors.

pub mod annotations;
pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod history;
