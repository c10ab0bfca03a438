//! # Workflows Module
//!
//! The session-level entry points of the editor engine.
//!
//! ## Overview
//!
//! A UI drives the engine through an [`editor::Editor`]: it submits commands, asks for undo
//! and redo, and reads back the molecule together with its derived chemistry. The editor
//! keeps the derived side tables (implicit hydrogens, valence errors, R/S labels) in step
//! with every change, so callers never refresh anything by hand.
//!
//! ## Architecture
//!
//! - **Editor Session** ([`editor`]) - Owns the configuration, the document, the bounded
//!   history and the derived chemistry, and exposes export and persistence.
//! - **Clean Animation** ([`clean`]) - Interpolates from the current drawing to a normalized
//!   layout frame by frame, then commits the result as a single undoable command.

pub mod clean;
pub mod editor;
