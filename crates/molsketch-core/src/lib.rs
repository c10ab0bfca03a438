//! # MolSketch Core Library
//!
//! The chemistry graph engine behind a 2D molecular-structure editor.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** The molecular graph (`Molecule`), derived chemistry
//!   (implicit hydrogens, valence validation, R/S assignment), layout normalization and the
//!   text formats (SMILES, MOL V2000, the JSON save document). Everything here is either plain
//!   data or a pure function of it.
//!
//! - **[`engine`]: The Mutation Layer.** Configuration, the `Document` being edited, the
//!   `Command` objects that are the only sanctioned way to change it, and the bounded
//!   `CommandManager` providing linear undo/redo.
//!
//! - **[`workflows`]: The Public API.** The `Editor` session ties the engine and core together,
//!   refreshing derived chemistry after every executed, undone or redone command, and drives
//!   animated structure cleanup.

pub mod core;
pub mod engine;
pub mod workflows;
