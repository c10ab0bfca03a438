//! # Core Module
//!
//! Stateless building blocks of the editor: the molecular graph, the chemistry derived from it,
//! 2D geometry and layout, and serialization.
//!
//! - **Molecular Representation** ([`models`]) - Atoms, bonds and the adjacency-indexed graph
//! - **Derived Chemistry** ([`chem`]) - Element tables, implicit hydrogens, validation, stereo
//! - **Layout** ([`layout`]) - Breadth-first bond-length/angle normalization
//! - **File I/O** ([`io`]) - SMILES, MOL V2000 and the JSON save document
//!
//! Nothing in this module mutates a molecule on its own initiative; edits go through
//! [`crate::engine::commands`].

pub mod chem;
pub mod io;
pub mod layout;
pub mod models;
pub mod utils;
