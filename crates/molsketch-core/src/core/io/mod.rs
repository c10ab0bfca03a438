//! # File I/O
//!
//! - [`traits`] - The [`traits::MolecularFile`] read/write interface with path helpers
//! - [`mol`] - Fixed-column MOL V2000 reader and writer
//! - [`smiles`] - Non-canonical SMILES generation
//! - [`document`] - The JSON save document of the editor
//! - [`inchi`] - InChI placeholder

pub mod document;
pub mod inchi;
pub mod mol;
pub mod smiles;
pub mod traits;
