//! # Core Models Module
//!
//! Data structures for the molecule being drawn.
//!
//! - [`ids`] - Stable, never-reused identifiers for atoms, bonds and annotations
//! - [`atom`] - Atom records (element, 2D position, charge, hydrogens, isotope, radicals)
//! - [`topology`] - Bond records and the bond-kind vocabulary of the editor
//! - [`molecule`] - The graph itself, with incrementally maintained adjacency
//!
//! ```ignore
//! use molsketch::core::models::{atom::Atom, molecule::Molecule, topology::BondKind};
//! use nalgebra::Point2;
//!
//! let mut molecule = Molecule::new();
//! let c1 = molecule.add_atom(Atom::new("C", Point2::new(0.0, 0.0)));
//! let c2 = molecule.add_atom(Atom::new("C", Point2::new(40.0, 0.0)));
//! molecule.add_bond(c1, c2, BondKind::Single);
//! ```

pub mod atom;
pub mod ids;
pub mod molecule;
pub mod topology;
