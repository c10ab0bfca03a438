//! # Derived Chemistry
//!
//! Everything here is a pure function of the current graph (topology, charges, bond kinds and
//! 2D geometry) and is recomputed rather than stored on the atom records.
//!
//! - [`elements`] - Compile-time element tables (atomic numbers, tabulated valences)
//! - [`valence`] - Implicit hydrogens, the valence-error side table, validation and safety hints
//! - [`stereo`] - R/S assignment from solid and hashed wedge bonds

pub mod elements;
pub mod stereo;
pub mod valence;
