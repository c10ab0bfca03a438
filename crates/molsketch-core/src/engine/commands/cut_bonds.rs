use super::Command;
use crate::core::models::ids::{AnnotationId, AtomId, BondId};
use crate::core::models::topology::Bond;
use crate::core::utils::geometry::centroid;
use crate::engine::annotations::{Annotation, Arrow, Badge};
use crate::engine::document::Document;
use nalgebra::Vector2;
use tracing::debug;

const BADGE_OFFSET: (f64, f64) = (10.0, -10.0);
const ARROW_GAP: f64 = 20.0;
const ARROW_LENGTH: f64 = 40.0;

/// How the bonding electron pair is distributed when a bond is cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cleavage {
    /// One fragment keeps both electrons: an ion pair.
    Heterolytic,
    /// Each fragment keeps one electron: two radicals.
    Homolytic,
}

/// Cuts bonds and records the chemical consequences on the fragments.
///
/// Heterolytic cuts make the heteroatom side the anion. When both or neither endpoint is a
/// heteroatom, the bond's first atom becomes the cation and its second the anion.
/// Homolytic cuts add one radical to each endpoint.
///
/// Undo reverts exactly the deltas and annotations this command introduced, so edits made
/// to the same atoms by other commands are left alone.
#[derive(Debug)]
pub struct CutBondsCommand {
    bonds: Vec<BondId>,
    cleavage: Cleavage,
    badges: bool,
    arrow: bool,
    removed: Vec<(BondId, Bond)>,
    charge_deltas: Vec<(AtomId, i8)>,
    radical_deltas: Vec<(AtomId, u8)>,
    added: Vec<(AnnotationId, Annotation)>,
    executed: bool,
}

impl CutBondsCommand {
    pub fn new(bonds: Vec<BondId>, cleavage: Cleavage) -> Self {
        Self {
            bonds,
            cleavage,
            badges: false,
            arrow: false,
            removed: Vec::new(),
            charge_deltas: Vec::new(),
            radical_deltas: Vec::new(),
            added: Vec::new(),
            executed: false,
        }
    }

    /// Pins a charge or radical badge to each affected atom.
    pub fn with_badges(mut self) -> Self {
        self.badges = true;
        self
    }

    /// Draws a retrosynthesis arrow next to the cut site.
    pub fn with_arrow(mut self) -> Self {
        self.arrow = true;
        self
    }

    fn first_execute(&mut self, document: &mut Document) {
        let mut midpoints = Vec::new();
        for &bond_id in &self.bonds {
            let Some(bond) = document.molecule.remove_bond(bond_id) else {
                continue;
            };
            let (Some(atom1), Some(atom2)) = (
                document.molecule.atom(bond.atom1_id),
                document.molecule.atom(bond.atom2_id),
            ) else {
                continue;
            };
            midpoints.push(nalgebra::center(&atom1.position, &atom2.position));

            match self.cleavage {
                Cleavage::Heterolytic => {
                    let (cation, anion) = if atom1.is_heteroatom() && !atom2.is_heteroatom() {
                        (bond.atom2_id, bond.atom1_id)
                    } else {
                        (bond.atom1_id, bond.atom2_id)
                    };
                    self.charge_deltas.push((cation, 1));
                    self.charge_deltas.push((anion, -1));
                }
                Cleavage::Homolytic => {
                    self.radical_deltas.push((bond.atom1_id, 1));
                    self.radical_deltas.push((bond.atom2_id, 1));
                }
            }
            self.removed.push((bond_id, bond));
        }

        self.apply_deltas(document, 1);

        if self.badges {
            let badges: Vec<Badge> = self
                .charge_deltas
                .iter()
                .map(|&(atom_id, delta)| (atom_id, if delta > 0 { "+" } else { "-" }))
                .chain(self.radical_deltas.iter().map(|&(atom_id, _)| (atom_id, "•")))
                .map(|(atom_id, text)| Badge {
                    atom_id,
                    text: text.to_string(),
                    offset: Vector2::new(BADGE_OFFSET.0, BADGE_OFFSET.1),
                })
                .collect();
            for badge in badges {
                let annotation = Annotation::Badge(badge);
                let id = document.annotations.add(annotation.clone());
                self.added.push((id, annotation));
            }
        }

        if let Some(site) = centroid(&midpoints).filter(|_| self.arrow) {
            let tail = site + Vector2::new(ARROW_GAP, 0.0);
            let annotation = Annotation::Arrow(Arrow {
                tail,
                head: tail + Vector2::new(ARROW_LENGTH, 0.0),
            });
            let id = document.annotations.add(annotation.clone());
            self.added.push((id, annotation));
        }
    }

    /// Adds (`sign = 1`) or subtracts (`sign = -1`) the recorded deltas.
    fn apply_deltas(&self, document: &mut Document, sign: i8) {
        for &(atom_id, delta) in &self.charge_deltas {
            if let Some(atom) = document.molecule.atom_mut(atom_id) {
                atom.charge = atom.charge.saturating_add(sign * delta);
            }
        }
        for &(atom_id, delta) in &self.radical_deltas {
            if let Some(atom) = document.molecule.atom_mut(atom_id) {
                atom.radicals = if sign > 0 {
                    atom.radicals.saturating_add(delta)
                } else {
                    atom.radicals.saturating_sub(delta)
                };
            }
        }
    }
}

impl Command for CutBondsCommand {
    fn execute(&mut self, document: &mut Document) {
        if !self.executed {
            self.first_execute(document);
            self.executed = true;
            debug!(
                "Cut {} bond(s) ({:?}), added {} annotation(s)",
                self.removed.len(),
                self.cleavage,
                self.added.len()
            );
            return;
        }

        for (bond_id, _) in &self.removed {
            document.molecule.remove_bond(*bond_id);
        }
        self.apply_deltas(document, 1);
        for (id, annotation) in &self.added {
            document.annotations.restore(*id, annotation.clone());
        }
    }

    fn undo(&mut self, document: &mut Document) {
        for (id, _) in &self.added {
            document.annotations.remove(*id);
        }
        self.apply_deltas(document, -1);
        for (bond_id, bond) in self.removed.iter().rev() {
            document.molecule.restore_bond(*bond_id, *bond);
        }
    }

    fn label(&self) -> &str {
        match self.cleavage {
            Cleavage::Heterolytic => "Heterolytic cut",
            Cleavage::Homolytic => "Homolytic cut",
        }
    }

    fn affected_atoms(&self) -> Option<Vec<AtomId>> {
        let mut atoms: Vec<AtomId> = self
            .removed
            .iter()
            .flat_map(|(_, bond)| [bond.atom1_id, bond.atom2_id])
            .collect();
        atoms.sort();
        atoms.dedup();
        Some(atoms)
    }
}
