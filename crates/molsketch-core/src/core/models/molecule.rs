use super::atom::Atom;
use super::ids::{AtomId, BondId};
use super::topology::{Bond, BondKind};
use nalgebra::Point2;
use slotmap::{SecondaryMap, SlotMap};
use std::collections::HashMap;
use tracing::warn;

/// The molecular graph being edited: atoms, bonds and per-atom adjacency.
///
/// Identifiers are allocated from key maps that never release a slot, while the records
/// themselves live in secondary maps. An id is therefore never handed out twice, yet a record
/// removed by a command can be put back under its original id when that command is undone.
///
/// The graph enforces structural consistency (a bond always names two present atoms and
/// adjacency mirrors the bond set) but no chemistry. Rejected edits are logged and ignored
/// rather than reported as errors.
#[derive(Debug, Clone, Default)]
pub struct Molecule {
    /// Allocator for atom identifiers; entries are never removed.
    atom_keys: SlotMap<AtomId, ()>,
    /// Allocator for bond identifiers; entries are never removed.
    bond_keys: SlotMap<BondId, ()>,
    atoms: SecondaryMap<AtomId, Atom>,
    bonds: SecondaryMap<BondId, Bond>,
    /// Incident bonds of every present atom, in insertion order.
    adjacency: SecondaryMap<AtomId, Vec<BondId>>,
}

impl Molecule {
    /// Creates a new, empty molecule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves an immutable reference to an atom by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The atom ID to look up.
    ///
    /// # Return
    ///
    /// Returns `Some(&Atom)` if the atom exists, otherwise `None`.
    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    /// Retrieves a mutable reference to an atom by its ID.
    ///
    /// Only position, charge, hydrogens, isotope, radicals and the element may be changed
    /// through this reference; connectivity is owned by the bond methods.
    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    pub fn bond(&self, id: BondId) -> Option<&Bond> {
        self.bonds.get(id)
    }

    /// Retrieves a mutable reference to a bond by its ID.
    ///
    /// Callers must not rewrite the endpoints; use [`Molecule::remove_bond`] and
    /// [`Molecule::add_bond`] instead so that adjacency stays consistent.
    pub fn bond_mut(&mut self, id: BondId) -> Option<&mut Bond> {
        self.bonds.get_mut(id)
    }

    /// Returns an iterator over all atoms, in allocation order.
    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    pub fn atoms_iter_mut(&mut self) -> impl Iterator<Item = (AtomId, &mut Atom)> {
        self.atoms.iter_mut()
    }

    /// Returns an iterator over all bonds, in allocation order.
    pub fn bonds_iter(&self) -> impl Iterator<Item = (BondId, &Bond)> {
        self.bonds.iter()
    }

    pub fn atom_ids(&self) -> Vec<AtomId> {
        self.atoms.keys().collect()
    }

    pub fn bond_ids(&self) -> Vec<BondId> {
        self.bonds.keys().collect()
    }

    pub fn contains_atom(&self, id: AtomId) -> bool {
        self.atoms.contains_key(id)
    }

    pub fn contains_bond(&self, id: BondId) -> bool {
        self.bonds.contains_key(id)
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Adds an atom under a freshly allocated ID.
    pub fn add_atom(&mut self, atom: Atom) -> AtomId {
        let id = self.atom_keys.insert(());
        self.atoms.insert(id, atom);
        self.adjacency.insert(id, Vec::new());
        id
    }

    /// Removes an atom and every bond incident to it.
    ///
    /// Incident bonds are removed first, each one updating the adjacency of its other
    /// endpoint, and only then is the atom entry itself dropped.
    ///
    /// # Return
    ///
    /// Returns the removed atom together with the removed bonds (in adjacency order), or
    /// `None` if the atom did not exist.
    pub fn remove_atom(&mut self, atom_id: AtomId) -> Option<(Atom, Vec<(BondId, Bond)>)> {
        if !self.atoms.contains_key(atom_id) {
            return None;
        }

        let incident = self.adjacency.get(atom_id).cloned().unwrap_or_default();
        let removed_bonds: Vec<(BondId, Bond)> = incident
            .into_iter()
            .filter_map(|bond_id| self.remove_bond(bond_id).map(|bond| (bond_id, bond)))
            .collect();

        self.adjacency.remove(atom_id);
        let atom = self.atoms.remove(atom_id)?;
        Some((atom, removed_bonds))
    }

    /// Adds a bond of the given kind between two atoms.
    ///
    /// # Return
    ///
    /// Returns the new bond's ID, or `None` if the bond was rejected: an endpoint is
    /// missing, both endpoints are the same atom, or the pair is already bonded. Rejections
    /// are logged, never raised.
    pub fn add_bond(&mut self, atom1_id: AtomId, atom2_id: AtomId, kind: BondKind) -> Option<BondId> {
        self.insert_bond(Bond::new(atom1_id, atom2_id, kind))
    }

    /// Adds a fully specified bond record (order may differ from the kind's nominal order).
    pub fn insert_bond(&mut self, bond: Bond) -> Option<BondId> {
        if !self.admits(&bond) {
            return None;
        }
        let id = self.bond_keys.insert(());
        self.link(id, bond);
        Some(id)
    }

    /// Removes a bond, detaching it from both endpoints' adjacency.
    pub fn remove_bond(&mut self, bond_id: BondId) -> Option<Bond> {
        let bond = self.bonds.remove(bond_id)?;
        for atom_id in [bond.atom1_id, bond.atom2_id] {
            if let Some(incident) = self.adjacency.get_mut(atom_id) {
                incident.retain(|&id| id != bond_id);
            }
        }
        Some(bond)
    }

    /// Re-inserts a previously removed atom under its original ID.
    ///
    /// # Return
    ///
    /// Returns `false` (and logs) if the ID was never allocated by this molecule or is
    /// currently occupied.
    pub fn restore_atom(&mut self, id: AtomId, atom: Atom) -> bool {
        if !self.atom_keys.contains_key(id) || self.atoms.contains_key(id) {
            warn!("Refusing to restore atom {:?}: id is unknown or occupied", id);
            return false;
        }
        self.atoms.insert(id, atom);
        self.adjacency.insert(id, Vec::new());
        true
    }

    /// Re-inserts a previously removed bond under its original ID.
    ///
    /// Both endpoints must be present, so atoms have to be restored before their bonds.
    pub fn restore_bond(&mut self, id: BondId, bond: Bond) -> bool {
        if !self.bond_keys.contains_key(id) || self.bonds.contains_key(id) {
            warn!("Refusing to restore bond {:?}: id is unknown or occupied", id);
            return false;
        }
        if !self.admits(&bond) {
            return false;
        }
        self.link(id, bond);
        true
    }

    /// Returns the IDs of the bonds incident to an atom, in adjacency order.
    pub fn bond_ids_of(&self, atom_id: AtomId) -> &[BondId] {
        self.adjacency
            .get(atom_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Returns the bonds touching an atom, in adjacency order.
    pub fn connected_bonds(&self, atom_id: AtomId) -> Vec<(BondId, &Bond)> {
        self.bond_ids_of(atom_id)
            .iter()
            .filter_map(|&id| self.bonds.get(id).map(|bond| (id, bond)))
            .collect()
    }

    /// Returns `(bond, neighbor)` pairs for an atom, in adjacency order.
    pub fn neighbors(&self, atom_id: AtomId) -> impl Iterator<Item = (BondId, AtomId)> + '_ {
        self.bond_ids_of(atom_id).iter().filter_map(move |&bond_id| {
            self.bonds
                .get(bond_id)
                .and_then(|bond| bond.other(atom_id))
                .map(|other| (bond_id, other))
        })
    }

    pub fn bond_between(&self, atom1_id: AtomId, atom2_id: AtomId) -> Option<BondId> {
        self.neighbors(atom1_id)
            .find(|&(_, other)| other == atom2_id)
            .map(|(bond_id, _)| bond_id)
    }

    pub fn degree(&self, atom_id: AtomId) -> usize {
        self.bond_ids_of(atom_id).len()
    }

    /// Sum of the orders of all bonds incident to an atom.
    pub fn bond_order_sum(&self, atom_id: AtomId) -> u32 {
        self.connected_bonds(atom_id)
            .iter()
            .map(|(_, bond)| bond.order as u32)
            .sum()
    }

    /// Returns a copy of every atom position, keyed by atom ID.
    pub fn positions(&self) -> HashMap<AtomId, Point2<f64>> {
        self.atoms
            .iter()
            .map(|(id, atom)| (id, atom.position))
            .collect()
    }

    fn admits(&self, bond: &Bond) -> bool {
        if !self.atoms.contains_key(bond.atom1_id) || !self.atoms.contains_key(bond.atom2_id) {
            warn!(
                "Ignoring bond {:?}-{:?}: endpoint is not in the molecule",
                bond.atom1_id, bond.atom2_id
            );
            return false;
        }
        if bond.atom1_id == bond.atom2_id {
            warn!("Ignoring bond from atom {:?} to itself", bond.atom1_id);
            return false;
        }
        if self.bond_between(bond.atom1_id, bond.atom2_id).is_some() {
            warn!(
                "Ignoring bond {:?}-{:?}: atoms are already bonded",
                bond.atom1_id, bond.atom2_id
            );
            return false;
        }
        true
    }

    fn link(&mut self, id: BondId, bond: Bond) {
        self.adjacency[bond.atom1_id].push(id);
        self.adjacency[bond.atom2_id].push(id);
        self.bonds.insert(id, bond);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carbon(x: f64, y: f64) -> Atom {
        Atom::new("C", Point2::new(x, y))
    }

    fn assert_adjacency_consistent(molecule: &Molecule) {
        for (atom_id, _) in molecule.atoms_iter() {
            for &bond_id in molecule.bond_ids_of(atom_id) {
                let bond = molecule.bond(bond_id).expect("adjacency names a live bond");
                assert!(bond.contains(atom_id));
            }
        }
        for (bond_id, bond) in molecule.bonds_iter() {
            assert!(molecule.bond_ids_of(bond.atom1_id).contains(&bond_id));
            assert!(molecule.bond_ids_of(bond.atom2_id).contains(&bond_id));
        }
    }

    #[test]
    fn add_atom_and_bond_update_adjacency() {
        let mut molecule = Molecule::new();
        let a = molecule.add_atom(carbon(0.0, 0.0));
        let b = molecule.add_atom(carbon(1.0, 0.0));
        let bond_id = molecule.add_bond(a, b, BondKind::Double).unwrap();

        assert_eq!(molecule.atom_count(), 2);
        assert_eq!(molecule.bond_count(), 1);
        assert_eq!(molecule.bond_ids_of(a), &[bond_id]);
        assert_eq!(molecule.bond_ids_of(b), &[bond_id]);
        assert_eq!(molecule.bond_order_sum(a), 2);
        assert_eq!(molecule.bond_between(b, a), Some(bond_id));
        assert_adjacency_consistent(&molecule);
    }

    #[test]
    fn add_bond_with_missing_endpoint_is_ignored() {
        let mut molecule = Molecule::new();
        let a = molecule.add_atom(carbon(0.0, 0.0));
        let b = molecule.add_atom(carbon(1.0, 0.0));
        molecule.remove_atom(b);

        assert_eq!(molecule.add_bond(a, b, BondKind::Single), None);
        assert_eq!(molecule.bond_count(), 0);
        assert!(molecule.bond_ids_of(a).is_empty());
    }

    #[test]
    fn add_bond_rejects_self_bonds_and_duplicates() {
        let mut molecule = Molecule::new();
        let a = molecule.add_atom(carbon(0.0, 0.0));
        let b = molecule.add_atom(carbon(1.0, 0.0));

        assert_eq!(molecule.add_bond(a, a, BondKind::Single), None);
        assert!(molecule.add_bond(a, b, BondKind::Single).is_some());
        assert_eq!(molecule.add_bond(b, a, BondKind::Double), None);
        assert_eq!(molecule.bond_count(), 1);
    }

    #[test]
    fn remove_atom_cascades_to_incident_bonds() {
        let mut molecule = Molecule::new();
        let a = molecule.add_atom(carbon(0.0, 0.0));
        let b = molecule.add_atom(carbon(1.0, 0.0));
        let c = molecule.add_atom(carbon(2.0, 0.0));
        let ab = molecule.add_bond(a, b, BondKind::Single).unwrap();
        let bc = molecule.add_bond(b, c, BondKind::Single).unwrap();

        let (atom, removed) = molecule.remove_atom(b).unwrap();

        assert_eq!(atom.element, "C");
        assert_eq!(
            removed.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            vec![ab, bc]
        );
        assert_eq!(molecule.bond_count(), 0);
        assert!(molecule.bond_ids_of(a).is_empty());
        assert!(molecule.bond_ids_of(c).is_empty());
        assert!(molecule.remove_atom(b).is_none());
        assert_adjacency_consistent(&molecule);
    }

    #[test]
    fn ids_are_never_reused_after_removal() {
        let mut molecule = Molecule::new();
        let a = molecule.add_atom(carbon(0.0, 0.0));
        molecule.remove_atom(a);
        let b = molecule.add_atom(carbon(0.0, 0.0));
        assert_ne!(a, b);
    }

    #[test]
    fn restore_reinserts_atoms_and_bonds_under_original_ids() {
        let mut molecule = Molecule::new();
        let a = molecule.add_atom(carbon(0.0, 0.0));
        let b = molecule.add_atom(carbon(1.0, 0.0));
        let ab = molecule.add_bond(a, b, BondKind::Triple).unwrap();

        let (atom, bonds) = molecule.remove_atom(b).unwrap();
        assert!(molecule.restore_atom(b, atom));
        for (id, bond) in bonds {
            assert!(molecule.restore_bond(id, bond));
        }

        assert_eq!(molecule.bond(ab).unwrap().order, 3);
        assert_eq!(molecule.bond_between(a, b), Some(ab));
        assert_adjacency_consistent(&molecule);
    }

    #[test]
    fn restore_refuses_occupied_or_foreign_ids() {
        let mut molecule = Molecule::new();
        let a = molecule.add_atom(carbon(0.0, 0.0));
        assert!(!molecule.restore_atom(a, carbon(5.0, 5.0)));

        let mut other = Molecule::new();
        other.add_atom(carbon(0.0, 0.0));
        let foreign = other.add_atom(carbon(0.0, 0.0));
        assert!(!molecule.restore_atom(foreign, carbon(0.0, 0.0)));
    }

    #[test]
    fn neighbors_follow_adjacency_order() {
        let mut molecule = Molecule::new();
        let center = molecule.add_atom(carbon(0.0, 0.0));
        let n1 = molecule.add_atom(Atom::new("N", Point2::new(1.0, 0.0)));
        let o1 = molecule.add_atom(Atom::new("O", Point2::new(0.0, 1.0)));
        molecule.add_bond(center, n1, BondKind::Single);
        molecule.add_bond(o1, center, BondKind::Single);

        let others: Vec<AtomId> = molecule.neighbors(center).map(|(_, id)| id).collect();
        assert_eq!(others, vec![n1, o1]);
        assert_eq!(molecule.degree(center), 2);
        assert_eq!(molecule.connected_bonds(center).len(), 2);
    }
}
