use super::Command;
use crate::core::models::atom::Atom;
use crate::core::models::ids::{AtomId, BondId};
use crate::core::models::topology::{Bond, BondKind};
use crate::core::utils::geometry::{angle_of, apothem, circumradius, regular_polygon};
use crate::engine::document::Document;
use nalgebra::{Point2, Vector2};
use std::collections::HashMap;
use std::f64::consts::FRAC_PI_2;
use tracing::{debug, warn};

const GEOMETRY_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateBond {
    pub begin: usize,
    pub end: usize,
    pub kind: BondKind,
}

/// A fragment to stamp onto the canvas. Atom positions are absolute canvas coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<TemplateBond>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atom(mut self, atom: Atom) -> Self {
        self.atoms.push(atom);
        self
    }

    pub fn bond(mut self, begin: usize, end: usize, kind: BondKind) -> Self {
        self.bonds.push(TemplateBond { begin, end, kind });
        self
    }

    /// A ring through `vertices`, bonded in order and closed back to the first vertex.
    ///
    /// With `doubles_from = Some(k)`, every second bond starting at bond `k` (the bond from
    /// vertex `k` to `k + 1`) is double, `n / 2` of them in total.
    pub fn ring(vertices: &[Point2<f64>], element: &str, doubles_from: Option<usize>) -> Self {
        let n = vertices.len();
        let atoms = vertices.iter().map(|&p| Atom::new(element, p)).collect();
        let doubles: Vec<usize> = match doubles_from {
            Some(start) if n > 0 => (0..n / 2).map(|k| (start + 2 * k) % n).collect(),
            _ => Vec::new(),
        };
        let bonds = (0..n)
            .map(|i| TemplateBond {
                begin: i,
                end: (i + 1) % n,
                kind: if doubles.contains(&i) {
                    BondKind::Double
                } else {
                    BondKind::Single
                },
            })
            .collect();
        Self { atoms, bonds }
    }
}

/// Stamps a template onto the molecule.
///
/// Template atoms listed in the fusion map reuse the given existing atoms. Any other template
/// atom landing within `merge_tolerance` of an existing atom merges into it. Bonds whose
/// endpoints are already bonded are skipped. Undo deletes only what this command created,
/// so atoms the template fused onto survive.
#[derive(Debug)]
pub struct AddTemplateCommand {
    template: Template,
    fusion: HashMap<usize, AtomId>,
    merge_tolerance: f64,
    created_atoms: Vec<(AtomId, Atom)>,
    created_bonds: Vec<(BondId, Bond)>,
    touched: Vec<AtomId>,
    executed: bool,
}

impl AddTemplateCommand {
    pub fn new(template: Template) -> Self {
        Self {
            template,
            fusion: HashMap::new(),
            merge_tolerance: 0.0,
            created_atoms: Vec::new(),
            created_bonds: Vec::new(),
            touched: Vec::new(),
            executed: false,
        }
    }

    pub fn with_fusion(mut self, template_index: usize, atom_id: AtomId) -> Self {
        self.fusion.insert(template_index, atom_id);
        self
    }

    pub fn with_merge_tolerance(mut self, tolerance: f64) -> Self {
        self.merge_tolerance = tolerance;
        self
    }

    pub fn created_atom_ids(&self) -> Vec<AtomId> {
        self.created_atoms.iter().map(|(id, _)| *id).collect()
    }

    pub fn created_bond_ids(&self) -> Vec<BondId> {
        self.created_bonds.iter().map(|(id, _)| *id).collect()
    }

    fn merge_target(
        &self,
        existing: &[(AtomId, Point2<f64>)],
        position: &Point2<f64>,
        taken: &[AtomId],
    ) -> Option<AtomId> {
        if self.merge_tolerance <= 0.0 {
            return None;
        }
        existing
            .iter()
            .filter(|(id, _)| !taken.contains(id))
            .map(|(id, p)| (*id, (p - position).norm()))
            .filter(|&(_, d)| d <= self.merge_tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    fn first_execute(&mut self, document: &mut Document) {
        let existing: Vec<(AtomId, Point2<f64>)> = document
            .molecule
            .atoms_iter()
            .map(|(id, atom)| (id, atom.position))
            .collect();

        let mut mapping: Vec<AtomId> = Vec::with_capacity(self.template.atoms.len());
        for (index, atom) in self.template.atoms.iter().enumerate() {
            let fused = self
                .fusion
                .get(&index)
                .copied()
                .filter(|id| document.molecule.contains_atom(*id) && !mapping.contains(id));
            let target = fused.or_else(|| self.merge_target(&existing, &atom.position, &mapping));
            let id = match target {
                Some(id) => id,
                None => {
                    let id = document.molecule.add_atom(atom.clone());
                    self.created_atoms.push((id, atom.clone()));
                    id
                }
            };
            mapping.push(id);
        }

        for template_bond in &self.template.bonds {
            let (Some(&a), Some(&b)) = (
                mapping.get(template_bond.begin),
                mapping.get(template_bond.end),
            ) else {
                warn!(
                    "Template bond {}-{} refers to a missing template atom",
                    template_bond.begin, template_bond.end
                );
                continue;
            };
            if a == b || document.molecule.bond_between(a, b).is_some() {
                continue;
            }
            let bond = Bond::new(a, b, template_bond.kind);
            if let Some(id) = document.molecule.insert_bond(bond) {
                self.created_bonds.push((id, bond));
            }
        }

        mapping.sort();
        mapping.dedup();
        self.touched = mapping;
        debug!(
            "Template added {} atom(s) and {} bond(s)",
            self.created_atoms.len(),
            self.created_bonds.len()
        );
    }
}

impl Command for AddTemplateCommand {
    fn execute(&mut self, document: &mut Document) {
        if !self.executed {
            self.first_execute(document);
            self.executed = true;
            return;
        }
        for (id, atom) in &self.created_atoms {
            document.molecule.restore_atom(*id, atom.clone());
        }
        for (id, bond) in &self.created_bonds {
            document.molecule.restore_bond(*id, *bond);
        }
    }

    fn undo(&mut self, document: &mut Document) {
        for (id, _) in self.created_bonds.iter().rev() {
            document.molecule.remove_bond(*id);
        }
        for (id, atom) in self.created_atoms.iter_mut().rev() {
            if let Some((removed, _)) = document.molecule.remove_atom(*id) {
                *atom = removed;
            }
        }
    }

    fn label(&self) -> &str {
        "Add template"
    }

    fn affected_atoms(&self) -> Option<Vec<AtomId>> {
        Some(self.touched.clone())
    }
}

/// Where a new ring is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RingPlacement {
    /// A free-standing ring with its first vertex straight above `center`.
    Free { center: Point2<f64> },
    /// A spiro ring sharing one atom, pointing away from that atom's other bonds.
    Spiro { atom: AtomId },
    /// A ring fused onto an existing bond, on the side with fewer substituents.
    Fused { bond: BondId },
}

/// Adds a regular ring. The geometry is resolved against the document on first execution
/// and then delegated to an [`AddTemplateCommand`].
#[derive(Debug)]
pub struct AddRingCommand {
    size: usize,
    element: String,
    alternating: bool,
    placement: RingPlacement,
    bond_length: f64,
    merge_tolerance: f64,
    inner: Option<AddTemplateCommand>,
}

impl AddRingCommand {
    pub fn new(size: usize, placement: RingPlacement, bond_length: f64) -> Self {
        Self {
            size,
            element: "C".to_string(),
            alternating: false,
            placement,
            bond_length,
            merge_tolerance: 0.0,
            inner: None,
        }
    }

    /// Draws alternating double bonds (benzene-style).
    pub fn with_alternating_doubles(mut self) -> Self {
        self.alternating = true;
        self
    }

    pub fn with_element(mut self, element: &str) -> Self {
        self.element = element.to_string();
        self
    }

    pub fn with_merge_tolerance(mut self, tolerance: f64) -> Self {
        self.merge_tolerance = tolerance;
        self
    }

    pub fn created_atom_ids(&self) -> Vec<AtomId> {
        self.inner
            .as_ref()
            .map(AddTemplateCommand::created_atom_ids)
            .unwrap_or_default()
    }

    pub fn created_bond_ids(&self) -> Vec<BondId> {
        self.inner
            .as_ref()
            .map(AddTemplateCommand::created_bond_ids)
            .unwrap_or_default()
    }

    fn build(&self, document: &Document) -> Option<AddTemplateCommand> {
        if self.size < 3 {
            warn!("Refusing to add a ring of size {}", self.size);
            return None;
        }
        let molecule = &document.molecule;
        let n = self.size;

        let (vertices, fusion, doubles_from): (Vec<Point2<f64>>, Vec<(usize, AtomId)>, usize) =
            match self.placement {
                RingPlacement::Free { center } => (
                    regular_polygon(&center, n, self.bond_length, -FRAC_PI_2, true),
                    Vec::new(),
                    0,
                ),
                RingPlacement::Spiro { atom } => {
                    let pivot = molecule.atom(atom)?.position;
                    let pull: Vector2<f64> = molecule
                        .neighbors(atom)
                        .filter_map(|(_, other)| molecule.atom(other))
                        .map(|other| other.position - pivot)
                        .filter(|v| v.norm() > GEOMETRY_EPSILON)
                        .map(|v| v.normalize())
                        .sum();
                    let away = if pull.norm() > GEOMETRY_EPSILON {
                        -pull.normalize()
                    } else {
                        Vector2::new(0.0, -1.0)
                    };
                    let center = pivot + away * circumradius(n, self.bond_length);
                    let start = angle_of(&(pivot - center));
                    (
                        regular_polygon(&center, n, self.bond_length, start, true),
                        vec![(0, atom)],
                        1,
                    )
                }
                RingPlacement::Fused { bond } => {
                    let shared = molecule.bond(bond)?;
                    let (a, b) = (shared.atom1_id, shared.atom2_id);
                    let pa = molecule.atom(a)?.position;
                    let pb = molecule.atom(b)?.position;
                    let edge = pb - pa;
                    let side_length = edge.norm();
                    if side_length < GEOMETRY_EPSILON {
                        return None;
                    }
                    let midpoint = nalgebra::center(&pa, &pb);
                    let mut normal = Vector2::new(-edge.y, edge.x) / side_length;

                    let crowding: f64 = [a, b]
                        .into_iter()
                        .flat_map(|end| molecule.neighbors(end))
                        .filter(|&(_, other)| other != a && other != b)
                        .filter_map(|(_, other)| molecule.atom(other))
                        .map(|other| (other.position - midpoint).dot(&normal))
                        .sum();
                    if crowding > 0.0 {
                        normal = -normal;
                    }

                    let center = midpoint + normal * apothem(n, side_length);
                    let start = angle_of(&(pa - center));
                    let candidates = [true, false]
                        .map(|clockwise| regular_polygon(&center, n, side_length, start, clockwise));
                    let vertices = candidates
                        .into_iter()
                        .min_by(|p, q| {
                            (p[1] - pb).norm().total_cmp(&(q[1] - pb).norm())
                        })?;
                    (vertices, vec![(0, a), (1, b)], 1)
                }
            };

        let template = Template::ring(
            &vertices,
            &self.element,
            self.alternating.then_some(doubles_from),
        );
        let command = fusion.into_iter().fold(
            AddTemplateCommand::new(template).with_merge_tolerance(self.merge_tolerance),
            |command, (index, atom)| command.with_fusion(index, atom),
        );
        Some(command)
    }
}

impl Command for AddRingCommand {
    fn execute(&mut self, document: &mut Document) {
        if self.inner.is_none() {
            self.inner = self.build(document);
        }
        if let Some(inner) = &mut self.inner {
            inner.execute(document);
        }
    }

    fn undo(&mut self, document: &mut Document) {
        if let Some(inner) = &mut self.inner {
            inner.undo(document);
        }
    }

    fn label(&self) -> &str {
        "Add ring"
    }

    fn affected_atoms(&self) -> Option<Vec<AtomId>> {
        Some(
            self.inner
                .as_ref()
                .and_then(|inner| inner.affected_atoms())
                .unwrap_or_default(),
        )
    }
}
