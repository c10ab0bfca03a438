use crate::core::models::ids::{AnnotationId, AtomId};
use nalgebra::{Point2, Vector2};
use slotmap::{SecondaryMap, SlotMap};

/// A short label pinned to an atom, such as the charge sign left by a bond cut.
#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub atom_id: AtomId,
    pub text: String,
    /// Offset from the atom position, in canvas pixels.
    pub offset: Vector2<f64>,
}

/// A retrosynthesis arrow pointing from `tail` to `head`.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    pub tail: Point2<f64>,
    pub head: Point2<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Badge(Badge),
    Arrow(Arrow),
}

/// Drawing annotations layered over the molecule.
///
/// Uses the same allocation scheme as the molecule: ids are never handed out twice, and an
/// annotation removed by a command can be restored under its original id.
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    keys: SlotMap<AnnotationId, ()>,
    items: SecondaryMap<AnnotationId, Annotation>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, annotation: Annotation) -> AnnotationId {
        let id = self.keys.insert(());
        self.items.insert(id, annotation);
        id
    }

    pub fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        self.items.remove(id)
    }

    /// Re-inserts a previously removed annotation under its original id.
    ///
    /// Returns `false` if the id was never allocated here or is currently occupied.
    pub fn restore(&mut self, id: AnnotationId, annotation: Annotation) -> bool {
        if !self.keys.contains_key(id) || self.items.contains_key(id) {
            return false;
        }
        self.items.insert(id, annotation);
        true
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.items.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AnnotationId, &Annotation)> {
        self.items.iter()
    }

    /// Badges attached to `atom_id`, in insertion order.
    pub fn badges_for(&self, atom_id: AtomId) -> Vec<(AnnotationId, &Badge)> {
        self.items
            .iter()
            .filter_map(|(id, annotation)| match annotation {
                Annotation::Badge(badge) if badge.atom_id == atom_id => Some((id, badge)),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
