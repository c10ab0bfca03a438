use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Represents an atom as drawn on the editor canvas.
///
/// Only authoritative fields live here. Implicit hydrogens, the valence-error flag and the
/// stereo label are derived from the surrounding graph and are kept in side tables
/// (see [`crate::core::chem::valence::ValenceEngine`] and
/// [`crate::core::chem::stereo::assign_stereo`]), never on the record itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Atom {
    /// The element symbol (e.g., "C", "N", "Cl").
    pub element: String,
    /// The 2D position in canvas pixels (Y increases downward).
    pub position: Point2<f64>,
    /// The integer formal charge.
    #[serde(default)]
    pub charge: i8,
    /// Hydrogens the user attached explicitly to this atom label.
    #[serde(default)]
    pub explicit_hydrogens: u8,
    /// The mass number, if the user set one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isotope: Option<u16>,
    /// Unpaired electrons, as introduced by homolytic bond cleavage.
    #[serde(default)]
    pub radicals: u8,
}

impl Atom {
    /// Creates a neutral atom with no explicit hydrogens, isotope or radicals.
    ///
    /// # Arguments
    ///
    /// * `element` - The element symbol.
    /// * `position` - The 2D canvas position.
    pub fn new(element: &str, position: Point2<f64>) -> Self {
        Self {
            element: element.to_string(),
            position,
            charge: 0,
            explicit_hydrogens: 0,
            isotope: None,
            radicals: 0,
        }
    }

    pub fn with_charge(mut self, charge: i8) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_isotope(mut self, isotope: u16) -> Self {
        self.isotope = Some(isotope);
        self
    }

    /// Returns `true` for any element other than carbon and hydrogen.
    pub fn is_heteroatom(&self) -> bool {
        !matches!(self.element.as_str(), "C" | "H")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_has_expected_default_fields() {
        let atom = Atom::new("N", Point2::new(1.0, 2.0));

        assert_eq!(atom.element, "N");
        assert_eq!(atom.position, Point2::new(1.0, 2.0));
        assert_eq!(atom.charge, 0);
        assert_eq!(atom.explicit_hydrogens, 0);
        assert_eq!(atom.isotope, None);
        assert_eq!(atom.radicals, 0);
    }

    #[test]
    fn builder_helpers_set_charge_and_isotope() {
        let atom = Atom::new("C", Point2::origin())
            .with_charge(-1)
            .with_isotope(13);
        assert_eq!(atom.charge, -1);
        assert_eq!(atom.isotope, Some(13));
    }

    #[test]
    fn heteroatom_excludes_only_carbon_and_hydrogen() {
        assert!(!Atom::new("C", Point2::origin()).is_heteroatom());
        assert!(!Atom::new("H", Point2::origin()).is_heteroatom());
        assert!(Atom::new("O", Point2::origin()).is_heteroatom());
        assert!(Atom::new("Cl", Point2::origin()).is_heteroatom());
    }

    #[test]
    fn serializes_with_camel_case_keys_and_skips_missing_isotope() {
        let atom = Atom::new("O", Point2::new(3.0, 4.0)).with_charge(-1);
        let json = serde_json::to_string(&atom).unwrap();
        assert!(json.contains("\"explicitHydrogens\":0"));
        assert!(json.contains("\"charge\":-1"));
        assert!(!json.contains("isotope"));

        let back: Atom = serde_json::from_str(&json).unwrap();
        assert_eq!(back, atom);
    }
}
