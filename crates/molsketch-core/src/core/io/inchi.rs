use crate::core::models::molecule::Molecule;

/// Returned in place of an InChI string; InChI generation is not implemented.
pub const INCHI_PLACEHOLDER: &str = "InChI=not-implemented";

pub fn to_inchi(molecule: &Molecule) -> String {
    if molecule.is_empty() {
        String::new()
    } else {
        INCHI_PLACEHOLDER.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use nalgebra::Point2;

    #[test]
    fn empty_molecule_yields_empty_string() {
        assert_eq!(to_inchi(&Molecule::new()), "");
    }

    #[test]
    fn non_empty_molecule_yields_placeholder() {
        let mut molecule = Molecule::new();
        molecule.add_atom(Atom::new("C", Point2::origin()));
        assert_eq!(to_inchi(&molecule), INCHI_PLACEHOLDER);
    }
}
