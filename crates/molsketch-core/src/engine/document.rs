use super::annotations::Annotations;
use crate::core::io::document::ViewState;
use crate::core::models::molecule::Molecule;

/// Everything a command may change: the molecule, its annotations and the viewport.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub molecule: Molecule,
    pub annotations: Annotations,
    pub view: ViewState,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_molecule(molecule: Molecule, view: ViewState) -> Self {
        Self {
            molecule,
            annotations: Annotations::new(),
            view,
        }
    }
}
