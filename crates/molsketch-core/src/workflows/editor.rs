use super::clean::CleanAnimation;
use crate::core::chem::stereo::{Chirality, assign_stereo};
use crate::core::chem::valence::{self, Diagnostic, ValenceEngine};
use crate::core::io::document::{self, DocumentFile};
use crate::core::io::inchi;
use crate::core::io::mol::{self, MolFile};
use crate::core::io::smiles;
use crate::core::io::traits::MolecularFile;
use crate::core::layout::normalize_layout;
use crate::core::models::atom::Atom;
use crate::core::models::ids::AtomId;
use crate::core::models::molecule::Molecule;
use crate::engine::commands::{AddRingCommand, Command, RingPlacement};
use crate::engine::config::EditorConfig;
use crate::engine::document::Document;
use crate::engine::error::EngineError;
use crate::engine::history::CommandManager;
use nalgebra::Point2;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, instrument};

/// An atom together with everything derived about it.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomView<'a> {
    pub id: AtomId,
    pub atom: &'a Atom,
    pub implicit_hydrogens: u8,
    pub valence_error: bool,
    pub stereo: Option<Chirality>,
}

/// One editing session: a document, its history and its derived chemistry.
///
/// All mutations go through [`Editor::execute`], [`Editor::undo`] and [`Editor::redo`],
/// each of which leaves the derived tables consistent with the molecule on return.
#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    document: Document,
    history: CommandManager,
    valence: ValenceEngine,
    stereo: HashMap<AtomId, Chirality>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_document(config, Document::new())
    }

    /// Starts a session on an existing document with an empty history.
    pub fn with_document(config: EditorConfig, document: Document) -> Self {
        let mut editor = Self {
            config,
            document,
            history: CommandManager::new(config.history_capacity),
            valence: ValenceEngine::new(),
            stereo: HashMap::new(),
        };
        editor.refresh(None);
        editor
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn molecule(&self) -> &Molecule {
        &self.document.molecule
    }

    pub fn history(&self) -> &CommandManager {
        &self.history
    }

    pub fn valence(&self) -> &ValenceEngine {
        &self.valence
    }

    #[instrument(skip_all, name = "editor_execute")]
    pub fn execute(&mut self, command: Box<dyn Command>) {
        self.history.execute(command, &mut self.document);
        let affected = self.history.peek_undo().and_then(|c| c.affected_atoms());
        self.refresh(affected);
    }

    /// Reverts the last command. Returns `false` if the history was empty.
    #[instrument(skip_all, name = "editor_undo")]
    pub fn undo(&mut self) -> bool {
        if !self.history.undo(&mut self.document) {
            return false;
        }
        let affected = self.history.peek_redo().and_then(|c| c.affected_atoms());
        self.refresh(affected);
        true
    }

    /// Re-applies the last undone command. Returns `false` if there was nothing to redo.
    #[instrument(skip_all, name = "editor_redo")]
    pub fn redo(&mut self) -> bool {
        if !self.history.redo(&mut self.document) {
            return false;
        }
        let affected = self.history.peek_undo().and_then(|c| c.affected_atoms());
        self.refresh(affected);
        true
    }

    fn refresh(&mut self, affected: Option<Vec<AtomId>>) {
        match affected {
            Some(atoms) => {
                if !atoms.is_empty() {
                    debug!("Refreshing valence for {} atom(s)", atoms.len());
                }
                self.valence.update_affected(&self.document.molecule, atoms);
            }
            None => self.valence.update_all(&self.document.molecule),
        }
        self.stereo = assign_stereo(&self.document.molecule);
    }

    pub fn stereo_labels(&self) -> &HashMap<AtomId, Chirality> {
        &self.stereo
    }

    /// Valence errors followed by safety warnings.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let molecule = &self.document.molecule;
        let mut diagnostics = valence::validate(molecule);
        diagnostics.extend(valence::safety_scan(molecule));
        diagnostics
    }

    pub fn atom_view(&self, atom_id: AtomId) -> Option<AtomView<'_>> {
        let atom = self.document.molecule.atom(atom_id)?;
        Some(AtomView {
            id: atom_id,
            atom,
            implicit_hydrogens: self.valence.implicit_hydrogens(atom_id),
            valence_error: self.valence.has_valence_error(atom_id),
            stereo: self.stereo.get(&atom_id).copied(),
        })
    }

    /// Whether a bond of `order` can be attached to the atom without exceeding its valence.
    pub fn can_add_bond(&self, atom_id: AtomId, order: u8) -> bool {
        valence::can_add_bond(&self.document.molecule, atom_id, order)
    }

    /// A ring command preconfigured with this session's bond length and merge tolerance.
    pub fn ring_command(&self, size: usize, placement: RingPlacement) -> AddRingCommand {
        AddRingCommand::new(size, placement, self.config.bond_length)
            .with_merge_tolerance(self.config.merge_tolerance)
    }

    /// The normalized layout for the current drawing; the document is not modified.
    pub fn clean_targets(&self) -> HashMap<AtomId, Point2<f64>> {
        normalize_layout(&self.document.molecule, self.config.bond_length)
    }

    pub fn begin_clean_animation(&self, steps: usize) -> CleanAnimation {
        let target = self.clean_targets();
        let start = self
            .document
            .molecule
            .positions()
            .into_iter()
            .filter(|(id, _)| target.contains_key(id))
            .collect();
        CleanAnimation::new(start, target, steps)
    }

    /// Commits a (possibly unfinished) animation as one undoable cleanup.
    pub fn finish_clean_animation(&mut self, animation: CleanAnimation) {
        self.execute(Box::new(animation.finish()));
    }

    /// Normalizes the layout in one step, without animation.
    pub fn clean_structure(&mut self) {
        let animation = CleanAnimation::new(HashMap::new(), self.clean_targets(), 1);
        self.finish_clean_animation(animation);
    }

    pub fn save_json(&self) -> Result<String, EngineError> {
        Ok(document::to_json_string(
            &self.document.molecule,
            &self.document.view,
        )?)
    }

    /// Replaces the document with a saved one. History is cleared.
    ///
    /// On error the current document is left untouched.
    #[instrument(skip_all, name = "editor_load")]
    pub fn load_json(&mut self, text: &str) -> Result<(), EngineError> {
        let (molecule, view) = document::from_json_str(text)?;
        self.replace_document(Document::from_molecule(molecule, view));
        Ok(())
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        DocumentFile::write_to_path(&self.document.molecule, &self.document.view, path)?;
        Ok(())
    }

    pub fn load_from_path(&mut self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let (molecule, view) = DocumentFile::read_from_path(path)?;
        self.replace_document(Document::from_molecule(molecule, view));
        Ok(())
    }

    /// Replaces the document with the structure in a V2000 block. History is cleared.
    #[instrument(skip_all, name = "editor_import_mol")]
    pub fn import_mol(&mut self, text: &str) -> Result<(), EngineError> {
        let (molecule, _) =
            MolFile::read_scaled(&mut text.as_bytes(), self.config.pixels_per_angstrom)?;
        self.replace_document(Document::from_molecule(molecule, Default::default()));
        Ok(())
    }

    fn replace_document(&mut self, document: Document) {
        self.document = document;
        self.history.clear();
        self.refresh(None);
        info!(
            "Loaded document with {} atom(s) and {} bond(s)",
            self.document.molecule.atom_count(),
            self.document.molecule.bond_count()
        );
    }

    pub fn to_smiles(&self) -> String {
        smiles::to_smiles(&self.document.molecule)
    }

    pub fn to_mol(&self) -> Result<String, EngineError> {
        Ok(mol::to_mol(
            &self.document.molecule,
            self.config.pixels_per_angstrom,
        )?)
    }

    pub fn to_inchi(&self) -> String {
        inchi::to_inchi(&self.document.molecule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chem::valence::Severity;
    use crate::core::models::topology::BondKind;
    use crate::engine::commands::{AddAtomCommand, AddBondCommand, MoveElementsCommand};
    use nalgebra::Vector2;

    fn add_atom(editor: &mut Editor, element: &str, x: f64, y: f64) -> AtomId {
        editor.execute(Box::new(AddAtomCommand::new(Atom::new(element, Point2::new(x, y)))));
        editor.history().peek_undo().unwrap().affected_atoms().unwrap()[0]
    }

    fn ethane() -> (Editor, AtomId, AtomId) {
        let mut editor = Editor::default();
        let a = add_atom(&mut editor, "C", 0.0, 0.0);
        let b = add_atom(&mut editor, "C", 40.0, 0.0);
        editor.execute(Box::new(AddBondCommand::new(a, b, BondKind::Single)));
        (editor, a, b)
    }

    #[test]
    fn derived_hydrogens_follow_execute_undo_and_redo() {
        let (mut editor, a, b) = ethane();
        assert_eq!(editor.atom_view(a).unwrap().implicit_hydrogens, 3);
        assert_eq!(editor.to_smiles(), "CC");

        assert!(editor.undo());
        assert_eq!(editor.atom_view(a).unwrap().implicit_hydrogens, 4);
        assert_eq!(editor.atom_view(b).unwrap().implicit_hydrogens, 4);
        assert_eq!(editor.to_smiles(), "C.C");

        assert!(editor.redo());
        assert_eq!(editor.atom_view(b).unwrap().implicit_hydrogens, 3);
        assert!(!editor.redo());
    }

    #[test]
    fn undoing_an_atom_addition_drops_its_view() {
        let mut editor = Editor::default();
        let a = add_atom(&mut editor, "O", 0.0, 0.0);
        assert_eq!(editor.atom_view(a).unwrap().implicit_hydrogens, 2);
        assert!(editor.undo());
        assert!(editor.atom_view(a).is_none());
        assert!(editor.valence().is_empty());
        assert!(!editor.undo());
    }

    #[test]
    fn overbonded_carbon_is_reported_but_not_blocked() {
        let mut editor = Editor::default();
        let center = add_atom(&mut editor, "C", 0.0, 0.0);
        for i in 0..5 {
            let angle = i as f64;
            let other = add_atom(&mut editor, "C", 40.0 * angle.cos(), 40.0 * angle.sin());
            assert_eq!(editor.can_add_bond(center, 1), i < 4);
            editor.execute(Box::new(AddBondCommand::new(center, other, BondKind::Single)));
        }

        let view = editor.atom_view(center).unwrap();
        assert!(view.valence_error);
        assert_eq!(view.implicit_hydrogens, 0);
        let diagnostics = editor.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Error);
        assert_eq!(diagnostics[0].atom_id, center);
    }

    #[test]
    fn ring_command_uses_session_bond_length() {
        let mut editor = Editor::default();
        let ring = editor
            .ring_command(6, RingPlacement::Free { center: Point2::new(100.0, 100.0) })
            .with_alternating_doubles();
        editor.execute(Box::new(ring));

        let molecule = editor.molecule();
        assert_eq!(molecule.atom_count(), 6);
        assert_eq!(molecule.bond_count(), 6);
        for (_, bond) in molecule.bonds_iter() {
            let a = molecule.atom(bond.atom1_id).unwrap().position;
            let b = molecule.atom(bond.atom2_id).unwrap().position;
            assert!(((a - b).norm() - editor.config().bond_length).abs() < 1e-6);
        }
        for id in molecule.atom_ids() {
            assert_eq!(editor.atom_view(id).unwrap().implicit_hydrogens, 1);
        }
    }

    #[test]
    fn stereo_cache_matches_a_full_recompute() {
        let (mut editor, a, _) = ethane();
        editor.execute(Box::new(MoveElementsCommand::new(vec![a], Vector2::new(0.0, 5.0))));
        assert_eq!(editor.stereo_labels(), &assign_stereo(editor.molecule()));
        assert!(editor.atom_view(a).unwrap().stereo.is_none());
    }

    #[test]
    fn clean_structure_is_one_undo_step() {
        let (mut editor, a, b) = ethane();
        editor.execute(Box::new(MoveElementsCommand::new(vec![b], Vector2::new(100.0, 0.0))));
        let before = editor.molecule().positions();

        editor.clean_structure();
        let molecule = editor.molecule();
        let length = (molecule.atom(a).unwrap().position - molecule.atom(b).unwrap().position).norm();
        assert!((length - editor.config().bond_length).abs() < 1e-6);
        assert_eq!(editor.history().undo_label(), Some("Clean structure"));

        assert!(editor.undo());
        assert_eq!(editor.molecule().positions(), before);
    }

    fn assert_session_bond_lengths(editor: &Editor) {
        let molecule = editor.molecule();
        for (_, bond) in molecule.bonds_iter() {
            let a = molecule.atom(bond.atom1_id).unwrap().position;
            let b = molecule.atom(bond.atom2_id).unwrap().position;
            let length = (a - b).norm();
            assert!(
                (length - editor.config().bond_length).abs() < 1e-6,
                "bond length {} after cleanup",
                length
            );
        }
    }

    #[test]
    fn cleaning_a_ring_keeps_the_closing_bond() {
        let mut editor = Editor::default();
        let ring = editor.ring_command(6, RingPlacement::Free { center: Point2::new(100.0, 100.0) });
        editor.execute(Box::new(ring));

        editor.clean_structure();
        assert_eq!(editor.molecule().bond_count(), 6);
        assert_session_bond_lengths(&editor);
    }

    #[test]
    fn cleaning_fused_rings_keeps_every_bond_length() {
        let mut editor = Editor::default();
        let ring = editor.ring_command(6, RingPlacement::Free { center: Point2::new(100.0, 100.0) });
        editor.execute(Box::new(ring));
        let (bond, _) = editor.molecule().bonds_iter().next().unwrap();
        let fused = editor.ring_command(6, RingPlacement::Fused { bond });
        editor.execute(Box::new(fused));
        assert_eq!(editor.molecule().atom_count(), 10);

        let ids = editor.molecule().atom_ids();
        let nudge = MoveElementsCommand::new(ids[..3].to_vec(), Vector2::new(17.0, -9.0));
        editor.execute(Box::new(nudge));
        editor.clean_structure();
        assert_eq!(editor.molecule().bond_count(), 11);
        assert_session_bond_lengths(&editor);
    }

    #[test]
    fn animation_frames_leave_the_document_alone() {
        let (mut editor, _, b) = ethane();
        editor.execute(Box::new(MoveElementsCommand::new(vec![b], Vector2::new(60.0, 0.0))));
        let before = editor.molecule().positions();
        let undo_len = editor.history().undo_len();

        let mut animation = editor.begin_clean_animation(5);
        let mut frames = 0;
        while animation.tick().is_some() {
            frames += 1;
            assert_eq!(editor.molecule().positions(), before);
        }
        assert_eq!(frames, 5);

        editor.finish_clean_animation(animation);
        assert_eq!(editor.history().undo_len(), undo_len + 1);
        assert_ne!(editor.molecule().positions(), before);
    }

    #[test]
    fn save_and_load_round_trip_clears_history() {
        let (editor, _, _) = ethane();
        let json = editor.save_json().unwrap();

        let mut restored = Editor::default();
        restored.load_json(&json).unwrap();
        assert_eq!(restored.to_smiles(), "CC");
        assert!(!restored.history().can_undo());
        let id = restored.molecule().atom_ids()[0];
        assert_eq!(restored.atom_view(id).unwrap().implicit_hydrogens, 3);
    }

    #[test]
    fn failed_load_keeps_current_document() {
        let (mut editor, _, _) = ethane();
        assert!(editor.load_json("{ not json").is_err());
        assert_eq!(editor.molecule().atom_count(), 2);
        assert!(editor.history().can_undo());
    }

    #[test]
    fn mol_export_and_import_agree() {
        let (editor, _, _) = ethane();
        let block = editor.to_mol().unwrap();
        assert!(block.contains("V2000"));

        let mut imported = Editor::default();
        imported.import_mol(&block).unwrap();
        assert_eq!(imported.to_smiles(), "CC");
        assert_eq!(imported.to_inchi(), inchi::INCHI_PLACEHOLDER);
    }

    #[test]
    fn empty_session_exports_nothing() {
        let editor = Editor::default();
        assert_eq!(editor.to_smiles(), "");
        assert_eq!(editor.to_mol().unwrap(), "");
        assert_eq!(editor.to_inchi(), "");
        assert!(editor.diagnostics().is_empty());
    }

    #[test]
    fn save_to_path_round_trips() {
        let (editor, _, _) = ethane();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ethane.json");
        editor.save_to_path(&path).unwrap();

        let mut restored = Editor::default();
        restored.load_from_path(&path).unwrap();
        assert_eq!(restored.molecule().bond_count(), 1);
    }
}
