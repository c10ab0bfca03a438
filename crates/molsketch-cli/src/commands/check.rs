use crate::cli::CheckArgs;
use crate::error::{CliError, Result};
use molsketch::core::chem::valence::Severity;
use molsketch::core::models::ids::AtomId;
use molsketch::engine::config::EditorConfig;
use molsketch::workflows::editor::Editor;
use std::fmt::Write;
use tracing::{info, warn};

pub fn run(args: CheckArgs) -> Result<()> {
    let editor = super::open_document(&args.input, EditorConfig::default())?;
    let (report, errors) = report(&editor);
    print!("{}", report);

    if errors > 0 {
        warn!("Found {} valence error(s) in {:?}", errors, args.input);
        return Err(CliError::Validation(errors));
    }
    info!("No valence errors found.");
    Ok(())
}

/// Formats diagnostics and stereo labels, numbering atoms from 1 in document order.
///
/// Returns the report together with the number of error-severity diagnostics.
pub fn report(editor: &Editor) -> (String, usize) {
    let atom_ids = editor.molecule().atom_ids();
    let number = |id: AtomId| atom_ids.iter().position(|&other| other == id).map_or(0, |i| i + 1);

    let mut out = String::new();
    let diagnostics = editor.diagnostics();
    for diagnostic in &diagnostics {
        let _ = writeln!(
            out,
            "{}: atom {}: {}",
            diagnostic.severity,
            number(diagnostic.atom_id),
            diagnostic.message
        );
    }

    let mut labels: Vec<(usize, String)> = editor
        .stereo_labels()
        .iter()
        .map(|(&id, label)| (number(id), label.to_string()))
        .collect();
    labels.sort();
    for (index, label) in labels {
        let _ = writeln!(out, "stereo: atom {}: {}", index, label);
    }

    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let _ = writeln!(
        out,
        "{} atom(s), {} bond(s), {} error(s), {} warning(s)",
        atom_ids.len(),
        editor.molecule().bond_count(),
        errors,
        diagnostics.len() - errors
    );
    (out, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::save_ethanol;
    use molsketch::core::models::atom::Atom;
    use molsketch::core::models::molecule::Molecule;
    use molsketch::core::models::topology::BondKind;
    use molsketch::engine::document::Document;
    use nalgebra::Point2;

    fn session(molecule: Molecule) -> Editor {
        Editor::with_document(
            EditorConfig::default(),
            Document::from_molecule(molecule, Default::default()),
        )
    }

    #[test]
    fn well_formed_structure_passes() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("ethanol.json");
        save_ethanol(&input);
        run(CheckArgs { input }).unwrap();
    }

    #[test]
    fn overbonded_oxygen_fails_with_a_report() {
        let mut molecule = Molecule::new();
        let o = molecule.add_atom(Atom::new("O", Point2::origin()));
        for i in 0..3 {
            let c = molecule.add_atom(Atom::new("C", Point2::new(40.0, i as f64 * 40.0)));
            molecule.add_bond(o, c, BondKind::Single);
        }
        let editor = session(molecule);

        let (text, errors) = report(&editor);
        assert_eq!(errors, 1);
        assert!(text.starts_with("error: atom 1: Exceeded valence on O"));
        assert!(text.ends_with("4 atom(s), 3 bond(s), 1 error(s), 0 warning(s)\n"));
    }

    #[test]
    fn peroxide_is_a_warning_only() {
        let mut molecule = Molecule::new();
        let a = molecule.add_atom(Atom::new("O", Point2::origin()));
        let b = molecule.add_atom(Atom::new("O", Point2::new(40.0, 0.0)));
        molecule.add_bond(a, b, BondKind::Single);
        let editor = session(molecule);

        let (text, errors) = report(&editor);
        assert_eq!(errors, 0);
        assert!(text.contains("warning: atom"));
    }
}
