use crate::cli::ImportArgs;
use crate::config;
use crate::error::{CliError, Result};
use molsketch::workflows::editor::Editor;
use tracing::info;

pub fn run(args: ImportArgs) -> Result<()> {
    let config = config::resolve(&args.config)?;
    let text = std::fs::read_to_string(&args.input)?;

    let mut editor = Editor::new(config);
    editor
        .import_mol(&text)
        .map_err(|e| CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        })?;
    info!(
        "Imported {} atom(s) and {} bond(s) from {:?}",
        editor.molecule().atom_count(),
        editor.molecule().bond_count(),
        args.input
    );

    if args.clean {
        editor.clean_structure();
    }
    editor.save_to_path(&args.output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ConfigArgs;
    use std::fs;

    const ACETALDEHYDE: &str = "\
acetaldehyde
  MSKETCH          2D

  3  2  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    1.3333    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    2.0000    1.1547    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0  0  0  0
  2  3  2  0  0  0  0
M  END
";

    fn import(text: &str, clean: bool) -> Result<Editor> {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.mol");
        let output = dir.path().join("output.json");
        fs::write(&input, text).unwrap();

        run(ImportArgs {
            input,
            output: output.clone(),
            clean,
            config: ConfigArgs::default(),
        })?;
        let mut editor = Editor::default();
        editor.load_from_path(&output).unwrap();
        Ok(editor)
    }

    #[test]
    fn imports_a_v2000_block() {
        let editor = import(ACETALDEHYDE, false).unwrap();
        assert_eq!(editor.to_smiles(), "CC=O");
        let positions: Vec<f64> = editor
            .molecule()
            .atoms_iter()
            .map(|(_, atom)| atom.position.x)
            .collect();
        assert!((positions[1] - 40.0).abs() < 1e-3);
    }

    #[test]
    fn import_with_clean_keeps_the_structure() {
        let editor = import(ACETALDEHYDE, true).unwrap();
        assert_eq!(editor.molecule().bond_count(), 2);
        assert_eq!(editor.to_smiles(), "CC=O");
    }

    #[test]
    fn malformed_block_reports_the_input_path() {
        let error = import("not a mol file\n", false).unwrap_err();
        assert!(matches!(error, CliError::FileParsing { .. }));
    }
}
