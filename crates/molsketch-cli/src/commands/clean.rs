use crate::cli::CleanArgs;
use crate::config;
use crate::error::{CliError, Result};
use tracing::info;

pub fn run(args: CleanArgs) -> Result<()> {
    let config = config::resolve(&args.config)?;
    let mut editor = super::open_document(&args.input, config)?;

    info!(
        "Cleaning {} atom(s) with bond length {}",
        editor.molecule().atom_count(),
        config.bond_length
    );
    editor.clean_structure();

    editor
        .save_to_path(&args.output)
        .map_err(|e| CliError::FileParsing {
            path: args.output.clone(),
            source: e.into(),
        })?;
    info!("Cleaned document written to {:?}", args.output);
    Ok(())
}
