pub mod check;
pub mod clean;
pub mod export;
pub mod import;

use crate::error::{CliError, Result};
use molsketch::engine::config::EditorConfig;
use molsketch::workflows::editor::Editor;
use std::path::Path;
use tracing::info;

/// Opens a saved document in a fresh editing session.
fn open_document(path: &Path, config: EditorConfig) -> Result<Editor> {
    info!("Loading document from {:?}", path);
    let mut editor = Editor::new(config);
    editor
        .load_from_path(path)
        .map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
    Ok(editor)
}
