use crate::cli::{ExportArgs, ExportFormat};
use crate::config;
use crate::error::Result;
use molsketch::workflows::editor::Editor;
use tracing::info;

pub fn run(args: ExportArgs) -> Result<()> {
    let config = config::resolve(&args.config)?;
    let editor = super::open_document(&args.input, config)?;
    let text = render(&editor, args.format)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &text)?;
            info!("Wrote {:?} output to {:?}", args.format, path);
        }
        None => print!("{}", text),
    }
    Ok(())
}

/// Renders the session's molecule; line-oriented formats end with a newline.
pub fn render(editor: &Editor, format: ExportFormat) -> Result<String> {
    Ok(match format {
        ExportFormat::Smiles => format!("{}\n", editor.to_smiles()),
        ExportFormat::Mol => editor.to_mol()?,
        ExportFormat::Inchi => format!("{}\n", editor.to_inchi()),
    })
}
