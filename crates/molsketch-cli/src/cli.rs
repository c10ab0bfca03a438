use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "MolSketch CLI - Inspect, clean and convert documents saved by the MolSketch structure editor.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a saved document as SMILES, a MOL V2000 block or an InChI string.
    Export(ExportArgs),
    /// Report valence errors, safety warnings and stereo labels of a saved document.
    Check(CheckArgs),
    /// Normalize the 2D layout of a saved document.
    Clean(CleanArgs),
    /// Convert a MOL V2000 file into a saved document.
    Import(ImportArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Smiles,
    Mol,
    Inchi,
}

/// Editor settings shared by every subcommand that builds an editing session.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to an editor configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the target bond length in canvas pixels.
    #[arg(long, value_name = "FLOAT")]
    pub bond_length: Option<f64>,

    /// Override the canvas-pixel to ångström scale used for MOL files.
    #[arg(long, value_name = "FLOAT")]
    pub pixels_per_angstrom: Option<f64>,
}

/// Arguments for the `export` subcommand.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Path to the saved document (JSON).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "smiles")]
    pub format: ExportFormat,

    /// Output path. Standard output is used when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the saved document (JSON).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,
}

/// Arguments for the `clean` subcommand.
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Path to the saved document (JSON).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the cleaned document.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `import` subcommand.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Path to the MOL V2000 file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the saved document (JSON).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Lay out the imported structure before saving it.
    #[arg(long)]
    pub clean: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn global_flags_are_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from(["molsketch", "check", "-i", "doc.json", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Check(_)));
    }

    #[test]
    fn export_defaults_to_smiles_on_stdout() {
        let cli = Cli::try_parse_from(["molsketch", "export", "-i", "doc.json"]).unwrap();
        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.format, ExportFormat::Smiles);
        assert!(args.output.is_none());
    }

    #[test]
    fn clean_accepts_config_overrides() {
        let cli = Cli::try_parse_from([
            "molsketch", "clean", "-i", "in.json", "-o", "out.json", "-c", "editor.toml",
            "--bond-length", "25",
        ])
        .unwrap();
        let Commands::Clean(args) = cli.command else {
            panic!("expected clean");
        };
        assert_eq!(args.config.bond_length, Some(25.0));
        assert_eq!(args.config.config, Some(PathBuf::from("editor.toml")));
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["molsketch", "-q", "-v", "check", "-i", "x.json"]).is_err());
    }
}
