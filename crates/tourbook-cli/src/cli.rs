//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tourbook_domain::ExtractionMode;

/// Tourbook CLI - Import show offers, holds and routing sheets as reviewable bookings.
#[derive(Debug, Parser)]
#[command(name = "tourbook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Job database path
    #[arg(long, global = true, env = "TOURBOOK_DB")]
    pub db: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import a document (PDF, DOCX, image or text)
    Import(ImportArgs),

    /// Import a forwarded e-mail
    Email(EmailArgs),

    /// Re-run a failed or reviewed job from its source file
    Retry(RetryArgs),

    /// Re-run structured extraction on a job's text with stronger prompting
    Improve(ImproveArgs),

    /// Show one job with its candidates and error trail
    Show(ShowArgs),

    /// List jobs of an organization, newest first
    Jobs(JobsArgs),
}

/// Arguments for the import command.
#[derive(Debug, Parser)]
pub struct ImportArgs {
    /// Document to import
    pub file: PathBuf,

    /// Declared MIME type; the file extension decides when absent
    #[arg(short, long)]
    pub mime: Option<String>,

    /// Organization owning the job
    #[arg(short, long)]
    pub org: Option<String>,

    /// JSON file with the organization's existing show records
    #[arg(short, long)]
    pub existing: Option<PathBuf>,

    /// How candidates are derived
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
}

/// Arguments for the email command.
#[derive(Debug, Parser)]
pub struct EmailArgs {
    /// Subject line
    #[arg(short, long)]
    pub subject: String,

    /// Sender as displayed
    #[arg(long)]
    pub from: String,

    /// File containing the message body
    #[arg(short, long)]
    pub body_file: PathBuf,

    /// Organization owning the job
    #[arg(short, long)]
    pub org: Option<String>,

    /// JSON file with the organization's existing show records
    #[arg(short, long)]
    pub existing: Option<PathBuf>,

    /// How candidates are derived
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
}

/// Arguments for the retry command.
#[derive(Debug, Parser)]
pub struct RetryArgs {
    /// Job ID
    pub job_id: String,

    /// Source document, read again from disk
    pub file: PathBuf,

    /// Declared MIME type
    #[arg(short, long)]
    pub mime: Option<String>,

    /// JSON file with the organization's existing show records
    #[arg(short, long)]
    pub existing: Option<PathBuf>,

    /// How candidates are derived
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
}

/// Arguments for the improve command.
#[derive(Debug, Parser)]
pub struct ImproveArgs {
    /// Job ID
    pub job_id: String,

    /// JSON file with the organization's existing show records
    #[arg(short, long)]
    pub existing: Option<PathBuf>,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Job ID
    pub job_id: String,
}

/// Arguments for the jobs command.
#[derive(Debug, Parser)]
pub struct JobsArgs {
    /// Organization to list
    #[arg(short, long)]
    pub org: Option<String>,
}

/// Extraction mode argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ModeArg {
    /// Language-model extraction
    Llm,
    /// Regex extraction, no backend calls
    RuleBased,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl From<ModeArg> for ExtractionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Llm => ExtractionMode::Llm,
            ModeArg::RuleBased => ExtractionMode::RuleBased,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_command() {
        let cli = Cli::parse_from([
            "tourbook",
            "import",
            "offer.pdf",
            "--org",
            "acme",
            "--mode",
            "rule-based",
        ]);
        match cli.command {
            Command::Import(args) => {
                assert_eq!(args.file, PathBuf::from("offer.pdf"));
                assert_eq!(args.org.as_deref(), Some("acme"));
                assert!(matches!(args.mode, Some(ModeArg::RuleBased)));
            }
            _ => panic!("Expected Import command"),
        }
    }

    #[test]
    fn test_email_command() {
        let cli = Cli::parse_from([
            "tourbook",
            "email",
            "--subject",
            "Hold: March 3",
            "--from",
            "agent@example.com",
            "--body-file",
            "body.txt",
        ]);
        assert!(matches!(cli.command, Command::Email(_)));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["tourbook", "jobs", "--format", "json", "--no-color", "-v"]);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert!(cli.no_color);
        assert!(cli.verbose);
    }

    #[test]
    fn test_mode_conversion() {
        let mode: ExtractionMode = ModeArg::RuleBased.into();
        assert_eq!(mode, ExtractionMode::RuleBased);
    }
}
