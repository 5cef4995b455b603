//! copyclean CLI - citation noise remover for copied AI chat text
//!
//! Cleans text from files or stdin the same way the clipboard integration does.

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use copyclean::{clean, clean_batch, render::to_html, CleaningMode, CleaningResult, Settings};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Strip citations, reference blocks and link noise from copied AI chat text
#[derive(Parser)]
#[command(
    name = "copyclean",
    version,
    about = "Clean citation noise out of copied AI chat text",
    long_about = "copyclean - removes citation markers, reference definitions, source badges\n\
                  and link noise from text copied out of AI chat assistants.\n\n\
                  Usage:\n  \
                  copyclean clean answer.txt          Print the cleaned text\n  \
                  pbpaste | copyclean clean           Clean stdin\n  \
                  copyclean check answer.txt          Exit 1 if cleaning would change it\n  \
                  copyclean batch *.txt -o cleaned/   Clean many files in parallel"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a file (or stdin) and print the result
    Clean {
        /// Input file path (default: stdin)
        input: Option<PathBuf>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Report whether cleaning would change the input (exit 1 if it would)
    Check {
        /// Input file path (default: stdin)
        input: Option<PathBuf>,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Clean several files in parallel into an output directory
    Batch {
        /// Input files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Show version information
    Version,
}

/// Settings shared by every cleaning command.
#[derive(Args)]
struct SettingsArgs {
    /// Cleaning mode (overrides the settings file)
    #[arg(short, long)]
    mode: Option<ModeArg>,

    /// Apply the rules inside fenced and inline code too
    #[arg(long)]
    no_protect_code: bool,

    /// Settings snapshot in JSON (camelCase keys)
    #[arg(long)]
    settings: Option<PathBuf>,
}

/// Cleaning mode
#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Remove links, bare URLs and every bracketed marker
    Aggressive,
    /// Keep links, remove numeric markers and tracking parameters
    Conservative,
}

impl From<ModeArg> for CleaningMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Aggressive => CleaningMode::Aggressive,
            ModeArg::Conservative => CleaningMode::Conservative,
        }
    }
}

/// Output format
#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Cleaned plain text
    Text,
    /// HTML fragment
    Html,
    /// Both flavors as JSON
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Clean {
            input,
            output,
            format,
            settings,
        } => {
            let settings = settings.resolve()?;
            let text = read_input(input.as_deref())?;
            let result = clean_or_passthrough(&text, &settings);

            let rendered = match format {
                OutputFormat::Text => result.plain_text,
                OutputFormat::Html => result.html,
                OutputFormat::Json => serde_json::to_string_pretty(&result)?,
            };
            write_output(output.as_deref(), &rendered)?;

            if let Some(path) = output {
                eprintln!("{} Cleaned: {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Check { input, settings } => {
            let settings = settings.resolve()?;
            let text = read_input(input.as_deref())?;
            let result = clean(&text, &settings);

            if result.differs_from(&text) {
                let removed = text.len().saturating_sub(result.plain_text.len());
                println!(
                    "{} Cleaning would change the text ({} bytes removed, {} -> {} lines)",
                    "✗".red().bold(),
                    removed,
                    text.lines().count(),
                    result.plain_text.lines().count()
                );
                std::process::exit(1);
            }

            println!("{} Already clean", "✓".green().bold());
        }

        Commands::Batch {
            inputs,
            output,
            settings,
        } => {
            let settings = settings.resolve()?;
            run_batch(&inputs, &output, &settings)?;
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

impl SettingsArgs {
    /// Loads the snapshot file (if any) and applies the command-line overrides.
    fn resolve(&self) -> Result<Settings, Box<dyn std::error::Error>> {
        let mut settings = match &self.settings {
            Some(path) => Settings::from_json(&fs::read_to_string(path)?)?,
            None => Settings::default(),
        };

        if let Some(mode) = self.mode {
            settings = settings.with_mode(mode.into());
        }
        if self.no_protect_code {
            settings = settings.without_code_protection();
        }

        tracing::debug!(?settings, "resolved settings");
        Ok(settings)
    }
}

/// A disabled snapshot leaves the text as it was.
fn clean_or_passthrough(text: &str, settings: &Settings) -> CleaningResult {
    if settings.enabled {
        return clean(text, settings);
    }

    tracing::warn!("cleaning is disabled in the settings snapshot; passing text through");
    CleaningResult {
        plain_text: text.to_string(),
        html: to_html(text),
    }
}

fn run_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(output_dir)?;

    let pb = create_spinner("Reading files...");
    let texts = inputs
        .iter()
        .map(fs::read_to_string)
        .collect::<Result<Vec<_>, _>>()?;

    pb.set_message("Cleaning...");
    let results = clean_batch(&texts, settings);
    pb.finish_and_clear();

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap(),
    );

    let mut changed = 0;
    for ((input, text), result) in inputs.iter().zip(&texts).zip(&results) {
        let name = input.file_name().unwrap_or(input.as_os_str());
        pb.set_message(name.to_string_lossy().to_string());
        fs::write(output_dir.join(name), &result.plain_text)?;
        if result.differs_from(text) {
            changed += 1;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!("{}", "Batch Complete".green().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Output".bold(), output_dir.display());
    println!("{}: {}", "Files".bold(), inputs.len());
    println!("{}: {}", "Changed".bold(), changed);

    Ok(())
}

fn print_version() {
    println!("{} {}", "copyclean".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Citation and link noise remover for copied AI chat text");
    println!();
    println!("Modes: aggressive (default), conservative");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_input(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(p) => fs::read_to_string(p),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn write_output(path: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_settings_overrides() {
        let cli = Cli::parse_from([
            "copyclean",
            "clean",
            "--mode",
            "conservative",
            "--no-protect-code",
        ]);
        let Commands::Clean { settings, .. } = cli.command else {
            panic!("expected clean command");
        };

        let resolved = settings.resolve().unwrap();
        assert_eq!(resolved.mode, CleaningMode::Conservative);
        assert!(!resolved.protect_code_blocks);
    }

    #[test]
    fn test_settings_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"mode":"conservative","showNotifications":false}"#).unwrap();

        let args = SettingsArgs {
            mode: None,
            no_protect_code: false,
            settings: Some(path),
        };
        let resolved = args.resolve().unwrap();
        assert_eq!(resolved.mode, CleaningMode::Conservative);
        assert!(!resolved.show_notifications);
    }

    #[test]
    fn test_disabled_passthrough() {
        let result = clean_or_passthrough("a [1]", &Settings::default().disabled());
        assert_eq!(result.plain_text, "a [1]");
    }

    #[test]
    fn test_batch_writes_cleaned_files() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("answer.txt");
        fs::write(&input, "Rust is fast [1].\n[1]: https://rust-lang.org\n").unwrap();

        let out = dir.path().join("out");
        run_batch(&[input], &out, &Settings::default()).unwrap();

        let cleaned = fs::read_to_string(out.join("answer.txt")).unwrap();
        assert_eq!(cleaned, "Rust is fast.");
    }
}
