//! CLI entry point for `mhtsplit`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use mhtsplit::config::Config;
use mhtsplit::{Archive, Capabilities, Decomposer};

#[derive(Parser)]
#[command(
    name = "mhtsplit",
    version,
    about = "Split MHTML web archives into their resources"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List the resources found in an archive
    List {
        path: PathBuf,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Download scripts referenced by http(s) URLs
        #[arg(long)]
        fetch_external: bool,
    },
    /// Write resources to a directory
    Extract {
        path: PathBuf,
        /// Output directory (default: next to the archive, named after it)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Comma-separated resource indices to extract (default: all)
        #[arg(short, long, value_delimiter = ',', value_name = "INDEX")]
        select: Option<Vec<usize>>,
        /// Download scripts referenced by http(s) URLs
        #[arg(long)]
        fetch_external: bool,
    },
    /// Print the decoded HTML page
    Html { path: PathBuf },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = mhtsplit::config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::List {
            path,
            json,
            fetch_external,
        } => cmd_list(&path, json, fetch_external, &config),
        Commands::Extract {
            path,
            output,
            select,
            fetch_external,
        } => cmd_extract(&path, output, select.as_deref(), fetch_external, &config),
        Commands::Html { path } => cmd_html(&path, &config),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = mhtsplit::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mhtsplit.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Build a decomposer for `path` and parse it, with a spinner while it runs.
///
/// Fetching is turned off with a warning when this build has no HTTP client.
fn open_archive(path: &Path, fetch_external: bool, config: &Config) -> anyhow::Result<Archive> {
    let mut options = config.decompose_options();
    options.fetch_external |= fetch_external;
    if options.negotiate(Capabilities::current()) {
        eprintln!("  Warning: external script fetching is not supported by this build");
    }

    let mut decomposer = Decomposer::new(path, options)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    spinner.set_message(format!("Parsing {}", path.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let parsed = decomposer.parse().map(|_| ());
    spinner.finish_and_clear();
    parsed?;

    decomposer
        .into_archive()
        .ok_or_else(|| anyhow::anyhow!("No archive parsed from {}", path.display()))
}

/// List resources as a table or JSON.
fn cmd_list(path: &Path, json: bool, fetch_external: bool, config: &Config) -> anyhow::Result<()> {
    let archive = open_archive(path, fetch_external, config)?;

    if json {
        let output = serde_json::json!({
            "file": path.to_string_lossy(),
            "has_html": archive.html_content().is_some(),
            "resource_count": archive.resources().len(),
            "resources": archive.summaries(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_resource_table(&archive);
    }
    Ok(())
}

/// Extract the selected resources.
fn cmd_extract(
    path: &Path,
    output: Option<PathBuf>,
    select: Option<&[usize]>,
    fetch_external: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let archive = open_archive(path, fetch_external, config)?;
    let output = output.unwrap_or_else(|| default_output_dir(path, config));

    if let Some(indices) = select {
        let count = archive.resources().len();
        for &i in indices.iter().filter(|&&i| i >= count) {
            eprintln!("  Warning: no resource #{i} (archive has {count})");
        }
    }

    let paths = archive.extract_resources(&output, select)?;
    println!(
        "  Extracted {} resource(s) to {}",
        paths.len(),
        output.display()
    );
    Ok(())
}

/// Print the decoded HTML page.
fn cmd_html(path: &Path, config: &Config) -> anyhow::Result<()> {
    let archive = open_archive(path, false, config)?;
    match archive.html_content() {
        Some(html) => {
            println!("{html}");
            Ok(())
        }
        None => anyhow::bail!("No HTML page found in {}", path.display()),
    }
}

/// `<dir of archive>/<archive stem>`, unless the config names a directory.
fn default_output_dir(path: &Path, config: &Config) -> PathBuf {
    if let Some(ref dir) = config.extract.default_output_dir {
        return dir.clone();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mhtml_resources".to_string());
    path.parent().unwrap_or(Path::new(".")).join(stem)
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mhtsplit", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Print resources as a human-readable table.
fn print_resource_table(archive: &Archive) {
    use humansize::{format_size, BINARY};

    let resources = archive.resources();
    println!();
    println!("  {} resource(s) in {}", resources.len(), archive.path().display());
    println!();

    if resources.is_empty() {
        return;
    }

    println!(
        "  {:<4} {:<24} {:<40} {:>10} {:<8}",
        "#", "Type", "Filename", "Size", "Source"
    );
    println!("  {}", "-".repeat(90));

    for (i, res) in resources.iter().enumerate() {
        let ctype: String = res.content_type.chars().take(23).collect();
        let name: String = res.filename.chars().take(39).collect();
        println!(
            "  {:<4} {:<24} {:<40} {:>10} {:<8}",
            i,
            ctype,
            name,
            format_size(res.size(), BINARY),
            res.source
        );
    }
    println!();
}
