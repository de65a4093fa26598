use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

use kiosk_assets::{
    ArgOption, AssetFetcher, DownloadProgress, HttpAssetClient, Language, ProgramConfig,
    SelectionKey,
};
use kiosk_runtime::{RunObserver, RunOutcome, RunPhase, Session};

mod selection;
mod settings;

use selection::SelectionStore;
use settings::Settings;

#[derive(Parser)]
#[command(name = "kiosk", about = "Run demo programs from a published asset catalog")]
struct Cli {
    /// Path to a settings file (default: ~/.kiosk/config.toml if present)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Override the assets root URL
    #[arg(long)]
    assets_root: Option<String>,

    /// Source language variant (clojure or yamlscript)
    #[arg(long)]
    language: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the programs in the catalog
    List,
    /// Show the selectable arguments for a program
    Args { program: String },
    /// Print a program's source, intermediate, or target listing
    Show {
        program: String,
        #[arg(long, value_enum, default_value_t = Panel::Source)]
        panel: Panel,
    },
    /// Download (on first use), compile, and run a program
    Run {
        /// Program name; defaults to the last-run program
        program: Option<String>,
        /// Argument value; defaults to the remembered or declared default
        #[arg(long)]
        arg: Option<String>,
        /// Print the output as an HTML-escaped block
        #[arg(long)]
        html: bool,
    },
    /// Forget the remembered language/program/argument selection
    Reset,
}

#[derive(Clone, Copy, ValueEnum)]
enum Panel {
    Source,
    Intermediate,
    Listing,
}

/// Prints run feedback to stderr, keeping stdout for program output.
struct ConsoleObserver;

impl RunObserver for ConsoleObserver {
    fn on_phase(&self, phase: RunPhase) {
        eprintln!("{}", phase.feedback());
    }

    fn on_download_progress(&self, progress: DownloadProgress) {
        eprint!("\rDownloading: {progress}    ");
        let _ = std::io::stderr().flush();
        if progress.percent() == Some(100) {
            eprintln!();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_env("KIOSK_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let store_path = SelectionStore::default_path();
    if let Command::Reset = cli.command {
        SelectionStore::clear(&store_path);
        println!("Selection cleared.");
        return Ok(());
    }

    let settings = Settings::load(cli.settings.as_deref())?;
    let assets_root = cli
        .assets_root
        .unwrap_or_else(|| settings.assets_root.clone());
    let fetcher = Arc::new(HttpAssetClient::new(&assets_root));

    // A catalog failure aborts: nothing else is usable without it.
    let config = ProgramConfig::load(fetcher.as_ref())
        .await
        .context("cannot load program catalog")?;

    let mut store = SelectionStore::load(&store_path);
    let language = resolve_language(&cli.language, &store, &settings);

    match cli.command {
        Command::List => {
            for name in config.program_names() {
                println!("{name}");
            }
        }
        Command::Args { program } => {
            let options = config.argument_set(&program)?.resolve();
            for option in &options {
                let marker = if option.is_default { "*" } else { " " };
                println!("{marker} {}  ({})", option.label, option.value);
            }
        }
        Command::Show { program, panel } => {
            let key = SelectionKey::new(language, program);
            let path = match panel {
                Panel::Source => key.source_path(),
                Panel::Intermediate => key.intermediate_path(),
                Panel::Listing => key.listing_path(),
            };
            // A display asset failure is inline; it never takes the tool down.
            match fetcher.fetch_text(&path).await {
                Ok(text) => println!("{text}"),
                Err(e) => println!("Error loading {path}: {e}"),
            }
        }
        Command::Run { program, arg, html } => {
            let program = pick_program(&config, program.as_deref(), &store)?;
            let key = SelectionKey::new(language, program.clone());
            let options = config.argument_set(&program)?.resolve();
            let raw_arg = pick_argument(&options, arg.as_deref(), store.last_arg(&program));

            store.last_language = Some(language.to_string());
            store.last_program = Some(program.clone());
            store.remember_arg(&program, &raw_arg);
            store.save(&store_path);

            let session = Session::new(fetcher.clone())?;
            let result = session.run(&key, &raw_arg, &ConsoleObserver).await;

            let output = if html {
                result.rendered_html()
            } else {
                result.lines.join("\n")
            };
            if !output.is_empty() {
                println!("{output}");
            }

            match result.outcome {
                RunOutcome::Completed { duration } => {
                    println!("Program complete ({}ms).", duration.as_millis());
                }
                RunOutcome::Failed { error } => bail!(error),
            }
        }
        Command::Reset => unreachable!("handled above"),
    }

    Ok(())
}

fn resolve_language(flag: &Option<String>, store: &SelectionStore, settings: &Settings) -> Language {
    let requested = flag
        .as_deref()
        .or(store.last_language.as_deref())
        .unwrap_or(&settings.default_language);
    requested.parse().unwrap_or_else(|_| {
        tracing::warn!(requested, "unknown language, falling back to clojure");
        Language::Clojure
    })
}

fn pick_program(
    config: &ProgramConfig,
    flag: Option<&str>,
    store: &SelectionStore,
) -> Result<String> {
    if let Some(name) = flag {
        if !config.contains(name) {
            bail!("unknown program: {name}");
        }
        return Ok(name.to_string());
    }
    if let Some(name) = store.last_program.as_deref() {
        if config.contains(name) {
            return Ok(name.to_string());
        }
    }
    config
        .program_names()
        .next()
        .map(str::to_string)
        .context("the program catalog is empty")
}

/// Choose the argument value: explicit flag, then the remembered value (if
/// it is still one of the declared options), then the declared default,
/// then the first option.
fn pick_argument(options: &[ArgOption], flag: Option<&str>, remembered: Option<&str>) -> String {
    if let Some(value) = flag {
        return value.to_string();
    }
    if let Some(saved) = remembered {
        if options.iter().any(|o| o.value == saved) {
            return saved.to_string();
        }
    }
    options
        .iter()
        .find(|o| o.is_default)
        .or_else(|| options.first())
        .map(|o| o.value.clone())
        .unwrap_or_else(|| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(value: &str, is_default: bool) -> ArgOption {
        ArgOption {
            label: value.to_string(),
            value: value.to_string(),
            is_default,
        }
    }

    #[test]
    fn explicit_argument_wins() {
        let options = vec![option("1", false), option("3", true)];
        assert_eq!(pick_argument(&options, Some("9"), Some("1")), "9");
    }

    #[test]
    fn remembered_argument_must_still_exist() {
        let options = vec![option("1", false), option("3", true)];
        assert_eq!(pick_argument(&options, None, Some("1")), "1");
        assert_eq!(pick_argument(&options, None, Some("99")), "3");
    }

    #[test]
    fn falls_back_to_first_option_without_default() {
        let options = vec![option("a", false), option("b", false)];
        assert_eq!(pick_argument(&options, None, None), "a");
    }

    #[test]
    fn no_options_means_empty_arg_list() {
        assert_eq!(pick_argument(&[], None, None), "[]");
    }
}
