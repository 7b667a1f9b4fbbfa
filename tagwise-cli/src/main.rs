//! Tagwise CLI
//!
//! Lints HTML files, or dumps what the linter sees of them.

mod formatter;

use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgGroup, Parser};
use tagwise_engine::{Config, Engine};
use tagwise_html::Source;

use formatter::Format;

/// Static analysis for HTML markup
#[derive(Parser, Debug)]
#[command(name = "tagwise")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("dump").args(["dump_tokens", "dump_events", "dump_tree"])))]
#[command(after_help = r#"EXAMPLES:
    # Lint with the recommended preset
    tagwise index.html

    # Lint with a configuration file
    tagwise --config tagwise.json src/*.html

    # Machine readable output
    tagwise --formatter json index.html

    # Show the parsed element tree
    tagwise --dump-tree index.html
"#)]
struct Cli {
    /// Files to lint
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Configuration file or preset name (default: tagwise:recommended)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    formatter: Format,

    /// Print the token stream instead of linting
    #[arg(long)]
    dump_tokens: bool,

    /// Print parser events instead of linting
    #[arg(long)]
    dump_events: bool,

    /// Print the element tree instead of linting
    #[arg(long)]
    dump_tree: bool,

    /// Never colour the output
    #[arg(long)]
    no_color: bool,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::from_file(path).with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(Config::default_config()),
    }
}

fn load_sources(files: &[PathBuf]) -> anyhow::Result<Vec<Source>> {
    files
        .iter()
        .map(|path| {
            let data = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
            Ok(Source::new(data, path.display().to_string()))
        })
        .collect()
}

fn print_dump(engine: &Engine, cli: &Cli, sources: &[Source]) -> anyhow::Result<()> {
    if cli.dump_tokens {
        for token in engine.dump_tokens(sources)? {
            let data = token.data.as_deref().map_or_else(|| "null".to_string(), |data| format!("{data:?}"));
            println!("{:<14} {:<20} {data}", token.token, token.location);
        }
    } else if cli.dump_events {
        for event in engine.dump_events(sources)? {
            println!("{}: {}", event.event, event.data);
        }
    } else {
        for source in sources {
            for line in engine.dump_tree(source)? {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let engine = Engine::from_config(&config).context("invalid configuration")?;
    let sources = load_sources(&cli.files)?;
    log::debug!("linting {} file(s) with {} rule(s)", sources.len(), engine.config().rules().len());

    if cli.dump_tokens || cli.dump_events || cli.dump_tree {
        return print_dump(&engine, &cli, &sources);
    }

    let report = engine.lint(&sources);
    let color = !cli.no_color && std::io::stdout().is_terminal();
    print!("{}", cli.formatter.render(&report, color)?);

    if !report.valid {
        std::process::exit(1);
    }
    Ok(())
}
