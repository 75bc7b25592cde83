//! `placard`: render a template from a directory of templates.
//!
//! ```text
//! placard --root site --data page.yaml layout.html > index.html
//! placard --root site --list
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use placard::{Environment, LoaderConfig, TemplateCache, TemplateLoader, DEFAULT_MAX_NESTING};
use tracing::Level;

mod data;

#[derive(Parser, Debug)]
#[command(name = "placard", version, about = "Render placeholder templates from a directory")]
struct Cli {
    /// Template to render, named relative to the root (e.g. `pages/index.html`)
    #[arg(required_unless_present = "list")]
    template: Option<String>,

    /// Directory holding the templates
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Extension of template files
    #[arg(long, default_value = "html")]
    ext: String,

    /// Directories whose name matches this pattern are skipped
    #[arg(long, default_value = r"^\.git$")]
    ignore: String,

    /// JSON or YAML file whose top-level fields become bindings
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Literal binding, applied after the data file
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = data::parse_binding)]
    set: Vec<(String, String)>,

    /// Limit for templates rendered inside templates
    #[arg(long, default_value_t = DEFAULT_MAX_NESTING)]
    max_nesting: usize,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the names of all loaded templates and exit
    #[arg(long)]
    list: bool,

    /// More logging on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = LoaderConfig::new(&cli.root, &cli.ext)
        .ignore_dirs(&cli.ignore)
        .with_context(|| format!("invalid --ignore pattern {:?}", cli.ignore))?;
    let sources = TemplateLoader::new(config)
        .load()
        .context("failed to load templates")?;
    let cache = TemplateCache::from_sources(&sources);
    tracing::info!(root = %cli.root.display(), templates = cache.len(), "templates loaded");

    if cli.list {
        let mut stdout = std::io::stdout().lock();
        for name in cache.names() {
            writeln!(stdout, "{name}")?;
        }
        return Ok(());
    }

    // clap enforces a template unless --list was given
    let name = cli.template.as_deref().unwrap_or_default();
    let bindings = data::build_bindings(cli.data.as_deref(), &cli.set)?;
    let env = Environment::new(Arc::new(cache)).with_max_nesting(cli.max_nesting);
    let rendered = env
        .render_named(name, bindings)
        .with_context(|| format!("no template named {name:?} below {}", cli.root.display()))?;

    match &cli.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => std::io::stdout().lock().write_all(rendered.as_bytes())?,
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli)
}
