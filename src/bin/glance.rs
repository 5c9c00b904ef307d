//! CLI binary for glance.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use glance::{
    ExternalOpener, GlanceConfig, HttpProbeSurface, LoaderEvent, Navigator, PageSession,
    SearchEngine, SearchOutcome, SystemOpener,
};
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Glance: an address bar with instant answers.
#[derive(Parser)]
#[command(name = "glance", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Resolve address-bar input to the URL that would be loaded.
    Open {
        /// A URL, bare domain, or search phrase.
        input: String,

        /// Engine id for search phrases (see `glance engines`).
        #[arg(short, long)]
        engine: Option<String>,

        /// Route direct URLs through the reader service.
        #[arg(short, long)]
        reader: bool,

        /// Probe the page and report whether it can be embedded.
        #[arg(long)]
        load: bool,

        /// Open the page in the system browser. With `--load`, only when
        /// the page cannot be embedded.
        #[arg(short = 'x', long)]
        external: bool,
    },

    /// Ask the instant-answer service.
    Search {
        /// Query words.
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the reader-service URL for a page.
    Reader {
        /// Page URL.
        url: String,
    },

    /// List navigation engines.
    Engines,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("glance=info,glance_search=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = GlanceConfig::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Command::Open {
            input,
            engine,
            reader,
            load,
            external,
        } => {
            let options = OpenOptions {
                engine,
                reader,
                load,
                external,
            };
            run_open(config, &input, options).await
        }
        Command::Search { query, json } => run_search(config, &query.join(" "), json).await,
        Command::Reader { url } => {
            println!("{}", Navigator::from_config(&config.navigator).reader_url(&url));
            Ok(())
        }
        Command::Engines => list_engines(&config),
    }
}

/// Flags of the `open` command.
struct OpenOptions {
    engine: Option<String>,
    reader: bool,
    load: bool,
    external: bool,
}

fn probe_session(config: GlanceConfig) -> anyhow::Result<PageSession<io::Stdout>> {
    let surface = HttpProbeSurface::new(Duration::from_secs(config.search.timeout_seconds))?;
    let session = PageSession::new(
        config,
        Arc::new(surface),
        Arc::new(SystemOpener::default()),
        io::stdout(),
    )?;
    Ok(session)
}

async fn run_open(
    config: GlanceConfig,
    input: &str,
    options: OpenOptions,
) -> anyhow::Result<()> {
    if let Some(engine) = &options.engine {
        if SearchEngine::from_id(engine).is_none() {
            anyhow::bail!("unknown engine `{engine}` (see `glance engines`)");
        }
    }

    if !options.load {
        let navigator = Navigator::from_config(&config.navigator);
        let engine_id = options
            .engine
            .as_deref()
            .unwrap_or(navigator.default_engine().id());
        let reader = options.reader || config.navigator.reader_mode;
        let Some(target) = navigator.route(input, engine_id, reader) else {
            anyhow::bail!("nothing to open");
        };
        println!("{}", target.final_url);
        if options.external {
            SystemOpener::default().open(&target.final_url)?;
        }
        return Ok(());
    }

    let mut session = probe_session(config)?;
    if let Some(engine) = &options.engine {
        session.set_engine(engine);
    }
    if options.reader {
        session.set_reader_mode(true);
    }

    let mut events = session.subscribe();
    let Some(target) = session.navigate(input) else {
        anyhow::bail!("nothing to open");
    };
    println!("{}", target.final_url);

    let embedded = wait_for_load(&mut session, &mut events, &target.final_url).await?;
    if !embedded && options.external {
        session.open_fallback_external()?;
    }
    session.teardown();
    Ok(())
}

/// Block until the load of `url` completes or falls back.
///
/// Returns `true` if the surface reported the page as loaded.
async fn wait_for_load<W: Write>(
    session: &mut PageSession<W>,
    events: &mut broadcast::Receiver<LoaderEvent>,
    url: &str,
) -> anyhow::Result<bool> {
    loop {
        match events.recv().await {
            Ok(LoaderEvent::Loaded { url: loaded }) if loaded == url => {
                println!("loaded");
                return Ok(true);
            }
            Ok(LoaderEvent::FallbackOffered(offer)) if offer.url == url => {
                session.show_fallback(&offer)?;
                return Ok(false);
            }
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => {
                anyhow::bail!("loader stopped before {url} finished")
            }
        }
    }
}

async fn run_search(config: GlanceConfig, query: &str, json: bool) -> anyhow::Result<()> {
    if json {
        let results = glance_search::search(query, &config.search).await?;
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    let mut session = probe_session(config)?;
    let outcome = session.submit_search(query).await?;
    if let SearchOutcome::Results(results) = &outcome {
        info!(count = results.len(), "search finished");
    }
    session.teardown();
    if matches!(outcome, SearchOutcome::Failed { .. }) {
        std::process::exit(1);
    }
    Ok(())
}

fn list_engines(config: &GlanceConfig) -> anyhow::Result<()> {
    let default = Navigator::from_config(&config.navigator).default_engine();
    let mut out = io::stdout().lock();
    for engine in SearchEngine::all() {
        let marker = if *engine == default { " (default)" } else { "" };
        writeln!(out, "{:<8}{}{marker}", engine.id(), engine.name())?;
    }
    Ok(())
}
