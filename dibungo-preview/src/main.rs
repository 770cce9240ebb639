use clap::Parser;
use dibungo_preview::{
    HttpSource, PreviewConfig, PreviewError, PreviewHandle, PreviewRouter, RouterStopped,
    SessionSnapshot, Window, config::ORIGIN_ENV,
};
use std::path::PathBuf;
use url::Url;

/// Preview a DI BUNGO storefront template from the command line.
///
/// Opens URL in a headless window, runs the template router against the HTTP
/// server hosting `/templates/`, then applies the requested navigations.
#[derive(Parser, Debug)]
#[command(name = "preview")]
struct Cli {
    /// Page URL, e.g. http://template1.localhost/#menu
    url: String,

    /// Base URL of the server hosting the template files
    #[arg(long, env = ORIGIN_ENV, default_value = "http://127.0.0.1:8080/")]
    origin: Url,

    /// YAML config; the built-in templates are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Navigate to PAGE after loading (repeatable, applied in order)
    #[arg(long = "navigate", value_name = "PAGE")]
    navigate: Vec<String>,

    /// Press the back button N times after navigating
    #[arg(long, default_value_t = 0)]
    back: usize,

    /// Print the session snapshot as JSON
    #[arg(long)]
    state: bool,

    /// Print the final document HTML
    #[arg(long)]
    html: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Preview(#[from] PreviewError),
    #[error(transparent)]
    Stopped(#[from] RouterStopped),
    #[error("runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("encode snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() {
    match main_result() {
        Ok(_) => {}
        Err(err) => {
            eprintln!("preview: {}", err);
            std::process::exit(1);
        }
    }
}

fn main_result() -> Result<(), CliError> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PreviewConfig::load(path).map_err(PreviewError::from)?,
        None => PreviewConfig::builtin().map_err(PreviewError::from)?,
    };

    let default_filter = if config.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let window = Window::open(&cli.url).map_err(PreviewError::from)?;
    let source = HttpSource::new(cli.origin.clone(), config.loading_timeout());
    log::info!("Previewing {} via {}", cli.url, cli.origin);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let mut router = PreviewRouter::new(config, source, window);
        let (handle, rx) = PreviewHandle::channel(16);
        let (_, driven) = tokio::join!(router.run(rx), drive(handle, &cli));
        let (snapshot, html) = driven?;
        report(&cli, &snapshot, &html)
    })
}

/// Applies the CLI navigations through the handle, then collects the results.
/// The handle is dropped on return, which stops the router loop.
async fn drive(handle: PreviewHandle, cli: &Cli) -> Result<(SessionSnapshot, String), RouterStopped> {
    for page in &cli.navigate {
        handle.navigate_to_page(page).await?;
    }
    for _ in 0..cli.back {
        handle.back().await?;
    }
    let snapshot = handle.state().await?;
    let html = handle.document_html().await?;
    Ok((snapshot, html))
}

fn report(cli: &Cli, snapshot: &SessionSnapshot, html: &str) -> Result<(), CliError> {
    if cli.state {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    } else {
        println!("url:      {}", snapshot.url);
        println!("title:    {}", snapshot.title);
        println!("page:     {}", snapshot.current_page);
        match &snapshot.template {
            Some(t) => println!("template: {} ({})", t.display_name, t.id),
            None => println!("template: (none, preview mode off)"),
        }
    }
    if cli.html {
        println!("{}", html);
    }
    Ok(())
}
