use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use clap::Parser;
use error_stack::{Report, ResultExt};
use status_pages::Pages;
use tower_http::trace::{DefaultOnFailure, DefaultOnRequest, TraceLayer};
use tracing::{Level, Span};
use tracing_subscriber::EnvFilter;

use crate::{
    config::{merge_server_config, read_config},
    routes::ServerState,
};

mod config;
mod error;
mod routes;

use error::Error;

#[derive(Debug, Parser)]
#[command(version, about)]
pub(crate) struct Cli {
    /// The path to the configuration file or a directory containing `status-pages.toml`.
    #[clap(long, short = 'c')]
    config: Option<PathBuf>,

    /// Do not read the .env file
    #[clap(long)]
    no_dotenv: bool,

    /// A directory of error page templates. Overrides `template_dir` in the config file.
    #[clap(long, env = "STATUS_PAGES_TEMPLATES")]
    templates: Option<String>,

    /// The IP host to bind to
    #[clap(long, env = "STATUS_PAGES_HOST")]
    host: Option<String>,

    /// The TCP port to listen on
    #[clap(long, env = "STATUS_PAGES_PORT")]
    port: Option<u16>,
}

fn configure_tracing() {
    let filter = EnvFilter::try_from_env("STATUS_PAGES_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc_3339())
        .init();
}

async fn run(cmd: Cli) -> Result<(), Report<Error>> {
    let file_config = read_config(cmd.config.as_deref())?;

    let cmd = if !cmd.no_dotenv && file_config.dotenv.unwrap_or(true) {
        dotenvy::dotenv().ok();
        // Reread with the environment variables in place
        Cli::parse()
    } else {
        cmd
    };

    let server_config = merge_server_config(&cmd, file_config);

    // Must run dotenv before starting tracing, so that it can set the log filter.
    configure_tracing();

    if let Some(dir) = &server_config.pages.template_dir {
        tracing::info!("Loading templates from {}", dir.display());
    }

    let pages = Pages::builder()
        .with_config(server_config.pages.clone())
        .build()
        .change_context(Error::Pages)?;

    let state = ServerState {
        pages: Arc::new(pages),
    };

    let app = routes::create_routes(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &axum::extract::Request| {
                let request_id = req
                    .headers()
                    .get("X-Request-Id")
                    .and_then(|s| s.to_str().ok())
                    .unwrap_or("");

                tracing::info_span!("request",
                    request_id,
                    http.method=%req.method(),
                    http.uri=%req.uri(),
                    http.status_code = tracing::field::Empty,
                )
            })
            .on_response(|res: &http::Response<_>, latency: Duration, span: &Span| {
                let status = res.status();
                span.record("http.status_code", status.as_u16());

                tracing::info!(
                    latency = %format!("{} ms", latency.as_millis()),
                    http.status_code = status.as_u16(),
                    "finished processing request"
                );
            })
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
    );

    let bind_ip = server_config
        .host
        .as_deref()
        .unwrap_or("::1")
        .parse::<IpAddr>()
        .change_context(Error::ServerStart)?;
    let port = server_config.port.unwrap_or(8080);
    let listener = tokio::net::TcpListener::bind(SocketAddr::from((bind_ip, port)))
        .await
        .change_context(Error::ServerStart)?;
    let actual_addr = listener.local_addr().change_context(Error::ServerStart)?;
    tracing::info!("Listening on {actual_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .change_context(Error::ServerStart)?;

    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
}

#[tokio::main]
async fn main() -> Result<(), Report<Error>> {
    error_stack::Report::set_color_mode(error_stack::fmt::ColorMode::None);
    let cli = Cli::parse();
    run(cli).await
}
