use std::sync::Arc;

use clap::{value_parser, Arg, Command};
use dotenv::dotenv;
use tokio::net::{TcpListener, UnixListener};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use worksheet_tutor::config::Config;
use worksheet_tutor::server::{router, AppState};
use worksheet_tutor::Tutor;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let listen = Listen::from_matches(&cli().get_matches());
    dotenv().ok();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let gemini = Arc::new(config.gemini()?);
    let vision = config.vision()?;

    let shared_state = Arc::new(AppState {
        tutor: Tutor::new(gemini.clone(), config.style_timeout),
        detector: Arc::new(vision),
        structurer: gemini,
        max_image_base64: config.max_image_base64,
        max_body_bytes: config.max_body_bytes,
    });

    let app = router(shared_state);

    info!("Initialized routes");

    match listen {
        Listen::Unix(socket_path) => {
            // stale socket from a previous run
            tokio::fs::remove_file(&socket_path).await.ok();
            let listener = UnixListener::bind(&socket_path)?;

            info!("Starting server on Unix socket: {}", socket_path);
            axum::serve(listener, app.into_make_service()).await?;
        }
        Listen::Tcp(port) => {
            let listener = TcpListener::bind(("0.0.0.0", port)).await?;
            info!("Starting server on port {}", port);
            axum::serve(listener, app.into_make_service()).await?;
        }
    }

    Ok(())
}

#[derive(Debug, PartialEq)]
enum Listen {
    Tcp(u16),
    Unix(String),
}

impl Listen {
    fn from_matches(matches: &clap::ArgMatches) -> Self {
        match matches.get_one::<String>("unix") {
            Some(path) => Listen::Unix(path.clone()),
            None => Listen::Tcp(matches.get_one::<u16>("port").copied().unwrap_or(3333)),
        }
    }
}

fn cli() -> Command {
    Command::new("worksheet-tutor")
        .about("Serve the tutoring and worksheet-scan API")
        .arg(Arg::new("port")
                .value_parser(value_parser!(u16))
                .default_value("3333")
                .help("TCP port to listen on"))
        .arg(Arg::new("unix")
                .long("unix")
                .value_name("PATH")
                .conflicts_with("port")
                .help("Listen on a Unix socket instead"))
}
