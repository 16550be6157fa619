use clap::Parser;
use std::path::PathBuf;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

#[derive(Parser)]
#[command(name = "daginit")]
#[command(about = "Init supervisor that boots an Elixir release and forwards termination signals")]
struct Cmd {
    /// Configuration file; defaults to $DAGINIT_CONF, then ./daginit.conf
    config: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Warnings and errors go to stderr, everything else to stdout
    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cmd = Cmd::parse();

    match daginit::boot(cmd.config.as_deref()).await {
        Ok(reason) => {
            let code = reason.exit_code();
            info!("daginit exiting with status {code}");
            std::process::exit(code);
        }
        Err(e) => {
            let stage = e.stage();
            error!(stage, "{:#}", anyhow::Error::from(e));
            std::process::exit(1);
        }
    }
}
