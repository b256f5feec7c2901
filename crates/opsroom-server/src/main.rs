use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "opsroom", about = "Persona operations runbook engine", version)]
struct Cli {
    /// Workspace root containing (or to contain) the .opsroom directory.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Port to listen on.
    #[arg(long, default_value_t = 3141, env = "OPSROOM_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    opsroom_server::serve(cli.root, cli.port).await
}
