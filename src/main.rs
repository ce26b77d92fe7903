use anyhow::Result;
use chunked_loop::cli::{execute_indexed, execute_lines, Cli, Commands};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.options.verbose);

    match cli.command {
        Commands::Indexed(args) => execute_indexed(args, cli.options).await,
        Commands::Lines { file } => execute_lines(file, cli.options).await,
    }
}

/// RUST_LOG が設定されていればそれを優先し、なければ -v の回数でレベルを決める
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
