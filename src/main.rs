mod cli;

#[tokio::main]
async fn main() {
    let (addr, config) = match cli::run() {
        cli::RunOutcome::Serve { addr, config } => (addr, config),
        cli::RunOutcome::Exit(code) => std::process::exit(code),
    };

    tracing::info!(%addr, "listening");
    if let Err(err) = lunchbell::serve(addr, config).await {
        tracing::error!(error = %err, "refusing to start");
        eprintln!("error: {err}");
        std::process::exit(2);
    }
}
