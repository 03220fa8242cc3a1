mod cli;

use clap::Parser;
use tally_client::{ApiClient, AppError, FileStore, Result, SessionGuard, config};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    let config = config::load(args.config.as_deref(), args.overrides())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tally={level},tally_client={level},engine={level}",
            level = config.log_level
        ))
        .with_writer(std::io::stderr)
        .init();

    let guard = SessionGuard::new(FileStore::new(&config.session_path), config.secure_cookie);
    let client = ApiClient::new(&config.base_url, config.request_timeout(), guard)?;
    if let Err(err) = cli::run(args.command, &client, &config).await {
        match &err {
            AppError::Client(client_err) => {
                tracing::debug!("{client_err}");
                eprintln!("{}", client_err.user_message());
            }
            other => eprintln!("error: {other}"),
        }
        std::process::exit(1);
    }
    Ok(())
}
