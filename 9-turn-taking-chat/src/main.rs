use std::process::ExitCode;

use tracing::warn;

use turn_taking_chat::{
    cli::{self, ClientArgs},
    client,
};

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = match cli::parse_or_exit::<ClientArgs>() {
        Ok(args) => args,
        Err(code) => return code,
    };

    match client::run(args).await {
        Ok(outcome) if outcome.termination.is_clean() => ExitCode::SUCCESS,
        Ok(outcome) => {
            warn!(termination = ?outcome.termination, "chat ended without a quit");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("chatclient: {err:#}");
            ExitCode::FAILURE
        }
    }
}
