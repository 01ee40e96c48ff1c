//! Listens for chat clients and answers them one at a time.
//!
//! ```bash
//! cargo run --bin chatserve -- 9999 --name server
//! cargo run --bin chatclient -- localhost 9999 --name client
//! ```

use std::{net::SocketAddr, process::ExitCode};

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::info;

use turn_taking_chat::{
    cli::{self, ServeArgs},
    console::Console,
    server::Responder,
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

async fn serve(args: ServeArgs) -> Result<()> {
    let addr = SocketAddr::new(args.bind, args.port);
    let responder = Responder::bind(addr)
        .await
        .with_context(|| format!("failed to listen on {addr}"))?;
    info!("responder listening on {}", responder.local_addr()?);

    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut console = Console::stdout();
    let persona = match args.name {
        Some(persona) => persona,
        None => console.ask_persona(&mut stdin).await?,
    };

    responder.run(&mut stdin, &mut console, &persona).await
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = match cli::parse_or_exit::<ServeArgs>() {
        Ok(args) => args,
        Err(code) => return code,
    };

    match serve(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("chatserve: {err:#}");
            ExitCode::FAILURE
        }
    }
}
