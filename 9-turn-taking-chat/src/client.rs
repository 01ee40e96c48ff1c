use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, BufReader};
use tracing::info;

use crate::{
    cli::ClientArgs,
    connector::Connector,
    console::Console,
    resolver,
    session::{ChatSession, SessionOutcome, Turn},
};

pub async fn run(args: ClientArgs) -> Result<SessionOutcome> {
    let mut stdin = BufReader::new(tokio::io::stdin());
    run_with_input(args, &mut stdin).await
}

/// Resolves, connects, names the local user and then chats until someone quits.
pub async fn run_with_input<R>(args: ClientArgs, input: &mut R) -> Result<SessionOutcome>
where
    R: AsyncBufRead + Unpin,
{
    let target = format!("{}:{}", args.host, args.port);
    let endpoints = resolver::resolve(&args.host, &args.port).await?;

    let mut connector = Connector::new();
    if let Some(limit) = args.attempt_timeout() {
        connector = connector.with_attempt_timeout(limit);
    }
    let channel = connector
        .connect(endpoints)
        .await
        .with_context(|| format!("connecting to {target}"))?;
    info!(%target, "connected, initiating chat");

    let mut console = Console::stdout();
    let persona = match args.name {
        Some(persona) => persona,
        None => console.ask_persona(input).await?,
    };

    let outcome = ChatSession::new(channel, input, console, persona, Turn::Local)
        .run()
        .await?;
    Ok(outcome)
}
