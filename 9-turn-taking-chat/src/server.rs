//! The listening side of a chat. It accepts one peer at a time and speaks second.

use std::net::SocketAddr;

use anyhow::Result;
use tokio::{
    io::AsyncBufRead,
    net::{TcpListener, TcpStream},
};
use tracing::{info, warn};

use crate::{
    codec::Persona,
    session::{ChatSession, Presenter, SessionOutcome, Turn},
};

pub struct Responder {
    listener: TcpListener,
}

impl Responder {
    pub fn new(listener: TcpListener) -> Self {
        Self { listener }
    }

    pub async fn bind(addr: SocketAddr) -> std::io::Result<Self> {
        Ok(Self::new(TcpListener::bind(addr).await?))
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Waits for the next peer and chats with it until one side quits.
    pub async fn serve_one<I, P>(
        &self,
        input: I,
        presenter: P,
        persona: &Persona,
    ) -> Result<SessionOutcome>
    where
        I: AsyncBufRead + Unpin,
        P: Presenter,
    {
        let (stream, peer) = self.listener.accept().await?;
        info!(%peer, "received connection, initiating chat");
        chat_with(stream, input, presenter, persona).await
    }

    /// Serves peers one after another until local input runs dry.
    ///
    /// Accept failures are logged and skipped; a local terminal failure ends the loop.
    pub async fn run<I, P>(self, input: &mut I, presenter: &mut P, persona: &Persona) -> Result<()>
    where
        I: AsyncBufRead + Unpin,
        P: Presenter,
    {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(err) => {
                    warn!(error = ?err, "failed to accept connection");
                    continue;
                }
            };
            info!(%peer, "received connection, initiating chat");

            let outcome = chat_with(stream, &mut *input, &mut *presenter, persona).await?;
            info!(%peer, termination = ?outcome.termination, "peer session finished");
            if outcome.input_closed {
                info!("local input closed, no longer accepting peers");
                return Ok(());
            }
        }
    }
}

async fn chat_with<I, P>(
    stream: TcpStream,
    input: I,
    presenter: P,
    persona: &Persona,
) -> Result<SessionOutcome>
where
    I: AsyncBufRead + Unpin,
    P: Presenter,
{
    let outcome = ChatSession::new(stream, input, presenter, persona.clone(), Turn::Remote)
        .run()
        .await?;
    Ok(outcome)
}
