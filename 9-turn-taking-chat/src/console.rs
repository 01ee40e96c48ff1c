//! Plain terminal rendering of a chat session.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::{
    codec::{ChatMessage, Persona},
    error::{ChatError, CodecError, Result},
    session::{Direction, Presenter, Termination},
};

pub struct Console<W = tokio::io::Stdout> {
    out: W,
}

impl Console<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Asks for a persona name until a valid one is typed.
    pub async fn ask_persona<R>(&mut self, input: &mut R) -> Result<Persona>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut line = String::new();
        loop {
            self.write("Input your name: ").await?;

            line.clear();
            if input.read_line(&mut line).await? == 0 {
                return Err(ChatError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input closed before a name was given",
                )));
            }

            match Persona::parse(line.trim_end_matches(['\n', '\r'])) {
                Ok(persona) => return Ok(persona),
                Err(err) => self.write_line(&err.to_string()).await?,
            }
        }
    }

    async fn write(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await
    }

    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.out.write_all(line.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await
    }
}

impl<W: AsyncWrite + Unpin> Presenter for Console<W> {
    async fn prompt(&mut self, persona: &Persona) -> io::Result<()> {
        self.write(&format!("{persona}> ")).await
    }

    async fn message(&mut self, direction: Direction, message: &ChatMessage) -> io::Result<()> {
        match direction {
            // The terminal already echoed what the user typed.
            Direction::Outgoing => Ok(()),
            Direction::Incoming => self.write_line(&message.to_string()).await,
        }
    }

    async fn rejected(&mut self, error: &CodecError) -> io::Result<()> {
        self.write_line(&format!("!!! not sent: {error}")).await
    }

    async fn terminated(&mut self, termination: &Termination) -> io::Result<()> {
        let line = match termination {
            Termination::LocalQuit => "Closing connection.".to_string(),
            Termination::RemoteQuit => "Peer closed connection.".to_string(),
            Termination::Disconnected { reason } => format!("Connection lost: {reason}"),
            Termination::Malformed(error) => format!("Connection dropped: {error}"),
        };
        self.write_line(&line).await
    }
}
