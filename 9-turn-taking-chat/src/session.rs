//! Strictly alternating two-party exchange over one channel.
//!
//! A session owns its channel, the local input and a [`Presenter`]. Exactly one
//! await is outstanding at any moment: either a line of local input or one
//! receive from the peer. The [`Turn`] value decides which, and only the loop in
//! [`ChatSession::run`] changes it, so a send is always followed by a receive
//! and the other way round.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::{
    codec::{self, ChatMessage, MAX_MESSAGE_SIZE, Persona, SENTINEL, is_sentinel_input},
    error::{CodecError, Result},
};

const LINE_ENDINGS: &[char] = &['\n', '\r'];

/// Whose obligation comes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// Waiting for the local user to type a line.
    Local,
    /// Waiting for one receive from the peer.
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The local side sent the sentinel.
    LocalQuit,
    /// The peer sent the sentinel.
    RemoteQuit,
    /// The channel failed or the peer went away without the sentinel.
    Disconnected { reason: String },
    /// The peer sent bytes that are not a chat message.
    Malformed(CodecError),
}

impl Termination {
    /// Sentinel-initiated endings are clean; everything else is not.
    pub fn is_clean(&self) -> bool {
        matches!(self, Termination::LocalQuit | Termination::RemoteQuit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub termination: Termination,
    pub sent: usize,
    pub received: usize,
    /// Local input reached end-of-file; the sentinel was sent on its behalf.
    pub input_closed: bool,
}

/// Presentation hooks. The session never writes to a terminal itself.
///
/// Sessions run on a single task and are never spawned, so the returned
/// futures need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait Presenter {
    async fn prompt(&mut self, _persona: &Persona) -> io::Result<()> {
        Ok(())
    }

    async fn message(&mut self, direction: Direction, message: &ChatMessage) -> io::Result<()>;

    /// Local input that could not be sent; the user is asked again.
    async fn rejected(&mut self, _error: &CodecError) -> io::Result<()> {
        Ok(())
    }

    async fn terminated(&mut self, _termination: &Termination) -> io::Result<()> {
        Ok(())
    }
}

impl<P: Presenter + ?Sized> Presenter for &mut P {
    async fn prompt(&mut self, persona: &Persona) -> io::Result<()> {
        (**self).prompt(persona).await
    }

    async fn message(&mut self, direction: Direction, message: &ChatMessage) -> io::Result<()> {
        (**self).message(direction, message).await
    }

    async fn rejected(&mut self, error: &CodecError) -> io::Result<()> {
        (**self).rejected(error).await
    }

    async fn terminated(&mut self, termination: &Termination) -> io::Result<()> {
        (**self).terminated(termination).await
    }
}

enum Step {
    Next(Turn),
    Done(Termination),
}

pub struct ChatSession<S, I, P> {
    channel: S,
    input: I,
    presenter: P,
    persona: Persona,
    turn: Turn,
    sent: usize,
    received: usize,
    input_closed: bool,
}

impl<S, I, P> ChatSession<S, I, P>
where
    S: AsyncRead + AsyncWrite + Unpin,
    I: AsyncBufRead + Unpin,
    P: Presenter,
{
    /// The connecting side speaks first: pass [`Turn::Local`]. A listening
    /// responder passes [`Turn::Remote`].
    pub fn new(channel: S, input: I, presenter: P, persona: Persona, first: Turn) -> Self {
        Self {
            channel,
            input,
            presenter,
            persona,
            turn: first,
            sent: 0,
            received: 0,
            input_closed: false,
        }
    }

    /// Drives the exchange until either side quits or the channel fails.
    ///
    /// The channel is shut down exactly once, on every exit path, before this
    /// returns. An `Err` only reports a local terminal failure.
    pub async fn run(mut self) -> Result<SessionOutcome> {
        let exchanged = self.exchange().await;

        if let Err(error) = self.channel.shutdown().await {
            debug!(?error, "channel shutdown reported an error");
        }

        let termination = exchanged?;
        info!(?termination, sent = self.sent, received = self.received, "chat session ended");
        self.presenter.terminated(&termination).await?;

        Ok(SessionOutcome {
            termination,
            sent: self.sent,
            received: self.received,
            input_closed: self.input_closed,
        })
    }

    async fn exchange(&mut self) -> Result<Termination> {
        loop {
            let step = match self.turn {
                Turn::Local => self.local_turn().await?,
                Turn::Remote => self.remote_turn().await?,
            };

            match step {
                Step::Next(turn) => {
                    debug!(?turn, "turn handed over");
                    self.turn = turn;
                }
                Step::Done(termination) => return Ok(termination),
            }
        }
    }

    async fn local_turn(&mut self) -> Result<Step> {
        let mut raw = Vec::new();
        let (message, encoded) = loop {
            self.presenter.prompt(&self.persona).await?;

            // Invalid UTF-8 is replaced, same as on the receive path.
            raw.clear();
            let line = if self.input.read_until(b'\n', &mut raw).await? == 0 {
                info!("local input closed, sending {SENTINEL}");
                self.input_closed = true;
                SENTINEL.to_string()
            } else {
                String::from_utf8_lossy(&raw).trim_end_matches(LINE_ENDINGS).to_string()
            };

            let message = ChatMessage::new(&self.persona, line);
            match codec::encode(&message) {
                Ok(encoded) => break (message, encoded),
                Err(error) => {
                    warn!(%error, "local message not sent");
                    self.presenter.rejected(&error).await?;
                }
            }
        };

        if let Err(error) = self.send(&encoded).await {
            return Ok(Step::Done(Termination::Disconnected {
                reason: error.to_string(),
            }));
        }
        self.sent += 1;
        self.presenter.message(Direction::Outgoing, &message).await?;

        if is_sentinel_input(&message.body) {
            Ok(Step::Done(Termination::LocalQuit))
        } else {
            Ok(Step::Next(Turn::Remote))
        }
    }

    async fn remote_turn(&mut self) -> Result<Step> {
        let mut buf = vec![0u8; MAX_MESSAGE_SIZE];
        let read = match self.channel.read(&mut buf).await {
            Ok(0) => {
                return Ok(Step::Done(Termination::Disconnected {
                    reason: "peer closed the connection".to_string(),
                }));
            }
            Ok(read) => read,
            Err(error) => {
                return Ok(Step::Done(Termination::Disconnected {
                    reason: error.to_string(),
                }));
            }
        };
        buf.truncate(read);

        let message = match codec::decode(&buf) {
            Ok(message) => message,
            Err(error) => {
                warn!(%error, bytes = read, "dropping session on malformed message");
                return Ok(Step::Done(Termination::Malformed(error)));
            }
        };
        self.received += 1;
        self.presenter.message(Direction::Incoming, &message).await?;

        if message.is_sentinel() {
            Ok(Step::Done(Termination::RemoteQuit))
        } else {
            Ok(Step::Next(Turn::Local))
        }
    }

    async fn send(&mut self, encoded: &[u8]) -> io::Result<()> {
        self.channel.write_all(encoded).await?;
        self.channel.flush().await
    }
}
