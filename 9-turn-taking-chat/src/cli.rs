use std::{net::IpAddr, process::ExitCode, time::Duration};

use clap::Parser;

use crate::codec::Persona;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Turn-taking chat client", long_about = None)]
pub struct ClientArgs {
    /// Host name or address of the chat peer (IPv4 or IPv6).
    pub host: String,

    /// Port number or service name of the chat peer.
    pub port: String,

    /// Name shown before your messages, ten characters at most. Asked for when omitted.
    #[arg(long, value_parser = Persona::parse)]
    pub name: Option<Persona>,

    /// Give up on a single address candidate after this many milliseconds.
    #[arg(long, value_name = "MS")]
    pub connect_timeout: Option<u64>,
}

impl ClientArgs {
    pub fn attempt_timeout(&self) -> Option<Duration> {
        self.connect_timeout.map(Duration::from_millis)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Turn-taking chat responder", long_about = None)]
pub struct ServeArgs {
    /// Port to listen on. Use 0 for an ephemeral port.
    pub port: u16,

    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Name shown before your messages, ten characters at most. Asked for when omitted.
    #[arg(long, value_parser = Persona::parse)]
    pub name: Option<Persona>,
}

/// Parses the process arguments, turning usage errors into exit status 1.
///
/// `--help` and `--version` print and exit with success.
pub fn parse_or_exit<T: Parser>() -> Result<T, ExitCode> {
    T::try_parse().map_err(|err| {
        let _ = err.print();
        if err.use_stderr() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    })
}
