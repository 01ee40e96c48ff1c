//! Wire representation of a chat line: `<sender>> <body>`.
//!
//! There is no length prefix and no terminator. A message is whatever a single
//! receive of at most [`MAX_MESSAGE_SIZE`] bytes delivers, so peers that append
//! `\n` (the original server did) are tolerated when looking for the sentinel.

use std::fmt;

use crate::error::CodecError;

/// Largest message accepted on either side of the wire.
pub const MAX_MESSAGE_SIZE: usize = 1023;

/// Longest persona name, in characters.
pub const MAX_SENDER_LEN: usize = 10;

/// Body that ends the session from whichever side sends it.
pub const SENTINEL: &str = "\\quit";

const SEPARATOR: &str = "> ";

/// A validated local sender name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona(String);

impl Persona {
    pub fn parse(name: &str) -> Result<Self, CodecError> {
        validate_sender(name)?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: String,
    pub body: String,
}

impl ChatMessage {
    pub fn new(sender: &Persona, body: impl Into<String>) -> Self {
        Self {
            sender: sender.as_str().to_string(),
            body: body.into(),
        }
    }

    /// Body without the single trailing line terminator a peer may have sent.
    pub fn text(&self) -> &str {
        strip_line_terminator(&self.body)
    }

    /// True when this message asks the receiver to end the session.
    pub fn is_sentinel(&self) -> bool {
        self.text() == SENTINEL
    }
}

impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.sender, SEPARATOR, self.text())
    }
}

/// Send-path check: the local line has already lost its terminator.
pub fn is_sentinel_input(line: &str) -> bool {
    line == SENTINEL
}

pub fn encode(message: &ChatMessage) -> Result<Vec<u8>, CodecError> {
    validate_sender(&message.sender)?;

    let len = message.sender.len() + SEPARATOR.len() + message.body.len();
    if len > MAX_MESSAGE_SIZE {
        return Err(CodecError::MessageTooLarge {
            len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut encoded = Vec::with_capacity(len);
    encoded.extend_from_slice(message.sender.as_bytes());
    encoded.extend_from_slice(SEPARATOR.as_bytes());
    encoded.extend_from_slice(message.body.as_bytes());
    Ok(encoded)
}

/// Splits a received buffer on its first `>`.
///
/// The split point is the first `>` anywhere in the buffer, which keeps
/// compatibility with existing peers even though a sender containing `>`
/// would be cut short. The scan is bounded by `buf`.
pub fn decode(buf: &[u8]) -> Result<ChatMessage, CodecError> {
    if buf.len() > MAX_MESSAGE_SIZE {
        return Err(CodecError::MessageTooLarge {
            len: buf.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }

    let split = buf
        .iter()
        .position(|&byte| byte == b'>')
        .ok_or(CodecError::MalformedMessage { len: buf.len() })?;

    let (sender, rest) = buf.split_at(split);
    let rest = &rest[1..];
    let body = match rest.first() {
        Some(b' ') => &rest[1..],
        _ => rest,
    };

    Ok(ChatMessage {
        sender: String::from_utf8_lossy(sender).into_owned(),
        body: String::from_utf8_lossy(body).into_owned(),
    })
}

fn validate_sender(name: &str) -> Result<(), CodecError> {
    let reason = if name.is_empty() {
        "name cannot be empty"
    } else if name.chars().count() > MAX_SENDER_LEN {
        "name must be ten or fewer characters"
    } else if name.contains('>') {
        "name cannot contain '>'"
    } else if name.contains(['\n', '\r']) {
        "name cannot contain line breaks"
    } else {
        return Ok(());
    };

    Err(CodecError::InvalidSender {
        name: name.to_string(),
        reason,
    })
}

fn strip_line_terminator(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Persona {
        Persona::parse("alice").expect("valid persona")
    }

    #[test]
    fn encodes_sender_separator_and_body_without_terminator() {
        let encoded = encode(&ChatMessage::new(&alice(), "hello there")).expect("encode");
        assert_eq!(encoded, b"alice> hello there");
    }

    #[test]
    fn decode_recovers_what_encode_wrote() {
        let bodies = ["", "hi", "a > b", "> leading", "ünïcode", "\\quit"];
        for body in bodies {
            let message = ChatMessage::new(&alice(), body);
            let decoded = decode(&encode(&message).expect("encode")).expect("decode");
            assert_eq!(decoded, message, "body {body:?}");
        }
    }

    #[test]
    fn largest_body_still_fits() {
        let body = "x".repeat(MAX_MESSAGE_SIZE - "alice> ".len());
        let message = ChatMessage::new(&alice(), body);
        let encoded = encode(&message).expect("encode");
        assert_eq!(encoded.len(), MAX_MESSAGE_SIZE);
        assert_eq!(decode(&encoded).expect("decode"), message);
    }

    #[test]
    fn oversize_messages_are_rejected_on_both_paths() {
        let body = "x".repeat(MAX_MESSAGE_SIZE);
        let err = encode(&ChatMessage::new(&alice(), body)).unwrap_err();
        assert!(matches!(err, CodecError::MessageTooLarge { .. }));

        let err = decode(&[b'>'; MAX_MESSAGE_SIZE + 1]).unwrap_err();
        assert_eq!(
            err,
            CodecError::MessageTooLarge {
                len: MAX_MESSAGE_SIZE + 1,
                max: MAX_MESSAGE_SIZE
            }
        );
    }

    #[test]
    fn buffer_without_separator_is_malformed() {
        assert_eq!(
            decode(b"no separator here").unwrap_err(),
            CodecError::MalformedMessage { len: 17 }
        );
        assert_eq!(
            decode(b"").unwrap_err(),
            CodecError::MalformedMessage { len: 0 }
        );
    }

    #[test]
    fn separator_at_end_of_buffer_yields_empty_body() {
        let message = decode(b"bob>").expect("decode");
        assert_eq!(message.sender, "bob");
        assert_eq!(message.body, "");
    }

    #[test]
    fn first_angle_bracket_wins() {
        let message = decode(b"b>b> hi").expect("decode");
        assert_eq!(message.sender, "b");
        assert_eq!(message.body, "b> hi");
    }

    #[test]
    fn received_sentinel_tolerates_one_line_terminator() {
        for wire in [&b"bob> \\quit"[..], b"bob> \\quit\n", b"bob> \\quit\r\n"] {
            assert!(decode(wire).expect("decode").is_sentinel(), "{wire:?}");
        }
    }

    #[test]
    fn near_miss_bodies_are_not_sentinels() {
        for wire in [
            &b"bob> \\quit2"[..],
            b"bob>  \\quit",
            b"bob> \\Quit",
            b"bob> \\quit\n\n",
            b"bob> quit",
        ] {
            assert!(!decode(wire).expect("decode").is_sentinel(), "{wire:?}");
        }
    }

    #[test]
    fn send_path_sentinel_is_exact() {
        assert!(is_sentinel_input("\\quit"));
        assert!(!is_sentinel_input("\\quit\n"));
        assert!(!is_sentinel_input(" \\quit"));
        assert!(!is_sentinel_input("\\QUIT"));
    }

    #[test]
    fn persona_rules() {
        assert!(Persona::parse("abcdefghij").is_ok());
        for bad in ["", "abcdefghijk", "a>b", "bob\n"] {
            assert!(
                matches!(Persona::parse(bad), Err(CodecError::InvalidSender { .. })),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn encode_rejects_decoded_sender_that_cannot_round_trip() {
        let message = ChatMessage {
            sender: "a>b".into(),
            body: "hi".into(),
        };
        assert!(matches!(
            encode(&message),
            Err(CodecError::InvalidSender { .. })
        ));
    }
}
