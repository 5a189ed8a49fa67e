//! # Textual intake commands.
//!
//! One command per line:
//! ```text
//! <delaySeconds> Message(<id>) <text>     create, text truncated to 64 bytes
//! Cancel: Message(<id>)                  cancel
//! ```
//!
//! Whitespace around tokens is free-form. Anything else is a [`ParseError`];
//! a rejected line never reaches the runtime.

use std::str::FromStr;

use crate::alarms::request::{AlarmId, AlarmRequest};
use crate::alarms::text::AlarmText;
use crate::error::ParseError;

const CANCEL_PREFIX: &str = "Cancel:";
const MESSAGE_OPEN: &str = "Message(";

/// Parsed intake command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `<delay> Message(<id>) <text>`
    Create {
        id: AlarmId,
        delay_secs: u64,
        text: AlarmText,
    },
    /// `Cancel: Message(<id>)`
    Cancel { id: AlarmId },
}

impl Command {
    #[inline]
    pub fn id(&self) -> AlarmId {
        match self {
            Command::Create { id, .. } | Command::Cancel { id } => *id,
        }
    }

    /// Stamps the command with the current time.
    pub fn into_request(self) -> AlarmRequest {
        match self {
            Command::Create {
                id,
                delay_secs,
                text,
            } => AlarmRequest::create(id.0, delay_secs, text),
            Command::Cancel { id } => AlarmRequest::cancel(id.0),
        }
    }
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ParseError::Empty);
        }
        let unrecognized = || ParseError::Unrecognized {
            line: line.to_string(),
        };

        if let Some(rest) = line.strip_prefix(CANCEL_PREFIX) {
            let (id, tail) = message_tag(rest.trim_start()).ok_or_else(unrecognized)??;
            if !tail.trim().is_empty() {
                return Err(unrecognized());
            }
            return Ok(Command::Cancel { id });
        }

        let (delay, rest) = line
            .split_once(char::is_whitespace)
            .ok_or_else(unrecognized)?;
        let delay: i64 = delay.parse().map_err(|_| unrecognized())?;
        let (id, text) = message_tag(rest.trim_start()).ok_or_else(unrecognized)??;
        let delay_secs = u64::try_from(delay).map_err(|_| ParseError::NegativeDelay { delay })?;

        let text = text.trim_start();
        if text.is_empty() {
            return Err(ParseError::MissingText { id: id.0 });
        }
        Ok(Command::Create {
            id,
            delay_secs,
            text: AlarmText::new(text),
        })
    }
}

/// Splits `Message(<id>)<tail>`.
///
/// `None` when the tag shape is absent; `Some(Err)` when the shape is there
/// but the id is not a non-negative integer.
fn message_tag(s: &str) -> Option<Result<(AlarmId, &str), ParseError>> {
    let inner = s.strip_prefix(MESSAGE_OPEN)?;
    let (token, tail) = inner.split_once(')')?;
    Some(
        token
            .trim()
            .parse::<u64>()
            .map(|id| (AlarmId(id), tail))
            .map_err(|_| ParseError::InvalidId {
                token: token.to_string(),
            }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create() {
        let cmd: Command = "5 Message(1) hello world".parse().unwrap();
        assert_eq!(
            cmd,
            Command::Create {
                id: AlarmId(1),
                delay_secs: 5,
                text: AlarmText::new("hello world"),
            }
        );
    }

    #[test]
    fn test_parse_create_loose_whitespace() {
        let cmd: Command = "  10   Message( 42 )   ping  \n".parse().unwrap();
        assert_eq!(cmd.id(), AlarmId(42));
        match cmd {
            Command::Create {
                delay_secs, text, ..
            } => {
                assert_eq!(delay_secs, 10);
                assert_eq!(text.as_str(), "ping");
            }
            other => panic!("expected create, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_cancel() {
        let cmd: Command = "Cancel: Message(9)".parse().unwrap();
        assert_eq!(cmd, Command::Cancel { id: AlarmId(9) });

        let cmd: Command = "Cancel:Message(3)\r\n".parse().unwrap();
        assert_eq!(cmd, Command::Cancel { id: AlarmId(3) });
    }

    #[test]
    fn test_long_text_truncated() {
        let line = format!("1 Message(2) {}", "z".repeat(80));
        let cmd: Command = line.parse().unwrap();
        match cmd {
            Command::Create { text, .. } => assert_eq!(text.len(), AlarmText::MAX_BYTES),
            other => panic!("expected create, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_malformed_lines() {
        assert_eq!("".parse::<Command>(), Err(ParseError::Empty));
        assert_eq!("   ".parse::<Command>(), Err(ParseError::Empty));
        assert!(matches!(
            "hello".parse::<Command>(),
            Err(ParseError::Unrecognized { .. })
        ));
        assert!(matches!(
            "five Message(1) hi".parse::<Command>(),
            Err(ParseError::Unrecognized { .. })
        ));
        assert!(matches!(
            "5 Msg(1) hi".parse::<Command>(),
            Err(ParseError::Unrecognized { .. })
        ));
        assert!(matches!(
            "Cancel: Message(1) now".parse::<Command>(),
            Err(ParseError::Unrecognized { .. })
        ));
        assert!(matches!(
            "Cancel Message(1)".parse::<Command>(),
            Err(ParseError::Unrecognized { .. })
        ));
    }

    #[test]
    fn test_rejects_negative_delay() {
        assert_eq!(
            "-4 Message(1) late".parse::<Command>(),
            Err(ParseError::NegativeDelay { delay: -4 })
        );
    }

    #[test]
    fn test_rejects_bad_id() {
        assert!(matches!(
            "3 Message(x) hi".parse::<Command>(),
            Err(ParseError::InvalidId { .. })
        ));
        assert!(matches!(
            "Cancel: Message(-1)".parse::<Command>(),
            Err(ParseError::InvalidId { .. })
        ));
    }

    #[test]
    fn test_rejects_missing_text() {
        assert_eq!(
            "3 Message(8)".parse::<Command>(),
            Err(ParseError::MissingText { id: 8 })
        );
        assert_eq!(
            "3 Message(8)    ".parse::<Command>(),
            Err(ParseError::MissingText { id: 8 })
        );
    }
}
