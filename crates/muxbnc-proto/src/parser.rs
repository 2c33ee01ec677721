//! Nom-based line parser.
//!
//! Splits a single IRC line into its borrowed components:
//!
//! ```text
//! [:prefix] <command> [params...] [:trailing]
//! ```
//!
//! The command is `1*letter / 3digit`; at most fifteen parameters are taken
//! and a `:`-introduced trailing parameter consumes the rest of the line.

use nom::{
    branch::alt,
    bytes::complete::{is_not, take_while1, take_while_m_n},
    character::complete::{char, space0},
    combinator::opt,
    error::ErrorKind,
    sequence::preceded,
    IResult,
};
use smallvec::SmallVec;

use crate::error::MessageParseError;

/// Parse the prefix (after `:`, up to the first space).
fn parse_prefix(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), is_not(" "))(input)
}

/// Parse the command token: all letters, or exactly three digits. Either
/// form must be followed by a parameter separator or the end of the line, so
/// `0001` and `JOIN#x` are rejected rather than misread.
fn parse_command(input: &str) -> IResult<&str, &str> {
    let (rest, cmd) = alt((
        take_while1(|c: char| c.is_ascii_alphabetic()),
        take_while_m_n(3, 3, |c: char| c.is_ascii_digit()),
    ))(input)?;

    if matches!(rest.chars().next(), None | Some(' ' | '\r' | '\n')) {
        Ok((rest, cmd))
    } else {
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::Verify,
        )))
    }
}

/// Split the tail of a line (already stripped of its terminator) into
/// parameters.
///
/// Runs of spaces separate parameters; a parameter opening with `:` is the
/// trailing parameter and swallows everything left, spaces included. The
/// RFC 1459 limit of fifteen parameters applies, anything past it is
/// dropped.
fn parse_params(tail: &str) -> SmallVec<[&str; 15]> {
    let mut params: SmallVec<[&str; 15]> = SmallVec::new();
    let mut rest = tail.trim_start_matches(' ');

    while !rest.is_empty() && params.len() < 15 {
        if let Some(trailing) = rest.strip_prefix(':') {
            params.push(trailing);
            break;
        }
        let (param, after) = rest.split_once(' ').unwrap_or((rest, ""));
        params.push(param);
        rest = after.trim_start_matches(' ');
    }

    params
}

fn parse_line(input: &str) -> IResult<&str, ParsedLine<'_>> {
    let (input, prefix) = opt(parse_prefix)(input)?;
    let (input, _) = space0(input)?;
    let (input, command) = parse_command(input)?;

    // Stray CRLF is tolerated here, once, so the parameter splitter never
    // has to think about line terminators.
    let params = parse_params(input.trim_end_matches(['\r', '\n']));

    Ok((
        "",
        ParsedLine {
            prefix,
            command,
            params,
        },
    ))
}

/// A parsed IRC line holding slices into the input.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedLine<'a> {
    /// Raw prefix string (without the leading `:`), if present.
    pub prefix: Option<&'a str>,
    /// The command token as written.
    pub command: &'a str,
    /// Parameters, including the trailing parameter.
    pub params: SmallVec<[&'a str; 15]>,
}

impl<'a> ParsedLine<'a> {
    /// Parse one line. Stray trailing CRLF is tolerated.
    pub fn parse(input: &'a str) -> Result<Self, MessageParseError> {
        match parse_line(input) {
            Ok((_rest, line)) => Ok(line),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                Err(MessageParseError::Syntax {
                    position: input.len() - e.input.len(),
                })
            }
            Err(nom::Err::Incomplete(_)) => Err(MessageParseError::Syntax {
                position: input.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_command() {
        let line = ParsedLine::parse("MOTD").unwrap();
        assert_eq!(line.command, "MOTD");
        assert!(line.prefix.is_none());
        assert!(line.params.is_empty());
    }

    #[test]
    fn command_with_trailing() {
        let line = ParsedLine::parse("PRIVMSG #chan :Hello, world!").unwrap();
        assert_eq!(line.command, "PRIVMSG");
        assert_eq!(line.params.as_slice(), &["#chan", "Hello, world!"]);
    }

    #[test]
    fn trailing_keeps_internal_spaces() {
        let line = ParsedLine::parse(":n!u@h PRIVMSG #c :hello world  with  spaces").unwrap();
        assert_eq!(line.prefix, Some("n!u@h"));
        assert_eq!(line.params.as_slice(), &["#c", "hello world  with  spaces"]);
    }

    #[test]
    fn numeric_command() {
        let line = ParsedLine::parse(":server 001 nick :Welcome").unwrap();
        assert_eq!(line.command, "001");
        assert_eq!(line.params.as_slice(), &["nick", "Welcome"]);
    }

    #[test]
    fn rejects_bad_numeric() {
        assert!(ParsedLine::parse("01 foo").is_err());
        assert!(ParsedLine::parse("0001 foo").is_err());
        assert!(ParsedLine::parse("1x2 foo").is_err());
    }

    #[test]
    fn rejects_text_glued_to_the_command() {
        assert!(ParsedLine::parse("JOIN#x").is_err());
    }

    #[test]
    fn tolerates_crlf_and_space_runs() {
        let line = ParsedLine::parse("JOIN   #a\r\n").unwrap();
        assert_eq!(line.command, "JOIN");
        assert_eq!(line.params.as_slice(), &["#a"]);
    }

    #[test]
    fn caps_at_fifteen_params() {
        let raw = format!("KICK{}", " p".repeat(20));
        let line = ParsedLine::parse(&raw).unwrap();
        assert_eq!(line.params.len(), 15);
    }

    #[test]
    fn empty_trailing_param() {
        let line = ParsedLine::parse("TOPIC #c :").unwrap();
        assert_eq!(line.params.as_slice(), &["#c", ""]);
    }
}
