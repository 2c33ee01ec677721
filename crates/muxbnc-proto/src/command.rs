//! IRC command types.
//!
//! [`Command`] covers the RFC 1459 client command set with typed parameters
//! where the bouncer inspects them, and parameter vectors elsewhere. Named
//! numerics become [`Command::Response`]. Unknown opcodes and numerics
//! outside the named set are preserved in [`Command::Raw`] so serialization
//! reproduces the original token.
//!
//! A recognized command whose parameters do not fit the variant's shape also
//! parses as `Raw` with the parameters intact: the parser never rejects a
//! line for arity, leaving missing-parameter diagnosis (ERR_NEEDMOREPARAMS)
//! to the command handlers.

use std::borrow::Cow;
use std::fmt;

use crate::response::Response;

/// An IRC command with its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
#[non_exhaustive]
pub enum Command {
    // Connection registration.
    /// `PASS <password>`
    PASS(String),
    /// `NICK <nickname>`
    NICK(String),
    /// `USER <username> <hostname> <servername> :<realname>`
    USER(String, String, String, String),
    /// `OPER ...`
    OPER(Vec<String>),
    /// `QUIT [:message]`
    QUIT(Option<String>),
    /// `SERVER ...`
    SERVER(Vec<String>),
    /// `SQUIT ...`
    SQUIT(Vec<String>),

    // Channel operations.
    /// `JOIN <channels> [keys]`
    JOIN(String, Option<String>),
    /// `PART <channels> [:message]`
    PART(String, Option<String>),
    /// `MODE <target> [modes...]`
    MODE(String, Vec<String>),
    /// `TOPIC <channel> [:topic]`
    TOPIC(String, Option<String>),
    /// `NAMES [channels]`
    NAMES(Option<String>),
    /// `LIST ...`
    LIST(Vec<String>),
    /// `INVITE ...`
    INVITE(Vec<String>),
    /// `KICK ...`
    KICK(Vec<String>),

    // Messaging.
    /// `PRIVMSG <target> :<text>`
    PRIVMSG(String, String),
    /// `NOTICE <target> :<text>`
    NOTICE(String, String),

    // Server queries.
    /// `MOTD [target]`
    MOTD(Option<String>),
    /// `VERSION ...`
    VERSION(Vec<String>),
    /// `STATS ...`
    STATS(Vec<String>),
    /// `LINKS ...`
    LINKS(Vec<String>),
    /// `TIME ...`
    TIME(Vec<String>),
    /// `CONNECT ...`
    CONNECT(Vec<String>),
    /// `TRACE ...`
    TRACE(Vec<String>),
    /// `ADMIN ...`
    ADMIN(Vec<String>),
    /// `INFO ...`
    INFO(Vec<String>),

    // User queries.
    /// `WHO ...`
    WHO(Vec<String>),
    /// `WHOIS ...`
    WHOIS(Vec<String>),
    /// `WHOWAS ...`
    WHOWAS(Vec<String>),

    // Miscellaneous.
    /// `KILL ...`
    KILL(Vec<String>),
    /// `PING <server1> [server2]`
    PING(String, Option<String>),
    /// `PONG <server1> [server2]`
    PONG(String, Option<String>),
    /// `ERROR :<message>`
    ERROR(String),
    /// `AWAY [:message]`
    AWAY(Option<String>),
    /// `REHASH`
    REHASH(Vec<String>),
    /// `RESTART`
    RESTART(Vec<String>),
    /// `SUMMON ...`
    SUMMON(Vec<String>),
    /// `USERS ...`
    USERS(Vec<String>),
    /// `WALLOPS ...`
    WALLOPS(Vec<String>),
    /// `USERHOST ...`
    USERHOST(Vec<String>),
    /// `ISON ...`
    ISON(Vec<String>),
    /// `CAP ...` (capability negotiation is out of scope; carried verbatim)
    CAP(Vec<String>),

    /// A numeric reply recognized by name.
    Response(Response, Vec<String>),

    /// Any other command. The original opcode (or raw numeric string) is
    /// preserved as written so round-trip serialization is lossless.
    Raw(String, Vec<String>),
}

impl Command {
    /// Build a command from a parsed opcode token and owned parameters.
    ///
    /// Never fails: unrecognized opcodes, unrecognized numerics, and
    /// recognized commands with unexpected arity all land in [`Command::Raw`].
    pub fn from_parts(cmd: &str, params: Vec<String>) -> Command {
        if cmd.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return match cmd.parse::<u16>().ok().and_then(Response::from_code) {
                Some(resp) => Command::Response(resp, params),
                None => Command::Raw(cmd.to_string(), params),
            };
        }

        let upper = cmd.to_ascii_uppercase();
        if let Some(command) = Self::typed_from_slice(&upper, params.as_slice()) {
            return command;
        }

        // Relay-only commands carry their parameters verbatim; a recognized
        // command whose shape didn't fit above degrades to Raw.
        match upper.as_str() {
            "OPER" => Command::OPER(params),
            "SERVER" => Command::SERVER(params),
            "SQUIT" => Command::SQUIT(params),
            "LIST" => Command::LIST(params),
            "INVITE" => Command::INVITE(params),
            "KICK" => Command::KICK(params),
            "VERSION" => Command::VERSION(params),
            "STATS" => Command::STATS(params),
            "LINKS" => Command::LINKS(params),
            "TIME" => Command::TIME(params),
            "CONNECT" => Command::CONNECT(params),
            "TRACE" => Command::TRACE(params),
            "ADMIN" => Command::ADMIN(params),
            "INFO" => Command::INFO(params),
            "WHO" => Command::WHO(params),
            "WHOIS" => Command::WHOIS(params),
            "WHOWAS" => Command::WHOWAS(params),
            "KILL" => Command::KILL(params),
            "REHASH" => Command::REHASH(params),
            "RESTART" => Command::RESTART(params),
            "SUMMON" => Command::SUMMON(params),
            "USERS" => Command::USERS(params),
            "WALLOPS" => Command::WALLOPS(params),
            "USERHOST" => Command::USERHOST(params),
            "ISON" => Command::ISON(params),
            "CAP" => Command::CAP(params),
            _ => Command::Raw(cmd.to_string(), params),
        }
    }

    /// Typed parses keyed on (uppercased opcode, parameter shape). `None`
    /// means the caller should fall back to a parameter-vector variant or
    /// `Raw`.
    fn typed_from_slice(upper: &str, params: &[String]) -> Option<Command> {
        Some(match (upper, params) {
            ("PASS", [p]) => Command::PASS(p.clone()),
            ("NICK", [n]) => Command::NICK(n.clone()),
            ("USER", [u, h, s, r]) => {
                Command::USER(u.clone(), h.clone(), s.clone(), r.clone())
            }
            ("QUIT", []) => Command::QUIT(None),
            ("QUIT", [m]) => Command::QUIT(Some(m.clone())),
            ("JOIN", [c]) => Command::JOIN(c.clone(), None),
            ("JOIN", [c, k]) => Command::JOIN(c.clone(), Some(k.clone())),
            ("PART", [c]) => Command::PART(c.clone(), None),
            ("PART", [c, m]) => Command::PART(c.clone(), Some(m.clone())),
            ("MODE", [target, rest @ ..]) => Command::MODE(target.clone(), rest.to_vec()),
            ("TOPIC", [c]) => Command::TOPIC(c.clone(), None),
            ("TOPIC", [c, t]) => Command::TOPIC(c.clone(), Some(t.clone())),
            ("NAMES", []) => Command::NAMES(None),
            ("NAMES", [c]) => Command::NAMES(Some(c.clone())),
            ("PRIVMSG", [t, x]) => Command::PRIVMSG(t.clone(), x.clone()),
            ("NOTICE", [t, x]) => Command::NOTICE(t.clone(), x.clone()),
            ("MOTD", []) => Command::MOTD(None),
            ("MOTD", [t]) => Command::MOTD(Some(t.clone())),
            ("PING", [a]) => Command::PING(a.clone(), None),
            ("PING", [a, b]) => Command::PING(a.clone(), Some(b.clone())),
            ("PONG", [a]) => Command::PONG(a.clone(), None),
            ("PONG", [a, b]) => Command::PONG(a.clone(), Some(b.clone())),
            ("ERROR", [m]) => Command::ERROR(m.clone()),
            ("AWAY", []) => Command::AWAY(None),
            ("AWAY", [m]) => Command::AWAY(Some(m.clone())),
            _ => return None,
        })
    }

    /// The dispatch token for this command: the uppercase opcode for
    /// recognized textual commands, the zero-padded code for named numerics,
    /// or the original opcode for [`Command::Raw`].
    pub fn token(&self) -> Cow<'_, str> {
        use Command::*;
        Cow::Borrowed(match self {
            PASS(..) => "PASS",
            NICK(..) => "NICK",
            USER(..) => "USER",
            OPER(..) => "OPER",
            QUIT(..) => "QUIT",
            SERVER(..) => "SERVER",
            SQUIT(..) => "SQUIT",
            JOIN(..) => "JOIN",
            PART(..) => "PART",
            MODE(..) => "MODE",
            TOPIC(..) => "TOPIC",
            NAMES(..) => "NAMES",
            LIST(..) => "LIST",
            INVITE(..) => "INVITE",
            KICK(..) => "KICK",
            PRIVMSG(..) => "PRIVMSG",
            NOTICE(..) => "NOTICE",
            MOTD(..) => "MOTD",
            VERSION(..) => "VERSION",
            STATS(..) => "STATS",
            LINKS(..) => "LINKS",
            TIME(..) => "TIME",
            CONNECT(..) => "CONNECT",
            TRACE(..) => "TRACE",
            ADMIN(..) => "ADMIN",
            INFO(..) => "INFO",
            WHO(..) => "WHO",
            WHOIS(..) => "WHOIS",
            WHOWAS(..) => "WHOWAS",
            KILL(..) => "KILL",
            PING(..) => "PING",
            PONG(..) => "PONG",
            ERROR(..) => "ERROR",
            AWAY(..) => "AWAY",
            REHASH(..) => "REHASH",
            RESTART(..) => "RESTART",
            SUMMON(..) => "SUMMON",
            USERS(..) => "USERS",
            WALLOPS(..) => "WALLOPS",
            USERHOST(..) => "USERHOST",
            ISON(..) => "ISON",
            CAP(..) => "CAP",
            Response(resp, _) => return Cow::Owned(format!("{:03}", resp.code())),
            Raw(name, _) => name.as_str(),
        })
    }
}

/// Write space-separated parameters, prefixing the last with `:` only when it
/// needs it (contains a space, is empty, or itself starts with `:`).
fn write_params(f: &mut fmt::Formatter<'_>, params: &[String]) -> fmt::Result {
    for (i, param) in params.iter().enumerate() {
        let last = i == params.len() - 1;
        if last && (param.contains(' ') || param.is_empty() || param.starts_with(':')) {
            write!(f, " :{}", param)?;
        } else {
            write!(f, " {}", param)?;
        }
    }
    Ok(())
}

/// Write middle parameters followed by a trailing parameter that always takes
/// the `:` form.
fn write_trailing(f: &mut fmt::Formatter<'_>, middles: &[&str], trailing: &str) -> fmt::Result {
    for middle in middles {
        write!(f, " {}", middle)?;
    }
    write!(f, " :{}", trailing)
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Command::*;
        match self {
            PASS(p) => {
                write!(f, "PASS")?;
                write_params(f, std::slice::from_ref(p))
            }
            NICK(n) => write!(f, "NICK {}", n),
            USER(u, h, s, r) => {
                write!(f, "USER")?;
                write_trailing(f, &[u.as_str(), h.as_str(), s.as_str()], r)
            }
            QUIT(None) => write!(f, "QUIT"),
            QUIT(Some(m)) => {
                write!(f, "QUIT")?;
                write_trailing(f, &[], m)
            }
            JOIN(c, None) => write!(f, "JOIN {}", c),
            JOIN(c, Some(k)) => write!(f, "JOIN {} {}", c, k),
            PART(c, None) => write!(f, "PART {}", c),
            PART(c, Some(m)) => {
                write!(f, "PART {}", c)?;
                write_trailing(f, &[], m)
            }
            MODE(target, rest) => {
                write!(f, "MODE {}", target)?;
                write_params(f, rest)
            }
            TOPIC(c, None) => write!(f, "TOPIC {}", c),
            TOPIC(c, Some(t)) => {
                write!(f, "TOPIC {}", c)?;
                write_trailing(f, &[], t)
            }
            NAMES(None) => write!(f, "NAMES"),
            NAMES(Some(c)) => write!(f, "NAMES {}", c),
            PRIVMSG(t, x) => {
                write!(f, "PRIVMSG")?;
                write_trailing(f, &[t.as_str()], x)
            }
            NOTICE(t, x) => {
                write!(f, "NOTICE")?;
                write_trailing(f, &[t.as_str()], x)
            }
            MOTD(None) => write!(f, "MOTD"),
            MOTD(Some(t)) => write!(f, "MOTD {}", t),
            PING(a, None) => {
                write!(f, "PING")?;
                write_trailing(f, &[], a)
            }
            PING(a, Some(b)) => {
                write!(f, "PING {}", a)?;
                write_trailing(f, &[], b)
            }
            PONG(a, None) => {
                write!(f, "PONG")?;
                write_trailing(f, &[], a)
            }
            PONG(a, Some(b)) => {
                write!(f, "PONG {}", a)?;
                write_trailing(f, &[], b)
            }
            ERROR(m) => {
                write!(f, "ERROR")?;
                write_trailing(f, &[], m)
            }
            AWAY(None) => write!(f, "AWAY"),
            AWAY(Some(m)) => {
                write!(f, "AWAY")?;
                write_trailing(f, &[], m)
            }
            Response(resp, params) => {
                write!(f, "{:03}", resp.code())?;
                match params.split_last() {
                    Some((trailing, middles)) => {
                        for middle in middles {
                            write!(f, " {}", middle)?;
                        }
                        write!(f, " :{}", trailing)
                    }
                    None => Ok(()),
                }
            }
            Raw(name, params) => {
                write!(f, "{}", name)?;
                write_params(f, params)
            }
            // Commands the bouncer only relays: opcode plus verbatim params.
            OPER(p) | SERVER(p) | SQUIT(p) | LIST(p) | INVITE(p) | KICK(p) | VERSION(p)
            | STATS(p) | LINKS(p) | TIME(p) | CONNECT(p) | TRACE(p) | ADMIN(p) | INFO(p)
            | WHO(p) | WHOIS(p) | WHOWAS(p) | KILL(p) | REHASH(p) | RESTART(p) | SUMMON(p)
            | USERS(p) | WALLOPS(p) | USERHOST(p) | ISON(p) | CAP(p) => {
                write!(f, "{}", self.token())?;
                write_params(f, p)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(cmd: &str, params: &[&str]) -> Command {
        Command::from_parts(cmd, params.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn recognizes_textual_commands_case_insensitively() {
        assert_eq!(
            parts("privmsg", &["#c", "hi"]),
            Command::PRIVMSG("#c".into(), "hi".into())
        );
        assert_eq!(parts("Join", &["#c"]), Command::JOIN("#c".into(), None));
        assert_eq!(parts("NICK", &["alice"]), Command::NICK("alice".into()));
    }

    #[test]
    fn unknown_opcode_preserves_token() {
        let cmd = parts("BLARG", &["x", "y z"]);
        assert_eq!(
            cmd,
            Command::Raw("BLARG".into(), vec!["x".into(), "y z".into()])
        );
        assert_eq!(cmd.to_string(), "BLARG x :y z");
    }

    #[test]
    fn short_arity_falls_back_to_raw() {
        assert_eq!(parts("PRIVMSG", &["#c"]), Command::Raw("PRIVMSG".into(), vec!["#c".into()]));
        assert_eq!(parts("JOIN", &[]), Command::Raw("JOIN".into(), vec![]));
        assert_eq!(parts("NICK", &[]), Command::Raw("NICK".into(), vec![]));
    }

    #[test]
    fn named_numerics_become_responses() {
        assert_eq!(
            parts("001", &["nick", "Welcome"]),
            Command::Response(
                Response::RPL_WELCOME,
                vec!["nick".into(), "Welcome".into()]
            )
        );
    }

    #[test]
    fn unnamed_numerics_stay_raw() {
        let cmd = parts("366", &["nick", "#c", "End of /NAMES list."]);
        assert!(matches!(cmd, Command::Raw(ref name, _) if name == "366"));
        assert_eq!(cmd.to_string(), "366 nick #c :End of /NAMES list.");
    }

    #[test]
    fn numeric_serialization_is_zero_padded() {
        let cmd = Command::Response(Response::RPL_WELCOME, vec!["n".into(), "Welcome".into()]);
        assert_eq!(cmd.to_string(), "001 n :Welcome");
    }

    #[test]
    fn trailing_text_always_gets_colon() {
        assert_eq!(
            Command::PRIVMSG("#x".into(), "hi".into()).to_string(),
            "PRIVMSG #x :hi"
        );
        assert_eq!(
            Command::PONG("tolsun.oulu.fi".into(), None).to_string(),
            "PONG :tolsun.oulu.fi"
        );
        assert_eq!(
            Command::USER("u".into(), "localhost".into(), "srv".into(), "Real Name".into())
                .to_string(),
            "USER u localhost srv :Real Name"
        );
    }

    #[test]
    fn token_matches_dispatch_keys() {
        assert_eq!(parts("privmsg", &["#c", "x"]).token(), "PRIVMSG");
        assert_eq!(parts("001", &["n", "w"]).token(), "001");
        assert_eq!(parts("BLARG", &[]).token(), "BLARG");
    }
}
