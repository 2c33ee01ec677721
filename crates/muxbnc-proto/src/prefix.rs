//! IRC message prefixes.
//!
//! A prefix identifies the origin of a message: either a server name or a
//! user mask of the form `nick[!user][@host]`.

use std::fmt;
use std::str::FromStr;

/// The origin of an IRC message.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum Prefix {
    /// A server name (e.g. `irc.example.com`).
    ServerName(String),
    /// A user prefix: nickname, username, hostname. Unknown components are
    /// empty strings.
    Nickname(String, String, String),
}

impl Prefix {
    /// Parse a prefix string leniently.
    ///
    /// A name containing a dot and neither `!` nor `@` is taken to be a
    /// server name; everything else is a user prefix.
    pub fn new_from_str(s: &str) -> Self {
        // nick!user@host, with the user and host sections optional. The
        // first '@' ends the nick!user section; within it, the first '!'
        // ends the nick.
        let (front, host) = match s.split_once('@') {
            Some((front, host)) => (front, Some(host)),
            None => (s, None),
        };
        let (nick, user) = match front.split_once('!') {
            Some((nick, user)) => (nick, Some(user)),
            None => (front, None),
        };

        if user.is_none() && host.is_none() && nick.contains('.') {
            return Prefix::ServerName(nick.to_string());
        }

        Prefix::Nickname(
            nick.to_string(),
            user.unwrap_or_default().to_string(),
            host.unwrap_or_default().to_string(),
        )
    }

    /// Build a user prefix from its components.
    pub fn new(nick: impl Into<String>, user: impl Into<String>, host: impl Into<String>) -> Self {
        Prefix::Nickname(nick.into(), user.into(), host.into())
    }

    /// The nickname, for user prefixes.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(nick, _, _) if !nick.is_empty() => Some(nick),
            _ => None,
        }
    }

    /// The username, for user prefixes.
    pub fn user(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(_, user, _) if !user.is_empty() => Some(user),
            _ => None,
        }
    }

    /// The hostname (or the server name).
    pub fn host(&self) -> Option<&str> {
        match self {
            Prefix::ServerName(name) => Some(name),
            Prefix::Nickname(_, _, host) if !host.is_empty() => Some(host),
            _ => None,
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => write!(f, "{}", name),
            Prefix::Nickname(nick, user, host) => {
                write!(f, "{}", nick)?;
                if !user.is_empty() {
                    write!(f, "!{}", user)?;
                }
                if !host.is_empty() {
                    write!(f, "@{}", host)?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for Prefix {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Prefix::new_from_str(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_server_name() {
        let p = Prefix::new_from_str("irc.example.com");
        assert_eq!(p, Prefix::ServerName("irc.example.com".into()));
    }

    #[test]
    fn parses_full_user_mask() {
        let p = Prefix::new_from_str("nick!user@host.example.com");
        assert_eq!(
            p,
            Prefix::Nickname("nick".into(), "user".into(), "host.example.com".into())
        );
    }

    #[test]
    fn parses_bare_nick() {
        let p = Prefix::new_from_str("alice");
        assert_eq!(p, Prefix::Nickname("alice".into(), "".into(), "".into()));
        assert_eq!(p.nick(), Some("alice"));
        assert_eq!(p.user(), None);
        assert_eq!(p.host(), None);
    }

    #[test]
    fn parses_nick_at_host() {
        let p = Prefix::new_from_str("alice@10.0.0.1");
        assert_eq!(
            p,
            Prefix::Nickname("alice".into(), "".into(), "10.0.0.1".into())
        );
    }

    #[test]
    fn display_round_trips() {
        for raw in ["irc.example.com", "nick!user@host", "alice", "alice@h"] {
            let p = Prefix::new_from_str(raw);
            assert_eq!(p.to_string(), *raw);
        }
    }
}
