//! Named IRC numeric replies.
//!
//! Only the numerics the bouncer inspects by name are enumerated here;
//! anything else stays a raw three-digit code on the message (see
//! [`crate::Command::Raw`]).

#![allow(non_camel_case_types)]

/// An IRC numeric reply recognized by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Response {
    /// 001 - welcome to the network.
    RPL_WELCOME = 1,
    /// 002 - your host is running version.
    RPL_YOURHOST = 2,
    /// 003 - server creation date.
    RPL_CREATED = 3,
    /// 004 - server name, version, modes.
    RPL_MYINFO = 4,
    /// 005 - supported features (ISUPPORT).
    RPL_ISUPPORT = 5,
    /// 332 - channel topic.
    RPL_TOPIC = 332,
    /// 333 - who set the topic, and when.
    RPL_TOPICWHOTIME = 333,
    /// 372 - MOTD line.
    RPL_MOTD = 372,
    /// 375 - start of MOTD.
    RPL_MOTDSTART = 375,
    /// 376 - end of MOTD.
    RPL_ENDOFMOTD = 376,
    /// 433 - nickname is already in use.
    ERR_NICKNAMEINUSE = 433,
    /// 442 - you're not on that channel.
    ERR_NOTONCHANNEL = 442,
    /// 461 - not enough parameters.
    ERR_NEEDMOREPARAMS = 461,
    /// 464 - password incorrect.
    ERR_PASSWDMISMATCH = 464,
}

impl Response {
    /// The three-digit numeric code.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Look up a named numeric by code.
    pub fn from_code(code: u16) -> Option<Response> {
        use Response::*;
        match code {
            1 => Some(RPL_WELCOME),
            2 => Some(RPL_YOURHOST),
            3 => Some(RPL_CREATED),
            4 => Some(RPL_MYINFO),
            5 => Some(RPL_ISUPPORT),
            332 => Some(RPL_TOPIC),
            333 => Some(RPL_TOPICWHOTIME),
            372 => Some(RPL_MOTD),
            375 => Some(RPL_MOTDSTART),
            376 => Some(RPL_ENDOFMOTD),
            433 => Some(ERR_NICKNAMEINUSE),
            442 => Some(ERR_NOTONCHANNEL),
            461 => Some(ERR_NEEDMOREPARAMS),
            464 => Some(ERR_PASSWDMISMATCH),
            _ => None,
        }
    }

    /// Whether this numeric is an error reply (4xx/5xx).
    pub fn is_error(self) -> bool {
        self.code() >= 400
    }
}
