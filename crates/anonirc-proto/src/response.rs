//! Numeric replies.
//!
//! Only the numerics anonircd emits are modelled; any other three-digit
//! command decodes as [`crate::Command::Unknown`].

use std::fmt;
use std::str::FromStr;

macro_rules! responses {
    ($($(#[$meta:meta])* $name:ident = $code:literal,)+) => {
        /// IRC numeric reply codes.
        #[allow(non_camel_case_types)]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u16)]
        pub enum Response {
            $($(#[$meta])* $name = $code,)+
        }

        impl Response {
            /// Look up a response by its numeric code.
            pub fn from_code(code: u16) -> Option<Self> {
                match code {
                    $($code => Some(Response::$name),)+
                    _ => None,
                }
            }

            /// The symbolic name, e.g. `ERR_NOSUCHNICK`.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Response::$name => stringify!($name),)+
                }
            }
        }
    };
}

responses! {
    /// `001 <nick> :Welcome to the <network> <nick>`
    RPL_WELCOME = 1,
    /// `002 <nick> :Your host is <server>`
    RPL_YOURHOST = 2,
    /// `003 <nick> :This server was created <date>`
    RPL_CREATED = 3,
    /// `004 <nick> <server> <version> <usermodes> <chanmodes>`
    RPL_MYINFO = 4,
    /// `321 <nick> Channel :Users  Name`
    RPL_LISTSTART = 321,
    /// `322 <nick> <channel> <count> :<topic>`
    RPL_LIST = 322,
    /// `323 <nick> :End of /LIST`
    RPL_LISTEND = 323,
    /// `331 <nick> <channel> :No topic is set`
    RPL_NOTOPIC = 331,
    /// `332 <nick> <channel> :<topic>`
    RPL_TOPIC = 332,
    /// `353 <nick> = <channel> :<names>`
    RPL_NAMREPLY = 353,
    /// `366 <nick> <channel> :End of /NAMES list`
    RPL_ENDOFNAMES = 366,
    /// `372 <nick> :- <text>`
    RPL_MOTD = 372,
    /// `375 <nick> :- <server> Message of the day -`
    RPL_MOTDSTART = 375,
    /// `376 <nick> :End of /MOTD command`
    RPL_ENDOFMOTD = 376,
    /// `381 <nick> :You are now an IRC operator`
    RPL_YOUREOPER = 381,
    /// `382 <nick> <config file> :Rehashing`
    RPL_REHASHING = 382,
    /// `400 <nick> <command> :<info>`
    ERR_UNKNOWNERROR = 400,
    /// `401 <nick> <target> :No such nick/channel`
    ERR_NOSUCHNICK = 401,
    /// `403 <nick> <channel> :No such channel`
    ERR_NOSUCHCHANNEL = 403,
    /// `404 <nick> <channel> :Cannot send to channel`
    ERR_CANNOTSENDTOCHAN = 404,
    /// `411 <nick> :No recipient given (<command>)`
    ERR_NORECIPIENT = 411,
    /// `412 <nick> :No text to send`
    ERR_NOTEXTTOSEND = 412,
    /// `417 <nick> :Input line was too long`
    ERR_INPUTTOOLONG = 417,
    /// `421 <nick> <command> :Unknown command`
    ERR_UNKNOWNCOMMAND = 421,
    /// `422 <nick> :MOTD File is missing`
    ERR_NOMOTD = 422,
    /// `431 <nick> :No nickname given`
    ERR_NONICKNAMEGIVEN = 431,
    /// `432 <nick> <nick> :Erroneous nickname`
    ERR_ERRONEOUSNICKNAME = 432,
    /// `433 <nick> <nick> :Nickname is already in use`
    ERR_NICKNAMEINUSE = 433,
    /// `441 <nick> <target> <channel> :They aren't on that channel`
    ERR_USERNOTINCHANNEL = 441,
    /// `442 <nick> <channel> :You're not on that channel`
    ERR_NOTONCHANNEL = 442,
    /// `451 <nick> :You have not registered`
    ERR_NOTREGISTERED = 451,
    /// `461 <nick> <command> :Not enough parameters`
    ERR_NEEDMOREPARAMS = 461,
    /// `462 <nick> :You may not reregister`
    ERR_ALREADYREGISTERED = 462,
    /// `464 <nick> :Password incorrect`
    ERR_PASSWDMISMATCH = 464,
    /// `465 <nick> :You are banned from this server`
    ERR_YOUREBANNEDCREEP = 465,
    /// `476 <nick> <channel> :Bad Channel Mask`
    ERR_BADCHANMASK = 476,
    /// `481 <nick> :Permission Denied- You're not an IRC operator`
    ERR_NOPRIVILEGES = 481,
    /// `482 <nick> <channel> :You're not channel operator`
    ERR_CHANOPRIVSNEEDED = 482,
    /// `491 <nick> :No O-lines for your host`
    ERR_NOOPERHOST = 491,
}

impl Response {
    /// The numeric code.
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Error replies live in the 400-599 range.
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.code())
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.code())
    }
}

impl FromStr for Response {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(());
        }
        s.parse::<u16>()
            .ok()
            .and_then(Response::from_code)
            .ok_or(())
    }
}
