//! IRC commands understood by anonircd.

use std::borrow::Cow;

use crate::error::MessageParseError;
use crate::response::Response;

/// A parsed IRC command with its parameters.
///
/// Variants carry only the parameters anonircd acts on; extra parameters on
/// input are ignored. Anything unrecognised survives as [`Command::Unknown`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Command {
    /// `NICK <nickname>`
    NICK(String),
    /// `USER <user> <mode> * :<realname>`
    USER(String, String, String),
    /// `JOIN <channels> [<keys>]`
    JOIN(String, Option<String>),
    /// `PART <channels> [:<reason>]`
    PART(String, Option<String>),
    /// `PRIVMSG <target> :<text>`
    PRIVMSG(String, String),
    /// `NOTICE <target> :<text>`
    NOTICE(String, String),
    /// `QUIT [:<reason>]`
    QUIT(Option<String>),
    /// `TOPIC <channel> [:<topic>]`
    TOPIC(String, Option<String>),
    /// `KICK <channel> <target> [:<reason>]`
    KICK(String, String, Option<String>),
    /// `PING <token> [<server>]`
    PING(String, Option<String>),
    /// `PONG <token> [<server>]`
    PONG(String, Option<String>),
    /// `NAMES [<channels>]`
    NAMES(Option<String>),
    /// `LIST [<channels>]`
    LIST(Option<String>),
    /// `MOTD [<server>]`
    MOTD(Option<String>),
    /// `OPER <name> <password>`
    OPER(String, String),
    /// `KILL <nick> [:<reason>]`
    KILL(String, Option<String>),
    /// `DLINE [<minutes>] <mask> [:<reason>]`
    DLINE(Option<u64>, String, Option<String>),
    /// `UNDLINE <mask>`
    UNDLINE(String),
    /// `REHASH`
    REHASH,
    /// `CAP [<target>] <subcommand> [:<params>]`
    CAP(Option<String>, String, Option<String>),
    /// `ERROR :<message>`
    ERROR(String),
    /// Numeric reply.
    Response(Response, Vec<String>),
    /// Any command not modelled above.
    Unknown(String, Vec<String>),
}

const CAP_SUBCOMMANDS: [&str; 6] = ["LS", "LIST", "REQ", "ACK", "NAK", "END"];

fn is_cap_subcommand(word: &str) -> bool {
    CAP_SUBCOMMANDS
        .iter()
        .any(|sub| sub.eq_ignore_ascii_case(word))
}

fn require(cmd: &str, args: &[&str], needed: usize) -> Result<(), MessageParseError> {
    if args.len() < needed {
        return Err(MessageParseError::NotEnoughArguments {
            cmd: cmd.to_owned(),
            needed,
            got: args.len(),
        });
    }
    Ok(())
}

fn opt(args: &[&str], idx: usize) -> Option<String> {
    args.get(idx).map(|s| (*s).to_owned())
}

impl Command {
    /// Build a command from its name and raw parameters.
    ///
    /// `cmd` is matched case-insensitively. Known commands with too few
    /// parameters fail with [`MessageParseError::NotEnoughArguments`].
    pub fn new(cmd: &str, args: &[&str]) -> Result<Command, MessageParseError> {
        let upper = cmd.to_ascii_uppercase();
        let arg = |idx: usize| args[idx].to_owned();

        let command = match upper.as_str() {
            "NICK" => {
                require(&upper, args, 1)?;
                Command::NICK(arg(0))
            }
            "USER" => {
                require(&upper, args, 4)?;
                Command::USER(arg(0), arg(1), arg(3))
            }
            "JOIN" => {
                require(&upper, args, 1)?;
                Command::JOIN(arg(0), opt(args, 1))
            }
            "PART" => {
                require(&upper, args, 1)?;
                Command::PART(arg(0), opt(args, 1))
            }
            "PRIVMSG" => {
                require(&upper, args, 2)?;
                Command::PRIVMSG(arg(0), arg(1))
            }
            "NOTICE" => {
                require(&upper, args, 2)?;
                Command::NOTICE(arg(0), arg(1))
            }
            "QUIT" => Command::QUIT(opt(args, 0)),
            "TOPIC" => {
                require(&upper, args, 1)?;
                Command::TOPIC(arg(0), opt(args, 1))
            }
            "KICK" => {
                require(&upper, args, 2)?;
                Command::KICK(arg(0), arg(1), opt(args, 2))
            }
            "PING" => {
                require(&upper, args, 1)?;
                Command::PING(arg(0), opt(args, 1))
            }
            "PONG" => {
                require(&upper, args, 1)?;
                Command::PONG(arg(0), opt(args, 1))
            }
            "NAMES" => Command::NAMES(opt(args, 0)),
            "LIST" => Command::LIST(opt(args, 0)),
            "MOTD" => Command::MOTD(opt(args, 0)),
            "OPER" => {
                require(&upper, args, 2)?;
                Command::OPER(arg(0), arg(1))
            }
            "KILL" => {
                require(&upper, args, 1)?;
                Command::KILL(arg(0), opt(args, 1))
            }
            "DLINE" => {
                require(&upper, args, 1)?;
                // a leading all-digit parameter is a duration only if a mask follows
                match args[0].parse::<u64>() {
                    Ok(minutes) if args.len() >= 2 => {
                        Command::DLINE(Some(minutes), arg(1), opt(args, 2))
                    }
                    _ => Command::DLINE(None, arg(0), opt(args, 1)),
                }
            }
            "UNDLINE" => {
                require(&upper, args, 1)?;
                Command::UNDLINE(arg(0))
            }
            "REHASH" => Command::REHASH,
            "CAP" => {
                require(&upper, args, 1)?;
                // three parameters always carry a target; with two, the
                // second decides: `CAP * LS` versus `CAP REQ multi-prefix`
                let targeted = match args.len() {
                    1 => false,
                    2 => is_cap_subcommand(args[1]),
                    _ => true,
                };
                if targeted {
                    Command::CAP(Some(arg(0)), args[1].to_ascii_uppercase(), opt(args, 2))
                } else {
                    Command::CAP(None, args[0].to_ascii_uppercase(), opt(args, 1))
                }
            }
            "ERROR" => {
                require(&upper, args, 1)?;
                Command::ERROR(arg(0))
            }
            _ => {
                let owned = args.iter().map(|s| (*s).to_owned()).collect();
                match upper.parse::<Response>() {
                    Ok(response) => Command::Response(response, owned),
                    Err(()) => Command::Unknown(upper.clone(), owned),
                }
            }
        };

        Ok(command)
    }

    /// The command name as sent on the wire.
    pub fn name(&self) -> String {
        match self {
            Command::NICK(..) => "NICK".into(),
            Command::USER(..) => "USER".into(),
            Command::JOIN(..) => "JOIN".into(),
            Command::PART(..) => "PART".into(),
            Command::PRIVMSG(..) => "PRIVMSG".into(),
            Command::NOTICE(..) => "NOTICE".into(),
            Command::QUIT(..) => "QUIT".into(),
            Command::TOPIC(..) => "TOPIC".into(),
            Command::KICK(..) => "KICK".into(),
            Command::PING(..) => "PING".into(),
            Command::PONG(..) => "PONG".into(),
            Command::NAMES(..) => "NAMES".into(),
            Command::LIST(..) => "LIST".into(),
            Command::MOTD(..) => "MOTD".into(),
            Command::OPER(..) => "OPER".into(),
            Command::KILL(..) => "KILL".into(),
            Command::DLINE(..) => "DLINE".into(),
            Command::UNDLINE(..) => "UNDLINE".into(),
            Command::REHASH => "REHASH".into(),
            Command::CAP(..) => "CAP".into(),
            Command::ERROR(..) => "ERROR".into(),
            Command::Response(resp, _) => resp.to_string(),
            Command::Unknown(name, _) => name.clone(),
        }
    }

    /// Parameters in wire order, without the trailing-colon decision.
    pub fn params(&self) -> Vec<Cow<'_, str>> {
        fn b(s: &str) -> Cow<'_, str> {
            Cow::Borrowed(s)
        }

        let mut out: Vec<Cow<'_, str>> = Vec::new();
        match self {
            Command::NICK(n) | Command::UNDLINE(n) | Command::ERROR(n) => out.push(b(n)),
            Command::USER(user, mode, real) => {
                out.extend([b(user), b(mode), b("*"), b(real)]);
            }
            Command::JOIN(a, rest)
            | Command::PART(a, rest)
            | Command::TOPIC(a, rest)
            | Command::PING(a, rest)
            | Command::PONG(a, rest)
            | Command::KILL(a, rest) => {
                out.push(b(a));
                out.extend(rest.as_deref().map(b));
            }
            Command::PRIVMSG(a, c) | Command::NOTICE(a, c) | Command::OPER(a, c) => {
                out.extend([b(a), b(c)]);
            }
            Command::QUIT(a) | Command::NAMES(a) | Command::LIST(a) | Command::MOTD(a) => {
                out.extend(a.as_deref().map(b));
            }
            Command::KICK(chan, target, reason) => {
                out.extend([b(chan), b(target)]);
                out.extend(reason.as_deref().map(b));
            }
            Command::DLINE(minutes, mask, reason) => {
                out.extend(minutes.map(|m| Cow::Owned(m.to_string())));
                out.push(b(mask));
                out.extend(reason.as_deref().map(b));
            }
            Command::REHASH => {}
            Command::CAP(target, sub, param) => {
                out.extend(target.as_deref().map(b));
                out.push(b(sub));
                out.extend(param.as_deref().map(b));
            }
            Command::Response(_, args) | Command::Unknown(_, args) => {
                out.extend(args.iter().map(|a| b(a)));
            }
        }
        out
    }
}
