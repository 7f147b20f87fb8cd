//! Chat command parser.
//!
//! Classifies one input line into a [`Command`]. Parsing never fails: input
//! that does not fit a known command becomes [`Command::Unrecognized`], and
//! malformed `/nick` and `/pm` lines get their own variants so the handler can
//! report a specific error.

const NICK_PREFIX: &str = "/nick ";
const PM_PREFIX: &str = "/pm ";
const MSG_PREFIX: &str = "/msg ";

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank line, silently ignored.
    NoOp,
    /// Close the connection.
    Quit,
    /// Show the command list.
    Help,
    /// Claim a nickname.
    SetNickname(String),
    /// `/nick` with a name that is not a single valid token.
    InvalidNickname,
    /// Send a line to everyone.
    Broadcast(String),
    /// Send a line to one user.
    PrivateMessage {
        /// Recipient nickname.
        target: String,
        /// Message body.
        text: String,
    },
    /// `/pm` without a valid recipient and message.
    InvalidPrivateMessage,
    /// Report who is online.
    ListUsers,
    /// Anything else.
    Unrecognized,
}

impl Command {
    /// Get the command name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::NoOp => "noop",
            Command::Quit => "quit",
            Command::Help => "help",
            Command::SetNickname(_) | Command::InvalidNickname => "nick",
            Command::Broadcast(_) => "msg",
            Command::PrivateMessage { .. } | Command::InvalidPrivateMessage => "pm",
            Command::ListUsers => "users",
            Command::Unrecognized => "unknown",
        }
    }
}

/// Check whether `name` is a valid nickname token (`[A-Za-z0-9_-]+`).
pub fn is_valid_nickname(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Parse a chat input line into a command.
///
/// The line terminator must already be stripped.
pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Command::NoOp;
    }

    let line = input.trim_start();

    if trimmed == "/quit" {
        return Command::Quit;
    }
    if trimmed == "/help" {
        return Command::Help;
    }
    if let Some(rest) = line.strip_prefix(NICK_PREFIX) {
        return parse_nick(rest);
    }
    if let Some(rest) = line.strip_prefix(PM_PREFIX) {
        return parse_pm(rest);
    }
    if trimmed == "/users" {
        return Command::ListUsers;
    }
    if let Some(rest) = line.strip_prefix(MSG_PREFIX) {
        return Command::Broadcast(rest.to_string());
    }

    Command::Unrecognized
}

fn parse_nick(rest: &str) -> Command {
    let name = rest.trim_end();
    if is_valid_nickname(name) {
        Command::SetNickname(name.to_string())
    } else {
        Command::InvalidNickname
    }
}

fn parse_pm(rest: &str) -> Command {
    match rest.split_once(' ') {
        Some((target, text)) if is_valid_nickname(target) => Command::PrivateMessage {
            target: target.to_string(),
            text: text.to_string(),
        },
        _ => Command::InvalidPrivateMessage,
    }
}

/// Chat command information for help display.
pub struct CommandInfo {
    /// Command syntax.
    pub syntax: &'static str,
    /// Command description.
    pub description: &'static str,
}

/// All commands, in help order.
pub const COMMANDS: &[CommandInfo] = &[
    CommandInfo {
        syntax: "/nick NICKNAME",
        description: "Register a nickname",
    },
    CommandInfo {
        syntax: "/msg MESSAGE",
        description: "Send a message to all",
    },
    CommandInfo {
        syntax: "/pm NICKNAME MESSAGE",
        description: "Send private message",
    },
    CommandInfo {
        syntax: "/users",
        description: "Get list of online users",
    },
    CommandInfo {
        syntax: "/help",
        description: "Show this message",
    },
    CommandInfo {
        syntax: "/quit",
        description: "Quit chat club",
    },
];

/// Width of the syntax column in the help text.
const SYNTAX_WIDTH: usize = 24;

/// Format the help message for display.
pub fn format_help() -> String {
    let mut lines = vec!["List of commands:".to_string(), String::new()];
    for info in COMMANDS {
        lines.push(format!(
            "{:<width$}{}",
            info.syntax,
            info.description,
            width = SYNTAX_WIDTH
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blank_lines() {
        assert_eq!(parse_command(""), Command::NoOp);
        assert_eq!(parse_command("   "), Command::NoOp);
        assert_eq!(parse_command("\t"), Command::NoOp);
    }

    #[test]
    fn test_parse_exact_commands() {
        assert_eq!(parse_command("/quit"), Command::Quit);
        assert_eq!(parse_command("/help"), Command::Help);
        assert_eq!(parse_command("/users"), Command::ListUsers);
    }

    #[test]
    fn test_parse_exact_commands_with_padding() {
        assert_eq!(parse_command("  /quit  "), Command::Quit);
        assert_eq!(parse_command("/help "), Command::Help);
        assert_eq!(parse_command(" /users"), Command::ListUsers);
    }

    #[test]
    fn test_exact_commands_are_case_sensitive() {
        assert_eq!(parse_command("/QUIT"), Command::Unrecognized);
        assert_eq!(parse_command("/Help"), Command::Unrecognized);
    }

    #[test]
    fn test_exact_commands_with_arguments_are_unrecognized() {
        assert_eq!(parse_command("/quit now"), Command::Unrecognized);
        assert_eq!(parse_command("/users all"), Command::Unrecognized);
    }

    #[test]
    fn test_parse_nick() {
        assert_eq!(
            parse_command("/nick alice"),
            Command::SetNickname("alice".to_string())
        );
        assert_eq!(
            parse_command("/nick Bob_the-2nd"),
            Command::SetNickname("Bob_the-2nd".to_string())
        );
        assert_eq!(
            parse_command("/nick carol  "),
            Command::SetNickname("carol".to_string())
        );
    }

    #[test]
    fn test_parse_nick_invalid() {
        assert_eq!(parse_command("/nick bob smith"), Command::InvalidNickname);
        assert_eq!(parse_command("/nick "), Command::InvalidNickname);
        assert_eq!(parse_command("/nick  alice"), Command::InvalidNickname);
        assert_eq!(parse_command("/nick al!ce"), Command::InvalidNickname);
        assert_eq!(parse_command("/nick ålice"), Command::InvalidNickname);
    }

    #[test]
    fn test_parse_nick_without_argument_is_unrecognized() {
        assert_eq!(parse_command("/nick"), Command::Unrecognized);
    }

    #[test]
    fn test_parse_msg() {
        assert_eq!(
            parse_command("/msg hello there"),
            Command::Broadcast("hello there".to_string())
        );
        assert_eq!(
            parse_command("/msg   spaced  out "),
            Command::Broadcast("  spaced  out ".to_string())
        );
    }

    #[test]
    fn test_parse_msg_empty() {
        assert_eq!(parse_command("/msg "), Command::Broadcast(String::new()));
        assert_eq!(parse_command("/msg"), Command::Unrecognized);
    }

    #[test]
    fn test_parse_pm() {
        assert_eq!(
            parse_command("/pm bob hello there"),
            Command::PrivateMessage {
                target: "bob".to_string(),
                text: "hello there".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_pm_empty_text() {
        assert_eq!(
            parse_command("/pm bob "),
            Command::PrivateMessage {
                target: "bob".to_string(),
                text: String::new(),
            }
        );
    }

    #[test]
    fn test_parse_pm_invalid() {
        assert_eq!(parse_command("/pm bob"), Command::InvalidPrivateMessage);
        assert_eq!(parse_command("/pm "), Command::InvalidPrivateMessage);
        assert_eq!(parse_command("/pm  bob hi"), Command::InvalidPrivateMessage);
        assert_eq!(parse_command("/pm b*b hi"), Command::InvalidPrivateMessage);
    }

    #[test]
    fn test_parse_unrecognized() {
        assert_eq!(parse_command("hello"), Command::Unrecognized);
        assert_eq!(parse_command("/who"), Command::Unrecognized);
        assert_eq!(parse_command("/"), Command::Unrecognized);
        assert_eq!(parse_command("say /msg hi"), Command::Unrecognized);
    }

    #[test]
    fn test_is_valid_nickname() {
        assert!(is_valid_nickname("alice"));
        assert!(is_valid_nickname("A-1_b"));
        assert!(!is_valid_nickname(""));
        assert!(!is_valid_nickname("a b"));
        assert!(!is_valid_nickname("a`b"));
        assert!(!is_valid_nickname("a[b]"));
    }

    #[test]
    fn test_command_name() {
        assert_eq!(Command::Quit.name(), "quit");
        assert_eq!(Command::InvalidNickname.name(), "nick");
        assert_eq!(Command::Broadcast("x".to_string()).name(), "msg");
        assert_eq!(Command::InvalidPrivateMessage.name(), "pm");
    }

    #[test]
    fn test_format_help() {
        let help = format_help();
        assert!(help.starts_with("List of commands:\n\n"));
        assert!(help.contains("/nick NICKNAME          Register a nickname"));
        assert!(help.contains("/pm NICKNAME MESSAGE    Send private message"));
        assert!(help.ends_with("/quit                   Quit chat club"));
        assert_eq!(help.lines().count(), COMMANDS.len() + 2);
    }
}
