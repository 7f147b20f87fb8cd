//! User-visible replies and errors.

use thiserror::Error;

use super::command::format_help;

/// Errors reported back to the session that issued a command.
///
/// The `Display` text is exactly what the client sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Another registered session already holds the nickname.
    #[error("ERROR: Nickname already taken, please use other nickname.")]
    NicknameTaken,

    /// `/nick` argument is not a single valid token.
    #[error("ERROR: Nickname can not contains space.")]
    NicknameHasSpace,

    /// No registered session holds the PM target nickname.
    #[error("ERROR: Nickname `{0}` does not exists.")]
    NicknameNotFound(String),

    /// PM addressed to the sender.
    #[error("ERROR: You can not PM yourself.")]
    CannotPmSelf,

    /// `/pm` line without a valid recipient and message.
    #[error("ERROR: Could not send your message.")]
    CouldNotSendPm,

    /// Anonymous session tried `/msg` or `/pm`.
    #[error("ERROR: You need to set your nickname first.")]
    MustRegisterFirst,

    /// `/msg` with nothing to say.
    #[error("ERROR: Please provide a message.")]
    MessageRequired,

    /// Input matched no command.
    #[error("ERROR: Unknown command.")]
    UnknownCommand,
}

const BANNER_RULE: &str = "**************************************";
const BANNER_TITLE: &str = "Welcome to the Club - Enjoy your chat!";

/// Greeting sent to a freshly opened connection.
pub fn welcome() -> String {
    format!(
        "{BANNER_RULE}\n{BANNER_TITLE}\n{BANNER_RULE}\n{}\n\n",
        format_help()
    )
}

/// Acknowledgment of a successful `/nick`.
pub fn nickname_changed(nickname: &str) -> String {
    format!("SUCCESS: Your nickname has changed to {nickname}.")
}

/// Announcement that a session registered.
pub fn user_joined(nickname: &str) -> String {
    format!("User `{nickname}` has joined channel.")
}

/// Announcement that a registered session disconnected.
pub fn user_quit(nickname: &str) -> String {
    format!("User `{nickname}` has quit chatroom.")
}

/// Body of a `/msg` broadcast.
pub fn chat_line(nickname: &str, text: &str) -> String {
    format!("{nickname}: {text}")
}

/// Private message as seen by the recipient.
pub fn private_message(sender: &str, text: &str) -> String {
    format!(">> PM from `{sender}` -> {text}")
}

/// The `/users` report.
///
/// `nicknames` are the registered users; `total` counts every open session.
pub fn users_report(nicknames: &[&str], total: usize) -> String {
    let registered = nicknames.len();
    let anonymous = total.saturating_sub(registered);

    let header =
        format!("Currently we have {registered} users online and {anonymous} anonymous.");
    let mut report = format!("{header}\n{}\n", "-".repeat(header.len()));

    if registered > 0 {
        report.push('\n');
        for nickname in nicknames {
            report.push_str(&format!("- {nickname}\n"));
        }
    }
    report
}
