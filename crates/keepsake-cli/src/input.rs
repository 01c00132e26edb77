//! Parsing of user command lines.

use keepsake_presentation::domain::commands::UserInput;

use crate::error::AppError;

/// One line of user input, parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliCommand {
    /// Forward an input to the presentation.
    Input(UserInput),
    /// Print the presentation view as JSON.
    Status,
    /// End the session.
    Quit,
}

/// Help line listing every command.
pub const USAGE: &str =
    "commands: start | choose <n> | point <n> | continue | open | finish | replay | freeze | status | quit";

/// Parses a command line. Blank lines yield `None`.
///
/// Option and point numbers are one-based, as printed on screen.
///
/// # Errors
///
/// Returns `AppError::UnknownCommand` if the line is not a command.
pub fn parse_command(line: &str) -> Result<Option<CliCommand>, AppError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let argument = words.next();
    if words.next().is_some() {
        return Err(AppError::UnknownCommand(line.trim().to_owned()));
    }

    let command = match (verb.to_ascii_lowercase().as_str(), argument) {
        ("start", None) => CliCommand::Input(UserInput::Start),
        ("choose", Some(n)) => CliCommand::Input(UserInput::Choose {
            option: position(line, n)?,
        }),
        ("point", Some(n)) => CliCommand::Input(UserInput::SelectMoment {
            index: position(line, n)?,
        }),
        ("continue", None) => CliCommand::Input(UserInput::Continue),
        ("open", None) => CliCommand::Input(UserInput::OpenEnvelope),
        ("finish", None) => CliCommand::Input(UserInput::Finish),
        ("replay", None) => CliCommand::Input(UserInput::Replay),
        ("freeze", None) => CliCommand::Input(UserInput::Freeze),
        ("status", None) => CliCommand::Status,
        ("quit" | "exit", None) => CliCommand::Quit,
        _ => return Err(AppError::UnknownCommand(line.trim().to_owned())),
    };
    Ok(Some(command))
}

/// Converts a one-based number into a zero-based index.
fn position(line: &str, raw: &str) -> Result<usize, AppError> {
    raw.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| AppError::UnknownCommand(line.trim().to_owned()))
}
