//! Terminal input parsing.
//!
//! Plain lines are chat messages; lines starting with `/` are commands.

use buddy_core::SchemeId;

/// One parsed line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Language(String),
    Schemes,
    Categories,
    Category(String),
    Search(String),
    Select(SchemeId),
    Clear,
    Help,
    Quit,
    Invalid(String),
}

pub const HELP: &str = "\
Type a question to ask about government schemes, or:
  /lang <english|hindi>   switch answer language
  /schemes                list all schemes
  /categories             list categories
  /category <name>        filter schemes by category
  /search [term]          search schemes (empty term lists all)
  /select <id>            focus questions on a scheme
  /clear                  clear the conversation
  /quit                   exit";

/// Parse a line of input.
pub fn parse(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(rest) = line.trim_start().strip_prefix('/') else {
        return Command::Send(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match name {
        "lang" | "language" if !arg.is_empty() => Command::Language(arg.to_string()),
        "schemes" => Command::Schemes,
        "categories" => Command::Categories,
        "category" if !arg.is_empty() => Command::Category(arg.to_string()),
        "search" => Command::Search(arg.to_string()),
        "select" => match arg.parse() {
            Ok(id) => Command::Select(id),
            Err(_) => Command::Invalid(format!("not a scheme id: {arg:?}")),
        },
        "clear" => Command::Clear,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "lang" | "language" | "category" => {
            Command::Invalid(format!("/{name} needs an argument"))
        }
        other => Command::Invalid(format!("unknown command: /{other}")),
    }
}
