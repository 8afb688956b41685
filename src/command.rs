use uuid::Uuid;

use ventboard::message::Message;

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Vent(String),
    Todo(String),
    /// 1-based position in the rendered to-do list.
    Toggle(usize),
    LongTerm(String),
    Login,
    Logout,
    Help,
    Quit,
    Unknown(String),
}

pub const HELP: &str = "\
Type to vent. Commands:
  /todo <text>   add a to-do
  /done <n>      toggle to-do number n
  /long <text>   add a long-term task
  /login         sign in and load stored to-dos
  /logout        sign out
  /quit          exit";

pub fn parse(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Some(Command::Vent(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let cmd = match name {
        "todo" | "t" => Command::Todo(arg.to_string()),
        "done" | "d" => match arg.parse::<usize>() {
            Ok(n) if n > 0 => Command::Toggle(n),
            _ => Command::Unknown(line.to_string()),
        },
        "long" | "l" => Command::LongTerm(arg.to_string()),
        "login" => Command::Login,
        "logout" => Command::Logout,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    };
    Some(cmd)
}

/// Messages for a command. `visible` holds the to-do ids in display order.
pub fn to_messages(cmd: Command, visible: &[Uuid]) -> Vec<Message> {
    match cmd {
        Command::Vent(text) => vec![Message::VentInputChanged(text), Message::SubmitVent],
        Command::Todo(text) => vec![Message::TodoInputChanged(text), Message::AddTodo],
        Command::Toggle(n) => visible
            .get(n - 1)
            .map(|id| vec![Message::ToggleTodo(*id)])
            .unwrap_or_default(),
        Command::LongTerm(text) => {
            vec![Message::LongTermInputChanged(text), Message::AddLongTermTask]
        }
        Command::Login => vec![Message::SignIn],
        Command::Logout => vec![Message::SignOut],
        Command::Help | Command::Quit | Command::Unknown(_) => Vec::new(),
    }
}
