use std::fmt::Write;

use ventboard::application::Board;
use ventboard::core::label::label_color;
use ventboard::core::vent::Author;

fn badge(label: &str) -> String {
    let color = label_color(label);
    format!("\x1b[97;48;5;{}m {} \x1b[0m", color.ansi(), label)
}

/// Plain-text rendering of the three columns, one after another.
pub fn render(board: &Board) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "── Vent ──");
    for entry in board.vent_log().entries() {
        let who = match entry.author {
            Author::User => "you",
            Author::Assistant => " ai",
        };
        let _ = writeln!(out, "  {}: {}", who, entry.text);
    }

    let _ = writeln!(out, "── To-Do ──");
    for (i, todo) in board.todos().items().iter().enumerate() {
        let check = if todo.completed { "√" } else { " " };
        let text = if todo.completed {
            format!("\x1b[9;2m{}\x1b[0m", todo.text)
        } else {
            todo.text.clone()
        };
        let _ = writeln!(out, "  {:>2}. [{}] {} {}", i + 1, check, text, badge(&todo.label));
    }

    let _ = writeln!(out, "── Long Term ──");
    for task in board.long_term_tasks() {
        let _ = writeln!(out, "  • {}", task);
    }

    if let Some(identity) = board.identity() {
        let _ = writeln!(out, "(signed in as {})", identity.display_name());
    }
    out
}
