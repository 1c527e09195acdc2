//! Plain-text rendering of the application state after a command.

use std::io::{self, Write};
use task_manager_core::app::LOGIN_REQUIRED;
use task_manager_core::{AppState, Notification, Task};

pub const EMPTY_LIST: &str = "No tasks yet. Add your first task!";

pub fn render(state: &AppState, out: &mut impl Write) -> io::Result<()> {
    match state.session() {
        Some(session) => {
            if session.username().is_empty() {
                writeln!(out, "Welcome!")?;
            } else {
                writeln!(out, "Welcome, {}!", session.username())?;
            }
            if let Some(notification) = state.notification() {
                render_notification(notification, out)?;
            }
            writeln!(out)?;
            render_tasks(state.tasks().tasks(), out)
        }
        None => {
            if let Some(error) = state.login_error() {
                writeln!(out, "Error: {}", error)?;
            }
            match state.notification() {
                Some(notification) => render_notification(notification, out),
                None => writeln!(out, "{}", LOGIN_REQUIRED),
            }
        }
    }
}

fn render_notification(notification: &Notification, out: &mut impl Write) -> io::Result<()> {
    if notification.is_error() {
        writeln!(out, "Error: {}", notification)
    } else {
        writeln!(out, "{}", notification)
    }
}

fn render_tasks(tasks: &[Task], out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Tasks ({})", tasks.len())?;
    if tasks.is_empty() {
        return writeln!(out, "{}", EMPTY_LIST);
    }
    for task in tasks {
        let mark = if task.completed { "x" } else { " " };
        writeln!(out, "[{}] {:>4}  {} ({})", mark, task.id.as_str(), task.title, task.priority)?;
        if !task.description.is_empty() {
            writeln!(out, "          {}", task.description)?;
        }
    }
    Ok(())
}
