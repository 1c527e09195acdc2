//! Interactive prompts: delete confirmation and the hidden password.

use std::io::{self, BufRead, Write};
use task_manager_core::Confirmer;

/// Asks for confirmation on stderr and reads the answer from stdin.
pub struct StdinConfirmer {
    assume_yes: bool,
}

impl StdinConfirmer {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Confirmer for StdinConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{} [y/N] ", prompt);
        if io::stderr().flush().is_err() {
            return false;
        }
        read_answer(io::stdin().lock())
    }
}

/// Anything but an explicit yes declines, including a closed stdin.
fn read_answer(mut input: impl BufRead) -> bool {
    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

pub fn prompt_password(username: &str) -> anyhow::Result<String> {
    Ok(rpassword::prompt_password(format!("Password for {}: ", username))?)
}
