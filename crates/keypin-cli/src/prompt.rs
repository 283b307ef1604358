//! Terminal dialogs for the three presenter requests.

use crate::render;
use crate::tty::Terminal;
use keypin_core::session::DEFAULT_KEY_INFO;
use keypin_core::{ConfirmRequest, Credential, InputOutcome, InputRequest, MessageRequest};
use std::io;

/// Ask for a credential.
///
/// An empty entry cancels. In double-entry mode both entries must match;
/// a mismatch shows the repeat error and starts over.
pub fn ask_input(term: &mut dyn Terminal, request: &InputRequest) -> io::Result<InputOutcome> {
    header(term, &request.title, &request.description, request.is_error)?;
    if request.key_info != DEFAULT_KEY_INFO {
        term.write_line(&render::detail("Key", &request.key_info))?;
    }
    term.write_line(&render::hint(&format!(
        "Enter to {}, empty input to {}",
        request.ok_label, request.cancel_label
    )))?;

    loop {
        let first = Credential::new(term.read_secret(&prompt_text(&request.prompt))?);
        if first.is_empty() {
            return Ok(InputOutcome::cancelled());
        }

        if let Some(repeat) = &request.repeat_prompt {
            let second = Credential::new(term.read_secret(&prompt_text(repeat))?);
            if second.is_empty() {
                return Ok(InputOutcome::cancelled());
            }
            if second != first {
                term.write_line(&render::error(&request.repeat_error))?;
                continue;
            }
        }

        let save = request.allow_cache
            && request.repeat_prompt.is_none()
            && is_yes(&term.read_line("Save in cache? [y/N] ")?, None);
        return Ok(InputOutcome::entered(first, save));
    }
}

/// Ask a yes/no question.
pub fn ask_confirm(term: &mut dyn Terminal, request: &ConfirmRequest) -> io::Result<bool> {
    header(term, &request.title, &request.description, false)?;
    let answer = term.read_line(&format!(
        "{} / {} [y/N] ",
        request.ok_label, request.cancel_label
    ))?;
    Ok(is_yes(&answer, Some(&request.ok_label)))
}

/// Show a message and wait for Enter.
pub fn show_message(term: &mut dyn Terminal, request: &MessageRequest) -> io::Result<()> {
    header(term, &request.title, &request.description, false)?;
    term.read_line(&format!("[{}] ", request.ok_label))?;
    Ok(())
}

fn header(term: &mut dyn Terminal, title: &str, description: &str, is_error: bool) -> io::Result<()> {
    term.write_line("")?;
    term.write_line(&render::title(title))?;
    for line in description.lines() {
        term.write_line(&render::description(line, is_error))?;
    }
    Ok(())
}

fn prompt_text(prompt: &str) -> String {
    format!("{} ", prompt.trim_end())
}

fn is_yes(answer: &str, ok_label: Option<&str>) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y")
        || answer.eq_ignore_ascii_case("yes")
        || ok_label.is_some_and(|ok| !ok.is_empty() && answer.eq_ignore_ascii_case(ok))
}
