//! Hidden password input on the terminal.

use std::io::Write;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal::{self, ClearType},
};

use crate::BoxError;

const ATTEMPTS: usize = 3;

struct RawMode;

impl RawMode {
    fn enable() -> Result<Self, BoxError> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn say(out: &mut impl Write, line: &str) -> Result<(), BoxError> {
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(line)
    )?;
    out.flush()?;
    Ok(())
}

/// Reads one line without echoing it; each character shows as `*`.
fn read_secret(label: &str) -> Result<String, BoxError> {
    let _raw = RawMode::enable()?;
    let mut out = std::io::stderr();
    say(&mut out, label)?;

    let mut secret = String::new();
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        else {
            continue;
        };

        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        match code {
            KeyCode::Enter => break,
            KeyCode::Char('c') if ctrl => {
                say(&mut out, "\r\n")?;
                return Err("interrupted".into());
            }
            KeyCode::Backspace if secret.pop().is_some() => {
                execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
            }
            KeyCode::Char(ch) if !ctrl => {
                secret.push(ch);
                execute!(out, Print("*"))?;
            }
            _ => continue,
        }
        out.flush()?;
    }

    say(&mut out, "\r\n")?;
    Ok(secret)
}

/// Asks for a new password and its confirmation.
pub fn new_password() -> Result<String, BoxError> {
    let mut out = std::io::stderr();
    for _ in 0..ATTEMPTS {
        let password = read_secret("Password: ")?;
        if password.is_empty() {
            say(&mut out, "Password must not be empty.\r\n")?;
            continue;
        }
        if read_secret("Repeat password: ")? == password {
            return Ok(password);
        }
        say(&mut out, "Passwords differ, try again.\r\n")?;
    }

    Err("too many attempts".into())
}
