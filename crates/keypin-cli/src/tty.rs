//! Access to the controlling terminal.
//!
//! stdin and stdout belong to the protocol, so all interaction goes through
//! the terminal device itself.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};

/// Controlling terminal device.
pub const TTY_PATH: &str = "/dev/tty";

/// What the prompts need from a terminal.
pub trait Terminal: Send {
    /// Write one line of text.
    fn write_line(&mut self, text: &str) -> io::Result<()>;

    /// Show `prompt` and read a line without echo.
    fn read_secret(&mut self, prompt: &str) -> io::Result<String>;

    /// Show `prompt` and read a visible line, without its terminator.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;
}

/// The real terminal behind [`TTY_PATH`].
///
/// Reads are unbuffered so input typed ahead is left for the hidden read.
pub struct DevTty {
    tty: File,
}

impl DevTty {
    /// Open the controlling terminal for reading and writing.
    pub fn open() -> io::Result<Self> {
        let tty = OpenOptions::new().read(true).write(true).open(TTY_PATH)?;
        Ok(Self { tty })
    }

    fn show_prompt(&mut self, prompt: &str) -> io::Result<()> {
        write!(self.tty, "{prompt}")?;
        self.tty.flush()
    }
}

impl Terminal for DevTty {
    fn write_line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.tty, "{text}")?;
        self.tty.flush()
    }

    fn read_secret(&mut self, prompt: &str) -> io::Result<String> {
        self.show_prompt(prompt)?;
        rpassword::read_password()
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.show_prompt(prompt)?;
        read_line_from(&mut self.tty)
    }
}

/// Read one line without its terminator, consuming nothing past the `\n`.
fn read_line_from(reader: &mut impl Read) -> io::Result<String> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        if reader.read(&mut byte)? == 0 {
            if line.is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "terminal closed",
                ));
            }
            break;
        }
        if byte[0] == b'\n' {
            break;
        }
        line.push(byte[0]);
    }
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Ok(String::from_utf8_lossy(&line).into_owned())
}
