use std::borrow::Cow;
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::{info, warn};

use crate::ring_buffer::{RingBuffer, RingBufferError};
use crate::storage::Storage;

pub const HELP: &str = "/p \t-> \tPrints the current state
/df \t-> \tDrops the first element
/dl \t-> \tDrops the last element
/gf \t-> \tPrints the first element
/gl \t-> \tPrints the last element
/c \t-> \tClears all entries
/r N \t-> \tResizes the buffer to hold N elements
/rm X \t-> \tRemoves every X
/h \t-> \tOpens this view
/q, /Q \t-> \tExits the terminal
To append a new element, just type it in and confirm with enter.";

const GREETING: &str = "Note: Currently this terminal only supports certain commands.
Type in /h to get a list of supported commands.
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Print,
    DropFirst,
    DropLast,
    GetFirst,
    GetLast,
    Clear,
    Resize(usize),
    Remove(String),
    Help,
    Quit,
    Append(String),
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("`{0}` is not a valid capacity")]
    InvalidCapacity(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error(transparent)]
    Buffer(#[from] RingBufferError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

impl Command {
    /// Parses one input line. Commands are matched on the trimmed line,
    /// anything else is appended as typed, without its line terminator.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        let command = match line.trim() {
            "/p" => Command::Print,
            "/df" => Command::DropFirst,
            "/dl" => Command::DropLast,
            "/gf" => Command::GetFirst,
            "/gl" => Command::GetLast,
            "/c" => Command::Clear,
            "/h" => Command::Help,
            "/q" | "/Q" => Command::Quit,
            "/r" => return Err(CommandError::MissingArgument("/r")),
            "/rm" => return Err(CommandError::MissingArgument("/rm")),
            trimmed => {
                if let Some(arg) = trimmed.strip_prefix("/r ") {
                    let arg = arg.trim();
                    let capacity = arg
                        .parse()
                        .map_err(|_| CommandError::InvalidCapacity(arg.to_string()))?;
                    Command::Resize(capacity)
                } else if let Some(arg) = trimmed.strip_prefix("/rm ") {
                    Command::Remove(arg.trim().to_string())
                } else {
                    Command::Append(line.to_string())
                }
            }
        };

        Ok(command)
    }
}

/// Asks for the buffer capacity on `out` and reads one line of `input`.
/// Falls back to `default` on an empty line, `/h`, end of input or an invalid number.
pub fn read_capacity<R, W>(input: &mut R, out: &mut W, default: usize) -> io::Result<usize>
where
    R: BufRead,
    W: Write,
{
    writeln!(out, "{GREETING}")?;
    writeln!(out, "Please enter the size of the ring buffer.")?;
    out.flush()?;

    let Some(line) = read_line_lossy(input, &mut Vec::new())? else {
        return Ok(default);
    };

    let capacity = match line.trim() {
        "" => default,
        "/h" => {
            writeln!(out, "{HELP}")?;
            default
        }
        value => match value.parse::<usize>() {
            Ok(capacity) if capacity > 0 => capacity,
            _ => {
                warn!(value, default, "invalid capacity");
                writeln!(out, "`{value}` is not a valid capacity, using {default}")?;
                default
            }
        },
    };

    info!(capacity, "capacity selected");
    Ok(capacity)
}

/// Interactive session over a `RingBuffer<String, S>`
pub struct Session<S: Storage<String>> {
    buffer: RingBuffer<String, S>,
    capacity: usize,
}

impl<S: Storage<String>> Session<S> {
    pub fn new(capacity: usize) -> Result<Self, RingBufferError> {
        Ok(Self {
            buffer: RingBuffer::with_capacity(capacity)?,
            capacity,
        })
    }

    pub fn buffer(&self) -> &RingBuffer<String, S> {
        &self.buffer
    }

    /// Reads commands until `/q` or end of input. Buffer errors are reported
    /// on `out` and do not end the session.
    pub fn run<R, W>(&mut self, mut input: R, out: &mut W) -> io::Result<()>
    where
        R: BufRead,
        W: Write,
    {
        let mut buf = Vec::new();
        while let Some(line) = read_line_lossy(&mut input, &mut buf)? {
            let flow = match Command::parse(&line) {
                Ok(command) => self.execute(command, out)?,
                Err(err) => {
                    report(err, out)?;
                    Flow::Continue
                }
            };

            if flow == Flow::Quit {
                break;
            }
        }

        writeln!(out, "Exiting...")?;
        out.flush()
    }

    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<Flow> {
        match self.apply(command, out) {
            Ok(flow) => Ok(flow),
            Err(err) => {
                report(err, out)?;
                Ok(Flow::Continue)
            }
        }
    }

    fn apply<W: Write>(&mut self, command: Command, out: &mut W) -> Result<Flow, CommandError> {
        match command {
            Command::Print => writeln!(out, "{}", self.buffer)?,
            Command::DropFirst => self.buffer.drop_first()?,
            Command::DropLast => self.buffer.drop_last()?,
            Command::GetFirst => writeln!(out, "{}", self.buffer.first()?)?,
            Command::GetLast => writeln!(out, "{}", self.buffer.last()?)?,
            Command::Clear => self.buffer.reset_with_capacity(self.capacity)?,
            Command::Resize(capacity) => self.buffer.resize(capacity)?,
            Command::Remove(value) => {
                let removed = self.buffer.remove_entry(&value, true);
                writeln!(out, "Removed {removed} element(s)")?;
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
            Command::Append(value) => self.buffer.append(value),
        }

        Ok(Flow::Continue)
    }
}

/// Reads one line including its terminator, replacing invalid UTF-8
/// with U+FFFD. Returns `None` at end of input.
fn read_line_lossy<R>(input: &mut R, buf: &mut Vec<u8>) -> io::Result<Option<String>>
where
    R: BufRead,
{
    buf.clear();
    if input.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }

    let line = match String::from_utf8_lossy(buf) {
        Cow::Borrowed(line) => line.to_string(),
        Cow::Owned(line) => {
            warn!(%line, "input line is not valid UTF-8");
            line
        }
    };

    Ok(Some(line))
}

fn report<W: Write>(err: CommandError, out: &mut W) -> io::Result<()> {
    match err {
        CommandError::Io(err) => Err(err),
        err => {
            warn!(%err, "command failed");
            writeln!(out, "Error: {err}")
        }
    }
}
