use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use ringbuf::storage::{ArrayStorage, HashStorage, Storage};
use ringbuf::terminal::{self, Session};
use tracing::info;

use crate::config::Backend;

mod config;
mod telemetry;

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    telemetry::init()?;
    let config = config::get()?;

    let mut input = io::stdin().lock();
    let mut out = io::stdout().lock();

    let capacity = terminal::read_capacity(&mut input, &mut out, config.capacity())
        .context("failed to read ring buffer capacity")?;

    match config.backend() {
        Backend::Array => run::<ArrayStorage<String>, _, _>(capacity, input, out),
        Backend::Hash => run::<HashStorage<String>, _, _>(capacity, input, out),
    }
}

fn run<S, R, W>(capacity: usize, input: R, mut out: W) -> Result<()>
where
    S: Storage<String>,
    R: BufRead,
    W: Write,
{
    let mut session = Session::<S>::new(capacity).context("failed to create ring buffer")?;
    info!(capacity, "session started");

    session.run(input, &mut out).context("terminal session failed")?;

    info!(remaining = session.buffer().len(), "session finished");
    Ok(())
}
