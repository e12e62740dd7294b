use std::{
    env,
    fmt::{self, Display},
    str::FromStr,
    sync::OnceLock,
};

use anyhow::{anyhow, bail, Context, Result};
use ringbuf::ring_buffer::DEFAULT_CAPACITY;
use tracing::info;

const CAPACITY_VAR: &str = "RINGBUF_CAPACITY";
const BACKEND_VAR: &str = "RINGBUF_BACKEND";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Backend {
    Array,
    Hash,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "array" => Ok(Backend::Array),
            "hash" => Ok(Backend::Hash),
            other => Err(anyhow!("unknown backend `{other}`, expected `array` or `hash`")),
        }
    }
}

impl Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Array => f.write_str("array"),
            Backend::Hash => f.write_str("hash"),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Config {
    capacity: usize,
    backend: Backend,
}

pub(crate) fn get() -> Result<&'static Config> {
    static CELL: OnceLock<Config> = OnceLock::new();

    if let Some(config) = CELL.get() {
        return Ok(config);
    }

    let config = Config::from_lookup(|key| env::var(key).ok())?;
    info!(
        capacity = config.capacity,
        backend = %config.backend,
        "initialized config"
    );

    Ok(CELL.get_or_init(|| config))
}

impl Config {
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let capacity = match lookup(CAPACITY_VAR) {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .with_context(|| format!("{CAPACITY_VAR} must be a number, got `{value}`"))?,
            None => DEFAULT_CAPACITY,
        };
        if capacity == 0 {
            bail!("{CAPACITY_VAR} must be greater than zero");
        }

        let backend = match lookup(BACKEND_VAR) {
            Some(value) => value
                .parse::<Backend>()
                .with_context(|| format!("invalid {BACKEND_VAR}"))?,
            None => Backend::Array,
        };

        Ok(Self { capacity, backend })
    }

    pub(crate) fn capacity(&'static self) -> usize {
        self.capacity
    }

    pub(crate) fn backend(&'static self) -> Backend {
        self.backend
    }
}
