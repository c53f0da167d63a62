use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
};

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use serde::{Deserialize, Serialize};

pub static LOG: Mutex<Option<Arc<dyn Repository>>> = Mutex::new(None);

pub trait Repository: Send + Sync + 'static {
    fn read_entries(&self) -> Result<VecDeque<Entry>, Error>;
    fn write_entry(&self, entry: Entry) -> Result<(), Error>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    Unknown(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub time: String,
    #[serde(with = "LevelDef")]
    pub level: Level,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "Level")]
pub enum LevelDef {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Keeps the newest entries in memory.
#[derive(Debug)]
pub struct Memory {
    capacity: usize,
    entries: Mutex<VecDeque<Entry>>,
}

impl Memory {
    pub const CAPACITY: usize = 100;

    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(Self::CAPACITY)
    }
}

impl Repository for Memory {
    fn read_entries(&self) -> Result<VecDeque<Entry>, Error> {
        Ok(self
            .entries
            .lock()
            .map_err(|err| Error::Unknown(err.to_string()))?
            .clone())
    }

    fn write_entry(&self, entry: Entry) -> Result<(), Error> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|err| Error::Unknown(err.to_string()))?;
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
        Ok(())
    }
}

static LOGGER: Logger = Logger;

/// # Errors
///
/// Returns an error if the logger has already been initialized.
pub fn init(repository: Arc<dyn Repository>, level: LevelFilter) -> Result<(), SetLoggerError> {
    *LOG.lock().unwrap_or_else(PoisonError::into_inner) = Some(repository);
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());

        let repository = LOG
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(repository) = repository {
            let _ = repository.write_entry(entry(record));
        }
    }

    fn flush(&self) {}
}

fn entry(record: &Record) -> Entry {
    Entry {
        time: Local::now().format("%b %d %H:%M:%S").to_string(),
        level: record.level(),
        message: record.args().to_string(),
    }
}
