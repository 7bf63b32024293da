use std::env;
use std::path::PathBuf;
use std::time::Duration as StdDuration;

use chrono::Duration;

use crate::error::{Error, Result};

const ADDR_VAR: &str = "REQUEST_WINDOW_ADDR";
const RETENTION_VAR: &str = "REQUEST_WINDOW_RETENTION_SECS";
const STATE_FILE_VAR: &str = "REQUEST_WINDOW_STATE_FILE";

const DEFAULT_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_RETENTION_SECS: u64 = 60;
const DEFAULT_STATE_FILE: &str = "requestTimestamps.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub retention: Duration,
    pub state_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr = lookup(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_string());

        let retention_secs = match lookup(RETENTION_VAR) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                Error::Config(format!("{} must be a whole number of seconds: {}", RETENTION_VAR, e))
            })?,
            None => DEFAULT_RETENTION_SECS,
        };
        if retention_secs == 0 {
            return Err(Error::Config(format!("{} must be greater than zero", RETENTION_VAR)));
        }
        let retention = Duration::from_std(StdDuration::from_secs(retention_secs))
            .map_err(|_| Error::Config(format!("{} is out of range", RETENTION_VAR)))?;

        let state_file = lookup(STATE_FILE_VAR).unwrap_or_else(|| DEFAULT_STATE_FILE.to_string());
        if state_file.trim().is_empty() {
            return Err(Error::Config(format!("{} must not be empty", STATE_FILE_VAR)));
        }

        Ok(Config {
            listen_addr,
            retention,
            state_file: PathBuf::from(state_file),
        })
    }
}
