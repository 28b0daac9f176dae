#![deny(clippy::all, clippy::pedantic)]

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::client::CliError;

/// The `name=value` session cookie, kept on disk between invocations.
#[derive(Clone, Debug)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Option<String>, CliError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let cookie = raw.trim();
                Ok((!cookie.is_empty()).then(|| cookie.to_string()))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(CliError::Session(err)),
        }
    }

    pub fn save(&self, cookie: &str) -> Result<(), CliError> {
        fs::write(&self.path, format!("{cookie}\n")).map_err(CliError::Session)
    }

    pub fn clear(&self) -> Result<(), CliError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(CliError::Session(err)),
        }
    }
}
