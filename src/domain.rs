use derive_setters::Setters;
use polars::error::PolarsError;
use std::fmt;
use std::io::Error;

use crate::header::SystemHeader;

#[derive(Debug)]
pub enum JmsvError {
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
    UnknownHeader(String),
}

impl fmt::Display for JmsvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JmsvError::IoError(e) => write!(f, "io error: {e}"),
            JmsvError::PolarsError(e) => write!(f, "could not read message dump: {e}"),
            JmsvError::LoadingFailed(reason) => write!(f, "loading failed: {reason}"),
            JmsvError::FileNotFound => write!(f, "file not found"),
            JmsvError::PermissionDenied => write!(f, "permission denied"),
            JmsvError::UnknownFileType => write!(f, "unknown file type"),
            JmsvError::UnknownHeader(name) => write!(f, "unknown JMS system header '{name}'"),
        }
    }
}

impl std::error::Error for JmsvError {}

impl From<Error> for JmsvError {
    fn from(err: Error) -> Self {
        JmsvError::IoError(err)
    }
}

impl From<PolarsError> for JmsvError {
    fn from(err: PolarsError) -> Self {
        JmsvError::PolarsError(err)
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct Config {
    pub event_poll_time: u64,
    pub columns: Vec<SystemHeader>,
    pub long_format: bool,
    pub max_rows: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            columns: SystemHeader::ALL.to_vec(),
            long_format: false,
            max_rows: None,
        }
    }
}

/// Things the user can ask the browser to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    ToggleLongFormat,
    Selector,
    Resize(usize, usize),
}

pub const HELP_TEXT: &str =
    " Quit <q> | Move <hjkl/arrows> | Page <PgUp/PgDn> | Top/Bottom <g/G> | Long format <t> | Selector <s> ";
