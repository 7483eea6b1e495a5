use chrono::{DateTime, Utc};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is {size} bytes, larger than the {limit} byte limit", path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid TCX: {0}")]
    InvalidTcx(String),
    #[error("Unexpected root element <{0}>, expected <TrainingCenterDatabase>")]
    UnexpectedRoot(String),
    #[error("No activity found in file")]
    MissingActivity,
    #[error("Missing {0}")]
    MissingField(&'static str),
    #[error("Invalid timestamp in {field}: {value:?}")]
    InvalidTime { field: &'static str, value: String },
    #[error("Invalid number in {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Master,
    HeartRate,
}

impl std::fmt::Display for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stream::Master => f.write_str("master"),
            Stream::HeartRate => f.write_str("heart-rate"),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MergeError {
    #[error("Master activity has no trackpoints")]
    EmptyMaster,
    #[error("Master activity has no laps")]
    NoLaps,
    #[error("Heart-rate data starts at {secondary}, before the master activity starts at {master}")]
    SecondaryBeforeMaster {
        secondary: DateTime<Utc>,
        master: DateTime<Utc>,
    },
    #[error("{stream} trackpoints are not in chronological order ({next} follows {previous})")]
    OutOfOrder {
        stream: Stream,
        previous: DateTime<Utc>,
        next: DateTime<Utc>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("XML writing failed: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error("{}: {source}", file.display())]
    Parse {
        file: PathBuf,
        #[source]
        source: ParseError,
    },
    #[error(transparent)]
    Merge(#[from] MergeError),
    #[error(transparent)]
    Serialization(#[from] SerializationError),
}
