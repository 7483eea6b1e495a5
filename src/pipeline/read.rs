use std::path::Path;

use crate::config::Config;
use crate::error::{AppError, ReadError};
use crate::pipeline::parse;
use crate::types::activity::Document;

/// Reads an input file, refusing anything above the configured size limit.
pub fn read_input(path: &Path, config: &Config) -> Result<Vec<u8>, ReadError> {
    let io_error = |source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    };

    let size = std::fs::metadata(path).map_err(io_error)?.len();
    if size > config.max_file_size {
        return Err(ReadError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit: config.max_file_size,
        });
    }

    let bytes = std::fs::read(path).map_err(io_error)?;
    tracing::info!("Read {} ({} bytes)", path.display(), bytes.len());
    Ok(bytes)
}

/// Reads and parses one document; parse failures name the file.
pub fn load(path: &Path, config: &Config) -> Result<Document, AppError> {
    let bytes = read_input(path, config)?;
    parse::parse(&bytes).map_err(|source| AppError::Parse {
        file: path.to_path_buf(),
        source,
    })
}
