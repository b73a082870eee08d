//! Errors from checking scripts.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::parse::SyntaxError;

/// Why a script failed to check.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{name}: {error}")]
    Syntax {
        name: String,
        #[source]
        error: SyntaxError,
    },

    #[error("cannot write output: {0}")]
    Write(#[from] io::Error),
}

impl CheckError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CheckError::Syntax { .. } => 1,
            CheckError::Read { .. } | CheckError::Write(_) => 2,
        }
    }
}
