//! A syntax checker for a JavaScript-like language.

use std::path::PathBuf;

use log::LevelFilter;
use structopt::StructOpt;

pub mod check;
pub mod diag;
pub mod error;
pub mod logger;
pub mod parse;
pub mod span;
pub mod syn;
pub mod tok;
pub mod util;

pub use check::check_source;
pub use error::CheckError;
pub use parse::{parse_program, Parser, SyntaxError};

/// Check JavaScript-like scripts for syntax errors
#[derive(Debug, StructOpt)]
#[structopt(name = "jscheck")]
pub struct JsCheck {
    /// script files to check; standard input is checked if none are given
    #[structopt(parse(from_os_str))]
    pub scripts: Vec<PathBuf>,

    /// log level (off, error, warn, info, debug or trace)
    #[structopt(long, default_value = "warn")]
    pub log_level: LevelFilter,

    /// print the statement outline of each script that parses
    #[structopt(long)]
    pub outline: bool,

    /// only report scripts with errors
    #[structopt(short, long)]
    pub quiet: bool,
}
