//! Checking whole scripts.

use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

use codespan_reporting::term::termcolor::WriteColor;
use log::{debug, error, info};

use crate::diag::Diagnostic;
use crate::error::CheckError;
use crate::parse::{parse_program, ParseRes, SyntaxError};
use crate::span::Source;
use crate::syn::Program;
use crate::tok::Lexer;
use crate::JsCheck;


/// Name under which standard input is reported.
pub const STDIN_NAME: &str = "<stdin>";

/// Lex and parse one script.
pub fn check_source(name: &str, text: &str) -> ParseRes<Program> {
    debug!("checking {name} ({} bytes)", text.len());
    let res = parse_program(Lexer::new(text));
    match &res {
        Ok(program) => info!("{name}: ok ({} top-level elements)", program.elements.len()),
        Err(e) => info!("{name}: {e}"),
    }
    res
}

/// Where a script comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    fn read(&self, stdin: &mut dyn Read) -> Result<Source, CheckError> {
        match self {
            Input::Stdin => {
                let mut text = String::new();
                stdin
                    .read_to_string(&mut text)
                    .map_err(|source| CheckError::Read {
                        path: STDIN_NAME.into(),
                        source,
                    })?;
                Ok(Source::new(STDIN_NAME, text))
            }
            Input::File(path) => {
                let text = fs::read_to_string(path).map_err(|source| CheckError::Read {
                    path: path.clone(),
                    source,
                })?;
                Ok(Source::new(path.display().to_string(), text))
            }
        }
    }
}

/// Streams a check run writes to.
pub struct Output<'a> {
    /// Success reports and outlines.
    pub out: &'a mut dyn Write,

    /// Diagnostics.
    pub err: &'a mut dyn WriteColor,
}

/// Check every script named in `opts`, or standard input if none are named.
///
/// Each script is checked independently. Returns the process exit status: 0 if every script
/// parsed, 2 if any could not be read or reported, 1 otherwise.
pub fn run(opts: &JsCheck, stdin: &mut dyn Read, output: Output) -> i32 {
    let inputs: Vec<Input> = if opts.scripts.is_empty() {
        vec![Input::Stdin]
    } else {
        opts.scripts.iter().cloned().map(Input::File).collect()
    };

    let mut status = 0;
    for input in &inputs {
        if let Err(e) = check_input(opts, input, stdin, output.out, output.err) {
            if !matches!(e, CheckError::Syntax { .. }) {
                error!("{e}");
                if let Err(write_err) = writeln!(output.err, "error: {e}") {
                    debug!("cannot report error to stderr: {write_err}");
                }
            }
            status = status.max(e.exit_code());
        }
    }
    status
}

fn check_input(
    opts: &JsCheck,
    input: &Input,
    stdin: &mut dyn Read,
    out: &mut dyn Write,
    err: &mut dyn WriteColor,
) -> Result<(), CheckError> {
    let source = input.read(stdin)?;
    let program = match check_source(source.name(), source.content()) {
        Ok(program) => program,
        Err(error) => {
            report(&error, &source, err)?;
            return Err(CheckError::Syntax {
                name: source.name().to_string(),
                error,
            });
        }
    };

    if !opts.quiet {
        writeln!(out, "{}: ok", source.name())?;
    }
    if opts.outline {
        write!(out, "{program}")?;
    }
    Ok(())
}

/// Write a syntax error to `err` as a diagnostic with a source snippet.
fn report(
    error: &SyntaxError,
    source: &Source,
    err: &mut dyn WriteColor,
) -> Result<(), CheckError> {
    let diag = error.clone().into_diag();
    if let Err(e) = diag.emit_to(err, source) {
        debug!("falling back to a plain report for {}: {e}", source.name());
        writeln!(err, "{}: {error}", source.name())?;
    }
    Ok(())
}
