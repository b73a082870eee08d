//! Errors and diagnostics.
//!
//! Errors implement [`Diagnostic`] to describe themselves as a [`Diag`], which can then be rendered
//! against the [`Source`] it refers to.

use codespan_reporting::diagnostic::{Diagnostic as Report, Label};
use codespan_reporting::files::{self, SimpleFile};
use codespan_reporting::term::termcolor::{NoColor, WriteColor};
use codespan_reporting::term::{self, Config};

use crate::span::{Source, Span};

pub trait Diagnostic {
    fn into_diag(self) -> Diag;
}

/// An error report: a message, a labeled primary span, and optional secondary labels and notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    message: String,
    primary: DiagLabel,
    secondary: Vec<DiagLabel>,
    notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagLabel {
    pub span: Span,
    pub label: String,
}

impl DiagLabel {
    pub fn new(span: Span, label: impl Into<String>) -> Self {
        Self {
            span,
            label: label.into(),
        }
    }
}

impl Diag {
    pub fn new(
        message: impl Into<String>,
        primary_span: Span,
        primary_label: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            primary: DiagLabel::new(primary_span, primary_label),
            secondary: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_secondary(mut self, span: Span, label: impl Into<String>) -> Self {
        self.secondary.push(DiagLabel::new(span, label));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn primary(&self) -> &DiagLabel {
        &self.primary
    }

    pub fn secondary(&self) -> &[DiagLabel] {
        &self.secondary
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    fn report(&self) -> Report<()> {
        let primary = Label::primary((), self.primary.span.range()).with_message(&self.primary.label);
        let labels = std::iter::once(primary)
            .chain(
                self.secondary
                    .iter()
                    .map(|l| Label::secondary((), l.span.range()).with_message(&l.label)),
            )
            .collect();

        Report::error()
            .with_message(&self.message)
            .with_labels(labels)
            .with_notes(self.notes.clone())
    }

    /// Write this diagnostic, with source snippets, to the given stream.
    pub fn emit_to(&self, writer: &mut dyn WriteColor, source: &Source) -> Result<(), files::Error> {
        let file = SimpleFile::new(source.name(), source.content());
        term::emit(writer, &Config::default(), &file, &self.report())
    }

    /// Render this diagnostic as plain text.
    ///
    /// Falls back to a one-line message if the diagnostic's spans do not fit the source.
    pub fn render(&self, source: &Source) -> String {
        let mut buffer = NoColor::new(Vec::new());
        match self.emit_to(&mut buffer, source) {
            Ok(()) => String::from_utf8_lossy(&buffer.into_inner()).into_owned(),
            Err(e) => {
                log::warn!("failed to render diagnostic against {}: {e}", source.name());
                format!("error: {}\n", self.message)
            }
        }
    }
}
