//! Source text and byte spans within it.

use std::fmt::{self, Display, Formatter};
use std::ops::Range;


/// A contiguous range of bytes in a [`Source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    byte_offset: usize,
    len: usize,
}

impl Span {
    pub const fn new(byte_offset: usize, len: usize) -> Self {
        Self { byte_offset, len }
    }

    /// A zero-length span at the given offset.
    pub const fn empty(byte_offset: usize) -> Self {
        Self::new(byte_offset, 0)
    }

    pub const fn end(&self) -> usize {
        self.byte_offset + self.len
    }

    pub const fn range(&self) -> Range<usize> {
        self.byte_offset..self.end()
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end.saturating_sub(range.start))
    }
}

/// A value tagged with the span it was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T: Display> Display for Spanned<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(&self.node, f)
    }
}

pub trait Spannable: Sized {
    fn spanned(self, span: Span) -> Spanned<Self> {
        Spanned { node: self, span }
    }
}

impl<T: Sized> Spannable for T {}

/// A named piece of source text, as diagnostics are rendered against it.
#[derive(Debug, Clone)]
pub struct Source {
    name: String,
    content: String,
}

impl Source {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}
