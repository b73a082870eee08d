//! Assorted utility functions.

use std::fmt::{self, Display, Formatter};

/// Wrapper struct that `Display`s as a prose list, with the given joiner (usually a conjunction)
/// and appropriate Oxford comma placement.
pub struct Oxford<'a, D> {
    pub list: &'a [D],
    pub join: &'static str,
}

impl<D: Display> Display for Oxford<'_, D> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.list {
            [] => Ok(()),
            [only] => write!(f, "{only}"),
            [first, second] => write!(f, "{first} {} {second}", self.join),
            [init @ .., last] => {
                for item in init {
                    write!(f, "{item}, ")?;
                }
                write!(f, "{} {last}", self.join)
            }
        }
    }
}

/// Renders an Oxford comma list with "or".
pub fn oxford_or<D>(list: &[D]) -> Oxford<'_, D> {
    Oxford { list, join: "or" }
}
