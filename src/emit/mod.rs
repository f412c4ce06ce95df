//! Building and rendering generated PHP source.
//!
//! Synthesizers assemble a [`PhpFile`] and call [`PhpFile::render`]; the
//! generator never parses its own output.

mod php;
mod writer;

pub use php::{DocBlock, PhpClass, PhpFile, PhpMethod};
pub use writer::CodeWriter;
