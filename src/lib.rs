//! # curryforge
//!
//! Code generator for a curried functional-programming library written in
//! PHP. A template class of plain ("inner") static functions is turned into:
//!
//! - the public API class, one auto-curried static method per function,
//!   with examples added to each doc comment;
//! - a PHPUnit test class checking direct calls and every curry split;
//! - a PHPUnit test class checking collection functions against collection
//!   fixtures;
//! - a reStructuredText reference document.
//!
//! ## Pipeline
//!
//! ```text
//! template.php ──► syntax ──► model::FunctionCollection ──┬─► synth::curried ──────────► P.php
//! examples.php ──► syntax ──► example::ExampleExtractor ──┼─► synth::basic_test ───────► BasicTest.php
//! providers.php ─► syntax ─────────────────────────────────┼─► synth::collection_test ─► CollectionTest.php
//!                                                         └─► synth::doc_list ─────────► functions.rst
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use curryforge::Generator;
//!
//! let generator = Generator::from_config_file(Path::new("curryforge.yaml"))?;
//! let output = generator.config().output.directory.clone();
//! for path in generator.generate(&output)? {
//!     println!("wrote {}", path.display());
//! }
//! # Ok::<(), curryforge::GeneratorError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod config;
pub mod emit;
pub mod error;
pub mod example;
pub mod generate;
pub mod model;
pub mod synth;
pub mod syntax;

pub use config::Config;
pub use error::{GeneratorError, Result};
pub use generate::{Artifact, CheckReport, FunctionSummary, Generator};
