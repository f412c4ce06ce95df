//! Example extraction: custom examples from the example-test class, basic
//! examples from provider data.

mod extractor;
mod value;

pub use extractor::{ExampleExtractor, MAX_BASIC_ROWS};
pub use value::{Evaluator, Key, Value};
