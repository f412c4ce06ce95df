//! What the generator knows about each template function.
//!
//! A [`FunctionCollection`] is built once from the template class and then
//! only read; the one piece of lazily computed state, the inner parameters
//! of each function, lives in a per-function `OnceCell`.

mod call_shape;
mod collection;
mod doc_comment;
mod function;

pub use call_shape::CallShape;
pub use collection::{Combinators, FunctionCollection};
pub use doc_comment::{DocComment, ParamTag, ReturnTag};
pub use function::{COLLECTION_ARGUMENT_NAMES, FunctionModel, PRECOLLECTED_ARGUMENTS, Signature};
