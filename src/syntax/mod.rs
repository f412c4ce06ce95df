//! Reading PHP source.
//!
//! - [`lexer`]: tokens with byte spans (`logos`)
//! - [`ast`]: classes, methods, parameters, statements and shallow expressions
//! - [`parser`]: tokens to [`ast::SourceFile`]
//! - [`printer`]: single-line rendering with normalized spacing

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod printer;

pub use ast::{
    ArrayItem, Callee, ClassDecl, ClassKind, Closure, ClosureBody, ClosureUse, Expr, Literal,
    MethodDecl, Param, ParamList, SourceFile, Stmt, StmtKind,
};
pub use parser::parse_file;
pub use printer::{ExprPrinter, format_params, format_tokens};
