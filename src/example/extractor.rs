//! Example lines shown in doc comments and in the reference document.

use rustc_hash::FxHashSet;

use super::value::{Evaluator, Value};
use crate::error::Result;
use crate::model::{FunctionCollection, FunctionModel};
use crate::syntax::{Callee, ClassDecl, Expr, ExprPrinter, Stmt, StmtKind, lexer::Token};

/// Basic examples show at most this many provider rows.
pub const MAX_BASIC_ROWS: usize = 3;

/// Extracts example lines for template functions.
///
/// Custom examples come from `test<Name>` in the example-test class. When a
/// function has none, basic examples are rendered from the first rows of
/// `get<Name>Data` in the provider class.
#[derive(Debug)]
pub struct ExampleExtractor<'a> {
    functions: &'a FunctionCollection,
    examples: &'a ClassDecl,
    providers: Option<&'a ClassDecl>,
    alias: &'a str,
    names: FxHashSet<String>,
}

impl<'a> ExampleExtractor<'a> {
    /// Creates an extractor qualifying library calls with `alias`.
    pub fn new(
        functions: &'a FunctionCollection,
        examples: &'a ClassDecl,
        providers: Option<&'a ClassDecl>,
        alias: &'a str,
    ) -> Self {
        Self {
            functions,
            examples,
            providers,
            alias,
            names: functions.names(),
        }
    }

    /// Document-ready example lines; empty when the function has none.
    ///
    /// # Errors
    ///
    /// Propagates inner parameter resolution errors of functions whose basic
    /// examples need their call shape.
    pub fn rows(&self, function: &FunctionModel) -> Result<Vec<String>> {
        let custom = self.custom_rows(function);
        if !custom.is_empty() {
            return Ok(custom);
        }
        self.basic_rows(function)
    }

    /// Lines derived from the example-test method `test<Name>`.
    ///
    /// `assertSame(expected, actual)` becomes `actual; // => expected`;
    /// other statements are kept. An assertion on a variable assigned by the
    /// previous statement, and not used afterwards, absorbs the assignment.
    pub fn custom_rows(&self, function: &FunctionModel) -> Vec<String> {
        let method_name = format!("test{}", function.capitalized_name());
        let Some(method) = self.examples.method(&method_name) else {
            return Vec::new();
        };

        let printer = ExprPrinter::qualified(self.alias, &self.names);
        let statements = method.statements();
        let mut lines: Vec<String> = Vec::with_capacity(statements.len());

        for (position, statement) in statements.iter().enumerate() {
            let Some((expected, actual)) = assertion(statement) else {
                lines.push(printer.statement(statement));
                continue;
            };

            let folded = match actual {
                Expr::Variable(name) if position > 0 => {
                    folded_assignment(&statements[position - 1], name)
                        .filter(|_| !used_after(&statements[position + 1..], name))
                }
                _ => None,
            };
            let actual = match folded {
                Some(value) => {
                    lines.pop();
                    value
                }
                None => actual,
            };

            lines.push(format!(
                "{}; // => {}",
                printer.expr(actual),
                printer.expr(expected)
            ));
        }

        lines
    }

    /// Up to [`MAX_BASIC_ROWS`] lines rendered from provider data.
    ///
    /// # Errors
    ///
    /// Propagates inner parameter resolution errors.
    pub fn basic_rows(&self, function: &FunctionModel) -> Result<Vec<String>> {
        let Some(provider) = self
            .providers
            .and_then(|class| class.method(&format!("get{}Data", function.capitalized_name())))
        else {
            return Ok(Vec::new());
        };
        let Some(data) = Evaluator::new().run(provider.statements()) else {
            return Ok(Vec::new());
        };
        let Value::Array(rows) = data else {
            return Ok(Vec::new());
        };

        let shape = self.functions.call_shape(function)?;
        let variadic_tail = shape
            .own
            .last()
            .is_some_and(|param| param.variadic && !shape.variadic_as_array);

        let lines = rows
            .iter()
            .filter_map(|(_, row)| {
                let values = row.as_list()?;
                let (expected, arguments) = values.split_first()?;
                if !expected.is_printable() || !arguments.iter().all(|value| value.is_printable()) {
                    return None;
                }

                let split = if variadic_tail {
                    arguments.len()
                } else {
                    shape.own.len().min(arguments.len())
                };
                let (own_values, inner_values) = arguments.split_at(split);

                let mut own: Vec<String> = own_values.iter().map(ToString::to_string).collect();
                if shape.variadic_as_array
                    && own_values.len() == shape.own.len()
                    && let Some(spread) = own_values.last().and_then(|value| value.as_list())
                {
                    own.pop();
                    own.extend(spread.iter().map(ToString::to_string));
                }

                let mut call = format!("{}::{}({})", self.alias, function.name(), own.join(", "));
                if function.returns_callable() {
                    let inner: Vec<String> =
                        inner_values.iter().map(ToString::to_string).collect();
                    call.push_str(&format!("({})", inner.join(", ")));
                }
                Some(format!("{call}; // => {expected}"))
            })
            .take(MAX_BASIC_ROWS)
            .collect();

        Ok(lines)
    }
}

/// `assertSame(expected, actual)` with a bare, `$this->`, `self::` or
/// `static::` receiver.
fn assertion(statement: &Stmt) -> Option<(&Expr, &Expr)> {
    let StmtKind::Expr(Expr::Call { callee, args }) = &statement.kind else {
        return None;
    };
    let receiver_ok = match callee {
        Callee::Function(_) => true,
        Callee::Method { receiver, .. } => receiver == "this",
        Callee::Static { class, .. } => {
            class.eq_ignore_ascii_case("self") || class.eq_ignore_ascii_case("static")
        }
    };
    match args.as_slice() {
        [expected, actual] if receiver_ok && callee.name() == "assertSame" => {
            Some((expected, actual))
        }
        _ => None,
    }
}

fn folded_assignment<'s>(statement: &'s Stmt, variable: &str) -> Option<&'s Expr> {
    match &statement.kind {
        StmtKind::Expr(Expr::Assign { target, value }) if target == variable => Some(value.as_ref()),
        _ => None,
    }
}

fn used_after(statements: &[Stmt], variable: &str) -> bool {
    statements.iter().any(|statement| {
        statement
            .tokens
            .iter()
            .any(|spanned| matches!(&spanned.token, Token::Variable(name) if name == variable))
    })
}
