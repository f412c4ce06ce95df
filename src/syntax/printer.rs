//! Single-line rendering of expressions and statements.
//!
//! Used wherever parsed code is shown to a reader: example lines in doc
//! comments and the reference document, parameter defaults, imports. Method
//! bodies copied into generated classes keep their original lines instead
//! (see [`Stmt::lines`]).

use rustc_hash::FxHashSet;

use super::ast::{ArrayItem, Callee, Closure, ClosureBody, Expr, Param, Stmt, StmtKind};
use super::lexer::{Spanned, Token};

/// Keywords followed by a space before an opening parenthesis.
const SPACED_KEYWORDS: &[&str] = &[
    "function", "fn", "use", "if", "elseif", "foreach", "for", "while", "switch", "catch",
    "match", "return", "echo", "print", "and", "or", "xor", "as", "instanceof", "new", "case",
    "yield", "throw", "else", "do",
];

/// Renders a token run on one line with normalized spacing.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use curryforge::syntax::format_tokens;
/// use curryforge::syntax::lexer::tokenize;
///
/// let tokens = tokenize("$x+ -1 ?? max($a,[1,2] )", Path::new("inline.php")).unwrap();
/// assert_eq!(format_tokens(&tokens), "$x + -1 ?? max($a, [1, 2])");
/// ```
pub fn format_tokens(tokens: &[Spanned]) -> String {
    let mut output = String::new();
    let mut previous: Option<&Token> = None;
    let mut previous_unary = false;

    for spanned in tokens {
        let token = &spanned.token;
        if matches!(token, Token::DocComment(_)) {
            continue;
        }

        if let Some(previous) = previous
            && needs_space(previous, token, previous_unary)
        {
            output.push(' ');
        }
        output.push_str(&token.text());

        previous_unary = is_unary(previous, token);
        previous = Some(token);
    }

    output
}

fn is_operand(token: &Token) -> bool {
    match token {
        Token::Variable(_) | Token::Int(_) | Token::Float(_) | Token::Str(_) => true,
        Token::Name(word) => !SPACED_KEYWORDS.iter().any(|k| word.eq_ignore_ascii_case(k)),
        Token::Symbol(symbol) => matches!(symbol.as_str(), ")" | "]" | "}"),
        Token::DocComment(_) | Token::Attribute => false,
    }
}

fn is_unary(previous: Option<&Token>, token: &Token) -> bool {
    let prefix = token.is_symbol("-")
        || token.is_symbol("+")
        || token.is_symbol("&")
        || ((token.is_symbol("++") || token.is_symbol("--")) && !previous.is_some_and(is_operand));
    prefix && !previous.is_some_and(is_operand)
}

fn needs_space(previous: &Token, current: &Token, previous_unary: bool) -> bool {
    if previous_unary {
        return false;
    }

    if let Token::Symbol(symbol) = previous
        && matches!(
            symbol.as_str(),
            "(" | "[" | "->" | "?->" | "::" | "..." | "!" | "@" | "~"
        )
    {
        return false;
    }

    match current {
        Token::Symbol(symbol) => match symbol.as_str() {
            "," | ";" | ")" | "]" | "->" | "?->" | "::" => false,
            "++" | "--" => !is_operand(previous),
            "(" => !is_callable_head(previous),
            "[" => !matches!(previous, Token::Variable(_) | Token::Str(_))
                && !previous.is_symbol(")")
                && !previous.is_symbol("]"),
            _ => true,
        },
        _ => true,
    }
}

/// Tokens after which a name is a member or declaration, not a free call.
fn is_member_access(token: &Token) -> bool {
    token.is_symbol("::")
        || token.is_symbol("->")
        || token.is_symbol("?->")
        || token.is_keyword("function")
        || token.is_keyword("fn")
        || token.is_keyword("new")
}

fn is_callable_head(token: &Token) -> bool {
    match token {
        Token::Variable(_) => true,
        Token::Name(word) => !SPACED_KEYWORDS.iter().any(|k| word.eq_ignore_ascii_case(k)),
        Token::Symbol(symbol) => matches!(symbol.as_str(), ")" | "]"),
        _ => false,
    }
}

/// Renders a parameter list without the surrounding parentheses.
pub fn format_params<'p>(params: impl IntoIterator<Item = &'p Param>) -> String {
    params
        .into_iter()
        .map(Param::declaration)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prints expressions and statements on a single line.
///
/// With a qualifier, unqualified calls to known library functions are
/// rendered as static calls on the library alias.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use rustc_hash::FxHashSet;
/// use curryforge::syntax::{ExprPrinter, parse_file};
///
/// let file = parse_file(
///     "<?php class T { function f() { add(3,4); } }",
///     Path::new("inline.php"),
/// )
/// .unwrap();
/// let statement = &file.classes[0].methods[0].statements()[0];
///
/// let names: FxHashSet<String> = ["add".to_string()].into_iter().collect();
/// let printer = ExprPrinter::qualified("P", &names);
/// assert_eq!(printer.statement(statement), "P::add(3, 4);");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ExprPrinter<'a> {
    qualifier: Option<(&'a str, &'a FxHashSet<String>)>,
}

impl<'a> ExprPrinter<'a> {
    /// A printer that leaves calls as written.
    pub const fn plain() -> Self {
        Self { qualifier: None }
    }

    /// A printer qualifying calls to `names` with `alias::`.
    pub const fn qualified(alias: &'a str, names: &'a FxHashSet<String>) -> Self {
        Self {
            qualifier: Some((alias, names)),
        }
    }

    /// Renders an expression.
    pub fn expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Variable(name) => format!("${name}"),
            Expr::Assign { target, value } => format!("${target} = {}", self.expr(value)),
            Expr::Call { callee, args } => {
                format!("{}({})", self.callee(callee), self.args(args))
            }
            Expr::New { class, args } => format!("new {class}({})", self.args(args)),
            Expr::Closure(closure) => self.closure(closure),
            Expr::Array(items) => format!("[{}]", self.array_items(items)),
            Expr::Literal { source, .. } => source.clone(),
            Expr::Raw(tokens) => self.raw(tokens),
        }
    }

    /// Renders a statement, including its terminating `;`.
    pub fn statement(&self, statement: &Stmt) -> String {
        match &statement.kind {
            StmtKind::Return(Some(value)) => format!("return {};", self.expr(value)),
            StmtKind::Return(None) => "return;".to_string(),
            StmtKind::Expr(value) => format!("{};", self.expr(value)),
            StmtKind::Block => self.raw(&statement.tokens),
        }
    }

    /// Renders call arguments without the surrounding parentheses.
    pub fn args(&self, args: &[Expr]) -> String {
        args.iter()
            .map(|argument| self.expr(argument))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Prints unparsed tokens, qualifying every `name(` that calls a known
    /// library function, as in chained calls like `add(3)(4)`.
    fn raw(&self, tokens: &[Spanned]) -> String {
        let Some((alias, names)) = self.qualifier else {
            return format_tokens(tokens);
        };

        let mut qualified = Vec::with_capacity(tokens.len());
        for (index, spanned) in tokens.iter().enumerate() {
            let is_library_call = spanned
                .token
                .as_name()
                .is_some_and(|name| names.contains(name))
                && tokens.get(index + 1).is_some_and(|next| next.token.is_symbol("("))
                && !index
                    .checked_sub(1)
                    .and_then(|previous| tokens.get(previous))
                    .is_some_and(|previous| is_member_access(&previous.token));
            if is_library_call {
                let span = spanned.span.clone();
                qualified.push(Spanned {
                    token: Token::Name(alias.to_string()),
                    span: span.clone(),
                });
                qualified.push(Spanned {
                    token: Token::Symbol("::".to_string()),
                    span,
                });
            }
            qualified.push(spanned.clone());
        }

        format_tokens(&qualified)
    }

    fn callee(&self, callee: &Callee) -> String {
        match callee {
            Callee::Function(name) => match self.qualifier {
                Some((alias, names)) if names.contains(name) => format!("{alias}::{name}"),
                _ => name.clone(),
            },
            Callee::Static { class, method } => format!("{class}::{method}"),
            Callee::Method { receiver, method } => format!("${receiver}->{method}"),
        }
    }

    fn closure(&self, closure: &Closure) -> String {
        let prefix = if closure.is_static { "static " } else { "" };
        let return_type = closure
            .return_type
            .as_ref()
            .map(|ty| format!(": {ty}"))
            .unwrap_or_default();
        let params = format_params(&closure.params);

        match &closure.body {
            ClosureBody::Arrow(body) => {
                format!("{prefix}fn ({params}){return_type} => {}", self.expr(body))
            }
            ClosureBody::Block(statements) => {
                let uses = if closure.uses.is_empty() {
                    String::new()
                } else {
                    let names = closure
                        .uses
                        .iter()
                        .map(|entry| {
                            let by_ref = if entry.by_ref { "&" } else { "" };
                            format!("{by_ref}${}", entry.name)
                        })
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!(" use ({names})")
                };
                let body = if statements.is_empty() {
                    "{}".to_string()
                } else {
                    let inner = statements
                        .iter()
                        .map(|statement| self.statement(statement))
                        .collect::<Vec<_>>()
                        .join(" ");
                    format!("{{ {inner} }}")
                };
                format!("{prefix}function ({params}){uses}{return_type} {body}")
            }
        }
    }

    fn array_items(&self, items: &[ArrayItem]) -> String {
        items
            .iter()
            .map(|item| {
                let value = self.expr(&item.value);
                match (&item.key, item.spread) {
                    (_, true) => format!("...{value}"),
                    (Some(key), false) => format!("{} => {value}", self.expr(key)),
                    (None, false) => value,
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
