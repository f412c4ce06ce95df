//! Recursive-descent parser from tokens to the shallow syntax tree.
//!
//! Declarations (classes, methods, parameters) are parsed strictly and a
//! malformed declaration is a [`GeneratorError::Parse`]. Statements and
//! expressions are recognized by shape: a token run that matches none of
//! the known shapes becomes [`Expr::Raw`] or [`StmtKind::Block`] instead of
//! an error, since the generator copies such code verbatim.

use std::path::Path;

use super::ast::{
    ArrayItem, Callee, ClassDecl, ClassKind, Closure, ClosureBody, ClosureUse, Expr, Literal,
    MethodDecl, Param, ParamList, SourceFile, Stmt, StmtKind,
};
use super::lexer::{Spanned, Token, tokenize};
use super::printer::format_tokens;
use crate::error::{GeneratorError, Result};

/// Keywords that open a statement ending at its closing brace.
const BLOCK_KEYWORDS: &[&str] = &["if", "foreach", "for", "while", "switch", "try"];

/// Keywords that continue a block statement after its closing brace.
const CONTINUATION_KEYWORDS: &[&str] = &["else", "elseif", "catch", "finally"];

/// Keywords whose statements are never parsed as expressions.
const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "foreach", "for", "while", "do", "switch", "try", "throw", "echo", "print", "global",
    "break", "continue", "unset", "yield", "goto",
];

const MEMBER_MODIFIERS: &[&str] = &[
    "public", "protected", "private", "static", "abstract", "final", "var", "readonly",
];

/// Parses a whole PHP file.
///
/// # Errors
///
/// Returns a lexer error, or [`GeneratorError::Parse`] when a class or
/// method declaration is malformed (unbalanced delimiters, missing names).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use curryforge::syntax::parse_file;
///
/// let source = "<?php
/// namespace Phamda;
///
/// class InnerFunctions
/// {
///     public static function add($x, $y)
///     {
///         return $x + $y;
///     }
/// }
/// ";
/// let file = parse_file(source, Path::new("InnerFunctions.php")).unwrap();
/// let class = file.class("InnerFunctions").unwrap();
/// assert_eq!(file.namespace.as_deref(), Some("Phamda"));
/// assert_eq!(class.methods[0].name, "add");
/// assert_eq!(class.methods[0].params.len(), 2);
/// ```
pub fn parse_file(source: &str, path: &Path) -> Result<SourceFile> {
    let tokens = tokenize(source, path)?;
    let parser = Parser {
        source,
        path,
        tokens: &tokens,
    };
    parser.file()
}

struct Parser<'a> {
    source: &'a str,
    path: &'a Path,
    tokens: &'a [Spanned],
}

impl Parser<'_> {
    fn file(&self) -> Result<SourceFile> {
        let mut file = SourceFile::default();
        let mut position = 0;

        while position < self.tokens.len() {
            let token = &self.tokens[position].token;

            if token.is_keyword("namespace") {
                let end = self.find_symbol_from(position + 1, &[";", "{"]);
                let name = format_tokens(&self.tokens[position + 1..end]);
                if !name.is_empty() {
                    file.namespace = Some(name);
                }
                position = end + 1;
            } else if token.is_keyword("use") {
                let end = self.find_symbol_from(position + 1, &[";"]);
                file.imports
                    .push(format_tokens(&self.tokens[position + 1..end]));
                position = end + 1;
            } else if let Some(kind) = class_kind(token)
                && !(position > 0 && self.tokens[position - 1].token.is_symbol("::"))
            {
                let (class, next) = self.class(position, kind)?;
                file.classes.push(class);
                position = next;
            } else {
                position += 1;
            }
        }

        Ok(file)
    }

    fn class(&self, keyword: usize, kind: ClassKind) -> Result<(ClassDecl, usize)> {
        let name = self
            .tokens
            .get(keyword + 1)
            .and_then(|spanned| spanned.token.as_name())
            .ok_or_else(|| self.error_at(keyword, "expected a class name"))?
            .to_string();

        let open = self.find_symbol_from(keyword + 2, &["{"]);
        let close = self.matching(open)?;

        let mut methods = Vec::new();
        let mut position = open + 1;
        let mut doc_comment = None;
        let mut modifiers = Vec::new();

        while position < close {
            let token = &self.tokens[position].token;
            match token {
                Token::DocComment(text) => {
                    doc_comment = Some(text.clone());
                    position += 1;
                }
                Token::Name(word) if MEMBER_MODIFIERS.iter().any(|m| word.eq_ignore_ascii_case(m)) => {
                    modifiers.push(word.to_ascii_lowercase());
                    position += 1;
                }
                _ if token.is_keyword("function") => {
                    let (method, next) =
                        self.method(position, doc_comment.take(), std::mem::take(&mut modifiers))?;
                    methods.push(method);
                    position = next;
                }
                _ => {
                    // Properties, constants and trait use clauses.
                    position = self.skip_member(position, close) + 1;
                    doc_comment = None;
                    modifiers.clear();
                }
            }
        }

        Ok((ClassDecl { kind, name, methods }, close + 1))
    }

    fn method(
        &self,
        keyword: usize,
        doc_comment: Option<String>,
        modifiers: Vec<String>,
    ) -> Result<(MethodDecl, usize)> {
        let mut position = keyword + 1;
        if self.symbol_at(position, "&") {
            position += 1;
        }

        let name = self
            .tokens
            .get(position)
            .and_then(|spanned| spanned.token.as_name())
            .ok_or_else(|| self.error_at(keyword, "expected a method name"))?
            .to_string();
        position += 1;

        if !self.symbol_at(position, "(") {
            return Err(self.error_at(position, format!("expected '(' after method '{name}'")));
        }
        let params_close = self.matching(position)?;
        let params = parse_params(&self.tokens[position + 1..params_close]);
        position = params_close + 1;

        let mut return_type = None;
        if self.symbol_at(position, ":") {
            let end = self.find_symbol_from(position + 1, &["{", ";"]);
            return_type = Some(join_type(&self.tokens[position + 1..end]));
            position = end;
        }

        let (body, next) = if self.symbol_at(position, ";") {
            (None, position + 1)
        } else if self.symbol_at(position, "{") {
            let close = self.matching(position)?;
            let statements = parse_statements(&self.tokens[position + 1..close], self.source);
            (Some(statements), close + 1)
        } else {
            return Err(self.error_at(position, format!("expected a body for method '{name}'")));
        };

        Ok((
            MethodDecl {
                doc_comment,
                modifiers,
                name,
                params,
                return_type,
                body,
            },
            next,
        ))
    }

    fn skip_member(&self, from: usize, limit: usize) -> usize {
        let mut depth = 0_usize;
        for position in from..limit {
            let token = &self.tokens[position].token;
            if is_open(token) {
                depth += 1;
            } else if is_close(token) {
                depth = depth.saturating_sub(1);
                if depth == 0 && token.is_symbol("}") {
                    return position;
                }
            } else if depth == 0 && token.is_symbol(";") {
                return position;
            }
        }
        limit
    }

    fn find_symbol_from(&self, from: usize, symbols: &[&str]) -> usize {
        (from..self.tokens.len())
            .find(|&position| {
                symbols
                    .iter()
                    .any(|symbol| self.tokens[position].token.is_symbol(symbol))
            })
            .unwrap_or(self.tokens.len())
    }

    fn symbol_at(&self, position: usize, symbol: &str) -> bool {
        self.tokens
            .get(position)
            .is_some_and(|spanned| spanned.token.is_symbol(symbol))
    }

    fn matching(&self, open: usize) -> Result<usize> {
        matching_close(self.tokens, open)
            .ok_or_else(|| self.error_at(open, "unbalanced delimiter"))
    }

    fn error_at(&self, position: usize, message: impl Into<String>) -> GeneratorError {
        let offset = self
            .tokens
            .get(position)
            .or_else(|| self.tokens.last())
            .map_or(0, |spanned| spanned.span.start);
        let (line, column) = super::lexer::line_column(self.source, offset);
        GeneratorError::parse(
            self.path,
            format!("{line}:{column}: {}", message.into()),
        )
    }
}

fn class_kind(token: &Token) -> Option<ClassKind> {
    if token.is_keyword("class") {
        Some(ClassKind::Class)
    } else if token.is_keyword("trait") {
        Some(ClassKind::Trait)
    } else if token.is_keyword("interface") {
        Some(ClassKind::Interface)
    } else {
        None
    }
}

fn is_open(token: &Token) -> bool {
    token.is_symbol("(") || token.is_symbol("[") || token.is_symbol("{")
}

fn is_close(token: &Token) -> bool {
    token.is_symbol(")") || token.is_symbol("]") || token.is_symbol("}")
}

/// Index of the delimiter closing the one at `open`.
pub(crate) fn matching_close(tokens: &[Spanned], open: usize) -> Option<usize> {
    let mut depth = 0_usize;
    for (position, spanned) in tokens.iter().enumerate().skip(open) {
        if is_open(&spanned.token) {
            depth += 1;
        } else if is_close(&spanned.token) {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(position);
            }
        }
    }
    None
}

/// Splits a token run at `separator` symbols outside any delimiters.
///
/// A trailing empty piece (trailing comma) is dropped.
pub(crate) fn split_top_level<'t>(tokens: &'t [Spanned], separator: &str) -> Vec<&'t [Spanned]> {
    let mut pieces = Vec::new();
    let mut depth = 0_usize;
    let mut start = 0;

    for (position, spanned) in tokens.iter().enumerate() {
        if is_open(&spanned.token) {
            depth += 1;
        } else if is_close(&spanned.token) {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && spanned.token.is_symbol(separator) {
            pieces.push(&tokens[start..position]);
            start = position + 1;
        }
    }
    if start < tokens.len() {
        pieces.push(&tokens[start..]);
    }
    pieces
}

fn find_top_level(tokens: &[Spanned], symbol: &str) -> Option<usize> {
    let mut depth = 0_usize;
    for (position, spanned) in tokens.iter().enumerate() {
        if is_open(&spanned.token) {
            depth += 1;
        } else if is_close(&spanned.token) {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && spanned.token.is_symbol(symbol) {
            return Some(position);
        }
    }
    None
}

fn join_type(tokens: &[Spanned]) -> String {
    tokens.iter().map(|spanned| spanned.token.text()).collect()
}

/// Parses the tokens between a parameter list's parentheses.
pub(crate) fn parse_params(tokens: &[Spanned]) -> ParamList {
    split_top_level(tokens, ",")
        .into_iter()
        .filter_map(parse_param)
        .collect()
}

fn parse_param(tokens: &[Spanned]) -> Option<Param> {
    let variable = tokens
        .iter()
        .position(|spanned| matches!(spanned.token, Token::Variable(_)))?;
    let name = tokens[variable].token.as_variable()?.to_string();

    let mut by_ref = false;
    let mut variadic = false;
    let mut type_tokens = Vec::new();
    for spanned in &tokens[..variable] {
        match &spanned.token {
            token if token.is_symbol("&") => by_ref = true,
            token if token.is_symbol("...") => variadic = true,
            Token::Name(word)
                if MEMBER_MODIFIERS.iter().any(|m| word.eq_ignore_ascii_case(m)) => {}
            _ => type_tokens.push(spanned.clone()),
        }
    }

    let default = tokens
        .get(variable + 1)
        .filter(|spanned| spanned.token.is_symbol("="))
        .map(|_| format_tokens(&tokens[variable + 2..]));

    Some(Param {
        name,
        ty: (!type_tokens.is_empty()).then(|| join_type(&type_tokens)),
        default,
        by_ref,
        variadic,
    })
}

/// Splits a block's tokens into statements.
pub(crate) fn parse_statements(tokens: &[Spanned], source: &str) -> Vec<Stmt> {
    let mut statements = Vec::new();
    let mut depth = 0_usize;
    let mut start = 0;

    for (position, spanned) in tokens.iter().enumerate() {
        let token = &spanned.token;
        if is_open(token) {
            depth += 1;
        } else if is_close(token) {
            depth = depth.saturating_sub(1);
            if depth == 0
                && token.is_symbol("}")
                && starts_block(&tokens[start..position])
                && !tokens
                    .get(position + 1)
                    .is_some_and(|next| is_any_keyword(&next.token, CONTINUATION_KEYWORDS))
            {
                statements.push(build_statement(&tokens[start..=position], source));
                start = position + 1;
            }
        } else if depth == 0 && token.is_symbol(";") {
            statements.push(build_statement(&tokens[start..=position], source));
            start = position + 1;
        }
    }

    if tokens[start..]
        .iter()
        .any(|spanned| !matches!(spanned.token, Token::DocComment(_)))
    {
        statements.push(build_statement(&tokens[start..], source));
    }

    statements
}

fn starts_block(tokens: &[Spanned]) -> bool {
    tokens
        .iter()
        .find(|spanned| !matches!(spanned.token, Token::DocComment(_)))
        .is_some_and(|spanned| is_any_keyword(&spanned.token, BLOCK_KEYWORDS))
}

fn is_any_keyword(token: &Token, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| token.is_keyword(keyword))
}

fn build_statement(tokens: &[Spanned], source: &str) -> Stmt {
    let code: Vec<Spanned> = tokens
        .iter()
        .filter(|spanned| !matches!(spanned.token, Token::DocComment(_)))
        .cloned()
        .collect();

    let kind = classify_statement(&code, source);

    Stmt {
        kind,
        lines: source_lines(tokens, source),
        tokens: code,
    }
}

fn classify_statement(code: &[Spanned], source: &str) -> StmtKind {
    let Some(first) = code.first() else {
        return StmtKind::Block;
    };
    let terminated = code.last().is_some_and(|last| last.token.is_symbol(";"));
    let body = if terminated { &code[..code.len() - 1] } else { code };

    if first.token.is_keyword("return") {
        let value = &body[1..];
        return StmtKind::Return((!value.is_empty()).then(|| parse_expr(value, source)));
    }

    let static_variable = first.token.is_keyword("static")
        && body.get(1).is_some_and(|next| next.token.as_variable().is_some());
    if !terminated || static_variable || is_any_keyword(&first.token, STATEMENT_KEYWORDS) {
        return StmtKind::Block;
    }

    StmtKind::Expr(parse_expr(body, source))
}

/// Original source lines of a token run, dedented to the indentation of the
/// line the run starts on.
fn source_lines(tokens: &[Spanned], source: &str) -> Vec<String> {
    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return Vec::new();
    };
    let start = first.span.start;
    let end = last.span.end;
    let line_start = source[..start].rfind('\n').map_or(0, |newline| newline + 1);
    let indent = source[line_start..start]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .count();

    source[start..end]
        .lines()
        .enumerate()
        .map(|(index, line)| {
            let line = if index == 0 {
                line
            } else {
                strip_indent(line, indent)
            };
            line.trim_end().to_string()
        })
        .collect()
}

fn strip_indent(line: &str, indent: usize) -> &str {
    let removable = line
        .chars()
        .take(indent)
        .take_while(|c| *c == ' ' || *c == '\t')
        .count();
    &line[removable..]
}

/// Recognizes the shape of an expression token run.
pub(crate) fn parse_expr(tokens: &[Spanned], source: &str) -> Expr {
    if tokens.is_empty() {
        return Expr::Raw(Vec::new());
    }

    if let [target, assign, value @ ..] = tokens
        && let Some(name) = target.token.as_variable()
        && assign.token.is_symbol("=")
        && !value.is_empty()
    {
        return Expr::Assign {
            target: name.to_string(),
            value: Box::new(parse_expr(value, source)),
        };
    }

    if let Some(closure) = parse_closure(tokens, source) {
        return Expr::Closure(Box::new(closure));
    }

    if let Some(items) = parse_array(tokens, source) {
        return Expr::Array(items);
    }

    if let Some((value, text)) = parse_literal(tokens) {
        return Expr::Literal {
            value,
            source: text,
        };
    }

    if let Some(call) = parse_call_like(tokens, source) {
        return call;
    }

    match tokens {
        [single] => single
            .token
            .as_variable()
            .map_or_else(|| Expr::Raw(tokens.to_vec()), |name| Expr::Variable(name.to_string())),
        _ => Expr::Raw(tokens.to_vec()),
    }
}

/// `(args)` spanning from `open` to the end of `tokens`.
fn trailing_args(tokens: &[Spanned], open: usize, source: &str) -> Option<Vec<Expr>> {
    if !tokens.get(open)?.token.is_symbol("(") {
        return None;
    }
    let close = matching_close(tokens, open)?;
    if close != tokens.len() - 1 {
        return None;
    }
    Some(
        split_top_level(&tokens[open + 1..close], ",")
            .into_iter()
            .map(|argument| parse_expr(argument, source))
            .collect(),
    )
}

fn parse_call_like(tokens: &[Spanned], source: &str) -> Option<Expr> {
    let first = &tokens.first()?.token;

    if first.is_keyword("new") {
        let class = tokens.get(1)?.token.as_name()?.to_string();
        let args = if tokens.len() == 2 {
            Vec::new()
        } else {
            trailing_args(tokens, 2, source)?
        };
        return Some(Expr::New { class, args });
    }

    if let Some(name) = first.as_name() {
        if let Some(args) = trailing_args(tokens, 1, source) {
            return Some(Expr::Call {
                callee: Callee::Function(name.to_string()),
                args,
            });
        }
        if tokens.get(1)?.token.is_symbol("::") {
            let method = tokens.get(2)?.token.as_name()?.to_string();
            let args = trailing_args(tokens, 3, source)?;
            return Some(Expr::Call {
                callee: Callee::Static {
                    class: name.to_string(),
                    method,
                },
                args,
            });
        }
        return None;
    }

    let receiver = first.as_variable()?;
    if tokens.get(1)?.token.is_symbol("->") {
        let method = tokens.get(2)?.token.as_name()?.to_string();
        let args = trailing_args(tokens, 3, source)?;
        return Some(Expr::Call {
            callee: Callee::Method {
                receiver: receiver.to_string(),
                method,
            },
            args,
        });
    }
    None
}

fn parse_closure(tokens: &[Spanned], source: &str) -> Option<Closure> {
    let mut position = 0;
    let is_static = tokens.first()?.token.is_keyword("static");
    if is_static {
        position += 1;
    }

    let keyword = &tokens.get(position)?.token;
    let arrow = keyword.is_keyword("fn");
    if !arrow && !keyword.is_keyword("function") {
        return None;
    }
    position += 1;
    if tokens.get(position)?.token.is_symbol("&") {
        position += 1;
    }

    if !tokens.get(position)?.token.is_symbol("(") {
        return None;
    }
    let params_close = matching_close(tokens, position)?;
    let params = parse_params(&tokens[position + 1..params_close]);
    position = params_close + 1;

    let mut uses = Vec::new();
    if !arrow && tokens.get(position).is_some_and(|s| s.token.is_keyword("use")) {
        let open = position + 1;
        if !tokens.get(open)?.token.is_symbol("(") {
            return None;
        }
        let close = matching_close(tokens, open)?;
        uses = split_top_level(&tokens[open + 1..close], ",")
            .into_iter()
            .filter_map(|entry| {
                let by_ref = entry.first()?.token.is_symbol("&");
                let name = entry.last()?.token.as_variable()?.to_string();
                Some(ClosureUse { name, by_ref })
            })
            .collect();
        position = close + 1;
    }

    let mut return_type = None;
    if tokens.get(position).is_some_and(|s| s.token.is_symbol(":")) {
        let end = (position + 1..tokens.len()).find(|&index| {
            let token = &tokens[index].token;
            token.is_symbol("{") || token.is_symbol("=>")
        })?;
        return_type = Some(join_type(&tokens[position + 1..end]));
        position = end;
    }

    let body = if arrow {
        if !tokens.get(position)?.token.is_symbol("=>") {
            return None;
        }
        ClosureBody::Arrow(Box::new(parse_expr(&tokens[position + 1..], source)))
    } else {
        if !tokens.get(position)?.token.is_symbol("{") {
            return None;
        }
        let close = matching_close(tokens, position)?;
        if close != tokens.len() - 1 {
            return None;
        }
        ClosureBody::Block(parse_statements(&tokens[position + 1..close], source))
    };

    Some(Closure {
        is_static,
        params,
        uses,
        return_type,
        body,
    })
}

fn parse_array(tokens: &[Spanned], source: &str) -> Option<Vec<ArrayItem>> {
    let first = &tokens.first()?.token;
    let open = if first.is_symbol("[") {
        0
    } else if first.is_keyword("array") && tokens.get(1)?.token.is_symbol("(") {
        1
    } else {
        return None;
    };
    let close = matching_close(tokens, open)?;
    if close != tokens.len() - 1 {
        return None;
    }

    Some(
        split_top_level(&tokens[open + 1..close], ",")
            .into_iter()
            .map(|item| parse_array_item(item, source))
            .collect(),
    )
}

fn parse_array_item(tokens: &[Spanned], source: &str) -> ArrayItem {
    if tokens.first().is_some_and(|s| s.token.is_symbol("...")) {
        return ArrayItem {
            key: None,
            value: parse_expr(&tokens[1..], source),
            spread: true,
        };
    }

    match find_top_level(tokens, "=>") {
        Some(arrow) if !starts_arrow_function(&tokens[..arrow]) => ArrayItem {
            key: Some(parse_expr(&tokens[..arrow], source)),
            value: parse_expr(&tokens[arrow + 1..], source),
            spread: false,
        },
        _ => ArrayItem {
            key: None,
            value: parse_expr(tokens, source),
            spread: false,
        },
    }
}

fn starts_arrow_function(tokens: &[Spanned]) -> bool {
    match tokens {
        [first, ..] if first.token.is_keyword("fn") => true,
        [first, second, ..] => first.token.is_keyword("static") && second.token.is_keyword("fn"),
        _ => false,
    }
}

fn parse_literal(tokens: &[Spanned]) -> Option<(Literal, String)> {
    match tokens {
        [single] => {
            let text = single.token.text();
            literal_value(&single.token, false).map(|value| (value, text))
        }
        [sign, number] if sign.token.is_symbol("-") => {
            let text = format!("-{}", number.token.text());
            literal_value(&number.token, true).map(|value| (value, text))
        }
        _ => None,
    }
}

fn literal_value(token: &Token, negative: bool) -> Option<Literal> {
    match token {
        Token::Int(text) => {
            let magnitude = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                Some(hex) => i64::from_str_radix(hex, 16).ok()?,
                None => text.parse::<i64>().ok()?,
            };
            Some(Literal::Int(if negative { -magnitude } else { magnitude }))
        }
        Token::Float(text) => {
            let magnitude = text.parse::<f64>().ok()?;
            Some(Literal::Float(if negative { -magnitude } else { magnitude }))
        }
        _ if negative => None,
        Token::Str(text) => unquote(text).map(Literal::Str),
        Token::Name(word) if word.eq_ignore_ascii_case("null") => Some(Literal::Null),
        Token::Name(word) if word.eq_ignore_ascii_case("true") => Some(Literal::Bool(true)),
        Token::Name(word) if word.eq_ignore_ascii_case("false") => Some(Literal::Bool(false)),
        _ => None,
    }
}

/// Unescapes a quoted string literal; interpolating double-quoted strings
/// are not literals.
fn unquote(text: &str) -> Option<String> {
    let quote = text.chars().next()?;
    let inner = &text[1..text.len() - 1];
    if quote == '"' && inner.contains('$') {
        return None;
    }

    let mut value = String::with_capacity(inner.len());
    let mut characters = inner.chars();
    while let Some(character) = characters.next() {
        if character != '\\' {
            value.push(character);
            continue;
        }
        match (quote, characters.next()) {
            (_, Some('\\')) => value.push('\\'),
            ('\'', Some('\'')) => value.push('\''),
            ('"', Some('"')) => value.push('"'),
            ('"', Some('n')) => value.push('\n'),
            ('"', Some('t')) => value.push('\t'),
            ('"', Some('r')) => value.push('\r'),
            ('"', Some('$')) => value.push('$'),
            (_, Some(other)) => {
                value.push('\\');
                value.push(other);
            }
            (_, None) => value.push('\\'),
        }
    }
    Some(value)
}
