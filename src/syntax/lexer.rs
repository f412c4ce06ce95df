//! Tokenizer for the PHP subset the generator reads.
//!
//! Whitespace, open/close tags and line comments are skipped. Block comments
//! are lexed so that doc comments (`/** ... */`) survive as tokens; plain
//! `/* ... */` comments and `#[...]` attributes are dropped in [`tokenize`].

use std::ops::Range;
use std::path::Path;

use logos::{Lexer, Logos};

use crate::error::{GeneratorError, Result};

/// A PHP token.
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"<\?php")]
#[logos(skip r"\?>")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"#([^\[\n][^\n]*)?")]
pub enum Token {
    /// `/** ... */` or `/* ... */`, raw text including the delimiters.
    #[token("/*", block_comment)]
    DocComment(String),

    /// A `#[...]` attribute group; never reaches the parser.
    #[token("#[", attribute)]
    Attribute,

    /// `$name`, stored without the sigil.
    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice()[1..].to_string())]
    Variable(String),

    /// Identifiers, keywords and (possibly qualified) class names.
    #[regex(r"\\?[A-Za-z_][A-Za-z0-9_]*(\\[A-Za-z_][A-Za-z0-9_]*)*", |lex| lex.slice().to_string())]
    Name(String),

    /// Integer literal, raw text.
    #[regex(r"[0-9]+|0[xX][0-9a-fA-F]+", |lex| lex.slice().to_string())]
    Int(String),

    /// Float literal, raw text.
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?|[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice().to_string())]
    Float(String),

    /// Quoted string literal, raw text including the quotes.
    #[regex(r"'([^'\\]|\\.)*'", |lex| lex.slice().to_string())]
    #[regex(r#""([^"\\]|\\.)*""#, |lex| lex.slice().to_string())]
    Str(String),

    /// Operators and punctuation.
    #[regex(
        r"===|!==|<=>|\*\*=|\?\?=|\.\.\.|\?->|<<=|>>=|::|->|=>|==|!=|<>|<=|>=|&&|\|\||\?\?|\?:|\+\+|--|\+=|-=|\*=|/=|\.=|%=|&=|\|=|\^=|<<|>>|\*\*|[-+*/%=<>!&|^~?:.,;()\[\]{}@]",
        |lex| lex.slice().to_string()
    )]
    Symbol(String),
}

impl Token {
    /// Source text of the token as it is printed back.
    pub fn text(&self) -> String {
        match self {
            Self::Variable(name) => format!("${name}"),
            Self::Attribute => String::new(),
            Self::DocComment(text)
            | Self::Name(text)
            | Self::Int(text)
            | Self::Float(text)
            | Self::Str(text)
            | Self::Symbol(text) => text.clone(),
        }
    }

    /// Returns `true` for the punctuation or operator `symbol`.
    pub fn is_symbol(&self, symbol: &str) -> bool {
        matches!(self, Self::Symbol(text) if text == symbol)
    }

    /// Returns `true` for the identifier `keyword`, compared case-insensitively
    /// as PHP does for keywords.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Self::Name(text) if text.eq_ignore_ascii_case(keyword))
    }

    /// The identifier, if this is a name token.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(text) => Some(text),
            _ => None,
        }
    }

    /// The variable name without `$`, if this is a variable token.
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Self::Variable(name) => Some(name),
            _ => None,
        }
    }
}

/// A token with its byte range in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    /// The token.
    pub token: Token,
    /// Byte range in the source file.
    pub span: Range<usize>,
}

/// Tokenizes `source`, dropping plain block comments.
///
/// `path` is only used for error reporting.
///
/// # Errors
///
/// Returns [`GeneratorError::Lex`] on the first character sequence no token
/// matches.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use curryforge::syntax::lexer::{Token, tokenize};
///
/// let tokens = tokenize("<?php return $x + 1;", Path::new("inline.php")).unwrap();
/// assert_eq!(tokens[0].token, Token::Name("return".to_string()));
/// assert_eq!(tokens[1].token, Token::Variable("x".to_string()));
/// assert_eq!(tokens.len(), 5);
/// ```
pub fn tokenize(source: &str, path: &Path) -> Result<Vec<Spanned>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(Token::DocComment(text)) if !is_doc_comment(&text) => {}
            Ok(Token::Attribute) => {}
            Ok(token) => tokens.push(Spanned { token, span }),
            Err(()) => {
                let (line, column) = line_column(source, span.start);
                return Err(GeneratorError::Lex {
                    path: path.to_path_buf(),
                    line,
                    column,
                    snippet: source[span].to_string(),
                });
            }
        }
    }

    Ok(tokens)
}

/// Consumes a block comment up to its closing `*/`.
fn block_comment(lex: &mut Lexer<Token>) -> Option<String> {
    let end = lex.remainder().find("*/")?;
    lex.bump(end + 2);
    Some(lex.slice().to_string())
}

/// Consumes an attribute group up to the matching `]`.
fn attribute(lex: &mut Lexer<Token>) -> bool {
    let mut depth = 1_usize;
    let mut quote = None;
    let mut escaped = false;

    for (offset, character) in lex.remainder().char_indices() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if character == '\\' {
                escaped = true;
            } else if character == open {
                quote = None;
            }
            continue;
        }
        match character {
            '\'' | '"' => quote = Some(character),
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    lex.bump(offset + 1);
                    return true;
                }
            }
            _ => {}
        }
    }

    false
}

fn is_doc_comment(text: &str) -> bool {
    text.starts_with("/**") && text != "/**/"
}

/// 1-based line and column of a byte offset.
pub fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map_or(before.chars().count(), |newline| {
            before[newline + 1..].chars().count()
        })
        + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source, Path::new("test.php"))
            .unwrap()
            .into_iter()
            .map(|spanned| spanned.token)
            .collect()
    }

    #[test]
    fn test_plain_block_comment_is_dropped() {
        assert_eq!(
            kinds("/* note */ $x"),
            vec![Token::Variable("x".to_string())]
        );
    }

    #[test]
    fn test_doc_comment_is_kept() {
        assert_eq!(
            kinds("/** Adds. */"),
            vec![Token::DocComment("/** Adds. */".to_string())]
        );
    }

    #[test]
    fn test_multi_line_doc_comment_is_kept() {
        let source = "/**\n * Adds.\n *\n * @return int\n */\nfunction";
        assert_eq!(
            kinds(source),
            vec![
                Token::DocComment("/**\n * Adds.\n *\n * @return int\n */".to_string()),
                Token::Name("function".to_string()),
            ]
        );
    }

    #[test]
    fn test_comment_with_stars_inside() {
        assert_eq!(
            kinds("/** a * b **/ $x"),
            vec![
                Token::DocComment("/** a * b **/".to_string()),
                Token::Variable("x".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_comment_is_an_error() {
        let error = tokenize("<?php\n/** open", Path::new("bad.php")).unwrap_err();
        assert!(matches!(error, GeneratorError::Lex { line: 2, column: 1, .. }));
    }

    #[test]
    fn test_attribute_is_dropped_and_hash_comment_skipped() {
        assert_eq!(
            kinds("#[Pure, Deprecated(reason: 'a]b')] $x # note\n#\n$y"),
            vec![
                Token::Variable("x".to_string()),
                Token::Variable("y".to_string()),
            ]
        );
    }

    #[test]
    fn test_longest_symbol_wins() {
        assert_eq!(
            kinds("... === ?-> ::"),
            vec![
                Token::Symbol("...".to_string()),
                Token::Symbol("===".to_string()),
                Token::Symbol("?->".to_string()),
                Token::Symbol("::".to_string()),
            ]
        );
    }

    #[test]
    fn test_qualified_name() {
        assert_eq!(
            kinds("\\Phamda\\Collection\\Collection"),
            vec![Token::Name("\\Phamda\\Collection\\Collection".to_string())]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("12 1.5 0x1F"),
            vec![
                Token::Int("12".to_string()),
                Token::Float("1.5".to_string()),
                Token::Int("0x1F".to_string()),
            ]
        );
    }

    #[test]
    fn test_lex_error_position() {
        let error = tokenize("<?php\n  `ls`", Path::new("bad.php")).unwrap_err();
        match error {
            GeneratorError::Lex { line, column, .. } => {
                assert_eq!((line, column), (2, 3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
