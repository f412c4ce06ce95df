//! The doc-comment tag grammar of template functions.
//!
//! ```text
//! /**
//!  * Summary line(s), may contain `code` spans.
//!  *
//!  * @param int|float $x
//!  * @param int|float $y
//!  *
//!  * @return int|float
//!  *
//!  * @deprecated Since version 0.7, to be removed in 0.8. Use X instead.
//!  */
//! ```
//!
//! Summary lines come first, then `@param` lines, then a single `@return`
//! line. `@deprecated` may appear anywhere and is located on its own.

/// A parsed doc comment; the content lines are kept for verbatim re-use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    lines: Vec<String>,
}

/// `@param <type> $<name> [description]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamTag {
    /// Declared type; empty when the tag omits it.
    pub ty: String,
    /// Parameter name without `$` or `...`.
    pub name: String,
    /// Free text after the name.
    pub description: String,
}

/// `@return <types> [description]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnTag {
    /// Index of the tag among the content lines.
    pub line: usize,
    /// The whole type expression, e.g. `int|float`.
    pub primary: String,
    /// The type expression split on `|`, in order.
    pub types: Vec<String>,
    /// Free text after the type expression.
    pub description: String,
}

impl DocComment {
    /// Parses a raw `/** ... */` comment.
    ///
    /// # Examples
    ///
    /// ```
    /// use curryforge::model::DocComment;
    ///
    /// let doc = DocComment::parse("/**\n * Adds two numbers.\n *\n * @return int|float\n */");
    /// assert_eq!(doc.summary(), vec!["Adds two numbers."]);
    /// assert_eq!(doc.return_tag().unwrap().types, vec!["int", "float"]);
    /// ```
    pub fn parse(raw: &str) -> Self {
        let body = raw.trim();
        let body = body.strip_prefix("/**").unwrap_or(body);
        let body = body.strip_suffix("*/").unwrap_or(body);

        let mut lines: Vec<String> = body
            .lines()
            .map(|line| {
                let line = line.trim();
                let line = line.strip_prefix('*').unwrap_or(line);
                let line = line.strip_prefix(' ').unwrap_or(line);
                line.trim_end().to_string()
            })
            .collect();

        while lines.first().is_some_and(String::is_empty) {
            lines.remove(0);
        }
        while lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }

        Self { lines }
    }

    /// Builds a comment from content lines.
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Content lines without comment decoration.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns `true` when the comment has no content.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Index of the first tag line other than `@deprecated`.
    pub fn first_tag_line(&self) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.starts_with('@') && !is_deprecated_tag(line))
    }

    /// Summary lines: everything before the first tag except `@deprecated`,
    /// with surrounding blank lines removed. Interior blank lines separate
    /// paragraphs.
    pub fn summary(&self) -> Vec<&str> {
        let end = self.first_tag_line().unwrap_or(self.lines.len());
        let mut summary: Vec<&str> = self.lines[..end]
            .iter()
            .filter(|line| !is_deprecated_tag(line))
            .map(String::as_str)
            .skip_while(|line| line.is_empty())
            .collect();
        while summary.last().is_some_and(|line| line.is_empty()) {
            summary.pop();
        }
        summary
    }

    /// All `@param` tags in order.
    pub fn param_tags(&self) -> Vec<ParamTag> {
        self.tag_lines("param")
            .filter_map(|(_, content)| {
                let mut words = content.split_whitespace();
                let first = words.next()?;
                let (ty, name) = if is_variable_word(first) {
                    (String::new(), first)
                } else {
                    (first.to_string(), words.next().unwrap_or_default())
                };
                Some(ParamTag {
                    ty,
                    name: name
                        .trim_start_matches("...")
                        .trim_start_matches('&')
                        .trim_start_matches('$')
                        .to_string(),
                    description: words.collect::<Vec<_>>().join(" "),
                })
            })
            .collect()
    }

    /// The `@return` tag, if present.
    pub fn return_tag(&self) -> Option<ReturnTag> {
        let (line, content) = self.tag_lines("return").next()?;
        let mut words = content.split_whitespace();
        let primary = words.next()?.to_string();
        Some(ReturnTag {
            line,
            types: primary.split('|').map(str::to_string).collect(),
            primary,
            description: words.collect::<Vec<_>>().join(" "),
        })
    }

    /// Text of the `@deprecated` tag, if present.
    pub fn deprecated(&self) -> Option<&str> {
        self.tag_lines("deprecated").next().map(|(_, content)| content)
    }

    fn tag_lines<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = (usize, &'a str)> + 'a {
        self.lines.iter().enumerate().filter_map(move |(index, line)| {
            let rest = line.strip_prefix('@')?.strip_prefix(tag)?;
            if rest.is_empty() {
                Some((index, rest))
            } else if rest.starts_with(char::is_whitespace) {
                Some((index, rest.trim()))
            } else {
                None
            }
        })
    }
}

fn is_deprecated_tag(line: &str) -> bool {
    line.strip_prefix("@deprecated")
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

fn is_variable_word(word: &str) -> bool {
    word.starts_with('$') || word.starts_with("...$") || word.starts_with("&$")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_comment() {
        let doc = DocComment::parse("/** Returns the value. */");
        assert_eq!(doc.lines(), ["Returns the value."]);
    }

    #[test]
    fn test_param_tag_without_type() {
        let doc = DocComment::parse("/**\n * @param $x the value\n */");
        let tags = doc.param_tags();
        assert_eq!(tags[0].ty, "");
        assert_eq!(tags[0].name, "x");
        assert_eq!(tags[0].description, "the value");
    }

    #[test]
    fn test_leading_deprecation_is_not_summary() {
        let doc = DocComment::parse("/**\n * @deprecated Use map.\n *\n * Maps.\n *\n * @return array\n */");
        assert_eq!(doc.summary(), vec!["Maps."]);
        assert_eq!(doc.first_tag_line(), Some(4));
        assert_eq!(doc.deprecated(), Some("Use map."));
    }

    #[test]
    fn test_tag_prefix_is_not_confused() {
        let doc = DocComment::parse("/**\n * @parameter nope\n * @param int $x\n */");
        assert_eq!(doc.param_tags().len(), 1);
    }
}
