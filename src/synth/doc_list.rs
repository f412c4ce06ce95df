//! The reStructuredText function reference.

use crate::emit::CodeWriter;
use crate::error::Result;
use crate::example::ExampleExtractor;
use crate::model::{FunctionCollection, FunctionModel, ParamTag};
use crate::syntax::Param;

/// Types that are valid parameter hints on their own.
const HINTABLE_BUILTINS: [&str; 2] = ["array", "callable"];

/// Builds the reference document.
#[derive(Debug)]
pub struct DocListSynthesizer<'a> {
    title: &'a str,
    header: &'a [String],
    alias: &'a str,
    examples: &'a ExampleExtractor<'a>,
}

impl<'a> DocListSynthesizer<'a> {
    /// Creates a synthesizer.
    pub fn new(
        title: &'a str,
        header: &'a [String],
        alias: &'a str,
        examples: &'a ExampleExtractor<'a>,
    ) -> Self {
        Self {
            title,
            header,
            alias,
            examples,
        }
    }

    /// Renders the whole document.
    ///
    /// # Errors
    ///
    /// Propagates example extraction errors.
    pub fn document(&self, functions: &FunctionCollection) -> Result<String> {
        let mut output = CodeWriter::new();

        if !self.header.is_empty() {
            output.writeln("..");
            for line in self.header {
                if line.is_empty() {
                    output.writeln("");
                } else {
                    output.writeln(&format!("   {line}"));
                }
            }
            output.writeln("");
        }

        output.writeln(self.title);
        output.writeln(&"=".repeat(self.title.chars().count()));
        output.writeln("");
        output.writeln(&format!("Currently included functions ({}):", functions.len()));
        output.writeln("");

        for function in functions {
            self.section(function, &mut output)?;
        }

        Ok(output.finish())
    }

    fn section(&self, function: &FunctionModel, output: &mut CodeWriter) -> Result<()> {
        let escaped = escape_name(function.name());

        output.writeln(&format!(".. _{escaped}:"));
        output.writeln("");
        output.writeln(&escaped);
        output.writeln(&"-".repeat(escaped.chars().count()));
        output.writeln("");
        output.writeln(&format!("``{}``", signature(function, self.alias)));
        output.writeln("");

        if let Some(text) = function.doc_comment().deprecated() {
            output.writeln(&deprecation_notice(text));
            output.writeln("");
        }

        let summary = function.doc_comment().summary();
        if !summary.is_empty() {
            for line in summary {
                output.writeln(&convert_code_spans(line));
            }
            output.writeln("");
        }

        let rows = self.examples.rows(function)?;
        if !rows.is_empty() {
            output.writeln(".. code-block:: php");
            output.writeln("");
            for row in &rows {
                output.writeln(&format!("    {row}"));
            }
            output.writeln("");
        }

        Ok(())
    }
}

/// The signature line shown under each heading, without the code markup.
///
/// ```
/// # use std::path::Path;
/// # use curryforge::model::FunctionModel;
/// # use curryforge::syntax::parse_file;
/// # let file = parse_file(
/// #     "<?php class T {
/// #         /**
/// #          * @param int|float $x
/// #          * @param int|float $y
/// #          * @return int|float
/// #          */
/// #         public static function subtract($x, $y) { return $x - $y; }
/// #     }",
/// #     Path::new("inline.php"),
/// # ).unwrap();
/// # let subtract = FunctionModel::new(file.classes[0].methods[0].clone());
/// use curryforge::synth::signature;
///
/// assert_eq!(signature(&subtract, "P"), "int|float P::subtract($x, $y)");
/// ```
pub fn signature(function: &FunctionModel, alias: &str) -> String {
    let return_type = function
        .doc_comment()
        .return_tag()
        .map_or_else(|| "mixed".to_string(), |tag| tag.primary);
    let tags = function.doc_comment().param_tags();

    let params = function
        .params()
        .iter()
        .enumerate()
        .map(|(position, param)| signature_param(param, tags.get(position)))
        .collect::<Vec<_>>()
        .join(", ");

    format!("{return_type} {alias}::{}({params})", function.name())
}

fn signature_param(param: &Param, tag: Option<&ParamTag>) -> String {
    let mut text = String::new();
    if let Some(tag) = tag
        && is_hintable(&tag.ty)
    {
        text.push_str(&tag.ty);
        text.push(' ');
    }
    if param.variadic {
        text.push_str("...");
    }
    text.push('$');
    text.push_str(&param.name);
    if let Some(default) = &param.default {
        text.push_str(" = ");
        text.push_str(default);
    }
    text
}

/// `array`, `callable` or a single class name.
fn is_hintable(ty: &str) -> bool {
    if HINTABLE_BUILTINS.contains(&ty) {
        return true;
    }
    let name = ty.trim_start_matches('\\');
    !ty.contains('|')
        && !ty.ends_with("[]")
        && name.starts_with(|c: char| c.is_ascii_uppercase())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '\\')
}

/// Escapes a leading underscore, which reStructuredText reads as markup.
pub fn escape_name(name: &str) -> String {
    match name.strip_prefix('_') {
        Some(rest) => format!("\\_{rest}"),
        None => name.to_string(),
    }
}

/// The deprecation line of a section.
///
/// ```
/// use curryforge::synth::deprecation_notice;
///
/// assert_eq!(
///     deprecation_notice("Since version 0.7, to be removed in 0.8. Use X instead."),
///     "Deprecated since version 0.7, to be removed in 0.8. Use X instead."
/// );
/// assert_eq!(deprecation_notice("Use X instead."), "Deprecated: Use X instead.");
/// ```
pub fn deprecation_notice(text: &str) -> String {
    if let Some(rest) = text.strip_prefix("Since") {
        format!("Deprecated since{rest}")
    } else if text.is_empty() {
        "Deprecated.".to_string()
    } else {
        format!("Deprecated: {text}")
    }
}

/// Turns Markdown code spans into reStructuredText literals.
fn convert_code_spans(line: &str) -> String {
    let mut converted = String::with_capacity(line.len() + 8);
    let mut rest = line;
    while let Some(position) = rest.find('`') {
        converted.push_str(&rest[..position]);
        if rest[position..].starts_with("``") {
            converted.push_str("``");
            rest = &rest[position + 2..];
        } else {
            converted.push_str("``");
            rest = &rest[position + 1..];
        }
    }
    converted.push_str(rest);
    converted
}
