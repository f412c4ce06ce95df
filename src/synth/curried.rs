//! Public curried methods of the API class.

use crate::config::{Config, short_name};
use crate::emit::{DocBlock, PhpClass, PhpFile, PhpMethod};
use crate::error::Result;
use crate::example::ExampleExtractor;
use crate::model::{FunctionCollection, FunctionModel};
use crate::syntax::{Param, format_params};

/// Builds the API class from the template functions.
#[derive(Debug)]
pub struct CurriedMethodSynthesizer<'a> {
    config: &'a Config,
    examples: &'a ExampleExtractor<'a>,
}

impl<'a> CurriedMethodSynthesizer<'a> {
    /// Creates a synthesizer.
    pub fn new(config: &'a Config, examples: &'a ExampleExtractor<'a>) -> Self {
        Self { config, examples }
    }

    /// The API file: one public static method per template function.
    ///
    /// `imports` are the template file's own imports; the configured traits
    /// are imported as well.
    ///
    /// # Errors
    ///
    /// Propagates example extraction errors.
    pub fn file(&self, functions: &FunctionCollection, imports: &[String]) -> Result<PhpFile> {
        let api = &self.config.api;

        let mut class = PhpClass::new(&api.class);
        class.traits = api.traits.iter().map(|name| short_name(name).to_string()).collect();
        for function in functions {
            class.methods.push(self.method(function)?);
        }

        let mut all_imports = imports.to_vec();
        for name in &api.traits {
            if name.contains('\\') && !all_imports.contains(name) {
                all_imports.push(name.clone());
            }
        }

        Ok(PhpFile {
            header: self.config.header.clone(),
            namespace: Some(api.namespace.clone()).filter(|namespace| !namespace.is_empty()),
            imports: all_imports,
            class,
        })
    }

    /// The curried method for one function.
    ///
    /// # Errors
    ///
    /// Propagates example extraction errors.
    pub fn method(&self, function: &FunctionModel) -> Result<PhpMethod> {
        let rows = self.examples.rows(function)?;

        let mut method = PhpMethod::public_static(function.name());
        method.doc = curried_doc(function, &rows);
        method.params = function.params().iter().map(nullable).collect();
        method.body = if function.is_curried() {
            self.curried_body(function)
        } else {
            original_body(function)
        };
        Ok(method)
    }

    fn curried_body(&self, function: &FunctionModel) -> Vec<String> {
        let mut body = vec![format!(
            "return static::{}({}, function ({}) {{",
            self.config.api.curry,
            function.arity(),
            format_params(function.params())
        )];
        body.extend(original_body(function).into_iter().map(|line| {
            if line.is_empty() { line } else { format!("    {line}") }
        }));
        body.push("}, func_get_args());".to_string());
        body
    }
}

/// The parameter as the curried method declares it: untyped, defaulting to
/// `null` unless variadic.
fn nullable(param: &Param) -> Param {
    let stripped = Param {
        name: param.name.clone(),
        ty: None,
        default: None,
        by_ref: param.by_ref,
        variadic: param.variadic,
    };
    if param.variadic {
        stripped
    } else {
        stripped.with_default("null")
    }
}

fn original_body(function: &FunctionModel) -> Vec<String> {
    function
        .statements()
        .iter()
        .flat_map(|statement| statement.lines.iter().cloned())
        .collect()
}

/// The doc comment of a curried method.
///
/// The template's comment is reused with `callable|` prepended to the
/// return type of curried functions and the examples inserted before the
/// first tag. A function without a comment only gets one for its examples.
///
/// ```
/// # use std::path::Path;
/// # use curryforge::model::FunctionModel;
/// # use curryforge::syntax::parse_file;
/// # let file = parse_file(
/// #     "<?php class T {
/// #         /**
/// #          * Subtracts.
/// #          *
/// #          * @return int|float
/// #          */
/// #         public static function subtract($x, $y) { return $x - $y; }
/// #     }",
/// #     Path::new("inline.php"),
/// # ).unwrap();
/// # let subtract = FunctionModel::new(file.classes[0].methods[0].clone());
/// use curryforge::synth::curried_doc;
///
/// let doc = curried_doc(&subtract, &["P::subtract(10, 3); // => 7".to_string()]).unwrap();
/// assert_eq!(
///     doc.lines(),
///     [
///         "Subtracts.",
///         "",
///         "```php",
///         "P::subtract(10, 3); // => 7",
///         "```",
///         "",
///         "@return callable|int|float",
///     ]
/// );
/// ```
pub fn curried_doc(function: &FunctionModel, rows: &[String]) -> Option<DocBlock> {
    let comment = function.doc_comment();
    if comment.is_empty() && rows.is_empty() {
        return None;
    }

    let mut lines = comment.lines().to_vec();

    if function.is_curried()
        && !function.returns_callable()
        && let Some(tag) = comment.return_tag()
    {
        let rewritten = format!(
            "@return callable|{}",
            lines[tag.line]["@return".len()..].trim_start()
        );
        lines[tag.line] = rewritten;
    }

    if !rows.is_empty() {
        let (head, tail) = lines.split_at(comment.first_tag_line().unwrap_or(lines.len()));
        let head_end = head.iter().rposition(|line| !line.is_empty()).map_or(0, |last| last + 1);

        let mut merged: Vec<String> = head[..head_end].to_vec();
        if !merged.is_empty() {
            merged.push(String::new());
        }
        merged.push("```php".to_string());
        merged.extend(rows.iter().cloned());
        merged.push("```".to_string());
        if !tail.is_empty() {
            merged.push(String::new());
            merged.extend(tail.iter().cloned());
        }
        lines = merged;
    }

    Some(DocBlock::new(lines))
}
