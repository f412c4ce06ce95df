//! A small model of the PHP files the generator writes.
//!
//! Only what generated code needs: one class per file, static and instance
//! methods with doc blocks, and bodies given as ready-made lines.

use std::fmt;

use super::writer::CodeWriter;
use crate::syntax::{Param, format_params};

/// A `/** ... */` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocBlock {
    lines: Vec<String>,
}

impl DocBlock {
    /// A doc block with the given content lines.
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Content lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn write(&self, writer: &mut CodeWriter) {
        writer.writeln("/**");
        for line in &self.lines {
            if line.is_empty() {
                writer.writeln(" *");
            } else {
                writer.writeln(&format!(" * {line}"));
            }
        }
        writer.writeln(" */");
    }
}

/// A method declaration with its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhpMethod {
    /// Doc block, if any.
    pub doc: Option<DocBlock>,
    /// `public static` or `public`.
    pub is_static: bool,
    /// Method name.
    pub name: String,
    /// Parameters.
    pub params: Vec<Param>,
    /// Body lines, relative to the body's indentation.
    pub body: Vec<String>,
}

impl PhpMethod {
    /// A public instance method with an empty body.
    pub fn public(name: impl Into<String>) -> Self {
        Self {
            doc: None,
            is_static: false,
            name: name.into(),
            params: Vec::new(),
            body: Vec::new(),
        }
    }

    /// A public static method with an empty body.
    pub fn public_static(name: impl Into<String>) -> Self {
        Self {
            is_static: true,
            ..Self::public(name)
        }
    }

    fn write(&self, writer: &mut CodeWriter) {
        if let Some(doc) = &self.doc {
            doc.write(writer);
        }
        let modifiers = if self.is_static { "public static" } else { "public" };
        writer.writeln(&format!(
            "{modifiers} function {}({})",
            self.name,
            format_params(&self.params)
        ));
        writer.writeln("{");
        writer.indent();
        writer.write_lines(&self.body);
        writer.dedent();
        writer.writeln("}");
    }
}

/// A class declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhpClass {
    /// Doc block, if any.
    pub doc: Option<DocBlock>,
    /// Class name.
    pub name: String,
    /// Parent class.
    pub extends: Option<String>,
    /// Traits used by the class.
    pub traits: Vec<String>,
    /// Methods in order.
    pub methods: Vec<PhpMethod>,
}

impl PhpClass {
    /// An empty class.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            doc: None,
            name: name.into(),
            extends: None,
            traits: Vec::new(),
            methods: Vec::new(),
        }
    }

    fn write(&self, writer: &mut CodeWriter) {
        if let Some(doc) = &self.doc {
            doc.write(writer);
        }
        match &self.extends {
            Some(parent) => writer.writeln(&format!("class {} extends {parent}", self.name)),
            None => writer.writeln(&format!("class {}", self.name)),
        }
        writer.writeln("{");
        writer.indent();

        for name in &self.traits {
            writer.writeln(&format!("use {name};"));
        }
        for (position, method) in self.methods.iter().enumerate() {
            if position > 0 || !self.traits.is_empty() {
                writer.newline();
            }
            method.write(writer);
        }

        writer.dedent();
        writer.writeln("}");
    }
}

/// A PHP source file holding one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhpFile {
    /// Comment lines placed right after the open tag.
    pub header: Vec<String>,
    /// Namespace.
    pub namespace: Option<String>,
    /// `use` imports without the keyword and `;`.
    pub imports: Vec<String>,
    /// The class.
    pub class: PhpClass,
}

impl PhpFile {
    /// A file holding `class` with no header, namespace or imports.
    pub fn new(class: PhpClass) -> Self {
        Self {
            header: Vec::new(),
            namespace: None,
            imports: Vec::new(),
            class,
        }
    }

    /// Renders the file.
    ///
    /// # Examples
    ///
    /// ```
    /// use curryforge::emit::{PhpClass, PhpFile, PhpMethod};
    ///
    /// let mut method = PhpMethod::public_static("id");
    /// method.params.push(curryforge::syntax::Param::new("x"));
    /// method.body.push("return $x;".to_string());
    ///
    /// let mut class = PhpClass::new("P");
    /// class.methods.push(method);
    ///
    /// let mut file = PhpFile::new(class);
    /// file.namespace = Some("Fn".to_string());
    ///
    /// assert_eq!(
    ///     file.render(),
    ///     "<?php\n\nnamespace Fn;\n\nclass P\n{\n    public static function id($x)\n    {\n        return $x;\n    }\n}\n"
    /// );
    /// ```
    pub fn render(&self) -> String {
        let mut writer = CodeWriter::new();
        writer.writeln("<?php");
        writer.newline();

        if !self.header.is_empty() {
            writer.writeln("/*");
            for line in &self.header {
                if line.is_empty() {
                    writer.writeln(" *");
                } else {
                    writer.writeln(&format!(" * {line}"));
                }
            }
            writer.writeln(" */");
            writer.newline();
        }

        if let Some(namespace) = &self.namespace {
            writer.writeln(&format!("namespace {namespace};"));
            writer.newline();
        }

        if !self.imports.is_empty() {
            for import in &self.imports {
                writer.writeln(&format!("use {import};"));
            }
            writer.newline();
        }

        self.class.write(&mut writer);
        writer.finish()
    }
}

impl fmt::Display for PhpFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
