//! Syntax tree for the PHP subset the generator reads.
//!
//! The tree is deliberately shallow: classes, methods, parameters and
//! statements are fully structured, while expressions are only structured
//! for the shapes the generator inspects (closures, calls, arrays, literals,
//! assignments). Everything else stays a [`Expr::Raw`] token run that the
//! printer can still render.

use smallvec::SmallVec;

use super::lexer::Spanned;

/// Parameter lists rarely exceed four entries.
pub type ParamList = SmallVec<[Param; 4]>;

/// A parsed source file.
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    /// `namespace` declaration, if any.
    pub namespace: Option<String>,
    /// Top-level `use` imports, without the keyword and trailing `;`.
    pub imports: Vec<String>,
    /// Class-like declarations in source order.
    pub classes: Vec<ClassDecl>,
}

impl SourceFile {
    /// Finds a class, trait or interface by its short name.
    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.iter().find(|class| class.name == name)
    }
}

/// Kind of class-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    /// `class`
    Class,
    /// `trait`
    Trait,
    /// `interface`
    Interface,
}

/// A class, trait or interface.
#[derive(Debug, Clone)]
pub struct ClassDecl {
    /// Declaration keyword.
    pub kind: ClassKind,
    /// Short name.
    pub name: String,
    /// Methods in source order.
    pub methods: Vec<MethodDecl>,
}

impl ClassDecl {
    /// Finds a method by name. PHP method names are case-insensitive.
    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods
            .iter()
            .find(|method| method.name.eq_ignore_ascii_case(name))
    }
}

/// A method declaration.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    /// Raw doc comment, delimiters included.
    pub doc_comment: Option<String>,
    /// Modifiers such as `public` and `static`, lowercased.
    pub modifiers: Vec<String>,
    /// Method name.
    pub name: String,
    /// Declared parameters.
    pub params: ParamList,
    /// Declared return type.
    pub return_type: Option<String>,
    /// Body statements; `None` for abstract and interface methods.
    pub body: Option<Vec<Stmt>>,
}

impl MethodDecl {
    /// Returns `true` when the method carries the `static` modifier.
    pub fn is_static(&self) -> bool {
        self.modifiers.iter().any(|modifier| modifier == "static")
    }

    /// Body statements, empty for bodiless methods.
    pub fn statements(&self) -> &[Stmt] {
        self.body.as_deref().unwrap_or_default()
    }
}

/// A function, method or closure parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Name without `$`.
    pub name: String,
    /// Declared type, e.g. `callable` or `?int`.
    pub ty: Option<String>,
    /// Default value, already rendered to source text.
    pub default: Option<String>,
    /// `&$name`
    pub by_ref: bool,
    /// `...$name`
    pub variadic: bool,
}

impl Param {
    /// An untyped, non-variadic parameter without default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            default: None,
            by_ref: false,
            variadic: false,
        }
    }

    /// Marks the parameter variadic.
    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Sets the declared type.
    #[must_use]
    pub fn typed(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// The parameter as it appears in a declaration: `int &...$name = 1`.
    pub fn declaration(&self) -> String {
        let mut text = String::new();
        if let Some(ty) = &self.ty {
            text.push_str(ty);
            text.push(' ');
        }
        text.push_str(&self.reference());
        if let Some(default) = &self.default {
            text.push_str(" = ");
            text.push_str(default);
        }
        text
    }

    /// The parameter as it is passed on in a call: `$name` or `...$name`.
    pub fn argument(&self) -> String {
        if self.variadic {
            format!("...${}", self.name)
        } else {
            format!("${}", self.name)
        }
    }

    fn reference(&self) -> String {
        let by_ref = if self.by_ref { "&" } else { "" };
        let variadic = if self.variadic { "..." } else { "" };
        format!("{by_ref}{variadic}${}", self.name)
    }
}

/// A statement with its parsed shape and its original source text.
#[derive(Debug, Clone)]
pub struct Stmt {
    /// Parsed shape.
    pub kind: StmtKind,
    /// Tokens, including the terminating `;` when present.
    pub tokens: Vec<Spanned>,
    /// Original source lines, dedented to the statement's own indentation.
    pub lines: Vec<String>,
}

/// Shape of a statement.
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// `return;` or `return <expr>;`
    Return(Option<Expr>),
    /// `<expr>;`
    Expr(Expr),
    /// Control-flow blocks and anything else the generator copies verbatim.
    Block,
}

/// A closure use-clause entry: `use ($name)` or `use (&$name)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureUse {
    /// Name without `$`.
    pub name: String,
    /// Captured by reference.
    pub by_ref: bool,
}

/// Body of a closure literal.
#[derive(Debug, Clone)]
pub enum ClosureBody {
    /// `function () { ... }`
    Block(Vec<Stmt>),
    /// `fn () => expr`
    Arrow(Box<Expr>),
}

/// `function (...) use (...) { ... }` or `fn (...) => ...`.
#[derive(Debug, Clone)]
pub struct Closure {
    /// `static function`
    pub is_static: bool,
    /// Parameters.
    pub params: ParamList,
    /// Captured variables (block closures only).
    pub uses: Vec<ClosureUse>,
    /// Declared return type.
    pub return_type: Option<String>,
    /// Body.
    pub body: ClosureBody,
}

/// The callee of a call expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callee {
    /// `name(...)`
    Function(String),
    /// `Class::method(...)`, including `self`, `static` and `parent`.
    Static {
        /// Class name or `self` / `static` / `parent`.
        class: String,
        /// Method name.
        method: String,
    },
    /// `$receiver->method(...)`
    Method {
        /// Receiver variable without `$`.
        receiver: String,
        /// Method name.
        method: String,
    },
}

impl Callee {
    /// The function or method name being called.
    pub fn name(&self) -> &str {
        match self {
            Self::Function(name) => name,
            Self::Static { method, .. } | Self::Method { method, .. } => method,
        }
    }
}

/// Scalar literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Integer, including a folded unary minus.
    Int(i64),
    /// Float, including a folded unary minus.
    Float(f64),
    /// String, unescaped.
    Str(String),
}

/// One entry of an array literal.
#[derive(Debug, Clone)]
pub struct ArrayItem {
    /// `key =>`, when present.
    pub key: Option<Expr>,
    /// The value.
    pub value: Expr,
    /// `...$spread`
    pub spread: bool,
}

/// An expression, structured for the shapes the generator inspects.
#[derive(Debug, Clone)]
pub enum Expr {
    /// `$name`
    Variable(String),
    /// `$target = value`
    Assign {
        /// Assigned variable without `$`.
        target: String,
        /// Right-hand side.
        value: Box<Expr>,
    },
    /// Function, static or method call.
    Call {
        /// What is called.
        callee: Callee,
        /// Arguments in order.
        args: Vec<Expr>,
    },
    /// `new Class(...)`
    New {
        /// Class name.
        class: String,
        /// Constructor arguments.
        args: Vec<Expr>,
    },
    /// Closure or arrow function literal.
    Closure(Box<Closure>),
    /// `[...]` or `array(...)`
    Array(Vec<ArrayItem>),
    /// Scalar literal with its source text.
    Literal {
        /// Parsed value.
        value: Literal,
        /// Source text, e.g. `-1.50` or `"a\n"`.
        source: String,
    },
    /// Any other expression, kept as tokens.
    Raw(Vec<Spanned>),
}

impl Expr {
    /// The closure literal, if this expression is one.
    pub fn as_closure(&self) -> Option<&Closure> {
        match self {
            Self::Closure(closure) => Some(closure),
            _ => None,
        }
    }
}
