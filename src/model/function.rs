//! Per-function metadata inferred from a template function definition.

use std::cell::OnceCell;

use super::doc_comment::DocComment;
use crate::syntax::{MethodDecl, Param, ParamList, Stmt};

/// Names that mark an untyped last parameter as a collection argument.
pub const COLLECTION_ARGUMENT_NAMES: [&str; 4] = ["collection", "list", "map", "values"];

/// A trailing variadic parameter with this name holds a pre-collected
/// argument list and still counts towards the arity.
pub const PRECOLLECTED_ARGUMENTS: &str = "arguments";

/// Metadata computed once when the template is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Number of arguments needed before the function is fully applied.
    pub arity: usize,
    /// The last parameter is variadic.
    pub is_variadic: bool,
    /// Name of the last parameter when it is a collection argument.
    pub collection_argument: Option<String>,
    /// `@return` types in order; empty without a tag.
    pub return_types: Vec<String>,
}

impl Signature {
    /// Infers the signature of a definition.
    pub fn infer(params: &[Param], doc_comment: &DocComment) -> Self {
        let last = params.last();
        let is_variadic = last.is_some_and(|param| param.variadic);
        let discounted = last
            .is_some_and(|param| param.variadic && param.name != PRECOLLECTED_ARGUMENTS);
        let arity = params.len() - usize::from(discounted);

        let collection_argument = last
            .filter(|param| {
                param.ty.is_none() && COLLECTION_ARGUMENT_NAMES.contains(&param.name.as_str())
            })
            .map(|param| param.name.clone());

        let return_types = doc_comment
            .return_tag()
            .map(|tag| tag.types)
            .unwrap_or_default();

        Self {
            arity,
            is_variadic,
            collection_argument,
            return_types,
        }
    }
}

/// A template function together with its inferred metadata.
///
/// The inner parameters depend on other functions and are resolved through
/// [`FunctionCollection::inner_function_params`](super::FunctionCollection::inner_function_params),
/// which memoizes them here.
#[derive(Debug)]
pub struct FunctionModel {
    definition: MethodDecl,
    doc_comment: DocComment,
    signature: Signature,
    pub(super) inner_params: OnceCell<ParamList>,
}

impl FunctionModel {
    /// Wraps a template method.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use curryforge::model::FunctionModel;
    /// use curryforge::syntax::parse_file;
    ///
    /// let file = parse_file(
    ///     "<?php class T {
    ///         /** @return array */
    ///         public static function filter(callable $predicate, $collection) { return []; }
    ///     }",
    ///     Path::new("inline.php"),
    /// )
    /// .unwrap();
    /// let filter = FunctionModel::new(file.classes[0].methods[0].clone());
    ///
    /// assert_eq!(filter.arity(), 2);
    /// assert!(filter.is_curried());
    /// assert!(filter.is_collection_function());
    /// assert_eq!(filter.collection_argument_name(), Some("collection"));
    /// assert!(filter.has_return_type("array"));
    /// ```
    pub fn new(definition: MethodDecl) -> Self {
        let doc_comment = definition
            .doc_comment
            .as_deref()
            .map(DocComment::parse)
            .unwrap_or_default();
        let signature = Signature::infer(&definition.params, &doc_comment);

        Self {
            definition,
            doc_comment,
            signature,
            inner_params: OnceCell::new(),
        }
    }

    /// The function name.
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// The underlying definition.
    pub fn definition(&self) -> &MethodDecl {
        &self.definition
    }

    /// Declared parameters.
    pub fn params(&self) -> &[Param] {
        &self.definition.params
    }

    /// Body statements.
    pub fn statements(&self) -> &[Stmt] {
        self.definition.statements()
    }

    /// The parsed doc comment; empty when the function has none.
    pub fn doc_comment(&self) -> &DocComment {
        &self.doc_comment
    }

    /// Inferred metadata.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Number of arguments needed before the function is fully applied.
    pub fn arity(&self) -> usize {
        self.signature.arity
    }

    /// Functions with a non-zero arity are curried.
    pub fn is_curried(&self) -> bool {
        self.signature.arity != 0
    }

    /// The last parameter is variadic.
    pub fn is_variadic(&self) -> bool {
        self.signature.is_variadic
    }

    /// The declared return type is exactly `callable`.
    pub fn returns_callable(&self) -> bool {
        self.returns_only("callable")
    }

    /// Calls to this function need the parameters of the callable its body
    /// returns: it returns a callable or takes a variadic tail.
    pub fn needs_inner_params(&self) -> bool {
        self.returns_callable() || self.is_variadic()
    }

    /// The declared return type is exactly `object`.
    pub fn returns_object(&self) -> bool {
        self.returns_only("object")
    }

    /// The last parameter is an untyped collection argument.
    pub fn is_collection_function(&self) -> bool {
        self.signature.collection_argument.is_some()
    }

    /// Name of the collection argument.
    pub fn collection_argument_name(&self) -> Option<&str> {
        self.signature.collection_argument.as_deref()
    }

    /// `@return` types in declaration order.
    pub fn return_types(&self) -> &[String] {
        &self.signature.return_types
    }

    /// Returns `true` when `name` is one of the `@return` types.
    pub fn has_return_type(&self, name: &str) -> bool {
        self.signature.return_types.iter().any(|ty| ty == name)
    }

    /// The name with its first letter upper-cased, as used in derived
    /// method names such as `test<Name>` and `get<Name>Data`.
    pub fn capitalized_name(&self) -> String {
        let mut characters = self.name().chars();
        characters.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(characters).collect()
        })
    }

    /// The function carries a `@deprecated` tag.
    pub fn is_deprecated(&self) -> bool {
        self.doc_comment.deprecated().is_some()
    }

    fn returns_only(&self, name: &str) -> bool {
        matches!(self.signature.return_types.as_slice(), [only] if only == name)
    }
}
