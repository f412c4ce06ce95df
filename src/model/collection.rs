//! The named collection of template functions.

use std::cell::RefCell;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::smallvec;

use super::function::{FunctionModel, PRECOLLECTED_ARGUMENTS};
use crate::error::{GeneratorError, Result};
use crate::syntax::{Callee, ClassDecl, Expr, MethodDecl, Param, ParamList, StmtKind};

/// Names of the runtime combinators a template function may return a call to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combinators {
    /// Curry-to-N combinator; its closure argument holds the inner parameters.
    pub curry: String,
    /// Partial-to-N combinator; it yields a callable taking any arguments.
    pub partial: String,
}

impl Default for Combinators {
    fn default() -> Self {
        Self {
            curry: "curryN".to_string(),
            partial: "partialN".to_string(),
        }
    }
}

/// Template functions keyed by name, in declaration order.
///
/// Inner parameters are resolved lazily: the first request for a function
/// follows its delegation chain (possibly into functions declared later),
/// and the result is memoized on the function.
#[derive(Debug)]
pub struct FunctionCollection {
    functions: Vec<FunctionModel>,
    index: FxHashMap<String, usize>,
    combinators: Combinators,
    resolving: RefCell<Vec<String>>,
}

impl FunctionCollection {
    /// Builds the collection from the static methods of a template class.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::DuplicateFunction`] when two methods share
    /// a name.
    pub fn from_class(class: &ClassDecl, combinators: Combinators) -> Result<Self> {
        Self::new(
            class
                .methods
                .iter()
                .filter(|method| method.is_static())
                .cloned(),
            combinators,
        )
    }

    /// Builds the collection from definitions in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::DuplicateFunction`] when two definitions
    /// share a name.
    pub fn new(
        definitions: impl IntoIterator<Item = MethodDecl>,
        combinators: Combinators,
    ) -> Result<Self> {
        let mut functions = Vec::new();
        let mut index = FxHashMap::default();

        for definition in definitions {
            let name = definition.name.clone();
            if index.insert(name.clone(), functions.len()).is_some() {
                return Err(GeneratorError::DuplicateFunction(name));
            }
            let function = FunctionModel::new(definition);
            tracing::debug!(
                function = %name,
                arity = function.arity(),
                variadic = function.is_variadic(),
                collection = function.is_collection_function(),
                "loaded template function"
            );
            functions.push(function);
        }

        Ok(Self {
            functions,
            index,
            combinators,
            resolving: RefCell::new(Vec::new()),
        })
    }

    /// Looks a function up by name.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::UnknownFunction`]; the set of names is fixed
    /// at load time, so this is a programming error.
    pub fn get(&self, name: &str) -> Result<&FunctionModel> {
        self.index
            .get(name)
            .map(|&position| &self.functions[position])
            .ok_or_else(|| GeneratorError::UnknownFunction(name.to_string()))
    }

    /// Returns `true` when `name` is a template function.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Functions in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, FunctionModel> {
        self.functions.iter()
    }

    /// Number of functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns `true` for an empty template.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// All function names, for qualifying calls in examples.
    pub fn names(&self) -> FxHashSet<String> {
        self.index.keys().cloned().collect()
    }

    /// Parameters of whatever `name` ultimately delegates to.
    ///
    /// The last top-level `return <expr>;` of the body decides:
    ///
    /// - a closure literal yields its parameters;
    /// - `static::other(...)` / `self::other(...)` on a template function
    ///   yields that function's inner parameters;
    /// - the curry combinator yields the parameters of its closure argument;
    /// - the partial combinator yields a single variadic `$arguments`;
    /// - anything else yields no parameters.
    ///
    /// # Errors
    ///
    /// [`GeneratorError::UnknownFunction`] for an unknown name,
    /// [`GeneratorError::MissingReturn`] when the body has no such return
    /// statement, and [`GeneratorError::CyclicDelegation`] when the
    /// delegation chain loops.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use curryforge::model::{Combinators, FunctionCollection};
    /// use curryforge::syntax::parse_file;
    ///
    /// let file = parse_file(
    ///     "<?php class T {
    ///         public static function flipped($f) { return static::flip($f); }
    ///         public static function flip($f) { return function ($a, $b) use ($f) { return $f($b, $a); }; }
    ///     }",
    ///     Path::new("inline.php"),
    /// )
    /// .unwrap();
    /// let functions = FunctionCollection::from_class(&file.classes[0], Combinators::default()).unwrap();
    ///
    /// let names: Vec<_> = functions
    ///     .inner_function_params("flipped")
    ///     .unwrap()
    ///     .iter()
    ///     .map(|param| param.name.as_str())
    ///     .collect();
    /// assert_eq!(names, ["a", "b"]);
    /// ```
    pub fn inner_function_params(&self, name: &str) -> Result<&[Param]> {
        let function = self.get(name)?;
        if let Some(params) = function.inner_params.get() {
            return Ok(params);
        }

        {
            let mut resolving = self.resolving.borrow_mut();
            if resolving.iter().any(|pending| pending == name) {
                let mut chain = resolving.clone();
                chain.push(name.to_string());
                return Err(GeneratorError::CyclicDelegation { chain });
            }
            resolving.push(name.to_string());
        }

        let resolved = self.resolve(function);
        self.resolving.borrow_mut().pop();

        let params = resolved?;
        Ok(function.inner_params.get_or_init(|| params))
    }

    fn resolve(&self, function: &FunctionModel) -> Result<ParamList> {
        let value = function
            .statements()
            .iter()
            .rev()
            .find_map(|statement| match &statement.kind {
                StmtKind::Return(Some(value)) => Some(value),
                _ => None,
            })
            .ok_or_else(|| GeneratorError::MissingReturn(function.name().to_string()))?;

        self.delegated_params(value)
    }

    fn delegated_params(&self, value: &Expr) -> Result<ParamList> {
        match value {
            Expr::Closure(closure) => Ok(closure.params.clone()),
            Expr::Call {
                callee: Callee::Static { class, method },
                args,
            } if is_own_class(class) => {
                if self.contains(method) {
                    Ok(self.inner_function_params(method)?.iter().cloned().collect())
                } else if *method == self.combinators.curry {
                    Ok(args
                        .iter()
                        .find_map(Expr::as_closure)
                        .map(|closure| closure.params.clone())
                        .unwrap_or_default())
                } else if *method == self.combinators.partial {
                    Ok(smallvec![Param::new(PRECOLLECTED_ARGUMENTS).variadic()])
                } else {
                    Ok(ParamList::new())
                }
            }
            _ => Ok(ParamList::new()),
        }
    }
}

impl<'a> IntoIterator for &'a FunctionCollection {
    type Item = &'a FunctionModel;
    type IntoIter = std::slice::Iter<'a, FunctionModel>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn is_own_class(class: &str) -> bool {
    class.eq_ignore_ascii_case("static") || class.eq_ignore_ascii_case("self")
}

