//! How a function is called from generated tests and examples.

use smallvec::SmallVec;

use super::{FunctionCollection, FunctionModel};
use crate::error::Result;
use crate::syntax::{Param, ParamList};

/// Parameters a data-provider row is spread over, after `$expected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallShape {
    /// Declared parameters with types and defaults stripped. A trailing
    /// variadic parameter becomes `array $name` when [`Self::variadic_as_array`].
    pub own: ParamList,
    /// Inner parameters of a function returning a callable; names already
    /// taken by `own` are left out.
    pub inner: ParamList,
    /// The trailing variadic parameter is received as one array.
    pub variadic_as_array: bool,
}

impl CallShape {
    /// The test-method parameters after `$expected`.
    pub fn test_params(&self) -> impl Iterator<Item = &Param> {
        self.own.iter().chain(&self.inner)
    }

    /// Arguments passing the declared parameters on, e.g. `$f, ...$rest`.
    pub fn own_arguments(&self) -> Vec<String> {
        let last = self.own.len().saturating_sub(1);
        self.own
            .iter()
            .enumerate()
            .map(|(position, param)| {
                if self.variadic_as_array && position == last {
                    format!("...${}", param.name)
                } else {
                    param.argument()
                }
            })
            .collect()
    }

    /// Arguments passing the inner parameters on.
    pub fn inner_arguments(&self) -> Vec<String> {
        self.inner.iter().map(Param::argument).collect()
    }
}

impl FunctionCollection {
    /// Computes the call shape of `function`.
    ///
    /// A trailing variadic parameter is received as an array when the
    /// function delegates to inner parameters that are fixed, or when inner
    /// parameters follow it in the test signature.
    ///
    /// # Errors
    ///
    /// Propagates inner parameter resolution errors; inner parameters are
    /// only resolved for variadic functions and functions returning a
    /// callable.
    pub fn call_shape(&self, function: &FunctionModel) -> Result<CallShape> {
        let inner_params: &[Param] = if function.needs_inner_params() {
            self.inner_function_params(function.name())?
        } else {
            &[]
        };

        let inner_is_variadic = inner_params.last().is_some_and(|param| param.variadic);
        let variadic_as_array = function.is_variadic()
            && !inner_params.is_empty()
            && (!inner_is_variadic || function.returns_callable());

        let mut own: ParamList = function
            .params()
            .iter()
            .map(|param| {
                let mut stripped = Param::new(&param.name);
                stripped.variadic = param.variadic;
                stripped
            })
            .collect();
        if variadic_as_array && let Some(last) = own.last_mut() {
            *last = Param::new(&last.name).typed("array");
        }

        let mut inner = SmallVec::new();
        if function.returns_callable() {
            for param in inner_params {
                if own.iter().any(|taken| taken.name == param.name) {
                    tracing::warn!(
                        function = function.name(),
                        parameter = %param.name,
                        "inner parameter clashes with a declared parameter and is skipped"
                    );
                    continue;
                }
                let mut stripped = Param::new(&param.name);
                stripped.variadic = param.variadic;
                inner.push(stripped);
            }
        }

        Ok(CallShape {
            own,
            inner,
            variadic_as_array,
        })
    }
}
