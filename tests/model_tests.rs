//! Integration tests for function metadata and inner parameter resolution.

use std::path::Path;

use curryforge::GeneratorError;
use curryforge::model::{CallShape, Combinators, FunctionCollection};
use curryforge::syntax::{MethodDecl, parse_file};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

const TEMPLATE: &str = include_str!("fixtures/InnerFunctions.php");

fn template() -> FunctionCollection {
    let file = parse_file(TEMPLATE, Path::new("InnerFunctions.php")).unwrap();
    let class = file.class("InnerFunctions").unwrap();
    FunctionCollection::from_class(class, Combinators::default()).unwrap()
}

fn methods(source: &str) -> Vec<MethodDecl> {
    let file = parse_file(source, Path::new("inline.php")).unwrap();
    file.classes[0].methods.clone()
}

fn inner_names(functions: &FunctionCollection, name: &str) -> Vec<String> {
    functions
        .inner_function_params(name)
        .unwrap()
        .iter()
        .map(|param| param.argument())
        .collect()
}

fn arguments(shape: &CallShape) -> (Vec<String>, Vec<String>) {
    (shape.own_arguments(), shape.inner_arguments())
}

// =============================================================================
// Metadata
// =============================================================================

#[rstest]
#[case("add", 2, true, false)]
#[case("filter", 2, true, false)]
#[case("flip", 1, true, false)]
#[case("compose", 0, false, true)]
#[case("identity", 1, true, false)]
#[case("_", 0, false, false)]
fn test_arity_and_variadic(
    #[case] name: &str,
    #[case] arity: usize,
    #[case] curried: bool,
    #[case] variadic: bool,
) {
    let functions = template();
    let function = functions.get(name).unwrap();

    assert_eq!(function.arity(), arity);
    assert_eq!(function.is_curried(), curried);
    assert_eq!(function.is_variadic(), variadic);
}

#[test]
fn test_collection_functions() {
    let functions = template();

    let collection: Vec<(&str, &str)> = functions
        .iter()
        .filter_map(|function| Some((function.name(), function.collection_argument_name()?)))
        .collect();
    assert_eq!(collection, vec![("filter", "collection"), ("toObject", "map")]);
}

#[test]
fn test_return_type_flags() {
    let functions = template();

    assert!(functions.get("flip").unwrap().returns_callable());
    assert!(!functions.get("add").unwrap().returns_callable());
    assert!(functions.get("toObject").unwrap().returns_object());
    assert!(functions.get("add").unwrap().has_return_type("float"));
    assert!(!functions.get("identity").unwrap().has_return_type("mixed"));
    assert!(functions.get("_").unwrap().is_deprecated());
}

#[test]
fn test_template_keeps_declaration_order() {
    let functions = template();

    let names: Vec<&str> = functions.iter().map(|function| function.name()).collect();
    assert_eq!(&names[..3], &["add", "subtract", "filter"]);
    assert_eq!(functions.len(), 10);
}

#[test]
fn test_instance_methods_are_not_template_functions() {
    let source = "<?php class T {
        public static function add($x, $y) { return $x + $y; }
        private function helper() { return 1; }
    }";
    let file = parse_file(source, Path::new("inline.php")).unwrap();
    let functions = FunctionCollection::from_class(&file.classes[0], Combinators::default()).unwrap();

    assert!(functions.contains("add"));
    assert!(!functions.contains("helper"));
}

// =============================================================================
// Inner parameters
// =============================================================================

#[rstest]
#[case("flip", &["$a", "$b"])]
#[case("flipped", &["$a", "$b"])]
#[case("compose", &["$value"])]
#[case("always", &["$ignored"])]
#[case("add", &[])]
#[case("toObject", &[])]
#[case("_", &[])]
fn test_inner_function_params(#[case] name: &str, #[case] expected: &[&str]) {
    let functions = template();

    assert_eq!(inner_names(&functions, name), expected);
}

#[test]
fn test_partial_combinator_yields_collected_arguments() {
    let functions = FunctionCollection::new(
        methods(
            "<?php class T {
                public static function partial(callable $f, ...$args) {
                    return static::partialN(1, $f, $args);
                }
            }",
        ),
        Combinators::default(),
    )
    .unwrap();

    assert_eq!(inner_names(&functions, "partial"), vec!["...$arguments"]);
}

#[test]
fn test_configured_combinator_names() {
    let combinators = Combinators {
        curry: "autoCurry".to_string(),
        partial: "autoPartial".to_string(),
    };
    let functions = FunctionCollection::new(
        methods(
            "<?php class T {
                public static function constant($value) {
                    return self::autoCurry(1, function ($x) use ($value) { return $value; });
                }
            }",
        ),
        combinators,
    )
    .unwrap();

    assert_eq!(inner_names(&functions, "constant"), vec!["$x"]);
}

#[test]
fn test_last_return_decides() {
    let functions = FunctionCollection::new(
        methods(
            "<?php class T {
                public static function pick($flag) {
                    if ($flag) {
                        return 1;
                    }
                    return function ($late) { return $late; };
                }
            }",
        ),
        Combinators::default(),
    )
    .unwrap();

    assert_eq!(inner_names(&functions, "pick"), vec!["$late"]);
}

const CHAIN: [&str; 4] = [
    "public static function first($f) { return static::second($f); }",
    "public static function second($f) { return self::third($f); }",
    "public static function third($f) { return function ($x, ...$rest) use ($f) { return $f($x); }; }",
    "public static function unrelated($x) { return $x; }",
];

proptest! {
    #[test]
    fn prop_resolution_ignores_declaration_order(
        order in Just(CHAIN.to_vec()).prop_shuffle(),
        query in prop::sample::select(vec!["first", "second", "third"]),
    ) {
        let source = format!("<?php class T {{ {} }}", order.join("\n"));
        let functions = FunctionCollection::new(methods(&source), Combinators::default()).unwrap();

        prop_assert_eq!(inner_names(&functions, query), vec!["$x", "...$rest"]);
        prop_assert_eq!(inner_names(&functions, "unrelated"), Vec::<String>::new());
    }
}

// =============================================================================
// Call shapes
// =============================================================================

#[test]
fn test_call_shape_of_plain_function() {
    let functions = template();
    let shape = functions.call_shape(functions.get("add").unwrap()).unwrap();

    assert_eq!(arguments(&shape), (vec!["$x".into(), "$y".into()], vec![]));
    assert!(!shape.variadic_as_array);
}

#[test]
fn test_call_shape_of_callable_result() {
    let functions = template();
    let shape = functions.call_shape(functions.get("flipped").unwrap()).unwrap();

    assert_eq!(
        arguments(&shape),
        (vec!["$function".into()], vec!["$a".into(), "$b".into()])
    );
}

#[test]
fn test_variadic_becomes_array_before_inner_params() {
    let functions = template();
    let shape = functions.call_shape(functions.get("compose").unwrap()).unwrap();

    assert!(shape.variadic_as_array);
    assert_eq!(shape.own[0].declaration(), "array $functions");
    assert_eq!(
        arguments(&shape),
        (vec!["...$functions".into()], vec!["$value".into()])
    );
}

#[test]
fn test_variadic_stays_variadic_without_inner_params() {
    let functions = FunctionCollection::new(
        methods("<?php class T { public static function max(...$values) { return max($values); } }"),
        Combinators::default(),
    )
    .unwrap();
    let shape = functions.call_shape(functions.get("max").unwrap()).unwrap();

    assert!(!shape.variadic_as_array);
    assert_eq!(shape.own[0].declaration(), "...$values");
}

#[test]
fn test_clashing_inner_param_is_skipped() {
    let functions = FunctionCollection::new(
        methods(
            "<?php class T {
                /** @return callable */
                public static function tap($x) { return function ($x, $y) { return $y; }; }
            }",
        ),
        Combinators::default(),
    )
    .unwrap();
    let shape = functions.call_shape(functions.get("tap").unwrap()).unwrap();

    assert_eq!(shape.inner_arguments(), vec!["$y"]);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_cyclic_delegation_is_rejected() {
    let functions = FunctionCollection::new(
        methods(
            "<?php class T {
                public static function ping($f) { return static::pong($f); }
                public static function pong($f) { return static::ping($f); }
            }",
        ),
        Combinators::default(),
    )
    .unwrap();

    match functions.inner_function_params("ping") {
        Err(GeneratorError::CyclicDelegation { chain }) => {
            assert_eq!(chain, vec!["ping", "pong", "ping"]);
        }
        other => panic!("expected a cycle, got {other:?}"),
    }
}

#[test]
fn test_missing_return_is_rejected() {
    let functions = FunctionCollection::new(
        methods("<?php class T { public static function touch(&$x) { $x++; } }"),
        Combinators::default(),
    )
    .unwrap();

    assert!(matches!(
        functions.inner_function_params("touch"),
        Err(GeneratorError::MissingReturn(name)) if name == "touch"
    ));
}

#[test]
fn test_duplicate_function_is_rejected() {
    let result = FunctionCollection::new(
        methods(
            "<?php class T {
                public static function add($x, $y) { return $x + $y; }
                public static function add($a, $b) { return $a + $b; }
            }",
        ),
        Combinators::default(),
    );

    assert!(matches!(result, Err(GeneratorError::DuplicateFunction(name)) if name == "add"));
}

#[test]
fn test_unknown_function_is_rejected() {
    let functions = template();

    assert!(matches!(
        functions.inner_function_params("missing"),
        Err(GeneratorError::UnknownFunction(name)) if name == "missing"
    ));
}
