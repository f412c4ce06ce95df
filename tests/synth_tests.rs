//! Integration tests for the synthesizers.

use std::path::Path;

use curryforge::Config;
use curryforge::example::ExampleExtractor;
use curryforge::model::{Combinators, FunctionCollection};
use curryforge::syntax::{Param, SourceFile, parse_file};
use curryforge::synth::{
    BasicTestSynthesizer, CollectionTestSynthesizer, CurriedMethodSynthesizer, DocListSynthesizer,
    curry_chain, signature,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

struct Fixture {
    config: Config,
    template: SourceFile,
    examples: SourceFile,
    providers: SourceFile,
}

impl Fixture {
    fn load() -> Self {
        Self {
            config: Config::default(),
            template: parse(include_str!("fixtures/InnerFunctions.php")),
            examples: parse(include_str!("fixtures/ExamplesTest.php")),
            providers: parse(include_str!("fixtures/DataProviderTrait.php")),
        }
    }

    fn functions(&self) -> FunctionCollection {
        FunctionCollection::from_class(&self.template.classes[0], Combinators::default()).unwrap()
    }
}

fn parse(source: &str) -> SourceFile {
    parse_file(source, Path::new("fixture.php")).unwrap()
}

fn declarations(params: &[Param]) -> Vec<String> {
    params.iter().map(Param::declaration).collect()
}

// =============================================================================
// Curried API methods
// =============================================================================

#[test]
fn test_curried_method_wraps_original_body() {
    let fixture = Fixture::load();
    let functions = fixture.functions();
    let extractor = ExampleExtractor::new(
        &functions,
        &fixture.examples.classes[0],
        Some(&fixture.providers.classes[0]),
        "P",
    );
    let synthesizer = CurriedMethodSynthesizer::new(&fixture.config, &extractor);

    let method = synthesizer.method(functions.get("subtract").unwrap()).unwrap();

    assert!(method.is_static);
    assert_eq!(declarations(&method.params), vec!["$x = null", "$y = null"]);
    assert_eq!(
        method.body,
        vec![
            "return static::curryN(2, function ($x, $y) {",
            "    return $x - $y;",
            "}, func_get_args());",
        ]
    );
    assert_eq!(
        method.doc.unwrap().lines(),
        [
            "Subtracts `$y` from `$x`.",
            "",
            "```php",
            "P::subtract(10, 3); // => 7",
            "$subtractFrom10 = P::subtract(10);",
            "$subtractFrom10(3); // => 7",
            "```",
            "",
            "@param int|float $x",
            "@param int|float $y",
            "@return callable|int|float",
        ]
    );
}

#[test]
fn test_curried_method_keeps_typed_inner_declaration() {
    let fixture = Fixture::load();
    let functions = fixture.functions();
    let extractor = ExampleExtractor::new(&functions, &fixture.examples.classes[0], None, "P");
    let synthesizer = CurriedMethodSynthesizer::new(&fixture.config, &extractor);

    let method = synthesizer.method(functions.get("filter").unwrap()).unwrap();

    assert_eq!(declarations(&method.params), vec!["$predicate = null", "$collection = null"]);
    assert_eq!(
        method.body.first().map(String::as_str),
        Some("return static::curryN(2, function (callable $predicate, $collection) {")
    );
    assert_eq!(method.body.last().map(String::as_str), Some("}, func_get_args());"));
}

#[test]
fn test_uncurried_method_keeps_body() {
    let fixture = Fixture::load();
    let functions = fixture.functions();
    let extractor = ExampleExtractor::new(&functions, &fixture.examples.classes[0], None, "P");
    let synthesizer = CurriedMethodSynthesizer::new(&fixture.config, &extractor);

    let method = synthesizer.method(functions.get("compose").unwrap()).unwrap();

    assert_eq!(declarations(&method.params), vec!["...$functions"]);
    assert_eq!(
        method.body.first().map(String::as_str),
        Some("return function ($value) use ($functions) {")
    );
    assert_eq!(method.body.last().map(String::as_str), Some("};"));
    assert!(!method.body.iter().any(|line| line.contains("curryN")));
}

#[rstest]
#[case("flip", "@return callable")]
#[case("toObject", "@return callable|object")]
#[case("_", "@return Placeholder")]
fn test_curried_return_tag(#[case] name: &str, #[case] expected: &str) {
    let fixture = Fixture::load();
    let functions = fixture.functions();
    let extractor = ExampleExtractor::new(&functions, &fixture.examples.classes[0], None, "P");
    let synthesizer = CurriedMethodSynthesizer::new(&fixture.config, &extractor);

    let doc = synthesizer.method(functions.get(name).unwrap()).unwrap().doc.unwrap();
    assert_eq!(doc.lines().last().map(String::as_str), Some(expected));
}

#[test]
fn test_doc_is_added_only_for_examples() {
    let fixture = Fixture::load();
    let functions = fixture.functions();
    let identity = functions.get("identity").unwrap();

    let without = ExampleExtractor::new(&functions, &fixture.examples.classes[0], None, "P");
    let method = CurriedMethodSynthesizer::new(&fixture.config, &without)
        .method(identity)
        .unwrap();
    assert!(method.doc.is_none());

    let with = ExampleExtractor::new(
        &functions,
        &fixture.examples.classes[0],
        Some(&fixture.providers.classes[0]),
        "P",
    );
    let method = CurriedMethodSynthesizer::new(&fixture.config, &with)
        .method(identity)
        .unwrap();
    assert_eq!(
        method.doc.unwrap().lines(),
        [
            "```php",
            "P::identity(1); // => 1",
            "P::identity('a'); // => 'a'",
            "P::identity(null); // => null",
            "```",
        ]
    );
}

#[test]
fn test_api_file_uses_configured_traits() {
    let mut fixture = Fixture::load();
    fixture.config.api.traits = vec!["Curryforge\\Internal\\CurryTrait".to_string()];
    let functions = fixture.functions();
    let extractor = ExampleExtractor::new(&functions, &fixture.examples.classes[0], None, "P");

    let file = CurriedMethodSynthesizer::new(&fixture.config, &extractor)
        .file(&functions, &fixture.template.imports)
        .unwrap();
    let rendered = file.render();

    assert_eq!(
        file.imports,
        vec!["Curryforge\\Placeholder", "Curryforge\\Internal\\CurryTrait"]
    );
    assert!(rendered.contains("namespace Curryforge;\n"));
    assert!(rendered.contains("class P\n{\n    use CurryTrait;\n\n"));
    assert_eq!(file.class.methods.len(), functions.len());
}

// =============================================================================
// Basic tests
// =============================================================================

#[test]
fn test_basic_test_with_curry_chain() {
    let fixture = Fixture::load();
    let functions = fixture.functions();
    let synthesizer =
        BasicTestSynthesizer::new(&fixture.config, &functions, Some(&fixture.providers.classes[0]));

    let method = synthesizer.method(functions.get("add").unwrap()).unwrap().unwrap();

    assert_eq!(method.name, "testAdd");
    assert!(!method.is_static);
    assert_eq!(method.doc.unwrap().lines(), ["@dataProvider getAddData"]);
    assert_eq!(declarations(&method.params), vec!["$expected", "$x", "$y"]);
    assert_eq!(
        method.body,
        vec![
            "$this->assertEquals($expected, P::add($x, $y));",
            "",
            "$this->assertEquals($expected, P::add()($x, $y));",
            "$this->assertEquals($expected, P::add($x)($y));",
            "$this->assertEquals($expected, P::add($x, $y));",
        ]
    );
}

#[test]
fn test_basic_test_of_callable_result() {
    let fixture = Fixture::load();
    let functions = fixture.functions();
    let synthesizer = BasicTestSynthesizer::new(&fixture.config, &functions, None);

    let method = synthesizer.method(functions.get("flip").unwrap()).unwrap().unwrap();

    assert_eq!(declarations(&method.params), vec!["$expected", "$function", "$a", "$b"]);
    assert_eq!(
        method.body,
        vec![
            "$this->assertEquals($expected, P::flip($function)($a, $b));",
            "",
            "$this->assertEquals($expected, P::flip()($function)($a, $b));",
            "$this->assertEquals($expected, P::flip($function)($a, $b));",
        ]
    );
}

#[test]
fn test_basic_test_of_variadic_function() {
    let fixture = Fixture::load();
    let functions = fixture.functions();
    let synthesizer = BasicTestSynthesizer::new(&fixture.config, &functions, None);

    let method = synthesizer.method(functions.get("compose").unwrap()).unwrap().unwrap();

    assert_eq!(
        declarations(&method.params),
        vec!["$expected", "array $functions", "$value"]
    );
    assert_eq!(
        method.body,
        vec!["$this->assertEquals($expected, P::compose(...$functions)($value));"]
    );
}

#[test]
fn test_variadic_tail_is_applied_last() {
    let file = parse(
        "<?php class T {
            public static function call(callable $f, ...$args) { return $f(...$args); }
        }",
    );
    let functions =
        FunctionCollection::new(file.classes[0].methods.clone(), Combinators::default()).unwrap();
    let config = Config::default();
    let synthesizer = BasicTestSynthesizer::new(&config, &functions, None);

    let method = synthesizer.method(functions.get("call").unwrap()).unwrap().unwrap();

    assert_eq!(declarations(&method.params), vec!["$expected", "$f", "...$args"]);
    assert_eq!(
        method.body,
        vec![
            "$this->assertEquals($expected, P::call($f, ...$args));",
            "",
            "$this->assertEquals($expected, P::call()($f)(...$args));",
            "$this->assertEquals($expected, P::call($f)(...$args));",
        ]
    );
}

#[test]
fn test_missing_provider_drops_annotation() {
    let fixture = Fixture::load();
    let functions = fixture.functions();
    let subtract = functions.get("subtract").unwrap();

    let loaded =
        BasicTestSynthesizer::new(&fixture.config, &functions, Some(&fixture.providers.classes[0]));
    assert!(loaded.method(subtract).unwrap().unwrap().doc.is_none());

    let unloaded = BasicTestSynthesizer::new(&fixture.config, &functions, None);
    assert_eq!(
        unloaded.method(subtract).unwrap().unwrap().doc.unwrap().lines(),
        ["@dataProvider getSubtractData"]
    );
}

#[test]
fn test_object_result_has_no_basic_test() {
    let fixture = Fixture::load();
    let functions = fixture.functions();
    let synthesizer = BasicTestSynthesizer::new(&fixture.config, &functions, None);

    assert!(synthesizer.method(functions.get("toObject").unwrap()).unwrap().is_none());
    assert_eq!(synthesizer.file().unwrap().class.methods.len(), functions.len() - 1);
}

#[test]
fn test_basic_test_file_imports() {
    let mut fixture = Fixture::load();
    fixture.config.tests.provider_trait = Some("Curryforge\\Tests\\DataProviderTrait".to_string());
    let functions = fixture.functions();

    let file = BasicTestSynthesizer::new(&fixture.config, &functions, None).file().unwrap();

    assert_eq!(file.namespace.as_deref(), Some("Curryforge\\Tests"));
    assert_eq!(file.imports, vec!["PHPUnit\\Framework\\TestCase", "Curryforge\\P"]);
    assert_eq!(file.class.name, "BasicTest");
    assert_eq!(file.class.extends.as_deref(), Some("TestCase"));
    assert_eq!(file.class.traits, vec!["DataProviderTrait"]);
}

proptest! {
    #[test]
    fn prop_curry_chain_covers_every_split(count in 0_usize..6) {
        let arguments: Vec<String> = (0..count).map(|index| format!("$a{index}")).collect();
        let chain = curry_chain("P::f", &arguments);

        prop_assert_eq!(chain.len(), count + 1);
        let full = format!("P::f({})", arguments.join(", "));
        prop_assert_eq!(chain.last(), Some(&full));
        for (split, call) in chain.iter().enumerate().take(count) {
            let tail = format!("({})", arguments[split..].join(", "));
            prop_assert!(call.ends_with(&tail));
        }
    }
}

// =============================================================================
// Collection tests
// =============================================================================

#[test]
fn test_collection_tests_for_both_fixtures() {
    let fixture = Fixture::load();
    let functions = fixture.functions();
    let synthesizer = CollectionTestSynthesizer::new(&fixture.config, &functions, None);

    let methods = synthesizer.methods(functions.get("filter").unwrap()).unwrap();

    let names: Vec<&str> = methods.iter().map(|method| method.name.as_str()).collect();
    assert_eq!(names, vec!["testFilter", "testFilterSimple"]);
    assert_eq!(
        declarations(&methods[0].params),
        vec!["$expected", "$predicate", "$collection"]
    );
    assert_eq!(
        methods[1].body,
        vec![
            "$wrappedCollection = new SimpleCollectionFixture($collection);",
            "$actual = P::filter($predicate, $wrappedCollection);",
            "if ($actual instanceof Collection) {",
            "    $actual = $actual->toArray();",
            "}",
            "",
            "$this->assertEquals($expected, $actual);",
            "$this->assertEquals($collection, $wrappedCollection->getValues());",
        ]
    );
}

#[rstest]
#[case("add")]
#[case("toObject")]
#[case("compose")]
fn test_no_collection_tests(#[case] name: &str) {
    let fixture = Fixture::load();
    let functions = fixture.functions();
    let synthesizer = CollectionTestSynthesizer::new(&fixture.config, &functions, None);

    assert!(synthesizer.methods(functions.get(name).unwrap()).unwrap().is_empty());
}

#[test]
fn test_collection_file_imports_fixtures() {
    let fixture = Fixture::load();
    let functions = fixture.functions();

    let file = CollectionTestSynthesizer::new(&fixture.config, &functions, None)
        .file()
        .unwrap();

    assert_eq!(file.class.name, "CollectionTest");
    assert_eq!(
        file.imports,
        vec![
            "PHPUnit\\Framework\\TestCase",
            "Curryforge\\P",
            "Curryforge\\Tests\\Fixtures\\CollectionFixture",
            "Curryforge\\Tests\\Fixtures\\SimpleCollectionFixture",
            "Curryforge\\Collection",
        ]
    );
}

// =============================================================================
// Reference document
// =============================================================================

#[rstest]
#[case("add", "int|float P::add($x, $y)")]
#[case("filter", "array P::filter(callable $predicate, $collection)")]
#[case("compose", "callable P::compose(callable ...$functions)")]
#[case("identity", "mixed P::identity($x)")]
#[case("_", "Placeholder P::_()")]
fn test_signature(#[case] name: &str, #[case] expected: &str) {
    let fixture = Fixture::load();
    let functions = fixture.functions();

    assert_eq!(signature(functions.get(name).unwrap(), "P"), expected);
}

#[test]
fn test_document_layout() {
    let fixture = Fixture::load();
    let functions = fixture.functions();
    let extractor = ExampleExtractor::new(
        &functions,
        &fixture.examples.classes[0],
        Some(&fixture.providers.classes[0]),
        "P",
    );
    let header = vec!["Generated.".to_string()];

    let document = DocListSynthesizer::new("Functions", &header, "P", &extractor)
        .document(&functions)
        .unwrap();

    assert!(document.starts_with(
        "..\n   Generated.\n\nFunctions\n=========\n\nCurrently included functions (10):\n\n\
         .. _add:\n\nadd\n---\n\n``int|float P::add($x, $y)``\n\nAdds two numbers.\n\n\
         .. code-block:: php\n\n    P::add(3, 4); // => 7\n\n.. _subtract:\n"
    ));
    assert!(document.contains("Subtracts ``$y`` from ``$x``.\n"));
    assert!(document.contains(".. _flipped:\n\nflipped\n-------\n\n``callable P::flipped(callable $function)``\n\n.. _compose:"));
    assert!(document.ends_with(
        ".. _\\_:\n\n\\_\n--\n\n``Placeholder P::_()``\n\n\
         Deprecated since version 0.7, to be removed in 0.8. Use P::placeholder() instead.\n\n"
    ));
}
