//! End-to-end tests: configuration file in, artifacts on disk.

use std::fs;
use std::path::{Path, PathBuf};

use curryforge::generate::write_atomic;
use curryforge::syntax::parse_file;
use curryforge::{Config, Generator, GeneratorError};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use tempfile::TempDir;

const FIXTURES: [(&str, &str); 4] = [
    ("InnerFunctions.php", include_str!("fixtures/InnerFunctions.php")),
    ("ExamplesTest.php", include_str!("fixtures/ExamplesTest.php")),
    ("DataProviderTrait.php", include_str!("fixtures/DataProviderTrait.php")),
    ("curryforge.yaml", include_str!("fixtures/curryforge.yaml")),
];

/// A project directory holding copies of the fixtures.
#[fixture]
fn project() -> TempDir {
    let directory = TempDir::new().unwrap();
    for (name, contents) in FIXTURES {
        fs::write(directory.path().join(name), contents).unwrap();
    }
    directory
}

fn generator(project: &TempDir) -> Generator {
    Generator::from_config_file(&project.path().join("curryforge.yaml")).unwrap()
}

fn output_dir(project: &TempDir) -> PathBuf {
    project.path().join("generated")
}

// =============================================================================
// Configuration
// =============================================================================

#[rstest]
fn test_config_paths_resolve_against_config_file(project: TempDir) {
    let config = Config::load(&project.path().join("curryforge.yaml")).unwrap();

    assert_eq!(config.template.path, project.path().join("InnerFunctions.php"));
    assert_eq!(config.output.directory, output_dir(&project));
    assert_eq!(config.api.traits, vec!["Curryforge\\Internal\\CurryTrait"]);
    assert_eq!(config.docs_title, "Function reference");
}

#[test]
fn test_empty_config_is_default() {
    let config = Config::from_yaml("\n", Path::new("empty.yaml")).unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn test_partial_section_keeps_other_defaults() {
    let config = Config::from_yaml("api:\n  alias: F\n", Path::new("inline.yaml")).unwrap();

    assert_eq!(config.api.alias, "F");
    assert_eq!(config.api.class, "P");
    assert_eq!(config.api.import(), "Curryforge\\P as F");
}

#[rstest]
#[case("unknown: 1\n")]
#[case("api:\n  clas: P\n")]
#[case("template: [1, 2]\n")]
fn test_invalid_config_is_rejected(#[case] text: &str) {
    let result = Config::from_yaml(text, Path::new("bad.yaml"));

    assert!(matches!(result, Err(GeneratorError::Config { path, .. }) if path == Path::new("bad.yaml")));
}

#[test]
fn test_missing_config_file() {
    let directory = TempDir::new().unwrap();
    let result = Config::load(&directory.path().join("absent.yaml"));

    assert!(matches!(result, Err(GeneratorError::Io { .. })));
}

// =============================================================================
// Generation
// =============================================================================

#[rstest]
fn test_generate_writes_every_artifact(project: TempDir) {
    let output = output_dir(&project);

    let written = generator(&project).generate(&output).unwrap();

    let names: Vec<String> = written
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec!["P.php", "BasicTest.php", "CollectionTest.php", "functions.rst"]
    );
    assert!(written.iter().all(|path| path.starts_with(&output) && path.exists()));
    assert!(!output.join("P.tmp").exists());
}

#[rstest]
fn test_generated_api_is_readable_again(project: TempDir) {
    let output = output_dir(&project);
    generator(&project).generate(&output).unwrap();

    let source = fs::read_to_string(output.join("P.php")).unwrap();
    let file = parse_file(&source, &output.join("P.php")).unwrap();

    assert!(source.starts_with("<?php\n\n/*\n * This file is generated from the fixtures.\n */\n"));
    assert_eq!(file.namespace.as_deref(), Some("Curryforge"));
    assert_eq!(
        file.imports,
        vec!["Curryforge\\Placeholder", "Curryforge\\Internal\\CurryTrait"]
    );
    let class = file.class("P").unwrap();
    assert_eq!(class.methods.len(), 10);
    assert!(class.methods.iter().all(|method| method.is_static()));
    assert!(source.contains(
        "    public static function add($x = null, $y = null)\n    {\n        return static::curryN(2, function ($x, $y) {\n            return $x + $y;\n        }, func_get_args());\n    }\n"
    ));
}

#[rstest]
fn test_generated_tests_use_provider_trait(project: TempDir) {
    let output = output_dir(&project);
    generator(&project).generate(&output).unwrap();

    let basic = fs::read_to_string(output.join("BasicTest.php")).unwrap();
    assert!(basic.contains("namespace Curryforge\\Tests;\n"));
    assert!(basic.contains("use PHPUnit\\Framework\\TestCase;\nuse Curryforge\\P;\n"));
    assert!(basic.contains("class BasicTest extends TestCase\n{\n    use DataProviderTrait;\n"));
    assert!(basic.contains("     * @dataProvider getIdentityData\n"));
    assert!(!basic.contains("getSubtractData"));
    assert!(!basic.contains("testToObject"));

    let collection = fs::read_to_string(output.join("CollectionTest.php")).unwrap();
    assert!(collection.contains("public function testFilterSimple($expected, $predicate, $collection)"));
    assert!(!collection.contains("testToObject"));
}

#[rstest]
fn test_generated_reference(project: TempDir) {
    let output = output_dir(&project);
    generator(&project).generate(&output).unwrap();

    let document = fs::read_to_string(output.join("functions.rst")).unwrap();
    assert!(document.starts_with(
        "..\n   This file is generated from the fixtures.\n\nFunction reference\n==================\n"
    ));
    assert!(document.contains(".. code-block:: php\n\n    P::compose('abs', 'intval')(-3.5); // => 3\n"));
}

#[rstest]
fn test_render_matches_generate(project: TempDir) {
    let generator = generator(&project);
    let output = output_dir(&project);
    generator.generate(&output).unwrap();

    for artifact in generator.render().unwrap() {
        let on_disk = fs::read_to_string(output.join(&artifact.file_name)).unwrap();
        assert_eq!(on_disk, artifact.contents);
    }
}

// =============================================================================
// Check
// =============================================================================

#[rstest]
fn test_check_reports_stale_and_missing(project: TempDir) {
    let generator = generator(&project);
    let output = output_dir(&project);

    let before = generator.check(&output).unwrap();
    assert_eq!(before.missing.len(), 4);
    assert!(!before.is_clean());

    generator.generate(&output).unwrap();
    assert!(generator.check(&output).unwrap().is_clean());

    fs::write(output.join("functions.rst"), "edited\n").unwrap();
    fs::remove_file(output.join("CollectionTest.php")).unwrap();

    let after = generator.check(&output).unwrap();
    assert_eq!(after.stale, vec![output.join("functions.rst")]);
    assert_eq!(after.missing, vec![output.join("CollectionTest.php")]);
}

#[rstest]
fn test_template_edit_makes_output_stale(project: TempDir) {
    let generator = generator(&project);
    let output = output_dir(&project);
    generator.generate(&output).unwrap();

    let template = project.path().join("InnerFunctions.php");
    let source = fs::read_to_string(&template).unwrap();
    fs::write(&template, source.replace("Adds two numbers.", "Adds two values.")).unwrap();

    let report = generator.check(&output).unwrap();
    assert_eq!(
        report.stale,
        vec![output.join("P.php"), output.join("functions.rst")]
    );
}

// =============================================================================
// Failures
// =============================================================================

#[rstest]
fn test_unknown_class_aborts_before_writing(project: TempDir) {
    let path = project.path().join("curryforge.yaml");
    let config = fs::read_to_string(&path).unwrap();
    fs::write(&path, config.replace("class: ExamplesTest", "class: MissingTest")).unwrap();
    let output = output_dir(&project);

    let result = generator(&project).generate(&output);

    assert!(matches!(
        result,
        Err(GeneratorError::ClassNotFound { class, .. }) if class == "MissingTest"
    ));
    assert!(!output.exists());
}

#[test]
fn test_failed_rename_leaves_no_temp_file() {
    let directory = TempDir::new().unwrap();
    let target = directory.path().join("P.php");
    fs::create_dir(&target).unwrap();
    fs::write(target.join("keep"), "").unwrap();

    let result = write_atomic(&target, "<?php\n");

    assert!(matches!(result, Err(GeneratorError::Io { path, .. }) if path == target));
    assert!(!directory.path().join("P.tmp").exists());
}

#[rstest]
fn test_cyclic_template_aborts(project: TempDir) {
    let template = project.path().join("InnerFunctions.php");
    let source = fs::read_to_string(&template).unwrap();
    fs::write(
        &template,
        source.replace("return static::flip($function);", "return static::flipped($function);"),
    )
    .unwrap();

    let result = generator(&project).render();

    assert!(matches!(result, Err(GeneratorError::CyclicDelegation { .. })));
}

// =============================================================================
// Describe
// =============================================================================

#[rstest]
fn test_describe_lists_metadata(project: TempDir) {
    let summaries = generator(&project).describe().unwrap();

    let compose = summaries.iter().find(|summary| summary.name == "compose").unwrap();
    assert_eq!(compose.arity, 0);
    assert!(!compose.curried);
    assert!(compose.variadic);
    assert_eq!(compose.return_types, vec!["callable"]);
    assert_eq!(compose.inner_params, vec!["$value"]);

    let filter = summaries.iter().find(|summary| summary.name == "filter").unwrap();
    assert_eq!(filter.collection_argument.as_deref(), Some("collection"));

    let placeholder = summaries.iter().find(|summary| summary.name == "_").unwrap();
    assert!(placeholder.deprecated);
}

#[rstest]
fn test_describe_skips_inner_params_of_plain_functions(project: TempDir) {
    let template = project.path().join("InnerFunctions.php");
    let source = fs::read_to_string(&template).unwrap();
    let branching = "public static function sign($x)
    {
        if ($x > 0) {
            return 1;
        } else {
            return -1;
        }
    }

    public static function identity($x)";
    fs::write(&template, source.replace("public static function identity($x)", branching)).unwrap();
    let generator = generator(&project);

    assert!(generator.render().is_ok());
    let summaries = generator.describe().unwrap();
    let sign = summaries.iter().find(|summary| summary.name == "sign").unwrap();
    assert_eq!(sign.arity, 1);
    assert!(sign.inner_params.is_empty());
}
