//! Generator configuration.
//!
//! Read from a YAML file (conventionally `curryforge.yaml`). Every key is
//! optional; unknown keys are rejected. Relative paths are resolved against
//! the directory holding the configuration file.
//!
//! ```yaml
//! template:
//!   path: src/Internal/InnerFunctions.php
//!   class: InnerFunctions
//! examples:
//!   path: tests/ExamplesTest.php
//!   class: ExamplesTest
//! providers:
//!   path: tests/DataProviderTrait.php
//!   class: DataProviderTrait
//! api:
//!   namespace: Curryforge
//!   class: P
//! output:
//!   directory: generated
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{GeneratorError, Result};
use crate::model::Combinators;

/// A class in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceRef {
    /// The file.
    pub path: PathBuf,
    /// Short class name inside the file.
    pub class: String,
}

impl SourceRef {
    /// A class in a file.
    pub fn new(path: impl Into<PathBuf>, class: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            class: class.into(),
        }
    }
}

/// The generated API class.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Namespace of the generated class.
    pub namespace: String,
    /// Class name.
    pub class: String,
    /// Name the class is imported as in tests and shown as in examples.
    pub alias: String,
    /// Fully qualified traits the class uses, typically the runtime helpers.
    pub traits: Vec<String>,
    /// Name of the curry-to-N combinator.
    pub curry: String,
    /// Name of the partial-to-N combinator.
    pub partial: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let combinators = Combinators::default();
        Self {
            namespace: "Curryforge".to_string(),
            class: "P".to_string(),
            alias: "P".to_string(),
            traits: Vec::new(),
            curry: combinators.curry,
            partial: combinators.partial,
        }
    }
}

impl ApiConfig {
    /// The combinator names as used by inner parameter resolution.
    pub fn combinators(&self) -> Combinators {
        Combinators {
            curry: self.curry.clone(),
            partial: self.partial.clone(),
        }
    }

    /// Fully qualified class name.
    pub fn qualified_class(&self) -> String {
        qualify(&self.namespace, &self.class)
    }

    /// The import that makes the class available under its alias.
    pub fn import(&self) -> String {
        if self.alias == self.class {
            self.qualified_class()
        } else {
            format!("{} as {}", self.qualified_class(), self.alias)
        }
    }
}

/// The generated test classes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestsConfig {
    /// Namespace of the generated test classes.
    pub namespace: String,
    /// Fully qualified base class.
    pub base_class: String,
    /// Fully qualified trait providing the `get<Name>Data` methods.
    pub provider_trait: Option<String>,
    /// Fully qualified full-featured collection fixture.
    pub full_fixture: String,
    /// Fully qualified minimal collection fixture.
    pub simple_fixture: String,
    /// Fully qualified collection interface results are checked against.
    pub collection_interface: String,
    /// Fixture method returning the backing values.
    pub values_method: String,
    /// Collection method converting a result to an array.
    pub to_array_method: String,
}

impl Default for TestsConfig {
    fn default() -> Self {
        Self {
            namespace: "Curryforge\\Tests".to_string(),
            base_class: "PHPUnit\\Framework\\TestCase".to_string(),
            provider_trait: None,
            full_fixture: "Curryforge\\Tests\\Fixtures\\CollectionFixture".to_string(),
            simple_fixture: "Curryforge\\Tests\\Fixtures\\SimpleCollectionFixture".to_string(),
            collection_interface: "Curryforge\\Collection".to_string(),
            values_method: "getValues".to_string(),
            to_array_method: "toArray".to_string(),
        }
    }
}

/// Output location and file names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory the artifacts are written to.
    pub directory: PathBuf,
    /// API class file.
    pub api: String,
    /// Basic test class file.
    pub basic_test: String,
    /// Collection test class file.
    pub collection_test: String,
    /// Reference document.
    pub docs: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("generated"),
            api: "P.php".to_string(),
            basic_test: "BasicTest.php".to_string(),
            collection_test: "CollectionTest.php".to_string(),
            docs: "functions.rst".to_string(),
        }
    }
}

/// Complete generator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The template class of inner functions.
    pub template: SourceRef,
    /// The example-test class.
    pub examples: SourceRef,
    /// The class holding `get<Name>Data` providers, if any.
    pub providers: Option<SourceRef>,
    /// Generated API class.
    pub api: ApiConfig,
    /// Generated test classes.
    pub tests: TestsConfig,
    /// Output files.
    pub output: OutputConfig,
    /// Header comment of every artifact, one entry per line.
    pub header: Vec<String>,
    /// Title of the reference document.
    pub docs_title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template: SourceRef::new("src/Internal/InnerFunctions.php", "InnerFunctions"),
            examples: SourceRef::new("tests/ExamplesTest.php", "ExamplesTest"),
            providers: None,
            api: ApiConfig::default(),
            tests: TestsConfig::default(),
            output: OutputConfig::default(),
            header: vec![
                "This file is generated by curryforge.".to_string(),
                "Do not edit it by hand; change the template and regenerate.".to_string(),
            ],
            docs_title: "Functions".to_string(),
        }
    }
}

impl Config {
    /// Loads a configuration file and resolves its relative paths.
    ///
    /// # Errors
    ///
    /// [`GeneratorError::Io`] when the file cannot be read and
    /// [`GeneratorError::Config`] when it is not a valid configuration.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| GeneratorError::io(path, source))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_yaml(&text, path).map(|config| config.resolved_against(base))
    }

    /// Parses YAML text; `origin` names the source in errors.
    ///
    /// # Errors
    ///
    /// [`GeneratorError::Config`] when the text is not a valid configuration.
    pub fn from_yaml(text: &str, origin: &Path) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|source| GeneratorError::Config {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Resolves every relative path against `base`.
    #[must_use]
    pub fn resolved_against(mut self, base: &Path) -> Self {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.template.path);
        resolve(&mut self.examples.path);
        if let Some(providers) = &mut self.providers {
            resolve(&mut providers.path);
        }
        resolve(&mut self.output.directory);
        self
    }
}

/// Joins a namespace and a class name.
pub fn qualify(namespace: &str, class: &str) -> String {
    if namespace.is_empty() {
        class.to_string()
    } else {
        format!("{}\\{class}", namespace.trim_end_matches('\\'))
    }
}

/// The last segment of a qualified class name.
pub fn short_name(qualified: &str) -> &str {
    qualified.rsplit('\\').next().unwrap_or(qualified)
}
