//! Orchestration: load the inputs, run every synthesizer, write artifacts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{Config, SourceRef};
use crate::error::{GeneratorError, Result};
use crate::example::ExampleExtractor;
use crate::model::FunctionCollection;
use crate::syntax::{ClassDecl, SourceFile, parse_file};
use crate::synth::{
    BasicTestSynthesizer, CollectionTestSynthesizer, CurriedMethodSynthesizer, DocListSynthesizer,
};

/// One rendered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// File name inside the output directory.
    pub file_name: String,
    /// Full contents.
    pub contents: String,
}

/// Result of comparing rendered artifacts with the files on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Files whose contents differ from the rendered artifact.
    pub stale: Vec<PathBuf>,
    /// Files that do not exist.
    pub missing: Vec<PathBuf>,
}

impl CheckReport {
    /// Returns `true` when every artifact is present and up to date.
    pub fn is_clean(&self) -> bool {
        self.stale.is_empty() && self.missing.is_empty()
    }
}

/// Inferred metadata of one function, as listed by [`Generator::describe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSummary {
    /// Function name.
    pub name: String,
    /// Arity.
    pub arity: usize,
    /// Curried (arity is non-zero).
    pub curried: bool,
    /// Last parameter is variadic.
    pub variadic: bool,
    /// Collection argument name, for collection functions.
    pub collection_argument: Option<String>,
    /// `@return` types.
    pub return_types: Vec<String>,
    /// Carries `@deprecated`.
    pub deprecated: bool,
    /// Inner parameters, rendered as declarations.
    pub inner_params: Vec<String>,
}

/// Parsed input files.
#[derive(Debug)]
struct Sources {
    template: SourceFile,
    examples: SourceFile,
    providers: Option<SourceFile>,
}

/// Runs the generator for one configuration.
#[derive(Debug, Clone)]
pub struct Generator {
    config: Config,
}

impl Generator {
    /// Creates a generator.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Loads the configuration file and creates a generator.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn from_config_file(path: &Path) -> Result<Self> {
        Config::load(path).map(Self::new)
    }

    /// The configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Renders every artifact in memory without touching the output
    /// directory.
    ///
    /// # Errors
    ///
    /// Any structural problem in the inputs.
    pub fn render(&self) -> Result<Vec<Artifact>> {
        let config = &self.config;
        let sources = self.load()?;

        let template = find_class(&sources.template, &config.template)?;
        let functions = FunctionCollection::from_class(template, config.api.combinators())?;
        tracing::info!(functions = functions.len(), "loaded template");

        let examples = find_class(&sources.examples, &config.examples)?;
        let providers = match (&sources.providers, &config.providers) {
            (Some(file), Some(reference)) => Some(find_class(file, reference)?),
            _ => None,
        };

        let extractor = ExampleExtractor::new(&functions, examples, providers, &config.api.alias);

        let api = CurriedMethodSynthesizer::new(config, &extractor)
            .file(&functions, &sources.template.imports)?;
        let basic = BasicTestSynthesizer::new(config, &functions, providers).file()?;
        let collection = CollectionTestSynthesizer::new(config, &functions, providers).file()?;
        let docs = DocListSynthesizer::new(
            &config.docs_title,
            &config.header,
            &config.api.alias,
            &extractor,
        )
        .document(&functions)?;

        let output = &config.output;
        Ok(vec![
            Artifact {
                file_name: output.api.clone(),
                contents: api.render(),
            },
            Artifact {
                file_name: output.basic_test.clone(),
                contents: basic.render(),
            },
            Artifact {
                file_name: output.collection_test.clone(),
                contents: collection.render(),
            },
            Artifact {
                file_name: output.docs.clone(),
                contents: docs,
            },
        ])
    }

    /// Renders every artifact and writes them to `output_dir`.
    ///
    /// Nothing is written unless every artifact rendered successfully.
    ///
    /// # Errors
    ///
    /// Any structural problem in the inputs, or a failed write.
    pub fn generate(&self, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let _span = tracing::info_span!("generate", output = %output_dir.display()).entered();

        let artifacts = self.render()?;
        let mut written = Vec::with_capacity(artifacts.len());
        for artifact in &artifacts {
            let path = output_dir.join(&artifact.file_name);
            write_atomic(&path, &artifact.contents)?;
            tracing::info!(path = %path.display(), bytes = artifact.contents.len(), "wrote artifact");
            written.push(path);
        }
        Ok(written)
    }

    /// Compares the rendered artifacts with the files in `output_dir`.
    ///
    /// # Errors
    ///
    /// Any structural problem in the inputs, or an unreadable output file.
    pub fn check(&self, output_dir: &Path) -> Result<CheckReport> {
        let mut report = CheckReport::default();
        for artifact in self.render()? {
            let path = output_dir.join(&artifact.file_name);
            match fs::read_to_string(&path) {
                Ok(existing) if existing == artifact.contents => {}
                Ok(_) => report.stale.push(path),
                Err(error) if error.kind() == io::ErrorKind::NotFound => report.missing.push(path),
                Err(error) => return Err(GeneratorError::io(path, error)),
            }
        }
        Ok(report)
    }

    /// Lists the inferred metadata of every template function.
    ///
    /// # Errors
    ///
    /// Any structural problem in the template.
    pub fn describe(&self) -> Result<Vec<FunctionSummary>> {
        let template = read_source(&self.config.template.path)?;
        let class = find_class(&template, &self.config.template)?;
        let functions = FunctionCollection::from_class(class, self.config.api.combinators())?;

        functions
            .iter()
            .map(|function| -> Result<FunctionSummary> {
                let inner_params = if function.needs_inner_params() {
                    functions
                        .inner_function_params(function.name())?
                        .iter()
                        .map(|param| param.declaration())
                        .collect()
                } else {
                    Vec::new()
                };
                Ok(FunctionSummary {
                    name: function.name().to_string(),
                    arity: function.arity(),
                    curried: function.is_curried(),
                    variadic: function.is_variadic(),
                    collection_argument: function.collection_argument_name().map(str::to_string),
                    return_types: function.return_types().to_vec(),
                    deprecated: function.is_deprecated(),
                    inner_params,
                })
            })
            .collect()
    }

    fn load(&self) -> Result<Sources> {
        let config = &self.config;
        Ok(Sources {
            template: read_source(&config.template.path)?,
            examples: read_source(&config.examples.path)?,
            providers: config
                .providers
                .as_ref()
                .map(|providers| read_source(&providers.path))
                .transpose()?,
        })
    }
}

fn read_source(path: &Path) -> Result<SourceFile> {
    let source = fs::read_to_string(path).map_err(|error| GeneratorError::io(path, error))?;
    let file = parse_file(&source, path)?;
    tracing::debug!(path = %path.display(), classes = file.classes.len(), "parsed source");
    Ok(file)
}

fn find_class<'f>(file: &'f SourceFile, reference: &SourceRef) -> Result<&'f ClassDecl> {
    file.class(&reference.class)
        .ok_or_else(|| GeneratorError::ClassNotFound {
            class: reference.class.clone(),
            path: reference.path.clone(),
        })
}

/// Writes `contents` to a temporary sibling of `path` and renames it into
/// place, creating parent directories as needed. A failed rename removes
/// the temporary file.
///
/// # Errors
///
/// [`GeneratorError::Io`] naming the path that failed.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|error| GeneratorError::io(parent, error))?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, contents).map_err(|error| GeneratorError::io(&temp_path, error))?;
    if let Err(error) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(GeneratorError::io(path, error));
    }
    Ok(())
}
