//! Synthesizers turning the function collection into artifacts.
//!
//! - [`curried`]: the public API class
//! - [`basic_test`]: direct-call and curry-chain tests
//! - [`collection_test`]: collection-compatibility tests
//! - [`doc_list`]: the reStructuredText reference

pub mod curried;
pub mod doc_list;

pub use basic_test::{BasicTestSynthesizer, curry_chain};
pub use collection_test::CollectionTestSynthesizer;
pub use curried::{CurriedMethodSynthesizer, curried_doc};
pub use doc_list::{DocListSynthesizer, deprecation_notice, escape_name, signature};

use crate::config::{Config, qualify, short_name};
use crate::emit::{DocBlock, PhpClass, PhpFile, PhpMethod};
use crate::model::FunctionModel;
use crate::syntax::ClassDecl;

/// Name of the data provider of a function's tests.
pub fn data_provider_name(function: &FunctionModel) -> String {
    format!("get{}Data", function.capitalized_name())
}

/// `@dataProvider get<Name>Data`, left out when a loaded provider class
/// lacks the method.
fn data_provider_doc(function: &FunctionModel, providers: Option<&ClassDecl>) -> Option<DocBlock> {
    let provider = data_provider_name(function);
    if providers.is_some_and(|class| class.method(&provider).is_none()) {
        tracing::debug!(function = function.name(), %provider, "no data provider");
        return None;
    }
    Some(DocBlock::new(vec![format!("@dataProvider {provider}")]))
}

/// A test class file named after `file_name`.
fn test_file(config: &Config, file_name: &str, methods: Vec<PhpMethod>) -> PhpFile {
    let tests = &config.tests;
    let class_name = file_name.strip_suffix(".php").unwrap_or(file_name);

    let mut class = PhpClass::new(class_name);
    class.extends = Some(short_name(&tests.base_class).to_string());
    class.traits = tests
        .provider_trait
        .iter()
        .map(|name| short_name(name).to_string())
        .collect();
    class.methods = methods;

    let mut imports = Vec::new();
    for name in std::iter::once(&tests.base_class).chain(&tests.provider_trait) {
        if name.contains('\\') && qualify(&tests.namespace, short_name(name)) != *name {
            imports.push(name.clone());
        }
    }
    imports.push(config.api.import());

    PhpFile {
        header: config.header.clone(),
        namespace: Some(tests.namespace.clone()).filter(|namespace| !namespace.is_empty()),
        imports,
        class,
    }
}
