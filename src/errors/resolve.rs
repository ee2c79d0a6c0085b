use alloc::{string::String, vec::Vec};

#[inline]
fn join(names: &[String]) -> String {
    names.join(", ")
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveErrorKind {
    #[error("Reference to missing service '{name}'.")]
    MissingReference { name: String },
    #[error("Service of type {type_name} not found. Did you add it to configuration?")]
    NoServiceOfType { type_name: String },
    #[error("Multiple services of type {type_name} found: {}.", join(.names))]
    MultipleServicesOfType { type_name: String, names: Vec<String> },
}
