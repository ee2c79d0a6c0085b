use alloc::string::String;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MissingServiceErrorKind {
    #[error("Service of type {type_name} required by {required_by} not found.\nDid you add it to configuration?")]
    ServiceOfTypeNotFound { type_name: String, required_by: String },
}
