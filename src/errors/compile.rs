use alloc::string::String;

use super::{ConfigurationErrorKind, MissingServiceErrorKind, ResolveErrorKind, ServiceCreationErrorKind};

#[derive(thiserror::Error, Debug)]
pub enum CompileErrorKind {
    #[error(transparent)]
    Configuration(#[from] ConfigurationErrorKind),
    #[error(transparent)]
    ServiceCreation(#[from] ServiceCreationErrorKind),
    #[error(transparent)]
    MissingService(#[from] MissingServiceErrorKind),
    #[error(transparent)]
    Resolve(#[from] ResolveErrorKind),
    #[error("Service '{name}' has already been added.")]
    DuplicateService { name: String },
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}
