mod compile;
mod configuration;
mod creation;
mod missing_service;
mod resolve;

pub use compile::CompileErrorKind;
pub use configuration::ConfigurationErrorKind;
pub use creation::ServiceCreationErrorKind;
pub use missing_service::MissingServiceErrorKind;
pub use resolve::ResolveErrorKind;
