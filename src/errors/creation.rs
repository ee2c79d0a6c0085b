use alloc::string::String;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceCreationErrorKind {
    #[error("[{descriptor}]\nType is missing in definition of service.")]
    MissingType { descriptor: String },
    #[error("[{descriptor}]\nClass '{class}' not found.")]
    ClassNotFound { descriptor: String, class: String },
    #[error("[{descriptor}]\nMethod {method}() has no return type or annotation @return.")]
    MissingReturnType { descriptor: String, method: String },
    #[error("[{descriptor}]\nClass '{class}' not found.\nCheck the return type or annotation @return of method {method}().")]
    ReturnTypeNotFound {
        descriptor: String,
        class: String,
        method: String,
    },
    #[error("[{descriptor}]\nType of ${parameter} in {interface}::create() doesn't match type in {class} constructor.")]
    ParameterTypeMismatch {
        descriptor: String,
        parameter: String,
        interface: String,
        class: String,
    },
    #[error("[{descriptor}]\nUnused parameter ${parameter} when implementing method {interface}::create().")]
    UnusedParameter {
        descriptor: String,
        parameter: String,
        interface: String,
    },
}
