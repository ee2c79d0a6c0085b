use alloc::string::String;

use crate::metadata::TypeHint;

#[inline]
fn nullable_prefix(type_hint: &TypeHint) -> &'static str {
    if type_hint.is_nullable() {
        "nullable/"
    } else {
        ""
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationErrorKind {
    #[error("[{descriptor}]\nInterface '{interface}' not found.")]
    InterfaceNotFound { descriptor: String, interface: String },
    #[error("[{descriptor}]\nInterface {interface} must have just one non-static method {method}().")]
    NotSingleMethod {
        descriptor: String,
        interface: String,
        method: &'static str,
    },
    #[error("[{descriptor}]\nMethod {interface}::get() must have no parameters.")]
    GetHasParameters { descriptor: String, interface: String },
    #[error("[{descriptor}]\nInterface {interface} must have at least one method.")]
    NoMethods { descriptor: String, interface: String },
    #[error(
        "[{descriptor}]\nMethod {interface}::{method}() does not meet the requirements: \
        is create($name), get($name), create*() or get*() and is non-static."
    )]
    LocatorMethodMismatch {
        descriptor: String,
        interface: String,
        method: String,
    },
    #[error("Property {property} for injection must not be static, readonly and must be public.")]
    InjectPropertyModifiers { property: String },
    #[error(
        "Type of property {property} is expected to not be {}built-in/complex, '{type_hint}' given.",
        nullable_prefix(.type_hint)
    )]
    InjectPropertyComplexType { property: String, type_hint: TypeHint },
    #[error("Property {property} has no type.")]
    PropertyHasNoType { property: String },
    #[error("Class '{class}' required by {property} not found. Check the property type.")]
    PropertyClassNotFound { class: String, property: String },
}
