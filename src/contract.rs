//! Classification of interfaces into the shapes the compiler can implement.

use alloc::{
    borrow::ToOwned as _,
    string::{String, ToString as _},
    vec::Vec,
};
use core::fmt::{self, Display, Formatter};
use tracing::{debug, error};

use crate::{
    errors::ConfigurationErrorKind,
    metadata::{MethodInfo, ParameterInfo, TypeHint, TypeMetadata},
};

const CREATE: &str = "create";
const GET: &str = "get";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractKind {
    Factory,
    Accessor,
    Locator,
}

impl Display for ContractKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContractKind::Factory => "factory",
            ContractKind::Accessor => "accessor",
            ContractKind::Locator => "locator",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodShape {
    /// Factory `create(...)`
    Create,
    /// Accessor `get()`
    Get,
    /// Locator `create($name)`
    CreateByName,
    /// Locator `get($name)`
    GetByName,
    /// Locator `create*()`, with the key derived from the suffix
    CreateNamed(String),
    /// Locator `get*()`, with the key derived from the suffix
    GetNamed(String),
}

impl MethodShape {
    /// `true` if the method returns a new instance on every call
    #[inline]
    #[must_use]
    pub const fn is_create(&self) -> bool {
        matches!(self, MethodShape::Create | MethodShape::CreateByName | MethodShape::CreateNamed(_))
    }

    #[inline]
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            MethodShape::CreateNamed(key) | MethodShape::GetNamed(key) => Some(key),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContractMethod {
    pub name: String,
    pub shape: MethodShape,
    pub parameters: Vec<ParameterInfo>,
    /// Declared return type, or the `@return` annotation if there is none
    pub return_type: Option<TypeHint>,
}

impl ContractMethod {
    fn new(method: &MethodInfo, shape: MethodShape) -> Self {
        Self {
            name: method.name.clone(),
            shape,
            parameters: method.parameters.clone(),
            return_type: method.resolved_return_type(),
        }
    }
}

/// Structure of a valid factory, accessor or locator interface. Computed on demand and never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct Contract {
    pub kind: ContractKind,
    pub interface: String,
    pub methods: Vec<ContractMethod>,
}

/// Checks that `interface` has the shape required by `kind`.
///
/// # Errors
/// Returns [`ConfigurationErrorKind`] describing the first violation, prefixed with `descriptor`
pub fn classify<M>(metadata: &M, interface: &str, kind: ContractKind, descriptor: &str) -> Result<Contract, ConfigurationErrorKind>
where
    M: TypeMetadata + ?Sized,
{
    let interface = interface.trim_start_matches('\\');
    let result = if metadata.is_interface(interface) {
        let methods = metadata.methods(interface);
        match kind {
            ContractKind::Factory => classify_factory(interface, &methods, descriptor),
            ContractKind::Accessor => classify_accessor(interface, &methods, descriptor),
            ContractKind::Locator => classify_locator(interface, &methods, descriptor),
        }
        .map(|methods| Contract {
            kind,
            interface: interface.to_owned(),
            methods,
        })
    } else {
        Err(ConfigurationErrorKind::InterfaceNotFound {
            descriptor: descriptor.to_owned(),
            interface: interface.to_owned(),
        })
    };

    match &result {
        Ok(contract) => debug!(%kind, interface, methods = contract.methods.len(), "Classified"),
        Err(err) => error!("{}", err),
    }
    result
}

fn single_method<'a>(
    interface: &str,
    methods: &[&'a MethodInfo],
    name: &'static str,
    descriptor: &str,
) -> Result<&'a MethodInfo, ConfigurationErrorKind> {
    match methods {
        [method] if method.name == name && !method.is_static => Ok(method),
        _ => Err(ConfigurationErrorKind::NotSingleMethod {
            descriptor: descriptor.to_owned(),
            interface: interface.to_owned(),
            method: name,
        }),
    }
}

fn classify_factory(interface: &str, methods: &[&MethodInfo], descriptor: &str) -> Result<Vec<ContractMethod>, ConfigurationErrorKind> {
    let method = single_method(interface, methods, CREATE, descriptor)?;
    Ok(Vec::from([ContractMethod::new(method, MethodShape::Create)]))
}

fn classify_accessor(interface: &str, methods: &[&MethodInfo], descriptor: &str) -> Result<Vec<ContractMethod>, ConfigurationErrorKind> {
    let method = single_method(interface, methods, GET, descriptor)?;
    if !method.parameters.is_empty() {
        return Err(ConfigurationErrorKind::GetHasParameters {
            descriptor: descriptor.to_owned(),
            interface: interface.to_owned(),
        });
    }
    Ok(Vec::from([ContractMethod::new(method, MethodShape::Get)]))
}

fn classify_locator(interface: &str, methods: &[&MethodInfo], descriptor: &str) -> Result<Vec<ContractMethod>, ConfigurationErrorKind> {
    if methods.is_empty() {
        return Err(ConfigurationErrorKind::NoMethods {
            descriptor: descriptor.to_owned(),
            interface: interface.to_owned(),
        });
    }

    methods
        .iter()
        .map(|method| {
            locator_shape(method)
                .map(|shape| ContractMethod::new(method, shape))
                .ok_or_else(|| ConfigurationErrorKind::LocatorMethodMismatch {
                    descriptor: descriptor.to_owned(),
                    interface: interface.to_owned(),
                    method: method.name.clone(),
                })
        })
        .collect()
}

fn locator_shape(method: &MethodInfo) -> Option<MethodShape> {
    if method.is_static {
        return None;
    }

    let name = method.name.as_str();
    match (name, method.parameters.len()) {
        (CREATE, 1) => Some(MethodShape::CreateByName),
        (GET, 1) => Some(MethodShape::GetByName),
        (_, 0) => {
            if let Some(suffix) = name.strip_prefix(CREATE).filter(|suffix| !suffix.is_empty()) {
                Some(MethodShape::CreateNamed(lower_first(suffix)))
            } else {
                name.strip_prefix(GET)
                    .filter(|suffix| !suffix.is_empty())
                    .map(|suffix| MethodShape::GetNamed(lower_first(suffix)))
            }
        }
        _ => None,
    }
}

/// `Mailer` -> `mailer`, `SMTP` -> `sMTP`
fn lower_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Display for Contract {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.methods.iter().map(|method| method.name.to_string()).collect();
        write!(f, "{} {} [{}]", self.kind, self.interface, names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{classify, lower_first, ContractKind, MethodShape};
    use crate::metadata::{ClassInfo, MethodInfo, ParameterInfo, TypeTable};

    use alloc::{
        format,
        string::{String, ToString as _},
    };
    use tracing_test::traced_test;

    fn interface(name: &str, methods: impl IntoIterator<Item = MethodInfo>) -> ClassInfo {
        methods.into_iter().fold(ClassInfo::interface(name), ClassInfo::method)
    }

    fn error(metadata: &TypeTable, name: &str, kind: ContractKind) -> String {
        classify(metadata, name, kind, "?").unwrap_err().to_string()
    }

    #[test]
    #[traced_test]
    fn test_missing_interface() {
        let metadata = TypeTable::new().with(ClassInfo::class("Concrete"));

        for kind in [ContractKind::Factory, ContractKind::Accessor, ContractKind::Locator] {
            assert_eq!(error(&metadata, "Unknown", kind), "[?]\nInterface 'Unknown' not found.");
            assert_eq!(error(&metadata, "Concrete", kind), "[?]\nInterface 'Concrete' not found.");
        }
    }

    #[test]
    #[traced_test]
    fn test_empty_interface() {
        let metadata = TypeTable::new().with(ClassInfo::interface("Empty"));

        assert_eq!(
            error(&metadata, "Empty", ContractKind::Factory),
            "[?]\nInterface Empty must have just one non-static method create()."
        );
        assert_eq!(
            error(&metadata, "Empty", ContractKind::Accessor),
            "[?]\nInterface Empty must have just one non-static method get()."
        );
        assert_eq!(
            error(&metadata, "Empty", ContractKind::Locator),
            "[?]\nInterface Empty must have at least one method."
        );
    }

    #[test]
    #[traced_test]
    fn test_factory() {
        let metadata = TypeTable::from_iter([
            interface("Good", [MethodInfo::new("create").parameter(ParameterInfo::new("name")).returns("Mailer")]),
            interface("Static", [MethodInfo::new("create").with_static()]),
            interface("WrongName", [MethodInfo::new("make")]),
            interface("TwoMethods", [MethodInfo::new("create"), MethodInfo::new("other")]),
        ]);

        let contract = classify(&metadata, "Good", ContractKind::Factory, "factory").unwrap();
        assert_eq!(contract.interface, "Good");
        assert_eq!(contract.methods.len(), 1);
        assert_eq!(contract.methods[0].shape, MethodShape::Create);
        assert_eq!(contract.methods[0].parameters.len(), 1);
        assert_eq!(contract.methods[0].return_type.as_ref().unwrap().to_string(), "Mailer");

        for name in ["Static", "WrongName", "TwoMethods"] {
            assert_eq!(
                classify(&metadata, name, ContractKind::Factory, "factory").unwrap_err().to_string(),
                format!("[factory]\nInterface {name} must have just one non-static method create().")
            );
        }
    }

    #[test]
    #[traced_test]
    fn test_accessor() {
        let metadata = TypeTable::from_iter([
            interface("Good", [MethodInfo::new("get").returns("Mailer")]),
            interface("Static", [MethodInfo::new("get").with_static()]),
            interface("WithParameter", [MethodInfo::new("get").parameter(ParameterInfo::new("name"))]),
            interface("StaticWithParameter", [MethodInfo::new("get").with_static().parameter(ParameterInfo::new("name"))]),
        ]);

        let contract = classify(&metadata, "Good", ContractKind::Accessor, "?").unwrap();
        assert_eq!(contract.methods[0].shape, MethodShape::Get);

        assert_eq!(
            error(&metadata, "Static", ContractKind::Accessor),
            "[?]\nInterface Static must have just one non-static method get()."
        );
        assert_eq!(
            error(&metadata, "WithParameter", ContractKind::Accessor),
            "[?]\nMethod WithParameter::get() must have no parameters."
        );
        assert_eq!(
            error(&metadata, "StaticWithParameter", ContractKind::Accessor),
            "[?]\nInterface StaticWithParameter must have just one non-static method get()."
        );
    }

    #[test]
    #[traced_test]
    fn test_locator() {
        let metadata = TypeTable::from_iter([
            interface("Prefixed", [MethodInfo::new("createA"), MethodInfo::new("getB")]),
            interface(
                "ByName",
                [
                    MethodInfo::new("create").parameter(ParameterInfo::new("name")),
                    MethodInfo::new("get").parameter(ParameterInfo::new("name")),
                ],
            ),
            interface(
                "TwoParameters",
                [MethodInfo::new("get").parameter(ParameterInfo::new("arg")).parameter(ParameterInfo::new("arg2"))],
            ),
            interface("LateFailure", [MethodInfo::new("getA"), MethodInfo::new("find")]),
            interface("StaticGetter", [MethodInfo::new("getA").with_static()]),
            interface("BarePrefix", [MethodInfo::new("get")]),
            interface("PrefixedWithParameter", [MethodInfo::new("getA").parameter(ParameterInfo::new("name"))]),
        ]);

        let contract = classify(&metadata, "Prefixed", ContractKind::Locator, "?").unwrap();
        assert_eq!(contract.methods[0].shape, MethodShape::CreateNamed("a".into()));
        assert_eq!(contract.methods[1].shape, MethodShape::GetNamed("b".into()));
        assert!(contract.methods[0].shape.is_create());
        assert_eq!(contract.methods[1].shape.key(), Some("b"));

        let contract = classify(&metadata, "ByName", ContractKind::Locator, "?").unwrap();
        assert_eq!(contract.methods[0].shape, MethodShape::CreateByName);
        assert_eq!(contract.methods[1].shape, MethodShape::GetByName);

        let requirements = "does not meet the requirements: is create($name), get($name), create*() or get*() and is non-static.";
        assert_eq!(
            error(&metadata, "TwoParameters", ContractKind::Locator),
            format!("[?]\nMethod TwoParameters::get() {requirements}")
        );
        assert_eq!(
            error(&metadata, "LateFailure", ContractKind::Locator),
            format!("[?]\nMethod LateFailure::find() {requirements}")
        );
        assert_eq!(
            error(&metadata, "StaticGetter", ContractKind::Locator),
            format!("[?]\nMethod StaticGetter::getA() {requirements}")
        );
        assert_eq!(
            error(&metadata, "BarePrefix", ContractKind::Locator),
            format!("[?]\nMethod BarePrefix::get() {requirements}")
        );
        assert_eq!(
            error(&metadata, "PrefixedWithParameter", ContractKind::Locator),
            format!("[?]\nMethod PrefixedWithParameter::getA() {requirements}")
        );
    }

    #[test]
    fn test_locator_counts_inherited_methods() {
        let metadata = TypeTable::from_iter([
            interface("Parent", [MethodInfo::new("getLogger").returns("Logger")]),
            interface("Child", [MethodInfo::new("createMailer").returns("Mailer")]).extends("Parent"),
        ]);

        let contract = classify(&metadata, "Child", ContractKind::Locator, "?").unwrap();
        assert_eq!(contract.to_string(), "locator Child [createMailer, getLogger]");
    }

    #[test]
    fn test_lower_first() {
        assert_eq!(lower_first("Mailer"), "mailer");
        assert_eq!(lower_first("SMTP"), "sMTP");
        assert_eq!(lower_first(""), "");
    }
}
