use alloc::{
    borrow::ToOwned,
    format,
    string::{String, ToString as _},
    vec::Vec,
};
use core::fmt::{self, Display, Formatter};
use tracing::{debug, error};

use super::{missing_type, Definition, DefinitionBase, ServiceDefinition};
use crate::{
    contract::{classify, Contract, ContractKind},
    errors::{CompileErrorKind, ConfigurationErrorKind, ServiceCreationErrorKind},
    metadata::{ParameterInfo, TypeHint, TypeMetadata},
    resolver::ServiceIndex,
    statement::{Argument, Value},
};

/// Parameters of a factory's `create()` method with their default values, in declaration order.
/// `None` marks a required parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters(Vec<(String, Option<Value>)>);

impl Parameters {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Option<Value>> {
        self.0.iter().find(|(key, _)| key == name).map(|(_, value)| value)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Sets the default of a parameter, keeping its position if it's already present
    pub fn insert(&mut self, name: &str, default: Option<Value>) {
        match self.0.iter_mut().find(|(key, _)| key == name) {
            Some((_, value)) => *value = default,
            None => self.0.push((name.to_owned(), default)),
        }
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_ref()))
    }

    /// Names in declaration order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|(name, _)| name.to_string()).collect()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Parameters
where
    K: AsRef<str>,
    V: Into<Option<Value>>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut parameters = Self::new();
        for (name, default) in iter {
            parameters.insert(name.as_ref(), default.into());
        }
        parameters
    }
}

/// Implementation of an interface with a single `create()` method, producing the result definition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactoryDefinition {
    base: DefinitionBase,
    parameters: Parameters,
    result_definition: Option<ServiceDefinition>,
}

impl FactoryDefinition {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the implemented interface after checking its shape
    ///
    /// # Errors
    /// Returns [`ConfigurationErrorKind`] if the interface isn't a valid factory interface
    pub fn set_implement<M>(&mut self, interface: &str, metadata: &M) -> Result<&mut Self, ConfigurationErrorKind>
    where
        M: TypeMetadata + ?Sized,
    {
        let contract = classify(metadata, interface, ContractKind::Factory, self.descriptor())?;
        self.base.type_name = Some(contract.interface);
        Ok(self)
    }

    #[inline]
    #[must_use]
    pub fn implement(&self) -> Option<&str> {
        self.type_name()
    }

    /// Contract of the implemented interface, classified again on every call
    ///
    /// # Errors
    /// Returns [`CompileErrorKind`] if the interface is unset or invalid
    pub fn contract<M>(&self, metadata: &M) -> Result<Contract, CompileErrorKind>
    where
        M: TypeMetadata + ?Sized,
    {
        let interface = self.type_name().ok_or_else(|| missing_type(self.descriptor()))?;
        Ok(classify(metadata, interface, ContractKind::Factory, self.descriptor())?)
    }

    #[inline]
    pub fn set_parameters(&mut self, parameters: Parameters) -> &mut Self {
        self.parameters = parameters;
        self
    }

    #[inline]
    #[must_use]
    pub const fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    #[inline]
    #[must_use]
    pub const fn result_definition(&self) -> Option<&ServiceDefinition> {
        self.result_definition.as_ref()
    }

    /// Definition of the created service, created empty on first access
    #[inline]
    pub fn result_definition_mut(&mut self) -> &mut ServiceDefinition {
        self.result_definition.get_or_insert_with(ServiceDefinition::new)
    }

    /// Type of the created service, `None` until the result definition has one
    #[inline]
    #[must_use]
    pub fn result_type(&self) -> Option<&str> {
        self.result_definition.as_ref().and_then(Definition::type_name)
    }

    pub(crate) fn resolve_type<M>(&mut self, metadata: &M) -> Result<(), CompileErrorKind>
    where
        M: TypeMetadata + ?Sized,
    {
        let contract = self.contract(metadata)?;
        let descriptor = self.descriptor().to_owned();
        let name = self.base.name.clone();

        let result = self.result_definition_mut();
        result.set_name(name.as_deref());
        if result.type_name().is_none() && result.creator().is_none() {
            let create = &contract.methods[0];
            let method = format!("{}::create", contract.interface);
            let class = returned_class(metadata, create.return_type.as_ref(), &method, &descriptor)?;
            debug!(factory = %descriptor, %class, "Result type taken from create()");
            result.set_type(Some(&class));
        }
        Ok(result.resolve_type(metadata)?)
    }

    /// Binds the `create()` parameters to the result constructor and adds the missing ones to the parameters
    pub(crate) fn complete<M>(&mut self, index: &ServiceIndex<'_, M>) -> Result<(), CompileErrorKind>
    where
        M: TypeMetadata + ?Sized,
    {
        let metadata = index.metadata();
        let contract = self.contract(metadata)?;
        let descriptor = self.descriptor().to_owned();
        let interface = contract.interface.as_str();

        let result = self.result_definition.get_or_insert_with(ServiceDefinition::new);
        let class = result.type_name().map(ToOwned::to_owned);
        let constructor = class.as_deref().and_then(|class| metadata.constructor(class)).unwrap_or_default();

        for parameter in &contract.methods[0].parameters {
            match constructor.iter().enumerate().find(|(_, candidate)| candidate.name == parameter.name) {
                Some((position, constructor_parameter)) => {
                    if !is_compatible(metadata, parameter, constructor_parameter) {
                        let err = ServiceCreationErrorKind::ParameterTypeMismatch {
                            descriptor,
                            parameter: parameter.name.clone(),
                            interface: interface.to_owned(),
                            class: class.unwrap_or_default(),
                        };
                        error!("{}", err);
                        return Err(err.into());
                    }
                    if let Some(creator) = result.creator_mut() {
                        bind_parameter(&mut creator.arguments, position, &parameter.name);
                    }
                }
                None if result.setup().is_empty() => {
                    let err = ServiceCreationErrorKind::UnusedParameter {
                        descriptor,
                        parameter: parameter.name.clone(),
                        interface: interface.to_owned(),
                    };
                    error!("{}", err);
                    return Err(err.into());
                }
                None => {}
            }

            if !self.parameters.contains(&parameter.name) {
                debug!(factory = %descriptor, parameter = %parameter.name, "Parameter added");
                self.parameters.insert(&parameter.name, parameter.default.clone());
            }
        }

        Ok(result.complete(index)?)
    }
}

/// Passes the `create()` parameter to the constructor slot at `position`. A positional argument already in
/// that slot is replaced, a named one is kept.
fn bind_parameter(arguments: &mut Vec<Argument>, position: usize, name: &str) {
    if arguments.iter().any(|argument| argument.name() == Some(name)) {
        return;
    }
    let value = Value::Parameter(name.to_owned());
    match arguments.iter_mut().filter(|argument| argument.name().is_none()).nth(position) {
        Some(argument) => *argument = Argument::Positional(value),
        None => arguments.push(Argument::Named(name.to_owned(), value)),
    }
}

/// The class named by the return type of `method` (`Interface::name`), which must be known to `metadata`
pub(crate) fn returned_class<M>(
    metadata: &M,
    return_type: Option<&TypeHint>,
    method: &str,
    descriptor: &str,
) -> Result<String, ServiceCreationErrorKind>
where
    M: TypeMetadata + ?Sized,
{
    let result = match return_type {
        None => Err(ServiceCreationErrorKind::MissingReturnType {
            descriptor: descriptor.to_owned(),
            method: method.to_owned(),
        }),
        Some(type_hint) => match type_hint.single_name() {
            Some(class) if metadata.exists(class) => Ok(class.to_owned()),
            _ => Err(ServiceCreationErrorKind::ReturnTypeNotFound {
                descriptor: descriptor.to_owned(),
                class: type_hint.names().join("|"),
                method: method.to_owned(),
            }),
        },
    };
    if let Err(err) = &result {
        error!("{}", err);
    }
    result
}

/// The types only have to match when both the `create()` parameter and the constructor parameter declare one
fn is_compatible<M>(metadata: &M, parameter: &ParameterInfo, constructor_parameter: &ParameterInfo) -> bool
where
    M: TypeMetadata + ?Sized,
{
    match (&constructor_parameter.type_hint, &parameter.type_hint) {
        (Some(expected), Some(given)) => expected.allows(given, metadata),
        _ => true,
    }
}

impl Definition for FactoryDefinition {
    #[inline]
    fn base(&self) -> &DefinitionBase {
        &self.base
    }

    #[inline]
    fn base_mut(&mut self) -> &mut DefinitionBase {
        &mut self.base
    }
}

impl Display for Parameters {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.0.iter().map(|(name, _)| format!("${name}")).collect();
        f.write_str(&names.join(", "))
    }
}
