mod accessor;
mod factory;
mod locator;
mod service;

pub use accessor::AccessorDefinition;
pub use factory::{FactoryDefinition, Parameters};
pub use locator::LocatorDefinition;
pub use service::ServiceDefinition;

use alloc::{borrow::ToOwned, collections::BTreeMap, string::String};

use crate::{
    errors::{CompileErrorKind, ServiceCreationErrorKind},
    metadata::TypeMetadata,
    resolver::ServiceIndex,
    statement::Value,
};

const ANONYMOUS: &str = "?";

/// State shared by every kind of definition
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionBase {
    pub(crate) name: Option<String>,
    pub(crate) type_name: Option<String>,
    pub(crate) tags: BTreeMap<String, Value>,
    pub(crate) autowired: bool,
}

impl Default for DefinitionBase {
    fn default() -> Self {
        Self {
            name: None,
            type_name: None,
            tags: BTreeMap::new(),
            autowired: true,
        }
    }
}

pub trait Definition {
    fn base(&self) -> &DefinitionBase;

    fn base_mut(&mut self) -> &mut DefinitionBase;

    #[inline]
    fn name(&self) -> Option<&str> {
        self.base().name.as_deref()
    }

    #[inline]
    fn set_name(&mut self, name: Option<&str>) -> &mut Self
    where
        Self: Sized,
    {
        self.base_mut().name = name.map(ToOwned::to_owned);
        self
    }

    /// Name used in diagnostics, `?` for anonymous definitions
    #[inline]
    fn descriptor(&self) -> &str {
        self.name().unwrap_or(ANONYMOUS)
    }

    #[inline]
    fn type_name(&self) -> Option<&str> {
        self.base().type_name.as_deref()
    }

    #[inline]
    fn tags(&self) -> &BTreeMap<String, Value> {
        &self.base().tags
    }

    #[inline]
    fn tag(&self, name: &str) -> Option<&Value> {
        self.base().tags.get(name)
    }

    #[inline]
    fn add_tag(&mut self, name: &str, value: impl Into<Value>) -> &mut Self
    where
        Self: Sized,
    {
        self.base_mut().tags.insert(name.to_owned(), value.into());
        self
    }

    #[inline]
    fn is_autowired(&self) -> bool {
        self.base().autowired
    }

    #[inline]
    fn set_autowired(&mut self, autowired: bool) -> &mut Self
    where
        Self: Sized,
    {
        self.base_mut().autowired = autowired;
        self
    }
}

/// Definition as stored by [`crate::ContainerBuilder`]
#[derive(Debug, Clone, PartialEq)]
pub enum DefinitionKind {
    Service(ServiceDefinition),
    Factory(FactoryDefinition),
    Accessor(AccessorDefinition),
    Locator(LocatorDefinition),
}

impl DefinitionKind {
    #[must_use]
    pub fn as_definition(&self) -> &dyn Definition {
        match self {
            DefinitionKind::Service(definition) => definition,
            DefinitionKind::Factory(definition) => definition,
            DefinitionKind::Accessor(definition) => definition,
            DefinitionKind::Locator(definition) => definition,
        }
    }

    #[must_use]
    pub fn as_definition_mut(&mut self) -> &mut dyn Definition {
        match self {
            DefinitionKind::Service(definition) => definition,
            DefinitionKind::Factory(definition) => definition,
            DefinitionKind::Accessor(definition) => definition,
            DefinitionKind::Locator(definition) => definition,
        }
    }

    /// Definition whose setup describes the created service: the service itself, or a factory's result
    #[must_use]
    pub fn service_mut(&mut self) -> Option<&mut ServiceDefinition> {
        match self {
            DefinitionKind::Service(definition) => Some(definition),
            DefinitionKind::Factory(definition) => Some(definition.result_definition_mut()),
            DefinitionKind::Accessor(_) | DefinitionKind::Locator(_) => None,
        }
    }

    pub(crate) fn resolve_type<M>(&mut self, metadata: &M) -> Result<(), CompileErrorKind>
    where
        M: TypeMetadata + ?Sized,
    {
        match self {
            DefinitionKind::Service(definition) => definition.resolve_type(metadata).map_err(Into::into),
            DefinitionKind::Factory(definition) => definition.resolve_type(metadata),
            DefinitionKind::Accessor(definition) => definition.resolve_type(metadata),
            DefinitionKind::Locator(definition) => definition.resolve_type(metadata),
        }
    }

    pub(crate) fn complete<M>(&mut self, index: &ServiceIndex<'_, M>) -> Result<(), CompileErrorKind>
    where
        M: TypeMetadata + ?Sized,
    {
        match self {
            DefinitionKind::Service(definition) => definition.complete(index).map_err(Into::into),
            DefinitionKind::Factory(definition) => definition.complete(index),
            DefinitionKind::Accessor(definition) => definition.complete(index),
            DefinitionKind::Locator(definition) => definition.complete(index),
        }
    }
}

impl From<ServiceDefinition> for DefinitionKind {
    #[inline]
    fn from(value: ServiceDefinition) -> Self {
        DefinitionKind::Service(value)
    }
}

impl From<FactoryDefinition> for DefinitionKind {
    #[inline]
    fn from(value: FactoryDefinition) -> Self {
        DefinitionKind::Factory(value)
    }
}

impl From<AccessorDefinition> for DefinitionKind {
    #[inline]
    fn from(value: AccessorDefinition) -> Self {
        DefinitionKind::Accessor(value)
    }
}

impl From<LocatorDefinition> for DefinitionKind {
    #[inline]
    fn from(value: LocatorDefinition) -> Self {
        DefinitionKind::Locator(value)
    }
}

/// Error for a definition whose type was never set
#[inline]
fn missing_type(descriptor: &str) -> ServiceCreationErrorKind {
    ServiceCreationErrorKind::MissingType {
        descriptor: descriptor.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::{Definition as _, DefinitionKind, ServiceDefinition};
    use crate::statement::Value;

    #[test]
    fn test_common_state() {
        let mut definition = ServiceDefinition::new();
        assert_eq!(definition.descriptor(), "?");
        assert!(definition.is_autowired());

        definition.set_name(Some("mailer")).add_tag("inject", true).set_autowired(false);
        assert_eq!(definition.descriptor(), "mailer");
        assert_eq!(definition.tag("inject"), Some(&Value::Bool(true)));
        assert!(!definition.is_autowired());

        let kind = DefinitionKind::from(definition);
        assert_eq!(kind.as_definition().name(), Some("mailer"));
    }
}
