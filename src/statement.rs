use alloc::{borrow::ToOwned as _, string::String, vec::Vec};

use crate::{errors::ResolveErrorKind, reference::Reference, resolver::ServiceRegistry};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Reference(Reference),
    /// Parameter of the generated method, passed through unchanged
    Parameter(String),
    List(Vec<Value>),
}

impl Value {
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(value) => *value,
            Value::Int(value) => *value != 0,
            Value::Float(value) => *value != 0.0,
            Value::String(value) => !value.is_empty() && value != "0",
            Value::Reference(_) | Value::Parameter(_) => true,
            Value::List(values) => !values.is_empty(),
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn normalize_references<R: ServiceRegistry + ?Sized>(&mut self, registry: &R) -> Result<(), ResolveErrorKind> {
        match self {
            Value::Reference(reference) => {
                *reference = registry.normalize_reference(reference)?;
            }
            Value::List(values) => {
                for value in values {
                    value.normalize_references(registry)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    #[inline]
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Reference> for Value {
    #[inline]
    fn from(value: Reference) -> Self {
        Value::Reference(value)
    }
}

/// What a statement creates, calls or assigns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    /// `new Class(...)`
    Class(String),
    /// Another service, used as a creator
    Reference(Reference),
    /// `target->method(...)`, or a static factory method when the target is a type
    Method(Reference, String),
    /// `target->$property = ...`
    Property(Reference, String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Positional(Value),
    Named(String, Value),
}

impl Argument {
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Argument::Positional(_) => None,
            Argument::Named(name, _) => Some(name),
        }
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> &Value {
        match self {
            Argument::Positional(value) | Argument::Named(_, value) => value,
        }
    }

    #[inline]
    fn value_mut(&mut self) -> &mut Value {
        match self {
            Argument::Positional(value) | Argument::Named(_, value) => value,
        }
    }
}

impl From<Value> for Argument {
    #[inline]
    fn from(value: Value) -> Self {
        Argument::Positional(value)
    }
}

impl From<Reference> for Argument {
    #[inline]
    fn from(value: Reference) -> Self {
        Argument::Positional(Value::Reference(value))
    }
}

/// Creator or setup action of a service
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub entity: Entity,
    pub arguments: Vec<Argument>,
}

impl Statement {
    #[inline]
    #[must_use]
    pub const fn new(entity: Entity) -> Self {
        Self {
            entity,
            arguments: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn class(name: &str) -> Self {
        Self::new(Entity::Class(name.trim_start_matches('\\').to_owned()))
    }

    /// Call of a method on the service being configured
    #[inline]
    #[must_use]
    pub fn call(method: &str) -> Self {
        Self::new(Entity::Method(Reference::this(), method.to_owned()))
    }

    /// Assignment of a property on the service being configured
    #[inline]
    #[must_use]
    pub fn assign(property: &str, value: impl Into<Value>) -> Self {
        Self::new(Entity::Property(Reference::this(), property.to_owned())).argument(Argument::Positional(value.into()))
    }

    #[inline]
    #[must_use]
    pub fn argument(mut self, argument: impl Into<Argument>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn named_argument(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.arguments.push(Argument::Named(name.to_owned(), value.into()));
        self
    }

    /// Normalizes references to services. Static factory targets (`Type::method`) are left as they are.
    pub(crate) fn normalize_references<R: ServiceRegistry + ?Sized>(&mut self, registry: &R) -> Result<(), ResolveErrorKind> {
        match &mut self.entity {
            Entity::Reference(reference) => {
                *reference = registry.normalize_reference(reference)?;
            }
            Entity::Method(target, _) | Entity::Property(target, _) if target.is_name() => {
                *target = registry.normalize_reference(target)?;
            }
            _ => {}
        }
        for argument in &mut self.arguments {
            argument.value_mut().normalize_references(registry)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Argument, Entity, Statement, Value};
    use crate::reference::Reference;

    #[test]
    fn test_truthy() {
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::from("yes").is_truthy());
        assert!(!Value::from("0").is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Int(0).is_truthy());
    }

    #[test]
    fn test_statement_builders() {
        let statement = Statement::call("injectLogger").argument(Reference::by_type("Logger"));
        assert_eq!(statement.entity, Entity::Method(Reference::this(), "injectLogger".into()));
        assert_eq!(
            statement.arguments,
            [Argument::Positional(Value::Reference(Reference::by_type("Logger")))]
        );

        let statement = Statement::assign("cache", Reference::by_name("cache"));
        assert_eq!(statement.entity, Entity::Property(Reference::this(), "cache".into()));
        assert_eq!(statement.arguments[0].value(), &Value::Reference(Reference::by_name("cache")));

        let statement = Statement::class("\\Mailer").named_argument("host", "localhost");
        assert_eq!(statement.entity, Entity::Class("Mailer".into()));
        assert_eq!(statement.arguments[0].name(), Some("host"));
    }
}
