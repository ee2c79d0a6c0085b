//! Pass filling the setup of services tagged for injection with calls of their `inject*()` methods and
//! assignments of their injectable properties.

use alloc::{
    borrow::ToOwned,
    collections::BTreeMap,
    format,
    string::String,
    vec::Vec,
};
use core::cmp::Reverse;
use tracing::{debug, debug_span, error};

use crate::{
    config::Config,
    definitions::{Definition as _, ServiceDefinition},
    errors::{CompileErrorKind, ConfigurationErrorKind, MissingServiceErrorKind},
    metadata::{TypeHint, TypeMetadata},
    pass::CompilerPass,
    reference::Reference,
    registry::ContainerBuilder,
    resolver::{ServiceIndex, ServiceRegistry},
    statement::{Entity, Statement, Value},
};

const INJECT_PREFIX: &str = "inject";

#[derive(Debug, Clone, Copy, Default)]
pub struct InjectPass {
    config: Config,
}

impl InjectPass {
    #[inline]
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl<M> CompilerPass<M> for InjectPass
where
    M: TypeMetadata + ?Sized,
{
    #[inline]
    fn name(&self) -> &'static str {
        "inject"
    }

    fn before_compile(&mut self, builder: &mut ContainerBuilder, metadata: &M) -> Result<(), CompileErrorKind> {
        let index = builder.index(metadata);
        let config = self.config;

        for (name, definition) in builder.definitions_mut() {
            if !definition.as_definition().tag(config.inject_tag).is_some_and(Value::is_truthy) {
                continue;
            }
            let Some(service) = definition.service_mut() else {
                continue;
            };

            let span = debug_span!("inject", service = name);
            let _guard = span.enter();

            update_definition(service, &index, config)?;
        }
        Ok(())
    }
}

fn update_definition<M>(service: &mut ServiceDefinition, index: &ServiceIndex<'_, M>, config: Config) -> Result<(), CompileErrorKind>
where
    M: TypeMetadata + ?Sized,
{
    let metadata = index.metadata();
    let Some(declared) = service.type_name().map(ToOwned::to_owned) else {
        return Ok(());
    };
    let class = service
        .creator()
        .and_then(|creator| index.resolve_entity_type(creator))
        .filter(|created| metadata.is_subclass_of(created, &declared))
        .unwrap_or(declared);

    let mut setup = service.setup().to_vec();

    for (property, type_name) in inject_properties(metadata, &class)? {
        let entity = Entity::Property(Reference::this(), property.clone());
        let statement = match take_statement(&mut setup, &entity) {
            Some(configured) => configured,
            None => {
                let qualified = metadata
                    .properties(&class)
                    .into_iter()
                    .find(|info| info.name == property)
                    .map_or_else(|| format!("{class}::${property}"), |info| info.qualified_name());
                let Some(type_name) = type_name else {
                    let err = ConfigurationErrorKind::PropertyHasNoType { property: qualified };
                    error!("{}", err);
                    return Err(err.into());
                };
                if config.check_inject_types {
                    check_type(metadata, &qualified, Some(type_name.as_str()), Some(index))?;
                }
                Statement::assign(&property, Reference::by_type(&type_name))
            }
        };
        debug!(%property, "Inject property added");
        setup.insert(0, statement);
    }

    for method in inject_methods(metadata, &class).into_iter().rev() {
        let entity = Entity::Method(Reference::this(), method.clone());
        let statement = take_statement(&mut setup, &entity).unwrap_or_else(|| Statement::call(&method));
        debug!(%method, "Inject method added");
        setup.insert(0, statement);
    }

    service.set_setup(setup);
    Ok(())
}

/// Removes the statement configured for the entity, keeping the last one if there are several
fn take_statement(setup: &mut Vec<Statement>, entity: &Entity) -> Option<Statement> {
    let mut taken = None;
    setup.retain(|statement| {
        if &statement.entity == entity {
            taken = Some(statement.clone());
            false
        } else {
            true
        }
    });
    taken
}

/// Public `inject*()` methods of the class, methods of an ancestor before those of its descendants,
/// declaration order otherwise
#[must_use]
pub fn inject_methods<M>(metadata: &M, class: &str) -> Vec<String>
where
    M: TypeMetadata + ?Sized,
{
    let ancestors: Vec<&str> = metadata.ancestors(class).iter().map(|ancestor| ancestor.name.as_str()).collect();
    let mut methods: Vec<_> = metadata
        .methods(class)
        .into_iter()
        .filter(|method| method.is_public && method.name.starts_with(INJECT_PREFIX))
        .map(|method| {
            let depth = ancestors
                .iter()
                .position(|ancestor| *ancestor == method.declaring_class)
                .unwrap_or_default();
            (depth, method.name.clone())
        })
        .collect();

    methods.sort_by_key(|(depth, _)| Reverse(*depth));
    methods.into_iter().map(|(_, name)| name).collect()
}

/// Properties marked for injection with the class they require, sorted by name
///
/// # Errors
/// - Returns [`ConfigurationErrorKind::InjectPropertyModifiers`] for a static, readonly or non-public property
/// - Returns [`ConfigurationErrorKind::InjectPropertyComplexType`] for a union, nullable or built-in type
pub fn inject_properties<M>(metadata: &M, class: &str) -> Result<BTreeMap<String, Option<String>>, ConfigurationErrorKind>
where
    M: TypeMetadata + ?Sized,
{
    let mut properties = BTreeMap::new();
    for property in metadata.properties(class) {
        if !property.is_injected() {
            continue;
        }
        if property.is_static || property.is_readonly || !property.is_public {
            let err = ConfigurationErrorKind::InjectPropertyModifiers {
                property: property.qualified_name(),
            };
            error!("{}", err);
            return Err(err);
        }

        let annotated = property
            .var_annotation
            .as_deref()
            .filter(|_| !property.inject_attribute)
            .and_then(TypeHint::parse);
        let type_hint = property.type_hint.clone().or(annotated);
        let type_name = match type_hint {
            Some(type_hint) if type_hint.is_nullable() || !type_hint.is_class() => {
                let err = ConfigurationErrorKind::InjectPropertyComplexType {
                    property: property.qualified_name(),
                    type_hint,
                };
                error!("{}", err);
                return Err(err);
            }
            Some(type_hint) => type_hint.single_name().map(ToOwned::to_owned),
            None => None,
        };
        properties.insert(property.name.clone(), type_name);
    }
    Ok(properties)
}

/// Checks that an injected property has a type naming a known class. With a registry, a service of
/// that type must also be registered.
///
/// # Errors
/// - Returns [`ConfigurationErrorKind::PropertyHasNoType`] or [`ConfigurationErrorKind::PropertyClassNotFound`]
/// - Returns [`MissingServiceErrorKind::ServiceOfTypeNotFound`] if the registry has no such service
pub fn check_type<M, R>(metadata: &M, property: &str, type_name: Option<&str>, registry: Option<&R>) -> Result<(), CompileErrorKind>
where
    M: TypeMetadata + ?Sized,
    R: ServiceRegistry + ?Sized,
{
    let result: Result<(), CompileErrorKind> = match type_name {
        None => Err(ConfigurationErrorKind::PropertyHasNoType {
            property: property.to_owned(),
        }
        .into()),
        Some(type_name) if !metadata.exists(type_name) => Err(ConfigurationErrorKind::PropertyClassNotFound {
            class: type_name.to_owned(),
            property: property.to_owned(),
        }
        .into()),
        Some(type_name) if registry.is_some_and(|registry| registry.find_by_type(type_name).is_empty()) => {
            Err(MissingServiceErrorKind::ServiceOfTypeNotFound {
                type_name: type_name.to_owned(),
                required_by: property.to_owned(),
            }
            .into())
        }
        Some(_) => Ok(()),
    };
    if let Err(err) = &result {
        error!("{}", err);
    }
    result
}
