use alloc::{borrow::ToOwned, collections::BTreeMap, string::String, vec::Vec};
use tracing::error;

use crate::{
    errors::ResolveErrorKind,
    metadata::{MethodInfo, TypeMetadata},
    reference::Reference,
    statement::{Entity, Statement, Value},
};

/// Read access to the registered services, used to turn references into canonical ones.
///
/// The build-time [`ServiceIndex`] implements it, and so can a live container, which is why
/// [`crate::check_type`] accepts any implementation.
pub trait ServiceRegistry {
    fn has_definition(&self, name: &str) -> bool;

    fn definition_type(&self, name: &str) -> Option<&str>;

    /// Names of autowired services of the given type or its subtypes, in registration order
    fn find_by_type(&self, type_name: &str) -> Vec<String>;

    /// Names of services carrying the tag together with the tag value, in registration order
    fn find_by_tag(&self, tag: &str) -> Vec<(String, Value)>;

    /// Name of the only service of the type.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::MultipleServicesOfType`] if the type is ambiguous
    /// - Returns [`ResolveErrorKind::NoServiceOfType`] if there is no such service and `required` is set
    fn get_by_type(&self, type_name: &str, required: bool) -> Result<Option<String>, ResolveErrorKind> {
        let mut names = self.find_by_type(type_name);
        match names.len() {
            0 if required => Err(ResolveErrorKind::NoServiceOfType {
                type_name: type_name.to_owned(),
            }),
            0 => Ok(None),
            1 => Ok(names.pop()),
            _ => Err(ResolveErrorKind::MultipleServicesOfType {
                type_name: type_name.to_owned(),
                names,
            }),
        }
    }

    /// Checks that a named reference points to a registered service and turns a reference by type
    /// into a reference by name. `@self` is kept as is.
    ///
    /// # Errors
    /// Returns [`ResolveErrorKind`] if the service is missing or the type is ambiguous
    fn normalize_reference(&self, reference: &Reference) -> Result<Reference, ResolveErrorKind> {
        let result = match reference {
            Reference::Name(_) if reference.is_self() => Ok(reference.clone()),
            Reference::Name(name) if self.has_definition(name) => Ok(reference.clone()),
            Reference::Name(name) => Err(ResolveErrorKind::MissingReference { name: name.clone() }),
            Reference::Type(type_name) => self.get_by_type(type_name, true).and_then(|name| {
                name.map(Reference::Name).ok_or_else(|| ResolveErrorKind::NoServiceOfType {
                    type_name: type_name.clone(),
                })
            }),
        };
        if let Err(err) = &result {
            error!("{}", err);
        }
        result
    }
}

#[derive(Debug, Clone)]
pub(crate) struct IndexEntry {
    pub(crate) name: String,
    pub(crate) type_name: Option<String>,
    pub(crate) autowired: bool,
    pub(crate) tags: BTreeMap<String, Value>,
}

/// Snapshot of the registered services, taken before a pass mutates the definitions
pub struct ServiceIndex<'m, M: ?Sized> {
    entries: Vec<IndexEntry>,
    metadata: &'m M,
}

impl<'m, M> ServiceIndex<'m, M>
where
    M: TypeMetadata + ?Sized,
{
    #[inline]
    #[must_use]
    pub(crate) fn new(entries: Vec<IndexEntry>, metadata: &'m M) -> Self {
        Self { entries, metadata }
    }

    #[inline]
    #[must_use]
    pub fn metadata(&self) -> &'m M {
        self.metadata
    }

    /// Type produced by a creator statement, if it can be determined
    #[must_use]
    pub fn resolve_entity_type(&self, statement: &Statement) -> Option<String> {
        match &statement.entity {
            Entity::Class(class) => Some(class.clone()),
            Entity::Reference(reference) => self.reference_type(reference),
            Entity::Method(target, method) => {
                let class = self.reference_type(target)?;
                self.metadata
                    .method(&class, method)
                    .and_then(MethodInfo::resolved_return_type)
                    .and_then(|type_hint| type_hint.single_name().map(ToOwned::to_owned))
            }
            Entity::Property(..) => None,
        }
    }

    fn reference_type(&self, reference: &Reference) -> Option<String> {
        match reference {
            Reference::Name(name) => self.definition_type(name).map(ToOwned::to_owned),
            Reference::Type(type_name) => Some(type_name.clone()),
        }
    }
}

impl<M> ServiceRegistry for ServiceIndex<'_, M>
where
    M: TypeMetadata + ?Sized,
{
    fn has_definition(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    fn definition_type(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .and_then(|entry| entry.type_name.as_deref())
    }

    fn find_by_type(&self, type_name: &str) -> Vec<String> {
        let type_name = type_name.trim_start_matches('\\');
        self.entries
            .iter()
            .filter(|entry| entry.autowired)
            .filter(|entry| {
                entry
                    .type_name
                    .as_deref()
                    .is_some_and(|entry_type| self.metadata.is_a(entry_type, type_name))
            })
            .map(|entry| entry.name.clone())
            .collect()
    }

    fn find_by_tag(&self, tag: &str) -> Vec<(String, Value)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.tags.get(tag).map(|value| (entry.name.clone(), value.clone())))
            .collect()
    }
}
