use alloc::{borrow::ToOwned, format, string::String, vec::Vec};
use tracing::{debug, debug_span, error};

use crate::{
    definitions::{AccessorDefinition, Definition as _, DefinitionKind, FactoryDefinition, LocatorDefinition, ServiceDefinition},
    errors::CompileErrorKind,
    metadata::TypeMetadata,
    resolver::{IndexEntry, ServiceIndex},
};

/// Ordered registry of definitions, owned by the compiler for the duration of a compile
#[derive(Debug, Default, Clone)]
pub struct ContainerBuilder {
    definitions: Vec<(String, DefinitionKind)>,
}

impl ContainerBuilder {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { definitions: Vec::new() }
    }

    /// Registers a definition. Anonymous definitions get a generated name.
    ///
    /// # Errors
    /// Returns [`CompileErrorKind::DuplicateService`] if the name is taken
    pub fn add_definition(&mut self, name: Option<&str>, definition: impl Into<DefinitionKind>) -> Result<&mut DefinitionKind, CompileErrorKind> {
        let mut definition = definition.into();
        let key = match name {
            Some(name) if self.has_definition(name) => {
                let err = CompileErrorKind::DuplicateService { name: name.to_owned() };
                error!("{}", err);
                return Err(err);
            }
            Some(name) => {
                definition.as_definition_mut().base_mut().name = Some(name.to_owned());
                name.to_owned()
            }
            None => self.anonymous_name(),
        };

        debug!(name = %key, "Definition added");
        self.definitions.push((key, definition));
        let last = self.definitions.len() - 1;
        Ok(&mut self.definitions[last].1)
    }

    /// # Errors
    /// Returns [`CompileErrorKind::DuplicateService`] if the name is taken
    pub fn add_service(&mut self, name: Option<&str>) -> Result<&mut ServiceDefinition, CompileErrorKind> {
        match self.add_definition(name, ServiceDefinition::new())? {
            DefinitionKind::Service(definition) => Ok(definition),
            incorrect_kind => unreachable!("Incorrect definition kind: {incorrect_kind:#?}"),
        }
    }

    /// # Errors
    /// Returns [`CompileErrorKind::DuplicateService`] if the name is taken
    pub fn add_factory(&mut self, name: Option<&str>) -> Result<&mut FactoryDefinition, CompileErrorKind> {
        match self.add_definition(name, FactoryDefinition::new())? {
            DefinitionKind::Factory(definition) => Ok(definition),
            incorrect_kind => unreachable!("Incorrect definition kind: {incorrect_kind:#?}"),
        }
    }

    /// # Errors
    /// Returns [`CompileErrorKind::DuplicateService`] if the name is taken
    pub fn add_accessor(&mut self, name: Option<&str>) -> Result<&mut AccessorDefinition, CompileErrorKind> {
        match self.add_definition(name, AccessorDefinition::new())? {
            DefinitionKind::Accessor(definition) => Ok(definition),
            incorrect_kind => unreachable!("Incorrect definition kind: {incorrect_kind:#?}"),
        }
    }

    /// # Errors
    /// Returns [`CompileErrorKind::DuplicateService`] if the name is taken
    pub fn add_locator(&mut self, name: Option<&str>) -> Result<&mut LocatorDefinition, CompileErrorKind> {
        match self.add_definition(name, LocatorDefinition::new())? {
            DefinitionKind::Locator(definition) => Ok(definition),
            incorrect_kind => unreachable!("Incorrect definition kind: {incorrect_kind:#?}"),
        }
    }

    /// Definitions with their registry names, in registration order
    #[inline]
    pub fn definitions(&self) -> impl Iterator<Item = (&str, &DefinitionKind)> {
        self.definitions.iter().map(|(name, definition)| (name.as_str(), definition))
    }

    #[inline]
    pub fn definitions_mut(&mut self) -> impl Iterator<Item = (&str, &mut DefinitionKind)> {
        self.definitions.iter_mut().map(|(name, definition)| (name.as_str(), definition))
    }

    #[inline]
    #[must_use]
    pub fn definition(&self, name: &str) -> Option<&DefinitionKind> {
        self.definitions.iter().find(|(key, _)| key == name).map(|(_, definition)| definition)
    }

    #[inline]
    pub fn definition_mut(&mut self, name: &str) -> Option<&mut DefinitionKind> {
        self.definitions.iter_mut().find(|(key, _)| key == name).map(|(_, definition)| definition)
    }

    #[inline]
    #[must_use]
    pub fn has_definition(&self, name: &str) -> bool {
        self.definitions.iter().any(|(key, _)| key == name)
    }

    pub fn remove_definition(&mut self, name: &str) -> Option<DefinitionKind> {
        let position = self.definitions.iter().position(|(key, _)| key == name)?;
        Some(self.definitions.remove(position).1)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Snapshot of names, types, tags and autowiring of the current definitions
    #[must_use]
    pub fn index<'m, M>(&self, metadata: &'m M) -> ServiceIndex<'m, M>
    where
        M: TypeMetadata + ?Sized,
    {
        let entries = self
            .definitions
            .iter()
            .map(|(name, definition)| {
                let definition = definition.as_definition();
                IndexEntry {
                    name: name.clone(),
                    type_name: definition.type_name().map(ToOwned::to_owned),
                    autowired: definition.is_autowired(),
                    tags: definition.tags().clone(),
                }
            })
            .collect();
        ServiceIndex::new(entries, metadata)
    }

    /// Resolves the type of every definition, in registration order
    ///
    /// # Errors
    /// Returns the first [`CompileErrorKind`] raised by a definition
    pub fn resolve<M>(&mut self, metadata: &M) -> Result<(), CompileErrorKind>
    where
        M: TypeMetadata + ?Sized,
    {
        for (name, definition) in &mut self.definitions {
            let span = debug_span!("resolve", service = %name);
            let _guard = span.enter();

            definition.resolve_type(metadata)?;
        }
        Ok(())
    }

    /// Completes every definition against a snapshot taken before the first one is modified
    ///
    /// # Errors
    /// Returns the first [`CompileErrorKind`] raised by a definition
    pub fn complete<M>(&mut self, metadata: &M) -> Result<(), CompileErrorKind>
    where
        M: TypeMetadata + ?Sized,
    {
        let index = self.index(metadata);
        for (name, definition) in &mut self.definitions {
            let span = debug_span!("complete", service = %name);
            let _guard = span.enter();

            definition.complete(&index)?;
            debug!("Completed");
        }
        Ok(())
    }

    fn anonymous_name(&self) -> String {
        (self.definitions.len() + 1..)
            .map(|counter| format!("{counter:02}"))
            .find(|name| !self.has_definition(name))
            .unwrap_or_default()
    }
}
