use alloc::format;
use tracing::debug;

use super::{factory::returned_class, missing_type, Definition, DefinitionBase};
use crate::{
    contract::{classify, Contract, ContractKind},
    errors::{CompileErrorKind, ConfigurationErrorKind},
    metadata::TypeMetadata,
    reference::Reference,
    resolver::{ServiceIndex, ServiceRegistry as _},
};

/// Implementation of an interface with a single `get()` method returning another service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessorDefinition {
    base: DefinitionBase,
    reference: Option<Reference>,
}

impl AccessorDefinition {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the implemented interface after checking its shape
    ///
    /// # Errors
    /// Returns [`ConfigurationErrorKind`] if the interface isn't a valid accessor interface
    pub fn set_implement<M>(&mut self, interface: &str, metadata: &M) -> Result<&mut Self, ConfigurationErrorKind>
    where
        M: TypeMetadata + ?Sized,
    {
        let contract = classify(metadata, interface, ContractKind::Accessor, self.descriptor())?;
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
        Ok(classify(metadata, interface, ContractKind::Accessor, self.descriptor())?)
    }

    /// `@name` refers to a service by name, anything else by type
    #[inline]
    pub fn set_reference(&mut self, reference: impl Into<Reference>) -> &mut Self {
        self.reference = Some(reference.into());
        self
    }

    #[inline]
    #[must_use]
    pub const fn reference(&self) -> Option<&Reference> {
        self.reference.as_ref()
    }

    pub(crate) fn resolve_type<M>(&mut self, metadata: &M) -> Result<(), CompileErrorKind>
    where
        M: TypeMetadata + ?Sized,
    {
        self.contract(metadata).map(|_| ())
    }

    /// Derives the reference from the return type of `get()` if it isn't set, then normalizes it
    pub(crate) fn complete<M>(&mut self, index: &ServiceIndex<'_, M>) -> Result<(), CompileErrorKind>
    where
        M: TypeMetadata + ?Sized,
    {
        let reference = match &self.reference {
            Some(reference) => reference.clone(),
            None => {
                let contract = self.contract(index.metadata())?;
                let method = format!("{}::get", contract.interface);
                let class = returned_class(index.metadata(), contract.methods[0].return_type.as_ref(), &method, self.descriptor())?;
                debug!(accessor = self.descriptor(), %class, "Reference taken from get()");
                Reference::by_type(&class)
            }
        };
        self.reference = Some(index.normalize_reference(&reference)?);
        Ok(())
    }
}

impl Definition for AccessorDefinition {
    #[inline]
    fn base(&self) -> &DefinitionBase {
        &self.base
    }

    #[inline]
    fn base_mut(&mut self) -> &mut DefinitionBase {
        &mut self.base
    }
}
