use alloc::{borrow::ToOwned, collections::BTreeMap, string::String};
use tracing::{debug, warn};

use super::{missing_type, Definition, DefinitionBase};
use crate::{
    contract::{classify, Contract, ContractKind},
    errors::{CompileErrorKind, ConfigurationErrorKind},
    metadata::TypeMetadata,
    reference::Reference,
    resolver::{ServiceIndex, ServiceRegistry as _},
};

/// Implementation of an interface with `create*()`/`get*()` methods, each returning a mapped service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocatorDefinition {
    base: DefinitionBase,
    references: BTreeMap<String, Reference>,
    tagged: Option<String>,
}

impl LocatorDefinition {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the implemented interface after checking its shape
    ///
    /// # Errors
    /// Returns [`ConfigurationErrorKind`] if the interface isn't a valid locator interface
    pub fn set_implement<M>(&mut self, interface: &str, metadata: &M) -> Result<&mut Self, ConfigurationErrorKind>
    where
        M: TypeMetadata + ?Sized,
    {
        let contract = classify(metadata, interface, ContractKind::Locator, self.descriptor())?;
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
        Ok(classify(metadata, interface, ContractKind::Locator, self.descriptor())?)
    }

    /// Replaces the references. Values starting with `@` refer to a service by name, others by type.
    pub fn set_references<K, R>(&mut self, references: impl IntoIterator<Item = (K, R)>) -> &mut Self
    where
        K: Into<String>,
        R: Into<Reference>,
    {
        self.references = references.into_iter().map(|(key, reference)| (key.into(), reference.into())).collect();
        self
    }

    #[inline]
    #[must_use]
    pub const fn references(&self) -> &BTreeMap<String, Reference> {
        &self.references
    }

    /// Takes the references from services carrying the tag instead of explicit ones
    #[inline]
    pub fn set_tagged(&mut self, tag: Option<&str>) -> &mut Self {
        self.tagged = tag.map(ToOwned::to_owned);
        self
    }

    #[inline]
    #[must_use]
    pub fn tagged(&self) -> Option<&str> {
        self.tagged.as_deref()
    }

    pub(crate) fn resolve_type<M>(&mut self, metadata: &M) -> Result<(), CompileErrorKind>
    where
        M: TypeMetadata + ?Sized,
    {
        self.contract(metadata).map(|_| ())
    }

    /// Collects the tagged services if a tag is set, then normalizes every reference
    pub(crate) fn complete<M>(&mut self, index: &ServiceIndex<'_, M>) -> Result<(), CompileErrorKind>
    where
        M: TypeMetadata + ?Sized,
    {
        if let Some(tag) = &self.tagged {
            self.references.clear();
            for (name, value) in index.find_by_tag(tag) {
                let key = value.as_str().map_or_else(|| name.clone(), ToOwned::to_owned);
                if let Some(previous) = self.references.insert(key.clone(), Reference::Name(name)) {
                    warn!(locator = self.base.name.as_deref().unwrap_or("?"), %key, %previous, "Duplicated tag value");
                }
            }
            debug!(%tag, references = self.references.len(), "Tagged services collected");
        }

        for reference in self.references.values_mut() {
            *reference = index.normalize_reference(reference)?;
        }
        Ok(())
    }
}

impl Definition for LocatorDefinition {
    #[inline]
    fn base(&self) -> &DefinitionBase {
        &self.base
    }

    #[inline]
    fn base_mut(&mut self) -> &mut DefinitionBase {
        &mut self.base
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::LocatorDefinition;
    use crate::{
        definitions::Definition as _,
        metadata::{ClassInfo, MethodInfo, ParameterInfo, TypeTable},
        reference::Reference,
        resolver::{IndexEntry, ServiceIndex},
        statement::Value,
    };

    use alloc::{
        borrow::ToOwned as _,
        collections::BTreeMap,
        format,
        string::{String, ToString as _},
        vec,
        vec::Vec,
    };
    use tracing_test::traced_test;

    fn metadata() -> TypeTable {
        TypeTable::from_iter([
            ClassInfo::class("stdClass"),
            ClassInfo::interface("Good").method(MethodInfo::new("createA")).method(MethodInfo::new("getB")),
            ClassInfo::interface("Bad").method(
                MethodInfo::new("get")
                    .parameter(ParameterInfo::new("arg"))
                    .parameter(ParameterInfo::new("arg2")),
            ),
        ])
    }

    fn entry(name: &str, tags: impl IntoIterator<Item = (&'static str, Value)>) -> IndexEntry {
        IndexEntry {
            name: name.to_owned(),
            type_name: Some("stdClass".to_owned()),
            autowired: false,
            tags: tags.into_iter().map(|(tag, value)| (tag.to_owned(), value)).collect(),
        }
    }

    #[test]
    #[traced_test]
    fn test_round_trips() {
        let metadata = metadata();
        let mut definition = LocatorDefinition::new();

        definition.set_implement("Good", &metadata).unwrap();
        assert_eq!(definition.implement(), Some("Good"));
        assert_eq!(
            definition.set_implement("Bad", &metadata).unwrap_err().to_string(),
            "[?]\nMethod Bad::get() does not meet the requirements: is create($name), get($name), create*() or get*() and is non-static."
        );

        definition.set_references([("a", "stdClass"), ("b", "@one")]);
        let expected = BTreeMap::from([
            ("a".to_owned(), Reference::Type("stdClass".into())),
            ("b".to_owned(), Reference::Name("one".into())),
        ]);
        assert_eq!(definition.references(), &expected);

        definition.set_tagged(Some("tagName"));
        assert_eq!(definition.tagged(), Some("tagName"));
    }

    #[test]
    #[traced_test]
    fn test_complete_tagged() {
        let metadata = metadata();
        let index = ServiceIndex::new(
            vec![
                entry("first", [("handlers", Value::from("a"))]),
                entry("second", [("handlers", Value::Bool(true))]),
                entry("third", [("handlers", Value::from("a"))]),
                entry("untagged", []),
            ],
            &metadata,
        );

        let mut definition = LocatorDefinition::new();
        definition.set_implement("Good", &metadata).unwrap();
        definition.set_references([("stale", "@untagged")]).set_tagged(Some("handlers"));
        definition.complete(&index).unwrap();

        let references: Vec<_> = definition.references().iter().map(|(key, reference)| (key.as_str(), reference.to_string())).collect();
        assert_eq!(references, [("a", "@third".to_owned()), ("second", "@second".to_owned())]);
        assert!(logs_contain("Duplicated tag value"));
    }

    #[test]
    #[traced_test]
    fn test_complete_normalizes() {
        let metadata = metadata();
        let mut one = entry("one", []);
        one.autowired = true;
        let index = ServiceIndex::new(vec![one], &metadata);

        let mut definition = LocatorDefinition::new();
        definition.set_implement("Good", &metadata).unwrap();
        definition.set_references([("a", "stdClass"), ("b", "@one")]);
        definition.complete(&index).unwrap();
        assert_eq!(definition.references()["a"], Reference::by_name("one"));

        definition.set_references([("a", "@missing")]);
        assert_eq!(
            definition.complete(&index).unwrap_err().to_string(),
            "Reference to missing service 'missing'."
        );
    }
}
