use alloc::{borrow::ToOwned, string::String, vec::Vec};
use tracing::{debug, error};

use super::{missing_type, Definition, DefinitionBase};
use crate::{
    errors::{ResolveErrorKind, ServiceCreationErrorKind},
    metadata::{MethodInfo, TypeMetadata},
    reference::Reference,
    resolver::ServiceRegistry,
    statement::{Entity, Statement},
};

/// Plain service: a creator statement followed by setup statements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceDefinition {
    base: DefinitionBase,
    creator: Option<Statement>,
    setup: Vec<Statement>,
}

impl ServiceDefinition {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn set_type(&mut self, type_name: Option<&str>) -> &mut Self {
        self.base.type_name = type_name.map(|type_name| type_name.trim_start_matches('\\').to_owned());
        self
    }

    #[inline]
    pub fn set_creator(&mut self, creator: Statement) -> &mut Self {
        self.creator = Some(creator);
        self
    }

    #[inline]
    #[must_use]
    pub const fn creator(&self) -> Option<&Statement> {
        self.creator.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn setup(&self) -> &[Statement] {
        &self.setup
    }

    #[inline]
    pub fn add_setup(&mut self, statement: Statement) -> &mut Self {
        self.setup.push(statement);
        self
    }

    #[inline]
    pub fn set_setup(&mut self, setup: Vec<Statement>) -> &mut Self {
        self.setup = setup;
        self
    }

    #[inline]
    pub(crate) fn creator_mut(&mut self) -> Option<&mut Statement> {
        self.creator.as_mut()
    }

    /// Infers the type from the creator, checks that it exists and derives the creator from it if absent.
    ///
    /// # Errors
    /// - Returns [`ServiceCreationErrorKind::MissingType`] if the type can't be inferred
    /// - Returns [`ServiceCreationErrorKind::ClassNotFound`] if the type is unknown
    pub(crate) fn resolve_type<M>(&mut self, metadata: &M) -> Result<(), ServiceCreationErrorKind>
    where
        M: TypeMetadata + ?Sized,
    {
        if self.base.type_name.is_none() {
            self.base.type_name = self.creator.as_ref().and_then(|creator| creator_type(creator, metadata));
        }

        let Some(type_name) = self.base.type_name.as_deref() else {
            let err = missing_type(self.descriptor());
            error!("{}", err);
            return Err(err);
        };
        if !metadata.exists(type_name) {
            let err = ServiceCreationErrorKind::ClassNotFound {
                descriptor: self.descriptor().to_owned(),
                class: type_name.to_owned(),
            };
            error!("{}", err);
            return Err(err);
        }

        if self.creator.is_none() {
            self.creator = Some(Statement::class(type_name));
        }

        debug!(service = self.descriptor(), type_name, "Type resolved");
        Ok(())
    }

    /// Normalizes references in the creator and setup statements
    pub(crate) fn complete<R>(&mut self, registry: &R) -> Result<(), ResolveErrorKind>
    where
        R: ServiceRegistry + ?Sized,
    {
        if let Some(creator) = &mut self.creator {
            creator.normalize_references(registry)?;
        }
        for statement in &mut self.setup {
            statement.normalize_references(registry)?;
        }
        Ok(())
    }
}

/// Class instantiated by the creator, or the return type of a static factory method
fn creator_type<M>(creator: &Statement, metadata: &M) -> Option<String>
where
    M: TypeMetadata + ?Sized,
{
    match &creator.entity {
        Entity::Class(class) => Some(class.clone()),
        Entity::Method(Reference::Type(class), method) => metadata
            .method(class, method)
            .and_then(MethodInfo::resolved_return_type)
            .and_then(|type_hint| type_hint.single_name().map(ToOwned::to_owned)),
        Entity::Method(Reference::Name(_), _) | Entity::Reference(_) | Entity::Property(..) => None,
    }
}

impl Definition for ServiceDefinition {
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

    use super::ServiceDefinition;
    use crate::{
        definitions::Definition as _,
        metadata::{ClassInfo, MethodInfo, TypeTable},
        reference::Reference,
        resolver::{IndexEntry, ServiceIndex},
        statement::{Entity, Statement, Value},
    };

    use alloc::{
        borrow::ToOwned as _,
        collections::BTreeMap,
        format,
        string::{String, ToString as _},
        vec,
    };
    use tracing_test::traced_test;

    fn metadata() -> TypeTable {
        TypeTable::from_iter([
            ClassInfo::class("Mailer"),
            ClassInfo::class("MailerFactory").method(MethodInfo::new("build").with_static().annotated_return("Mailer")),
        ])
    }

    #[test]
    #[traced_test]
    fn test_resolve_type() {
        let metadata = metadata();

        let mut definition = ServiceDefinition::new();
        definition.set_creator(Statement::class("Mailer"));
        definition.resolve_type(&metadata).unwrap();
        assert_eq!(definition.type_name(), Some("Mailer"));

        let mut definition = ServiceDefinition::new();
        definition.set_creator(Statement::new(Entity::Method(Reference::by_type("MailerFactory"), "build".to_owned())));
        definition.resolve_type(&metadata).unwrap();
        assert_eq!(definition.type_name(), Some("Mailer"));

        let mut definition = ServiceDefinition::new();
        definition.set_type(Some("\\Mailer"));
        definition.resolve_type(&metadata).unwrap();
        assert_eq!(definition.creator(), Some(&Statement::class("Mailer")));
        assert!(logs_contain("Type resolved"));
    }

    #[test]
    #[traced_test]
    fn test_resolve_type_errors() {
        let metadata = metadata();

        let mut definition = ServiceDefinition::new();
        definition.set_name(Some("mailer"));
        assert_eq!(
            definition.resolve_type(&metadata).unwrap_err().to_string(),
            "[mailer]\nType is missing in definition of service."
        );

        let mut definition = ServiceDefinition::new();
        definition.set_type(Some("Unknown"));
        assert_eq!(
            definition.resolve_type(&metadata).unwrap_err().to_string(),
            "[?]\nClass 'Unknown' not found."
        );
    }

    #[test]
    #[traced_test]
    fn test_complete_normalizes_references() {
        let metadata = metadata();
        let index = ServiceIndex::new(
            vec![IndexEntry {
                name: "mailer".to_owned(),
                type_name: Some("Mailer".to_owned()),
                autowired: true,
                tags: BTreeMap::new(),
            }],
            &metadata,
        );

        let mut definition = ServiceDefinition::new();
        definition
            .set_creator(Statement::class("Newsletter").argument(Reference::by_type("Mailer")))
            .add_setup(Statement::call("setMailer").argument(Reference::by_name("mailer")));
        definition.complete(&index).unwrap();

        assert_eq!(definition.creator().unwrap().arguments[0].value(), &Value::Reference(Reference::by_name("mailer")));

        definition.add_setup(Statement::call("setLogger").argument(Reference::by_type("Logger")));
        assert_eq!(
            definition.complete(&index).unwrap_err().to_string(),
            "Service of type Logger not found. Did you add it to configuration?"
        );
    }
}
