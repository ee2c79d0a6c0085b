use alloc::{borrow::ToOwned as _, boxed::Box, string::String, vec::Vec};
use tracing::{debug, info, info_span};

use crate::{
    config::Config,
    definitions::DefinitionKind,
    errors::CompileErrorKind,
    inject::InjectPass,
    metadata::TypeMetadata,
    pass::CompilerPass,
    registry::ContainerBuilder,
    synthesis::{synthesize, GeneratedClass},
};

/// Class generated for a factory, accessor or locator definition
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedService {
    pub name: String,
    pub class: GeneratedClass,
}

pub struct Compiler<M> {
    builder: ContainerBuilder,
    metadata: M,
    config: Config,
    passes: Vec<Box<dyn CompilerPass<M>>>,
}

impl<M> Compiler<M>
where
    M: TypeMetadata + 'static,
{
    /// Compiler with the default config. The inject pass is registered first.
    #[inline]
    #[must_use]
    pub fn new(metadata: M) -> Self {
        Self::with_config(metadata, Config::default())
    }

    #[must_use]
    pub fn with_config(metadata: M, config: Config) -> Self {
        let mut compiler = Self {
            builder: ContainerBuilder::new(),
            metadata,
            config,
            passes: Vec::new(),
        };
        compiler.add_pass(InjectPass::new(config));
        compiler
    }

    /// Adds a pass run after the already registered ones
    #[inline]
    pub fn add_pass(&mut self, pass: impl CompilerPass<M> + 'static) -> &mut Self {
        self.passes.push(Box::new(pass));
        self
    }
}

impl<M> Compiler<M>
where
    M: TypeMetadata,
{
    #[inline]
    #[must_use]
    pub const fn builder(&self) -> &ContainerBuilder {
        &self.builder
    }

    #[inline]
    pub fn builder_mut(&mut self) -> &mut ContainerBuilder {
        &mut self.builder
    }

    #[inline]
    #[must_use]
    pub const fn metadata(&self) -> &M {
        &self.metadata
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> Config {
        self.config
    }

    /// Resolves the definitions, runs the passes, resolves again for the definitions they added, completes the
    /// definitions and describes the class of every factory, accessor and locator, in registration order.
    ///
    /// # Errors
    /// Returns the first error raised, nothing is generated in that case
    pub fn compile(&mut self) -> Result<Vec<GeneratedService>, CompileErrorKind> {
        let span = info_span!("compile", definitions = self.builder.len());
        let _guard = span.enter();

        self.builder.resolve(&self.metadata)?;
        for pass in &mut self.passes {
            debug!(pass = pass.name(), "Run pass");
            pass.before_compile(&mut self.builder, &self.metadata)?;
        }
        // Definitions added by the passes
        self.builder.resolve(&self.metadata)?;
        self.builder.complete(&self.metadata)?;

        let mut services = Vec::new();
        for (name, definition) in self.builder.definitions() {
            let contract = match definition {
                DefinitionKind::Service(_) => continue,
                DefinitionKind::Factory(definition) => definition.contract(&self.metadata)?,
                DefinitionKind::Accessor(definition) => definition.contract(&self.metadata)?,
                DefinitionKind::Locator(definition) => definition.contract(&self.metadata)?,
            };
            if let Some(class) = synthesize(definition, &contract) {
                services.push(GeneratedService {
                    name: name.to_owned(),
                    class,
                });
            }
        }

        info!(services = services.len(), "Compiled");
        Ok(services)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::Compiler;
    use crate::{
        config::Config,
        definitions::{Definition as _, DefinitionKind},
        metadata::{ClassInfo, MethodInfo, ParameterInfo, PropertyInfo, TypeTable},
        pass::pass_fn,
        reference::Reference,
        registry::ContainerBuilder,
        statement::{Statement, Value},
        synthesis::{Body, Expr, Lookup},
    };

    use alloc::{
        format,
        string::{String, ToString as _},
        vec::Vec,
    };
    use tracing_test::traced_test;

    fn metadata() -> TypeTable {
        TypeTable::from_iter([
            ClassInfo::class("Mailer").constructor([ParameterInfo::new("host").typed("string")]),
            ClassInfo::class("Newsletter").property(PropertyInfo::new("mailer").typed("Mailer").injected()),
            ClassInfo::interface("MailerAccessor").method(MethodInfo::new("get").returns("Mailer")),
            ClassInfo::interface("MailerFactory").method(
                MethodInfo::new("create")
                    .parameter(ParameterInfo::new("host").typed("string"))
                    .returns("Mailer"),
            ),
        ])
    }

    #[test]
    #[traced_test]
    fn test_compile() {
        let mut compiler = Compiler::new(metadata());
        let builder = compiler.builder_mut();
        builder.add_service(Some("mailer")).unwrap().set_type(Some("Mailer"));
        builder.add_service(Some("newsletter")).unwrap().set_type(Some("Newsletter")).add_tag("inject", true);
        let metadata = metadata();
        builder.add_accessor(Some("accessor")).unwrap().set_implement("MailerAccessor", &metadata).unwrap();

        let services = compiler.compile().unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].name, "accessor");
        assert_eq!(
            services[0].class.methods[0].body,
            Body::Return(Expr::Service {
                lookup: Lookup::Shared,
                reference: Reference::by_name("mailer"),
            })
        );

        let Some(DefinitionKind::Service(newsletter)) = compiler.builder().definition("newsletter") else {
            panic!("service expected");
        };
        assert_eq!(newsletter.setup().len(), 1);
        assert_eq!(newsletter.setup()[0].arguments[0].value(), &Value::Reference(Reference::by_name("mailer")));
        assert!(logs_contain("Compiled"));
    }

    #[test]
    #[traced_test]
    fn test_custom_pass() {
        let metadata = metadata();
        let mut compiler = Compiler::with_config(
            metadata.clone(),
            Config {
                check_inject_types: false,
                ..Config::default()
            },
        );
        assert!(!compiler.config().check_inject_types);
        compiler.add_pass(pass_fn(|builder: &mut ContainerBuilder, _: &TypeTable| {
            builder.add_service(Some("mailer"))?.set_type(Some("Mailer"));
            Ok(())
        }));
        compiler
            .builder_mut()
            .add_accessor(Some("accessor"))
            .unwrap()
            .set_implement("MailerAccessor", &metadata)
            .unwrap();

        let services = compiler.compile().unwrap();
        assert!(compiler.builder().has_definition("mailer"));
        assert_eq!(
            services[0].class.methods[0].body,
            Body::Return(Expr::Service {
                lookup: Lookup::Shared,
                reference: Reference::by_name("mailer"),
            })
        );
        assert!(logs_contain("Run pass"));
    }

    #[test]
    #[traced_test]
    fn test_failing_pass_aborts() {
        let mut compiler = Compiler::new(metadata());
        compiler.add_pass(pass_fn(|_: &mut ContainerBuilder, _: &TypeTable| Err(anyhow::anyhow!("Pass failed"))));
        compiler.builder_mut().add_service(Some("mailer")).unwrap().set_type(Some("Mailer"));

        assert_eq!(compiler.compile().unwrap_err().to_string(), "Pass failed");
        let services: Vec<_> = compiler.builder().definitions().collect();
        assert_eq!(services.len(), 1);
    }

    #[test]
    #[traced_test]
    fn test_pass_added_definitions_are_resolved() {
        let mut compiler = Compiler::new(metadata());
        compiler.add_pass(pass_fn(|builder: &mut ContainerBuilder, metadata: &TypeTable| {
            builder.add_service(Some("mailer"))?.set_creator(Statement::class("Mailer"));
            builder.add_accessor(Some("accessor"))?.set_implement("MailerAccessor", metadata)?;
            builder.add_factory(Some("factory"))?.set_implement("MailerFactory", metadata)?;
            Ok(())
        }));

        let services = compiler.compile().unwrap();
        assert_eq!(services.len(), 2);
        assert_eq!(
            services[0].class.methods[0].body,
            Body::Return(Expr::Service {
                lookup: Lookup::Shared,
                reference: Reference::by_name("mailer"),
            })
        );
        assert_eq!(
            services[1].class.methods[0].body,
            Body::Return(Expr::Create {
                creator: Statement::class("Mailer").named_argument("host", Value::Parameter("host".into())),
                setup: Vec::new(),
            })
        );
        assert_eq!(compiler.builder().definition("mailer").unwrap().as_definition().type_name(), Some("Mailer"));
    }
}
