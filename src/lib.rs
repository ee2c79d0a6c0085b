#![no_std]

extern crate alloc;

pub(crate) mod compiler;
pub(crate) mod config;
pub(crate) mod contract;
pub(crate) mod definitions;
pub(crate) mod errors;
pub(crate) mod inject;
pub(crate) mod metadata;
pub(crate) mod pass;
pub(crate) mod reference;
pub(crate) mod registry;
pub(crate) mod resolver;
pub(crate) mod statement;

pub mod synthesis;

pub use compiler::{Compiler, GeneratedService};
pub use config::Config;
pub use contract::{classify, Contract, ContractKind, ContractMethod, MethodShape};
pub use definitions::{
    AccessorDefinition, Definition, DefinitionBase, DefinitionKind, FactoryDefinition, LocatorDefinition, Parameters,
    ServiceDefinition,
};
pub use errors::{
    CompileErrorKind, ConfigurationErrorKind, MissingServiceErrorKind, ResolveErrorKind, ServiceCreationErrorKind,
};
pub use inject::{check_type, inject_methods, inject_properties, InjectPass};
pub use metadata::{ClassInfo, ClassKind, MethodInfo, ParameterInfo, PropertyInfo, TypeHint, TypeMetadata, TypeTable};
pub use pass::{pass_fn, CompilerPass, FnPass};
pub use reference::Reference;
pub use registry::ContainerBuilder;
pub use resolver::{ServiceIndex, ServiceRegistry};
pub use statement::{Argument, Entity, Statement, Value};
