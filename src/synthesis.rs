//! Structured description of the classes implementing factory, accessor and locator interfaces.
//!
//! Rendering the description to source text is left to the code generator consuming it.

use alloc::{
    borrow::ToOwned as _,
    string::{String, ToString as _},
    vec::Vec,
};
use tracing::debug;

use crate::{
    contract::{Contract, ContractKind, ContractMethod, MethodShape},
    definitions::{AccessorDefinition, DefinitionKind, FactoryDefinition, LocatorDefinition},
    metadata::TypeHint,
    reference::Reference,
    statement::{Statement, Value},
};

/// Name of the field holding the container, set by the generated constructor
pub const CONTAINER_FIELD: &str = "container";

const SERVICE_NOT_DEFINED: &str = "Service is not defined.";
const NAMED_SERVICE_NOT_DEFINED: &str = "Service '$name' is not defined.";

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedClass {
    pub implements: String,
    pub container_field: &'static str,
    pub methods: Vec<GeneratedMethod>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedMethod {
    pub name: String,
    pub parameters: Vec<GeneratedParameter>,
    pub return_type: Option<TypeHint>,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedParameter {
    pub name: String,
    pub type_hint: Option<TypeHint>,
    pub default: Option<Value>,
}

/// How the container is asked for a service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// The shared instance
    Shared,
    /// A new instance on every call
    Fresh,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Container lookup of a service
    Service { lookup: Lookup, reference: Reference },
    /// Evaluation of the creator followed by the setup, on the created instance
    Create { creator: Statement, setup: Vec<Statement> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fallback {
    ReturnNull,
    /// Throws a missing-service error with the message, `$name` standing for the requested name
    Throw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Return(Expr),
    /// Lookup of the service mapped to the value of `parameter`, keys sorted
    Dispatch {
        parameter: String,
        lookup: Lookup,
        mapping: Vec<(String, Reference)>,
        fallback: Fallback,
    },
    Fallback(Fallback),
}

/// Describes the class implementing the contract of a definition.
/// Returns `None` for plain services and for a contract of another kind.
#[must_use]
pub fn synthesize(definition: &DefinitionKind, contract: &Contract) -> Option<GeneratedClass> {
    let class = match (definition, contract.kind) {
        (DefinitionKind::Factory(definition), ContractKind::Factory) => synthesize_factory(definition, contract),
        (DefinitionKind::Accessor(definition), ContractKind::Accessor) => synthesize_accessor(definition, contract),
        (DefinitionKind::Locator(definition), ContractKind::Locator) => synthesize_locator(definition, contract),
        _ => return None,
    };
    debug!(interface = %class.implements, methods = class.methods.len(), "Synthesized");
    Some(class)
}

/// `create()` evaluates the result definition with its parameters forwarded
#[must_use]
pub fn synthesize_factory(definition: &FactoryDefinition, contract: &Contract) -> GeneratedClass {
    generated_class(contract, |method| {
        let parameters = method
            .parameters
            .iter()
            .map(|parameter| GeneratedParameter {
                name: parameter.name.clone(),
                type_hint: parameter.type_hint.clone(),
                default: definition
                    .parameters()
                    .get(&parameter.name)
                    .cloned()
                    .flatten()
                    .or_else(|| parameter.default.clone()),
            })
            .collect();

        let result = definition.result_definition();
        let body = match result.and_then(|result| result.creator()) {
            Some(creator) => Body::Return(Expr::Create {
                creator: creator.clone(),
                setup: result.map(|result| result.setup().to_vec()).unwrap_or_default(),
            }),
            None => Body::Fallback(Fallback::Throw(SERVICE_NOT_DEFINED.to_owned())),
        };
        (parameters, body)
    })
}

/// `get()` returns the shared instance of the referenced service
#[must_use]
pub fn synthesize_accessor(definition: &AccessorDefinition, contract: &Contract) -> GeneratedClass {
    generated_class(contract, |_| {
        let body = match definition.reference() {
            Some(reference) => Body::Return(Expr::Service {
                lookup: Lookup::Shared,
                reference: reference.clone(),
            }),
            None => Body::Fallback(Fallback::Throw(SERVICE_NOT_DEFINED.to_owned())),
        };
        (Vec::new(), body)
    })
}

/// `get*()`/`create*()` look up the service mapped to their key, `get($name)`/`create($name)` dispatch over
/// all of them
#[must_use]
pub fn synthesize_locator(definition: &LocatorDefinition, contract: &Contract) -> GeneratedClass {
    generated_class(contract, |method| {
        let lookup = if method.shape.is_create() { Lookup::Fresh } else { Lookup::Shared };
        let nullable = method.return_type.as_ref().is_some_and(TypeHint::is_nullable);
        let fallback = |message: &str| {
            if nullable {
                Fallback::ReturnNull
            } else {
                Fallback::Throw(message.to_owned())
            }
        };

        match &method.shape {
            MethodShape::CreateByName | MethodShape::GetByName => {
                let parameters: Vec<GeneratedParameter> = method
                    .parameters
                    .iter()
                    .map(|parameter| GeneratedParameter {
                        name: parameter.name.clone(),
                        type_hint: parameter.type_hint.clone(),
                        default: parameter.default.clone(),
                    })
                    .collect();
                let body = Body::Dispatch {
                    parameter: parameters.first().map(|parameter| parameter.name.clone()).unwrap_or_default(),
                    lookup,
                    mapping: definition
                        .references()
                        .iter()
                        .map(|(key, reference)| (key.clone(), reference.clone()))
                        .collect(),
                    fallback: fallback(NAMED_SERVICE_NOT_DEFINED),
                };
                (parameters, body)
            }
            shape => {
                let body = match shape.key().and_then(|key| definition.references().get(key)) {
                    Some(reference) => Body::Return(Expr::Service {
                        lookup,
                        reference: reference.clone(),
                    }),
                    None => Body::Fallback(fallback(SERVICE_NOT_DEFINED)),
                };
                (Vec::new(), body)
            }
        }
    })
}

fn generated_class<F>(contract: &Contract, mut method_body: F) -> GeneratedClass
where
    F: FnMut(&ContractMethod) -> (Vec<GeneratedParameter>, Body),
{
    let methods = contract
        .methods
        .iter()
        .map(|method| {
            let (parameters, body) = method_body(method);
            GeneratedMethod {
                name: method.name.to_string(),
                parameters,
                return_type: method.return_type.clone(),
                body,
            }
        })
        .collect();

    GeneratedClass {
        implements: contract.interface.clone(),
        container_field: CONTAINER_FIELD,
        methods,
    }
}
