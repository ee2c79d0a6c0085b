//! Language-neutral description of the types the definitions refer to.
//!
//! The compiler never inspects real types: everything it knows about an interface or a class comes
//! from a [`TypeMetadata`] implementation, so every check can run against fabricated metadata.

mod type_hint;

pub use type_hint::TypeHint;

use alloc::{
    borrow::ToOwned as _,
    collections::{BTreeMap, BTreeSet},
    format,
    string::String,
    vec,
    vec::Vec,
};

use crate::statement::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    pub name: String,
    pub type_hint: Option<TypeHint>,
    pub default: Option<Value>,
}

impl ParameterInfo {
    #[inline]
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            type_hint: None,
            default: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn typed(mut self, type_hint: &str) -> Self {
        self.type_hint = TypeHint::parse(type_hint);
        self
    }

    #[inline]
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub name: String,
    /// Filled in by [`TypeTable::insert`]
    pub declaring_class: String,
    pub is_static: bool,
    pub is_public: bool,
    pub parameters: Vec<ParameterInfo>,
    pub return_type: Option<TypeHint>,
    /// Type taken from the `@return` annotation
    pub return_annotation: Option<String>,
}

impl MethodInfo {
    #[inline]
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            declaring_class: String::new(),
            is_static: false,
            is_public: true,
            parameters: Vec::new(),
            return_type: None,
            return_annotation: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn private(mut self) -> Self {
        self.is_public = false;
        self
    }

    #[inline]
    #[must_use]
    pub fn parameter(mut self, parameter: ParameterInfo) -> Self {
        self.parameters.push(parameter);
        self
    }

    #[inline]
    #[must_use]
    pub fn returns(mut self, type_hint: &str) -> Self {
        self.return_type = TypeHint::parse(type_hint);
        self
    }

    #[inline]
    #[must_use]
    pub fn annotated_return(mut self, type_hint: &str) -> Self {
        self.return_annotation = Some(type_hint.to_owned());
        self
    }

    /// Declared return type, falling back to the `@return` annotation
    #[must_use]
    pub fn resolved_return_type(&self) -> Option<TypeHint> {
        self.return_type
            .clone()
            .or_else(|| self.return_annotation.as_deref().and_then(TypeHint::parse))
    }

    #[inline]
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.declaring_class, self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct PropertyInfo {
    pub name: String,
    /// Filled in by [`TypeTable::insert`]
    pub declaring_class: String,
    pub is_static: bool,
    pub is_public: bool,
    pub is_readonly: bool,
    pub type_hint: Option<TypeHint>,
    /// Type taken from the `@var` annotation
    pub var_annotation: Option<String>,
    pub inject_attribute: bool,
    pub inject_annotation: bool,
}

impl PropertyInfo {
    #[inline]
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            declaring_class: String::new(),
            is_static: false,
            is_public: true,
            is_readonly: false,
            type_hint: None,
            var_annotation: None,
            inject_attribute: false,
            inject_annotation: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn typed(mut self, type_hint: &str) -> Self {
        self.type_hint = TypeHint::parse(type_hint);
        self
    }

    #[inline]
    #[must_use]
    pub fn var(mut self, annotation: &str) -> Self {
        self.var_annotation = Some(annotation.to_owned());
        self
    }

    /// Marks the property with the inject attribute
    #[inline]
    #[must_use]
    pub fn injected(mut self) -> Self {
        self.inject_attribute = true;
        self
    }

    /// Marks the property with the `@inject` annotation
    #[inline]
    #[must_use]
    pub fn annotated_inject(mut self) -> Self {
        self.inject_annotation = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn private(mut self) -> Self {
        self.is_public = false;
        self
    }

    #[inline]
    #[must_use]
    pub fn readonly(mut self) -> Self {
        self.is_readonly = true;
        self
    }

    #[inline]
    #[must_use]
    pub const fn is_injected(&self) -> bool {
        self.inject_attribute || self.inject_annotation
    }

    #[inline]
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}::${}", self.declaring_class, self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassInfo {
    pub name: String,
    pub kind: ClassKind,
    pub parent: Option<String>,
    /// Implemented interfaces for a class, extended interfaces for an interface
    pub interfaces: Vec<String>,
    /// `None` if the class doesn't declare a constructor
    pub constructor: Option<Vec<ParameterInfo>>,
    pub methods: Vec<MethodInfo>,
    pub properties: Vec<PropertyInfo>,
}

impl ClassInfo {
    #[inline]
    #[must_use]
    fn new(name: &str, kind: ClassKind) -> Self {
        Self {
            name: name.trim_start_matches('\\').to_owned(),
            kind,
            parent: None,
            interfaces: Vec::new(),
            constructor: None,
            methods: Vec::new(),
            properties: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn class(name: &str) -> Self {
        Self::new(name, ClassKind::Class)
    }

    #[inline]
    #[must_use]
    pub fn interface(name: &str) -> Self {
        Self::new(name, ClassKind::Interface)
    }

    #[inline]
    #[must_use]
    pub fn extends(mut self, parent: &str) -> Self {
        match self.kind {
            ClassKind::Class => self.parent = Some(parent.to_owned()),
            ClassKind::Interface => self.interfaces.push(parent.to_owned()),
        }
        self
    }

    #[inline]
    #[must_use]
    pub fn implements(mut self, interface: &str) -> Self {
        self.interfaces.push(interface.to_owned());
        self
    }

    #[inline]
    #[must_use]
    pub fn constructor(mut self, parameters: impl IntoIterator<Item = ParameterInfo>) -> Self {
        self.constructor = Some(parameters.into_iter().collect());
        self
    }

    #[inline]
    #[must_use]
    pub fn method(mut self, mut method: MethodInfo) -> Self {
        method.declaring_class.clone_from(&self.name);
        self.methods.push(method);
        self
    }

    #[inline]
    #[must_use]
    pub fn property(mut self, mut property: PropertyInfo) -> Self {
        property.declaring_class.clone_from(&self.name);
        self.properties.push(property);
        self
    }
}

pub trait TypeMetadata {
    fn class(&self, name: &str) -> Option<&ClassInfo>;

    #[inline]
    fn exists(&self, name: &str) -> bool {
        self.class(name).is_some()
    }

    #[inline]
    fn is_interface(&self, name: &str) -> bool {
        self.class(name).is_some_and(|class| class.kind == ClassKind::Interface)
    }

    /// `true` if `class` is `parent` or extends/implements it, directly or transitively
    fn is_a(&self, class: &str, parent: &str) -> bool {
        if class == parent {
            return true;
        }
        self.lineage(class).iter().skip(1).any(|ancestor| ancestor.name == parent)
    }

    #[inline]
    fn is_subclass_of(&self, class: &str, parent: &str) -> bool {
        class != parent && self.is_a(class, parent)
    }

    /// The class itself, then its parents and interfaces, depth-first, each at most once
    fn lineage(&self, name: &str) -> Vec<&ClassInfo> {
        let mut lineage: Vec<&ClassInfo> = Vec::new();
        let mut pending = vec![name.to_owned()];
        while let Some(current) = pending.pop() {
            let Some(class) = self.class(&current) else {
                continue;
            };
            if lineage.iter().any(|visited| visited.name == class.name) {
                continue;
            }
            lineage.push(class);

            pending.extend(class.interfaces.iter().rev().cloned());
            if let Some(parent) = &class.parent {
                pending.push(parent.clone());
            }
        }
        lineage
    }

    /// The class itself followed by its parent classes, nearest first
    fn ancestors(&self, name: &str) -> Vec<&ClassInfo> {
        let mut ancestors: Vec<&ClassInfo> = Vec::new();
        let mut current = self.class(name);
        while let Some(class) = current {
            if ancestors.iter().any(|visited| visited.name == class.name) {
                break;
            }
            ancestors.push(class);
            current = class.parent.as_deref().and_then(|parent| self.class(parent));
        }
        ancestors
    }

    /// Declared and inherited methods, own declarations first. Overridden methods appear once.
    fn methods(&self, name: &str) -> Vec<&MethodInfo> {
        let mut seen = BTreeSet::new();
        let mut methods = Vec::new();
        for class in self.lineage(name) {
            for method in &class.methods {
                if seen.insert(method.name.as_str()) {
                    methods.push(method);
                }
            }
        }
        methods
    }

    #[inline]
    fn method(&self, class: &str, method: &str) -> Option<&MethodInfo> {
        self.methods(class).into_iter().find(|info| info.name == method)
    }

    /// Declared and inherited properties, own declarations first
    fn properties(&self, name: &str) -> Vec<&PropertyInfo> {
        let mut seen = BTreeSet::new();
        let mut properties = Vec::new();
        for class in self.ancestors(name) {
            for property in &class.properties {
                if seen.insert(property.name.as_str()) {
                    properties.push(property);
                }
            }
        }
        properties
    }

    /// Parameters of the nearest declared constructor
    fn constructor(&self, name: &str) -> Option<&[ParameterInfo]> {
        self.ancestors(name).into_iter().find_map(|class| class.constructor.as_deref())
    }
}

impl<M: TypeMetadata + ?Sized> TypeMetadata for &M {
    #[inline]
    fn class(&self, name: &str) -> Option<&ClassInfo> {
        (**self).class(name)
    }
}

/// In-memory [`TypeMetadata`]
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    classes: BTreeMap<String, ClassInfo>,
}

impl TypeTable {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { classes: BTreeMap::new() }
    }

    pub fn insert(&mut self, mut class: ClassInfo) -> Option<ClassInfo> {
        for method in &mut class.methods {
            method.declaring_class.clone_from(&class.name);
        }
        for property in &mut class.properties {
            property.declaring_class.clone_from(&class.name);
        }
        self.classes.insert(class.name.clone(), class)
    }

    #[inline]
    #[must_use]
    pub fn with(mut self, class: ClassInfo) -> Self {
        self.insert(class);
        self
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl TypeMetadata for TypeTable {
    #[inline]
    fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name.trim_start_matches('\\'))
    }
}

impl FromIterator<ClassInfo> for TypeTable {
    fn from_iter<T: IntoIterator<Item = ClassInfo>>(iter: T) -> Self {
        let mut table = Self::new();
        for class in iter {
            table.insert(class);
        }
        table
    }
}
