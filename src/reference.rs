use alloc::{borrow::ToOwned as _, string::String};
use core::fmt::{self, Display, Formatter};

/// Pointer to a service, either by its name (`@name`) or by its type (`Name\Of\Class`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Reference {
    Name(String),
    Type(String),
}

impl Reference {
    /// Name of the service being configured
    pub const SELF: &'static str = "self";

    #[inline]
    #[must_use]
    pub fn by_name(name: &str) -> Self {
        Reference::Name(name.to_owned())
    }

    #[inline]
    #[must_use]
    pub fn by_type(type_name: &str) -> Self {
        Reference::Type(type_name.trim_start_matches('\\').to_owned())
    }

    /// `@self`
    #[inline]
    #[must_use]
    pub fn this() -> Self {
        Reference::Name(Self::SELF.to_owned())
    }

    /// `@name` becomes a reference by name, anything else a reference by type
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.strip_prefix('@') {
            Some(name) => Self::by_name(name),
            None => Self::by_type(value),
        }
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Reference::Name(value) | Reference::Type(value) => value,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_name(&self) -> bool {
        matches!(self, Reference::Name(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_type(&self) -> bool {
        matches!(self, Reference::Type(_))
    }

    #[inline]
    #[must_use]
    pub fn is_self(&self) -> bool {
        matches!(self, Reference::Name(name) if name == Self::SELF)
    }
}

impl From<&str> for Reference {
    #[inline]
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for Reference {
    #[inline]
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl Display for Reference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Name(name) => write!(f, "@{name}"),
            Reference::Type(type_name) => f.write_str(type_name),
        }
    }
}
