use alloc::{borrow::ToOwned as _, string::String, vec::Vec};
use core::fmt::{self, Display, Formatter};

use super::TypeMetadata;

const BUILT_IN: &[&str] = &[
    "array", "bool", "callable", "false", "float", "int", "iterable", "mixed", "never", "null", "object", "parent", "self", "static",
    "string", "true", "void",
];

#[inline]
#[must_use]
fn is_built_in(name: &str) -> bool {
    BUILT_IN.iter().any(|built_in| built_in.eq_ignore_ascii_case(name))
}

/// Declared or annotated type of a parameter, property or return value.
///
/// `null` members are folded into the nullable flag, so `?Foo` and `Foo|null` are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHint {
    names: Vec<String>,
    nullable: bool,
}

impl TypeHint {
    /// Parses `Foo`, `?Foo`, `Foo|Bar` or `Foo|null`. Leading `\` is stripped from every member.
    /// Returns `None` for an empty or malformed hint.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let (value, mut nullable) = match value.strip_prefix('?') {
            Some(rest) => (rest, true),
            None => (value, false),
        };

        let mut names = Vec::new();
        for name in value.split('|') {
            let name = name.trim().trim_start_matches('\\');
            if name.is_empty() {
                return None;
            }
            if name.eq_ignore_ascii_case("null") {
                nullable = true;
                continue;
            }
            names.push(name.to_owned());
        }

        if names.is_empty() {
            return None;
        }
        Some(Self { names, nullable })
    }

    #[inline]
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[inline]
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[inline]
    #[must_use]
    pub fn is_union(&self) -> bool {
        self.names.len() > 1
    }

    #[inline]
    #[must_use]
    pub fn single_name(&self) -> Option<&str> {
        match self.names.as_slice() {
            [name] => Some(name),
            _ => None,
        }
    }

    /// `true` for a single, non built-in name. Nullability is checked separately.
    #[inline]
    #[must_use]
    pub fn is_class(&self) -> bool {
        self.single_name().is_some_and(|name| !is_built_in(name))
    }

    /// Checks that a value of type `other` can be passed where `self` is expected
    #[must_use]
    pub fn allows<M: TypeMetadata + ?Sized>(&self, other: &TypeHint, metadata: &M) -> bool {
        if self.names.iter().any(|name| name.eq_ignore_ascii_case("mixed")) {
            return true;
        }
        if other.nullable && !self.nullable {
            return false;
        }
        other
            .names
            .iter()
            .all(|other_name| self.names.iter().any(|name| name == other_name || metadata.is_a(other_name, name)))
    }
}

impl Display for TypeHint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let (Some(name), true) = (self.single_name(), self.nullable) {
            return write!(f, "?{name}");
        }
        for (index, name) in self.names.iter().enumerate() {
            if index > 0 {
                f.write_str("|")?;
            }
            f.write_str(name)?;
        }
        if self.nullable {
            f.write_str("|null")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::TypeHint;
    use crate::metadata::{ClassInfo, TypeTable};

    use alloc::string::ToString as _;

    #[test]
    fn test_parse() {
        let hint = TypeHint::parse("\\Foo").unwrap();
        assert_eq!(hint.single_name(), Some("Foo"));
        assert!(!hint.is_nullable());
        assert!(hint.is_class());

        let hint = TypeHint::parse("?Foo").unwrap();
        assert!(hint.is_nullable());
        assert_eq!(hint, TypeHint::parse("Foo|null").unwrap());
        assert_eq!(hint.to_string(), "?Foo");

        let hint = TypeHint::parse("Foo|Bar").unwrap();
        assert!(hint.is_union());
        assert!(!hint.is_class());
        assert_eq!(hint.to_string(), "Foo|Bar");
        assert_eq!(TypeHint::parse("Foo|Bar|null").unwrap().to_string(), "Foo|Bar|null");

        assert!(!TypeHint::parse("int").unwrap().is_class());
        assert!(TypeHint::parse("").is_none());
        assert!(TypeHint::parse("Foo|").is_none());
        assert!(TypeHint::parse("null").is_none());
    }

    #[test]
    fn test_allows() {
        let metadata = TypeTable::new()
            .with(ClassInfo::interface("Logger"))
            .with(ClassInfo::class("FileLogger").implements("Logger"));

        let logger = TypeHint::parse("Logger").unwrap();
        let file_logger = TypeHint::parse("FileLogger").unwrap();
        let nullable_logger = TypeHint::parse("?Logger").unwrap();

        assert!(logger.allows(&file_logger, &metadata));
        assert!(!file_logger.allows(&logger, &metadata));
        assert!(!logger.allows(&nullable_logger, &metadata));
        assert!(nullable_logger.allows(&logger, &metadata));
        assert!(TypeHint::parse("mixed").unwrap().allows(&nullable_logger, &metadata));
    }
}
