use std::fmt;

use crate::AntelopeType;

/// Newtype wrapper for a `&str` representing a type expression.
///
/// Type expressions are a base type name followed by suffixes, applied
/// left-to-right as written: `?` wraps the current type as an optional, `[]`
/// as an array, `$` marks a struct field as a binary extension. So `int8[]?`
/// is an optional array of `int8` while `int8?[]` is an array of optional
/// `int8`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName<'a>(pub &'a str);

impl<'a> TypeName<'a> {
    pub fn is_array(&self) -> bool {
        self.0.ends_with("[]")
    }

    pub fn is_optional(&self) -> bool {
        self.0.ends_with('?')
    }

    /// Return the fundamental type for the given type, ie: the type with a
    /// special designator (?/optional, []/array) removed.
    ///
    /// Note that this doesn't work recursively and only work by removing the last
    /// suffix, if you want the base type you have to call this method recursively
    /// yourself.
    ///
    /// ## Examples
    ///
    /// ```
    /// # use abiconv::TypeName;
    /// assert_eq!(TypeName("int8").fundamental_type(), TypeName("int8"));
    /// assert_eq!(TypeName("int8[]").fundamental_type(), TypeName("int8"));
    /// assert_eq!(TypeName("int8[][]").fundamental_type(), TypeName("int8[]"));
    /// assert_eq!(TypeName("int8[][]?").fundamental_type(), TypeName("int8[][]"));
    /// ```
    pub fn fundamental_type(&self) -> TypeName<'a> {
        if self.is_array() {
            TypeName(&self.0[..self.0.len() - 2])
        }
        else if self.is_optional() {
            TypeName(&self.0[..self.0.len() - 1])
        }
        else {
            *self
        }
    }

    pub fn has_bin_extension(&self) -> bool {
        self.0.ends_with('$')
    }

    pub fn remove_bin_extension(&self) -> TypeName<'a> {
        if self.0.ends_with('$') {
            TypeName(&self.0[..self.0.len() - 1])
        }
        else {
            *self
        }
    }
}

impl fmt::Debug for TypeName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for TypeName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'a> From<&'a String> for TypeName<'a> {
    fn from(t: &String) -> TypeName {
        TypeName(t.as_str())
    }
}

impl<'a> From<&'a str> for TypeName<'a> {
    fn from(t: &str) -> TypeName {
        TypeName(t)
    }
}

impl<'a> From<TypeName<'a>> for &'a str {
    fn from(t: TypeName) -> &str {
        t.0
    }
}

impl<'a> TryFrom<TypeName<'a>> for AntelopeType {
    type Error = strum::ParseError;

    fn try_from(value: TypeName<'a>) -> Result<Self, Self::Error> {
        AntelopeType::try_from(value.0)
    }
}
