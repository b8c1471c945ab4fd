use std::fmt;
use std::str::FromStr;

use crate::errors::ParamParseError;

/// A type expression as written in a definition, e.g. `auth.SentCodeType`,
/// `Vector<long>`, `%Message` or `!X`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Type {
    /// Namespace components, e.g. `["auth"]` for `auth.SentCodeType`.
    pub namespace: Vec<String>,

    /// The name without namespace, `!` or `%` markers.
    pub name: String,

    /// `true` for bare types: a lowercase first letter, or an explicit `%`.
    pub bare: bool,

    /// `true` when this is a reference to a `{X:Type}` generic (`!X`).
    pub generic_ref: bool,

    /// The generic argument, e.g. `long` in `Vector<long>`.
    pub generic_arg: Option<Box<Type>>,
}

impl Type {
    /// Returns `ns.Name` joined with dots.
    pub fn full_name(&self) -> String {
        let mut s = String::new();
        for ns in &self.namespace {
            s.push_str(ns);
            s.push('.');
        }
        s.push_str(&self.name);
        s
    }

    /// `true` for both the boxed `Vector<T>` and the bare `vector<T>`.
    pub fn is_vector(&self) -> bool {
        self.namespace.is_empty() && self.name.eq_ignore_ascii_case("vector")
    }

    /// `true` when the name was written with a `%` bare marker or starts
    /// lowercase, i.e. the value is encoded without its constructor id.
    pub fn is_bare(&self) -> bool {
        self.bare
    }

    /// Appends the names of every `!X` reference nested in this type.
    pub(crate) fn generic_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        if self.generic_ref {
            out.push(&self.name);
        }
        if let Some(arg) = &self.generic_arg {
            arg.generic_refs(out);
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generic_ref {
            f.write_str("!")?;
        }
        let starts_upper = self.name.starts_with(|c: char| c.is_ascii_uppercase());
        if self.bare && starts_upper {
            f.write_str("%")?;
        }
        f.write_str(&self.full_name())?;
        match &self.generic_arg {
            Some(arg) => write!(f, "<{arg}>"),
            None => Ok(()),
        }
    }
}

impl FromStr for Type {
    type Err = ParamParseError;

    /// Parses a TL type expression such as `ns.Vector<!X>`.
    ///
    /// # Examples
    /// ```
    /// use tlwire_parser::tl::Type;
    /// let ty: Type = "Vector<%Message>".parse().unwrap();
    /// assert!(ty.generic_arg.unwrap().bare);
    /// assert!("!X".parse::<Type>().unwrap().generic_ref);
    /// ```
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (raw, generic_ref) = match raw.strip_prefix('!') {
            Some(rest) => (rest, true),
            None => (raw, false),
        };
        let (raw, percent) = match raw.strip_prefix('%') {
            Some(rest) => (rest, true),
            None => (raw, false),
        };

        let (path, generic_arg) = match raw.split_once('<') {
            Some((path, rest)) => {
                let inner = rest.strip_suffix('>').ok_or(ParamParseError::InvalidGeneric)?;
                (path, Some(Box::new(inner.parse::<Type>()?)))
            }
            None => (raw, None),
        };

        let mut parts: Vec<&str> = path.split('.').collect();
        let name = parts.pop().unwrap_or_default();
        if name.is_empty() || parts.iter().any(|p| p.is_empty()) {
            return Err(ParamParseError::Empty);
        }

        let lowercase = name.starts_with(|c: char| c.is_ascii_lowercase());
        Ok(Self {
            namespace: parts.into_iter().map(str::to_owned).collect(),
            name: name.to_owned(),
            bare: percent || lowercase,
            generic_ref,
            generic_arg,
        })
    }
}
