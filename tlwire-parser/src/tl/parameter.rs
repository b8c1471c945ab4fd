use std::fmt;

use crate::errors::ParamParseError;
use crate::tl::Type;

/// A flag reference inside a parameter type, e.g. `flags.0` in `flags.0?true`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Flag {
    /// The flags word holding this bit (usually `"flags"`).
    pub name: String,
    /// The bit index, always below 32.
    pub index: u32,
}

/// The kind of a single TL parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParameterType {
    /// A flags word (`name:#`). Never stored; computed from the optional
    /// parameters when encoding.
    Flags,

    /// A value, optionally guarded by a flag bit.
    Normal {
        /// The value's type.
        ty: Type,
        /// If `Some`, the value is only on the wire when this bit is set.
        flag: Option<Flag>,
    },
}

impl ParameterType {
    /// `true` for payload-less presence flags (`flags.N?true`).
    pub fn is_presence_flag(&self) -> bool {
        matches!(self, Self::Normal { ty, flag: Some(_) } if ty.name == "true")
    }

    fn parse(raw: &str) -> Result<Self, ParamParseError> {
        if raw == "#" {
            return Ok(Self::Flags);
        }

        let Some((guard, ty)) = raw.split_once('?') else {
            return Ok(Self::Normal { ty: raw.parse()?, flag: None });
        };

        let (name, index) = guard.split_once('.').ok_or(ParamParseError::InvalidFlag)?;
        if name.is_empty() {
            return Err(ParamParseError::InvalidFlag);
        }
        let index: u32 = index.parse().map_err(|_| ParamParseError::InvalidFlag)?;
        if index >= 32 {
            return Err(ParamParseError::FlagOutOfRange(index));
        }

        Ok(Self::Normal {
            ty: ty.parse()?,
            flag: Some(Flag { name: name.to_owned(), index }),
        })
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flags => f.write_str("#"),
            Self::Normal { ty, flag: Some(fl) } => write!(f, "{}.{}?{ty}", fl.name, fl.index),
            Self::Normal { ty, flag: None } => write!(f, "{ty}"),
        }
    }
}

/// A single `name:Type` parameter inside a TL definition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Parameter {
    /// The parameter name as it appears in the TL schema.
    pub name: String,
    /// The resolved type of this parameter.
    pub ty: ParameterType,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.ty)
    }
}

/// One whitespace-separated token of a definition's parameter list.
#[derive(Debug)]
pub(crate) enum Token {
    /// `{X:Type}`, declaring a generic usable later as `!X`.
    Generic(String),
    /// An ordinary parameter.
    Param(Parameter),
}

impl Token {
    pub(crate) fn parse(token: &str) -> Result<Self, ParamParseError> {
        if let Some(inner) = token.strip_prefix('{') {
            return inner
                .strip_suffix(":Type}")
                .filter(|name| !name.is_empty())
                .map(|name| Self::Generic(name.to_owned()))
                .ok_or(ParamParseError::MalformedGenericDef);
        }

        let (name, ty) = token.split_once(':').ok_or(ParamParseError::MissingType)?;
        if name.is_empty() || ty.is_empty() {
            return Err(ParamParseError::Empty);
        }

        Ok(Self::Param(Parameter {
            name: name.to_owned(),
            ty: ParameterType::parse(ty)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(token: &str) -> Parameter {
        match Token::parse(token).unwrap() {
            Token::Param(p) => p,
            Token::Generic(name) => panic!("unexpected generic {name}"),
        }
    }

    #[test]
    fn flags_word() {
        assert_eq!(param("flags:#").ty, ParameterType::Flags);
    }

    #[test]
    fn optional_value() {
        let p = param("accuracy_radius:flags.0?int");
        let ParameterType::Normal { ty, flag: Some(flag) } = &p.ty else {
            panic!("expected a flagged parameter");
        };
        assert_eq!(ty.name, "int");
        assert_eq!(flag.index, 0);
        assert_eq!(p.to_string(), "accuracy_radius:flags.0?int");
    }

    #[test]
    fn presence_flag() {
        assert!(param("silent:flags.5?true").ty.is_presence_flag());
        assert!(!param("id:long").ty.is_presence_flag());
    }

    #[test]
    fn generic_declaration() {
        assert!(matches!(Token::parse("{X:Type}"), Ok(Token::Generic(n)) if n == "X"));
        assert_eq!(Token::parse("{X}").unwrap_err(), ParamParseError::MalformedGenericDef);
    }

    #[test]
    fn bit_out_of_range() {
        assert_eq!(
            Token::parse("x:flags.32?int").unwrap_err(),
            ParamParseError::FlagOutOfRange(32)
        );
    }

    #[test]
    fn missing_type() {
        assert_eq!(Token::parse("nope").unwrap_err(), ParamParseError::MissingType);
    }
}
