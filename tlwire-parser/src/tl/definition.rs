use std::fmt;
use std::str::FromStr;

use crate::errors::{DefinitionError, ParamParseError};
use crate::tl::parameter::Token;
use crate::tl::{Category, Parameter, ParameterType, Type};
use crate::utils::tl_id;

/// A single TL definition — either a constructor or a function.
///
/// ```text
/// geoPoint#b2a2f663 flags:# long:double lat:double access_hash:long accuracy_radius:flags.0?int = GeoPoint;
/// ```
/// becomes a `Definition` with `name = "geoPoint"`, `id = 0xb2a2f663`, five
/// parameters (the flags word included) and `ty = GeoPoint`.
#[derive(Clone, Debug, PartialEq)]
pub struct Definition {
    /// Namespace parts. Empty when the definition is in the global namespace.
    pub namespace: Vec<String>,

    /// The constructor/method name without namespace.
    pub name: String,

    /// 32-bit constructor ID, either parsed from `#XXXXXXXX` or CRC32-derived.
    pub id: u32,

    /// Ordered list of parameters, flags words included.
    pub params: Vec<Parameter>,

    /// The boxed type this constructor builds, or the function's result.
    pub ty: Type,

    /// Whether this is a data constructor or an RPC function.
    pub category: Category,
}

impl Definition {
    /// Returns `namespace.name` joined with dots.
    pub fn full_name(&self) -> String {
        let mut s = String::new();
        for ns in &self.namespace {
            s.push_str(ns);
            s.push('.');
        }
        s.push_str(&self.name);
        s
    }

    /// The flags-word parameters (`name:#`) in declaration order.
    pub fn flag_words(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter().filter(|p| p.ty == ParameterType::Flags)
    }

    /// Parameters that actually carry a value, i.e. everything but flags words.
    pub fn value_params(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter().filter(|p| p.ty != ParameterType::Flags)
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{:08x}", self.full_name(), self.id)?;

        let mut generics = Vec::new();
        for p in &self.params {
            if let ParameterType::Normal { ty, .. } = &p.ty {
                ty.generic_refs(&mut generics);
            }
        }
        generics.sort_unstable();
        generics.dedup();
        for g in generics {
            write!(f, " {{{g}:Type}}")?;
        }

        for p in &self.params {
            write!(f, " {p}")?;
        }
        if self.ty.generic_ref {
            write!(f, " = {}", self.ty.full_name())
        } else {
            write!(f, " = {}", self.ty)
        }
    }
}

impl FromStr for Definition {
    type Err = DefinitionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim().trim_end_matches(';').trim_end();
        if raw.is_empty() {
            return Err(DefinitionError::Empty);
        }

        let (lhs, rhs) = raw.split_once('=').ok_or(DefinitionError::MissingType)?;
        let mut ty: Type = rhs.trim().parse().map_err(|_| DefinitionError::MissingType)?;

        let mut tokens = lhs.split_whitespace();
        let head = tokens.next().ok_or(DefinitionError::MissingName)?;
        let (full_name, explicit_id) = match head.split_once('#') {
            Some((name, id)) => (name, Some(id)),
            None => (head, None),
        };

        let mut path: Vec<&str> = full_name.split('.').collect();
        let name = path.pop().unwrap_or_default();
        if name.is_empty() || path.iter().any(|p| p.is_empty()) {
            return Err(DefinitionError::MissingName);
        }

        let id = match explicit_id {
            Some(hex) => u32::from_str_radix(hex, 16).map_err(DefinitionError::InvalidId)?,
            None => tl_id(raw),
        };

        let mut generics: Vec<String> = Vec::new();
        let mut flag_words: Vec<String> = Vec::new();
        let mut params = Vec::new();

        for token in tokens {
            let invalid = |source| DefinitionError::InvalidParam { token: token.to_owned(), source };
            let param = match Token::parse(token).map_err(invalid)? {
                Token::Generic(name) => {
                    generics.push(name);
                    continue;
                }
                Token::Param(param) => param,
            };

            match &param.ty {
                ParameterType::Flags => flag_words.push(param.name.clone()),
                ParameterType::Normal { ty, flag } => {
                    let mut refs = Vec::new();
                    ty.generic_refs(&mut refs);
                    if let Some(undeclared) = refs.iter().find(|r| !generics.iter().any(|g| g == *r)) {
                        return Err(invalid(ParamParseError::UndeclaredGeneric((*undeclared).to_owned())));
                    }
                    if let Some(flag) = flag {
                        if !flag_words.contains(&flag.name) {
                            return Err(invalid(ParamParseError::UndeclaredFlags(flag.name.clone())));
                        }
                    }
                }
            }
            params.push(param);
        }

        if generics.contains(&ty.name) {
            ty.generic_ref = true;
        }

        Ok(Definition {
            namespace: path.into_iter().map(str::to_owned).collect(),
            name: name.to_owned(),
            id,
            params,
            ty,
            category: Category::Types,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_roundtrips() {
        let src = "invokeWithLayer#da9b0d0d {X:Type} layer:int query:!X = X";
        let def: Definition = src.parse().unwrap();
        assert!(def.ty.generic_ref);
        assert_eq!(def.to_string(), src);
    }

    #[test]
    fn derived_id_matches_explicit() {
        let def: Definition = "rpc_error error_code:int error_message:string = RpcError".parse().unwrap();
        assert_eq!(def.id, 0x2144ca19);
    }

    #[test]
    fn undeclared_flags_word() {
        let err = "foo#1 x:flags.0?int = Foo".parse::<Definition>().unwrap_err();
        assert_eq!(
            err,
            DefinitionError::InvalidParam {
                token: "x:flags.0?int".into(),
                source: ParamParseError::UndeclaredFlags("flags".into()),
            }
        );
    }

    #[test]
    fn undeclared_generic() {
        let err = "foo#1 q:!X = Foo".parse::<Definition>().unwrap_err();
        assert!(matches!(
            err,
            DefinitionError::InvalidParam { source: ParamParseError::UndeclaredGeneric(_), .. }
        ));
    }

    #[test]
    fn bad_id() {
        assert!(matches!(
            "foo#xyz = Foo".parse::<Definition>(),
            Err(DefinitionError::InvalidId(_))
        ));
    }

    #[test]
    fn missing_type() {
        assert_eq!("foo#1 a:int".parse::<Definition>(), Err(DefinitionError::MissingType));
    }
}
