//! Schema-wide lookups and the consistency checks run before any output is
//! written.

use std::collections::{HashMap, HashSet};
use std::io;

use tlwire_parser::tl::{Category, Definition, ParameterType, Type};

use crate::namegen::{invalid, static_name};

pub(crate) struct Metadata<'a> {
    /// Constructors by full TL name (`future_salt`, `auth.sentCode`).
    by_name: HashMap<String, &'a Definition>,
    /// Constructors by the full name of the boxed type they build.
    by_type: HashMap<String, Vec<&'a Definition>>,
}

impl<'a> Metadata<'a> {
    /// Index `defs` and reject schemas the descriptor engine can't express.
    pub(crate) fn build(defs: &[&'a Definition]) -> io::Result<Self> {
        let mut meta = Self {
            by_name: HashMap::new(),
            by_type: HashMap::new(),
        };

        let mut ids: HashMap<u32, &Definition> = HashMap::new();
        let mut statics: HashSet<(Category, &[String], String)> = HashSet::new();

        for &def in defs {
            if let Some(prev) = ids.insert(def.id, def) {
                return Err(invalid(format!(
                    "constructor id {:#010x} is used by both `{}` and `{}`",
                    def.id,
                    prev.full_name(),
                    def.full_name()
                )));
            }
            if def.namespace.len() > 1 {
                return Err(invalid(format!("`{}`: only one namespace level is supported", def.full_name())));
            }
            if !statics.insert((def.category, def.namespace.as_slice(), static_name(def))) {
                return Err(invalid(format!("`{}` collides with another definition's item name", def.full_name())));
            }
            check_flags(def)?;

            if def.category == Category::Types {
                meta.by_name.insert(def.full_name(), def);
                meta.by_type.entry(def.ty.full_name()).or_default().push(def);
            }
        }

        Ok(meta)
    }

    /// Constructor id for a bare type reference.
    ///
    /// `future_salt` names a constructor directly; `%Message` names a boxed
    /// type, which must then have exactly one constructor.
    pub(crate) fn bare_constructor(&self, ty: &Type) -> Option<u32> {
        let name = ty.full_name();
        if let Some(def) = self.by_name.get(&name) {
            return Some(def.id);
        }
        match self.by_type.get(&name).map(Vec::as_slice) {
            Some([only]) => Some(only.id),
            _ => None,
        }
    }
}

/// At most one flags word, placed first, and `true` only behind a flag.
fn check_flags(def: &Definition) -> io::Result<()> {
    let words = def.flag_words().count();
    if words > 1 {
        return Err(invalid(format!("`{}` declares {words} flags words; only one is supported", def.full_name())));
    }
    if words == 1 && def.params.first().map(|p| &p.ty) != Some(&ParameterType::Flags) {
        return Err(invalid(format!("`{}`: the flags word must be the first parameter", def.full_name())));
    }
    for param in def.value_params() {
        if let ParameterType::Normal { ty, flag: None } = &param.ty {
            if ty.name == "true" {
                return Err(invalid(format!(
                    "`{}.{}`: `true` is only meaningful behind a flag",
                    def.full_name(),
                    param.name
                )));
            }
        }
    }
    Ok(())
}
