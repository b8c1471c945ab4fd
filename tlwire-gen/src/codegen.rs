//! The public code-generation API.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use tlwire_parser::tl::{Category, Definition, ParameterType};

use crate::grouper;
use crate::metadata::Metadata;
use crate::namegen as n;

// ─── Config ───────────────────────────────────────────────────────────────────

/// Generation configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Emit `name_for_id(id) -> Option<&'static str>` in the common module,
    /// covering functions as well as constructors.
    pub gen_name_for_id: bool,
    /// Also list function descriptors in `SCHEMA`, so a registry seeded from
    /// it can decode RPC requests (useful for servers).
    pub register_functions: bool,
}

// ─── Outputs ─────────────────────────────────────────────────────────────────

/// Writers for each generated Rust source.
pub struct Outputs<W: Write> {
    /// Receives the layer constant, `SCHEMA`, `name_for_id`.
    pub common: W,
    /// Receives `pub mod types { … }` (constructor descriptors).
    pub types: W,
    /// Receives `pub mod functions { … }` (RPC function descriptors).
    pub functions: W,
}

impl Outputs<File> {
    /// Convenience constructor that creates the files inside `out_dir`.
    pub fn from_dir(out_dir: impl AsRef<Path>) -> io::Result<Self> {
        let p = out_dir.as_ref();
        Ok(Self {
            common:    File::create(p.join("generated_common.rs"))?,
            types:     File::create(p.join("generated_types.rs"))?,
            functions: File::create(p.join("generated_functions.rs"))?,
        })
    }
}

impl<W: Write> Outputs<W> {
    /// Flush all writers.
    pub fn flush(&mut self) -> io::Result<()> {
        self.common.flush()?;
        self.types.flush()?;
        self.functions.flush()
    }
}

// ─── Builtins ────────────────────────────────────────────────────────────────

/// Boxed types the codec implements natively; their constructors never get
/// descriptors.
const BUILTIN_TYPES: &[&str] = &["Bool", "True", "Vector"];

fn is_builtin(def: &Definition) -> bool {
    def.category == Category::Types
        && def.ty.namespace.is_empty()
        && BUILTIN_TYPES.contains(&def.ty.name.as_str())
}

// ─── Public API ───────────────────────────────────────────────────────────────

/// Generate descriptor tables from a slice of parsed TL definitions.
///
/// Nothing is written when the schema fails validation (duplicate ids,
/// several flags words, unresolved bare types, …); the error kind is then
/// [`io::ErrorKind::InvalidData`]. Call `outputs.flush()` when done.
pub fn generate<W: Write>(
    defs: &[Definition],
    config: &Config,
    outputs: &mut Outputs<W>,
) -> io::Result<()> {
    let defs: Vec<&Definition> = defs.iter().filter(|d| !is_builtin(d)).collect();
    let meta = Metadata::build(&defs)?;

    // Render everything first so a late failure leaves the writers untouched.
    let mut types = Vec::new();
    let mut functions = Vec::new();
    let mut common = Vec::new();
    write_descriptor_mod(&mut types, "types", &defs, Category::Types, &meta)?;
    write_descriptor_mod(&mut functions, "functions", &defs, Category::Functions, &meta)?;
    write_common(&mut common, &defs, config)?;

    outputs.types.write_all(&types)?;
    outputs.functions.write_all(&functions)?;
    outputs.common.write_all(&common)
}

// ─── Common module ────────────────────────────────────────────────────────────

fn write_common<W: Write>(out: &mut W, defs: &[&Definition], config: &Config) -> io::Result<()> {
    writeln!(out, "// @generated — do not edit by hand")?;
    writeln!(out, "// Re-run the build script to regenerate.")?;
    writeln!(out)?;
    writeln!(out, "/// The API layer this code was generated from.")?;
    writeln!(out, "pub const LAYER: i32 = 0; // update via build.rs")?;
    writeln!(out)?;

    writeln!(out, "/// Every descriptor a registry built from this schema starts with.")?;
    writeln!(out, "pub static SCHEMA: &[&crate::descriptor::TypeDescriptor] = &[")?;
    for def in sorted(defs) {
        let root = match def.category {
            Category::Types => "types",
            Category::Functions if config.register_functions => "functions",
            Category::Functions => continue,
        };
        writeln!(out, "    &{},", n::static_path(def, root))?;
    }
    writeln!(out, "];")?;

    if config.gen_name_for_id {
        writeln!(out)?;
        writeln!(out, "/// Returns the TL name for a known constructor or function ID.")?;
        writeln!(out, "pub fn name_for_id(id: u32) -> Option<&'static str> {{")?;
        writeln!(out, "    match id {{")?;
        for def in sorted(defs) {
            writeln!(out, "        {:#010x} => Some(\"{}\"),", def.id, def.full_name())?;
        }
        writeln!(out, "        _ => None,")?;
        writeln!(out, "    }}")?;
        writeln!(out, "}}")?;
    }

    Ok(())
}

fn sorted<'a>(defs: &[&'a Definition]) -> Vec<&'a Definition> {
    let mut v = defs.to_vec();
    v.sort_by_key(|d| (d.category == Category::Functions, d.full_name()));
    v
}

// ─── Descriptor modules ───────────────────────────────────────────────────────

fn write_descriptor_mod<W: Write>(
    out: &mut W,
    mod_name: &str,
    defs: &[&Definition],
    category: Category,
    meta: &Metadata,
) -> io::Result<()> {
    writeln!(out, "// @generated — do not edit by hand")?;
    writeln!(out, "pub mod {mod_name} {{")?;

    for (ns, bucket) in grouper::group_by_ns(defs, category) {
        let indent = if ns.is_empty() {
            "    "
        } else {
            writeln!(out, "    pub mod {ns} {{")?;
            "        "
        };

        writeln!(out, "{indent}#[allow(unused_imports)]")?;
        writeln!(out, "{indent}use crate::descriptor::{{Codec, Field, Kind, TypeDescriptor}};")?;

        for def in bucket {
            write_descriptor(out, indent, def, meta)?;
        }

        if !ns.is_empty() {
            writeln!(out, "    }}")?;
        }
    }

    writeln!(out, "}}")
}

fn write_descriptor<W: Write>(
    out: &mut W,
    indent: &str,
    def: &Definition,
    meta: &Metadata,
) -> io::Result<()> {
    let kind = match def.category {
        Category::Types     => "constructor",
        Category::Functions => "method",
    };
    writeln!(
        out,
        "\n{indent}/// [`{name}`](https://core.telegram.org/{kind}/{name})\n\
         {indent}///\n\
         {indent}/// Generated from:\n\
         {indent}/// ```text\n\
         {indent}/// {def}\n\
         {indent}/// ```",
        name = def.full_name(),
    )?;

    let kind_expr = match def.category {
        Category::Types     => "Kind::Constructor",
        Category::Functions => "Kind::Function",
    };
    let ty_name = if def.ty.generic_ref { def.ty.name.clone() } else { def.ty.full_name() };

    writeln!(out, "{indent}pub static {}: TypeDescriptor = TypeDescriptor {{", n::static_name(def))?;
    writeln!(out, "{indent}    id: {:#010x},", def.id)?;
    writeln!(out, "{indent}    name: \"{}\",", def.full_name())?;
    writeln!(out, "{indent}    ty: \"{ty_name}\",")?;
    writeln!(out, "{indent}    kind: {kind_expr},")?;
    writeln!(out, "{indent}    flags: {},", def.flag_words().next().is_some())?;

    let fields: Vec<String> = def
        .value_params()
        .map(|param| field_expr(param, meta))
        .collect::<io::Result<_>>()?;

    if fields.is_empty() {
        writeln!(out, "{indent}    fields: &[],")?;
    } else {
        writeln!(out, "{indent}    fields: &[")?;
        for field in fields {
            writeln!(out, "{indent}        {field},")?;
        }
        writeln!(out, "{indent}    ],")?;
    }
    writeln!(out, "{indent}}};")
}

fn field_expr(param: &tlwire_parser::tl::Parameter, meta: &Metadata) -> io::Result<String> {
    let ParameterType::Normal { ty, flag } = &param.ty else {
        return Err(n::invalid(format!("`{}` is a flags word, not a field", param.name)));
    };
    let codec = n::codec_expr(ty, meta)?;
    Ok(match flag {
        Some(fl) => format!("Field::optional(\"{}\", {}, {codec})", param.name, fl.index),
        None     => format!("Field::required(\"{}\", {codec})", param.name),
    })
}
