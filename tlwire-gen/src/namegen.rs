//! Functions that convert TL names and types to Rust identifiers and
//! descriptor expressions.

use std::io;

use tlwire_parser::tl::{Definition, Type};

use crate::metadata::Metadata;

/// `static` item name for a definition: `inputPeerUser` → `INPUT_PEER_USER`.
pub(crate) fn static_name(def: &Definition) -> String {
    to_screaming_snake(&def.name)
}

/// Path from the generated common module to a definition's static.
pub(crate) fn static_path(def: &Definition, root: &str) -> String {
    let mut s = format!("{root}::");
    for ns in &def.namespace {
        s.push_str(ns);
        s.push_str("::");
    }
    s.push_str(&static_name(def));
    s
}

/// Converts `camelCase` or `snake_case` into `SCREAMING_SNAKE_CASE`.
///
/// An underscore is inserted before an uppercase letter that follows a
/// lowercase letter or digit, so cap-runs like the `DH` in
/// `server_DH_params_ok` stay together.
pub(crate) fn to_screaming_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;

    for ch in name.chars() {
        if ch.is_ascii_uppercase()
            && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
        {
            out.push('_');
        }
        out.push(ch.to_ascii_uppercase());
        prev = Some(ch);
    }
    out
}

/// `Codec` expression for a primitive TL type name, if it is one.
fn primitive_codec(name: &str) -> Option<&'static str> {
    Some(match name {
        "int"    => "Codec::Int",
        "long"   => "Codec::Long",
        "double" => "Codec::Double",
        "int128" => "Codec::Int128",
        "int256" => "Codec::Int256",
        "string" => "Codec::String",
        "bytes"  => "Codec::Bytes",
        "Bool"   => "Codec::Bool",
        "true"   => "Codec::True",
        _ => return None,
    })
}

/// Rust expression building the `Codec` for a parameter type.
///
/// Fails when a bare reference cannot be resolved to exactly one
/// constructor of `meta`.
pub(crate) fn codec_expr(ty: &Type, meta: &Metadata) -> io::Result<String> {
    if ty.generic_ref {
        return Ok("Codec::Object".to_owned());
    }

    if ty.is_vector() {
        let arg = ty.generic_arg.as_deref().ok_or_else(|| {
            invalid(format!("`{ty}` is missing its element type"))
        })?;
        let inner = codec_expr(arg, meta)?;
        if inner == "Codec::True" {
            return Err(invalid(format!("`{ty}`: elements of type `true` take no space on the wire")));
        }
        let variant = if ty.is_bare() { "BareVector" } else { "Vector" };
        return Ok(format!("Codec::{variant}(&{inner})"));
    }

    if ty.namespace.is_empty() {
        if let Some(codec) = primitive_codec(&ty.name) {
            return Ok(codec.to_owned());
        }
    }

    if ty.is_bare() {
        let id = meta
            .bare_constructor(ty)
            .ok_or_else(|| invalid(format!("cannot resolve bare type `{ty}` to a single constructor")))?;
        return Ok(format!("Codec::Bare({id:#010x})"));
    }

    Ok("Codec::Object".to_owned())
}

pub(crate) fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screaming_snake() {
        assert_eq!(to_screaming_snake("inputPeerUser"), "INPUT_PEER_USER");
        assert_eq!(to_screaming_snake("server_DH_params_ok"), "SERVER_DH_PARAMS_OK");
        assert_eq!(to_screaming_snake("p_q_inner_data_dc"), "P_Q_INNER_DATA_DC");
        assert_eq!(to_screaming_snake("updatesTooLong"), "UPDATES_TOO_LONG");
        assert_eq!(to_screaming_snake("inputMediaGeoPoint2"), "INPUT_MEDIA_GEO_POINT2");
    }
}
