//! Build script: parse the bundled `.tl` schemas and compile them into
//! static descriptor tables.
//!
//! Adding definitions is as simple as editing a file in `tl/`; bump the
//! `// LAYER N` header when moving to a new layer.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use tlwire_gen::{Config, Outputs, generate};
use tlwire_parser::{layer_of, parse_tl_file, tl::Definition};

fn main() -> io::Result<()> {
    let out_dir = PathBuf::from(env::var_os("OUT_DIR").ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "OUT_DIR not set")
    })?);

    // ── Collect schema files ────────────────────────────────────────────────
    let mut all_defs: Vec<Definition> = Vec::new();
    let mut layer: i32 = 0;

    let schemas: &[(&str, bool)] = &[
        ("tl/api.tl",     cfg!(feature = "tl-api")),
        ("tl/mtproto.tl", cfg!(feature = "tl-mtproto")),
    ];

    for &(path, enabled) in schemas {
        println!("cargo:rerun-if-changed={path}");
        if !enabled {
            continue;
        }

        let content = fs::read_to_string(path)?;
        if let Some(n) = layer_of(&content) {
            layer = layer.max(n);
        }

        for result in parse_tl_file(&content) {
            match result {
                Ok(def) => all_defs.push(def),
                Err(e)  => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("{path}: {e}"),
                    ));
                }
            }
        }
    }

    // ── Build config from features ──────────────────────────────────────────
    let config = Config {
        gen_name_for_id:    cfg!(feature = "name-for-id"),
        register_functions: cfg!(feature = "deserializable-functions"),
    };

    // ── Generate code ───────────────────────────────────────────────────────
    let mut outputs = Outputs::from_dir(&out_dir)?;
    generate(&all_defs, &config, &mut outputs)?;
    outputs.flush()?;

    // Patch the LAYER constant into generated_common.rs
    let common_path = out_dir.join("generated_common.rs");
    let common = fs::read_to_string(&common_path)?;
    let patched = common.replace(
        "pub const LAYER: i32 = 0; // update via build.rs",
        &format!("pub const LAYER: i32 = {layer};"),
    );
    fs::File::create(&common_path)?.write_all(patched.as_bytes())?;

    Ok(())
}
