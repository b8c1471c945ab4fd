//! Constructor ID derivation for definitions written without an explicit `#id`.

/// Compute the CRC32-based TL constructor ID for a definition string.
///
/// The definition is normalised the way Telegram does before hashing:
/// presence-only `flags.N?true` parameters are dropped, generic brackets
/// become spaces, `bytes` is spelled `string`, and whitespace collapses to
/// single spaces around ` = `.
pub(crate) fn tl_id(definition: &str) -> u32 {
    let (lhs, rhs) = definition.split_once('=').unwrap_or((definition, ""));

    let params = lhs
        .split_whitespace()
        .filter(|tok| !tok.ends_with("?true"))
        .collect::<Vec<_>>()
        .join(" ");
    let rhs = rhs.split_whitespace().collect::<Vec<_>>().join(" ");

    let normalised = format!("{params} = {rhs}")
        .replace(['<', '>'], " ")
        .replace(":bytes", ":string")
        .replace("?bytes", "?string");
    let normalised = normalised.split_whitespace().collect::<Vec<_>>().join(" ");

    crc32fast::hash(normalised.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_id() {
        assert_eq!(tl_id("boolFalse = Bool"), 0xbc799737);
        assert_eq!(tl_id("boolTrue = Bool"), 0x997275b5);
    }

    #[test]
    fn whitespace_is_normalised() {
        assert_eq!(tl_id("  boolFalse   =   Bool"), 0xbc799737);
    }

    #[test]
    fn generic_brackets_and_bytes() {
        assert_eq!(tl_id("msgs_ack msg_ids:Vector<long> = MsgsAck"), 0x62d6b459);
        assert_eq!(
            tl_id("inputPhoto id:long access_hash:long file_reference:bytes = InputPhoto"),
            0x3bb3b94a
        );
    }

    #[test]
    fn presence_flags_are_ignored() {
        let def = "codeSettings flags:# allow_flashcall:flags.0?true current_number:flags.1?true \
                   allow_app_hash:flags.4?true allow_missed_call:flags.5?true \
                   allow_firebase:flags.7?true unknown_number:flags.9?true \
                   logout_tokens:flags.6?Vector<bytes> token:flags.8?string \
                   app_sandbox:flags.8?Bool = CodeSettings";
        assert_eq!(tl_id(def), 0xad253d78);
    }
}
