//! Groups definitions by namespace for organised, deterministic output.

use std::collections::BTreeMap;

use tlwire_parser::tl::{Category, Definition};

/// Group definitions of `category` by their namespace (`""` for the global one).
///
/// Buckets and their contents are sorted so regenerating from the same
/// schema always produces byte-identical sources.
pub(crate) fn group_by_ns<'a>(
    defs: &[&'a Definition],
    category: Category,
) -> BTreeMap<String, Vec<&'a Definition>> {
    let mut map: BTreeMap<String, Vec<&'a Definition>> = BTreeMap::new();

    for def in defs.iter().copied().filter(|d| d.category == category) {
        map.entry(def.namespace.join("."))
            .or_default()
            .push(def);
    }

    for bucket in map.values_mut() {
        bucket.sort_by(|a, b| a.name.cmp(&b.name));
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_are_sorted() {
        let defs: Vec<Definition> = ["b#2 = B", "auth.z#3 = auth.Z", "a#1 = A", "auth.y#4 = auth.Y", "f#5 = F"]
            .into_iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let refs: Vec<&Definition> = defs.iter().collect();

        let grouped = group_by_ns(&refs, Category::Types);
        let names: Vec<(&str, Vec<&str>)> = grouped
            .iter()
            .map(|(ns, bucket)| (ns.as_str(), bucket.iter().map(|d| d.name.as_str()).collect()))
            .collect();
        assert_eq!(names, [("", vec!["a", "b", "f"]), ("auth", vec!["y", "z"])]);
        assert!(group_by_ns(&refs, Category::Functions).is_empty());
    }
}
