use docmeta_model::{canonical_name, TypeDescriptor, TypeNode};
use std::collections::HashMap;

/// Immutable-once-built snapshot of the type hierarchy.
///
/// Built in one pass over the flat type list plus a parent→children fold,
/// then held behind an `Arc` and swapped wholesale on refresh. Keys are
/// canonical (lower-cased) names; children and roots are sorted for
/// deterministic iteration.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    types: HashMap<String, TypeNode>,
    roots: Vec<String>,
}

impl Hierarchy {
    /// Build a snapshot from the bridge's flat type list.
    ///
    /// A descriptor whose super-type is unspecified or names an unknown type
    /// becomes a root. Duplicate names (after canonicalization) keep the last
    /// descriptor seen.
    #[must_use]
    pub fn build(descriptors: &[TypeDescriptor]) -> Self {
        let mut types: HashMap<String, TypeNode> = HashMap::with_capacity(descriptors.len());
        let mut children_of: HashMap<String, Vec<String>> = HashMap::new();

        for desc in descriptors {
            let node = TypeNode::from_descriptor(desc);
            if node.name.is_empty() {
                log::debug!("skipping type descriptor with empty name");
                continue;
            }
            if let Some(parent) = &node.super_type {
                children_of.entry(parent.clone()).or_default().push(node.name.clone());
            }
            types.insert(node.name.clone(), node);
        }

        let mut roots: Vec<String> = types
            .values()
            .filter(|node| {
                node.super_type
                    .as_ref()
                    .map_or(true, |parent| !types.contains_key(parent))
            })
            .map(|node| node.name.clone())
            .collect();
        roots.sort();

        // An unresolvable parent link would leave the node claiming a
        // super-type while sitting in the root list; drop the link so both
        // root notions agree.
        for name in &roots {
            if let Some(node) = types.get_mut(name) {
                if let Some(parent) = node.super_type.take() {
                    log::debug!("dropping unresolvable super-type {parent} on root {name}");
                }
            }
        }

        let mut folded: Vec<(String, Vec<String>)> = Vec::with_capacity(children_of.len());
        for (parent, mut kids) in children_of {
            if !types.contains_key(&parent) {
                continue;
            }
            // Duplicate descriptors are last-wins; keep only edges the final
            // node set actually asserts.
            kids.retain(|kid| {
                types
                    .get(kid)
                    .is_some_and(|node| node.super_type.as_deref() == Some(parent.as_str()))
            });
            kids.sort();
            kids.dedup();
            folded.push((parent, kids));
        }
        for (parent, kids) in folded {
            if let Some(node) = types.get_mut(&parent) {
                node.children = kids;
            }
        }

        Self { types, roots }
    }

    /// Lookup by canonical key.
    #[must_use]
    pub fn get(&self, canonical: &str) -> Option<&TypeNode> {
        self.types.get(canonical)
    }

    pub(crate) fn get_mut(&mut self, canonical: &str) -> Option<&mut TypeNode> {
        self.types.get_mut(canonical)
    }

    /// Root type names, sorted.
    #[must_use]
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Case-insensitive substring search over all type names, sorted.
    #[must_use]
    pub fn search(&self, pattern: &str) -> Vec<String> {
        let needle = canonical_name(pattern);
        let mut matches: Vec<String> = self
            .types
            .keys()
            .filter(|name| name.contains(&needle))
            .cloned()
            .collect();
        matches.sort();
        matches
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TypeNode> {
        self.types.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn desc(name: &str, super_type: Option<&str>) -> TypeDescriptor {
        TypeDescriptor {
            name: name.to_string(),
            super_type: super_type.map(str::to_string),
            is_internal: false,
        }
    }

    #[test]
    fn builds_sorted_roots_and_children() {
        let h = Hierarchy::build(&[
            desc("dm_sysobject", None),
            desc("dm_folder", Some("dm_sysobject")),
            desc("dm_document", Some("dm_sysobject")),
        ]);

        assert_eq!(h.roots(), &["dm_sysobject".to_string()]);
        assert_eq!(
            h.get("dm_sysobject").unwrap().children,
            vec!["dm_document".to_string(), "dm_folder".to_string()]
        );
    }

    #[test]
    fn unresolvable_super_type_becomes_root() {
        let h = Hierarchy::build(&[desc("orphan_type", Some("never_fetched"))]);
        assert_eq!(h.roots(), &["orphan_type".to_string()]);

        // The stale parent link is dropped, so the node itself agrees it is
        // a root.
        let node = h.get("orphan_type").unwrap();
        assert_eq!(node.super_type, None);
        assert!(node.is_root());
    }

    #[test]
    fn children_partition_the_type_set() {
        let h = Hierarchy::build(&[
            desc("dm_sysobject", None),
            desc("dm_document", Some("dm_sysobject")),
            desc("dm_folder", Some("dm_sysobject")),
            desc("dm_cabinet", Some("dm_folder")),
            desc("dmi_queue_item", None),
        ]);

        let mut seen: Vec<String> = h.roots().to_vec();
        for node in h.nodes() {
            seen.extend(node.children.iter().cloned());
        }
        seen.sort();
        assert_eq!(
            seen,
            vec!["dm_cabinet", "dm_document", "dm_folder", "dm_sysobject", "dmi_queue_item"]
        );

        for node in h.nodes() {
            for child in &node.children {
                assert_eq!(h.get(child).unwrap().super_type.as_deref(), Some(node.name.as_str()));
            }
        }
    }

    #[test]
    fn search_is_case_insensitive_and_sorted() {
        let h = Hierarchy::build(&[
            desc("dm_document", Some("dm_sysobject")),
            desc("my_document", Some("dm_document")),
            desc("dm_folder", Some("dm_sysobject")),
        ]);
        assert_eq!(h.search("DOC"), vec!["dm_document", "my_document"]);
        assert_eq!(h.search("zzz"), Vec::<String>::new());
    }

    #[test]
    fn mixed_case_descriptors_canonicalize() {
        let h = Hierarchy::build(&[
            desc("DM_SysObject", None),
            desc("DM_Document", Some("dm_sysobject")),
        ]);
        let node = h.get("dm_document").unwrap();
        assert_eq!(node.display_name, "DM_Document");
        assert_eq!(h.get("dm_sysobject").unwrap().children, vec!["dm_document"]);
    }
}
