/// Canonical lookup key for a type or attribute name.
///
/// The repository treats names as case-insensitive; every map write and read
/// in the cache goes through this one function so the invariant holds
/// everywhere rather than by convention at call sites.
#[must_use]
pub fn canonical_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(canonical_name("DM_Document"), "dm_document");
        assert_eq!(canonical_name("  dm_folder "), "dm_folder");
        assert_eq!(canonical_name("dm_sysobject"), "dm_sysobject");
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(canonical_name("   "), "");
    }
}
