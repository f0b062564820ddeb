/*!
 * Path Tests
 * Composition and normalization properties
 */

use nxfs::tree::paths;
use proptest::prelude::*;

#[test]
fn test_relative_column_paths() {
    assert_eq!(
        paths::normalize(&paths::join("/entry/table", "../x")).unwrap(),
        "/entry/x"
    );
    assert_eq!(paths::normalize("/entry/./y").unwrap(), "/entry/y");
}

proptest! {
    #[test]
    fn prop_join_inverts_parent(
        segments in prop::collection::vec("[a-z][a-z0-9_.]{0,6}", 0..6),
        name in "[a-z][a-z0-9_]{0,6}",
    ) {
        let parent = segments
            .iter()
            .fold(paths::ROOT.to_string(), |acc, segment| paths::join(&acc, segment));
        let child = paths::join(&parent, &name);

        prop_assert_eq!(paths::parent(&child), Some(parent.as_str()));
        prop_assert_eq!(paths::file_name(&child), name.as_str());
        prop_assert_eq!(paths::normalize(&child).unwrap(), child.clone());
    }
}
