/*!
 * Virtual Tree Tests
 * Insert, lookup and rename behaviour
 */

use nxfs::rules::PlainRule;
use nxfs::tree::paths;
use nxfs::{NodeKind, NxfsError, Rule, VirtualNode, VirtualTree};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn node(parent: &str, name: &str, kind: NodeKind) -> VirtualNode {
    let path = paths::join(parent, name);
    VirtualNode::new(name, path.clone(), path, kind)
}

#[test]
fn test_insert_then_find() {
    let mut tree = VirtualTree::new();
    tree.insert(node("/", "entry", NodeKind::Group), "/").unwrap();
    tree.insert(node("/entry", "data", NodeKind::Field), "/entry")
        .unwrap();

    let found = tree.find("/entry/data").unwrap();
    assert_eq!(found.name, "data");
    assert_eq!(found.full_path, "/entry/data");
    assert_eq!(tree.list_children("/entry").unwrap(), ["data"]);
}

#[test]
fn test_rename_keeps_children_and_rule() {
    let mut tree = VirtualTree::new();
    tree.insert(
        node("/", "frames", NodeKind::Field).with_rule(PlainRule::folder()),
        "/",
    )
    .unwrap();
    tree.insert(node("/frames", "0.tif", NodeKind::Field), "/frames")
        .unwrap();
    tree.insert(node("/frames", "1.tif", NodeKind::Field), "/frames")
        .unwrap();
    tree.insert(node("/", "other", NodeKind::Field), "/").unwrap();

    let new_path = tree.rename("/frames", "frames.d").unwrap();
    assert_eq!(new_path, "/frames.d");

    let renamed = tree.find("/frames.d").unwrap();
    assert_eq!(renamed.name, "frames.d");
    assert_eq!(renamed.rule, Some(Rule::from(PlainRule::folder())));
    assert_eq!(renamed.children, vec!["0.tif", "1.tif"]);
    assert!(tree.contains("/frames.d/1.tif"));

    let root_children = tree.list_children("/").unwrap();
    assert_eq!(root_children, ["frames.d", "other"]);
}

#[test]
fn test_rename_collision() {
    let mut tree = VirtualTree::new();
    tree.insert(node("/", "a", NodeKind::Field), "/").unwrap();
    tree.insert(node("/", "a.txt", NodeKind::Field), "/").unwrap();

    assert!(matches!(
        tree.rename("/a", "a.txt"),
        Err(NxfsError::AlreadyExists(_))
    ));
    assert!(tree.contains("/a"));
}

#[test]
fn test_insert_rejects_mismatched_path() {
    let mut tree = VirtualTree::new();
    let stray = VirtualNode::new("x", "/elsewhere/x", "/x", NodeKind::Field);
    assert!(matches!(tree.insert(stray, "/"), Err(NxfsError::InvalidPath(_))));

    let bad_name = VirtualNode::new("a/b", "/a/b", "/a/b", NodeKind::Field);
    assert!(matches!(tree.insert(bad_name, "/"), Err(NxfsError::InvalidPath(_))));
}

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

proptest! {
    #[test]
    fn prop_insert_find_lists_once(names in prop::collection::vec(segment(), 1..12)) {
        let mut tree = VirtualTree::new();
        let mut parent = paths::ROOT.to_string();

        for name in &names {
            let path = paths::join(&parent, name);
            tree.insert(node(&parent, name, NodeKind::Group), &parent).unwrap();

            let found = tree.find(&path).unwrap();
            prop_assert_eq!(&found.full_path, &path);
            let listed = tree
                .list_children(&parent)
                .unwrap()
                .iter()
                .filter(|child| *child == name)
                .count();
            prop_assert_eq!(listed, 1);

            parent = path;
        }
        prop_assert_eq!(tree.len(), names.len() + 1);
    }

    #[test]
    fn prop_duplicate_siblings_rejected(names in prop::collection::vec(segment(), 1..16)) {
        let mut tree = VirtualTree::new();
        let mut accepted = std::collections::BTreeSet::new();

        for name in &names {
            let result = tree.insert(node("/", name, NodeKind::Field), "/");
            if accepted.insert(name.clone()) {
                prop_assert!(result.is_ok());
            } else {
                let is_duplicate = matches!(result, Err(NxfsError::AlreadyExists(_)));
                prop_assert!(is_duplicate);
            }
        }
        prop_assert_eq!(tree.list_children("/").unwrap().len(), accepted.len());
    }

    #[test]
    fn prop_rename_updates_one_entry(
        names in prop::collection::btree_set(segment(), 1..8),
        suffix in "\\.[a-z]{1,4}",
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let mut tree = VirtualTree::new();
        for name in &names {
            tree.insert(node("/", name, NodeKind::Field), "/").unwrap();
        }

        let target = &names[0];
        let new_name = format!("{}{}", target, suffix);
        prop_assume!(!names.contains(&new_name));

        let new_path = tree.rename(&paths::join("/", target), &new_name).unwrap();
        prop_assert_eq!(tree.find(&new_path).unwrap().name.as_str(), new_name.as_str());

        let children = tree.list_children("/").unwrap();
        prop_assert_eq!(children.len(), names.len());
        prop_assert_eq!(children.iter().filter(|c| **c == new_name).count(), 1);
        prop_assert!(!children.contains(target));
    }
}
