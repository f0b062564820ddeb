/*!
 * Source Reload Tests
 * Reopening a container description behind a live context
 */

use std::fs;
use std::path::Path;
use std::sync::Arc;

use nxfs::{
    ContentCache, FixedBudget, FsObjectType, MemorySource, NxFs, NxfsError, RuleDocument,
    TiffCodec,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn description(a: [i32; 2], b: [i32; 2]) -> String {
    format!(
        r#"{{
            "children": [
                {{"kind": "group", "name": "entry", "children": [
                    {{"kind": "field", "name": "a", "type": "int32", "shape": [2], "values": [{}, {}]}},
                    {{"kind": "field", "name": "b", "type": "int32", "shape": [2], "values": [{}, {}]}}
                ]}}
            ]
        }}"#,
        a[0], a[1], b[0], b[1]
    )
}

fn context(path: &Path) -> NxFs {
    let source = MemorySource::from_file(path).unwrap();
    NxFs::new(
        Box::new(source),
        &RuleDocument::empty(),
        ContentCache::new(Arc::new(FixedBudget::new(1 << 20)), 0),
        Arc::new(TiffCodec::new()),
    )
    .unwrap()
}

#[test]
fn test_rebuild_serves_new_content_for_uncached_paths() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scan.json");
    fs::write(&path, description([1, 2], [3, 4])).unwrap();

    let fs = context(&path);
    assert_eq!(&fs.read("/entry/a").unwrap()[..], b"1 2\n");

    fs::write(&path, description([7, 8], [9, 10])).unwrap();
    fs.rebuild().unwrap();

    // Already rendered content stays cached
    assert_eq!(&fs.read("/entry/a").unwrap()[..], b"1 2\n");
    assert_eq!(&fs.read("/entry/b").unwrap()[..], b"9 10\n");
    assert_eq!(fs.get_attributes("/entry/b").unwrap(), FsObjectType::File);
}

#[test]
fn test_reload_trigger_reopens_source() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scan.json");
    fs::write(&path, description([1, 2], [3, 4])).unwrap();

    let fs = context(&path);
    fs::write(&path, description([5, 6], [11, 12])).unwrap();

    assert!(matches!(
        fs.get_attributes("/entry/fuse_reload"),
        Err(NxfsError::NotFound(_))
    ));
    assert_eq!(&fs.read("/entry/b").unwrap()[..], b"11 12\n");
}

#[test]
fn test_failed_reopen_leaves_source_unavailable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scan.json");
    fs::write(&path, description([1, 2], [3, 4])).unwrap();

    let fs = context(&path);
    assert_eq!(&fs.read("/entry/a").unwrap()[..], b"1 2\n");

    fs::remove_file(&path).unwrap();
    assert!(matches!(fs.rebuild(), Err(NxfsError::SourceUnavailable(_))));

    // The tree and cache survive, the source does not
    assert_eq!(fs.list_children("/entry").unwrap(), ["a", "b"]);
    assert_eq!(&fs.read("/entry/a").unwrap()[..], b"1 2\n");
    assert!(matches!(fs.read("/entry/b"), Err(NxfsError::SourceUnavailable(_))));

    fs::write(&path, description([1, 2], [3, 4])).unwrap();
    fs.rebuild().unwrap();
    assert_eq!(&fs.read("/entry/b").unwrap()[..], b"3 4\n");
}

#[test]
fn test_missing_description_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let result = MemorySource::from_file(dir.path().join("absent.json"));
    assert!(matches!(result, Err(NxfsError::SourceUnavailable(_))));
}
