/*!
 * Filesystem Context Tests
 * Attribute, listing, size and range calls on a built context
 */

use std::sync::Arc;
use std::thread;

use nxfs::{
    ContentCache, FixedBudget, FsObjectType, MemorySource, NxFs, NxfsError, RuleDocument,
    TiffCodec, TypedArray,
};
use pretty_assertions::assert_eq;

const RULES: &str = r#"
<filters>
  <default_rules>
    <units>
      <fsobject_type>FILE</fsobject_type>
      <extension>.txt</extension>
    </units>
  </default_rules>
  <specific_rules>
    <object>
      <path>/entry/ghost</path>
      <mode>plain</mode>
      <plain><fsobject_type>SOCKET</fsobject_type></plain>
    </object>
  </specific_rules>
</filters>
"#;

fn context() -> NxFs {
    let source = MemorySource::builder("context")
        .group("/entry")
        .field("/entry/energy", &[3], TypedArray::Float64(vec![1.5, 2.5, 3.5]))
        .attribute("/entry/energy", "units", "keV")
        .field("/entry/ghost", &[1], TypedArray::UInt8(vec![1]))
        .group("/entry/sample")
        .field("/entry/sample/name", &[], TypedArray::String(vec!["quartz".into()]))
        .build()
        .unwrap();

    NxFs::new(
        Box::new(source),
        &RuleDocument::parse(RULES).unwrap(),
        ContentCache::new(Arc::new(FixedBudget::new(1 << 20)), 0),
        Arc::new(TiffCodec::new()),
    )
    .unwrap()
}

#[test]
fn test_root_is_folder() {
    let fs = context();
    assert_eq!(fs.get_attributes("/").unwrap(), FsObjectType::Folder);
}

#[test]
fn test_unknown_paths_are_not_found() {
    let fs = context();
    for path in ["/missing", "/entry/energy", "/entry/sample/name/x", ""] {
        assert!(
            matches!(fs.get_attributes(path), Err(NxfsError::NotFound(_))),
            "{} should not exist",
            path
        );
    }
}

#[test]
fn test_hidden_nodes_are_not_found() {
    let fs = context();
    assert!(matches!(fs.get_attributes("/entry/ghost"), Err(NxfsError::NotFound(_))));
    assert!(matches!(fs.read("/entry/ghost"), Err(NxfsError::NotFound(_))));
}

#[test]
fn test_listing_preserves_source_order() {
    let fs = context();
    assert_eq!(fs.list_children("/").unwrap(), ["entry"]);
    assert_eq!(
        fs.list_children("/entry").unwrap(),
        ["energy.txt", "ghost", "sample"]
    );
    assert_eq!(fs.list_children("/entry/sample").unwrap(), ["name"]);
}

#[test]
fn test_size_is_an_upper_bound_estimate() {
    let fs = context();
    let size = fs.content_size("/entry/energy.txt").unwrap();
    let content = fs.read("/entry/energy.txt").unwrap();

    assert_eq!(size, 3 + 3 * 64);
    assert!(content.len() as u64 <= size);
    assert_eq!(fs.content_size("/entry").unwrap(), 0);
}

#[test]
fn test_read_range_slicing() {
    let fs = context();
    let full = fs.read("/entry/energy.txt").unwrap();
    assert_eq!(&full[..], b"1.5 2.5 3.5\n");

    assert_eq!(&fs.read_range("/entry/energy.txt", 4, 3).unwrap()[..], b"2.5");
    assert_eq!(&fs.read_range("/entry/energy.txt", 8, 100).unwrap()[..], b"3.5\n");
    assert!(fs.read_range("/entry/energy.txt", 12, 10).unwrap().is_empty());
    assert!(fs.read_range("/entry/energy.txt", u64::MAX, 10).unwrap().is_empty());
}

#[test]
fn test_concurrent_reads_agree() {
    let fs = Arc::new(context());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let fs = Arc::clone(&fs);
            thread::spawn(move || {
                let path = if i % 2 == 0 { "/entry/energy.txt" } else { "/entry/sample/name" };
                fs.read(path).unwrap()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for (i, content) in results.iter().enumerate() {
        let expected: &[u8] = if i % 2 == 0 { b"1.5 2.5 3.5\n" } else { b"quartz\n" };
        assert_eq!(&content[..], expected);
    }
    assert_eq!(fs.cache_stats().misses, 2);
}
