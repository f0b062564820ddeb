/*!
 * Rule Resolution Tests
 * Precedence of hardcoded, default and specific rules through a built tree
 */

use nxfs::{
    FsObjectType, MemorySource, NxfsError, Rule, RuleDocument, TreeBuilder, TypedArray,
    VirtualTree,
};
use pretty_assertions::assert_eq;

const RULES: &str = r#"
<filters>
  <default_rules>
    <NX_class>
      <fsobject_type>FOLDER</fsobject_type>
    </NX_class>
    <long_name>
      <fsobject_type>FILE</fsobject_type>
      <extension>.txt</extension>
    </long_name>
    <image>
      <bit>16</bit>
      <colormetric>PHOTOMETRIC_MINISWHITE</colormetric>
    </image>
    <table_csv>
      <separator>;</separator>
    </table_csv>
  </default_rules>
  <specific_rules>
    <object>
      <path>/entry/signal</path>
      <mode>table_csv</mode>
      <table_csv>
        <fsobject_type>FILE</fsobject_type>
        <extension>.csv</extension>
      </table_csv>
    </object>
    <object>
      <path>/entry/detector/frames</path>
      <mode>image</mode>
      <image>
        <fsobject_type>FOLDER</fsobject_type>
        <extension>.tif</extension>
      </image>
    </object>
    <object>
      <path>/entry/detector/mask</path>
      <mode>image</mode>
      <image>
        <fsobject_type>FOLDER</fsobject_type>
        <extension>.tif</extension>
      </image>
    </object>
    <object>
      <path>/entry/broken</path>
      <mode>table_csv</mode>
      <table_csv>
        <fsobject_type>FILE</fsobject_type>
      </table_csv>
    </object>
    <object>
      <path>/entry/hidden</path>
      <mode>raw</mode>
      <raw>
        <fsobject_type>NOWHERE</fsobject_type>
      </raw>
    </object>
  </specific_rules>
</filters>
"#;

fn source() -> MemorySource {
    MemorySource::builder("resolution")
        .group("/entry")
        .attribute("/entry", "NX_class", "NXentry")
        .field("/entry/signal", &[2, 3], TypedArray::Float64(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]))
        .attribute("/entry/signal", "long_name", "Signal")
        .group("/entry/detector")
        .field("/entry/detector/frames", &[3, 4, 5], TypedArray::UInt16((0..60).collect()))
        .field("/entry/detector/mask", &[4, 5], TypedArray::UInt8(vec![0; 20]))
        .field("/entry/broken", &[2], TypedArray::Int16(vec![1, 2]))
        .attribute("/entry/broken", "long_name", "Broken")
        .field("/entry/hidden", &[1], TypedArray::Int8(vec![0]))
        .field("/entry/title", &[], TypedArray::String(vec!["run 1".into()]))
        .build()
        .unwrap()
}

fn tree() -> VirtualTree {
    let source = source();
    let document = RuleDocument::parse(RULES).unwrap();
    TreeBuilder::new(&source, &document).build().unwrap()
}

#[test]
fn test_hardcoded_classification() {
    let tree = tree();
    assert_eq!(tree.find("/entry/title").unwrap().object_type(), FsObjectType::File);
    assert_eq!(tree.find("/entry/detector").unwrap().object_type(), FsObjectType::Folder);
}

#[test]
fn test_specific_rule_beats_default() {
    let tree = tree();

    // long_name would name it signal.txt; the specific rule wins
    assert!(!tree.contains("/entry/signal.txt"));
    let node = tree.find("/entry/signal.csv").unwrap();
    assert!(matches!(node.rule, Some(Rule::Tabular(_))));
    assert_eq!(node.source_ref, "/entry/signal");
}

#[test]
fn test_specific_options_merge_mode_defaults() {
    let tree = tree();
    let node = tree.find("/entry/signal.csv").unwrap();
    let options = node.rule.as_ref().unwrap().options();
    assert_eq!(options.get("separator"), Some(";"));
    assert_eq!(options.extension(), Some(".csv"));
}

#[test]
fn test_incomplete_override_keeps_default() {
    let tree = tree();
    let node = tree.find("/entry/broken.txt").unwrap();
    assert!(matches!(node.rule, Some(Rule::Plain(_))));
    assert_eq!(node.object_type(), FsObjectType::File);
}

#[test]
fn test_image_expansion() {
    let tree = tree();

    let folder = tree.find("/entry/detector/frames").unwrap();
    assert_eq!(folder.object_type(), FsObjectType::Folder);
    assert_eq!(folder.children, vec!["0.tif", "1.tif", "2.tif"]);

    for index in 0..3 {
        let path = format!("/entry/detector/frames/{}.tif", index);
        let slice = tree.find(&path).unwrap();
        assert_eq!(slice.object_type(), FsObjectType::File);
        assert_eq!(slice.source_ref, "/entry/detector/frames");
        // 4 rows x 5 columns x 2 bytes (bit 16 from the image default) + header
        assert_eq!(slice.estimated_size, 4 * 5 * 2 + 186);

        let options = slice.rule.as_ref().unwrap().options();
        assert_eq!(options.get("part_number"), Some(index.to_string().as_str()));
        assert_eq!(options.get("colormetric"), Some("PHOTOMETRIC_MINISWHITE"));
    }
}

#[test]
fn test_image_on_wrong_rank_is_empty_folder() {
    let tree = tree();
    let mask = tree.find("/entry/detector/mask").unwrap();
    assert_eq!(mask.object_type(), FsObjectType::Folder);
    assert!(mask.children.is_empty());
}

#[test]
fn test_unknown_type_is_kept_but_hidden() {
    let tree = tree();
    let hidden = tree.find("/entry/hidden").unwrap();
    assert_eq!(hidden.object_type(), FsObjectType::None);
}

#[test]
fn test_invalid_rules_document() {
    assert!(matches!(
        RuleDocument::parse("<rules></rules>"),
        Err(NxfsError::ConfigParse(_))
    ));
    assert!(matches!(
        RuleDocument::parse("<filters><default_rules>"),
        Err(NxfsError::ConfigParse(_))
    ));
}
