/*!
 * Rule Options Tests
 * Completeness and classification toggling
 */

use nxfs::rules::keys;
use nxfs::{FsObjectType, RuleOptions};

#[test]
fn test_file_requires_extension() {
    let mut options = RuleOptions::new().with_options([(keys::FSOBJECT_TYPE, "FILE")]);
    assert!(!options.is_complete());
    assert_eq!(options.missing(), vec![keys::EXTENSION]);

    options.set(keys::EXTENSION, ".txt");
    assert!(options.is_complete());
}

#[test]
fn test_classify_as_toggles_requirement() {
    let mut options = RuleOptions::new().with_options([(keys::FSOBJECT_TYPE, "FOLDER")]);
    assert!(options.is_complete());

    options.classify_as(FsObjectType::File);
    assert_eq!(options.fsobject_type(), Some(FsObjectType::File));
    assert!(options.is_required(keys::EXTENSION));
    assert!(!options.is_complete());

    options.classify_as(FsObjectType::Folder);
    assert!(!options.is_required(keys::EXTENSION));
    assert!(options.is_complete());
}

#[test]
fn test_type_is_always_required() {
    let options = RuleOptions::new().with_options([(keys::EXTENSION, ".csv")]);
    assert!(!options.is_complete());
    assert_eq!(options.missing(), vec![keys::FSOBJECT_TYPE]);
}

#[test]
fn test_set_options_replaces_everything() {
    let mut options = RuleOptions::new().with_options([
        (keys::FSOBJECT_TYPE, "FILE"),
        (keys::EXTENSION, ".txt"),
    ]);
    options.set_options([(keys::FSOBJECT_TYPE, "FOLDER")]);

    assert_eq!(options.len(), 1);
    assert_eq!(options.extension(), None);
    assert!(options.is_complete());
}

#[test]
fn test_unknown_type_is_none() {
    let options = RuleOptions::new().with_options([(keys::FSOBJECT_TYPE, "LINK")]);
    assert_eq!(options.fsobject_type(), Some(FsObjectType::None));
    assert!(options.is_complete());
}
