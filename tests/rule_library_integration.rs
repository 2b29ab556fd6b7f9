use regexcraft::application::pattern::ReplaceMode;
use regexcraft::domain::DraftOrigin;
use regexcraft::infra::rule_library::{RuleLibrary, RuleLibraryError};
use regexcraft::state::{DraftPhase, Workbench};
use std::fs;
use tempfile::TempDir;

const HOUSE_STYLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rules>
  <dictionary name="House style">
    <rule id="R1" active="true" caseSensitive="false" wholeWord="true">
      <description>Spell out percent</description>
      <find>(\d+)\s?%</find>
      <replace>$1 percent</replace>
    </rule>
    <rule id="R2" active="false">
      <description>Old rule</description>
      <find>foo</find>
      <replace>bar</replace>
    </rule>
  </dictionary>
</rules>"#;

fn library() -> (TempDir, RuleLibrary) {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("Editing").join("English");
    fs::create_dir_all(&dir).unwrap();
    fs::create_dir_all(tmp.path().join("Proofing")).unwrap();
    fs::create_dir_all(tmp.path().join(".git")).unwrap();
    fs::write(dir.join("house.xml"), HOUSE_STYLE).unwrap();
    fs::write(dir.join("Legacy.XML"), "<dictionary name=\"Legacy\"/>").unwrap();
    fs::write(dir.join("notes.txt"), "not a dictionary").unwrap();
    let library = RuleLibrary::new(tmp.path());
    (tmp, library)
}

#[test]
fn test_browse_tree() {
    let (_tmp, library) = library();

    assert_eq!(library.list_purposes(), vec!["Editing", "Proofing"]);
    assert_eq!(library.list_languages("Editing").unwrap(), vec!["English"]);
    assert_eq!(
        library.list_dictionaries("Editing", "English").unwrap(),
        vec!["Legacy.XML", "house.xml"]
    );
}

#[test]
fn test_missing_root_lists_nothing() {
    let library = RuleLibrary::new("/definitely/not/here/regexcraft");
    assert!(library.list_purposes().is_empty());
}

#[test]
fn test_missing_dictionary_and_traversal() {
    let (_tmp, library) = library();
    assert!(matches!(
        library.load_dictionary("Editing", "English", "absent.xml"),
        Err(RuleLibraryError::NotFound(_))
    ));
    assert!(matches!(
        library.load_dictionary("..", "English", "house.xml"),
        Err(RuleLibraryError::InvalidName(_))
    ));
}

#[test]
fn test_loaded_rule_drives_the_workbench() {
    let (_tmp, library) = library();
    let dictionary = library
        .load_dictionary("Editing", "English", "house.xml")
        .unwrap();
    assert_eq!(dictionary.name, "House style");
    assert_eq!(dictionary.active_rules().count(), 1);

    let rule = dictionary.find_rule("R1").unwrap();
    let mut bench = Workbench::new();
    bench.load_rule(rule);

    assert_eq!(bench.phase(), DraftPhase::Ready);
    let draft = bench.draft().unwrap();
    assert_eq!(draft.origin(), &DraftOrigin::Rule { id: "R1".into() });
    assert!(!bench.options().part_of_word);

    let result = bench
        .substitute_on_text("Growth was 12% and then 7 %.", ReplaceMode::Template)
        .unwrap();
    assert_eq!(result, "Growth was 12 percent and then 7 percent.");
}
