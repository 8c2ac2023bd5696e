use apimodel_bridge::{ClasspathBridge, MergeStats};
use apimodel_classpath::ClasspathIndex;
use apimodel_core::{CollectingReporter, IssueCode, Severity};
use apimodel_model::{Codebase, ProviderId, SelectableItem};
use apimodel_signature::SignatureCodebaseBuilder;
use pretty_assertions::assert_eq;

const API: &str = "\
// Signature format: 2.0
package test.pkg {

  public class Foo extends test.base.Base {
    ctor public Foo();
    method public void run(lib.Missing);
  }

  public class Shadowed {
  }

}

";

const CLASSPATH: &str = r#"{
  "classes": [
    {
      "binary_name": "java.lang.Object",
      "access_flags": 1,
      "methods": [{ "name": "<init>", "descriptor": "()V", "access_flags": 1 }]
    },
    {
      "binary_name": "test.base.Root",
      "access_flags": 1025,
      "super_binary_name": "java.lang.Object",
      "methods": [{ "name": "root", "descriptor": "()V", "access_flags": 1 }]
    },
    {
      "binary_name": "test.base.Base",
      "access_flags": 1,
      "super_binary_name": "test.base.Root",
      "methods": [{ "name": "base", "descriptor": "()I", "access_flags": 1 }]
    },
    {
      "binary_name": "test.pkg.Shadowed",
      "access_flags": 1,
      "super_binary_name": "java.lang.Object",
      "methods": [{ "name": "extra", "descriptor": "()V", "access_flags": 1 }]
    },
    {
      "binary_name": "test.pkg.Extra",
      "access_flags": 1,
      "super_binary_name": "java.lang.Object"
    },
    {
      "binary_name": "other.Unique",
      "access_flags": 1,
      "super_binary_name": "java.lang.Object"
    }
  ]
}"#;

fn text() -> Codebase {
    let mut reporter = CollectingReporter::new();
    let mut builder = SignatureCodebaseBuilder::new("api.txt");
    assert!(builder.add_text(API, None, &mut reporter));
    builder.build()
}

fn classpath() -> Codebase {
    let mut reporter = CollectingReporter::new();
    let codebase = ClasspathIndex::from_json_str(CLASSPATH)
        .unwrap()
        .to_codebase(&mut reporter);
    assert!(reporter.diagnostics().is_empty());
    codebase
}

fn superclass_names(codebase: &Codebase, name: &str) -> Vec<String> {
    codebase
        .find_class(name)
        .unwrap()
        .all_superclasses()
        .iter()
        .map(|class| class.qualified_name().to_string())
        .collect()
}

#[test]
fn stub_identity_survives_resolution() {
    let text = text();
    let classpath = classpath();
    let before = text.find_class("test.base.Base").unwrap();
    assert!(!before.is_resolved());
    let (id, key) = (before.id(), before.key());

    let merged = ClasspathBridge::merge(&text, &classpath).into_codebase();
    assert_eq!(merged.origin(), ProviderId::MERGED);

    let after = merged.find_class("test.base.Base").unwrap();
    assert_eq!(after.id(), id);
    assert_eq!(after.key(), key);
    assert!(after.is_resolved());
    assert!(!after.emit());
    assert!(merged.find_class("test.pkg.Foo").unwrap().emit());
    assert_eq!(
        superclass_names(&merged, "test.pkg.Foo"),
        vec!["test.base.Base", "test.base.Root", "java.lang.Object"]
    );
}

#[test]
fn text_declarations_win_and_missing_classes_are_copied() {
    let text = text();
    let classpath = classpath();
    let bridge = ClasspathBridge::merge(&text, &classpath);

    let shadowed = bridge.find_class("test.pkg.Shadowed").unwrap();
    assert!(shadowed.emit());
    assert!(shadowed.methods().is_empty());

    let extra = bridge.find_class("test.pkg.Extra").unwrap();
    assert!(extra.is_resolved());
    assert!(!extra.emit());
    assert!(bridge.find_class("other.Unique").unwrap().is_resolved());

    let missing = bridge.find_class("lib.Missing").unwrap();
    assert!(!missing.is_resolved());
    assert_eq!(bridge.unresolved_classes(), vec!["lib.Missing"]);
    assert_eq!(
        bridge.stats(),
        MergeStats {
            resolved: 3,
            unresolved: 1,
            copied: 2,
            unique_packages: 3,
        }
    );

    let names: Vec<&str> = bridge.codebase().packages().iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["", "java.lang", "lib", "other", "test.base", "test.pkg"]);

    let mut reporter = CollectingReporter::new();
    bridge.report_unresolved(&mut reporter);
    let reported: Vec<_> = reporter.with_code(IssueCode::UNRESOLVED_CLASS).collect();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].severity, Severity::Info);
}

#[test]
fn merging_twice_gives_the_same_graph() {
    let text = text();
    let classpath = classpath();
    let first = ClasspathBridge::merge(&text, &classpath).into_codebase();
    let second = ClasspathBridge::merge(&text, &classpath).into_codebase();

    let describe = |codebase: &Codebase| {
        let mut classes: Vec<(String, bool, bool)> = codebase
            .classes()
            .map(|c| (c.qualified_name().to_string(), c.is_resolved(), c.emit()))
            .collect();
        classes.sort();
        classes
    };
    assert_eq!(describe(&first), describe(&second));
    assert_eq!(first.size(), second.size());

    // Merging the merge result again changes nothing either.
    let again = ClasspathBridge::merge(&first, &classpath);
    assert_eq!(again.stats().resolved, 0);
    assert_eq!(again.stats().copied, 0);
    assert_eq!(describe(again.codebase()), describe(&first));
}

#[test]
fn classes_are_pulled_in_on_demand() {
    let text = text();
    let classpath = classpath();
    let mut bridge = ClasspathBridge::new(&text, &classpath);

    let id = bridge.ensure_class("test.base.Base");
    assert_eq!(id, text.find_class_id("test.base.Base"));
    assert_eq!(bridge.ensure_class("test.base.Base"), id);
    assert!(bridge.codebase().find_class("test.base.Root").unwrap().is_resolved());
    assert!(bridge.codebase().find_class("test.pkg.Extra").is_none());

    // Not merged yet: the lookup falls through to the classpath.
    let extra = bridge.find_class("test.pkg.Extra").unwrap();
    assert_eq!(extra.codebase().origin(), ProviderId::CLASSPATH);

    let missing = bridge.ensure_class("lib.Missing");
    assert_eq!(missing, text.find_class_id("lib.Missing"));
    assert!(!bridge.codebase().is_resolved(missing.unwrap()));
}
