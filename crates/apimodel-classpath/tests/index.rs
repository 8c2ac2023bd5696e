use apimodel_classpath::ClasspathIndex;
use apimodel_core::{CollectingReporter, IssueCode};
use apimodel_model::super_methods;
use apimodel_types::TypeStringConfig;
use pretty_assertions::assert_eq;

const COLLECTIONS: &str = r#"{
  "classes": [
    {
      "binary_name": "java.lang.Object",
      "access_flags": 1,
      "methods": [
        { "name": "<init>", "descriptor": "()V", "access_flags": 1 },
        { "name": "toString", "descriptor": "()Ljava/lang/String;", "access_flags": 1 }
      ]
    },
    {
      "binary_name": "test.Base",
      "access_flags": 1025,
      "super_binary_name": "java.lang.Object",
      "signature": "<T:Ljava/lang/Object;>Ljava/lang/Object;",
      "methods": [
        { "name": "get", "descriptor": "()Ljava/lang/Object;", "signature": "()TT;", "access_flags": 1025 },
        { "name": "toString", "descriptor": "()Ljava/lang/String;", "access_flags": 1 }
      ]
    }
  ]
}"#;

const DERIVED: &str = r#"{
  "classes": [
    {
      "binary_name": "test.Derived",
      "access_flags": 1,
      "super_binary_name": "test.Base",
      "signature": "Ltest/Base<Ljava/lang/String;>;",
      "methods": [
        { "name": "get", "descriptor": "()Ljava/lang/String;", "access_flags": 1 },
        { "name": "broken", "descriptor": "(", "access_flags": 1 }
      ]
    }
  ]
}"#;

#[test]
fn directory_of_indexes_becomes_a_codebase() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a-collections.json"), COLLECTIONS).unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    std::fs::write(dir.path().join("nested/b-derived.json"), DERIVED).unwrap();
    std::fs::write(dir.path().join("README.txt"), "not an index").unwrap();

    let index = ClasspathIndex::load_dir(dir.path()).unwrap();
    assert_eq!(index.len(), 3);

    let mut reporter = CollectingReporter::new();
    let codebase = index.to_codebase(&mut reporter);
    // `test.Derived` has an unparseable method descriptor and is left out.
    assert_eq!(reporter.with_code(IssueCode::INVALID_DESCRIPTOR).count(), 1);
    assert!(codebase.find_class("test.Derived").is_none());

    let base = codebase.find_class("test.Base").unwrap();
    assert_eq!(base.type_parameter_list()[0].name, "T");
    let get = base.find_method("get", &[]).unwrap();
    assert_eq!(get.return_type().to_type_string(&TypeStringConfig::default()), "T");

    let to_string = base.find_method("toString", &[]).unwrap();
    let object = codebase.find_class("java.lang.Object").unwrap();
    assert_eq!(super_methods(to_string), vec![object.find_method("toString", &[]).unwrap()]);
}

#[test]
fn generic_super_types_survive_conversion() {
    let mut index = ClasspathIndex::from_json_str(COLLECTIONS).unwrap();
    let fixed = DERIVED.replace(
        r#"{ "name": "broken", "descriptor": "(", "access_flags": 1 }"#,
        r#"{ "name": "size", "descriptor": "()I", "access_flags": 1 }"#,
    );
    index.extend(ClasspathIndex::from_json_str(&fixed).unwrap());

    let mut reporter = CollectingReporter::new();
    let codebase = index.to_codebase(&mut reporter);
    assert!(reporter.diagnostics().is_empty());

    let derived = codebase.find_class("test.Derived").unwrap();
    assert_eq!(
        derived
            .super_class_type()
            .unwrap()
            .to_type_string(&TypeStringConfig::default()),
        "test.Base<java.lang.String>"
    );
    let get = derived.find_method("get", &[]).unwrap();
    let base_get = codebase.find_class("test.Base").unwrap().find_method("get", &[]).unwrap();
    assert_eq!(super_methods(get), vec![base_get]);
}
