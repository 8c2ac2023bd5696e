use apimodel_model::{super_methods, InputFormat, ProviderId, SelectableItem};
use apimodel_test_utils::{default_registry, foo_bar_fixture, ApiFixture, ProviderMatrix};
use pretty_assertions::assert_eq;

#[test]
fn overrides_agree_across_providers() {
    let registry = default_registry();
    let mut seen = Vec::new();
    let runs = ProviderMatrix::new(&registry).run(&foo_bar_fixture(), |case| {
        assert!(case.diagnostics.is_empty(), "{:?}", case.diagnostics);
        let codebase = &case.codebase;
        let foo = codebase.find_class("test.pkg.Foo").unwrap();
        let bar = codebase.find_class("test.pkg.Bar").unwrap();
        assert_eq!(bar.super_class(), Some(foo));

        let int = ["int".to_string()];
        let bar_foo = bar.find_method("foo", &int).unwrap();
        assert_eq!(super_methods(bar_foo), vec![foo.find_method("foo", &int).unwrap()]);
        let bar_bar = bar.find_method("bar", &["java.lang.String".to_string()]).unwrap();
        assert!(super_methods(bar_bar).is_empty());

        assert_eq!(bar.emit(), case.provider != ProviderId::CLASSPATH);
        seen.push(case.label());
    });

    assert_eq!(runs, 3);
    assert_eq!(
        seen,
        vec!["signature/signature-text", "source/source-tree", "classpath/classpath-index"]
    );
}

#[test]
#[should_panic(expected = "[classpath/classpath-index]")]
fn failures_name_their_case() {
    let registry = default_registry();
    ProviderMatrix::new(&registry).run(&foo_bar_fixture(), |case| {
        assert!(case.codebase.find_class("test.pkg.Bar").unwrap().emit());
    });
}

#[test]
#[should_panic(expected = "has no inputs any provider accepts")]
fn fixtures_without_inputs_are_rejected() {
    let registry = default_registry();
    ProviderMatrix::new(&registry).run(&ApiFixture::new("empty"), |_| {});
}

#[test]
fn only_formats_with_inputs_run() {
    let registry = default_registry();
    let fixture = ApiFixture::new("text-only").with_input(
        InputFormat::SignatureText,
        "// Signature format: 3.0\npackage a {\n\n  public class A {\n  }\n\n}\n\n",
    );
    let runs = ProviderMatrix::new(&registry).run(&fixture, |case| {
        assert_eq!(case.format, InputFormat::SignatureText);
        assert!(case.codebase.find_class("a.A").is_some());
    });
    assert_eq!(runs, 1);
}
