use std::path::Path;

use apimodel_core::{CollectingReporter, IssueCode};
use apimodel_model::{super_methods, Codebase, ModifiedItem, ModifierList};
use apimodel_signature::{
    write_package_artifacts, write_signature, FileFormat, SignatureCodebaseBuilder,
};
use pretty_assertions::assert_eq;

fn load(text: &str) -> Codebase {
    let mut reporter = CollectingReporter::new();
    let mut builder = SignatureCodebaseBuilder::new("test");
    assert!(builder.add_text(text, None, &mut reporter));
    assert_eq!(reporter.diagnostics(), &[]);
    builder.build()
}

fn assert_round_trips(text: &str, format: FileFormat) {
    let codebase = load(text);
    assert_eq!(write_signature(&codebase, &format), text);
}

const FOO_BAR: &str = "\
// Signature format: 2.0
package test.pkg {

  public class Bar extends test.pkg.Foo {
    method public void bar(String);
    method public void foo(int);
  }

  public class Foo {
    method public void foo(int);
  }

}

";

#[test]
fn java_style_file_round_trips() {
    assert_round_trips(
        "\
// Signature format: 2.0
package test.pkg {

  public abstract class Box<T extends Number> implements Comparable<test.pkg.Box<T>>, java.io.Serializable {
    ctor public Box(T);
    method public abstract <R> R map(java.util.function.Function<T,R> fn) throws java.io.IOException;
    method public int compareTo(test.pkg.Box<T> other);
    field public static final int SIZE = 4;
  }

  public enum Color {
    enum_constant public static final test.pkg.Color RED;
    method public static test.pkg.Color valueOf(String);
  }

  public static interface Color.Mixer extends java.util.function.Supplier<test.pkg.Color> {
  }

}

package test.pkg.sub {

  @Deprecated public final class Leaf {
    ctor @Deprecated public Leaf();
  }

}

",
        FileFormat::V2,
    );
}

#[test]
fn kotlin_style_file_round_trips() {
    assert_round_trips(
        "\
// Signature format: 5.0
package test.pkg {

  public final class K {
    ctor public K();
    method public String? f(x: String, y: int);
    method public java.util.List<String!> g();
    field public static final String NAME = \"k\";
  }

}

",
        FileFormat::V5,
    );
}

#[test]
fn foo_bar_overrides() {
    let codebase = load(FOO_BAR);
    let foo = codebase.find_class("test.pkg.Foo").unwrap();
    let bar = codebase.find_class("test.pkg.Bar").unwrap();
    assert_eq!(bar.super_class(), Some(foo));

    let bar_foo = bar.find_method("foo", &["int".to_string()]).unwrap();
    assert_eq!(super_methods(bar_foo), vec![foo.find_method("foo", &["int".to_string()]).unwrap()]);

    let bar_bar = bar
        .find_method("bar", &["java.lang.String".to_string()])
        .unwrap();
    assert!(super_methods(bar_bar).is_empty());
    assert!(bar_bar.modifiers().visibility().is_api());

    assert_round_trips(FOO_BAR, FileFormat::V2);
}

#[test]
fn later_files_reference_earlier_ones_and_errors_do_not_stop_loading() {
    let mut reporter = CollectingReporter::new();
    let mut builder = SignatureCodebaseBuilder::new("test");
    assert!(builder.add_text(FOO_BAR, Some(Path::new("a.txt")), &mut reporter));
    assert!(!builder.add_text(
        "package broken {\n  public class X {\n    method public void f(;\n  }\n}\n",
        Some(Path::new("broken.txt")),
        &mut reporter,
    ));
    assert!(builder.add_text(
        "package test.pkg {\n  public class Foo {\n  }\n  public class Baz extends test.pkg.Bar {\n  }\n}\n",
        Some(Path::new("c.txt")),
        &mut reporter,
    ));
    let codebase = builder.build();

    let parse_errors: Vec<_> = reporter.with_code(IssueCode::PARSE_ERROR).collect();
    assert_eq!(parse_errors.len(), 1);
    let location = parse_errors[0].location.as_ref().unwrap();
    assert_eq!(location.path.as_deref(), Some(Path::new("broken.txt")));
    assert_eq!(location.line, 3);

    let duplicates: Vec<_> = reporter.with_code(IssueCode::DUPLICATE_CLASS).collect();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].location.as_ref().unwrap().line, 2);

    assert!(codebase.find_class("broken.X").is_none());
    let baz = codebase.find_class("test.pkg.Baz").unwrap();
    assert_eq!(baz.all_superclasses().len(), 3);
    // The first declaration of Foo wins.
    assert_eq!(codebase.find_class("test.pkg.Foo").unwrap().methods().len(), 1);
}

#[test]
fn package_artifacts_report_unwritable_files_and_continue() {
    let codebase = load(
        "package a {\n  public class A {\n  }\n}\npackage b {\n  public class B {\n  }\n}\n",
    );
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("a.txt")).unwrap();

    let mut reporter = CollectingReporter::new();
    let written = write_package_artifacts(&codebase, &FileFormat::V3, dir.path(), &mut reporter);

    assert_eq!(written, vec![dir.path().join("b.txt")]);
    assert_eq!(reporter.with_code(IssueCode::IO_ERROR).count(), 1);
    let text = std::fs::read_to_string(dir.path().join("b.txt")).unwrap();
    assert_eq!(
        text,
        "// Signature format: 3.0\npackage b {\n\n  public class B {\n  }\n\n}\n\n"
    );
}
