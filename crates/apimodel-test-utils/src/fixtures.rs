use apimodel_model::{InputFormat, ProviderInput};

/// The same API described in one or more input formats.
#[derive(Clone, Debug)]
pub struct ApiFixture {
    pub name: String,
    pub inputs: Vec<ProviderInput>,
}

impl ApiFixture {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
        }
    }

    pub fn with_input(mut self, format: InputFormat, text: impl Into<String>) -> Self {
        self.inputs.push(ProviderInput::from_text(format, text));
        self
    }

    pub fn inputs_for(&self, format: InputFormat) -> Vec<ProviderInput> {
        self.inputs
            .iter()
            .filter(|input| input.format == format)
            .cloned()
            .collect()
    }
}

const FOO_BAR_SIGNATURE: &str = "\
// Signature format: 2.0
package test.pkg {

  public class Bar extends test.pkg.Foo {
    ctor public Bar();
    method public int bar(String);
    method public void foo(int);
  }

  public class Foo {
    ctor public Foo();
    method public void foo(int);
  }

}

";

const FOO_BAR_SOURCE: &str = r#"{
  "units": [
    {
      "path": "test/pkg/Foo.java",
      "package": "test.pkg",
      "types": [
        {
          "name": "Foo",
          "modifiers": ["public"],
          "constructors": [{ "modifiers": ["public"] }],
          "methods": [
            {
              "name": "foo",
              "return_type": "void",
              "modifiers": ["public"],
              "parameters": [{ "name": "i", "type": "int" }]
            }
          ]
        }
      ]
    },
    {
      "path": "test/pkg/Bar.java",
      "package": "test.pkg",
      "types": [
        {
          "name": "Bar",
          "modifiers": ["public"],
          "extends": ["Foo"],
          "constructors": [{ "modifiers": ["public"] }],
          "methods": [
            {
              "name": "foo",
              "return_type": "void",
              "modifiers": ["public"],
              "parameters": [{ "name": "i", "type": "int" }]
            },
            {
              "name": "bar",
              "return_type": "int",
              "modifiers": ["public"],
              "parameters": [{ "name": "s", "type": "String" }]
            }
          ]
        }
      ]
    }
  ]
}"#;

const FOO_BAR_CLASSPATH: &str = r#"{
  "classes": [
    {
      "binary_name": "test.pkg.Foo",
      "access_flags": 1,
      "super_binary_name": "java.lang.Object",
      "methods": [
        { "name": "<init>", "descriptor": "()V", "access_flags": 1 },
        { "name": "foo", "descriptor": "(I)V", "access_flags": 1 }
      ]
    },
    {
      "binary_name": "test.pkg.Bar",
      "access_flags": 1,
      "super_binary_name": "test.pkg.Foo",
      "methods": [
        { "name": "<init>", "descriptor": "()V", "access_flags": 1 },
        { "name": "foo", "descriptor": "(I)V", "access_flags": 1 },
        { "name": "bar", "descriptor": "(Ljava/lang/String;)I", "access_flags": 1 }
      ]
    }
  ]
}"#;

/// `Bar extends Foo`, with `Bar` overriding `foo(int)` and adding `bar(String)`, in every
/// input format.
pub fn foo_bar_fixture() -> ApiFixture {
    ApiFixture::new("foo-bar")
        .with_input(InputFormat::SignatureText, FOO_BAR_SIGNATURE)
        .with_input(InputFormat::SourceTree, FOO_BAR_SOURCE)
        .with_input(InputFormat::ClasspathIndex, FOO_BAR_CLASSPATH)
}
