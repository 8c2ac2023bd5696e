use apimodel_types::{
    parse_type, AnnotationItem, ClassTypeItem, Nullability, PrimitiveKind, TypeItem,
    TypeModifiers, TypeParseContext, TypeStringConfig, WildcardBound,
};
use pretty_assertions::assert_eq;

fn range() -> AnnotationItem {
    AnnotationItem::new("androidx.annotation.IntRange")
        .with_attribute("from", "0")
        .with_attribute("to", "255")
}

fn samples() -> Vec<(&'static str, TypeItem)> {
    let string = TypeItem::class("java.lang.String", vec![]);
    let inner = TypeItem::Class(ClassTypeItem {
        qualified_name: "test.pkg.Outer.Inner".into(),
        arguments: vec![TypeItem::variable("T")],
        outer: Some(Box::new(ClassTypeItem {
            qualified_name: "test.pkg.Outer".into(),
            arguments: vec![TypeItem::variable("K").with_nullability(Nullability::NonNull)],
            outer: None,
            modifiers: TypeModifiers::new(Nullability::NonNull),
        })),
        modifiers: TypeModifiers::new(Nullability::Nullable),
    });
    vec![
        (
            "primitive",
            TypeItem::primitive(PrimitiveKind::Int).with_annotation(range()),
        ),
        (
            "nullable class",
            string.clone().with_annotation(AnnotationItem::nullable()),
        ),
        (
            "array",
            TypeItem::array(TypeItem::array(
                string.clone().with_annotation(AnnotationItem::non_null()),
            ))
            .with_annotation(AnnotationItem::new("test.pkg.Dim")),
        ),
        (
            "vararg",
            TypeItem::varargs(TypeItem::variable("T").with_nullability(Nullability::Nullable)),
        ),
        (
            "wildcard",
            TypeItem::class(
                "java.util.List",
                vec![TypeItem::wildcard(Some(WildcardBound::Super(Box::new(
                    TypeItem::variable("T"),
                ))))],
            ),
        ),
        (
            "generic",
            TypeItem::class(
                "java.util.Map",
                vec![
                    TypeItem::variable("K").with_annotation(range()),
                    TypeItem::class("java.util.List", vec![TypeItem::wildcard(None)])
                        .with_nullability(Nullability::NonNull),
                ],
            ),
        ),
        ("inner class", inner),
    ]
}

fn context(config: &TypeStringConfig) -> TypeParseContext {
    TypeParseContext::new(config.kotlin_style_nulls, config.omit_common_packages)
        .with_type_parameters(["T", "K"])
}

#[test]
fn every_rendered_type_string_reparses_to_the_same_text() {
    for annotations in [false, true] {
        for kotlin_style_nulls in [false, true] {
            for omit_common_packages in [false, true] {
                let config = TypeStringConfig::new()
                    .with_annotations(annotations)
                    .with_kotlin_style_nulls(kotlin_style_nulls)
                    .with_omit_common_packages(omit_common_packages);
                let ctx = context(&config);
                for (label, ty) in samples() {
                    let text = ty.to_type_string(&config);
                    let reparsed = parse_type(&text, &ctx)
                        .unwrap_or_else(|err| panic!("{label} under {config:?}: {err}"));
                    assert_eq!(
                        reparsed.to_type_string(&config),
                        text,
                        "{label} under {config:?}"
                    );
                }
            }
        }
    }
}

#[test]
fn kotlin_rendering_of_sample_types() {
    let config = TypeStringConfig::new()
        .with_annotations(true)
        .with_kotlin_style_nulls(true)
        .with_omit_common_packages(true);
    let rendered: Vec<String> = samples()
        .into_iter()
        .map(|(_, ty)| ty.to_type_string(&config))
        .collect();
    assert_eq!(
        rendered,
        vec![
            "@androidx.annotation.IntRange(from=0, to=255) int".to_string(),
            "String?".to_string(),
            "String @test.pkg.Dim []![]!".to_string(),
            "T?...".to_string(),
            "java.util.List<? super T!>!".to_string(),
            "java.util.Map<@androidx.annotation.IntRange(from=0, to=255) K!,java.util.List<?>>!"
                .to_string(),
            "test.pkg.Outer<K>.Inner<T!>?".to_string(),
        ]
    );
}

#[test]
fn erased_form_matches_between_parsed_and_built_types() {
    let ctx = TypeParseContext::new(true, true).with_type_parameters(["T"]);
    let params = vec![apimodel_types::TypeParameter::new(
        "T",
        vec![TypeItem::class("java.lang.Number", vec![])],
    )];
    let parsed = parse_type("java.util.List<T!>![]", &ctx).unwrap();
    assert_eq!(parsed.erased_type_string(&params), "java.util.List[]");
    let var = parse_type("T?", &ctx).unwrap();
    assert_eq!(var.erased_type_string(&params), "java.lang.Number");
}
