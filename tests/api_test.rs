// api_test.rs - Public surface: prelude exports, factories, error
// taxonomy, and the generator contract.

use onigtree::ast::{
    node_new_assertion, node_new_capturing_group, node_new_character, node_new_character_class,
    node_new_character_class_range, node_new_character_set, node_new_posix_class,
    node_new_quantifier, node_new_unicode_property,
};
use onigtree::prelude::*;

#[test]
fn parse_generate_optimize_from_prelude() {
    let ast = parse("(?<w>\\w+)\\s\\k<w>", &ParseOptions::default()).unwrap();
    let gen = generate(&ast).unwrap();
    assert_eq!(gen.pattern, "(?<w>\\w+)\\s\\k<w>");
    assert_eq!(gen.flags, "");

    let optimized = optimize("[[a]]", &OptimizeOptions::default()).unwrap();
    assert_eq!(optimized.pattern, "a");
}

#[test]
fn factory_invariants() {
    // Ranges must be ascending Characters.
    let lo = node_new_character('a' as u32).unwrap();
    let hi = node_new_character('z' as u32).unwrap();
    assert!(node_new_character_class_range(lo, hi).is_ok());

    let lo = node_new_character('z' as u32).unwrap();
    let hi = node_new_character('a' as u32).unwrap();
    let err = node_new_character_class_range(lo, hi).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invariant);

    // Code point ceilings.
    assert!(node_new_character(MAX_CODE_POINT).is_ok());
    assert_eq!(
        node_new_character(MAX_CODE_POINT + 1).unwrap_err().kind(),
        ErrorKind::Syntax
    );

    // POSIX names are a closed set.
    assert!(node_new_posix_class("upper", false).is_ok());
    assert_eq!(
        node_new_posix_class("uppercase", false).unwrap_err().kind(),
        ErrorKind::Syntax
    );

    // Group names: leading alpha or connector punctuation.
    assert!(node_new_capturing_group(1, Some("ok_name".into()), vec![]).is_ok());
    assert!(node_new_capturing_group(1, Some("_ok".into()), vec![]).is_ok());
    assert!(node_new_capturing_group(1, Some("0bad".into()), vec![]).is_err());

    // Quantifier targets exclude assertions.
    let anchor = node_new_assertion(AssertionKind::StringStart, false).unwrap();
    assert_eq!(
        node_new_quantifier(QuantifierKind::Greedy, 0, 1, anchor)
            .unwrap_err()
            .kind(),
        ErrorKind::Invariant
    );

    // Class membership excludes non-universal sets.
    let grapheme = node_new_character_set(CharacterSetKind::Grapheme, false);
    assert_eq!(
        node_new_character_class(ClassKind::Union, false, vec![grapheme])
            .unwrap_err()
            .kind(),
        ErrorKind::Invariant
    );
}

#[test]
fn error_kinds_partition_failures() {
    let cases: &[(&str, ErrorKind)] = &[
        ("(", ErrorKind::Syntax),
        ("[z-a]", ErrorKind::Syntax),
        ("\\g<9>", ErrorKind::Reference),
        ("(?<!(a))", ErrorKind::Feature),
        ("(?~|x|y)", ErrorKind::Feature),
    ];
    for (pattern, kind) in cases {
        let e = parse(pattern, &ParseOptions::default()).unwrap_err();
        assert_eq!(e.kind(), *kind, "for {:?}: {}", pattern, e);
        // Every error renders a short human-readable message.
        assert!(!e.to_string().is_empty());
    }
}

#[test]
fn optional_optimizations_surface() {
    let defaults = optional_optimizations(false);
    assert!(defaults["useShorthands"]);
    assert!(defaults["unwrapUselessClasses"]);
    let disabled = optional_optimizations(true);
    assert!(disabled.values().all(|&v| !v));
}

#[test]
fn custom_property_map_round_trip() {
    let opts = ParseOptions {
        unicode_property_map: Some(PropertyMap::from_pairs([
            ("Greek", "Greek"),
            ("In_Basic_Latin", "In_Basic_Latin"),
        ])),
        ..Default::default()
    };
    let ast = parse("\\p{greek}\\P{IN BASIC LATIN}", &opts).unwrap();
    let gen = generate(&ast).unwrap();
    assert_eq!(gen.pattern, "\\p{Greek}\\P{In_Basic_Latin}");
}

#[test]
fn property_nodes_carry_canonical_values() {
    let ast = parse("\\p{Nd}", &ParseOptions::default()).unwrap();
    match &ast {
        Node::Regex(re) => {
            let alts = re.pattern.alternatives().unwrap();
            let set = alts[0].elements().unwrap()[0].as_character_set().unwrap();
            assert_eq!(set.kind, CharacterSetKind::Property);
            assert_eq!(set.value.as_deref(), Some("Nd"));
            assert!(!set.negate);
        }
        _ => unreachable!(),
    }
}

#[test]
fn generated_sets_respect_context() {
    // The same POSIX set spells differently in and out of a class.
    let inside = node_new_character_class(
        ClassKind::Union,
        false,
        vec![node_new_posix_class("alpha", false).unwrap()],
    )
    .unwrap();
    assert_eq!(generate(&inside).unwrap().pattern, "[[:alpha:]]");

    let outside = node_new_unicode_property("Greek", true);
    assert_eq!(generate(&outside).unwrap().pattern, "\\P{Greek}");
}

#[test]
fn variable_length_metadata() {
    let ast = parse("\\R\\N\\X", &ParseOptions::default()).unwrap();
    match &ast {
        Node::Regex(re) => {
            let alts = re.pattern.alternatives().unwrap();
            let els = alts[0].elements().unwrap();
            let r = els[0].as_character_set().unwrap();
            assert!(r.variable_length && !r.negate);
            let n = els[1].as_character_set().unwrap();
            assert!(!n.variable_length && n.negate);
            let x = els[2].as_character_set().unwrap();
            assert!(x.variable_length);
        }
        _ => unreachable!(),
    }
}
