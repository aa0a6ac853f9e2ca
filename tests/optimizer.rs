// optimizer.rs - Integration tests for the optimization pipeline:
// the concrete rewrite scenarios, idempotence, and the structural
// preservation guarantees every transform must honor.

use std::collections::HashMap;

use onigtree::ast::Node;
use onigtree::prelude::*;
use onigtree::traverse::traverse;

fn optimize_default(src: &str) -> String {
    optimize(src, &OptimizeOptions::default())
        .unwrap_or_else(|e| panic!("optimize failed for {:?}: {}", src, e))
        .pattern
}

fn optimize_allowing(src: &str, allow: &[&str]) -> String {
    let opts = OptimizeOptions {
        allow: Some(allow.iter().map(|s| s.to_string()).collect()),
        ..Default::default()
    };
    optimize(src, &opts)
        .unwrap_or_else(|e| panic!("optimize failed for {:?}: {}", src, e))
        .pattern
}

fn optimize_flags(src: &str, flags: &str) -> String {
    let opts = OptimizeOptions {
        flags: flags.to_string(),
        ..Default::default()
    };
    optimize(src, &opts).unwrap().pattern
}

/// Count capturing groups and collect their numbers, in walk order.
fn capture_numbers(root: &mut Node) -> Vec<u32> {
    struct Collect(Vec<u32>);
    impl Visitor for Collect {
        fn enter_capturing_group(
            &mut self,
            node: &mut onigtree::ast::CapturingGroupNode,
            _: &PathCtx,
        ) -> VisitAction {
            self.0.push(node.number);
            VisitAction::Keep
        }
    }
    let mut c = Collect(Vec::new());
    traverse(root, &mut c).unwrap();
    c.0
}

#[test]
fn scenario_property_to_shorthand() {
    assert_eq!(optimize_default("\\p{Decimal_Number}"), "\\d");
}

#[test]
fn scenario_hex_ranges() {
    // With only useShorthands active the class shell survives.
    assert_eq!(
        optimize_allowing("[0-9A-Fa-f]", &["useShorthands"]),
        "[\\h]"
    );
    // Defaults also unwrap it.
    assert_eq!(optimize_default("[0-9A-Fa-f]"), "\\h");
}

#[test]
fn scenario_word_cover() {
    assert_eq!(
        optimize_allowing("[\\p{L}\\p{M}\\p{N}\\p{Pc}]", &["useShorthands"]),
        "[\\w]"
    );
    assert_eq!(optimize_default("[\\p{L}\\p{M}\\p{N}\\p{Pc}]"), "\\w");
    // The complete subcategory set of L counts as L.
    assert_eq!(
        optimize_allowing(
            "[\\p{Lu}\\p{Ll}\\p{Lt}\\p{Lm}\\p{Lo}\\p{M}\\p{N}\\p{Pc}]",
            &["useShorthands"]
        ),
        "[\\w]"
    );
    assert_eq!(
        optimize_default("[\\p{Lu}\\p{Ll}\\p{Lt}\\p{Lm}\\p{Lo}\\p{M}\\p{N}\\p{Pc}]"),
        "\\w"
    );
    // ASCII-word flags veto the fusion.
    assert_eq!(
        optimize_flags("[\\p{L}\\p{M}\\p{N}\\p{Pc}]", "W"),
        "[\\p{L}\\p{M}\\p{N}\\p{Pc}]"
    );
}

#[test]
fn scenario_unnest() {
    assert_eq!(optimize_allowing("[[a]]", &["unnestUselessClasses"]), "[a]");
    assert_eq!(optimize_default("[[a]]"), "a");
}

#[test]
fn scenario_negated_newline() {
    assert_eq!(optimize_default("[^\\n]"), "\\N");
    // Suppressed directly under a non-lazy quantifier.
    assert_eq!(optimize_default("[^\\n]{2}"), "[^\\n]{2}");
    assert_eq!(optimize_default("[^\\n]+?"), "\\N+?");
}

#[test]
fn negation_wrapper_sets() {
    assert_eq!(optimize_default("[^\\d]"), "\\D");
    assert_eq!(optimize_default("[^\\W]"), "\\w");
    assert_eq!(optimize_default("[^\\p{L}]"), "\\P{L}");
}

#[test]
fn alternation_to_class() {
    assert_eq!(optimize_default("a|b|c"), "[abc]");
    assert_eq!(optimize_default("a|b|cd"), "[ab]|cd");
    assert_eq!(optimize_default("(a|b|c)"), "([abc])");
    assert_eq!(optimize_default("x|\\d|y"), "[x\\dy]");
    // Runs of one stay alternations.
    assert_eq!(optimize_default("ab|cd"), "ab|cd");
}

#[test]
fn group_cleanup() {
    assert_eq!(optimize_default("(?:ab)c"), "abc");
    assert_eq!(optimize_default("(?:a)+"), "a+");
    assert_eq!(optimize_default("a(?:)b"), "ab");
    assert_eq!(optimize_default("(?x:ab)"), "ab");
    // Atomic and flag groups are not unwrapped.
    assert_eq!(optimize_default("(?>ab)c"), "(?>ab)c");
    assert_eq!(optimize_default("(?i:ab)c"), "(?i:ab)c");
}

#[test]
fn alias_canonicalization() {
    assert_eq!(optimize_default("\\p{Lowercase_Letter}"), "\\p{Ll}");
    assert_eq!(optimize_default("\\P{Letter}"), "\\P{L}");
}

#[test]
fn shorthand_gates_follow_flags() {
    assert_eq!(optimize_flags("\\p{Nd}", "D"), "\\p{Nd}");
    assert_eq!(optimize_flags("[[:digit:]]", "D"), "\\d");
    assert_eq!(optimize_flags("\\p{White_Space}", "S"), "\\p{WSpace}");
    assert_eq!(optimize_flags("[[:space:]]", "S"), "\\s");
    // Gated cntrl keeps POSIX semantics; unwrapping then renders the
    // bare set in its out-of-class spelling.
    assert_eq!(optimize_flags("[[:cntrl:]]", "P"), "\\p{cntrl}");
    assert_eq!(optimize_flags("[[:cntrl:]]", ""), "\\p{Cc}");
}

#[test]
fn optimizer_idempotence() {
    for src in [
        "\\p{Decimal_Number}",
        "[0-9A-Fa-f]",
        "[[a]]",
        "a|b|c",
        "(?:a(?:b))",
        "[^\\n]",
        "[^\\n]{2}",
        "(?<x>a|b)\\k<x>",
        "(?~a|b)",
        "[\\p{L}\\p{M}\\p{N}\\p{Pc}]x|y",
        "(?=a|b)c",
        "a(?i)b|c",
    ] {
        let once = optimize_default(src);
        let twice = optimize_default(&once);
        assert_eq!(once, twice, "optimize not idempotent for {:?}", src);
    }
}

#[test]
fn capture_structure_preserved() {
    for src in [
        "(a)(b)(c)\\k<3>",
        "((a|b))+",
        "(?<n>(x)|y)",
        "(?:dead)(kept)",
    ] {
        let mut before = parse(src, &ParseOptions::default()).unwrap();
        let mut optimized = optimize(src, &OptimizeOptions::default()).unwrap();
        assert_eq!(
            capture_numbers(&mut before),
            capture_numbers(&mut optimized.ast),
            "capture structure changed for {:?}",
            src
        );
    }
}

#[test]
fn flag_record_preserved() {
    for (src, flags) in [("a|b", "imx"), ("\\p{Nd}", "DW"), ("[[a]]", "y{g}")] {
        let opts = OptimizeOptions {
            flags: flags.to_string(),
            ..Default::default()
        };
        let result = optimize(src, &opts).unwrap();
        assert_eq!(
            generate(&result.ast).unwrap().flags,
            flags,
            "flag record changed for {:?}",
            src
        );
    }
}

#[test]
fn optimized_output_reparses_cleanly() {
    for src in [
        "a|b|c",
        "[0-9A-Fa-f]",
        "(?:a)(?:)b",
        "[[\\d]]",
        "[^\\d]",
        "\\p{Decimal_Number}+",
        "(?<g>x|y)\\g<g>",
    ] {
        let out = optimize_default(src);
        assert!(
            parse(&out, &ParseOptions::default()).is_ok(),
            "optimized output for {:?} does not reparse: {:?}",
            src,
            out
        );
    }
}

#[test]
fn allow_list_restricts_and_overrides_extend() {
    // allow-list: only aliasing runs.
    assert_eq!(
        optimize_allowing("[[a]]\\p{Decimal_Number}", &["useUnicodeAliases"]),
        "[[a]]\\p{Nd}"
    );

    // override can re-enable on top of an allow-list.
    let mut overrides = HashMap::new();
    overrides.insert("unwrapUselessClasses".to_string(), true);
    let opts = OptimizeOptions {
        allow: Some(vec!["useUnicodeAliases".to_string()]),
        overrides,
        ..Default::default()
    };
    assert_eq!(optimize("[a]", &opts).unwrap().pattern, "a");
}

#[test]
fn returned_ast_matches_returned_pattern() {
    let result = optimize("a|b|c", &OptimizeOptions::default()).unwrap();
    assert_eq!(generate(&result.ast).unwrap().pattern, result.pattern);
}
