// optimize.rs - Optimization orchestrator.
//
// Parses, resolves the active transform set, then reruns the whole set
// until a full pass leaves the generated source unchanged. Equality of
// generated source is the termination test; a pass cap turns a
// non-converging (buggy) transform into an error instead of a hang.

use std::collections::HashMap;

use crate::ast::Node;
use crate::error::{RegexError, Result};
use crate::generator::generate;
use crate::parser::{parse, ParseOptions, Rules};
use crate::transforms;
use crate::traverse::{traverse, Visitor};
use crate::unicode::PropertyMap;

const MAX_PASSES: usize = 32;

/// Registry of optimizations, in run order. All are on by default and
/// all are safe to disable: every entry is an equivalence rewrite, so
/// none is semantics-critical.
pub const TRANSFORM_NAMES: &[&str] = &[
    "alternationToClass",
    "removeEmptyGroups",
    "removeUselessFlags",
    "unnestUselessClasses",
    "unwrapNegationWrappers",
    "unwrapUselessClasses",
    "unwrapUselessGroups",
    "useShorthands",
    "useUnicodeAliases",
];

fn transform_visitor(name: &str) -> Option<Box<dyn Visitor>> {
    match name {
        "alternationToClass" => Some(Box::new(transforms::AlternationToClass)),
        "removeEmptyGroups" => Some(Box::new(transforms::RemoveEmptyGroups)),
        "removeUselessFlags" => Some(Box::new(transforms::RemoveUselessFlags)),
        "unnestUselessClasses" => Some(Box::new(transforms::UnnestUselessClasses)),
        "unwrapNegationWrappers" => Some(Box::new(transforms::UnwrapNegationWrappers)),
        "unwrapUselessClasses" => Some(Box::new(transforms::UnwrapUselessClasses)),
        "unwrapUselessGroups" => Some(Box::new(transforms::UnwrapUselessGroups)),
        "useShorthands" => Some(Box::new(transforms::UseShorthands)),
        "useUnicodeAliases" => Some(Box::new(transforms::UseUnicodeAliases)),
        _ => None,
    }
}

/// The default enable map, as user-facing documentation of what can be
/// toggled through `overrides`.
pub fn optional_optimizations(disable: bool) -> HashMap<&'static str, bool> {
    TRANSFORM_NAMES.iter().map(|&n| (n, !disable)).collect()
}

#[derive(Clone, Debug, Default)]
pub struct OptimizeOptions {
    /// Flag string forwarded to the parser.
    pub flags: String,
    /// Parser rules forwarded as-is.
    pub rules: Rules,
    /// Per-transform on/off switches layered over the defaults.
    pub overrides: HashMap<String, bool>,
    /// When present, only the listed transforms run (before overrides).
    pub allow: Option<Vec<String>>,
}

/// Optimizer output: the rewritten source plus its AST.
#[derive(Clone, Debug)]
pub struct Optimized {
    pub pattern: String,
    pub ast: Node,
}

/// Rewrite `pattern` into an equivalent, usually shorter form.
pub fn optimize(pattern: &str, options: &OptimizeOptions) -> Result<Optimized> {
    let active = resolve_active(options)?;

    let parse_options = ParseOptions {
        flags: options.flags.clone(),
        rules: options.rules,
        unicode_property_map: Some(PropertyMap::builtin()),
        ..Default::default()
    };
    let mut ast = parse(pattern, &parse_options)?;
    let mut previous = generate(&ast)?.pattern;

    for _pass in 0..MAX_PASSES {
        for name in &active {
            // Names were validated against the registry above.
            if let Some(mut visitor) = transform_visitor(name) {
                traverse(&mut ast, visitor.as_mut())?;
            }
        }
        let current = generate(&ast)?.pattern;
        if current == previous {
            return Ok(Optimized {
                pattern: current,
                ast,
            });
        }
        previous = current;
    }
    Err(RegexError::NonConverging { passes: MAX_PASSES })
}

fn resolve_active(options: &OptimizeOptions) -> Result<Vec<String>> {
    if let Some(allow) = &options.allow {
        for name in allow {
            if !TRANSFORM_NAMES.contains(&name.as_str()) {
                return Err(RegexError::Invariant(format!(
                    "unknown optimization '{}'",
                    name
                )));
            }
        }
    }
    for name in options.overrides.keys() {
        if !TRANSFORM_NAMES.contains(&name.as_str()) {
            return Err(RegexError::Invariant(format!(
                "unknown optimization '{}'",
                name
            )));
        }
    }

    let mut active = Vec::new();
    for &name in TRANSFORM_NAMES {
        let mut on = match &options.allow {
            Some(allow) => allow.iter().any(|a| a == name),
            None => true,
        };
        if let Some(&forced) = options.overrides.get(name) {
            on = forced;
        }
        if on {
            active.push(name.to_string());
        }
    }
    Ok(active)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn optimize_default(src: &str) -> String {
        optimize(src, &OptimizeOptions::default()).unwrap().pattern
    }

    #[test]
    fn registry_toggles() {
        let all = optional_optimizations(false);
        assert!(all.values().all(|&v| v));
        assert_eq!(all.len(), TRANSFORM_NAMES.len());
        let none = optional_optimizations(true);
        assert!(none.values().all(|&v| !v));
    }

    #[test]
    fn unknown_names_rejected() {
        let opts = OptimizeOptions {
            allow: Some(vec!["definitelyNotATransform".to_string()]),
            ..Default::default()
        };
        assert!(optimize("a", &opts).is_err());

        let mut overrides = HashMap::new();
        overrides.insert("nope".to_string(), true);
        let opts = OptimizeOptions {
            overrides,
            ..Default::default()
        };
        assert!(optimize("a", &opts).is_err());
    }

    #[test]
    fn override_disables_a_default() {
        let mut overrides = HashMap::new();
        overrides.insert("unwrapUselessClasses".to_string(), false);
        let opts = OptimizeOptions {
            overrides,
            ..Default::default()
        };
        // Without unwrapping, the class shell survives.
        assert_eq!(optimize("[a]", &opts).unwrap().pattern, "[a]");
        assert_eq!(optimize_default("[a]"), "a");
    }

    #[test]
    fn untouched_patterns_pass_through() {
        for src in ["abc", "(a|bc)\\k<1>", "(?<=x)y", "a{2,3}"] {
            assert_eq!(optimize_default(src), src);
        }
    }

    #[test]
    fn fixed_point_is_idempotent() {
        for src in [
            "\\p{Decimal_Number}",
            "[0-9A-Fa-f]",
            "[[a]]",
            "a|b|c",
            "(?:a)(?:)b",
            "[^\\n]",
        ] {
            let once = optimize_default(src);
            assert_eq!(optimize_default(&once), once, "not idempotent for {}", src);
        }
    }
}
