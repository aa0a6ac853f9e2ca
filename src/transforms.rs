// transforms.rs - The optimization catalog.
//
// Each transform is a Visitor over the AST. Every rewrite must be an
// equivalence under the pattern's flag set: capture count, numbering,
// and the flag record are untouchable. Transforms that reshape their
// own children mutate the payload in place; replacing or removing the
// visited node itself goes through VisitAction.

use crate::ast::{
    is_quantifiable, node_new_character_set, AlternativeNode, CharacterClassNode,
    CharacterSetKind, CharacterSetNode, ClassKind, DirectiveKind, DirectiveNode, GroupNode,
    LookaroundAssertionNode, Node, NodeType, PatternNode, QuantifierKind, QuantifierNode,
    AbsentFunctionNode, CapturingGroupNode,
};
use crate::traverse::{PathCtx, VisitAction, Visitor};
use crate::unicode::property_short_alias;

// === alternationToClass ===

/// Fuse runs of adjacent single-character-ish alternatives into one
/// alternative holding a union class: `a|b|cd` -> `[ab]|cd`.
pub struct AlternationToClass;

fn fusable(alt: &Node) -> bool {
    let elements = match alt.elements() {
        Some(e) => e,
        None => return false,
    };
    if elements.len() != 1 {
        return false;
    }
    match &elements[0] {
        Node::Character(_) | Node::CharacterClass(_) => true,
        Node::CharacterSet(set) => set.kind.is_universal(),
        _ => false,
    }
}

fn fuse_alternation(alternatives: &mut Vec<Node>) {
    let mut out: Vec<Node> = Vec::with_capacity(alternatives.len());
    let mut run: Vec<Node> = Vec::new();

    fn flush(run: &mut Vec<Node>, out: &mut Vec<Node>) {
        if run.len() < 2 {
            out.append(run);
            return;
        }
        let elements = run
            .drain(..)
            .filter_map(|alt| match alt {
                Node::Alternative(mut a) => a.elements.pop(),
                _ => None,
            })
            .collect();
        let class = Node::CharacterClass(CharacterClassNode {
            kind: ClassKind::Union,
            negate: false,
            elements,
        });
        out.push(Node::Alternative(AlternativeNode {
            elements: vec![class],
        }));
    }

    for alt in alternatives.drain(..) {
        if fusable(&alt) {
            run.push(alt);
        } else {
            flush(&mut run, &mut out);
            out.push(alt);
        }
    }
    flush(&mut run, &mut out);
    *alternatives = out;
}

impl Visitor for AlternationToClass {
    fn enter_pattern(&mut self, node: &mut PatternNode, _: &PathCtx) -> VisitAction {
        fuse_alternation(&mut node.alternatives);
        VisitAction::Keep
    }
    fn enter_group(&mut self, node: &mut GroupNode, _: &PathCtx) -> VisitAction {
        fuse_alternation(&mut node.alternatives);
        VisitAction::Keep
    }
    fn enter_capturing_group(&mut self, node: &mut CapturingGroupNode, _: &PathCtx) -> VisitAction {
        fuse_alternation(&mut node.alternatives);
        VisitAction::Keep
    }
    fn enter_lookaround(&mut self, node: &mut LookaroundAssertionNode, _: &PathCtx) -> VisitAction {
        fuse_alternation(&mut node.alternatives);
        VisitAction::Keep
    }
    fn enter_absent_function(&mut self, node: &mut AbsentFunctionNode, _: &PathCtx) -> VisitAction {
        fuse_alternation(&mut node.alternatives);
        VisitAction::Keep
    }
}

// === removeEmptyGroups ===

/// Drop non-capturing groups whose every alternative is empty, and
/// quantifiers stacked over such groups.
pub struct RemoveEmptyGroups;

fn group_is_empty(alternatives: &[Node]) -> bool {
    alternatives
        .iter()
        .all(|a| matches!(a, Node::Alternative(alt) if alt.elements.is_empty()))
}

fn quantified_empty_group(node: &Node) -> bool {
    match node {
        Node::Group(g) => group_is_empty(&g.alternatives),
        Node::Quantifier(q) => quantified_empty_group(&q.element),
        _ => false,
    }
}

impl Visitor for RemoveEmptyGroups {
    fn enter_group(&mut self, node: &mut GroupNode, ctx: &PathCtx) -> VisitAction {
        if ctx.index.is_some() && group_is_empty(&node.alternatives) {
            VisitAction::Remove
        } else {
            VisitAction::Keep
        }
    }

    fn enter_quantifier(&mut self, node: &mut QuantifierNode, ctx: &PathCtx) -> VisitAction {
        if ctx.index.is_some() && quantified_empty_group(&node.element) {
            VisitAction::Remove
        } else {
            VisitAction::Keep
        }
    }
}

// === removeUselessFlags ===

/// Strip `x` from flag groups and directives; extended mode only shapes
/// tokenization, so it carries no meaning in an already-parsed tree.
/// Directives left with no modifiers are dropped.
pub struct RemoveUselessFlags;

impl Visitor for RemoveUselessFlags {
    fn enter_group(&mut self, node: &mut GroupNode, _: &PathCtx) -> VisitAction {
        if let Some(mods) = &mut node.flags {
            mods.enable.extended = false;
            mods.disable.extended = false;
            if mods.is_empty() {
                node.flags = None;
            }
        }
        VisitAction::Keep
    }

    fn enter_directive(&mut self, node: &mut DirectiveNode, ctx: &PathCtx) -> VisitAction {
        if let DirectiveKind::Flags(mods) = &mut node.kind {
            mods.enable.extended = false;
            mods.disable.extended = false;
            if mods.is_empty() && ctx.index.is_some() {
                return VisitAction::Remove;
            }
        }
        VisitAction::Keep
    }
}

// === unnestUselessClasses ===

/// Flatten classes nested without effect: inner non-negated unions
/// splice into a union parent; a lone inner union merges its negation
/// into the wrapper; singleton intersections unwrap.
pub struct UnnestUselessClasses;

impl Visitor for UnnestUselessClasses {
    fn enter_character_class(&mut self, node: &mut CharacterClassNode, _: &PathCtx) -> VisitAction {
        // Lone union child: the wrapper contributes only negation.
        if node.kind == ClassKind::Union && node.elements.len() == 1 {
            let taken = match node.elements.as_mut_slice() {
                [Node::CharacterClass(inner)] if inner.kind == ClassKind::Union => {
                    Some((inner.negate, std::mem::take(&mut inner.elements)))
                }
                _ => None,
            };
            if let Some((negate, elements)) = taken {
                node.negate ^= negate;
                node.elements = elements;
            }
        }

        // Singleton intersection children carry no intersection.
        for el in node.elements.iter_mut() {
            if let Node::CharacterClass(inner) = el {
                if inner.kind == ClassKind::Intersection && inner.elements.len() == 1 {
                    if let Some(single) = inner.elements.pop() {
                        *el = single;
                    }
                }
            }
        }

        // Non-negated union children of a union flatten in place.
        if node.kind == ClassKind::Union {
            let mut i = 0;
            while i < node.elements.len() {
                let splice = match &mut node.elements[i] {
                    Node::CharacterClass(inner)
                        if inner.kind == ClassKind::Union && !inner.negate =>
                    {
                        Some(std::mem::take(&mut inner.elements))
                    }
                    _ => None,
                };
                match splice {
                    // Leave the cursor: the spliced head may itself be
                    // a flattenable class.
                    Some(elements) => {
                        node.elements.splice(i..=i, elements);
                    }
                    None => i += 1,
                }
            }
        }

        if node.kind == ClassKind::Intersection && node.elements.len() == 1 {
            node.kind = ClassKind::Union;
        }
        VisitAction::Keep
    }
}

// === unwrapNegationWrappers ===

/// `[^\d]` -> `\D` by flipping the set's own negation; `[^\n]` -> `\N`
/// outside classes, except directly under a non-lazy quantifier, where
/// the engine mishandles `\N`.
pub struct UnwrapNegationWrappers;

impl Visitor for UnwrapNegationWrappers {
    fn enter_character_class(
        &mut self,
        node: &mut CharacterClassNode,
        ctx: &PathCtx,
    ) -> VisitAction {
        if node.kind != ClassKind::Union || !node.negate || node.elements.len() != 1 {
            return VisitAction::Keep;
        }
        match &node.elements[0] {
            Node::CharacterSet(set) if set.kind.is_universal() => {
                let mut set = set.clone();
                set.negate = !set.negate;
                VisitAction::replace(Node::CharacterSet(set))
            }
            Node::Character(c) if c.value == 0x0A && !ctx.in_class() => {
                match ctx.parent_quantifier {
                    Some(kind) if kind != QuantifierKind::Lazy => VisitAction::Keep,
                    _ => VisitAction::replace(node_new_character_set(
                        CharacterSetKind::Newline,
                        true,
                    )),
                }
            }
            _ => VisitAction::Keep,
        }
    }
}

// === unwrapUselessClasses ===

/// A non-negated union class holding a single character or set, seen
/// outside any class, is just that element.
pub struct UnwrapUselessClasses;

impl Visitor for UnwrapUselessClasses {
    fn enter_character_class(
        &mut self,
        node: &mut CharacterClassNode,
        ctx: &PathCtx,
    ) -> VisitAction {
        if ctx.in_class()
            || node.kind != ClassKind::Union
            || node.negate
            || node.elements.len() != 1
        {
            return VisitAction::Keep;
        }
        if !matches!(
            node.elements[0],
            Node::Character(_) | Node::CharacterSet(_)
        ) {
            return VisitAction::Keep;
        }
        match node.elements.pop() {
            Some(el) => VisitAction::replace(el),
            None => VisitAction::Keep,
        }
    }
}

// === unwrapUselessGroups ===

/// Splice single-alternative, non-atomic, unflagged groups into the
/// parent; under a quantifier, unwrap to the lone element when that
/// element is itself quantifiable. Groups holding a flags directive
/// stay: their close bracket bounds the directive's scope.
pub struct UnwrapUselessGroups;

impl Visitor for UnwrapUselessGroups {
    fn enter_group(&mut self, node: &mut GroupNode, ctx: &PathCtx) -> VisitAction {
        if node.atomic || node.flags.is_some() || node.alternatives.len() != 1 {
            return VisitAction::Keep;
        }
        let alt = match &mut node.alternatives[0] {
            Node::Alternative(alt) => alt,
            _ => return VisitAction::Keep,
        };
        let has_flag_directive = alt.elements.iter().any(|e| {
            matches!(
                e,
                Node::Directive(DirectiveNode {
                    kind: DirectiveKind::Flags(_),
                })
            )
        });
        if has_flag_directive {
            return VisitAction::Keep;
        }

        if ctx.index.is_some() {
            return VisitAction::replace_many(std::mem::take(&mut alt.elements), false);
        }
        if ctx.parent == Some(NodeType::Quantifier)
            && alt.elements.len() == 1
            && is_quantifiable(&alt.elements[0])
        {
            if let Some(el) = alt.elements.pop() {
                return VisitAction::replace(el);
            }
        }
        VisitAction::Keep
    }
}

// === useShorthands ===

/// Substitute shorthand sets for their longhand spellings wherever the
/// current flags keep the two equivalent. POSIX source forms rewrite
/// unconditionally; property forms stay put under the matching
/// `*IsAscii` / `posixIsAscii` flags, which narrow the shorthand but
/// not the property.
pub struct UseShorthands;

impl Visitor for UseShorthands {
    fn enter_character_set(&mut self, node: &mut CharacterSetNode, ctx: &PathCtx) -> VisitAction {
        let flags = ctx.flags;
        match node.kind {
            CharacterSetKind::Posix => {
                let rewrite = match node.value.as_deref() {
                    Some("digit") => Some(CharacterSetKind::Digit),
                    Some("space") => Some(CharacterSetKind::Space),
                    Some("xdigit") => Some(CharacterSetKind::Hex),
                    _ => None,
                };
                if let Some(kind) = rewrite {
                    node.kind = kind;
                    node.value = None;
                } else if node.value.as_deref() == Some("cntrl") && !flags.posix_is_ascii {
                    node.kind = CharacterSetKind::Property;
                    node.value = Some("Cc".to_string());
                }
            }
            CharacterSetKind::Property => {
                let rewrite = match node.value.as_deref() {
                    Some("Decimal_Number") | Some("Nd")
                        if !flags.digit_is_ascii && !flags.posix_is_ascii =>
                    {
                        Some(CharacterSetKind::Digit)
                    }
                    Some("ASCII_Hex_Digit") | Some("AHex") => Some(CharacterSetKind::Hex),
                    Some("White_Space") | Some("WSpace")
                        if !flags.space_is_ascii && !flags.posix_is_ascii =>
                    {
                        Some(CharacterSetKind::Space)
                    }
                    _ => None,
                };
                if let Some(kind) = rewrite {
                    node.kind = kind;
                    node.value = None;
                }
            }
            _ => {}
        }
        VisitAction::Keep
    }

    fn enter_character_class(&mut self, node: &mut CharacterClassNode, ctx: &PathCtx) -> VisitAction {
        if node.kind != ClassKind::Union {
            return VisitAction::Keep;
        }
        fuse_hex_ranges(node);
        fuse_full_range(node);
        if !ctx.flags.word_is_ascii && !ctx.flags.posix_is_ascii {
            fuse_word_properties(node);
        }
        VisitAction::Keep
    }
}

fn range_bounds(node: &Node) -> Option<(u32, u32)> {
    match node {
        Node::CharacterClassRange(r) => match (r.min.as_ref(), r.max.as_ref()) {
            (Node::Character(lo), Node::Character(hi)) => Some((lo.value, hi.value)),
            _ => None,
        },
        _ => None,
    }
}

/// `0-9`, `A-F`, `a-f` together are `\h`.
fn fuse_hex_ranges(class: &mut CharacterClassNode) {
    let mut found = [None; 3];
    for (i, el) in class.elements.iter().enumerate() {
        match range_bounds(el) {
            Some((0x30, 0x39)) if found[0].is_none() => found[0] = Some(i),
            Some((0x41, 0x46)) if found[1].is_none() => found[1] = Some(i),
            Some((0x61, 0x66)) if found[2].is_none() => found[2] = Some(i),
            _ => {}
        }
    }
    if let [Some(a), Some(b), Some(c)] = found {
        remove_indices(&mut class.elements, &[a, b, c]);
        class
            .elements
            .push(node_new_character_set(CharacterSetKind::Hex, false));
    }
}

/// The range over every code point is `\p{Any}`.
fn fuse_full_range(class: &mut CharacterClassNode) {
    let full = class
        .elements
        .iter()
        .position(|el| range_bounds(el) == Some((0, 0x10FFFF)));
    if let Some(i) = full {
        class.elements.remove(i);
        class.elements.push(Node::CharacterSet(CharacterSetNode {
            kind: CharacterSetKind::Property,
            negate: false,
            value: Some("Any".to_string()),
            variable_length: false,
        }));
    }
}

// Spellings per general category, with the subcategory sets that add up
// to it. Each inner slice lists the accepted names of one property.
const L_NAMES: &[&str] = &["L", "Letter"];
const L_SUBCATEGORIES: &[&[&str]] = &[
    &["Lu", "Uppercase_Letter"],
    &["Ll", "Lowercase_Letter"],
    &["Lt", "Titlecase_Letter"],
    &["Lm", "Modifier_Letter"],
    &["Lo", "Other_Letter"],
];
const M_NAMES: &[&str] = &["M", "Mark", "Combining_Mark"];
const M_SUBCATEGORIES: &[&[&str]] = &[
    &["Mn", "Nonspacing_Mark"],
    &["Mc", "Spacing_Mark"],
    &["Me", "Enclosing_Mark"],
];
const N_NAMES: &[&str] = &["N", "Number"];
const N_SUBCATEGORIES: &[&[&str]] = &[
    &["Nd", "Decimal_Number", "Digit"],
    &["Nl", "Letter_Number"],
    &["No", "Other_Number"],
];
const PC_NAMES: &[&str] = &["Pc", "Connector_Punctuation"];
const P_NAMES: &[&str] = &["P", "Punctuation"];

/// Index of the first non-negated property set spelled by any of
/// `spellings`.
fn find_property_set(elements: &[Node], spellings: &[&str]) -> Option<usize> {
    elements.iter().position(|el| match el {
        Node::CharacterSet(set) if set.kind == CharacterSetKind::Property && !set.negate => set
            .value
            .as_deref()
            .map_or(false, |v| spellings.contains(&v)),
        _ => false,
    })
}

/// Indices covering one general category: the category's own name, or
/// one set per subcategory when the whole set is present.
fn category_cover(
    elements: &[Node],
    names: &[&str],
    subcategories: &[&[&str]],
) -> Option<Vec<usize>> {
    if let Some(i) = find_property_set(elements, names) {
        return Some(vec![i]);
    }
    subcategories
        .iter()
        .map(|spellings| find_property_set(elements, spellings))
        .collect()
}

/// `\p{L}\p{M}\p{N}\p{Pc}` together are `\w`. Each of `L`/`M`/`N`
/// counts when spelled by name or assembled from its complete
/// subcategory set; `\p{P}` covers `Pc` as its supercategory, in which
/// case `P` stays and only the rest go.
fn fuse_word_properties(class: &mut CharacterClassNode) {
    let l = category_cover(&class.elements, L_NAMES, L_SUBCATEGORIES);
    let m = category_cover(&class.elements, M_NAMES, M_SUBCATEGORIES);
    let n = category_cover(&class.elements, N_NAMES, N_SUBCATEGORIES);
    let (mut gone, m, n) = match (l, m, n) {
        (Some(l), Some(m), Some(n)) => (l, m, n),
        _ => return,
    };
    let pc = find_property_set(&class.elements, PC_NAMES);
    let p_super = find_property_set(&class.elements, P_NAMES).is_some();
    if pc.is_none() && !p_super {
        return;
    }
    gone.extend(m);
    gone.extend(n);
    if let Some(pc) = pc {
        gone.push(pc);
    }
    remove_indices(&mut class.elements, &gone);
    class
        .elements
        .push(node_new_character_set(CharacterSetKind::Word, false));
}

fn remove_indices(elements: &mut Vec<Node>, indices: &[usize]) {
    let mut i = 0;
    elements.retain(|_| {
        let keep = !indices.contains(&i);
        i += 1;
        keep
    });
}

// === useUnicodeAliases ===

/// Canonicalize property names to their short aliases:
/// `\p{Decimal_Number}` -> `\p{Nd}`.
pub struct UseUnicodeAliases;

impl Visitor for UseUnicodeAliases {
    fn enter_character_set(&mut self, node: &mut CharacterSetNode, _: &PathCtx) -> VisitAction {
        if node.kind == CharacterSetKind::Property {
            if let Some(short) = node.value.as_deref().and_then(property_short_alias) {
                node.value = Some(short.to_string());
            }
        }
        VisitAction::Keep
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate;
    use crate::parser::{parse, ParseOptions};
    use crate::traverse::traverse;

    fn run_one<V: Visitor>(src: &str, visitor: &mut V) -> String {
        let mut ast = parse(src, &ParseOptions::default()).unwrap();
        traverse(&mut ast, visitor).unwrap();
        generate(&ast).unwrap().pattern
    }

    #[test]
    fn alternation_runs_fuse() {
        assert_eq!(run_one("a|b|cd", &mut AlternationToClass), "[ab]|cd");
        assert_eq!(run_one("a|b|c", &mut AlternationToClass), "[abc]");
        // Singleton runs stay put.
        assert_eq!(run_one("a|cd", &mut AlternationToClass), "a|cd");
        // Empty alternatives break runs.
        assert_eq!(run_one("a||b", &mut AlternationToClass), "a||b");
    }

    #[test]
    fn empty_groups_vanish() {
        assert_eq!(run_one("a(?:)b", &mut RemoveEmptyGroups), "ab");
        assert_eq!(run_one("a(?:)+b", &mut RemoveEmptyGroups), "ab");
        assert_eq!(run_one("a(?:|)b", &mut RemoveEmptyGroups), "ab");
        // Capturing and lookaround shells stay.
        assert_eq!(run_one("a()b", &mut RemoveEmptyGroups), "a()b");
        assert_eq!(run_one("a(?!)b", &mut RemoveEmptyGroups), "a(?!)b");
    }

    #[test]
    fn useless_flag_x_dropped() {
        assert_eq!(run_one("(?x:ab)", &mut RemoveUselessFlags), "(?:ab)");
        assert_eq!(run_one("(?ix:ab)", &mut RemoveUselessFlags), "(?i:ab)");
        assert_eq!(run_one("a(?x)b", &mut RemoveUselessFlags), "ab");
        assert_eq!(run_one("a(?m-x)b", &mut RemoveUselessFlags), "a(?m)b");
    }

    #[test]
    fn unnesting() {
        assert_eq!(run_one("[[a]]", &mut UnnestUselessClasses), "[a]");
        assert_eq!(run_one("[[^a]]", &mut UnnestUselessClasses), "[^a]");
        assert_eq!(run_one("[^[^a]]", &mut UnnestUselessClasses), "[a]");
        assert_eq!(run_one("[a[bc]d]", &mut UnnestUselessClasses), "[abcd]");
        // Negated inner classes cannot flatten into a union.
        assert_eq!(run_one("[a[^b]]", &mut UnnestUselessClasses), "[a[^b]]");
    }

    #[test]
    fn negation_wrappers() {
        assert_eq!(run_one("[^\\d]", &mut UnwrapNegationWrappers), "\\D");
        assert_eq!(run_one("[^\\S]", &mut UnwrapNegationWrappers), "\\s");
        assert_eq!(run_one("[^\\n]", &mut UnwrapNegationWrappers), "\\N");
        // The engine bug: no rewrite right under a non-lazy quantifier.
        assert_eq!(run_one("[^\\n]{2}", &mut UnwrapNegationWrappers), "[^\\n]{2}");
        assert_eq!(run_one("[^\\n]+?", &mut UnwrapNegationWrappers), "\\N+?");
        // Nested set wrappers flip in place.
        assert_eq!(run_one("[a[^\\d]]", &mut UnwrapNegationWrappers), "[a\\D]");
    }

    #[test]
    fn class_unwrapping() {
        assert_eq!(run_one("[a]", &mut UnwrapUselessClasses), "a");
        assert_eq!(run_one("[\\d]", &mut UnwrapUselessClasses), "\\d");
        // Metachars re-escape on the way out.
        assert_eq!(run_one("[.]", &mut UnwrapUselessClasses), "\\.");
        // Negated or multi-element classes stay.
        assert_eq!(run_one("[^a]", &mut UnwrapUselessClasses), "[^a]");
        assert_eq!(run_one("[ab]", &mut UnwrapUselessClasses), "[ab]");
    }

    #[test]
    fn group_unwrapping() {
        assert_eq!(run_one("(?:ab)c", &mut UnwrapUselessGroups), "abc");
        assert_eq!(run_one("(?:a)+", &mut UnwrapUselessGroups), "a+");
        assert_eq!(run_one("(?:ab)+", &mut UnwrapUselessGroups), "(?:ab)+");
        assert_eq!(run_one("(?>ab)c", &mut UnwrapUselessGroups), "(?>ab)c");
        assert_eq!(run_one("(?i:ab)c", &mut UnwrapUselessGroups), "(?i:ab)c");
        // A flags directive is scoped by the group; keep the shell.
        assert_eq!(run_one("(?:(?i)a)b", &mut UnwrapUselessGroups), "(?:(?i)a)b");
    }

    #[test]
    fn shorthand_substitution() {
        assert_eq!(run_one("\\p{Decimal_Number}", &mut UseShorthands), "\\d");
        assert_eq!(run_one("\\P{Nd}", &mut UseShorthands), "\\D");
        assert_eq!(run_one("[[:digit:]]", &mut UseShorthands), "[\\d]");
        assert_eq!(run_one("\\p{AHex}", &mut UseShorthands), "\\h");
        assert_eq!(run_one("[[:cntrl:]]", &mut UseShorthands), "[\\p{Cc}]");
        assert_eq!(run_one("[0-9A-Fa-f]", &mut UseShorthands), "[\\h]");
        assert_eq!(
            run_one("[\\p{L}\\p{M}\\p{N}\\p{Pc}]", &mut UseShorthands),
            "[\\w]"
        );
        // P as supercategory: it stays, the three others fold into \w.
        assert_eq!(
            run_one("[\\p{L}\\p{M}\\p{N}\\p{P}]", &mut UseShorthands),
            "[\\p{P}\\w]"
        );
        // Complete subcategory sets count as their category.
        assert_eq!(
            run_one(
                "[\\p{Lu}\\p{Ll}\\p{Lt}\\p{Lm}\\p{Lo}\\p{M}\\p{N}\\p{Pc}]",
                &mut UseShorthands
            ),
            "[\\w]"
        );
        assert_eq!(
            run_one("[\\p{L}\\p{M}\\p{Nd}\\p{Nl}\\p{No}\\p{Pc}]", &mut UseShorthands),
            "[\\w]"
        );
        // An incomplete subcategory set is not a category.
        assert_eq!(
            run_one("[\\p{Lu}\\p{Ll}\\p{M}\\p{N}\\p{Pc}]", &mut UseShorthands),
            "[\\p{Lu}\\p{Ll}\\p{M}\\p{N}\\p{Pc}]"
        );
        assert_eq!(
            run_one("[\\x{0}-\\x{10FFFF}]", &mut UseShorthands),
            "[\\p{Any}]"
        );
    }

    #[test]
    fn shorthand_flag_gates() {
        let run = |src: &str, flags: &str| {
            let mut ast = parse(
                src,
                &ParseOptions {
                    flags: flags.to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
            traverse(&mut ast, &mut UseShorthands).unwrap();
            generate(&ast).unwrap().pattern
        };
        // Property forms freeze under the narrowing flags.
        assert_eq!(run("\\p{Nd}", "D"), "\\p{Nd}");
        assert_eq!(run("\\p{Nd}", "P"), "\\p{Nd}");
        assert_eq!(run("\\p{White_Space}", "S"), "\\p{White_Space}");
        // POSIX forms rewrite regardless.
        assert_eq!(run("[[:digit:]]", "D"), "[\\d]");
        assert_eq!(run("[[:space:]]", "S"), "[\\s]");
        // cntrl is the exception: gated on posixIsAscii.
        assert_eq!(run("[[:cntrl:]]", "P"), "[[:cntrl:]]");
        // \h is ASCII-only, so no gate applies.
        assert_eq!(run("\\p{AHex}", "DPSW"), "\\h");
        // Word fusion is gated.
        assert_eq!(
            run("[\\p{L}\\p{M}\\p{N}\\p{Pc}]", "W"),
            "[\\p{L}\\p{M}\\p{N}\\p{Pc}]"
        );
    }

    #[test]
    fn alias_substitution() {
        assert_eq!(run_one("\\p{Decimal_Number}", &mut UseUnicodeAliases), "\\p{Nd}");
        assert_eq!(run_one("\\P{White_Space}", &mut UseUnicodeAliases), "\\P{WSpace}");
        assert_eq!(run_one("\\p{Nd}", &mut UseUnicodeAliases), "\\p{Nd}");
        assert_eq!(run_one("\\p{Greek}", &mut UseUnicodeAliases), "\\p{Greek}");
    }
}
