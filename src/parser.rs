// parser.rs - Token stream -> AST.
//
// Recursive descent driven by a single ParseContext bundle: cursor,
// running capturing-group list, named-group index, subroutine list, and
// the open-lookbehind stack. All state lives for one parse call.
//
// Lookbehind restrictions are enforced as elements are emitted into an
// alternative: a quantifier's body is therefore checked when the body
// itself was emitted, before the quantifier wraps it.

use std::collections::HashSet;

use smallvec::SmallVec;

use crate::ast::{
    is_quantifiable, node_new_alternative, node_new_assertion, node_new_backreference,
    node_new_character, node_new_character_class, node_new_character_class_range,
    node_new_character_set, node_new_directive, node_new_flags, node_new_group,
    node_new_lookaround, node_new_pattern, node_new_posix_class, node_new_quantifier,
    node_new_regex, node_new_subroutine, node_new_unicode_property, node_new_absent_function,
    node_new_capturing_group, CharacterSetKind, ClassKind, DirectiveKind, GroupRef,
    LookaroundKind, Node, QuantifierKind,
};
use crate::error::{RegexError, Result};
use crate::tokenizer::{
    tokenize, DirectiveToken, GroupOpenKind, Token, TokenKind, TokenizerOptions,
};
use crate::unicode::PropertyMap;

// === Options ===

/// Behavior toggles mirroring engine compile options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rules {
    /// ONIG_OPTION_CAPTURE_GROUP: bare groups capture even when named
    /// groups are present.
    pub capture_group: bool,
    /// ONIG_OPTION_SINGLELINE: `^` -> `\A`, `$` -> `\Z`.
    pub singleline: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ParseOptions {
    /// Initial flag string: `i m x D P S W`, `y{g}`/`y{w}`.
    pub flags: String,
    pub rules: Rules,
    /// Emit orphan backrefs instead of erroring when the target lies to
    /// the right.
    pub skip_backref_validation: bool,
    /// Suppress the lookbehind content restrictions.
    pub skip_lookbehind_validation: bool,
    /// Accept unknown Unicode property names verbatim.
    pub skip_property_name_validation: bool,
    /// Canonicalize unknown property names instead of erroring.
    pub normalize_unknown_property_names: bool,
    /// When present, property names not in the map are invalid (unless
    /// skipped or normalized). When absent, names pass through as-is.
    pub unicode_property_map: Option<PropertyMap>,
}

/// Parse Oniguruma `source` into a `Node::Regex`.
pub fn parse(source: &str, options: &ParseOptions) -> Result<Node> {
    let stream = tokenize(
        source,
        TokenizerOptions {
            flags: &options.flags,
            singleline: options.rules.singleline,
            skip_property_name_validation: options.skip_property_name_validation,
            normalize_unknown_property_names: options.normalize_unknown_property_names,
            property_map: options.unicode_property_map.as_ref(),
        },
    )?;

    let has_named_groups = stream.tokens.iter().any(|t| {
        matches!(
            t.kind,
            TokenKind::GroupOpen {
                kind: GroupOpenKind::Named { .. }
            }
        )
    });

    let mut ctx = ParseContext {
        tokens: &stream.tokens,
        pos: 0,
        capturing_groups: Vec::new(),
        named_groups: HashSet::new(),
        subroutines: Vec::new(),
        has_numbered_ref: false,
        lookbehind_stack: SmallVec::new(),
        has_named_groups,
        options,
    };

    let alternatives = ctx.parse_alternation()?;
    if !ctx.at_end() {
        // Only a stray GroupClose can be left over, and the tokenizer
        // already balances brackets.
        return Err(RegexError::Invariant("tokens remain after parse".to_string()));
    }
    ctx.validate()?;

    let pattern = node_new_pattern(alternatives)?;
    node_new_regex(pattern, node_new_flags(stream.flags))
}

// === Parse Context ===

struct ParseContext<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// One name slot per capturing group, in numbering order.
    capturing_groups: Vec<Option<String>>,
    /// Names with at least one definition so far. Duplicates are
    /// allowed, but they lose their name as a subroutine target.
    named_groups: HashSet<String>,
    /// Deferred to whole-pattern validation; subroutines may point
    /// rightward.
    subroutines: Vec<GroupRef>,
    has_numbered_ref: bool,
    /// Negate flag of each open lookbehind, innermost last.
    lookbehind_stack: SmallVec<[bool; 4]>,
    has_named_groups: bool,
    options: &'a ParseOptions,
}

impl<'a> ParseContext<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&'a TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn bump(&mut self) -> Option<&'a TokenKind> {
        let t = self.tokens.get(self.pos).map(|t| &t.kind);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn capture_count(&self) -> u32 {
        self.capturing_groups.len() as u32
    }

    // === Alternation ===

    /// Parse alternatives until a `GroupClose` or the end of input; the
    /// terminator is left for the caller.
    fn parse_alternation(&mut self) -> Result<Vec<Node>> {
        let mut alternatives = Vec::new();
        let mut elements: Vec<Node> = Vec::new();
        loop {
            match self.peek() {
                None | Some(TokenKind::GroupClose) => break,
                Some(TokenKind::Alternator) => {
                    self.pos += 1;
                    alternatives.push(node_new_alternative(std::mem::take(&mut elements)));
                }
                Some(_) => {
                    self.parse_element(&mut elements)?;
                }
            }
        }
        alternatives.push(node_new_alternative(elements));
        Ok(alternatives)
    }

    fn parse_element(&mut self, elements: &mut Vec<Node>) -> Result<()> {
        let kind = match self.bump() {
            Some(kind) => kind,
            None => {
                return Err(RegexError::Invariant(
                    "element parse past end of tokens".to_string(),
                ))
            }
        };
        match kind {
            TokenKind::Character { value } => {
                self.emit(elements, node_new_character(*value)?)
            }
            TokenKind::CharacterSet {
                kind,
                negate,
                value,
            } => {
                let node = build_character_set(*kind, *negate, value.as_deref())?;
                self.emit(elements, node)
            }
            TokenKind::Assertion { kind, negate } => {
                self.emit(elements, node_new_assertion(*kind, *negate)?)
            }
            TokenKind::Directive { kind } => {
                let node = match kind {
                    DirectiveToken::Keep => node_new_directive(DirectiveKind::Keep),
                    DirectiveToken::Flags(mods) => {
                        node_new_directive(DirectiveKind::Flags(*mods))
                    }
                };
                self.emit(elements, node)
            }
            TokenKind::Backreference { target } => {
                let node = self.resolve_backreference(target)?;
                self.emit(elements, node)
            }
            TokenKind::Subroutine { target } => {
                if matches!(target, GroupRef::Number(n) if *n > 0) {
                    self.has_numbered_ref = true;
                }
                self.subroutines.push(target.clone());
                self.emit(elements, node_new_subroutine(target.clone()))
            }
            TokenKind::Quantifier { min, max, kind } => {
                let target = elements.pop().ok_or_else(|| {
                    RegexError::Syntax("target of repeat operator is not specified".to_string())
                })?;
                if !is_quantifiable(&target) {
                    return Err(RegexError::Syntax(
                        "target of repeat operator is invalid".to_string(),
                    ));
                }
                // Reversed bounds reinterpret the quantifier as
                // possessive with the bounds swapped.
                let (min, max, kind) = if min > max {
                    (*max, *min, QuantifierKind::Possessive)
                } else {
                    (*min, *max, *kind)
                };
                let node = node_new_quantifier(kind, min, max, target)?;
                self.emit(elements, node)
            }
            TokenKind::CharacterClassOpen { negate } => {
                let node = self.parse_character_class(*negate)?;
                self.emit(elements, node)
            }
            TokenKind::GroupOpen { kind } => {
                let node = self.parse_group(kind.clone())?;
                self.emit(elements, node)
            }
            TokenKind::Alternator | TokenKind::GroupClose => {
                Err(RegexError::Invariant("alternation token in element position".to_string()))
            }
            TokenKind::CharacterClassClose
            | TokenKind::CharacterClassHyphen
            | TokenKind::CharacterClassIntersector => Err(RegexError::Invariant(
                "class token outside a character class".to_string(),
            )),
        }
    }

    /// Append `node` to the current alternative, applying the
    /// lookbehind content restrictions to each emitted child.
    fn emit(&mut self, elements: &mut Vec<Node>, node: Node) -> Result<()> {
        if !self.lookbehind_stack.is_empty() && !self.options.skip_lookbehind_validation {
            self.check_lookbehind_child(&node)?;
        }
        elements.push(node);
        Ok(())
    }

    fn check_lookbehind_child(&self, node: &Node) -> Result<()> {
        let any_negative = self.lookbehind_stack.iter().any(|&n| n);
        let any_positive = self.lookbehind_stack.iter().any(|&n| !n);
        match node {
            Node::LookaroundAssertion(la) => match la.kind {
                LookaroundKind::Lookahead => Err(RegexError::Feature(
                    "lookahead is not allowed inside lookbehind".to_string(),
                )),
                LookaroundKind::Lookbehind if la.negate && any_positive => {
                    Err(RegexError::Feature(
                        "negative lookbehind is not allowed inside positive lookbehind"
                            .to_string(),
                    ))
                }
                LookaroundKind::Lookbehind => Ok(()),
            },
            Node::CapturingGroup(_) if any_negative => Err(RegexError::Feature(
                "capturing group is not allowed inside negative lookbehind".to_string(),
            )),
            _ => Ok(()),
        }
    }

    // === Groups ===

    fn parse_group(&mut self, kind: GroupOpenKind) -> Result<Node> {
        match kind {
            GroupOpenKind::Bare => {
                // With named groups present (and no capture_group
                // rule), bare groups do not capture.
                if self.has_named_groups && !self.options.rules.capture_group {
                    let alternatives = self.parse_group_body()?;
                    Ok(node_new_group(false, None, alternatives))
                } else {
                    self.parse_capturing_group(None)
                }
            }
            GroupOpenKind::Named { name } => self.parse_capturing_group(Some(name)),
            GroupOpenKind::NonCapturing { flags } => {
                let alternatives = self.parse_group_body()?;
                Ok(node_new_group(false, flags, alternatives))
            }
            GroupOpenKind::Atomic => {
                let alternatives = self.parse_group_body()?;
                Ok(node_new_group(true, None, alternatives))
            }
            GroupOpenKind::Lookahead { negate } => {
                let alternatives = self.parse_group_body()?;
                Ok(node_new_lookaround(LookaroundKind::Lookahead, negate, alternatives))
            }
            GroupOpenKind::Lookbehind { negate } => {
                self.lookbehind_stack.push(negate);
                let alternatives = self.parse_group_body();
                self.lookbehind_stack.pop();
                Ok(node_new_lookaround(
                    LookaroundKind::Lookbehind,
                    negate,
                    alternatives?,
                ))
            }
            GroupOpenKind::Absent => {
                let alternatives = self.parse_group_body()?;
                Ok(node_new_absent_function(alternatives))
            }
        }
    }

    fn parse_capturing_group(&mut self, name: Option<String>) -> Result<Node> {
        // Numbered and registered at the open, in source order; a group
        // is referenceable from inside itself.
        self.capturing_groups.push(name.clone());
        let number = self.capture_count();
        if let Some(ref n) = name {
            self.named_groups.insert(n.clone());
        }
        let alternatives = self.parse_group_body()?;
        node_new_capturing_group(number, name, alternatives)
    }

    fn parse_group_body(&mut self) -> Result<Vec<Node>> {
        let alternatives = self.parse_alternation()?;
        match self.bump() {
            Some(TokenKind::GroupClose) => Ok(alternatives),
            _ => Err(RegexError::Syntax("unclosed group".to_string())),
        }
    }

    // === Backreferences ===

    fn resolve_backreference(&mut self, target: &GroupRef) -> Result<Node> {
        match target {
            GroupRef::Number(n) => {
                self.has_numbered_ref = true;
                if *n <= self.capture_count() {
                    Ok(node_new_backreference(GroupRef::Number(*n), false))
                } else if self.options.skip_backref_validation {
                    Ok(node_new_backreference(GroupRef::Number(*n), true))
                } else {
                    Err(RegexError::Reference(format!(
                        "backreference to undefined group {}",
                        n
                    )))
                }
            }
            GroupRef::Name(name) => {
                if self.named_groups.contains(name) {
                    Ok(node_new_backreference(GroupRef::Name(name.clone()), false))
                } else if self.options.skip_backref_validation {
                    Ok(node_new_backreference(GroupRef::Name(name.clone()), true))
                } else {
                    Err(RegexError::Reference(format!(
                        "backreference to undefined group '{}'",
                        name
                    )))
                }
            }
        }
    }

    // === Character Classes ===

    /// Called with the `CharacterClassOpen` already consumed. Builds a
    /// union class, or an intersection with one child per `&&` segment.
    fn parse_character_class(&mut self, negate: bool) -> Result<Node> {
        let mut segments: Vec<Vec<Node>> = Vec::new();
        let mut elements: Vec<Node> = Vec::new();

        loop {
            let kind = self
                .bump()
                .ok_or_else(|| RegexError::Syntax("unclosed character class".to_string()))?;
            match kind {
                TokenKind::CharacterClassClose => break,
                TokenKind::CharacterClassIntersector => {
                    segments.push(std::mem::take(&mut elements));
                }
                TokenKind::Character { value } => {
                    elements.push(node_new_character(*value)?);
                }
                TokenKind::CharacterSet {
                    kind,
                    negate,
                    value,
                } => {
                    elements.push(build_character_set(*kind, *negate, value.as_deref())?);
                }
                TokenKind::CharacterClassOpen { negate } => {
                    let nested = self.parse_character_class(*negate)?;
                    elements.push(nested);
                }
                TokenKind::CharacterClassHyphen => {
                    self.parse_hyphen(&mut elements)?;
                }
                _ => {
                    return Err(RegexError::Invariant(
                        "pattern token inside a character class".to_string(),
                    ))
                }
            }
        }

        if segments.is_empty() {
            return node_new_character_class(ClassKind::Union, negate, elements);
        }

        segments.push(elements);
        let mut children = Vec::with_capacity(segments.len());
        for seg in segments {
            // Singleton segments join the intersection directly.
            if seg.len() == 1 {
                children.extend(seg);
            } else {
                children.push(node_new_character_class(ClassKind::Union, false, seg)?);
            }
        }
        node_new_character_class(ClassKind::Intersection, negate, children)
    }

    /// A hyphen connects a range only when the previous sibling is a
    /// `Character` or `CharacterSet` and the next token is one too;
    /// otherwise it is a literal `-`. Non-`Character` endpoints error.
    fn parse_hyphen(&mut self, elements: &mut Vec<Node>) -> Result<()> {
        let prev_connectable = matches!(
            elements.last(),
            Some(Node::Character(_)) | Some(Node::CharacterSet(_))
        );
        let next_connectable = matches!(
            self.peek(),
            Some(TokenKind::Character { .. }) | Some(TokenKind::CharacterSet { .. })
        );
        if !prev_connectable || !next_connectable {
            elements.push(node_new_character('-' as u32)?);
            return Ok(());
        }

        let endpoint_err =
            || RegexError::Syntax("character class range endpoint is not a character".to_string());

        let min = match elements.pop() {
            Some(Node::Character(c)) => c,
            _ => return Err(endpoint_err()),
        };
        let max = match self.bump() {
            Some(TokenKind::Character { value }) => match node_new_character(*value)? {
                Node::Character(c) => c,
                _ => return Err(endpoint_err()),
            },
            _ => return Err(endpoint_err()),
        };
        if min.value > max.value {
            return Err(RegexError::Syntax(format!(
                "empty character class range {:#x}-{:#x}",
                min.value, max.value
            )));
        }
        elements.push(node_new_character_class_range(
            Node::Character(min),
            Node::Character(max),
        )?);
        Ok(())
    }

    // === Whole-Pattern Validation ===

    fn validate(&self) -> Result<()> {
        if self.has_numbered_ref
            && !self.named_groups.is_empty()
            && !self.options.rules.capture_group
        {
            return Err(RegexError::Reference(
                "numbered backref/subroutine is not allowed with named groups".to_string(),
            ));
        }

        for sub in &self.subroutines {
            match sub {
                GroupRef::Number(0) => {} // whole-pattern recursion
                GroupRef::Number(n) => {
                    if *n > self.capture_count() {
                        return Err(RegexError::Reference(format!(
                            "subroutine to undefined group {}",
                            n
                        )));
                    }
                }
                GroupRef::Name(name) => {
                    let definitions = self
                        .capturing_groups
                        .iter()
                        .filter(|n| n.as_deref() == Some(name.as_str()))
                        .count();
                    match definitions {
                        0 => {
                            return Err(RegexError::Reference(format!(
                                "subroutine to undefined group '{}'",
                                name
                            )))
                        }
                        1 => {}
                        _ => {
                            return Err(RegexError::Reference(format!(
                                "subroutine target '{}' is defined more than once",
                                name
                            )))
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn build_character_set(
    kind: CharacterSetKind,
    negate: bool,
    value: Option<&str>,
) -> Result<Node> {
    match (kind, value) {
        (CharacterSetKind::Posix, Some(name)) => node_new_posix_class(name, negate),
        (CharacterSetKind::Property, Some(name)) => {
            Ok(node_new_unicode_property(name, negate))
        }
        (CharacterSetKind::Posix, None) | (CharacterSetKind::Property, None) => Err(
            RegexError::Invariant("named character set token without a name".to_string()),
        ),
        _ => Ok(node_new_character_set(kind, negate)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeType;

    fn parse_default(src: &str) -> Result<Node> {
        parse(src, &ParseOptions::default())
    }

    fn pattern_alternatives(root: &Node) -> &Vec<Node> {
        match root {
            Node::Regex(re) => re.pattern.alternatives().unwrap(),
            _ => panic!("not a Regex root"),
        }
    }

    #[test]
    fn trivial_pattern_shape() {
        let root = parse_default("ab|c").unwrap();
        let alts = pattern_alternatives(&root);
        assert_eq!(alts.len(), 2);
        assert_eq!(alts[0].elements().unwrap().len(), 2);
        assert_eq!(alts[1].elements().unwrap().len(), 1);
    }

    #[test]
    fn capture_numbering_is_contiguous_source_order() {
        let root = parse_default("(a(b))(c)").unwrap();
        let alts = pattern_alternatives(&root);
        let outer = alts[0].elements().unwrap();
        let first = outer[0].as_capturing_group().unwrap();
        assert_eq!(first.number, 1);
        let inner = first.alternatives[0].elements().unwrap()[1]
            .as_capturing_group()
            .unwrap();
        assert_eq!(inner.number, 2);
        let third = outer[1].as_capturing_group().unwrap();
        assert_eq!(third.number, 3);
    }

    #[test]
    fn bare_groups_stop_capturing_next_to_named() {
        let root = parse_default("(?<x>a)(b)").unwrap();
        let alts = pattern_alternatives(&root);
        let second = &alts[0].elements().unwrap()[1];
        assert_eq!(second.node_type(), NodeType::Group);

        let opts = ParseOptions {
            rules: Rules {
                capture_group: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let root = parse("(?<x>a)(b)", &opts).unwrap();
        let alts = pattern_alternatives(&root);
        let second = &alts[0].elements().unwrap()[1];
        assert_eq!(second.as_capturing_group().unwrap().number, 2);
    }

    #[test]
    fn mixing_numbered_refs_with_named_groups() {
        assert!(matches!(
            parse_default("(?<x>a)(b)\\g<0>"),
            Ok(_)
        ));
        let err = parse_default("(?<x>a)\\k<1>").unwrap_err();
        assert!(matches!(err, RegexError::Reference(_)));
    }

    #[test]
    fn backref_orphan_mode() {
        assert!(parse_default("\\k<5>(a)").is_err());
        let opts = ParseOptions {
            skip_backref_validation: true,
            ..Default::default()
        };
        let root = parse("\\k<5>", &opts).unwrap();
        let alts = pattern_alternatives(&root);
        match &alts[0].elements().unwrap()[0] {
            Node::Backreference(b) => assert!(b.orphan),
            other => panic!("expected backreference, got {:?}", other.node_type()),
        }
    }

    #[test]
    fn named_backref_requires_prior_definition() {
        assert!(parse_default("(?<a>x)\\k<a>").is_ok());
        let err = parse_default("\\k<a>(?<a>x)").unwrap_err();
        assert!(matches!(err, RegexError::Reference(_)));
    }

    #[test]
    fn subroutines_resolve_forward() {
        assert!(parse_default("\\g<1>(a)").is_ok());
        assert!(parse_default("\\g<a>(?<a>x)").is_ok());
        assert!(parse_default("\\g<0>a").is_ok());
        assert!(matches!(
            parse_default("\\g<2>(a)").unwrap_err(),
            RegexError::Reference(_)
        ));
        assert!(matches!(
            parse_default("(?<a>x)(?<a>y)\\g<a>").unwrap_err(),
            RegexError::Reference(_)
        ));
        // Duplicate names are fine while unreferenced.
        assert!(parse_default("(?<a>x)(?<a>y)").is_ok());
    }

    #[test]
    fn reversed_interval_is_possessive() {
        let root = parse_default("a{3,1}").unwrap();
        let alts = pattern_alternatives(&root);
        let q = alts[0].elements().unwrap()[0].as_quantifier().unwrap();
        assert_eq!(q.kind, QuantifierKind::Possessive);
        assert_eq!((q.min, q.max), (1, 3));
    }

    #[test]
    fn quantifier_needs_a_target() {
        assert!(parse_default("*a").is_err());
        assert!(parse_default("a|*").is_err());
        assert!(parse_default("^*").is_err());
        assert!(parse_default("(?=a)*").is_err());
        // Chained quantifiers are fine.
        assert!(parse_default("a+*").is_ok());
    }

    #[test]
    fn class_intersection_shape() {
        let root = parse_default("[a-z&&\\w]").unwrap();
        let alts = pattern_alternatives(&root);
        let class = alts[0].elements().unwrap()[0].as_character_class().unwrap();
        assert_eq!(class.kind, ClassKind::Intersection);
        assert_eq!(class.elements.len(), 2);
        // Singleton segments join the intersection unwrapped.
        assert_eq!(class.elements[0].node_type(), NodeType::CharacterClassRange);
        assert_eq!(class.elements[1].node_type(), NodeType::CharacterSet);
    }

    #[test]
    fn hyphen_literal_fallbacks() {
        // Trailing hyphen is a literal.
        let root = parse_default("[a-]").unwrap();
        let alts = pattern_alternatives(&root);
        let class = alts[0].elements().unwrap()[0].as_character_class().unwrap();
        assert_eq!(class.elements.len(), 2);

        // After a completed range, a hyphen is a literal.
        let root = parse_default("[a-m-z]").unwrap();
        let alts = pattern_alternatives(&root);
        let class = alts[0].elements().unwrap()[0].as_character_class().unwrap();
        assert_eq!(class.elements.len(), 3);
        assert_eq!(class.elements[0].node_type(), NodeType::CharacterClassRange);
    }

    #[test]
    fn set_range_endpoint_errors() {
        assert!(matches!(
            parse_default("[a-\\d]").unwrap_err(),
            RegexError::Syntax(_)
        ));
        assert!(matches!(
            parse_default("[\\d-z]").unwrap_err(),
            RegexError::Syntax(_)
        ));
        assert!(matches!(
            parse_default("[z-a]").unwrap_err(),
            RegexError::Syntax(_)
        ));
    }

    #[test]
    fn lookbehind_restrictions() {
        // (outer, inner) rejection matrix.
        assert!(parse_default("(?<=(?=a)b)").is_err());
        assert!(parse_default("(?<=(?!a)b)").is_err());
        assert!(parse_default("(?<!(?=a)b)").is_err());
        assert!(parse_default("(?<!(a)b)").is_err());
        assert!(parse_default("(?<=(?<!a)b)").is_err());
        // Permitted shapes.
        assert!(parse_default("(?<=(a)b)").is_ok());
        assert!(parse_default("(?<=(?<=a)b)").is_ok());
        assert!(parse_default("(?<!(?<!a)b)").is_ok());
        // Nesting through a plain group is still caught.
        assert!(parse_default("(?<=(?:(?=a))b)").is_err());
        // Quantified capture in a negative lookbehind is caught when
        // the capture itself is emitted.
        assert!(parse_default("(?<!(a)+b)").is_err());

        let opts = ParseOptions {
            skip_lookbehind_validation: true,
            ..Default::default()
        };
        assert!(parse("(?<=(?=a)b)", &opts).is_ok());
        assert!(parse("(?<!(a)b)", &opts).is_ok());
    }

    #[test]
    fn lookbehind_errors_are_feature_kind() {
        let err = parse_default("(?<=(?=a))").unwrap_err();
        assert!(matches!(err, RegexError::Feature(_)));
    }

    #[test]
    fn absent_function_parses() {
        let root = parse_default("(?~ab|c)").unwrap();
        let alts = pattern_alternatives(&root);
        let af = &alts[0].elements().unwrap()[0];
        assert_eq!(af.node_type(), NodeType::AbsentFunction);
        assert_eq!(af.alternatives().unwrap().len(), 2);
    }

    #[test]
    fn flag_directive_and_keep() {
        let root = parse_default("(?i)a\\K").unwrap();
        let alts = pattern_alternatives(&root);
        let els = alts[0].elements().unwrap();
        assert_eq!(els[0].node_type(), NodeType::Directive);
        assert_eq!(els[2].node_type(), NodeType::Directive);
    }

    #[test]
    fn flags_record_round_trips_options() {
        let opts = ParseOptions {
            flags: "im".to_string(),
            ..Default::default()
        };
        let root = parse("a", &opts).unwrap();
        match &root {
            Node::Regex(re) => {
                let flags = re.flags.as_flags().unwrap();
                assert!(flags.ignore_case);
                assert!(flags.dot_all);
                assert!(!flags.extended);
            }
            _ => unreachable!(),
        }
    }
}
