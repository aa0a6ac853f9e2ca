// ast.rs - AST node types and factory functions.
//
// The tree is a closed tagged union: one `Node` enum, one payload struct
// per variant, exhaustive dispatch everywhere. Nodes own their children
// outright; parent knowledge exists only transiently during traversal.

use crate::error::{RegexError, Result};
use crate::unicode::is_posix_class_name;

/// Sentinel for an unbounded quantifier upper bound.
pub const REPEAT_INFINITE: u32 = u32::MAX;

/// Largest valid Unicode scalar value.
pub const MAX_CODE_POINT: u32 = 0x10FFFF;

// The dialect's escape syntax can spell code points past the Unicode
// ceiling; anything above this is rejected outright.
const CODE_POINT_HARD_LIMIT: u32 = 0x13FFFF;

// === Node Type Enum ===

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    Regex,
    Pattern,
    Alternative,
    Flags,
    Character,
    CharacterClass,
    CharacterClassRange,
    CharacterSet,
    Assertion,
    LookaroundAssertion,
    Group,
    CapturingGroup,
    AbsentFunction,
    Backreference,
    Subroutine,
    Quantifier,
    Directive,
}

impl NodeType {
    pub fn name(self) -> &'static str {
        match self {
            NodeType::Regex => "Regex",
            NodeType::Pattern => "Pattern",
            NodeType::Alternative => "Alternative",
            NodeType::Flags => "Flags",
            NodeType::Character => "Character",
            NodeType::CharacterClass => "CharacterClass",
            NodeType::CharacterClassRange => "CharacterClassRange",
            NodeType::CharacterSet => "CharacterSet",
            NodeType::Assertion => "Assertion",
            NodeType::LookaroundAssertion => "LookaroundAssertion",
            NodeType::Group => "Group",
            NodeType::CapturingGroup => "CapturingGroup",
            NodeType::AbsentFunction => "AbsentFunction",
            NodeType::Backreference => "Backreference",
            NodeType::Subroutine => "Subroutine",
            NodeType::Quantifier => "Quantifier",
            NodeType::Directive => "Directive",
        }
    }
}

// === Supporting Enums ===

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextSegmentMode {
    Grapheme,
    Word,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassKind {
    Union,
    Intersection,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharacterSetKind {
    /// `\O`: any character, newline included, regardless of flags.
    Any,
    /// `.`: any character; newline only under dot-all.
    Dot,
    /// `\d` / `\D`.
    Digit,
    /// `\X`: extended grapheme cluster.
    Grapheme,
    /// `\h` / `\H`: ASCII hex digit.
    Hex,
    /// `\R` (general newline) and its negation `\N`.
    Newline,
    /// `[[:name:]]`, or `\p{name}` with a POSIX name.
    Posix,
    /// `\p{Name}` / `\P{Name}`.
    Property,
    /// `\s` / `\S`.
    Space,
    /// `\w` / `\W`.
    Word,
}

impl CharacterSetKind {
    /// Kinds legal inside a character class (and everywhere else).
    pub fn is_universal(self) -> bool {
        matches!(
            self,
            CharacterSetKind::Digit
                | CharacterSetKind::Hex
                | CharacterSetKind::Posix
                | CharacterSetKind::Property
                | CharacterSetKind::Space
                | CharacterSetKind::Word
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssertionKind {
    LineStart,
    LineEnd,
    StringStart,
    StringEnd,
    StringEndNewline,
    SearchStart,
    WordBoundary,
    GraphemeBoundary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookaroundKind {
    Lookahead,
    Lookbehind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbsentFunctionKind {
    Repeater,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuantifierKind {
    Greedy,
    Lazy,
    Possessive,
}

/// Target of a backreference or subroutine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupRef {
    /// Group number; `0` on a subroutine means whole-pattern recursion.
    Number(u32),
    Name(String),
}

// === Flag Records ===

/// Whole-pattern flag set, stored as the second child of `Regex`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlagsNode {
    pub ignore_case: bool,
    pub dot_all: bool,
    pub extended: bool,
    pub digit_is_ascii: bool,
    pub posix_is_ascii: bool,
    pub space_is_ascii: bool,
    pub word_is_ascii: bool,
    pub text_segment_mode: Option<TextSegmentMode>,
}

/// Flags togglable by a scoped group `(?imx-imx:...)` or a flag
/// directive `(?imx-imx)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlagSet {
    pub ignore_case: bool,
    pub dot_all: bool,
    pub extended: bool,
    pub digit_is_ascii: bool,
    pub posix_is_ascii: bool,
    pub space_is_ascii: bool,
    pub word_is_ascii: bool,
}

impl FlagSet {
    pub fn is_empty(&self) -> bool {
        *self == FlagSet::default()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlagGroupModifiers {
    pub enable: FlagSet,
    pub disable: FlagSet,
}

impl FlagGroupModifiers {
    pub fn is_empty(&self) -> bool {
        self.enable.is_empty() && self.disable.is_empty()
    }
}

// === Payload Structs ===

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegexNode {
    pub pattern: Box<Node>,
    pub flags: Box<Node>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternNode {
    pub alternatives: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlternativeNode {
    pub elements: Vec<Node>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharacterNode {
    pub value: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterClassNode {
    pub kind: ClassKind,
    pub negate: bool,
    pub elements: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterClassRangeNode {
    pub min: Box<Node>,
    pub max: Box<Node>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterSetNode {
    pub kind: CharacterSetKind,
    pub negate: bool,
    /// POSIX class name or Unicode property name; `None` for the rest.
    pub value: Option<String>,
    /// True for `\X` and non-negated `\R`.
    pub variable_length: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssertionNode {
    pub kind: AssertionKind,
    pub negate: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookaroundAssertionNode {
    pub kind: LookaroundKind,
    pub negate: bool,
    pub alternatives: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupNode {
    pub atomic: bool,
    pub flags: Option<FlagGroupModifiers>,
    pub alternatives: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturingGroupNode {
    /// 1-based, assigned in source order.
    pub number: u32,
    pub name: Option<String>,
    pub alternatives: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbsentFunctionNode {
    pub kind: AbsentFunctionKind,
    pub alternatives: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackreferenceNode {
    pub target: GroupRef,
    /// Reffed group lies to the right and validation was skipped.
    pub orphan: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubroutineNode {
    pub target: GroupRef,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuantifierNode {
    pub kind: QuantifierKind,
    pub min: u32,
    /// `REPEAT_INFINITE` when unbounded.
    pub max: u32,
    pub element: Box<Node>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `\K`.
    Keep,
    /// `(?imx-imx)`.
    Flags(FlagGroupModifiers),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectiveNode {
    pub kind: DirectiveKind,
}

// === The Node Union ===

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Regex(RegexNode),
    Pattern(PatternNode),
    Alternative(AlternativeNode),
    Flags(FlagsNode),
    Character(CharacterNode),
    CharacterClass(CharacterClassNode),
    CharacterClassRange(CharacterClassRangeNode),
    CharacterSet(CharacterSetNode),
    Assertion(AssertionNode),
    LookaroundAssertion(LookaroundAssertionNode),
    Group(GroupNode),
    CapturingGroup(CapturingGroupNode),
    AbsentFunction(AbsentFunctionNode),
    Backreference(BackreferenceNode),
    Subroutine(SubroutineNode),
    Quantifier(QuantifierNode),
    Directive(DirectiveNode),
}

impl Node {
    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Regex(_) => NodeType::Regex,
            Node::Pattern(_) => NodeType::Pattern,
            Node::Alternative(_) => NodeType::Alternative,
            Node::Flags(_) => NodeType::Flags,
            Node::Character(_) => NodeType::Character,
            Node::CharacterClass(_) => NodeType::CharacterClass,
            Node::CharacterClassRange(_) => NodeType::CharacterClassRange,
            Node::CharacterSet(_) => NodeType::CharacterSet,
            Node::Assertion(_) => NodeType::Assertion,
            Node::LookaroundAssertion(_) => NodeType::LookaroundAssertion,
            Node::Group(_) => NodeType::Group,
            Node::CapturingGroup(_) => NodeType::CapturingGroup,
            Node::AbsentFunction(_) => NodeType::AbsentFunction,
            Node::Backreference(_) => NodeType::Backreference,
            Node::Subroutine(_) => NodeType::Subroutine,
            Node::Quantifier(_) => NodeType::Quantifier,
            Node::Directive(_) => NodeType::Directive,
        }
    }

    // Variant accessors (the subset the parser and transforms lean on).

    pub fn as_character(&self) -> Option<&CharacterNode> {
        match self {
            Node::Character(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_character_class(&self) -> Option<&CharacterClassNode> {
        match self {
            Node::CharacterClass(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_character_class_mut(&mut self) -> Option<&mut CharacterClassNode> {
        match self {
            Node::CharacterClass(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_character_set(&self) -> Option<&CharacterSetNode> {
        match self {
            Node::CharacterSet(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_character_set_mut(&mut self) -> Option<&mut CharacterSetNode> {
        match self {
            Node::CharacterSet(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_alternative(&self) -> Option<&AlternativeNode> {
        match self {
            Node::Alternative(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_alternative_mut(&mut self) -> Option<&mut AlternativeNode> {
        match self {
            Node::Alternative(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_quantifier(&self) -> Option<&QuantifierNode> {
        match self {
            Node::Quantifier(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_quantifier_mut(&mut self) -> Option<&mut QuantifierNode> {
        match self {
            Node::Quantifier(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            Node::Group(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_capturing_group(&self) -> Option<&CapturingGroupNode> {
        match self {
            Node::CapturingGroup(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_flags(&self) -> Option<&FlagsNode> {
        match self {
            Node::Flags(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_flags_mut(&mut self) -> Option<&mut FlagsNode> {
        match self {
            Node::Flags(n) => Some(n),
            _ => None,
        }
    }

    /// Alternatives list of any alternation container.
    pub fn alternatives(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Pattern(n) => Some(&n.alternatives),
            Node::Group(n) => Some(&n.alternatives),
            Node::CapturingGroup(n) => Some(&n.alternatives),
            Node::LookaroundAssertion(n) => Some(&n.alternatives),
            Node::AbsentFunction(n) => Some(&n.alternatives),
            _ => None,
        }
    }

    pub fn alternatives_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Pattern(n) => Some(&mut n.alternatives),
            Node::Group(n) => Some(&mut n.alternatives),
            Node::CapturingGroup(n) => Some(&mut n.alternatives),
            Node::LookaroundAssertion(n) => Some(&mut n.alternatives),
            Node::AbsentFunction(n) => Some(&mut n.alternatives),
            _ => None,
        }
    }

    /// Elements list of an `Alternative` or `CharacterClass`.
    pub fn elements(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Alternative(n) => Some(&n.elements),
            Node::CharacterClass(n) => Some(&n.elements),
            _ => None,
        }
    }

    pub fn elements_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Alternative(n) => Some(&mut n.elements),
            Node::CharacterClass(n) => Some(&mut n.elements),
            _ => None,
        }
    }
}

/// A quantifier may wrap anything except assertions, directives, and
/// lookarounds.
pub fn is_quantifiable(node: &Node) -> bool {
    !matches!(
        node,
        Node::Assertion(_) | Node::Directive(_) | Node::LookaroundAssertion(_)
    )
}

// === Factory Functions ===
//
// Every constructor validates its local invariants and returns the same
// union type. The parser and the transforms build nodes only through
// these.

pub fn node_new_regex(pattern: Node, flags: Node) -> Result<Node> {
    if pattern.node_type() != NodeType::Pattern {
        return Err(RegexError::Invariant(format!(
            "Regex pattern slot takes a Pattern, got {}",
            pattern.node_type().name()
        )));
    }
    if flags.node_type() != NodeType::Flags {
        return Err(RegexError::Invariant(format!(
            "Regex flags slot takes Flags, got {}",
            flags.node_type().name()
        )));
    }
    Ok(Node::Regex(RegexNode {
        pattern: Box::new(pattern),
        flags: Box::new(flags),
    }))
}

pub fn node_new_pattern(alternatives: Vec<Node>) -> Result<Node> {
    for alt in &alternatives {
        if alt.node_type() != NodeType::Alternative {
            return Err(RegexError::Invariant(format!(
                "Pattern children must be Alternatives, got {}",
                alt.node_type().name()
            )));
        }
    }
    Ok(Node::Pattern(PatternNode { alternatives }))
}

pub fn node_new_alternative(elements: Vec<Node>) -> Node {
    Node::Alternative(AlternativeNode { elements })
}

pub fn node_new_flags(flags: FlagsNode) -> Node {
    Node::Flags(flags)
}

/// Create a `Character`, rejecting values past the Unicode ceiling.
///
/// `use_last_valid` caps overlong (but still spellable) values at
/// `MAX_CODE_POINT` instead of erroring; anything past the hard limit is
/// rejected either way.
pub fn node_new_character_with(value: u32, use_last_valid: bool) -> Result<Node> {
    if value > CODE_POINT_HARD_LIMIT {
        return Err(RegexError::Syntax(format!(
            "code point {:#x} exceeds the representable limit",
            value
        )));
    }
    if value > MAX_CODE_POINT {
        if !use_last_valid {
            return Err(RegexError::Syntax(format!(
                "code point {:#x} exceeds U+10FFFF",
                value
            )));
        }
        return Ok(Node::Character(CharacterNode {
            value: MAX_CODE_POINT,
        }));
    }
    Ok(Node::Character(CharacterNode { value }))
}

pub fn node_new_character(value: u32) -> Result<Node> {
    node_new_character_with(value, false)
}

pub fn node_new_character_class(
    kind: ClassKind,
    negate: bool,
    elements: Vec<Node>,
) -> Result<Node> {
    for el in &elements {
        let ok = match el {
            Node::Character(_) | Node::CharacterClassRange(_) | Node::CharacterClass(_) => true,
            Node::CharacterSet(set) => set.kind.is_universal(),
            _ => false,
        };
        if !ok {
            return Err(RegexError::Invariant(format!(
                "{} cannot appear inside a character class",
                el.node_type().name()
            )));
        }
    }
    Ok(Node::CharacterClass(CharacterClassNode {
        kind,
        negate,
        elements,
    }))
}

pub fn node_new_character_class_range(min: Node, max: Node) -> Result<Node> {
    let (lo, hi) = match (&min, &max) {
        (Node::Character(a), Node::Character(b)) => (a.value, b.value),
        _ => {
            return Err(RegexError::Invariant(
                "range endpoints must be Characters".to_string(),
            ))
        }
    };
    if lo > hi {
        return Err(RegexError::Invariant(format!(
            "descending range {:#x}-{:#x}",
            lo, hi
        )));
    }
    Ok(Node::CharacterClassRange(CharacterClassRangeNode {
        min: Box::new(min),
        max: Box::new(max),
    }))
}

pub fn node_new_character_set(kind: CharacterSetKind, negate: bool) -> Node {
    let variable_length = match kind {
        CharacterSetKind::Grapheme => true,
        CharacterSetKind::Newline => !negate,
        _ => false,
    };
    Node::CharacterSet(CharacterSetNode {
        kind,
        negate,
        value: None,
        variable_length,
    })
}

pub fn node_new_posix_class(name: &str, negate: bool) -> Result<Node> {
    if !is_posix_class_name(name) {
        return Err(RegexError::Syntax(format!("invalid POSIX class '{}'", name)));
    }
    Ok(Node::CharacterSet(CharacterSetNode {
        kind: CharacterSetKind::Posix,
        negate,
        value: Some(name.to_string()),
        variable_length: false,
    }))
}

pub fn node_new_unicode_property(value: &str, negate: bool) -> Node {
    Node::CharacterSet(CharacterSetNode {
        kind: CharacterSetKind::Property,
        negate,
        value: Some(value.to_string()),
        variable_length: false,
    })
}

pub fn node_new_assertion(kind: AssertionKind, negate: bool) -> Result<Node> {
    if negate
        && !matches!(
            kind,
            AssertionKind::WordBoundary | AssertionKind::GraphemeBoundary
        )
    {
        return Err(RegexError::Invariant(
            "only boundary assertions can be negated".to_string(),
        ));
    }
    Ok(Node::Assertion(AssertionNode { kind, negate }))
}

pub fn node_new_lookaround(
    kind: LookaroundKind,
    negate: bool,
    alternatives: Vec<Node>,
) -> Node {
    Node::LookaroundAssertion(LookaroundAssertionNode {
        kind,
        negate,
        alternatives,
    })
}

pub fn node_new_group(
    atomic: bool,
    flags: Option<FlagGroupModifiers>,
    alternatives: Vec<Node>,
) -> Node {
    Node::Group(GroupNode {
        atomic,
        flags: flags.filter(|f| !f.is_empty()),
        alternatives,
    })
}

/// Group names start with an alphabetic or connector-punctuation
/// character; later characters only exclude `)`.
pub fn is_valid_group_name(name: &str) -> bool {
    let mut chars = name.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    if !(first.is_alphabetic() || is_connector_punctuation(first)) {
        return false;
    }
    !name.contains(')')
}

// Unicode Pc category: LOW LINE plus the tie/undertie family.
fn is_connector_punctuation(c: char) -> bool {
    matches!(
        c,
        '_' | '\u{203F}'
            | '\u{2040}'
            | '\u{2054}'
            | '\u{FE33}'
            | '\u{FE34}'
            | '\u{FE4D}'
            | '\u{FE4E}'
            | '\u{FE4F}'
            | '\u{FF3F}'
    )
}

pub fn node_new_capturing_group(
    number: u32,
    name: Option<String>,
    alternatives: Vec<Node>,
) -> Result<Node> {
    if number == 0 {
        return Err(RegexError::Invariant(
            "capturing group numbers are 1-based".to_string(),
        ));
    }
    if let Some(ref n) = name {
        if !is_valid_group_name(n) {
            return Err(RegexError::Syntax(format!("invalid group name '{}'", n)));
        }
    }
    Ok(Node::CapturingGroup(CapturingGroupNode {
        number,
        name,
        alternatives,
    }))
}

pub fn node_new_absent_function(alternatives: Vec<Node>) -> Node {
    Node::AbsentFunction(AbsentFunctionNode {
        kind: AbsentFunctionKind::Repeater,
        alternatives,
    })
}

pub fn node_new_backreference(target: GroupRef, orphan: bool) -> Node {
    Node::Backreference(BackreferenceNode { target, orphan })
}

pub fn node_new_subroutine(target: GroupRef) -> Node {
    Node::Subroutine(SubroutineNode { target })
}

pub fn node_new_quantifier(
    kind: QuantifierKind,
    min: u32,
    max: u32,
    element: Node,
) -> Result<Node> {
    if min > max {
        return Err(RegexError::Invariant(format!(
            "quantifier bounds {{{},{}}} are descending",
            min, max
        )));
    }
    if !is_quantifiable(&element) {
        return Err(RegexError::Invariant(format!(
            "{} is not quantifiable",
            element.node_type().name()
        )));
    }
    Ok(Node::Quantifier(QuantifierNode {
        kind,
        min,
        max,
        element: Box::new(element),
    }))
}

pub fn node_new_directive(kind: DirectiveKind) -> Node {
    Node::Directive(DirectiveNode { kind })
}
