// generator.rs - AST -> Oniguruma source text.
//
// Inverts the parser on well-formed trees: the generated pattern
// re-parses to a structurally identical AST. Escaping is conservative;
// escaping more than strictly necessary costs nothing structurally.

use crate::ast::{
    AssertionKind, CharacterSetKind, ClassKind, DirectiveKind, FlagGroupModifiers, FlagsNode,
    GroupRef, LookaroundKind, Node, QuantifierKind, QuantifierNode, TextSegmentMode,
    REPEAT_INFINITE,
};
use crate::error::{RegexError, Result};

/// Generator output: pattern and flag strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generated {
    pub pattern: String,
    pub flags: String,
}

/// Serialize `node` (usually a `Regex` root) back to source.
pub fn generate(node: &Node) -> Result<Generated> {
    let (pattern_node, flags) = match node {
        Node::Regex(re) => (
            re.pattern.as_ref(),
            re.flags.as_flags().copied().unwrap_or_default(),
        ),
        other => (other, FlagsNode::default()),
    };
    let mut out = String::new();
    let ctx = RenderCtx {
        in_class: false,
        extended: flags.extended,
    };
    render(pattern_node, &mut out, ctx)?;
    Ok(Generated {
        pattern: out,
        flags: flags_to_string(&flags),
    })
}

pub fn flags_to_string(flags: &FlagsNode) -> String {
    let mut s = String::new();
    if flags.ignore_case {
        s.push('i');
    }
    if flags.dot_all {
        s.push('m');
    }
    if flags.extended {
        s.push('x');
    }
    if flags.digit_is_ascii {
        s.push('D');
    }
    if flags.posix_is_ascii {
        s.push('P');
    }
    if flags.space_is_ascii {
        s.push('S');
    }
    if flags.word_is_ascii {
        s.push('W');
    }
    match flags.text_segment_mode {
        Some(TextSegmentMode::Grapheme) => s.push_str("y{g}"),
        Some(TextSegmentMode::Word) => s.push_str("y{w}"),
        None => {}
    }
    s
}

#[derive(Clone, Copy)]
struct RenderCtx {
    in_class: bool,
    extended: bool,
}

fn render(node: &Node, out: &mut String, ctx: RenderCtx) -> Result<()> {
    match node {
        Node::Regex(_) => Err(RegexError::Invariant(
            "Regex may only appear at the root".to_string(),
        )),
        Node::Pattern(p) => render_alternation(&p.alternatives, out, ctx),
        Node::Alternative(a) => {
            for el in &a.elements {
                render(el, out, ctx)?;
            }
            Ok(())
        }
        Node::Flags(_) => Ok(()), // rendered as the flags string, not pattern text
        Node::Character(c) => {
            render_char(c.value, out, ctx);
            Ok(())
        }
        Node::CharacterClass(class) => {
            out.push('[');
            if class.negate {
                out.push('^');
            }
            let inner = RenderCtx {
                in_class: true,
                ..ctx
            };
            match class.kind {
                ClassKind::Union => {
                    for el in &class.elements {
                        render(el, out, inner)?;
                    }
                }
                ClassKind::Intersection => {
                    for (i, seg) in class.elements.iter().enumerate() {
                        if i > 0 {
                            out.push_str("&&");
                        }
                        // Non-negated union segments inline without
                        // their own brackets; everything else nests.
                        match seg {
                            Node::CharacterClass(c)
                                if c.kind == ClassKind::Union && !c.negate =>
                            {
                                for el in &c.elements {
                                    render(el, out, inner)?;
                                }
                            }
                            other => render(other, out, inner)?,
                        }
                    }
                }
            }
            out.push(']');
            Ok(())
        }
        Node::CharacterClassRange(r) => {
            render(&r.min, out, ctx)?;
            out.push('-');
            render(&r.max, out, ctx)
        }
        Node::CharacterSet(set) => {
            render_set(set.kind, set.negate, set.value.as_deref(), out, ctx);
            Ok(())
        }
        Node::Assertion(a) => {
            out.push_str(match (a.kind, a.negate) {
                (AssertionKind::LineStart, _) => "^",
                (AssertionKind::LineEnd, _) => "$",
                (AssertionKind::StringStart, _) => "\\A",
                (AssertionKind::StringEnd, _) => "\\z",
                (AssertionKind::StringEndNewline, _) => "\\Z",
                (AssertionKind::SearchStart, _) => "\\G",
                (AssertionKind::WordBoundary, false) => "\\b",
                (AssertionKind::WordBoundary, true) => "\\B",
                (AssertionKind::GraphemeBoundary, false) => "\\y",
                (AssertionKind::GraphemeBoundary, true) => "\\Y",
            });
            Ok(())
        }
        Node::LookaroundAssertion(la) => {
            out.push_str(match (la.kind, la.negate) {
                (LookaroundKind::Lookahead, false) => "(?=",
                (LookaroundKind::Lookahead, true) => "(?!",
                (LookaroundKind::Lookbehind, false) => "(?<=",
                (LookaroundKind::Lookbehind, true) => "(?<!",
            });
            render_alternation(&la.alternatives, out, ctx)?;
            out.push(')');
            Ok(())
        }
        Node::Group(g) => {
            if g.atomic {
                out.push_str("(?>");
            } else if let Some(mods) = &g.flags {
                out.push_str("(?");
                out.push_str(&modifiers_to_string(mods));
                out.push(':');
            } else {
                out.push_str("(?:");
            }
            render_alternation(&g.alternatives, out, ctx)?;
            out.push(')');
            Ok(())
        }
        Node::CapturingGroup(g) => {
            match &g.name {
                Some(name) => {
                    out.push_str("(?<");
                    out.push_str(name);
                    out.push('>');
                }
                None => out.push('('),
            }
            render_alternation(&g.alternatives, out, ctx)?;
            out.push(')');
            Ok(())
        }
        Node::AbsentFunction(af) => {
            out.push_str("(?~");
            render_alternation(&af.alternatives, out, ctx)?;
            out.push(')');
            Ok(())
        }
        Node::Backreference(b) => {
            match &b.target {
                GroupRef::Number(n) => out.push_str(&format!("\\k<{}>", n)),
                GroupRef::Name(name) => out.push_str(&format!("\\k<{}>", name)),
            }
            Ok(())
        }
        Node::Subroutine(s) => {
            match &s.target {
                GroupRef::Number(n) => out.push_str(&format!("\\g<{}>", n)),
                GroupRef::Name(name) => out.push_str(&format!("\\g<{}>", name)),
            }
            Ok(())
        }
        Node::Quantifier(q) => render_quantifier(q, out, ctx),
        Node::Directive(d) => {
            match &d.kind {
                DirectiveKind::Keep => out.push_str("\\K"),
                DirectiveKind::Flags(mods) => {
                    out.push_str("(?");
                    out.push_str(&modifiers_to_string(mods));
                    out.push(')');
                }
            }
            Ok(())
        }
    }
}

fn render_alternation(alternatives: &[Node], out: &mut String, ctx: RenderCtx) -> Result<()> {
    for (i, alt) in alternatives.iter().enumerate() {
        if i > 0 {
            out.push('|');
        }
        render(alt, out, ctx)?;
    }
    Ok(())
}

fn modifiers_to_string(mods: &FlagGroupModifiers) -> String {
    let mut s = String::new();
    let en = &mods.enable;
    if en.ignore_case {
        s.push('i');
    }
    if en.dot_all {
        s.push('m');
    }
    if en.extended {
        s.push('x');
    }
    if en.digit_is_ascii {
        s.push('D');
    }
    if en.posix_is_ascii {
        s.push('P');
    }
    if en.space_is_ascii {
        s.push('S');
    }
    if en.word_is_ascii {
        s.push('W');
    }
    if !mods.disable.is_empty() {
        s.push('-');
        if mods.disable.ignore_case {
            s.push('i');
        }
        if mods.disable.dot_all {
            s.push('m');
        }
        if mods.disable.extended {
            s.push('x');
        }
    }
    s
}

fn render_set(
    kind: CharacterSetKind,
    negate: bool,
    value: Option<&str>,
    out: &mut String,
    ctx: RenderCtx,
) {
    match kind {
        CharacterSetKind::Any => out.push_str("\\O"),
        CharacterSetKind::Dot => out.push('.'),
        CharacterSetKind::Grapheme => out.push_str("\\X"),
        CharacterSetKind::Newline => out.push_str(if negate { "\\N" } else { "\\R" }),
        CharacterSetKind::Digit => out.push_str(if negate { "\\D" } else { "\\d" }),
        CharacterSetKind::Space => out.push_str(if negate { "\\S" } else { "\\s" }),
        CharacterSetKind::Word => out.push_str(if negate { "\\W" } else { "\\w" }),
        CharacterSetKind::Hex => out.push_str(if negate { "\\H" } else { "\\h" }),
        CharacterSetKind::Posix => {
            let name = value.unwrap_or_default();
            if ctx.in_class {
                out.push_str("[:");
                if negate {
                    out.push('^');
                }
                out.push_str(name);
                out.push_str(":]");
            } else {
                out.push_str(if negate { "\\P{" } else { "\\p{" });
                out.push_str(name);
                out.push('}');
            }
        }
        CharacterSetKind::Property => {
            out.push_str(if negate { "\\P{" } else { "\\p{" });
            out.push_str(value.unwrap_or_default());
            out.push('}');
        }
    }
}

// Characters that must not appear bare outside a class.
const METACHARS: &str = "\\()[]{}|.?*+^$";
// Characters that must not appear bare inside a class.
const CLASS_METACHARS: &str = "\\[]^-&";

fn render_char(value: u32, out: &mut String, ctx: RenderCtx) {
    // Mnemonic escapes first.
    let mnemonic = match value {
        0x07 => Some("\\a"),
        0x08 if ctx.in_class => Some("\\b"),
        0x09 => Some("\\t"),
        0x0A => Some("\\n"),
        0x0B => Some("\\v"),
        0x0C => Some("\\f"),
        0x0D => Some("\\r"),
        0x1B => Some("\\e"),
        _ => None,
    };
    if let Some(m) = mnemonic {
        out.push_str(m);
        return;
    }
    if value < 0x20 || value == 0x7F {
        out.push_str(&format!("\\x{:02X}", value));
        return;
    }
    match char::from_u32(value) {
        Some(c) => {
            let metas = if ctx.in_class {
                CLASS_METACHARS
            } else {
                METACHARS
            };
            if metas.contains(c) || (ctx.extended && !ctx.in_class && (c == ' ' || c == '#')) {
                out.push('\\');
            }
            out.push(c);
        }
        // Lone surrogates and the like have no char form.
        None => out.push_str(&format!("\\x{{{:X}}}", value)),
    }
}

fn render_quantifier(q: &QuantifierNode, out: &mut String, ctx: RenderCtx) -> Result<()> {
    let quantified_quantifier = matches!(q.element.as_ref(), Node::Quantifier(_));

    // Possessive intervals reverse their bounds; the parser swaps them
    // back. Needs min < max and a finite max, else fall back to an
    // atomic wrapper. A possessive `?` over a quantifier also takes
    // this path: its `{0,1}+` spelling would re-tokenize as chained.
    let symbol_form = matches!(
        (q.min, q.max),
        (0, 1) | (0, REPEAT_INFINITE) | (1, REPEAT_INFINITE)
    );
    if q.kind == QuantifierKind::Possessive
        && (!symbol_form || (quantified_quantifier && (q.min, q.max) == (0, 1)))
    {
        if q.min < q.max && q.max != REPEAT_INFINITE {
            render(&q.element, out, ctx)?;
            out.push_str(&format!("{{{},{}}}", q.max, q.min));
            return Ok(());
        }
        if q.min == q.max {
            // No backtracking choice exists; possessiveness is inert.
            render(&q.element, out, ctx)?;
            out.push_str(&format!("{{{}}}", q.min));
            return Ok(());
        }
        out.push_str("(?>");
        render(&q.element, out, ctx)?;
        out.push_str(&format!("{{{},}}", q.min));
        out.push(')');
        return Ok(());
    }

    render(&q.element, out, ctx)?;

    // When the element is itself a quantifier, a greedy or lazy `?` or
    // `+` base would re-tokenize as a laziness/possessiveness suffix;
    // those use the brace spelling. A possessive base keeps its symbol:
    // `{1,}+` would re-tokenize as a chained quantifier.
    let brace_spelling = quantified_quantifier && q.kind != QuantifierKind::Possessive;
    let base = match (q.min, q.max) {
        (0, 1) => {
            if brace_spelling {
                "{0,1}".to_string()
            } else {
                "?".to_string()
            }
        }
        (0, REPEAT_INFINITE) => "*".to_string(),
        (1, REPEAT_INFINITE) => {
            if brace_spelling {
                "{1,}".to_string()
            } else {
                "+".to_string()
            }
        }
        (min, REPEAT_INFINITE) => format!("{{{},}}", min),
        (min, max) if min == max => format!("{{{}}}", min),
        (min, max) => format!("{{{},{}}}", min, max),
    };
    out.push_str(&base);
    match q.kind {
        QuantifierKind::Greedy => {}
        QuantifierKind::Lazy => out.push('?'),
        // Only the symbol quantifiers remain possessive here.
        QuantifierKind::Possessive => out.push('+'),
    }
    Ok(())
}
