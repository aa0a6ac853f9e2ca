// traverse.rs - Depth-first pre/post visitor walk with mutation.
//
// For each node: wildcard enter, typed enter, children (unless
// skipped), typed exit, wildcard exit. Array containers are iterated
// through an explicit cursor that every mutation primitive adjusts, so
// structural edits during the walk leave following siblings visited
// exactly once. Iterator invalidation is never relied on.

use crate::ast::{
    AbsentFunctionNode, AlternativeNode, AssertionNode, BackreferenceNode, CapturingGroupNode,
    CharacterClassNode, CharacterClassRangeNode, CharacterNode, CharacterSetNode, DirectiveNode,
    FlagsNode, GroupNode, LookaroundAssertionNode, Node, NodeType, PatternNode, QuantifierKind,
    QuantifierNode, RegexNode, SubroutineNode,
};
use crate::error::{RegexError, Result};

// === Actions ===

/// What a visitor callback asks the walk to do with the current node.
#[derive(Debug)]
pub enum VisitAction {
    /// Continue normally.
    Keep,
    /// Do not descend into this node's children.
    Skip,
    /// Swap the current node. Walking the replacement (full dispatch)
    /// is opt-in per call.
    Replace { node: Node, traverse: bool },
    /// Replace with a slice of nodes; the cursor shifts so following
    /// siblings are visited exactly once. With `traverse`, each
    /// inserted node is walked with the active visitor before the
    /// cursor moves past it. Container slots only.
    ReplaceMany { nodes: Vec<Node>, traverse: bool },
    /// Remove from the container; the cursor settles on what was the
    /// next sibling. Implies skip. Container slots only.
    Remove,
    /// Splice out `[0, current)`; the cursor adjusts to 0 and the
    /// visit of the current node continues. Container slots only.
    RemovePrevSiblings,
    /// Splice out `(current, end]`; the visit continues. Container
    /// slots only.
    RemoveNextSiblings,
}

impl VisitAction {
    pub fn replace(node: Node) -> VisitAction {
        VisitAction::Replace {
            node,
            traverse: false,
        }
    }

    pub fn replace_many(nodes: Vec<Node>, traverse: bool) -> VisitAction {
        VisitAction::ReplaceMany { nodes, traverse }
    }
}

/// Transient parent/slot information handed to every callback. Parent
/// knowledge exists only here; nodes carry no upward links.
#[derive(Clone, Copy, Debug)]
pub struct PathCtx {
    /// Type of the parent node; `None` at the root.
    pub parent: Option<NodeType>,
    /// Quantifier kind when the parent is a `Quantifier`.
    pub parent_quantifier: Option<QuantifierKind>,
    /// Index in the enclosing array container, when there is one.
    pub index: Option<usize>,
    /// Snapshot of the root's flag record.
    pub flags: FlagsNode,
}

impl PathCtx {
    /// True when the current node sits inside a character class.
    pub fn in_class(&self) -> bool {
        matches!(
            self.parent,
            Some(NodeType::CharacterClass) | Some(NodeType::CharacterClassRange)
        )
    }
}

// === Visitor ===

macro_rules! visitor_hooks {
    ($($enter:ident, $exit:ident, $payload:ty;)*) => {
        $(
            #[allow(unused_variables)]
            fn $enter(&mut self, node: &mut $payload, ctx: &PathCtx) -> VisitAction {
                VisitAction::Keep
            }
            #[allow(unused_variables)]
            fn $exit(&mut self, node: &mut $payload, ctx: &PathCtx) -> VisitAction {
                VisitAction::Keep
            }
        )*
    };
}

/// A visitor is a record of optional per-type enter/exit callbacks plus
/// the wildcard pair; every hook defaults to `Keep`.
pub trait Visitor {
    #[allow(unused_variables)]
    fn enter_any(&mut self, node: &mut Node, ctx: &PathCtx) -> VisitAction {
        VisitAction::Keep
    }

    #[allow(unused_variables)]
    fn exit_any(&mut self, node: &mut Node, ctx: &PathCtx) -> VisitAction {
        VisitAction::Keep
    }

    visitor_hooks! {
        enter_regex, exit_regex, RegexNode;
        enter_pattern, exit_pattern, PatternNode;
        enter_alternative, exit_alternative, AlternativeNode;
        enter_flags, exit_flags, FlagsNode;
        enter_character, exit_character, CharacterNode;
        enter_character_class, exit_character_class, CharacterClassNode;
        enter_character_class_range, exit_character_class_range, CharacterClassRangeNode;
        enter_character_set, exit_character_set, CharacterSetNode;
        enter_assertion, exit_assertion, AssertionNode;
        enter_lookaround, exit_lookaround, LookaroundAssertionNode;
        enter_group, exit_group, GroupNode;
        enter_capturing_group, exit_capturing_group, CapturingGroupNode;
        enter_absent_function, exit_absent_function, AbsentFunctionNode;
        enter_backreference, exit_backreference, BackreferenceNode;
        enter_subroutine, exit_subroutine, SubroutineNode;
        enter_quantifier, exit_quantifier, QuantifierNode;
        enter_directive, exit_directive, DirectiveNode;
    }
}

fn dispatch_enter<V: Visitor + ?Sized>(v: &mut V, node: &mut Node, ctx: &PathCtx) -> VisitAction {
    match node {
        Node::Regex(n) => v.enter_regex(n, ctx),
        Node::Pattern(n) => v.enter_pattern(n, ctx),
        Node::Alternative(n) => v.enter_alternative(n, ctx),
        Node::Flags(n) => v.enter_flags(n, ctx),
        Node::Character(n) => v.enter_character(n, ctx),
        Node::CharacterClass(n) => v.enter_character_class(n, ctx),
        Node::CharacterClassRange(n) => v.enter_character_class_range(n, ctx),
        Node::CharacterSet(n) => v.enter_character_set(n, ctx),
        Node::Assertion(n) => v.enter_assertion(n, ctx),
        Node::LookaroundAssertion(n) => v.enter_lookaround(n, ctx),
        Node::Group(n) => v.enter_group(n, ctx),
        Node::CapturingGroup(n) => v.enter_capturing_group(n, ctx),
        Node::AbsentFunction(n) => v.enter_absent_function(n, ctx),
        Node::Backreference(n) => v.enter_backreference(n, ctx),
        Node::Subroutine(n) => v.enter_subroutine(n, ctx),
        Node::Quantifier(n) => v.enter_quantifier(n, ctx),
        Node::Directive(n) => v.enter_directive(n, ctx),
    }
}

fn dispatch_exit<V: Visitor + ?Sized>(v: &mut V, node: &mut Node, ctx: &PathCtx) -> VisitAction {
    match node {
        Node::Regex(n) => v.exit_regex(n, ctx),
        Node::Pattern(n) => v.exit_pattern(n, ctx),
        Node::Alternative(n) => v.exit_alternative(n, ctx),
        Node::Flags(n) => v.exit_flags(n, ctx),
        Node::Character(n) => v.exit_character(n, ctx),
        Node::CharacterClass(n) => v.exit_character_class(n, ctx),
        Node::CharacterClassRange(n) => v.exit_character_class_range(n, ctx),
        Node::CharacterSet(n) => v.exit_character_set(n, ctx),
        Node::Assertion(n) => v.exit_assertion(n, ctx),
        Node::LookaroundAssertion(n) => v.exit_lookaround(n, ctx),
        Node::Group(n) => v.exit_group(n, ctx),
        Node::CapturingGroup(n) => v.exit_capturing_group(n, ctx),
        Node::AbsentFunction(n) => v.exit_absent_function(n, ctx),
        Node::Backreference(n) => v.exit_backreference(n, ctx),
        Node::Subroutine(n) => v.exit_subroutine(n, ctx),
        Node::Quantifier(n) => v.exit_quantifier(n, ctx),
        Node::Directive(n) => v.exit_directive(n, ctx),
    }
}

// === Walk Driver ===

/// Walk `root` with `visitor`. Traversal state belongs to the visitor
/// value itself.
pub fn traverse<V: Visitor + ?Sized>(root: &mut Node, visitor: &mut V) -> Result<()> {
    let flags = match root {
        Node::Regex(re) => re.flags.as_flags().copied().unwrap_or_default(),
        _ => FlagsNode::default(),
    };
    let mut walker = Walker { visitor, flags };
    walker.visit_slot(root, ParentInfo::root())
}

#[derive(Clone, Copy)]
struct ParentInfo {
    ty: Option<NodeType>,
    quantifier: Option<QuantifierKind>,
}

impl ParentInfo {
    fn root() -> ParentInfo {
        ParentInfo {
            ty: None,
            quantifier: None,
        }
    }

    fn of(node: &Node) -> ParentInfo {
        ParentInfo {
            ty: Some(node.node_type()),
            quantifier: match node {
                Node::Quantifier(q) => Some(q.kind),
                _ => None,
            },
        }
    }
}

struct Walker<'v, V: Visitor + ?Sized> {
    visitor: &'v mut V,
    flags: FlagsNode,
}

impl<'v, V: Visitor + ?Sized> Walker<'v, V> {
    fn ctx(&self, parent: ParentInfo, index: Option<usize>) -> PathCtx {
        PathCtx {
            parent: parent.ty,
            parent_quantifier: parent.quantifier,
            index,
            flags: self.flags,
        }
    }

    /// Visit a node held in a single-child slot. Only `Keep`, `Skip`,
    /// and `Replace` apply; container primitives are invariant errors.
    fn visit_slot(&mut self, slot: &mut Node, parent: ParentInfo) -> Result<()> {
        let ctx = self.ctx(parent, None);
        let mut skip = false;

        for phase in 0..2 {
            let action = if phase == 0 {
                self.visitor.enter_any(slot, &ctx)
            } else {
                dispatch_enter(&mut *self.visitor, slot, &ctx)
            };
            match action {
                VisitAction::Keep => {}
                VisitAction::Skip => skip = true,
                VisitAction::Replace { node, traverse } => {
                    *slot = node;
                    if traverse {
                        self.visit_slot(slot, parent)?;
                    }
                    return Ok(());
                }
                other => return Err(slot_misuse(&other)),
            }
        }

        if !skip {
            self.walk_children(slot)?;
        }

        for phase in 0..2 {
            let action = if phase == 0 {
                dispatch_exit(&mut *self.visitor, slot, &ctx)
            } else {
                self.visitor.exit_any(slot, &ctx)
            };
            match action {
                VisitAction::Keep | VisitAction::Skip => {}
                VisitAction::Replace { node, traverse } => {
                    *slot = node;
                    if traverse {
                        self.visit_slot(slot, parent)?;
                    }
                    return Ok(());
                }
                other => return Err(slot_misuse(&other)),
            }
        }
        Ok(())
    }

    fn walk_vec(&mut self, vec: &mut Vec<Node>, parent: ParentInfo) -> Result<()> {
        let mut i = 0;
        while i < vec.len() {
            i = self.visit_at(vec, i, parent)?;
        }
        Ok(())
    }

    /// Visit `vec[i]`; returns the next cursor position after applying
    /// whatever mutations the callbacks requested.
    fn visit_at(&mut self, vec: &mut Vec<Node>, at: usize, parent: ParentInfo) -> Result<usize> {
        let mut i = at;
        let mut skip = false;

        for phase in 0..2 {
            let ctx = self.ctx(parent, Some(i));
            let action = if phase == 0 {
                self.visitor.enter_any(&mut vec[i], &ctx)
            } else {
                dispatch_enter(&mut *self.visitor, &mut vec[i], &ctx)
            };
            match action {
                VisitAction::Keep => {}
                VisitAction::Skip => skip = true,
                VisitAction::RemovePrevSiblings => {
                    vec.drain(0..i);
                    i = 0;
                }
                VisitAction::RemoveNextSiblings => {
                    vec.truncate(i + 1);
                }
                consuming => return self.apply_consuming(vec, i, consuming, parent),
            }
        }

        if !skip {
            self.walk_children(&mut vec[i])?;
        }

        for phase in 0..2 {
            let ctx = self.ctx(parent, Some(i));
            let action = if phase == 0 {
                dispatch_exit(&mut *self.visitor, &mut vec[i], &ctx)
            } else {
                self.visitor.exit_any(&mut vec[i], &ctx)
            };
            match action {
                VisitAction::Keep | VisitAction::Skip => {}
                VisitAction::RemovePrevSiblings => {
                    vec.drain(0..i);
                    i = 0;
                }
                VisitAction::RemoveNextSiblings => {
                    vec.truncate(i + 1);
                }
                consuming => return self.apply_consuming(vec, i, consuming, parent),
            }
        }
        Ok(i + 1)
    }

    /// Apply an action that replaces or removes `vec[i]`; no further
    /// callbacks run for the node that was there.
    fn apply_consuming(
        &mut self,
        vec: &mut Vec<Node>,
        i: usize,
        action: VisitAction,
        parent: ParentInfo,
    ) -> Result<usize> {
        match action {
            VisitAction::Replace { node, traverse } => {
                vec[i] = node;
                if traverse {
                    self.visit_at(vec, i, parent)
                } else {
                    Ok(i + 1)
                }
            }
            VisitAction::ReplaceMany { nodes, traverse } => {
                let count = nodes.len();
                vec.splice(i..=i, nodes);
                if !traverse {
                    return Ok(i + count);
                }
                // Each inserted node gets full visitor dispatch; the
                // visits themselves may shift the cursor further.
                let mut idx = i;
                let mut remaining = count;
                while remaining > 0 && idx < vec.len() {
                    idx = self.visit_at(vec, idx, parent)?;
                    remaining -= 1;
                }
                Ok(idx)
            }
            VisitAction::Remove => {
                vec.remove(i);
                Ok(i)
            }
            _ => unreachable!("non-consuming action"),
        }
    }

    /// Fixed child-order enumeration per node type.
    fn walk_children(&mut self, node: &mut Node) -> Result<()> {
        let parent = ParentInfo::of(node);
        match node {
            Node::Regex(re) => {
                self.visit_slot(&mut re.pattern, parent)?;
                self.visit_slot(&mut re.flags, parent)
            }
            Node::Pattern(n) => self.walk_vec(&mut n.alternatives, parent),
            Node::Group(n) => self.walk_vec(&mut n.alternatives, parent),
            Node::CapturingGroup(n) => self.walk_vec(&mut n.alternatives, parent),
            Node::LookaroundAssertion(n) => self.walk_vec(&mut n.alternatives, parent),
            Node::AbsentFunction(n) => self.walk_vec(&mut n.alternatives, parent),
            Node::Alternative(n) => self.walk_vec(&mut n.elements, parent),
            Node::CharacterClass(n) => self.walk_vec(&mut n.elements, parent),
            Node::CharacterClassRange(n) => {
                self.visit_slot(&mut n.min, parent)?;
                self.visit_slot(&mut n.max, parent)
            }
            Node::Quantifier(n) => self.visit_slot(&mut n.element, parent),
            Node::Assertion(_)
            | Node::Backreference(_)
            | Node::Character(_)
            | Node::CharacterSet(_)
            | Node::Directive(_)
            | Node::Flags(_)
            | Node::Subroutine(_) => Ok(()),
        }
    }
}

fn slot_misuse(action: &VisitAction) -> RegexError {
    let what = match action {
        VisitAction::ReplaceMany { .. } => "replace-with-multiple",
        VisitAction::Remove => "remove",
        VisitAction::RemovePrevSiblings => "remove-previous-siblings",
        VisitAction::RemoveNextSiblings => "remove-next-siblings",
        _ => "action",
    };
    RegexError::Invariant(format!("{} requires an array container", what))
}
