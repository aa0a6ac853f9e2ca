// prelude.rs - Convenient re-exports for the public surface.
//
//! # Prelude
//!
//! ```
//! use onigtree::prelude::*;
//!
//! let optimized = optimize("[[a]]", &OptimizeOptions::default()).unwrap();
//! assert_eq!(optimized.pattern, "a");
//! ```

pub use crate::ast::{
    AssertionKind, CharacterSetKind, ClassKind, DirectiveKind, FlagGroupModifiers, FlagSet,
    FlagsNode, GroupRef, LookaroundKind, Node, NodeType, QuantifierKind, TextSegmentMode,
    MAX_CODE_POINT, REPEAT_INFINITE,
};
pub use crate::error::{ErrorKind, RegexError, Result};
pub use crate::generator::{generate, Generated};
pub use crate::optimize::{optimize, optional_optimizations, OptimizeOptions, Optimized};
pub use crate::parser::{parse, ParseOptions, Rules};
pub use crate::traverse::{traverse, PathCtx, VisitAction, Visitor};
pub use crate::unicode::PropertyMap;
