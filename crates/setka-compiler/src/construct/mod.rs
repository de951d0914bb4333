//! ATN construction: grammar AST in, frozen automaton out.
//!
//! Organization:
//!
//! - `factory`: the [`AtnFactory`] / [`LexerFactoryExt`] traits, the
//!   [`ParserFactory`] and [`LexerFactory`] implementations, and the
//!   leaf operations (token, range, set, rule call, predicate, action)
//! - `blocks`: sequencing, alternation, and the single-symbol collapse
//! - `loops`: the `?` `*` `+` constructions
//! - `lexer`: literal chains, lexer commands, mode dispatch
//! - `driver`: the AST walk behind [`build_atn`]
//! - `error`: [`ConstructionError`] and its kinds
//!
//! The pipeline:
//!
//! ```text
//! Grammar ──walk──▶ factory ops ──wire──▶ Atn ──freeze──▶ FrozenAtn
//! ```
//!
//! Each rule gets its start/stop pair before any body is built, so
//! rule references resolve regardless of declaration order. A rule
//! that fails mid-body leaves its fragment states in the arena; the
//! driver reports the error and moves on to the next rule, and the
//! final freeze only verifies what the surviving rules reach.

mod blocks;
mod driver;
mod error;
mod factory;
mod lexer;
mod loops;


pub use driver::{build_atn, build_lexer_atn, build_parser_atn};
pub use error::{ConstructionError, ConstructionErrorKind};
pub use factory::{AtnFactory, BlockContext, Handle, LexerFactory, LexerFactoryExt, ParserFactory};
