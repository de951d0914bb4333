//! Setka compiler front half: grammar AST and ATN construction.
//!
//! This crate turns a grammar into an executable automaton:
//! - `ast` - grammar, rules, alternatives, elements
//! - `construct` - the factory operations and the AST walk
//!
//! The pipeline is `Grammar` → [`build_atn`] → [`FrozenAtn`]. The
//! machine model itself lives in the `setka-atn` crate.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod ast;
pub mod construct;

#[cfg(test)]
pub mod test_utils;

pub use construct::{
    AtnFactory, ConstructionError, ConstructionErrorKind, LexerFactory, LexerFactoryExt,
    ParserFactory, build_atn, build_lexer_atn, build_parser_atn,
};
pub use setka_atn::{Atn, AtnError, FrozenAtn, MachineKind};

/// Errors that can occur while building an automaton.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("atn construction failed with {} errors", .0.len())]
    Construction(Vec<ConstructionError>),

    #[error(transparent)]
    Atn(#[from] AtnError),
}

impl From<ConstructionError> for Error {
    fn from(e: ConstructionError) -> Self {
        Error::Construction(vec![e])
    }
}

/// Result type for construction operations.
pub type Result<T> = std::result::Result<T, Error>;
