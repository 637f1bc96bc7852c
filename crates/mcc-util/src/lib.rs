//! Core utilities shared by every stage of the `mcc` pipeline.
//!
//! This crate is the leaf of the workspace: it has no dependency on
//! `mcc-lex`/`mcc-par`/`mcc-gen`/`mcc-drv`, only the other way around.
//! It provides source-location tracking ([`span`]), the one fatal-error
//! taxonomy the whole pipeline reports through ([`error`]), and the
//! typed-index vector used for local/global variable tables
//! ([`index_vec`]).

pub mod error;
pub mod index_vec;
pub mod span;

pub use error::{render, Diagnostic, Result};
pub use index_vec::{Idx, IndexVec};
pub use span::Span;
