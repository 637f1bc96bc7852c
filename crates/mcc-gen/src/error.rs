//! Error type for the code generator.
//!
//! Code generation itself does not reject any program the parser
//! accepted, with one exception: `gen_addr` only discovers a non-lvalue
//! on the left side of an assignment or the operand of `&`/`*` once it
//! walks the tree, so it reports through the same
//! [`mcc_util::Diagnostic`] taxonomy as the earlier stages rather than
//! inventing a second one. The writer handed to [`crate::generate`] can
//! also fail, which is the other half of why this crate depends on
//! `thiserror` at all.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    #[error(transparent)]
    Diagnostic(#[from] mcc_util::Diagnostic),
    #[error("error writing assembly output: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GenError>;
