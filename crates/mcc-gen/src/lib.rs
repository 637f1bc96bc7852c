//! Code generator for `mcc`: turns a typed [`mcc_par::Program`] into
//! AT&T-syntax x86-64 assembly text for the System V AMD64 calling
//! convention. No further compilation stage follows this one — the
//! output is ready to hand to an assembler.

mod codegen;
mod error;

pub use codegen::generate;
pub use error::{GenError, Result};

#[cfg(test)]
mod tests;
