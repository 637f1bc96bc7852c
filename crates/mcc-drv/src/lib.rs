//! Driver: wires the lexer, parser and code generator together and
//! reports back in terms `main` can turn into an exit code.
//!
//! The pipeline takes exactly one source string per invocation, so
//! `Config` carries only what that contract needs — the teacher's own
//! multi-file, multi-flag `Config` has no counterpart here.

use anyhow::Result;

/// Driver configuration for a single compilation.
#[derive(Debug, Clone)]
pub struct Config {
    pub source: String,
    pub verbose: bool,
}

/// Runs the lexer, parser and code generator over `source` in order and
/// returns the emitted assembly text.
///
/// A pipeline failure (a `mcc_util::Diagnostic`) is downcastable out of
/// the returned `anyhow::Error` so `main` can render it with
/// `mcc_util::render` before choosing an exit code.
///
/// # Examples
///
/// ```
/// let asm = mcc_drv::run("int main(){ return 0; }", false).unwrap();
/// assert!(asm.contains("main:"));
/// ```
pub fn run(source: &str, verbose: bool) -> Result<String> {
    if verbose {
        eprintln!("lexing and parsing source ({} bytes)", source.len());
    }
    let mut program = mcc_par::parse(source)?;

    if verbose {
        eprintln!(
            "parsed {} function(s), {} global(s); generating assembly",
            program.functions.len(),
            program.globals.len()
        );
    }

    let mut out = Vec::new();
    mcc_gen::generate(&mut program, &mut out)?;
    Ok(String::from_utf8(out).expect("generator only emits ASCII assembly text"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_the_full_pipeline() {
        let asm = run("int main(){ return 42; }", false).unwrap();
        assert!(asm.contains("main:"));
        assert!(asm.contains("mov $42, %rax"));
    }

    #[test]
    fn surfaces_a_diagnostic_on_syntax_error() {
        let err = run("int main(){ return ; }", false).unwrap_err();
        assert!(err.downcast_ref::<mcc_util::Diagnostic>().is_some());
    }

    #[test]
    fn verbose_flag_does_not_change_the_output() {
        let quiet = run("int main(){ return 1; }", false).unwrap();
        let loud = run("int main(){ return 1; }", true).unwrap();
        assert_eq!(quiet, loud);
    }
}
