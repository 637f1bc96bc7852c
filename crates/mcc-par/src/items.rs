//! Top-level grammar (spec.md §4.2):
//!
//! ```text
//! program     = (function-def | global-var)*
//! function-def= declspec declarator "{" compound-stmt
//! global-var  = declspec (declarator ("," declarator)*)? ";"
//! ```

use mcc_util::Result;
use mcc_util::index_vec::IndexVec;

use crate::ast::{Function, Node, NodeKind, Obj, Program};
use crate::types::{Type, TypeKind};
use crate::Parser;

impl<'src> Parser<'src> {
    /// `program = (function-def | global-var)*`. Disambiguation (spec.md
    /// §4.2 "Disambiguating function vs global variable") speculatively
    /// applies `declarator` after the shared `declspec`, then rewinds the
    /// token cursor and re-parses for real against whichever production
    /// the resulting type's kind calls for.
    pub(crate) fn program(&mut self) -> Result<Program<'src>> {
        while !self.at_eof() {
            let base = self.declspec()?;
            let checkpoint = self.pos;
            let probe = self.declarator(base.clone())?;
            self.pos = checkpoint;

            if probe.kind == TypeKind::Func {
                self.function(base)?;
            } else {
                self.global_var(base)?;
            }
        }

        Ok(Program { globals: std::mem::take(&mut self.globals), functions: std::mem::take(&mut self.functions) })
    }

    /// `function-def = declspec declarator "{" compound-stmt`. Resets
    /// `locals` at entry (spec.md §4.2); the declarator's function type
    /// carries one named `Type` per parameter, in left-to-right order, so
    /// those become the first entries of `locals` (spec.md §3.4).
    fn function(&mut self, base: Type<'src>) -> Result<()> {
        let ty = self.declarator(base)?;
        let name = ty.name.expect("function declarator sets a name");
        let fn_span = self.last_decl_span;
        let (ret_ty, param_tys) = match ty.kind {
            TypeKind::Func => (*ty.base.expect("function type has a return type"), ty.params),
            _ => unreachable!("caller only routes Func-kind types here"),
        };

        self.locals = IndexVec::new();
        let mut params = Vec::with_capacity(param_tys.len());
        for param_ty in param_tys {
            let param_name = param_ty.name.expect("param declarator sets a name");
            params.push(self.locals.push(Obj::local(param_name, param_ty)));
        }

        self.expect("{")?;
        let body_stmts = self.compound_stmt()?;
        let body = Node::new(NodeKind::Block(body_stmts), fn_span);
        let locals = std::mem::replace(&mut self.locals, IndexVec::new());

        self.functions.push(Function { name, ret_ty, params, locals, stack_size: 0, body });
        Ok(())
    }

    /// `global-var = declspec (declarator ("," declarator)*)? ";"` —
    /// globals take no initializer (spec.md §4.2 grammar; only locals may
    /// be initialized).
    fn global_var(&mut self, base: Type<'src>) -> Result<()> {
        let mut first = true;
        while !self.at(";") {
            if !first {
                self.expect(",")?;
            }
            first = false;
            let ty = self.declarator(base.clone())?;
            let name = ty.name.expect("declarator sets a name");
            self.globals.push(Obj::global(name, ty, None));
        }
        self.expect(";")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::parse;

    #[test]
    fn function_params_become_leading_locals() {
        let program = parse("int add2(int x, int y){ return x+y; }").unwrap();
        let f = &program.functions[0];
        assert_eq!(f.params.len(), 2);
        assert_eq!(f.locals.len(), 2);
    }

    #[test]
    fn global_variable_declaration() {
        let program = parse("int counter; int main(){ return counter; }").unwrap();
        assert_eq!(program.globals.len(), 1);
        assert_eq!(program.functions.len(), 1);
    }

    #[test]
    fn multi_declarator_globals() {
        let program = parse("int a, b, c;").unwrap();
        assert_eq!(program.globals.len(), 3);
    }

    #[test]
    fn function_vs_global_disambiguation() {
        let program = parse("int x; int f(){ return 0; } int y;").unwrap();
        assert_eq!(program.globals.len(), 2);
        assert_eq!(program.functions.len(), 1);
    }

    #[test]
    fn array_and_pointer_globals() {
        use mcc_util::index_vec::Idx;
        let program = parse("int arr[10]; int *ptr; int main(){ return 0; }").unwrap();
        assert_eq!(program.globals.len(), 2);
        assert!(program.globals[crate::GlobalIdx::from_usize(0)].ty.is_array());
    }
}
