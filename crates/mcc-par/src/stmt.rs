//! Statement and declaration grammar (spec.md §4.2):
//!
//! ```text
//! compound-stmt = (declaration | stmt)* "}"
//! declaration   = declspec (declarator ("=" assign)?
//!                           ("," declarator ("=" assign)?)*)? ";"
//! stmt          = "return" expr ";"
//!               | "if" "(" expr ")" stmt ("else" stmt)?
//!               | "for" "(" expr-stmt expr? ";" expr? ")" stmt
//!               | "while" "(" expr ")" stmt
//!               | "{" compound-stmt
//!               | expr-stmt
//! expr-stmt     = expr? ";"
//! ```

use mcc_util::Result;

use crate::ast::{add_type, Node, NodeKind, Obj, ObjRef};
use crate::Parser;

impl<'src> Parser<'src> {
    /// Assumes the opening `{` has already been consumed; consumes the
    /// closing `}`. Every statement is type-decorated immediately after
    /// it is built, the same way the original parser calls `add_type` on
    /// each statement as it's appended to the block (spec.md §3.3:
    /// lexical ordering of statements is preserved).
    pub(crate) fn compound_stmt(&mut self) -> Result<Vec<Node<'src>>> {
        let mut stmts = Vec::new();
        while !self.at("}") {
            let mut node = if self.at("int") || self.at("char") {
                self.declaration()?
            } else {
                self.stmt()?
            };
            add_type(&mut node)?;
            stmts.push(node);
        }
        self.expect("}")?;
        Ok(stmts)
    }

    /// A multi-declarator local declaration lowers to a `Block` of the
    /// `Assign` expr-stmts for declarators with an initializer; a bare
    /// declarator just registers the local with no emitted statement.
    fn declaration(&mut self) -> Result<Node<'src>> {
        let span = self.peek().span;
        let base = self.declspec()?;
        let mut stmts = Vec::new();
        let mut first = true;
        while !self.at(";") {
            if !first {
                self.expect(",")?;
            }
            first = false;
            let ty = self.declarator(base.clone())?;
            let name = ty.name.expect("declarator sets name");
            let name_span = self.last_decl_span;
            let idx = self.locals.push(Obj::local(name, ty.clone()));
            if self.eat("=") {
                let mut lhs = Node::new(NodeKind::Var(ObjRef::Local(idx)), name_span);
                lhs.ty = Some(ty);
                let rhs = self.assign()?;
                let mut assign_node = Node::new(NodeKind::Assign(Box::new(lhs), Box::new(rhs)), name_span);
                add_type(&mut assign_node)?;
                stmts.push(Node::new(NodeKind::ExprStmt(Box::new(assign_node)), name_span));
            }
        }
        self.expect(";")?;
        Ok(Node::new(NodeKind::Block(stmts), span))
    }

    fn stmt(&mut self) -> Result<Node<'src>> {
        let span = self.peek().span;

        if self.eat("return") {
            let value = self.expr()?;
            self.expect(";")?;
            return Ok(Node::new(NodeKind::Return(Box::new(value)), span));
        }

        if self.eat("{") {
            let stmts = self.compound_stmt()?;
            return Ok(Node::new(NodeKind::Block(stmts), span));
        }

        if self.eat("if") {
            self.expect("(")?;
            let cond = self.expr()?;
            self.expect(")")?;
            let then_branch = self.stmt()?;
            let else_branch = if self.eat("else") { Some(Box::new(self.stmt()?)) } else { None };
            return Ok(Node::new(
                NodeKind::If { cond: Box::new(cond), then_branch: Box::new(then_branch), else_branch },
                span,
            ));
        }

        if self.eat("for") {
            self.expect("(")?;
            let init = self.expr_stmt()?;
            let cond = if self.at(";") { None } else { Some(Box::new(self.expr()?)) };
            self.expect(";")?;
            let inc = if self.at(")") { None } else { Some(Box::new(self.expr()?)) };
            self.expect(")")?;
            let body = self.stmt()?;
            return Ok(Node::new(
                NodeKind::For { init: Some(Box::new(init)), cond, inc, body: Box::new(body) },
                span,
            ));
        }

        if self.eat("while") {
            self.expect("(")?;
            let cond = self.expr()?;
            self.expect(")")?;
            let body = self.stmt()?;
            return Ok(Node::new(NodeKind::For { init: None, cond: Some(Box::new(cond)), inc: None, body: Box::new(body) }, span));
        }

        self.expr_stmt()
    }

    /// `expr-stmt = expr? ";"` — a bare `;` lowers to an empty block, the
    /// same placeholder the original parser returns so callers (`for`'s
    /// optional init) always get a real node back.
    fn expr_stmt(&mut self) -> Result<Node<'src>> {
        let span = self.peek().span;
        if self.eat(";") {
            return Ok(Node::new(NodeKind::Block(Vec::new()), span));
        }
        let value = self.expr()?;
        self.expect(";")?;
        Ok(Node::new(NodeKind::ExprStmt(Box::new(value)), span))
    }
}

#[cfg(test)]
mod tests {
    use crate::parse;

    #[test]
    fn multi_declarator_with_initializers() {
        let program = parse("int main(){ int a=3, b=5*6-8; return a+b/2; }").unwrap();
        let locals = &program.functions[0].locals;
        assert_eq!(locals.len(), 2);
    }

    #[test]
    fn bare_declarator_with_no_initializer_registers_local() {
        let program = parse("int main(){ int a; a=7; return a; }").unwrap();
        assert_eq!(program.functions[0].locals.len(), 1);
    }

    #[test]
    fn for_loop_with_empty_init_and_inc() {
        let program = parse("int main(){ int i=0; for(;i<3;) i=i+1; return i; }").unwrap();
        assert_eq!(program.functions.len(), 1);
    }

    #[test]
    fn while_desugars_to_for_node() {
        let program = parse("int main(){ int i=0; while(i<3) i=i+1; return i; }").unwrap();
        assert_eq!(program.functions.len(), 1);
    }

    #[test]
    fn if_else_parses() {
        let program = parse("int main(){ if (1) return 1; else return 0; }").unwrap();
        assert_eq!(program.functions.len(), 1);
    }

    #[test]
    fn nested_blocks_preserve_order() {
        let program = parse("int main(){ { int a=1; } return 0; }").unwrap();
        assert_eq!(program.functions.len(), 1);
    }
}
