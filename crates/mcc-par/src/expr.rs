//! Expression grammar (spec.md §4.2 EBNF, `expr` down to `primary`) and the
//! type-directed additive rewrites (`new_add`/`new_sub`) that scale pointer
//! arithmetic to bytes.
//!
//! ```text
//! expr      = assign
//! assign    = equality ("=" assign)?
//! equality  = relational (("==" | "!=") relational)*
//! relational= add (("<"|"<="|">"|">=") add)*
//! add       = mul (("+"|"-") mul)*
//! mul       = unary (("*"|"/") unary)*
//! unary     = ("+"|"-"|"&"|"*") unary | postfix
//! postfix   = primary ("[" expr "]")*
//! primary   = "(" "{" compound-stmt ")" | "(" expr ")" | "sizeof" unary
//!           | IDENT "(" (assign ("," assign)*)? ")" | IDENT | STR | NUM
//! ```

use mcc_lex::TokenKind;
use mcc_util::{Diagnostic, Result, Span};

use crate::ast::{add_type, Node, NodeKind, ObjRef};
use crate::types::Type;
use crate::Parser;

impl<'src> Parser<'src> {
    pub(crate) fn expr(&mut self) -> Result<Node<'src>> {
        self.assign()
    }

    /// `assign = equality ("=" assign)?` — right-recursive, so `a = b = c`
    /// naturally parses as `Assign(a, Assign(b, c))` (spec.md §9: assignment
    /// associates right-to-left by construction).
    pub(crate) fn assign(&mut self) -> Result<Node<'src>> {
        let node = self.equality()?;
        let span = self.peek().span;
        if self.eat("=") {
            let rhs = self.assign()?;
            let mut node = Node::new(NodeKind::Assign(Box::new(node), Box::new(rhs)), span);
            add_type(&mut node)?;
            return Ok(node);
        }
        Ok(node)
    }

    pub(crate) fn equality(&mut self) -> Result<Node<'src>> {
        let mut node = self.relational()?;
        loop {
            let span = self.peek().span;
            if self.eat("==") {
                let rhs = self.relational()?;
                node = Node::new(NodeKind::Eq(Box::new(node), Box::new(rhs)), span);
            } else if self.eat("!=") {
                let rhs = self.relational()?;
                node = Node::new(NodeKind::Ne(Box::new(node), Box::new(rhs)), span);
            } else {
                return Ok(node);
            }
        }
    }

    /// `>` and `>=` are not distinct node kinds: the operands are swapped
    /// so they become `<` and `<=` (spec.md §4.3).
    pub(crate) fn relational(&mut self) -> Result<Node<'src>> {
        let mut node = self.add()?;
        loop {
            let span = self.peek().span;
            if self.eat("<") {
                let rhs = self.add()?;
                node = Node::new(NodeKind::Lt(Box::new(node), Box::new(rhs)), span);
            } else if self.eat("<=") {
                let rhs = self.add()?;
                node = Node::new(NodeKind::Le(Box::new(node), Box::new(rhs)), span);
            } else if self.eat(">") {
                let rhs = self.add()?;
                node = Node::new(NodeKind::Lt(Box::new(rhs), Box::new(node)), span);
            } else if self.eat(">=") {
                let rhs = self.add()?;
                node = Node::new(NodeKind::Le(Box::new(rhs), Box::new(node)), span);
            } else {
                return Ok(node);
            }
        }
    }

    pub(crate) fn add(&mut self) -> Result<Node<'src>> {
        let mut node = self.mul()?;
        loop {
            let span = self.peek().span;
            if self.eat("+") {
                let rhs = self.mul()?;
                node = new_add(node, rhs, span)?;
            } else if self.eat("-") {
                let rhs = self.mul()?;
                node = new_sub(node, rhs, span)?;
            } else {
                return Ok(node);
            }
        }
    }

    pub(crate) fn mul(&mut self) -> Result<Node<'src>> {
        let mut node = self.unary()?;
        loop {
            let span = self.peek().span;
            if self.eat("*") {
                let rhs = self.unary()?;
                node = Node::new(NodeKind::Mul(Box::new(node), Box::new(rhs)), span);
            } else if self.eat("/") {
                let rhs = self.unary()?;
                node = Node::new(NodeKind::Div(Box::new(node), Box::new(rhs)), span);
            } else {
                return Ok(node);
            }
        }
    }

    pub(crate) fn unary(&mut self) -> Result<Node<'src>> {
        let span = self.peek().span;
        if self.eat("+") {
            return self.unary();
        }
        if self.eat("-") {
            let operand = self.unary()?;
            return Ok(Node::new(NodeKind::Neg(Box::new(operand)), span));
        }
        if self.eat("&") {
            let operand = self.unary()?;
            return Ok(Node::new(NodeKind::Addr(Box::new(operand)), span));
        }
        if self.eat("*") {
            let operand = self.unary()?;
            return Ok(Node::new(NodeKind::Deref(Box::new(operand)), span));
        }
        self.postfix()
    }

    /// `postfix = primary ("[" expr "]")*` — array decay lowering `a[i]`
    /// to `*(a + i)` (spec.md §4.2 "Array subscript").
    pub(crate) fn postfix(&mut self) -> Result<Node<'src>> {
        let mut node = self.primary()?;
        while self.at("[") {
            let span = self.peek().span;
            self.advance();
            let index = self.expr()?;
            self.expect("]")?;
            let added = new_add(node, index, span)?;
            node = Node::new(NodeKind::Deref(Box::new(added)), span);
        }
        Ok(node)
    }

    fn primary(&mut self) -> Result<Node<'src>> {
        let tok = self.peek().clone();
        let span = tok.span;

        if self.eat("(") {
            if self.eat("{") {
                let stmts = self.compound_stmt()?;
                self.expect(")")?;
                let mut node = Node::new(NodeKind::StmtExpr(stmts), span);
                add_type(&mut node)?;
                return Ok(node);
            }
            let node = self.expr()?;
            self.expect(")")?;
            return Ok(node);
        }

        if self.eat("sizeof") {
            let mut operand = self.unary()?;
            add_type(&mut operand)?;
            let size = operand.ty.as_ref().expect("sizeof operand is typed").size as i64;
            let mut node = Node::new(NodeKind::Num(size), span);
            node.ty = Some(Type::int());
            return Ok(node);
        }

        match &tok.kind {
            TokenKind::Num(value) => {
                self.advance();
                let mut node = Node::new(NodeKind::Num(*value), span);
                node.ty = Some(Type::int());
                Ok(node)
            }
            TokenKind::Str(_) => {
                let bytes = tok.as_str_bytes().expect("TokenKind::Str carries bytes").to_vec();
                self.advance();
                let idx = self.new_string_literal(bytes);
                let ty = self.globals[idx].ty.clone();
                let mut node = Node::new(NodeKind::Var(ObjRef::Global(idx)), span);
                node.ty = Some(ty);
                Ok(node)
            }
            TokenKind::Ident => {
                self.advance();
                if self.at("(") {
                    return self.funcall(tok.lexeme, span);
                }
                match self.resolve(tok.lexeme) {
                    Some(obj_ref) => {
                        let ty = match obj_ref {
                            ObjRef::Local(idx) => self.locals[idx].ty.clone(),
                            ObjRef::Global(idx) => self.globals[idx].ty.clone(),
                        };
                        let mut node = Node::new(NodeKind::Var(obj_ref), span);
                        node.ty = Some(ty);
                        Ok(node)
                    }
                    None => Err(Diagnostic::new("undefined variable", span)),
                }
            }
            _ => Err(self.error("expected an expression")),
        }
    }

    /// `funcall = ident "(" (assign ("," assign)*)? ")"`. The callee name
    /// is emitted literally into the assembly later — a call never looks
    /// up the callee as an object (spec.md §4.2 "Name resolution").
    fn funcall(&mut self, name: &'src str, span: Span) -> Result<Node<'src>> {
        self.expect("(")?;
        let mut args = Vec::new();
        if !self.at(")") {
            loop {
                args.push(self.assign()?);
                if !self.eat(",") {
                    break;
                }
            }
        }
        self.expect(")")?;
        Ok(Node::new(NodeKind::FunCall { name, args }, span))
    }
}

/// `int + int`, `ptr + int` (normalized from `int + ptr`), scaled by the
/// pointee size; `ptr + ptr` is rejected (spec.md §4.2). Mirrors the
/// original `new_add`: both operands are typed up front so the pointer
/// check can run before any rewrite happens.
fn new_add<'src>(mut lhs: Node<'src>, mut rhs: Node<'src>, span: Span) -> Result<Node<'src>> {
    add_type(&mut lhs)?;
    add_type(&mut rhs)?;
    let lt = lhs.ty.clone().expect("operand typed above");
    let rt = rhs.ty.clone().expect("operand typed above");

    if lt.is_integer() && rt.is_integer() {
        return Ok(Node::new(NodeKind::Add(Box::new(lhs), Box::new(rhs)), span));
    }
    if lt.is_pointer_like() && rt.is_pointer_like() {
        return Err(Diagnostic::new("invalid operands: pointer + pointer", span));
    }

    let (ptr, count, ptr_ty) = if lt.is_pointer_like() { (lhs, rhs, lt) } else { (rhs, lhs, rt) };
    let elem_size = ptr_ty.base.as_ref().expect("pointer-like type has a base").size as i64;
    let scale = Node { kind: NodeKind::Num(elem_size), ty: Some(Type::int()), span };
    let scaled = Node::new(NodeKind::Mul(Box::new(count), Box::new(scale)), span);
    Ok(Node::new(NodeKind::Add(Box::new(ptr), Box::new(scaled)), span))
}

/// `int - int`, `ptr - int` scaled by the pointee size, `ptr - ptr` as an
/// element count (spec.md §4.2 "Type-directed rewrites"). `int - ptr` and
/// any other combination are invalid operands.
fn new_sub<'src>(mut lhs: Node<'src>, mut rhs: Node<'src>, span: Span) -> Result<Node<'src>> {
    add_type(&mut lhs)?;
    add_type(&mut rhs)?;
    let lt = lhs.ty.clone().expect("operand typed above");
    let rt = rhs.ty.clone().expect("operand typed above");

    if lt.is_integer() && rt.is_integer() {
        return Ok(Node::new(NodeKind::Sub(Box::new(lhs), Box::new(rhs)), span));
    }

    if lt.is_pointer_like() && rt.is_integer() {
        let elem_size = lt.base.as_ref().expect("pointer-like type has a base").size as i64;
        let scale = Node { kind: NodeKind::Num(elem_size), ty: Some(Type::int()), span };
        let mut scaled = Node::new(NodeKind::Mul(Box::new(rhs), Box::new(scale)), span);
        add_type(&mut scaled)?;
        let mut node = Node::new(NodeKind::Sub(Box::new(lhs), Box::new(scaled)), span);
        node.ty = Some(lt);
        return Ok(node);
    }

    if lt.is_pointer_like() && rt.is_pointer_like() {
        let elem_size = lt.base.as_ref().expect("pointer-like type has a base").size as i64;
        let mut node = Node::new(NodeKind::Sub(Box::new(lhs), Box::new(rhs)), span);
        node.ty = Some(Type::int());
        let count = Node { kind: NodeKind::Num(elem_size), ty: Some(Type::int()), span };
        return Ok(Node::new(NodeKind::Div(Box::new(node), Box::new(count)), span));
    }

    Err(Diagnostic::new("invalid operands", span))
}

#[cfg(test)]
mod tests {
    use crate::parse;

    #[test]
    fn pointer_plus_int_scales_by_pointee_size() {
        let program = parse("int main(){ int *p; return *(p+1); }").unwrap();
        assert_eq!(program.functions.len(), 1);
    }

    #[test]
    fn int_plus_pointer_is_normalized() {
        let program = parse("int main(){ int *p; return *(1+p); }").unwrap();
        assert_eq!(program.functions.len(), 1);
    }

    #[test]
    fn pointer_plus_pointer_is_rejected() {
        assert!(parse("int main(){ int *p; int *q; return p+q; }").is_err());
    }

    #[test]
    fn pointer_minus_pointer_yields_element_count() {
        let program = parse("int main(){ int a[4]; return &a[3] - &a[0]; }").unwrap();
        assert_eq!(program.functions.len(), 1);
    }

    #[test]
    fn array_subscript_lowers_to_deref_of_add() {
        let program = parse("int main(){ int a[3]; a[0]=1; return a[0]; }").unwrap();
        assert_eq!(program.functions.len(), 1);
    }

    #[test]
    fn sizeof_reports_static_type_size() {
        let program = parse("int main(){ int a[4]; return sizeof(a); }").unwrap();
        assert_eq!(program.functions.len(), 1);
    }

    #[test]
    fn stmt_expr_yields_last_statement_value() {
        let program = parse("int main(){ return ({ 1; 2; 3; }); }").unwrap();
        assert_eq!(program.functions.len(), 1);
    }

    #[test]
    fn string_literal_is_a_char_array_global() {
        let program = parse(r#"int main(){ char *s = "hi"; return 0; }"#).unwrap();
        assert_eq!(program.globals.len(), 1);
    }

    #[test]
    fn undefined_variable_is_fatal() {
        assert!(parse("int main(){ return x; }").is_err());
    }
}
