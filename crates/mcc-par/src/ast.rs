//! Abstract syntax: nodes (spec.md §3.3), objects (spec.md §3.4) and the
//! `add_type` decoration pass (spec.md §4.2).

use mcc_util::index_vec::{Idx, IndexVec};
use mcc_util::{Diagnostic, Result, Span};

use crate::types::{Type, TypeKind};

/// Index of a local (including parameters) within its owning
/// [`Function::locals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalIdx(u32);

impl Idx for LocalIdx {
    fn from_usize(idx: usize) -> Self {
        LocalIdx(idx as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a global within [`Program::globals`] (includes anonymous
/// string-literal globals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalIdx(u32);

impl Idx for GlobalIdx {
    fn from_usize(idx: usize) -> Self {
        GlobalIdx(idx as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which table a `var` node's identifier resolved against (spec.md §3.4:
/// "locals first ... then globals").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjRef {
    Local(LocalIdx),
    Global(GlobalIdx),
}

/// A named storage location: a local, parameter, global, or — by virtue
/// of sharing this struct — the storage backing a string literal
/// (spec.md §3.4).
#[derive(Debug, Clone)]
pub struct Obj<'src> {
    pub name: &'src str,
    pub ty: Type<'src>,
    pub is_local: bool,
    /// Frame-pointer offset in bytes; `0` until the code generator
    /// assigns it (spec.md §3.4, §4.3 "Local layout").
    pub offset: i64,
    /// `Some` for globals with an initializer (including every string
    /// literal); `None` for zero-initialized globals and for locals.
    pub init_data: Option<Vec<u8>>,
}

impl<'src> Obj<'src> {
    pub fn local(name: &'src str, ty: Type<'src>) -> Self {
        Obj { name, ty, is_local: true, offset: 0, init_data: None }
    }

    pub fn global(name: &'src str, ty: Type<'src>, init_data: Option<Vec<u8>>) -> Self {
        Obj { name, ty, is_local: false, offset: 0, init_data }
    }
}

#[derive(Debug)]
pub enum NodeKind<'src> {
    Num(i64),
    Neg(Box<Node<'src>>),
    Addr(Box<Node<'src>>),
    Deref(Box<Node<'src>>),
    Add(Box<Node<'src>>, Box<Node<'src>>),
    Sub(Box<Node<'src>>, Box<Node<'src>>),
    Mul(Box<Node<'src>>, Box<Node<'src>>),
    Div(Box<Node<'src>>, Box<Node<'src>>),
    Eq(Box<Node<'src>>, Box<Node<'src>>),
    Ne(Box<Node<'src>>, Box<Node<'src>>),
    Lt(Box<Node<'src>>, Box<Node<'src>>),
    Le(Box<Node<'src>>, Box<Node<'src>>),
    Assign(Box<Node<'src>>, Box<Node<'src>>),
    Var(ObjRef),
    FunCall { name: &'src str, args: Vec<Node<'src>> },
    ExprStmt(Box<Node<'src>>),
    Block(Vec<Node<'src>>),
    StmtExpr(Vec<Node<'src>>),
    Return(Box<Node<'src>>),
    If { cond: Box<Node<'src>>, then_branch: Box<Node<'src>>, else_branch: Option<Box<Node<'src>>> },
    For { init: Option<Box<Node<'src>>>, cond: Option<Box<Node<'src>>>, inc: Option<Box<Node<'src>>>, body: Box<Node<'src>> },
}

/// Every expression node carries a computed type once `add_type` has
/// run; statement nodes (`Block`, `Return`, `If`, `For`, `ExprStmt`)
/// leave it `None` — nothing downstream reads a statement's type.
#[derive(Debug)]
pub struct Node<'src> {
    pub kind: NodeKind<'src>,
    pub ty: Option<Type<'src>>,
    pub span: Span,
}

impl<'src> Node<'src> {
    pub fn new(kind: NodeKind<'src>, span: Span) -> Self {
        Node { kind, ty: None, span }
    }

    pub fn is_lvalue(&self) -> bool {
        matches!(self.kind, NodeKind::Var(_) | NodeKind::Deref(_))
    }
}

/// A function definition: parameters (the first `params.len()` entries
/// of `locals`, left-to-right), every local in declaration order, the
/// frame size, and the body (spec.md §3.4).
#[derive(Debug)]
pub struct Function<'src> {
    pub name: &'src str,
    pub ret_ty: Type<'src>,
    pub params: Vec<LocalIdx>,
    pub locals: IndexVec<LocalIdx, Obj<'src>>,
    pub stack_size: i64,
    pub body: Node<'src>,
}

/// The whole translation unit: every global (source order, with
/// string-literal globals appended as they're discovered) and every
/// function (source order).
#[derive(Debug, Default)]
pub struct Program<'src> {
    pub globals: IndexVec<GlobalIdx, Obj<'src>>,
    pub functions: Vec<Function<'src>>,
}

/// Recursively assigns a type to every expression node that doesn't
/// already carry one (spec.md §4.2). `Var` nodes are typed directly at
/// construction time from the resolved object, so the guard at the top
/// makes revisiting them here a no-op.
pub fn add_type(node: &mut Node<'_>) -> Result<()> {
    if node.ty.is_some() {
        return Ok(());
    }

    match &mut node.kind {
        NodeKind::Num(_) | NodeKind::Var(_) => {}
        NodeKind::Neg(x) | NodeKind::Addr(x) | NodeKind::Deref(x) | NodeKind::ExprStmt(x) | NodeKind::Return(x) => {
            add_type(x)?;
        }
        NodeKind::Add(l, r)
        | NodeKind::Sub(l, r)
        | NodeKind::Mul(l, r)
        | NodeKind::Div(l, r)
        | NodeKind::Eq(l, r)
        | NodeKind::Ne(l, r)
        | NodeKind::Lt(l, r)
        | NodeKind::Le(l, r)
        | NodeKind::Assign(l, r) => {
            add_type(l)?;
            add_type(r)?;
        }
        NodeKind::FunCall { args, .. } => {
            for arg in args.iter_mut() {
                add_type(arg)?;
            }
        }
        NodeKind::Block(stmts) | NodeKind::StmtExpr(stmts) => {
            for stmt in stmts.iter_mut() {
                add_type(stmt)?;
            }
        }
        NodeKind::If { cond, then_branch, else_branch } => {
            add_type(cond)?;
            add_type(then_branch)?;
            if let Some(e) = else_branch {
                add_type(e)?;
            }
        }
        NodeKind::For { init, cond, inc, body } => {
            if let Some(i) = init {
                add_type(i)?;
            }
            if let Some(c) = cond {
                add_type(c)?;
            }
            if let Some(i) = inc {
                add_type(i)?;
            }
            add_type(body)?;
        }
    }

    node.ty = match &node.kind {
        NodeKind::Num(_) => Some(Type::int()),
        NodeKind::Neg(x) => x.ty.clone(),
        NodeKind::Assign(l, _) => {
            if l.ty.as_ref().is_some_and(Type::is_array) {
                return Err(Diagnostic::new("not an lvalue", l.span));
            }
            l.ty.clone()
        }
        NodeKind::Add(l, _) | NodeKind::Sub(l, _) | NodeKind::Mul(l, _) | NodeKind::Div(l, _) => l.ty.clone(),
        NodeKind::Eq(..) | NodeKind::Ne(..) | NodeKind::Lt(..) | NodeKind::Le(..) | NodeKind::FunCall { .. } => {
            Some(Type::int())
        }
        NodeKind::Addr(x) => {
            let base = x.ty.clone().expect("operand typed before its parent");
            Some(match base.kind {
                TypeKind::Array => Type::pointer_to(*base.base.expect("array has a base")),
                _ => Type::pointer_to(base),
            })
        }
        NodeKind::Deref(x) => {
            let base = x.ty.clone().expect("operand typed before its parent");
            match base.base {
                Some(b) => Some(*b),
                None => return Err(Diagnostic::new("invalid pointer dereference", x.span)),
            }
        }
        NodeKind::StmtExpr(stmts) => Some(stmts.last().and_then(|s| s.ty.clone()).unwrap_or_else(Type::int)),
        _ => None,
    };

    Ok(())
}
