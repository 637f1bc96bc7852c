//! Stack-machine code generator (spec.md §4.3): walks the typed AST and
//! emits AT&T-syntax x86-64 assembly for System V AMD64. Every expression
//! leaves its value in `%rax`; binary operators push/pop to sequence two
//! operands. No register allocation is performed.

use std::io::Write;

use mcc_par::{Function, GlobalIdx, LocalIdx, Node, NodeKind, Obj, ObjRef, Program, Type};
use mcc_util::index_vec::IndexVec;
use mcc_util::Diagnostic;

use crate::error::{GenError, Result};

const ARGREG64: [&str; 6] = ["%rdi", "%rsi", "%rdx", "%rcx", "%r8", "%r9"];
const ARGREG8: [&str; 6] = ["%dil", "%sil", "%dl", "%cl", "%r8b", "%r9b"];

/// Generates the full translation unit: `.data` for every global in
/// source order, then `.text` for every function in source order
/// (spec.md §5 "Ordering guarantees"). Assigns local frame offsets and
/// each function's `stack_size` first (spec.md §4.3 "Local layout"),
/// since the prologue needs `stack_size` before any instruction for the
/// function body is emitted.
///
/// # Examples
///
/// ```
/// use mcc_gen::generate;
///
/// let mut program = mcc_par::parse("int main(){ return 0; }").unwrap();
/// let mut out = Vec::new();
/// generate(&mut program, &mut out).unwrap();
/// let asm = String::from_utf8(out).unwrap();
/// assert!(asm.contains("main:"));
/// assert!(asm.contains("ret"));
/// ```
pub fn generate<W: Write>(program: &mut Program<'_>, out: &mut W) -> Result<()> {
    assign_local_offsets(program);
    let mut gen = CodeGenerator { out, depth: 0, label_count: 1, current_fn: String::new() };
    gen.emit_data(program)?;
    gen.emit_text(program)?;
    Ok(())
}

/// Spec.md §4.3 "Local layout": accumulate a running offset over each
/// function's locals and assign every one a unique negative
/// frame-pointer offset, then round the total up to 16 bytes. The
/// original iterates a head-inserted chain in reverse declaration order;
/// our `locals` are stored forward already, which the Design Notes
/// (spec.md §9) call out as an equally valid, merely differently
/// laid-out, assignment.
fn assign_local_offsets(program: &mut Program<'_>) {
    for function in program.functions.iter_mut() {
        let mut offset: i64 = 0;
        for obj in function.locals.as_mut_slice().iter_mut() {
            offset += obj.ty.size as i64;
            obj.offset = -offset;
        }
        function.stack_size = align_to(offset, 16);
    }
}

fn align_to(n: i64, align: i64) -> i64 {
    (n + align - 1) / align * align
}

struct CodeGenerator<'w, W: Write> {
    out: &'w mut W,
    /// Number of values currently pushed on the machine stack beyond the
    /// frame prologue; must be zero at every function's end (spec.md
    /// §4.3, asserted as an internal invariant rather than a
    /// `Diagnostic` — spec.md §7 "should abort").
    depth: i64,
    /// Monotonic across the whole program, not reset per function
    /// (spec.md §8 property 6: "Label counters are unique across the
    /// whole output").
    label_count: u32,
    current_fn: String,
}

impl<'w, W: Write> CodeGenerator<'w, W> {
    fn count(&mut self) -> u32 {
        let c = self.label_count;
        self.label_count += 1;
        c
    }

    fn push(&mut self) -> Result<()> {
        writeln!(self.out, "    push %rax")?;
        self.depth += 1;
        Ok(())
    }

    fn pop(&mut self, reg: &str) -> Result<()> {
        writeln!(self.out, "    pop {reg}")?;
        self.depth -= 1;
        Ok(())
    }

    /// Leaves the address of an lvalue in `%rax` (spec.md §4.3 `gen_addr`).
    fn gen_addr(
        &mut self,
        node: &Node<'_>,
        globals: &IndexVec<GlobalIdx, Obj<'_>>,
        locals: &IndexVec<LocalIdx, Obj<'_>>,
    ) -> Result<()> {
        match &node.kind {
            NodeKind::Var(ObjRef::Local(idx)) => {
                writeln!(self.out, "    lea {}(%rbp), %rax", locals[*idx].offset)?;
                Ok(())
            }
            NodeKind::Var(ObjRef::Global(idx)) => {
                writeln!(self.out, "    lea {}(%rip), %rax", globals[*idx].name)?;
                Ok(())
            }
            NodeKind::Deref(inner) => self.gen_expr(inner, globals, locals),
            _ => Err(GenError::Diagnostic(Diagnostic::new("not an lvalue", node.span))),
        }
    }

    /// Array-to-pointer decay aside, loads through the address left in
    /// `%rax` by `gen_addr` (spec.md §4.3 `load`).
    fn load(&mut self, ty: &Type<'_>) -> Result<()> {
        if ty.is_array() {
            return Ok(());
        }
        if ty.size == 1 {
            writeln!(self.out, "    movsbq (%rax), %rax")?;
        } else {
            writeln!(self.out, "    mov (%rax), %rax")?;
        }
        Ok(())
    }

    /// Pops the destination address pushed by the caller and stores
    /// `%rax` through it (spec.md §4.3 `store`).
    fn store(&mut self, ty: &Type<'_>) -> Result<()> {
        self.pop("%rdi")?;
        if ty.size == 1 {
            writeln!(self.out, "    mov %al, (%rdi)")?;
        } else {
            writeln!(self.out, "    mov %rax, (%rdi)")?;
        }
        Ok(())
    }

    fn gen_expr(
        &mut self,
        node: &Node<'_>,
        globals: &IndexVec<GlobalIdx, Obj<'_>>,
        locals: &IndexVec<LocalIdx, Obj<'_>>,
    ) -> Result<()> {
        match &node.kind {
            NodeKind::Num(value) => {
                writeln!(self.out, "    mov ${value}, %rax")?;
                Ok(())
            }
            NodeKind::Neg(x) => {
                self.gen_expr(x, globals, locals)?;
                writeln!(self.out, "    neg %rax")?;
                Ok(())
            }
            NodeKind::Var(_) | NodeKind::Deref(_) => {
                self.gen_addr(node, globals, locals)?;
                self.load(node.ty.as_ref().expect("expression is typed before codegen"))
            }
            NodeKind::Addr(x) => self.gen_addr(x, globals, locals),
            NodeKind::Assign(lhs, rhs) => {
                self.gen_addr(lhs, globals, locals)?;
                self.push()?;
                self.gen_expr(rhs, globals, locals)?;
                self.store(node.ty.as_ref().expect("expression is typed before codegen"))
            }
            NodeKind::StmtExpr(stmts) => {
                for stmt in stmts {
                    self.gen_stmt(stmt, globals, locals)?;
                }
                Ok(())
            }
            NodeKind::FunCall { name, args } => {
                for arg in args {
                    self.gen_expr(arg, globals, locals)?;
                    self.push()?;
                }
                for i in (0..args.len()).rev() {
                    self.pop(ARGREG64[i])?;
                }
                writeln!(self.out, "    mov $0, %rax")?;
                writeln!(self.out, "    call {name}")?;
                Ok(())
            }
            NodeKind::Add(l, r)
            | NodeKind::Sub(l, r)
            | NodeKind::Mul(l, r)
            | NodeKind::Div(l, r)
            | NodeKind::Eq(l, r)
            | NodeKind::Ne(l, r)
            | NodeKind::Lt(l, r)
            | NodeKind::Le(l, r) => {
                self.gen_expr(r, globals, locals)?;
                self.push()?;
                self.gen_expr(l, globals, locals)?;
                self.pop("%rdi")?;
                match &node.kind {
                    NodeKind::Add(..) => writeln!(self.out, "    add %rdi, %rax")?,
                    NodeKind::Sub(..) => writeln!(self.out, "    sub %rdi, %rax")?,
                    NodeKind::Mul(..) => writeln!(self.out, "    imul %rdi, %rax")?,
                    NodeKind::Div(..) => {
                        writeln!(self.out, "    cqo")?;
                        writeln!(self.out, "    idiv %rdi")?;
                    }
                    NodeKind::Eq(..) => {
                        writeln!(self.out, "    cmp %rdi, %rax")?;
                        writeln!(self.out, "    sete %al")?;
                        writeln!(self.out, "    movzb %al, %rax")?;
                    }
                    NodeKind::Ne(..) => {
                        writeln!(self.out, "    cmp %rdi, %rax")?;
                        writeln!(self.out, "    setne %al")?;
                        writeln!(self.out, "    movzb %al, %rax")?;
                    }
                    NodeKind::Lt(..) => {
                        writeln!(self.out, "    cmp %rdi, %rax")?;
                        writeln!(self.out, "    setl %al")?;
                        writeln!(self.out, "    movzb %al, %rax")?;
                    }
                    NodeKind::Le(..) => {
                        writeln!(self.out, "    cmp %rdi, %rax")?;
                        writeln!(self.out, "    setle %al")?;
                        writeln!(self.out, "    movzb %al, %rax")?;
                    }
                    _ => unreachable!("matched above"),
                };
                Ok(())
            }
            NodeKind::ExprStmt(_)
            | NodeKind::Block(_)
            | NodeKind::Return(_)
            | NodeKind::If { .. }
            | NodeKind::For { .. } => unreachable!("statement kind reached gen_expr"),
        }
    }

    fn gen_stmt(
        &mut self,
        node: &Node<'_>,
        globals: &IndexVec<GlobalIdx, Obj<'_>>,
        locals: &IndexVec<LocalIdx, Obj<'_>>,
    ) -> Result<()> {
        match &node.kind {
            NodeKind::Return(value) => {
                self.gen_expr(value, globals, locals)?;
                writeln!(self.out, "    jmp .L.return.{}", self.current_fn)?;
                Ok(())
            }
            NodeKind::ExprStmt(value) => self.gen_expr(value, globals, locals),
            NodeKind::Block(stmts) => {
                for stmt in stmts {
                    self.gen_stmt(stmt, globals, locals)?;
                }
                Ok(())
            }
            NodeKind::If { cond, then_branch, else_branch } => {
                let c = self.count();
                self.gen_expr(cond, globals, locals)?;
                writeln!(self.out, "    cmp $0, %rax")?;
                writeln!(self.out, "    je .L.else.{c}")?;
                self.gen_stmt(then_branch, globals, locals)?;
                writeln!(self.out, "    jmp .L.end.{c}")?;
                writeln!(self.out, ".L.else.{c}:")?;
                if let Some(els) = else_branch {
                    self.gen_stmt(els, globals, locals)?;
                }
                writeln!(self.out, ".L.end.{c}:")?;
                Ok(())
            }
            NodeKind::For { init, cond, inc, body } => {
                let c = self.count();
                if let Some(init) = init {
                    self.gen_stmt(init, globals, locals)?;
                }
                writeln!(self.out, ".L.begin.{c}:")?;
                if let Some(cond) = cond {
                    self.gen_expr(cond, globals, locals)?;
                    writeln!(self.out, "    cmp $0, %rax")?;
                    writeln!(self.out, "    je .L.end.{c}")?;
                }
                self.gen_stmt(body, globals, locals)?;
                if let Some(inc) = inc {
                    self.gen_expr(inc, globals, locals)?;
                }
                writeln!(self.out, "    jmp .L.begin.{c}")?;
                writeln!(self.out, ".L.end.{c}:")?;
                Ok(())
            }
            _ => {
                self.gen_expr(node, globals, locals)?;
                Ok(())
            }
        }
    }

    fn emit_data(&mut self, program: &Program<'_>) -> Result<()> {
        for obj in program.globals.as_slice() {
            writeln!(self.out, "    .data")?;
            writeln!(self.out, "    .globl {}", obj.name)?;
            writeln!(self.out, "{}:", obj.name)?;
            match &obj.init_data {
                Some(bytes) => {
                    for byte in bytes {
                        writeln!(self.out, "    .byte {byte}")?;
                    }
                }
                None => writeln!(self.out, "    .zero {}", obj.ty.size)?,
            }
        }
        Ok(())
    }

    fn emit_text(&mut self, program: &Program<'_>) -> Result<()> {
        for function in &program.functions {
            writeln!(self.out, "    .globl {}", function.name)?;
            writeln!(self.out, "    .text")?;
            writeln!(self.out, "{}:", function.name)?;
            self.current_fn = function.name.to_string();

            writeln!(self.out, "    push %rbp")?;
            writeln!(self.out, "    mov %rsp, %rbp")?;
            writeln!(self.out, "    sub ${}, %rsp", function.stack_size)?;

            for (i, local_idx) in function.params.iter().enumerate() {
                let param = &function.locals[*local_idx];
                let reg = if param.ty.size == 1 { ARGREG8[i] } else { ARGREG64[i] };
                writeln!(self.out, "    mov {reg}, {}(%rbp)", param.offset)?;
            }

            self.gen_stmt(&function.body, &program.globals, &function.locals)?;
            assert_eq!(self.depth, 0, "push/pop imbalance generating `{}`", function.name);

            writeln!(self.out, ".L.return.{}:", function.name)?;
            writeln!(self.out, "    mov %rbp, %rsp")?;
            writeln!(self.out, "    pop %rbp")?;
            writeln!(self.out, "    ret")?;
        }
        Ok(())
    }
}
