//! The type system (spec.md §3.2) and the declarator grammar that builds it:
//!
//! ```text
//! declspec    = "int" | "char"
//! declarator  = "*"* IDENT type-suffix
//! type-suffix = "(" func-params | "[" NUM "]" type-suffix | ε
//! func-params = (param ("," param)*)? ")"
//! param       = declspec declarator
//! ```

use mcc_util::Result;

use crate::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Int,
    Char,
    Ptr,
    Array,
    Func,
}

/// A type: kind, byte size, an optional base (element type for
/// pointer/array, return type for function), parameter types for
/// functions, and a back-reference to the declarator identifier that
/// produced it (used only for diagnostics, per spec.md §3.2).
///
/// Types are plain owned values (`Clone`, not an arena graph): spec.md
/// already describes them as "created fresh as needed" and copied on
/// attachment to an object, which is exactly what a value type gives
/// for free — there's no shared-singleton aliasing hazard to guard
/// against in Rust the way there would be for a C `Type *`.
#[derive(Debug, Clone, PartialEq)]
pub struct Type<'src> {
    pub kind: TypeKind,
    pub size: usize,
    pub base: Option<Box<Type<'src>>>,
    pub params: Vec<Type<'src>>,
    pub name: Option<&'src str>,
}

impl<'src> Type<'src> {
    pub fn int() -> Self {
        Type { kind: TypeKind::Int, size: 8, base: None, params: Vec::new(), name: None }
    }

    pub fn char() -> Self {
        Type { kind: TypeKind::Char, size: 1, base: None, params: Vec::new(), name: None }
    }

    pub fn pointer_to(base: Type<'src>) -> Self {
        Type { kind: TypeKind::Ptr, size: 8, base: Some(Box::new(base)), params: Vec::new(), name: None }
    }

    pub fn array_of(base: Type<'src>, len: usize) -> Self {
        let size = base.size * len;
        Type { kind: TypeKind::Array, size, base: Some(Box::new(base)), params: Vec::new(), name: None }
    }

    pub fn func_returning(ret: Type<'src>, params: Vec<Type<'src>>) -> Self {
        Type { kind: TypeKind::Func, size: 0, base: Some(Box::new(ret)), params, name: None }
    }

    /// `is_integer(T) ⇔ kind ∈ {int, char}` (spec.md §3.2).
    pub fn is_integer(&self) -> bool {
        matches!(self.kind, TypeKind::Int | TypeKind::Char)
    }

    /// `is_pointer_like(T)`: true for pointer and array, the two kinds
    /// whose `base` names an element type rather than a function's
    /// return type (spec.md §3.2).
    pub fn is_pointer_like(&self) -> bool {
        matches!(self.kind, TypeKind::Ptr | TypeKind::Array)
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, TypeKind::Array)
    }

    /// Number of elements in an array type (`size / base.size`); `0` for
    /// any other kind.
    pub fn array_len(&self) -> usize {
        match (&self.kind, &self.base) {
            (TypeKind::Array, Some(base)) if base.size > 0 => self.size / base.size,
            _ => 0,
        }
    }
}

impl<'src> Parser<'src> {
    /// `declspec = "int" | "char"`
    pub(crate) fn declspec(&mut self) -> Result<Type<'src>> {
        if self.eat("char") {
            Ok(Type::char())
        } else {
            self.expect("int")?;
            Ok(Type::int())
        }
    }

    /// `declarator = "*"* IDENT type-suffix`
    ///
    /// The returned type carries `name` set to the declared identifier,
    /// so a single `Type` is enough to recover both the variable's shape
    /// and its name — used directly when building `param`s and
    /// multi-declarator lists.
    pub(crate) fn declarator(&mut self, base: Type<'src>) -> Result<Type<'src>> {
        let mut ty = base;
        while self.eat("*") {
            ty = Type::pointer_to(ty);
        }
        let name_tok = self.expect_ident()?;
        self.last_decl_span = name_tok.span;
        let mut ty = self.type_suffix(ty)?;
        ty.name = Some(name_tok.lexeme);
        Ok(ty)
    }

    /// `type-suffix = "(" func-params | "[" NUM "]" type-suffix | ε`
    fn type_suffix(&mut self, base: Type<'src>) -> Result<Type<'src>> {
        if self.eat("(") {
            return self.func_params(base);
        }
        if self.eat("[") {
            let len = self.expect_num()? as usize;
            self.expect("]")?;
            let inner = self.type_suffix(base)?;
            return Ok(Type::array_of(inner, len));
        }
        Ok(base)
    }

    /// `func-params = (param ("," param)*)? ")"`, `param = declspec declarator`.
    ///
    /// Each parameter's `declarator()` call stamps its own `name`, so the
    /// returned function type's `params` double as the parameter name
    /// list — no separate name table is threaded through.
    fn func_params(&mut self, ret: Type<'src>) -> Result<Type<'src>> {
        let mut params = Vec::new();
        if !self.at(")") {
            loop {
                let base = self.declspec()?;
                params.push(self.declarator(base)?);
                if !self.eat(",") {
                    break;
                }
            }
        }
        self.expect(")")?;
        Ok(Type::func_returning(ret, params))
    }
}
