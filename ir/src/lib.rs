//! Typed expression IR for the ripple compiler.
//!
//! Expressions are immutable trees of shared [`Arc`] nodes. Every node
//! carries a [`Type`]; rewriters produce new trees and use
//! [`Expr::same_as`] pointer identity to detect "no change". Smart
//! constructors validate operand types; the `std::ops` sugar in
//! [`ops`] additionally coerces scalar operands against vector ones the
//! way the lowering front end does.

use std::sync::Arc;

use ripple_dtype::{Type, TypeCode};
use smallvec::SmallVec;
use snafu::ensure;

pub mod bounds;
pub mod cast;
pub mod cse;
pub mod display;
pub mod error;
pub mod eval;
pub mod matching;
pub mod mutate;
pub mod ops;
pub mod scope;
pub mod simplify;
pub mod vars;

#[cfg(test)]
pub mod test;

pub use bounds::{Interval, bounds_of_expr_in_scope};
pub use cast::{
    as_const_int, as_const_uint, is_const_power_of_two_integer, is_negative_negatable_const, is_one,
    is_positive_const, is_zero, lossless_cast,
};
pub use cse::common_subexpression_elimination;
pub use error::{Error, Result};
pub use eval::{EvalEnv, eval_expr};
pub use matching::{equal, expr_match};
pub use mutate::{Mutator, recurse_expr, recurse_stmt};
pub use ops::{bitwise_not, count_leading_zeros, max, min, select, shift_left, shift_right};
pub use scope::Scope;
pub use simplify::simplify;
pub use vars::{expr_uses_var, stmt_uses_var, substitute};

/// How a call is lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallType {
    /// A named intrinsic the code generator maps to a machine
    /// instruction. Referentially transparent.
    PureExtern,
    /// A pure operation of the IR itself (shifts, bitwise ops, ...).
    PureIntrinsic,
}

/// Binary operators.
///
/// Arithmetic preserves the operand type; comparisons yield the
/// single-bit unsigned type; `And`/`Or` are boolean. Division rounds
/// toward negative infinity and the remainder takes the divisor's
/// sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Min,
    Max,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOp {
    pub fn is_comparison(self) -> bool {
        matches!(self, Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

/// Expression node payload.
#[derive(Debug, PartialEq, Eq, Hash)]
pub enum ExprKind {
    IntImm(i64),
    UIntImm(u64),
    Variable {
        name: String,
    },
    Cast {
        value: Expr,
    },
    /// A scalar broadcast to `lanes` lanes. `lanes == 0` only occurs
    /// inside pattern expressions, where it matches any lane count.
    Broadcast {
        value: Expr,
        lanes: u32,
    },
    Ramp {
        base: Expr,
        stride: Expr,
        lanes: u32,
    },
    Binary {
        op: BinOp,
        a: Expr,
        b: Expr,
    },
    Not {
        value: Expr,
    },
    Select {
        cond: Expr,
        true_value: Expr,
        false_value: Expr,
    },
    Load {
        name: String,
        index: Expr,
    },
    Call {
        name: String,
        args: SmallVec<[Expr; 4]>,
        call_type: CallType,
    },
    Let {
        name: String,
        value: Expr,
        body: Expr,
    },
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct ExprNode {
    kind: ExprKind,
    ty: Type,
}

/// A typed, immutable expression.
///
/// `Clone` is cheap (one refcount); `==` is deep structural equality,
/// [`Expr::same_as`] is pointer identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expr(Arc<ExprNode>);

impl Expr {
    fn new(kind: ExprKind, ty: Type) -> Self {
        Self(Arc::new(ExprNode { kind, ty }))
    }

    pub fn ty(&self) -> Type {
        self.0.ty
    }

    pub fn kind(&self) -> &ExprKind {
        &self.0.kind
    }

    /// Pointer identity: true iff both handles refer to the same node.
    pub fn same_as(&self, other: &Expr) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    // Constructors.

    pub fn int_imm(ty: Type, value: i64) -> Result<Self> {
        ensure!(ty.is_scalar(), error::ScalarRequiredSnafu { ty });
        ensure!(ty.can_represent_int(value), error::ConstOutOfRangeSnafu { value, ty });
        Ok(Self::new(ExprKind::IntImm(value), ty))
    }

    pub fn uint_imm(ty: Type, value: u64) -> Result<Self> {
        ensure!(ty.is_scalar(), error::ScalarRequiredSnafu { ty });
        ensure!(ty.can_represent_uint(value), error::ConstOutOfRangeSnafu { value: value as i64, ty });
        Ok(Self::new(ExprKind::UIntImm(value), ty))
    }

    /// A constant of any integer type: scalars become immediates,
    /// vector types a broadcast immediate. Lane count 0 builds the
    /// pattern-wildcard broadcast.
    pub fn make_const(ty: Type, value: i64) -> Self {
        let elem = ty.element_of();
        let imm = match elem.code {
            TypeCode::UInt => Self::uint_imm(elem, value as u64),
            _ => Self::int_imm(elem, value),
        };
        let imm = match imm {
            Ok(e) => e,
            Err(err) => panic!("{err}"),
        };
        if ty.is_scalar() { imm } else { Self::broadcast(imm, ty.lanes) }
    }

    pub fn zero(ty: Type) -> Self {
        Self::make_const(ty, 0)
    }

    pub fn var(ty: Type, name: impl Into<String>) -> Self {
        Self::new(ExprKind::Variable { name: name.into() }, ty)
    }

    /// A conversion to `ty`. Returns the value unchanged when the type
    /// already matches. The lane count may not change, except that
    /// pattern expressions with wildcard lanes keep their 0 count.
    pub fn cast(ty: Type, value: Expr) -> Self {
        if ty == value.ty() {
            return value;
        }
        assert_eq!(ty.lanes, value.ty().lanes, "cast cannot change lanes: {} to {}", value.ty(), ty);
        Self::new(ExprKind::Cast { value }, ty)
    }

    pub fn broadcast(value: Expr, lanes: u32) -> Self {
        assert!(value.ty().is_scalar(), "broadcast requires a scalar, got {}", value.ty());
        let ty = value.ty().with_lanes(lanes);
        Self::new(ExprKind::Broadcast { value, lanes }, ty)
    }

    pub fn ramp(base: Expr, stride: Expr, lanes: u32) -> Self {
        assert!(base.ty().is_scalar(), "ramp base must be scalar, got {}", base.ty());
        assert_eq!(base.ty(), stride.ty(), "ramp stride type {} != base type {}", stride.ty(), base.ty());
        let ty = base.ty().with_lanes(lanes);
        Self::new(ExprKind::Ramp { base, stride, lanes }, ty)
    }

    /// A binary node over operands of identical type. The `std::ops`
    /// sugar coerces mixed scalar/vector operands before landing here.
    pub fn try_binary(op: BinOp, a: Expr, b: Expr) -> Result<Self> {
        ensure!(a.ty() == b.ty(), error::BinaryTypeMismatchSnafu { op, lhs: a.ty(), rhs: b.ty() });
        let ty = if op.is_comparison() { Type::bool_vec(a.ty().lanes) } else { a.ty() };
        Ok(Self::new(ExprKind::Binary { op, a, b }, ty))
    }

    pub fn binary(op: BinOp, a: Expr, b: Expr) -> Self {
        match Self::try_binary(op, a, b) {
            Ok(e) => e,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn not(value: Expr) -> Self {
        let ty = value.ty();
        assert!(ty.is_bool(), "logical not requires a boolean, got {ty}");
        Self::new(ExprKind::Not { value }, ty)
    }

    pub fn try_select(cond: Expr, true_value: Expr, false_value: Expr) -> Result<Self> {
        ensure!(cond.ty().is_bool(), error::SelectCondNotBoolSnafu { ty: cond.ty() });
        ensure!(
            true_value.ty() == false_value.ty(),
            error::SelectArmMismatchSnafu { true_ty: true_value.ty(), false_ty: false_value.ty() }
        );
        let ty = true_value.ty();
        Ok(Self::new(ExprKind::Select { cond, true_value, false_value }, ty))
    }

    pub fn select(cond: Expr, true_value: Expr, false_value: Expr) -> Self {
        match Self::try_select(cond, true_value, false_value) {
            Ok(e) => e,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn load(ty: Type, name: impl Into<String>, index: Expr) -> Self {
        assert_eq!(ty.lanes, index.ty().lanes, "load of {} with {}-lane index", ty, index.ty().lanes);
        Self::new(ExprKind::Load { name: name.into(), index }, ty)
    }

    pub fn call(ty: Type, name: impl Into<String>, args: impl IntoIterator<Item = Expr>, call_type: CallType) -> Self {
        Self::new(ExprKind::Call { name: name.into(), args: args.into_iter().collect(), call_type }, ty)
    }

    pub fn let_(name: impl Into<String>, value: Expr, body: Expr) -> Self {
        let ty = body.ty();
        Self::new(ExprKind::Let { name: name.into(), value, body }, ty)
    }

    // Accessors used throughout the rewriters.

    pub fn as_int_imm(&self) -> Option<i64> {
        match self.kind() {
            ExprKind::IntImm(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_uint_imm(&self) -> Option<u64> {
        match self.kind() {
            ExprKind::UIntImm(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&str> {
        match self.kind() {
            ExprKind::Variable { name } => Some(name),
            _ => None,
        }
    }

    pub fn as_broadcast(&self) -> Option<&Expr> {
        match self.kind() {
            ExprKind::Broadcast { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_cast(&self) -> Option<&Expr> {
        match self.kind() {
            ExprKind::Cast { value } => Some(value),
            _ => None,
        }
    }

    pub fn as_binary(&self, op: BinOp) -> Option<(&Expr, &Expr)> {
        match self.kind() {
            ExprKind::Binary { op: o, a, b } if *o == op => Some((a, b)),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<(&str, &[Expr])> {
        match self.kind() {
            ExprKind::Call { name, args, .. } => Some((name, args)),
            _ => None,
        }
    }
}

/// Statement node payload. The optimizer rewrites the expressions
/// inside statements; the statement structure itself passes through.
#[derive(Debug, PartialEq, Eq, Hash)]
pub enum StmtKind {
    LetStmt { name: String, value: Expr, body: Stmt },
    For { name: String, min: Expr, extent: Expr, body: Stmt },
    Store { name: String, value: Expr, index: Expr },
    Block { stmts: Vec<Stmt> },
    Evaluate { value: Expr },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Stmt(Arc<StmtKind>);

impl Stmt {
    fn new(kind: StmtKind) -> Self {
        Self(Arc::new(kind))
    }

    pub fn kind(&self) -> &StmtKind {
        &self.0
    }

    pub fn same_as(&self, other: &Stmt) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn let_stmt(name: impl Into<String>, value: Expr, body: Stmt) -> Self {
        Self::new(StmtKind::LetStmt { name: name.into(), value, body })
    }

    pub fn for_loop(name: impl Into<String>, min: Expr, extent: Expr, body: Stmt) -> Self {
        Self::new(StmtKind::For { name: name.into(), min, extent, body })
    }

    pub fn store(name: impl Into<String>, value: Expr, index: Expr) -> Self {
        assert_eq!(value.ty().lanes, index.ty().lanes, "store of {} with {}-lane index", value.ty(), index.ty().lanes);
        Self::new(StmtKind::Store { name: name.into(), value, index })
    }

    pub fn block(stmts: Vec<Stmt>) -> Self {
        Self::new(StmtKind::Block { stmts })
    }

    pub fn evaluate(value: Expr) -> Self {
        Self::new(StmtKind::Evaluate { value })
    }
}
