//! Operator sugar and intrinsic builders.
//!
//! The `std::ops` impls coerce mixed operands the way the lowering
//! front end does: scalar immediates are retyped to the other operand's
//! type, scalars are broadcast against vectors. Shifts and bitwise
//! operations are pure intrinsic calls, not `BinOp`s.

use crate::{BinOp, CallType, Expr, ExprKind};

// Pure intrinsic names. The interleave eliminator keys on these.
pub const SHIFT_LEFT: &str = "shift_left";
pub const SHIFT_RIGHT: &str = "shift_right";
pub const BITWISE_AND: &str = "bitwise_and";
pub const BITWISE_OR: &str = "bitwise_or";
pub const BITWISE_XOR: &str = "bitwise_xor";
pub const BITWISE_NOT: &str = "bitwise_not";
pub const COUNT_LEADING_ZEROS: &str = "count_leading_zeros";
pub const ABS: &str = "abs";
pub const ABSD: &str = "absd";
pub const DYNAMIC_SHUFFLE: &str = "dynamic_shuffle";

/// Bring both operands to a common type: immediates adopt the other
/// side's type, scalars broadcast against vectors.
pub fn coerce(a: Expr, b: Expr) -> (Expr, Expr) {
    if a.ty() == b.ty() {
        return (a, b);
    }
    if a.ty().is_scalar() && !b.ty().is_scalar() {
        let (b, a) = coerce_scalar(b, a);
        return (a, b);
    }
    if b.ty().is_scalar() && !a.ty().is_scalar() {
        return coerce_scalar(a, b);
    }
    if a.ty().is_scalar() && b.ty().is_scalar() {
        if let Some(v) = imm_value(&b) {
            return (a.clone(), Expr::make_const(a.ty(), v));
        }
        if let Some(v) = imm_value(&a) {
            return (Expr::make_const(b.ty(), v), b);
        }
    }
    panic!("cannot coerce {} against {}", a.ty(), b.ty());
}

fn coerce_scalar(vec: Expr, scalar: Expr) -> (Expr, Expr) {
    if let Some(v) = imm_value(&scalar) {
        let c = Expr::make_const(vec.ty(), v);
        return (vec, c);
    }
    assert_eq!(
        scalar.ty(),
        vec.ty().element_of(),
        "cannot coerce scalar {} against vector {}",
        scalar.ty(),
        vec.ty()
    );
    let lanes = vec.ty().lanes;
    (vec, Expr::broadcast(scalar, lanes))
}

fn imm_value(e: &Expr) -> Option<i64> {
    match e.kind() {
        ExprKind::IntImm(v) => Some(*v),
        ExprKind::UIntImm(v) => Some(*v as i64),
        _ => None,
    }
}

fn binary_coerced(op: BinOp, a: Expr, b: Expr) -> Expr {
    let (a, b) = coerce(a, b);
    Expr::binary(op, a, b)
}

pub fn min(a: Expr, b: Expr) -> Expr {
    binary_coerced(BinOp::Min, a, b)
}

pub fn max(a: Expr, b: Expr) -> Expr {
    binary_coerced(BinOp::Max, a, b)
}

pub fn select(cond: Expr, t: Expr, f: Expr) -> Expr {
    let (t, f) = coerce(t, f);
    Expr::select(cond, t, f)
}

fn unary_intrinsic(name: &str, x: Expr) -> Expr {
    let ty = x.ty();
    Expr::call(ty, name, [x], CallType::PureIntrinsic)
}

fn binary_intrinsic(name: &str, a: Expr, b: Expr) -> Expr {
    let (a, b) = coerce(a, b);
    let ty = a.ty();
    Expr::call(ty, name, [a, b], CallType::PureIntrinsic)
}

pub fn shift_left(a: Expr, b: Expr) -> Expr {
    binary_intrinsic(SHIFT_LEFT, a, b)
}

pub fn shift_right(a: Expr, b: Expr) -> Expr {
    binary_intrinsic(SHIFT_RIGHT, a, b)
}

pub fn bitwise_and(a: Expr, b: Expr) -> Expr {
    binary_intrinsic(BITWISE_AND, a, b)
}

pub fn bitwise_or(a: Expr, b: Expr) -> Expr {
    binary_intrinsic(BITWISE_OR, a, b)
}

pub fn bitwise_xor(a: Expr, b: Expr) -> Expr {
    binary_intrinsic(BITWISE_XOR, a, b)
}

pub fn bitwise_not(x: Expr) -> Expr {
    unary_intrinsic(BITWISE_NOT, x)
}

pub fn count_leading_zeros(x: Expr) -> Expr {
    unary_intrinsic(COUNT_LEADING_ZEROS, x)
}

pub fn abs(x: Expr) -> Expr {
    unary_intrinsic(ABS, x)
}

macro_rules! expr_binop {
    ($($trait_:ident :: $method:ident => $op:ident),+ $(,)?) => {
        $(
            impl std::ops::$trait_ for Expr {
                type Output = Expr;
                fn $method(self, rhs: Expr) -> Expr {
                    binary_coerced(BinOp::$op, self, rhs)
                }
            }

            impl std::ops::$trait_<&Expr> for &Expr {
                type Output = Expr;
                fn $method(self, rhs: &Expr) -> Expr {
                    binary_coerced(BinOp::$op, self.clone(), rhs.clone())
                }
            }

            impl std::ops::$trait_<i64> for Expr {
                type Output = Expr;
                fn $method(self, rhs: i64) -> Expr {
                    let c = Expr::make_const(self.ty(), rhs);
                    Expr::binary(BinOp::$op, self, c)
                }
            }
        )+
    };
}

expr_binop! {
    Add::add => Add,
    Sub::sub => Sub,
    Mul::mul => Mul,
    Div::div => Div,
    Rem::rem => Mod,
}

impl std::ops::Shl<Expr> for Expr {
    type Output = Expr;
    fn shl(self, rhs: Expr) -> Expr {
        shift_left(self, rhs)
    }
}

impl std::ops::Shr<Expr> for Expr {
    type Output = Expr;
    fn shr(self, rhs: Expr) -> Expr {
        shift_right(self, rhs)
    }
}

impl std::ops::Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::zero(self.ty()) - self
    }
}
