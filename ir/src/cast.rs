//! Lossless casting and constant inspection helpers.

use ripple_dtype::Type;

use crate::{Expr, ExprKind};

/// Produce an expression of type `t` semantically equal to `e`, when
/// that is possible without losing values: exact type match, widening
/// to a representable type, recursion through widening casts and
/// broadcasts, or retyping an in-range immediate. Otherwise `None`.
pub fn lossless_cast(t: Type, e: &Expr) -> Option<Expr> {
    if t == e.ty() {
        return Some(e.clone());
    }
    if t.can_represent(e.ty()) {
        return Some(Expr::cast(t, e.clone()));
    }
    match e.kind() {
        ExprKind::Cast { value } => {
            if t.can_represent(value.ty()) {
                lossless_cast(t, value)
            } else {
                None
            }
        }
        ExprKind::Broadcast { value, lanes } => {
            let v = lossless_cast(t.element_of(), value)?;
            Some(Expr::broadcast(v, *lanes))
        }
        ExprKind::IntImm(v) => {
            if t.is_scalar() && t.can_represent_int(*v) {
                Some(Expr::make_const(t, *v))
            } else {
                None
            }
        }
        ExprKind::UIntImm(v) => {
            if t.is_scalar() && t.can_represent_uint(*v) {
                Some(Expr::make_const(t, *v as i64))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// The value of an integer constant, looking through broadcasts.
pub fn as_const_int(e: &Expr) -> Option<i64> {
    match e.kind() {
        ExprKind::IntImm(v) => Some(*v),
        ExprKind::UIntImm(v) => i64::try_from(*v).ok(),
        ExprKind::Broadcast { value, .. } => as_const_int(value),
        _ => None,
    }
}

pub fn as_const_uint(e: &Expr) -> Option<u64> {
    match e.kind() {
        ExprKind::UIntImm(v) => Some(*v),
        ExprKind::IntImm(v) => u64::try_from(*v).ok(),
        ExprKind::Broadcast { value, .. } => as_const_uint(value),
        _ => None,
    }
}

pub fn is_zero(e: &Expr) -> bool {
    as_const_int(e) == Some(0)
}

pub fn is_one(e: &Expr) -> bool {
    as_const_int(e) == Some(1)
}

pub fn is_positive_const(e: &Expr) -> bool {
    as_const_int(e).is_some_and(|v| v > 0)
}

/// A negative constant whose negation is representable in its own
/// type. The minimum of a signed type is not negatable.
pub fn is_negative_negatable_const(e: &Expr) -> bool {
    match e.kind() {
        ExprKind::IntImm(v) => *v < 0 && *v != e.ty().min_int(),
        ExprKind::Broadcast { value, .. } => is_negative_negatable_const(value),
        _ => false,
    }
}

/// If `e` is a positive power-of-two integer constant (looking through
/// broadcasts and casts), its base-2 logarithm.
pub fn is_const_power_of_two_integer(e: &Expr) -> Option<u32> {
    match e.kind() {
        ExprKind::Broadcast { value, .. } => is_const_power_of_two_integer(value),
        ExprKind::Cast { value } => is_const_power_of_two_integer(value),
        ExprKind::IntImm(v) => {
            if *v > 0 && (*v & (*v - 1)) == 0 {
                Some(v.trailing_zeros())
            } else {
                None
            }
        }
        ExprKind::UIntImm(v) => {
            if *v > 0 && (*v & (*v - 1)) == 0 {
                Some(v.trailing_zeros())
            } else {
                None
            }
        }
        _ => None,
    }
}
