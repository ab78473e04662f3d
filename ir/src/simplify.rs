//! A bottom-up algebraic simplifier.
//!
//! Covers the algebra the optimizer relies on: constant folding with
//! the IR's wrapping/truncating semantics, identity elimination,
//! difference-of-sums cancellation, broadcast folding, and inlining of
//! trivial let values. Not a general-purpose simplifier.

use ripple_dtype::Type;

use crate::{
    BinOp, Expr, ExprKind, Mutator,
    cast::{as_const_int, is_one, is_zero},
    matching::equal,
    mutate::recurse_expr,
    vars::substitute,
};

pub fn simplify(e: &Expr) -> Expr {
    Simplifier.mutate_expr(e)
}

struct Simplifier;

impl Mutator for Simplifier {
    fn mutate_expr(&mut self, e: &Expr) -> Expr {
        let e = recurse_expr(self, e);
        simplify_node(&e)
    }
}

/// One local rewrite step over a node whose children are already
/// simplified.
fn simplify_node(e: &Expr) -> Expr {
    match e.kind() {
        ExprKind::Cast { value } => simplify_cast(e, value),
        ExprKind::Binary { op, a, b } => simplify_binary(e, *op, a, b),
        ExprKind::Not { value } => match scalar_const(value) {
            Some(v) => Expr::make_const(e.ty(), (v == 0) as i64),
            None => e.clone(),
        },
        ExprKind::Select { cond, true_value, false_value } => match as_const_int(cond) {
            Some(0) => false_value.clone(),
            Some(_) => true_value.clone(),
            None => e.clone(),
        },
        ExprKind::Let { name, value, body } => {
            if is_trivial(value) {
                simplify(&substitute(name, value, body))
            } else {
                e.clone()
            }
        }
        _ => e.clone(),
    }
}

fn simplify_cast(e: &Expr, value: &Expr) -> Expr {
    let ty = e.ty();
    match value.kind() {
        ExprKind::IntImm(v) => Expr::make_const(ty, ty.wrap(*v)),
        ExprKind::UIntImm(v) => Expr::make_const(ty, ty.wrap(*v as i64)),
        ExprKind::Broadcast { value: inner, lanes } => {
            let scalar = simplify_node(&Expr::cast(ty.element_of(), inner.clone()));
            Expr::broadcast(scalar, *lanes)
        }
        _ => e.clone(),
    }
}

fn simplify_binary(e: &Expr, op: BinOp, a: &Expr, b: &Expr) -> Expr {
    // Constant folding, scalar or broadcast.
    if let (Some(va), Some(vb)) = (scalar_const(a), scalar_const(b)) {
        if let Some(v) = const_fold(op, a.ty(), va, vb) {
            return Expr::make_const(e.ty(), v);
        }
    }

    match op {
        BinOp::Add => {
            if is_zero(a) {
                return b.clone();
            }
            if is_zero(b) {
                return a.clone();
            }
        }
        BinOp::Sub => {
            if is_zero(b) {
                return a.clone();
            }
            if equal(a, b) {
                return Expr::zero(e.ty());
            }
            // (x + c1) - (x + c2) and friends cancel.
            let (base_a, off_a) = split_add(a);
            let (base_b, off_b) = split_add(b);
            if let (Some(x), Some(y)) = (base_a, base_b) {
                if equal(x, y) {
                    let diff = e.ty().wrap(off_a.wrapping_sub(off_b));
                    return Expr::make_const(e.ty(), diff);
                }
            }
        }
        BinOp::Mul => {
            if is_one(a) {
                return b.clone();
            }
            if is_one(b) {
                return a.clone();
            }
            if is_zero(a) || is_zero(b) {
                return Expr::zero(e.ty());
            }
        }
        BinOp::Div => {
            if is_one(b) {
                return a.clone();
            }
        }
        BinOp::Mod => {
            if is_one(b) {
                return Expr::zero(e.ty());
            }
        }
        BinOp::Min | BinOp::Max => {
            if equal(a, b) {
                return a.clone();
            }
        }
        BinOp::And => {
            if is_one(a) {
                return b.clone();
            }
            if is_one(b) {
                return a.clone();
            }
            if is_zero(a) || is_zero(b) {
                return Expr::zero(e.ty());
            }
        }
        BinOp::Or => {
            if is_zero(a) {
                return b.clone();
            }
            if is_zero(b) {
                return a.clone();
            }
            if is_one(a) || is_one(b) {
                return Expr::make_const(e.ty(), 1);
            }
        }
        _ => {}
    }
    e.clone()
}

/// The constant value of a scalar immediate or a broadcast of one.
fn scalar_const(e: &Expr) -> Option<i64> {
    match e.kind() {
        ExprKind::IntImm(v) => Some(*v),
        ExprKind::UIntImm(v) => Some(*v as i64),
        ExprKind::Broadcast { value, .. } => scalar_const(value),
        _ => None,
    }
}

/// Decompose `e` as `base + offset` with a constant offset. A constant
/// decomposes to no base at all.
fn split_add(e: &Expr) -> (Option<&Expr>, i64) {
    if let Some(c) = scalar_const(e) {
        return (None, c);
    }
    match e.kind() {
        ExprKind::Binary { op: BinOp::Add, a, b } => {
            if let Some(c) = scalar_const(b) {
                return (Some(a), c);
            }
            if let Some(c) = scalar_const(a) {
                return (Some(b), c);
            }
        }
        ExprKind::Binary { op: BinOp::Sub, a, b } => {
            if let Some(c) = scalar_const(b) {
                return (Some(a), -c);
            }
        }
        _ => {}
    }
    (Some(e), 0)
}

fn is_trivial(e: &Expr) -> bool {
    match e.kind() {
        ExprKind::IntImm(_) | ExprKind::UIntImm(_) | ExprKind::Variable { .. } => true,
        ExprKind::Broadcast { value, .. } => is_trivial(value),
        _ => false,
    }
}

fn const_fold(op: BinOp, operand_ty: Type, a: i64, b: i64) -> Option<i64> {
    let wrap = |v: i64| operand_ty.wrap(v);
    let unsigned = operand_ty.is_uint();
    let cmp = |r: bool| Some(r as i64);
    match op {
        BinOp::Add => Some(wrap(a.wrapping_add(b))),
        BinOp::Sub => Some(wrap(a.wrapping_sub(b))),
        BinOp::Mul => Some(wrap(a.wrapping_mul(b))),
        BinOp::Div => {
            if b == 0 || (a == i64::MIN && b == -1) {
                None
            } else {
                Some(wrap(crate::eval::floor_div(a, b)))
            }
        }
        BinOp::Mod => {
            if b == 0 || (a == i64::MIN && b == -1) {
                None
            } else {
                Some(wrap(crate::eval::floor_mod(a, b)))
            }
        }
        BinOp::Min => Some(if unsigned { ((a as u64).min(b as u64)) as i64 } else { a.min(b) }),
        BinOp::Max => Some(if unsigned { ((a as u64).max(b as u64)) as i64 } else { a.max(b) }),
        BinOp::Eq => cmp(a == b),
        BinOp::Ne => cmp(a != b),
        BinOp::Lt => cmp(if unsigned { (a as u64) < (b as u64) } else { a < b }),
        BinOp::Le => cmp(if unsigned { (a as u64) <= (b as u64) } else { a <= b }),
        BinOp::Gt => cmp(if unsigned { (a as u64) > (b as u64) } else { a > b }),
        BinOp::Ge => cmp(if unsigned { (a as u64) >= (b as u64) } else { a >= b }),
        BinOp::And => Some(((a != 0) && (b != 0)) as i64),
        BinOp::Or => Some(((a != 0) || (b != 0)) as i64),
    }
}
