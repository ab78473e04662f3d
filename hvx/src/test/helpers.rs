//! Shared helpers for the pass tests.

use ripple_ir::{Expr, ExprKind, Stmt, StmtKind};

use crate::{optimize_hexagon_instructions, optimize_hexagon_shuffles};

/// Run an expression through the instruction pipeline.
pub fn optimize_expr(e: &Expr) -> Expr {
    unwrap_evaluate(&optimize_hexagon_instructions(&Stmt::evaluate(e.clone())))
}

/// Run an expression through the shuffle rewriter.
pub fn optimize_shuffles_expr(e: &Expr) -> Expr {
    unwrap_evaluate(&optimize_hexagon_shuffles(&Stmt::evaluate(e.clone())))
}

fn unwrap_evaluate(s: &Stmt) -> Expr {
    match s.kind() {
        StmtKind::Evaluate { value } => value.clone(),
        other => panic!("expected an evaluate statement, got {other:?}"),
    }
}

/// Visit every call in the expression.
pub fn for_each_call(e: &Expr, f: &mut impl FnMut(&str, &[Expr])) {
    each_child(e, &mut |child| for_each_call(child, f));
    if let ExprKind::Call { name, args, .. } = e.kind() {
        f(name, args);
    }
}

fn each_child(e: &Expr, f: &mut impl FnMut(&Expr)) {
    match e.kind() {
        ExprKind::IntImm(_) | ExprKind::UIntImm(_) | ExprKind::Variable { .. } => {}
        ExprKind::Cast { value } | ExprKind::Broadcast { value, .. } | ExprKind::Not { value } => f(value),
        ExprKind::Ramp { base, stride, .. } => {
            f(base);
            f(stride);
        }
        ExprKind::Binary { a, b, .. } => {
            f(a);
            f(b);
        }
        ExprKind::Select { cond, true_value, false_value } => {
            f(cond);
            f(true_value);
            f(false_value);
        }
        ExprKind::Load { index, .. } => f(index),
        ExprKind::Call { args, .. } => {
            for arg in args {
                f(arg);
            }
        }
        ExprKind::Let { value, body, .. } => {
            f(value);
            f(body);
        }
    }
}

pub fn contains_call(e: &Expr, name: &str) -> bool {
    let mut found = false;
    for_each_call(e, &mut |n, _| found |= n == name);
    found
}

/// The interleave cancellation law: no adjacent interleave/deinterleave
/// pair may survive the pass.
pub fn assert_no_redundant_interleaves(e: &Expr) {
    for_each_call(e, &mut |name, args| {
        let inverse = if name.starts_with(crate::intrinsics::INTERLEAVE_PREFIX) {
            crate::intrinsics::DEINTERLEAVE_PREFIX
        } else if name.starts_with(crate::intrinsics::DEINTERLEAVE_PREFIX) {
            crate::intrinsics::INTERLEAVE_PREFIX
        } else {
            return;
        };
        if let ExprKind::Call { name: inner, .. } = args[0].kind() {
            assert!(!inner.starts_with(inverse), "redundant pair {name}({inner}(..)) survived in {e}");
        }
    });
}
