//! The mutator capability set.
//!
//! A rewriter implements [`Mutator`], overriding `mutate_expr` and/or
//! `mutate_stmt` for the nodes it cares about and delegating the rest
//! to [`recurse_expr`]/[`recurse_stmt`]. The recursion helpers rebuild
//! a node only when a child actually changed, so unchanged subtrees
//! keep their identity and `same_as` stays meaningful.

use crate::{Expr, ExprKind, Stmt, StmtKind};

pub trait Mutator {
    fn mutate_expr(&mut self, e: &Expr) -> Expr {
        recurse_expr(self, e)
    }

    fn mutate_stmt(&mut self, s: &Stmt) -> Stmt {
        recurse_stmt(self, s)
    }
}

/// Default expression recursion: mutate children, rebuild if changed.
pub fn recurse_expr<M: Mutator + ?Sized>(m: &mut M, e: &Expr) -> Expr {
    match e.kind() {
        ExprKind::IntImm(_) | ExprKind::UIntImm(_) | ExprKind::Variable { .. } => e.clone(),
        ExprKind::Cast { value } => {
            let new = m.mutate_expr(value);
            if new.same_as(value) { e.clone() } else { Expr::cast(e.ty(), new) }
        }
        ExprKind::Broadcast { value, lanes } => {
            let new = m.mutate_expr(value);
            if new.same_as(value) { e.clone() } else { Expr::broadcast(new, *lanes) }
        }
        ExprKind::Ramp { base, stride, lanes } => {
            let new_base = m.mutate_expr(base);
            let new_stride = m.mutate_expr(stride);
            if new_base.same_as(base) && new_stride.same_as(stride) {
                e.clone()
            } else {
                Expr::ramp(new_base, new_stride, *lanes)
            }
        }
        ExprKind::Binary { op, a, b } => {
            let new_a = m.mutate_expr(a);
            let new_b = m.mutate_expr(b);
            if new_a.same_as(a) && new_b.same_as(b) { e.clone() } else { Expr::binary(*op, new_a, new_b) }
        }
        ExprKind::Not { value } => {
            let new = m.mutate_expr(value);
            if new.same_as(value) { e.clone() } else { Expr::not(new) }
        }
        ExprKind::Select { cond, true_value, false_value } => {
            let new_cond = m.mutate_expr(cond);
            let new_t = m.mutate_expr(true_value);
            let new_f = m.mutate_expr(false_value);
            if new_cond.same_as(cond) && new_t.same_as(true_value) && new_f.same_as(false_value) {
                e.clone()
            } else {
                Expr::select(new_cond, new_t, new_f)
            }
        }
        ExprKind::Load { name, index } => {
            let new = m.mutate_expr(index);
            if new.same_as(index) { e.clone() } else { Expr::load(e.ty(), name.clone(), new) }
        }
        ExprKind::Call { name, args, call_type } => {
            let mut changed = false;
            let new_args: Vec<Expr> = args
                .iter()
                .map(|arg| {
                    let new = m.mutate_expr(arg);
                    changed = changed || !new.same_as(arg);
                    new
                })
                .collect();
            if changed { Expr::call(e.ty(), name.clone(), new_args, *call_type) } else { e.clone() }
        }
        ExprKind::Let { name, value, body } => {
            let new_value = m.mutate_expr(value);
            let new_body = m.mutate_expr(body);
            if new_value.same_as(value) && new_body.same_as(body) {
                e.clone()
            } else {
                Expr::let_(name.clone(), new_value, new_body)
            }
        }
    }
}

/// Default statement recursion: mutate children, rebuild if changed.
pub fn recurse_stmt<M: Mutator + ?Sized>(m: &mut M, s: &Stmt) -> Stmt {
    match s.kind() {
        StmtKind::LetStmt { name, value, body } => {
            let new_value = m.mutate_expr(value);
            let new_body = m.mutate_stmt(body);
            if new_value.same_as(value) && new_body.same_as(body) {
                s.clone()
            } else {
                Stmt::let_stmt(name.clone(), new_value, new_body)
            }
        }
        StmtKind::For { name, min, extent, body } => {
            let new_min = m.mutate_expr(min);
            let new_extent = m.mutate_expr(extent);
            let new_body = m.mutate_stmt(body);
            if new_min.same_as(min) && new_extent.same_as(extent) && new_body.same_as(body) {
                s.clone()
            } else {
                Stmt::for_loop(name.clone(), new_min, new_extent, new_body)
            }
        }
        StmtKind::Store { name, value, index } => {
            let new_value = m.mutate_expr(value);
            let new_index = m.mutate_expr(index);
            if new_value.same_as(value) && new_index.same_as(index) {
                s.clone()
            } else {
                Stmt::store(name.clone(), new_value, new_index)
            }
        }
        StmtKind::Block { stmts } => {
            let mut changed = false;
            let new_stmts: Vec<Stmt> = stmts
                .iter()
                .map(|st| {
                    let new = m.mutate_stmt(st);
                    changed = changed || !new.same_as(st);
                    new
                })
                .collect();
            if changed { Stmt::block(new_stmts) } else { s.clone() }
        }
        StmtKind::Evaluate { value } => {
            let new = m.mutate_expr(value);
            if new.same_as(value) { s.clone() } else { Stmt::evaluate(new) }
        }
    }
}
