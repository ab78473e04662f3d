//! Free-variable queries and substitution, both shadowing-aware.

use crate::{Expr, ExprKind, Mutator, Stmt, StmtKind, mutate};

/// Does `e` reference the free variable `name`?
pub fn expr_uses_var(e: &Expr, name: &str) -> bool {
    match e.kind() {
        ExprKind::IntImm(_) | ExprKind::UIntImm(_) => false,
        ExprKind::Variable { name: n } => n == name,
        ExprKind::Cast { value } | ExprKind::Broadcast { value, .. } | ExprKind::Not { value } => {
            expr_uses_var(value, name)
        }
        ExprKind::Ramp { base, stride, .. } => expr_uses_var(base, name) || expr_uses_var(stride, name),
        ExprKind::Binary { a, b, .. } => expr_uses_var(a, name) || expr_uses_var(b, name),
        ExprKind::Select { cond, true_value, false_value } => {
            expr_uses_var(cond, name) || expr_uses_var(true_value, name) || expr_uses_var(false_value, name)
        }
        ExprKind::Load { index, .. } => expr_uses_var(index, name),
        ExprKind::Call { args, .. } => args.iter().any(|arg| expr_uses_var(arg, name)),
        ExprKind::Let { name: bound, value, body } => {
            expr_uses_var(value, name) || (bound != name && expr_uses_var(body, name))
        }
    }
}

/// Does `s` reference the free variable `name`?
pub fn stmt_uses_var(s: &Stmt, name: &str) -> bool {
    match s.kind() {
        StmtKind::LetStmt { name: bound, value, body } => {
            expr_uses_var(value, name) || (bound != name && stmt_uses_var(body, name))
        }
        StmtKind::For { name: bound, min, extent, body } => {
            expr_uses_var(min, name) || expr_uses_var(extent, name) || (bound != name && stmt_uses_var(body, name))
        }
        StmtKind::Store { value, index, .. } => expr_uses_var(value, name) || expr_uses_var(index, name),
        StmtKind::Block { stmts } => stmts.iter().any(|st| stmt_uses_var(st, name)),
        StmtKind::Evaluate { value } => expr_uses_var(value, name),
    }
}

/// Replace free occurrences of `name` in `body` with `value`.
pub fn substitute(name: &str, value: &Expr, body: &Expr) -> Expr {
    let mut sub = Substitutor { name, value };
    sub.mutate_expr(body)
}

struct Substitutor<'a> {
    name: &'a str,
    value: &'a Expr,
}

impl Mutator for Substitutor<'_> {
    fn mutate_expr(&mut self, e: &Expr) -> Expr {
        match e.kind() {
            ExprKind::Variable { name } if name == self.name => self.value.clone(),
            ExprKind::Let { name, value, body } if name == self.name => {
                // The binding shadows the substitution in its body.
                let new_value = self.mutate_expr(value);
                if new_value.same_as(value) { e.clone() } else { Expr::let_(name.clone(), new_value, body.clone()) }
            }
            _ => mutate::recurse_expr(self, e),
        }
    }
}
