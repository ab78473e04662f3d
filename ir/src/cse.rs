//! Common subexpression elimination for a single expression.
//!
//! Repeated non-trivial subtrees are bound to fresh `t<n>` variables,
//! innermost first, and the result is wrapped in the corresponding
//! `Let` chain.

use std::collections::HashMap;

use crate::{Expr, ExprKind, Mutator, mutate};

pub fn common_subexpression_elimination(e: &Expr) -> Expr {
    let mut result = e.clone();
    let mut bindings: Vec<(String, Expr)> = Vec::new();

    while let Some(candidate) = find_repeated(&result) {
        let name = format!("t{}", bindings.len());
        let var = Expr::var(candidate.ty(), name.clone());
        let mut replacer = Replacer { target: &candidate, replacement: &var };
        result = replacer.mutate_expr(&result);
        bindings.push((name, candidate));
    }

    for (name, value) in bindings.into_iter().rev() {
        result = Expr::let_(name, value, result);
    }
    result
}

/// The innermost repeated non-trivial subtree, if any.
fn find_repeated(e: &Expr) -> Option<Expr> {
    let mut counts: HashMap<Expr, usize> = HashMap::new();
    let mut order: Vec<Expr> = Vec::new();
    collect(e, &mut counts, &mut order);
    order.into_iter().find(|sub| counts[sub] > 1 && !is_cheap(sub))
}

fn collect(e: &Expr, counts: &mut HashMap<Expr, usize>, order: &mut Vec<Expr>) {
    match e.kind() {
        ExprKind::IntImm(_) | ExprKind::UIntImm(_) | ExprKind::Variable { .. } => {}
        ExprKind::Cast { value } | ExprKind::Broadcast { value, .. } | ExprKind::Not { value } => {
            collect(value, counts, order)
        }
        ExprKind::Ramp { base, stride, .. } => {
            collect(base, counts, order);
            collect(stride, counts, order);
        }
        ExprKind::Binary { a, b, .. } => {
            collect(a, counts, order);
            collect(b, counts, order);
        }
        ExprKind::Select { cond, true_value, false_value } => {
            collect(cond, counts, order);
            collect(true_value, counts, order);
            collect(false_value, counts, order);
        }
        ExprKind::Load { index, .. } => collect(index, counts, order),
        ExprKind::Call { args, .. } => {
            for arg in args {
                collect(arg, counts, order);
            }
        }
        ExprKind::Let { value, body, .. } => {
            collect(value, counts, order);
            collect(body, counts, order);
        }
    }
    let count = counts.entry(e.clone()).or_insert(0);
    *count += 1;
    if *count == 1 {
        order.push(e.clone());
    }
}

/// Subtrees not worth a binding.
fn is_cheap(e: &Expr) -> bool {
    match e.kind() {
        ExprKind::IntImm(_) | ExprKind::UIntImm(_) | ExprKind::Variable { .. } => true,
        ExprKind::Broadcast { value, .. } | ExprKind::Cast { value } => is_cheap(value),
        ExprKind::Ramp { base, stride, .. } => is_cheap(base) && is_cheap(stride),
        _ => false,
    }
}

struct Replacer<'a> {
    target: &'a Expr,
    replacement: &'a Expr,
}

impl Mutator for Replacer<'_> {
    fn mutate_expr(&mut self, e: &Expr) -> Expr {
        if e == self.target {
            self.replacement.clone()
        } else {
            mutate::recurse_expr(self, e)
        }
    }
}
