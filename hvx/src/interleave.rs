//! Cancellation of redundant interleave/deinterleave pairs.
//!
//! Interleaves are pushed toward the end of the program: a pointwise
//! operation whose operands all yield an interleave (with at least one
//! actual interleave call among them) is rebuilt on the stripped
//! operands and wrapped in a single interleave. When an interleave
//! meets a deinterleave, the pair annihilates.

use ripple_ir::{
    Expr, ExprKind, Mutator, Scope, Stmt, StmtKind, expr_uses_var,
    mutate::{recurse_expr, recurse_stmt},
    ops, stmt_uses_var,
};
use tracing::trace;

use crate::intrinsics::{is_native_deinterleave, is_native_interleave, native_interleave};

#[derive(Default)]
pub struct EliminateInterleaves {
    // Variables with a published `.deinterleaved` form in scope.
    vars: Scope<bool>,
}

struct DeinterleavingAlternative {
    name: &'static str,
    extra_args: &'static [i64],
}

/// Calls with both a non-interleaving and an interleaving variant. The
/// matcher emits the non-interleaving one; when its operands turn out
/// to be interleaved we switch to the alternative instead.
const DEINTERLEAVING_ALTS: &[(&str, DeinterleavingAlternative)] = &[
    ("halide.hexagon.pack.vh", DeinterleavingAlternative { name: "halide.hexagon.trunc.vh", extra_args: &[] }),
    ("halide.hexagon.pack.vw", DeinterleavingAlternative { name: "halide.hexagon.trunc.vw", extra_args: &[] }),
    (
        "halide.hexagon.pack_satub.vh",
        DeinterleavingAlternative { name: "halide.hexagon.trunc_satub.vh", extra_args: &[] },
    ),
    (
        "halide.hexagon.pack_sath.vw",
        DeinterleavingAlternative { name: "halide.hexagon.trunc_sath.vw", extra_args: &[] },
    ),
    // No simple alternative for this one, but the shift-saturate-narrow
    // works with a shift of 0.
    (
        "halide.hexagon.pack_satuh.vw",
        DeinterleavingAlternative { name: "halide.hexagon.trunc_satuh_shr.vw.w", extra_args: &[0] },
    ),
];

impl EliminateInterleaves {
    /// An expression that either is an interleave or can pretend to be
    /// one: scalars and broadcasts are invariant under interleaving,
    /// and variables with a published deinterleaved form can be
    /// re-expressed through it.
    fn yields_interleave(&self, x: &Expr) -> bool {
        if is_native_interleave(x) {
            return true;
        }
        if x.ty().is_scalar() || matches!(x.kind(), ExprKind::Broadcast { .. }) {
            return true;
        }
        match x.as_variable() {
            Some(name) => self.vars.contains(&format!("{name}.deinterleaved")),
            None => false,
        }
    }

    /// At least one operand is an actual interleave and every operand
    /// yields one.
    fn yields_removable_interleave(&self, exprs: &[&Expr]) -> bool {
        let mut any_is_interleave = false;
        for e in exprs {
            if is_native_interleave(e) {
                any_is_interleave = true;
            } else if !self.yields_interleave(e) {
                return false;
            }
        }
        any_is_interleave
    }

    /// The expression being interleaved. Calling this on an expression
    /// that does not yield an interleave is an invariant violation.
    fn remove_interleave(&self, x: &Expr) -> Expr {
        if is_native_interleave(x) {
            let (_, args) = x.as_call().unwrap();
            return args[0].clone();
        }
        if x.ty().is_scalar() || matches!(x.kind(), ExprKind::Broadcast { .. }) {
            return x.clone();
        }
        if let Some(name) = x.as_variable() {
            let deinterleaved = format!("{name}.deinterleaved");
            assert!(self.vars.contains(&deinterleaved), "variable '{name}' has no deinterleaved form");
            return Expr::var(x.ty(), deinterleaved);
        }
        panic!("expression '{x}' does not yield an interleave");
    }

    fn visit_binary(&mut self, e: &Expr, a: &Expr, b: &Expr) -> Expr {
        let op = match e.kind() {
            ExprKind::Binary { op, .. } => *op,
            _ => unreachable!(),
        };
        let a = self.mutate_expr(a);
        let b = self.mutate_expr(b);
        // Only pull out an interleave if at least one operand is an
        // actual interleave.
        if self.yields_removable_interleave(&[&a, &b]) {
            let a = self.remove_interleave(&a);
            let b = self.remove_interleave(&b);
            native_interleave(Expr::binary(op, a, b))
        } else if let ExprKind::Binary { a: old_a, b: old_b, .. } = e.kind() {
            if a.same_as(old_a) && b.same_as(old_b) { e.clone() } else { Expr::binary(op, a, b) }
        } else {
            unreachable!()
        }
    }

    fn visit_select(&mut self, e: &Expr, cond: &Expr, t: &Expr, f: &Expr) -> Expr {
        let new_cond = self.mutate_expr(cond);
        let new_t = self.mutate_expr(t);
        let new_f = self.mutate_expr(f);
        if self.yields_removable_interleave(&[&new_cond, &new_t, &new_f]) {
            let c = self.remove_interleave(&new_cond);
            let tv = self.remove_interleave(&new_t);
            let fv = self.remove_interleave(&new_f);
            native_interleave(Expr::select(c, tv, fv))
        } else if new_cond.same_as(cond) && new_t.same_as(t) && new_f.same_as(f) {
            e.clone()
        } else {
            Expr::select(new_cond, new_t, new_f)
        }
    }

    fn visit_cast(&mut self, e: &Expr, value: &Expr) -> Expr {
        if e.ty().bits == value.ty().bits {
            // Interleaves move through casts of the same lane width.
            let new = self.mutate_expr(value);
            if is_native_interleave(&new) {
                let stripped = self.remove_interleave(&new);
                native_interleave(Expr::cast(e.ty(), stripped))
            } else if new.same_as(value) {
                e.clone()
            } else {
                Expr::cast(e.ty(), new)
            }
        } else {
            recurse_expr(self, e)
        }
    }

    fn is_interleavable(&self, e: &Expr, name: &str, args: &[Expr]) -> bool {
        // These calls can have interleaves moved from operands to the
        // result.
        const INTERLEAVABLE: &[&str] = &[
            ops::BITWISE_AND,
            ops::BITWISE_NOT,
            ops::BITWISE_XOR,
            ops::BITWISE_OR,
            ops::SHIFT_LEFT,
            ops::SHIFT_RIGHT,
            ops::ABS,
            ops::ABSD,
        ];
        if INTERLEAVABLE.contains(&name) {
            return true;
        }

        // These cannot; they also share the return type with their
        // argument, which would fool the lane test below.
        const NOT_INTERLEAVABLE: &[&str] = &[
            "halide.hexagon.interleave.vb",
            "halide.hexagon.interleave.vh",
            "halide.hexagon.interleave.vw",
            "halide.hexagon.deinterleave.vb",
            "halide.hexagon.deinterleave.vh",
            "halide.hexagon.deinterleave.vw",
        ];
        if NOT_INTERLEAVABLE.contains(&name) {
            return false;
        }

        if name.starts_with("halide.hexagon.") {
            // Assume a hexagon intrinsic is interleavable as long as
            // every vector operand matches the return type's lane count
            // and lane width.
            return args.iter().all(|arg| {
                arg.ty().is_scalar() || (arg.ty().bits == e.ty().bits && arg.ty().lanes == e.ty().lanes)
            });
        }
        false
    }

    fn visit_call(&mut self, e: &Expr) -> Expr {
        let (name, call_type, args) = match e.kind() {
            ExprKind::Call { name, call_type, args } => (name.clone(), *call_type, args),
            _ => unreachable!(),
        };

        let mut changed = false;
        let mut new_args: Vec<Expr> = Vec::with_capacity(args.len());
        for arg in args {
            let new = self.mutate_expr(arg);
            changed = changed || !new.same_as(arg);
            new_args.push(new);
        }

        let arg_refs: Vec<&Expr> = new_args.iter().collect();

        if is_native_deinterleave(e) && self.yields_interleave(&new_args[0]) {
            // A deinterleave of an interleave: remove them both.
            trace!(expr = %e, "interleave pair cancelled");
            return self.remove_interleave(&new_args[0]);
        }

        if self.is_interleavable(e, &name, &new_args) && self.yields_removable_interleave(&arg_refs) {
            let stripped: Vec<Expr> = new_args.iter().map(|arg| self.remove_interleave(arg)).collect();
            let call = Expr::call(e.ty(), name, stripped, call_type);
            return native_interleave(call);
        }

        if let Some((_, alt)) = DEINTERLEAVING_ALTS.iter().find(|(n, _)| *n == name) {
            if self.yields_removable_interleave(&arg_refs) {
                // The operands are interleaved; use the interleaving
                // variant of this instruction instead.
                let mut stripped: Vec<Expr> = new_args.iter().map(|arg| self.remove_interleave(arg)).collect();
                for extra in alt.extra_args {
                    stripped.push(Expr::make_const(ripple_dtype::Type::int(32), *extra));
                }
                return Expr::call(e.ty(), alt.name, stripped, call_type);
            }
        }

        if changed { Expr::call(e.ty(), name, new_args, call_type) } else { e.clone() }
    }

    fn visit_let_expr(&mut self, e: &Expr, name: &str, value: &Expr, body: &Expr) -> Expr {
        let new_value = self.mutate_expr(value);
        let deinterleaved_name = format!("{name}.deinterleaved");
        let new_body;
        if is_native_interleave(&new_value) {
            // A deinterleaved version of this binding is available.
            self.vars.push(deinterleaved_name.clone(), true);
            new_body = self.mutate_expr(body);
            self.vars.pop(&deinterleaved_name);
        } else {
            new_body = self.mutate_expr(body);
        }

        if new_value.same_as(value) && new_body.same_as(body) {
            return e.clone();
        }
        if new_body.same_as(body) {
            // The body didn't change, so the deinterleaved form went
            // unused.
            return Expr::let_(name, new_value, new_body);
        }

        let deinterleaved_used = expr_uses_var(&new_body, &deinterleaved_name);
        let interleaved_used = expr_uses_var(&new_body, name);
        if deinterleaved_used && interleaved_used {
            // Generate both bindings, deriving the interleaved one from
            // the deinterleaved one.
            let deinterleaved = self.remove_interleave(&new_value);
            let deinterleaved_var = Expr::var(deinterleaved.ty(), deinterleaved_name.clone());
            let inner = Expr::let_(name, native_interleave(deinterleaved_var), new_body);
            Expr::let_(deinterleaved_name, deinterleaved, inner)
        } else if deinterleaved_used {
            Expr::let_(deinterleaved_name, self.remove_interleave(&new_value), new_body)
        } else if interleaved_used {
            Expr::let_(name, new_value, new_body)
        } else {
            // The let must have been dead.
            assert!(!expr_uses_var(body, name), "eliminated a non-dead let '{name}'");
            new_body
        }
    }

    fn visit_let_stmt(&mut self, s: &Stmt, name: &str, value: &Expr, body: &Stmt) -> Stmt {
        let new_value = self.mutate_expr(value);
        let deinterleaved_name = format!("{name}.deinterleaved");
        let new_body;
        if is_native_interleave(&new_value) {
            self.vars.push(deinterleaved_name.clone(), true);
            new_body = self.mutate_stmt(body);
            self.vars.pop(&deinterleaved_name);
        } else {
            new_body = self.mutate_stmt(body);
        }

        if new_value.same_as(value) && new_body.same_as(body) {
            return s.clone();
        }
        if new_body.same_as(body) {
            return Stmt::let_stmt(name, new_value, new_body);
        }

        let deinterleaved_used = stmt_uses_var(&new_body, &deinterleaved_name);
        let interleaved_used = stmt_uses_var(&new_body, name);
        if deinterleaved_used && interleaved_used {
            let deinterleaved = self.remove_interleave(&new_value);
            let deinterleaved_var = Expr::var(deinterleaved.ty(), deinterleaved_name.clone());
            let inner = Stmt::let_stmt(name, native_interleave(deinterleaved_var), new_body);
            Stmt::let_stmt(deinterleaved_name, deinterleaved, inner)
        } else if deinterleaved_used {
            Stmt::let_stmt(deinterleaved_name, self.remove_interleave(&new_value), new_body)
        } else if interleaved_used {
            Stmt::let_stmt(name, new_value, new_body)
        } else {
            assert!(!stmt_uses_var(body, name), "eliminated a non-dead let '{name}'");
            new_body
        }
    }
}

impl Mutator for EliminateInterleaves {
    fn mutate_expr(&mut self, e: &Expr) -> Expr {
        match e.kind() {
            ExprKind::Binary { a, b, .. } => self.visit_binary(e, a, b),
            ExprKind::Not { value } => {
                let new = self.mutate_expr(value);
                if is_native_interleave(&new) {
                    let stripped = self.remove_interleave(&new);
                    native_interleave(Expr::not(stripped))
                } else if new.same_as(value) {
                    e.clone()
                } else {
                    Expr::not(new)
                }
            }
            ExprKind::Select { cond, true_value, false_value } => self.visit_select(e, cond, true_value, false_value),
            ExprKind::Cast { value } => self.visit_cast(e, value),
            ExprKind::Call { .. } => self.visit_call(e),
            ExprKind::Let { name, value, body } => {
                let (name, value, body) = (name.clone(), value.clone(), body.clone());
                self.visit_let_expr(e, &name, &value, &body)
            }
            _ => recurse_expr(self, e),
        }
    }

    fn mutate_stmt(&mut self, s: &Stmt) -> Stmt {
        match s.kind() {
            StmtKind::LetStmt { name, value, body } => {
                let (name, value, body) = (name.clone(), value.clone(), body.clone());
                self.visit_let_stmt(s, &name, &value, &body)
            }
            _ => recurse_stmt(self, s),
        }
    }
}
