//! Indirect loads with a small index range become dynamic shuffles: a
//! contiguous gather of every possible source value followed by a
//! hardware LUT lookup.

use ripple_dtype::Type;
use ripple_ir::{
    BinOp, CallType, Expr, ExprKind, Interval, Mutator, Scope, Stmt, StmtKind, as_const_int,
    bounds_of_expr_in_scope, common_subexpression_elimination, equal, is_one,
    mutate::{recurse_expr, recurse_stmt},
    ops, simplify,
};
use tracing::debug;

/// Tighten subtractions of matching `min`/`max` pairs: when both sides
/// clamp against the same bound, the difference of the unclamped
/// values bounds the difference of the clamped ones.
struct UpperBound;

impl Mutator for UpperBound {
    fn mutate_expr(&mut self, e: &Expr) -> Expr {
        let ExprKind::Binary { op: BinOp::Sub, a, b } = e.kind() else {
            return recurse_expr(self, e);
        };
        let a = self.mutate_expr(a);
        let b = self.mutate_expr(b);

        if let (Some((xa, ka)), Some((xb, kb))) = (a.as_binary(BinOp::Max), b.as_binary(BinOp::Max)) {
            if equal(ka, kb) {
                let diff = simplify(&(xa.clone() - xb.clone()));
                return self.mutate_expr(&diff);
            }
        }
        if let (Some((xa, ka)), Some((xb, kb))) = (a.as_binary(BinOp::Min), b.as_binary(BinOp::Min)) {
            if equal(ka, kb) {
                let diff = simplify(&(xa.clone() - xb.clone()));
                return self.mutate_expr(&diff);
            }
        }

        if let ExprKind::Binary { a: old_a, b: old_b, .. } = e.kind() {
            if a.same_as(old_a) && b.same_as(old_b) {
                return e.clone();
            }
        }
        Expr::binary(BinOp::Sub, a, b)
    }
}

/// A conservative upper bound of `x`.
pub fn upper_bound(x: &Expr) -> Expr {
    simplify(&UpperBound.mutate_expr(x))
}

/// Replaces indirect vector loads whose index range fits a 256-entry
/// lookup table with `dynamic_shuffle` intrinsics. The caller must pad
/// allocations so that loading the full table past the base is safe.
#[derive(Default)]
pub struct OptimizeShuffles {
    bounds: Scope<Interval>,
}

impl OptimizeShuffles {
    fn visit_load(&mut self, e: &Expr, name: &str, index: &Expr) -> Expr {
        let index = self.mutate_expr(index);
        let index_bounds = bounds_of_expr_in_scope(&index, &mut self.bounds);
        if let (Some(lo), Some(hi)) = (&index_bounds.min, &index_bounds.max) {
            let mut index_span = hi.clone() - lo.clone();
            index_span = common_subexpression_elimination(&index_span);
            index_span = simplify(&index_span);
            index_span = upper_bound(&index_span);

            if span_fits_lut(&index_span) {
                // A lookup within an up-to-256-element table.
                let const_extent = as_const_int(&index_span).map(|v| v + 1).unwrap_or(256) as u32;
                let base = simplify(lo);

                // Load all the possible indices loaded from the table.
                // For clamped ramps this loads up to one vector past the
                // max; allocation padding accounts for it.
                let stride = Expr::make_const(base.ty(), 1);
                let lut = Expr::load(
                    e.ty().with_lanes(const_extent),
                    name,
                    Expr::ramp(base.clone(), stride, const_extent),
                );

                // The table has at most 256 entries, so the index fits
                // the 8 bit type dynamic_shuffle requires.
                let narrow_ty = Type::uint_vec(8, e.ty().lanes);
                let idx = simplify(&Expr::cast(narrow_ty, index - base));

                debug!(buffer = name, extent = const_extent, "indirect load became dynamic_shuffle");
                let zero = Expr::make_const(Type::int(32), 0);
                let extent = Expr::make_const(Type::int(32), const_extent as i64);
                return Expr::call(e.ty(), ops::DYNAMIC_SHUFFLE, [lut, idx, zero, extent], CallType::PureIntrinsic);
            }
        }
        if let ExprKind::Load { index: old_index, .. } = e.kind() {
            if index.same_as(old_index) {
                return e.clone();
            }
        }
        Expr::load(e.ty(), name, index)
    }
}

/// Provably `span < 256`. A span whose type cannot even hold 256 fits
/// trivially.
fn span_fits_lut(span: &Expr) -> bool {
    let ty = span.ty();
    if !ty.can_represent_int(256) {
        return ty.max_int() < 256;
    }
    let limit = Expr::make_const(ty, 256);
    is_one(&simplify(&Expr::binary(BinOp::Lt, span.clone(), limit)))
}

impl Mutator for OptimizeShuffles {
    fn mutate_expr(&mut self, e: &Expr) -> Expr {
        match e.kind() {
            ExprKind::Let { name, value, body } => {
                // Only vector lets can hide vector indices.
                let tracked = value.ty().is_vector();
                let new_value = self.mutate_expr(value);
                if tracked {
                    let interval = bounds_of_expr_in_scope(value, &mut self.bounds);
                    self.bounds.push(name.clone(), interval);
                }
                let new_body = self.mutate_expr(body);
                if tracked {
                    self.bounds.pop(name);
                }
                if new_value.same_as(value) && new_body.same_as(body) {
                    e.clone()
                } else {
                    Expr::let_(name.clone(), new_value, new_body)
                }
            }
            ExprKind::Load { name, index } => {
                if !e.ty().is_vector() || matches!(index.kind(), ExprKind::Ramp { .. }) {
                    // Scalar and simple vector loads stay as they are.
                    return recurse_expr(self, e);
                }
                let (name, index) = (name.clone(), index.clone());
                self.visit_load(e, &name, &index)
            }
            _ => recurse_expr(self, e),
        }
    }

    fn mutate_stmt(&mut self, s: &Stmt) -> Stmt {
        match s.kind() {
            StmtKind::LetStmt { name, value, body } => {
                let tracked = value.ty().is_vector();
                let new_value = self.mutate_expr(value);
                if tracked {
                    let interval = bounds_of_expr_in_scope(value, &mut self.bounds);
                    self.bounds.push(name.clone(), interval);
                }
                let new_body = self.mutate_stmt(body);
                if tracked {
                    self.bounds.pop(name);
                }
                if new_value.same_as(value) && new_body.same_as(body) {
                    s.clone()
                } else {
                    Stmt::let_stmt(name.clone(), new_value, new_body)
                }
            }
            _ => recurse_stmt(self, s),
        }
    }
}
