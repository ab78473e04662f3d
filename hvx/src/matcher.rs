//! Peephole rewriting of arithmetic and casts into HVX intrinsics.

use ripple_dtype::TypeCode;
use ripple_ir::{
    BinOp, CallType, Expr, ExprKind, Mutator, equal, expr_match, is_const_power_of_two_integer,
    is_negative_negatable_const, is_positive_const, lossless_cast, mutate::recurse_expr, simplify, substitute,
};
use tracing::debug;

use crate::intrinsics::{native_deinterleave, native_interleave};
use crate::patterns::{ADDS, CAST_REWRITES, CLS_PATTERNS, CASTS, MULS, Pattern, PatternFlag, with_lanes};

/// Try each pattern in order against `x`; the first one whose operand
/// adjustments all succeed produces the intrinsic call. Captured
/// operands are recursively rewritten through `mutator` so inner
/// opportunities surface bottom-up.
pub(crate) fn apply_patterns<M: Mutator>(x: &Expr, patterns: &[Pattern], mutator: &mut M) -> Expr {
    for p in patterns {
        let Some(mut matches) = expr_match(&p.pattern, x) else {
            continue;
        };

        // Narrowing constraints. A capture that cannot be losslessly
        // narrowed fails the whole pattern.
        let mut is_match = true;
        for i in 0..matches.len() {
            let t = matches[i].ty();
            let target = t.with_bits(t.bits / 2);
            let narrowed = if PatternFlag::narrow(i).is_some_and(|f| p.flags.contains(f)) {
                Some(lossless_cast(target, &matches[i]))
            } else if PatternFlag::narrow_unsigned(i).is_some_and(|f| p.flags.contains(f)) {
                Some(lossless_cast(target.with_code(TypeCode::UInt), &matches[i]))
            } else {
                None
            };
            if let Some(narrowed) = narrowed {
                match narrowed {
                    Some(e) => matches[i] = e,
                    None => {
                        is_match = false;
                        break;
                    }
                }
            }
        }
        if !is_match {
            continue;
        }

        // Power-of-two operands become shift amounts.
        for i in 1..matches.len() {
            if PatternFlag::exact_log2(i).is_some_and(|f| p.flags.contains(f)) {
                match is_const_power_of_two_integer(&matches[i]) {
                    Some(pow) => {
                        let t = matches[i].ty().with_lanes(1);
                        matches[i] = Expr::make_const(t, pow as i64);
                    }
                    None => {
                        is_match = false;
                        break;
                    }
                }
            }
        }
        if !is_match {
            continue;
        }

        for i in 0..matches.len() {
            if PatternFlag::deinterleave(i).is_some_and(|f| p.flags.contains(f)) {
                assert!(matches[i].ty().is_vector(), "deinterleave of scalar operand in {x}");
                matches[i] = native_deinterleave(matches[i].clone());
            }
        }
        if p.flags.contains(PatternFlag::SwapOps01) {
            matches.swap(0, 1);
        }
        if p.flags.contains(PatternFlag::SwapOps12) {
            matches.swap(1, 2);
        }

        for m in matches.iter_mut() {
            *m = mutator.mutate_expr(m);
        }

        debug!(intrin = p.intrin, "pattern matched");
        let mut result = Expr::call(x.ty(), p.intrin, matches, CallType::PureExtern);
        if p.flags.contains(PatternFlag::InterleaveResult) {
            result = native_interleave(result);
        }
        return result;
    }
    x.clone()
}

/// Negate without changing value ranges: push the negation into one
/// side of a multiply, or fold it into a constant. Positive constants
/// and negatable negative constants qualify; the minimum representable
/// value does not.
pub(crate) fn lossless_negate(x: &Expr) -> Option<Expr> {
    if let Some((a, b)) = x.as_binary(BinOp::Mul) {
        if let Some(na) = lossless_negate(a) {
            return Some(Expr::binary(BinOp::Mul, na, b.clone()));
        }
        if let Some(nb) = lossless_negate(b) {
            return Some(Expr::binary(BinOp::Mul, a.clone(), nb));
        }
    }
    if is_negative_negatable_const(x) || is_positive_const(x) {
        return Some(simplify(&-x.clone()));
    }
    None
}

/// The pattern-matching rewriter: visits `Mul`, `Add`, `Sub`, `Max`
/// and `Cast` nodes of vector type and rewrites them to intrinsic
/// calls, leaving everything else to default recursion.
#[derive(Default)]
pub struct OptimizePatterns;

impl OptimizePatterns {
    fn visit_commutative(&mut self, e: &Expr, op: BinOp, a: &Expr, b: &Expr, patterns: &[Pattern]) -> Expr {
        if e.ty().is_vector() {
            let result = apply_patterns(e, patterns, self);
            if !result.same_as(e) {
                return result;
            }
            // Try the commuted form.
            let commuted = Expr::binary(op, b.clone(), a.clone());
            let result = apply_patterns(&commuted, patterns, self);
            if !result.same_as(&commuted) {
                return result;
            }
        }
        recurse_expr(self, e)
    }

    fn visit_sub(&mut self, e: &Expr, a: &Expr, b: &Expr) -> Expr {
        if e.ty().is_vector() {
            // Try negating b and using an add pattern if successful.
            if let Some(neg_b) = lossless_negate(b) {
                let add = Expr::binary(BinOp::Add, a.clone(), neg_b.clone());
                let result = apply_patterns(&add, &ADDS, self);
                if !result.same_as(&add) {
                    return result;
                }
                let add = Expr::binary(BinOp::Add, neg_b, a.clone());
                let result = apply_patterns(&add, &ADDS, self);
                if !result.same_as(&add) {
                    return result;
                }
            }
        }
        recurse_expr(self, e)
    }

    fn visit_max(&mut self, e: &Expr) -> Expr {
        let e = recurse_expr(self, e);
        if e.ty().is_vector() {
            // The count-leading-sign-bits idiom: both clz operands must
            // capture the same expression, and the result needs 1 added.
            for (intrin, pattern) in CLS_PATTERNS.iter() {
                if let Some(matches) = expr_match(pattern, &e) {
                    if equal(&matches[0], &matches[1]) {
                        debug!(intrin, "pattern matched");
                        let cls = Expr::call(e.ty(), *intrin, [matches[0].clone()], CallType::PureExtern);
                        return cls + 1;
                    }
                }
            }
        }
        e
    }

    fn visit_cast(&mut self, e: &Expr) -> Expr {
        if e.ty().is_vector() {
            let result = apply_patterns(e, &CASTS, self);
            if !result.same_as(e) {
                return result;
            }
            // No direct pattern; try splitting a double cast through an
            // intermediate 16-bit stage so the tables above can fire.
            for (pattern, replacement) in CAST_REWRITES.iter() {
                if let Some(matches) = expr_match(pattern, e) {
                    let replacement = with_lanes(replacement, e.ty().lanes);
                    let rewritten = substitute("*", &matches[0], &replacement);
                    return self.mutate_expr(&rewritten);
                }
            }
        }
        recurse_expr(self, e)
    }
}

impl Mutator for OptimizePatterns {
    fn mutate_expr(&mut self, e: &Expr) -> Expr {
        match e.kind() {
            ExprKind::Binary { op: BinOp::Mul, a, b } => self.visit_commutative(e, BinOp::Mul, a, b, &MULS),
            ExprKind::Binary { op: BinOp::Add, a, b } => self.visit_commutative(e, BinOp::Add, a, b, &ADDS),
            ExprKind::Binary { op: BinOp::Sub, a, b } => self.visit_sub(e, a, b),
            ExprKind::Binary { op: BinOp::Max, .. } => self.visit_max(e),
            ExprKind::Cast { .. } => self.visit_cast(e),
            _ => recurse_expr(self, e),
        }
    }
}
