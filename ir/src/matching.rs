//! Structural pattern matching with positional wildcard captures.
//!
//! A wildcard is a `Variable` named `"*"`. Its type constrains the
//! match: code and bits must agree exactly, and a lane count of 0
//! matches any concrete lane count — unified across the whole match, so
//! every 0-lane type in one pattern resolves to the same count.

use smallvec::SmallVec;

use ripple_dtype::Type;

use crate::{Expr, ExprKind};

/// Deep structural equality (as opposed to `same_as` identity).
pub fn equal(a: &Expr, b: &Expr) -> bool {
    a == b
}

/// Match `value` against `pattern`, returning the wildcard captures in
/// traversal order, or `None` if the shapes or types disagree.
pub fn expr_match(pattern: &Expr, value: &Expr) -> Option<SmallVec<[Expr; 4]>> {
    let mut state = MatchState::default();
    if state.match_expr(pattern, value) { Some(state.captures) } else { None }
}

#[derive(Default)]
struct MatchState {
    captures: SmallVec<[Expr; 4]>,
    // The concrete lane count that 0-lane pattern types resolved to.
    wild_lanes: Option<u32>,
}

impl MatchState {
    fn types_match(&mut self, pattern: Type, value: Type) -> bool {
        if pattern.code != value.code || pattern.bits != value.bits {
            return false;
        }
        if pattern.lanes == 0 {
            match self.wild_lanes {
                Some(lanes) => lanes == value.lanes,
                None => {
                    self.wild_lanes = Some(value.lanes);
                    true
                }
            }
        } else {
            pattern.lanes == value.lanes
        }
    }

    fn match_expr(&mut self, pattern: &Expr, value: &Expr) -> bool {
        if let ExprKind::Variable { name } = pattern.kind() {
            if name == "*" {
                if !self.types_match(pattern.ty(), value.ty()) {
                    return false;
                }
                self.captures.push(value.clone());
                return true;
            }
        }

        match (pattern.kind(), value.kind()) {
            (ExprKind::IntImm(p), ExprKind::IntImm(v)) => p == v && self.types_match(pattern.ty(), value.ty()),
            (ExprKind::UIntImm(p), ExprKind::UIntImm(v)) => p == v && self.types_match(pattern.ty(), value.ty()),
            (ExprKind::Variable { name: p }, ExprKind::Variable { name: v }) => {
                p == v && self.types_match(pattern.ty(), value.ty())
            }
            (ExprKind::Cast { value: pv }, ExprKind::Cast { value: vv }) => {
                self.types_match(pattern.ty(), value.ty()) && self.match_expr(pv, vv)
            }
            (ExprKind::Broadcast { value: pv, .. }, ExprKind::Broadcast { value: vv, .. }) => {
                self.types_match(pattern.ty(), value.ty()) && self.match_expr(pv, vv)
            }
            (
                ExprKind::Ramp { base: pb, stride: ps, .. },
                ExprKind::Ramp { base: vb, stride: vs, .. },
            ) => self.types_match(pattern.ty(), value.ty()) && self.match_expr(pb, vb) && self.match_expr(ps, vs),
            (ExprKind::Binary { op: po, a: pa, b: pb }, ExprKind::Binary { op: vo, a: va, b: vb }) => {
                po == vo && self.match_expr(pa, va) && self.match_expr(pb, vb)
            }
            (ExprKind::Not { value: pv }, ExprKind::Not { value: vv }) => self.match_expr(pv, vv),
            (
                ExprKind::Select { cond: pc, true_value: pt, false_value: pf },
                ExprKind::Select { cond: vc, true_value: vt, false_value: vf },
            ) => self.match_expr(pc, vc) && self.match_expr(pt, vt) && self.match_expr(pf, vf),
            (
                ExprKind::Call { name: pn, args: pa, call_type: pc },
                ExprKind::Call { name: vn, args: va, call_type: vc },
            ) => {
                pn == vn
                    && pc == vc
                    && pa.len() == va.len()
                    && self.types_match(pattern.ty(), value.ty())
                    && pa.iter().zip(va.iter()).all(|(p, v)| self.match_expr(p, v))
            }
            _ => false,
        }
    }
}
