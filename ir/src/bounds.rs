//! Conservative symbolic interval analysis.
//!
//! Bounds are scalar expressions of the element type: the interval of
//! a vector expression bounds every lane. `None` means unbounded on
//! that side. Free scalar variables bound themselves (`[v, v]`), which
//! lets downstream simplification cancel loop-invariant terms.

use ripple_dtype::Type;

use crate::{BinOp, Expr, ExprKind, Scope, cast::as_const_int, ops, simplify::simplify};

#[derive(Debug, Clone, Default)]
pub struct Interval {
    pub min: Option<Expr>,
    pub max: Option<Expr>,
}

impl Interval {
    pub fn single(e: Expr) -> Self {
        Self { min: Some(e.clone()), max: Some(e) }
    }

    pub fn everything() -> Self {
        Self::default()
    }

    pub fn is_bounded(&self) -> bool {
        self.min.is_some() && self.max.is_some()
    }
}

/// Interval of `e` given intervals for the variables in `scope`.
/// `Let` bindings inside `e` are pushed and popped on the scope.
pub fn bounds_of_expr_in_scope(e: &Expr, scope: &mut Scope<Interval>) -> Interval {
    match e.kind() {
        ExprKind::IntImm(_) | ExprKind::UIntImm(_) => Interval::single(e.clone()),
        ExprKind::Variable { name } => {
            if let Some(interval) = scope.get(name) {
                interval.clone()
            } else if e.ty().is_scalar() {
                Interval::single(e.clone())
            } else {
                type_range(e.ty())
            }
        }
        ExprKind::Cast { value } => {
            let inner = bounds_of_expr_in_scope(value, scope);
            let target = e.ty().element_of();
            match (inner.min, inner.max) {
                (Some(lo), Some(hi)) if target.can_represent(value.ty().element_of()) => Interval {
                    min: Some(simplify(&Expr::cast(target, lo))),
                    max: Some(simplify(&Expr::cast(target, hi))),
                },
                _ => type_range(e.ty()),
            }
        }
        ExprKind::Broadcast { value, .. } => bounds_of_expr_in_scope(value, scope),
        ExprKind::Ramp { base, stride, lanes } => {
            let b = bounds_of_expr_in_scope(base, scope);
            match as_const_int(stride) {
                Some(c) => {
                    let span = c * (lanes.saturating_sub(1) as i64);
                    let shift = |side: Option<Expr>| side.map(|x| simplify(&(x + span)));
                    if c >= 0 {
                        Interval { min: b.min, max: shift(b.max) }
                    } else {
                        Interval { min: shift(b.min), max: b.max }
                    }
                }
                None => Interval::everything(),
            }
        }
        ExprKind::Binary { op, a, b } => binary_bounds(e, *op, a, b, scope),
        ExprKind::Select { true_value, false_value, .. } => {
            let t = bounds_of_expr_in_scope(true_value, scope);
            let f = bounds_of_expr_in_scope(false_value, scope);
            Interval {
                min: combine(t.min, f.min, ops::min),
                max: combine(t.max, f.max, ops::max),
            }
        }
        ExprKind::Let { name, value, body } => {
            let value_bounds = bounds_of_expr_in_scope(value, scope);
            scope.push(name.clone(), value_bounds);
            let result = bounds_of_expr_in_scope(body, scope);
            scope.pop(name);
            result
        }
        _ => type_range(e.ty()),
    }
}

fn binary_bounds(e: &Expr, op: BinOp, a: &Expr, b: &Expr, scope: &mut Scope<Interval>) -> Interval {
    let ba = bounds_of_expr_in_scope(a, scope);
    let bb = bounds_of_expr_in_scope(b, scope);
    match op {
        BinOp::Add => Interval {
            min: combine(ba.min, bb.min, |x, y| simplify(&(x + y))),
            max: combine(ba.max, bb.max, |x, y| simplify(&(x + y))),
        },
        BinOp::Sub => Interval {
            min: combine(ba.min, bb.max, |x, y| simplify(&(x - y))),
            max: combine(ba.max, bb.min, |x, y| simplify(&(x - y))),
        },
        BinOp::Mul => {
            let scale = |iv: &Interval, c: i64| {
                let apply = |side: &Option<Expr>| side.as_ref().map(|x| simplify(&(x.clone() * c)));
                if c >= 0 {
                    Interval { min: apply(&iv.min), max: apply(&iv.max) }
                } else {
                    Interval { min: apply(&iv.max), max: apply(&iv.min) }
                }
            };
            if let Some(c) = const_point(&bb) {
                scale(&ba, c)
            } else if let Some(c) = const_point(&ba) {
                scale(&bb, c)
            } else {
                Interval::everything()
            }
        }
        BinOp::Div => match const_point(&bb) {
            Some(c) if c > 0 => Interval {
                min: ba.min.map(|x| simplify(&(x / c))),
                max: ba.max.map(|x| simplify(&(x / c))),
            },
            _ => Interval::everything(),
        },
        // Remainder takes the divisor's sign, so a positive divisor
        // yields [0, c-1] for any dividend.
        BinOp::Mod => match const_point(&bb) {
            Some(c) if c > 0 => {
                let elem = e.ty().element_of();
                Interval {
                    min: Some(Expr::make_const(elem, 0)),
                    max: Some(Expr::make_const(elem, c - 1)),
                }
            }
            _ => Interval::everything(),
        },
        BinOp::Min => Interval {
            min: combine(ba.min, bb.min, ops::min).map(|x| simplify(&x)),
            max: either(ba.max, bb.max, ops::min),
        },
        BinOp::Max => Interval {
            min: either(ba.min, bb.min, ops::max),
            max: combine(ba.max, bb.max, ops::max).map(|x| simplify(&x)),
        },
        _ => type_range(e.ty()),
    }
}

/// Both sides known: combine them. Either unknown: unknown.
fn combine(a: Option<Expr>, b: Option<Expr>, f: impl Fn(Expr, Expr) -> Expr) -> Option<Expr> {
    match (a, b) {
        (Some(x), Some(y)) => Some(f(x, y)),
        _ => None,
    }
}

/// Both sides known: combine. One side known: that side alone already
/// bounds the result (used for min's upper bound and max's lower).
fn either(a: Option<Expr>, b: Option<Expr>, f: impl Fn(Expr, Expr) -> Expr) -> Option<Expr> {
    match (a, b) {
        (Some(x), Some(y)) => Some(simplify(&f(x, y))),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

fn const_point(iv: &Interval) -> Option<i64> {
    let lo = iv.min.as_ref().and_then(as_const_int)?;
    let hi = iv.max.as_ref().and_then(as_const_int)?;
    if lo == hi { Some(lo) } else { None }
}

/// The representable range of small integer types; wider types are
/// treated as unbounded.
fn type_range(ty: Type) -> Interval {
    let elem = ty.element_of();
    if (elem.is_int() || elem.is_uint()) && elem.bits <= 16 {
        Interval {
            min: Some(Expr::make_const(elem, elem.min_int())),
            max: Some(Expr::make_const(elem, elem.max_int())),
        }
    } else {
        Interval::everything()
    }
}
