//! Interval analysis tests.

use ripple_dtype::Type;

use crate::{Expr, Interval, Scope, bounds_of_expr_in_scope, simplify};

fn bounds(e: &Expr) -> Interval {
    let mut scope = Scope::new();
    bounds_of_expr_in_scope(e, &mut scope)
}

#[test]
fn constants_bound_themselves() {
    let c = Expr::make_const(Type::int(32), 42);
    let iv = bounds(&c);
    assert_eq!(iv.min, Some(c.clone()));
    assert_eq!(iv.max, Some(c));
}

#[test]
fn small_types_fall_back_to_their_range() {
    let d = Expr::var(Type::uint_vec(8, 64), "d");
    let iv = bounds(&d);
    assert_eq!(iv.min, Some(Expr::make_const(Type::uint(8), 0)));
    assert_eq!(iv.max, Some(Expr::make_const(Type::uint(8), 255)));
}

#[test]
fn wide_vectors_are_unbounded() {
    let d = Expr::var(Type::int_vec(32, 64), "d");
    assert!(!bounds(&d).is_bounded());
}

#[test]
fn scalar_free_variables_bound_themselves() {
    let base = Expr::var(Type::int(32), "base");
    let iv = bounds(&base);
    assert_eq!(iv.min, Some(base.clone()));
    assert_eq!(iv.max, Some(base));
}

#[test]
fn widening_cast_casts_the_bounds() {
    let d = Expr::var(Type::uint_vec(8, 64), "d");
    let e = Expr::cast(Type::int_vec(32, 64), d);
    let iv = bounds(&e);
    assert_eq!(iv.min, Some(Expr::make_const(Type::int(32), 0)));
    assert_eq!(iv.max, Some(Expr::make_const(Type::int(32), 255)));
}

#[test]
fn loop_invariant_offset_spans_cancel() {
    // base + clamped byte data: the classic bounded-index shape.
    let base = Expr::var(Type::int(32), "base");
    let d = Expr::var(Type::uint_vec(8, 64), "d");
    let index = Expr::broadcast(base.clone(), 64) + Expr::cast(Type::int_vec(32, 64), d);

    let iv = bounds(&index);
    let (lo, hi) = (iv.min.unwrap(), iv.max.unwrap());
    assert_eq!(simplify(&(hi - lo)), Expr::make_const(Type::int(32), 255));
}

#[test]
fn ramp_with_positive_stride() {
    let base = Expr::var(Type::int(32), "base");
    let ramp = Expr::ramp(base.clone(), Expr::make_const(Type::int(32), 1), 64);
    let iv = bounds(&ramp);
    assert_eq!(iv.min, Some(base.clone()));
    assert_eq!(iv.max, Some(simplify(&(base + 63))));
}

#[test]
fn min_max_tighten_one_side() {
    let x = Expr::var(Type::int_vec(32, 16), "x");
    let clamped = crate::min(x, Expr::make_const(Type::int_vec(32, 16), 100));
    let iv = bounds(&clamped);
    assert!(iv.min.is_none());
    assert_eq!(iv.max, Some(Expr::make_const(Type::int(32), 100)));
}

#[test]
fn mod_by_positive_constant() {
    let x = Expr::var(Type::int_vec(32, 16), "x");
    let e = x % 8;
    let iv = bounds(&e);
    assert_eq!(iv.min, Some(Expr::make_const(Type::int(32), 0)));
    assert_eq!(iv.max, Some(Expr::make_const(Type::int(32), 7)));
}

#[test]
fn let_bindings_scope_their_interval() {
    let v = Expr::var(Type::int_vec(32, 16), "v");
    let body = v.clone() + 1;
    let e = Expr::let_("v", Expr::make_const(Type::int_vec(32, 16), 5), body);
    let iv = bounds(&e);
    assert_eq!(iv.min, Some(Expr::make_const(Type::int(32), 6)));
    assert_eq!(iv.max, Some(Expr::make_const(Type::int(32), 6)));
}

#[test]
fn scoped_interval_wins_over_type_range() {
    let mut scope = Scope::new();
    scope.push(
        "d",
        Interval {
            min: Some(Expr::make_const(Type::uint(8), 10)),
            max: Some(Expr::make_const(Type::uint(8), 20)),
        },
    );
    let d = Expr::var(Type::uint_vec(8, 64), "d");
    let iv = bounds_of_expr_in_scope(&d, &mut scope);
    assert_eq!(iv.max, Some(Expr::make_const(Type::uint(8), 20)));
}
