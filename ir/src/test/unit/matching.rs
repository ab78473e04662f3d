//! Structural matching and wildcard capture tests.

use ripple_dtype::Type;

use crate::{CallType, Expr, expr_match};

fn wild(ty: Type) -> Expr {
    Expr::var(ty, "*")
}

#[test]
fn captures_bind_in_traversal_order() {
    let a = Expr::var(Type::uint_vec(16, 64), "a");
    let b = Expr::var(Type::uint_vec(16, 64), "b");
    let pattern = wild(Type::uint_vec(16, 0)) + wild(Type::uint_vec(16, 0));
    let value = a.clone() + b.clone();

    let captures = expr_match(&pattern, &value).expect("should match");
    assert_eq!(captures.len(), 2);
    assert_eq!(captures[0], a);
    assert_eq!(captures[1], b);
}

#[test]
fn wildcard_type_code_must_agree() {
    let a = Expr::var(Type::int_vec(16, 64), "a");
    let pattern = wild(Type::uint_vec(16, 0));
    assert!(expr_match(&pattern, &a).is_none());
}

#[test]
fn zero_lanes_unify_across_the_match() {
    let pattern = Expr::call(
        Type::uint_vec(16, 0),
        "f",
        [wild(Type::uint_vec(16, 0)), wild(Type::uint_vec(16, 0))],
        CallType::PureExtern,
    );
    let a64 = Expr::var(Type::uint_vec(16, 64), "a");
    let b64 = Expr::var(Type::uint_vec(16, 64), "b");
    let b32 = Expr::var(Type::uint_vec(16, 32), "b");

    let same = Expr::call(Type::uint_vec(16, 64), "f", [a64.clone(), b64], CallType::PureExtern);
    assert!(expr_match(&pattern, &same).is_some());

    // A second wildcard resolving to a different lane count fails.
    let mixed = Expr::call(Type::uint_vec(16, 64), "f", [a64, b32], CallType::PureExtern);
    assert!(expr_match(&pattern, &mixed).is_none());
}

#[test]
fn scalar_wildcard_requires_exact_lanes() {
    let pattern = wild(Type::uint(16));
    let vec = Expr::var(Type::uint_vec(16, 64), "a");
    let scalar = Expr::var(Type::uint(16), "k");
    assert!(expr_match(&pattern, &vec).is_none());
    assert!(expr_match(&pattern, &scalar).is_some());
}

#[test]
fn broadcast_pattern_matches_any_lane_count() {
    let pattern = Expr::broadcast(wild(Type::uint(16)), 0);
    let k = Expr::var(Type::uint(16), "k");
    let value = Expr::broadcast(k.clone(), 64);

    let captures = expr_match(&pattern, &value).expect("should match");
    assert_eq!(captures[0], k);
}

#[test]
fn immediates_match_by_type_and_value() {
    let ty = Type::uint_vec(16, 0);
    let pattern = wild(ty) + 1;
    let a = Expr::var(Type::uint_vec(16, 64), "a");

    assert!(expr_match(&pattern, &(a.clone() + 1)).is_some());
    assert!(expr_match(&pattern, &(a.clone() + 2)).is_none());
}

#[test]
fn cast_pattern_requires_matching_types() {
    let a8 = Expr::var(Type::uint_vec(8, 64), "a");
    let pattern = Expr::cast(Type::uint_vec(16, 0), wild(Type::uint_vec(8, 0)));

    let widening = Expr::cast(Type::uint_vec(16, 64), a8.clone());
    let captures = expr_match(&pattern, &widening).expect("should match");
    assert_eq!(captures[0], a8);

    let to_int = Expr::cast(Type::int_vec(16, 64), a8);
    assert!(expr_match(&pattern, &to_int).is_none());
}

#[test]
fn repeated_wildcards_capture_independently() {
    let pattern = wild(Type::int_vec(32, 0)) + wild(Type::int_vec(32, 0));
    let x = Expr::var(Type::int_vec(32, 32), "x");
    let y = Expr::var(Type::int_vec(32, 32), "y");

    let captures = expr_match(&pattern, &(x.clone() + y.clone())).expect("should match");
    assert_ne!(captures[0], captures[1]);
}
