//! Lossless cast and constant predicate tests.

use ripple_dtype::Type;

use crate::{Expr, is_const_power_of_two_integer, is_negative_negatable_const, lossless_cast};

#[test]
fn exact_type_is_identity() {
    let a = Expr::var(Type::uint_vec(8, 64), "a");
    let result = lossless_cast(a.ty(), &a).unwrap();
    assert!(result.same_as(&a));
}

#[test]
fn widening_inserts_a_cast() {
    let a = Expr::var(Type::uint_vec(8, 64), "a");
    let t = Type::int_vec(16, 64);
    assert_eq!(lossless_cast(t, &a), Some(Expr::cast(t, a)));
}

#[test]
fn narrowing_strips_a_widening_cast() {
    let a = Expr::var(Type::uint_vec(8, 64), "a");
    let widened = Expr::cast(Type::uint_vec(16, 64), a.clone());
    let result = lossless_cast(Type::uint_vec(8, 64), &widened).unwrap();
    assert!(result.same_as(&a));
}

#[test]
fn narrowing_to_unsigned_strips_a_signed_widening() {
    let a = Expr::var(Type::uint_vec(8, 64), "a");
    let widened = Expr::cast(Type::int_vec(16, 64), a.clone());
    let result = lossless_cast(Type::uint_vec(8, 64), &widened).unwrap();
    assert!(result.same_as(&a));
}

#[test]
fn narrowing_an_arbitrary_expression_fails() {
    let a = Expr::var(Type::uint_vec(16, 64), "a");
    let b = Expr::var(Type::uint_vec(16, 64), "b");
    assert_eq!(lossless_cast(Type::uint_vec(8, 64), &(a + b)), None);
}

#[test]
fn same_width_signedness_change_fails() {
    let a = Expr::var(Type::uint_vec(16, 64), "a");
    assert_eq!(lossless_cast(Type::int_vec(16, 64), &a), None);
}

#[test]
fn broadcasts_narrow_through_their_value() {
    let k = Expr::var(Type::uint(8), "k");
    let widened = Expr::broadcast(Expr::cast(Type::uint(16), k.clone()), 64);
    let result = lossless_cast(Type::uint_vec(8, 64), &widened).unwrap();
    assert_eq!(result, Expr::broadcast(k, 64));
}

#[test]
fn in_range_immediates_retype() {
    let c = Expr::make_const(Type::int(32), 100);
    assert_eq!(lossless_cast(Type::uint(8), &c), Some(Expr::make_const(Type::uint(8), 100)));

    let big = Expr::make_const(Type::int(32), 300);
    assert_eq!(lossless_cast(Type::uint(8), &big), None);
}

#[test]
fn power_of_two_detection() {
    let ty = Type::int(32);
    assert_eq!(is_const_power_of_two_integer(&Expr::make_const(ty, 256)), Some(8));
    assert_eq!(is_const_power_of_two_integer(&Expr::make_const(ty, 1)), Some(0));
    assert_eq!(is_const_power_of_two_integer(&Expr::make_const(ty, 6)), None);
    assert_eq!(is_const_power_of_two_integer(&Expr::make_const(ty, -4)), None);
    // Through a broadcast.
    assert_eq!(is_const_power_of_two_integer(&Expr::make_const(Type::int_vec(32, 64), 16)), Some(4));
}

#[test]
fn minimum_value_is_not_negatable() {
    assert!(is_negative_negatable_const(&Expr::make_const(Type::int(16), -5)));
    assert!(!is_negative_negatable_const(&Expr::make_const(Type::int(16), -32768)));
    assert!(!is_negative_negatable_const(&Expr::make_const(Type::int(16), 5)));
}
