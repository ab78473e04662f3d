//! Simplifier tests.

use ripple_dtype::Type;
use test_case::test_case;

use crate::{BinOp, Expr, simplify};

fn i32_imm(v: i64) -> Expr {
    Expr::make_const(Type::int(32), v)
}

#[test_case(BinOp::Add, 7, 5, 12)]
#[test_case(BinOp::Sub, 7, 5, 2)]
#[test_case(BinOp::Mul, 7, 5, 35)]
#[test_case(BinOp::Div, 7, 2, 3)]
#[test_case(BinOp::Div, -7, 2, -4; "division rounds toward negative infinity")]
#[test_case(BinOp::Mod, -7, 4, 1; "remainder takes the divisor sign")]
#[test_case(BinOp::Min, 7, 5, 5)]
#[test_case(BinOp::Max, 7, 5, 7)]
fn constant_folding(op: BinOp, a: i64, b: i64, expected: i64) {
    let e = Expr::binary(op, i32_imm(a), i32_imm(b));
    assert_eq!(simplify(&e), i32_imm(expected));
}

#[test]
fn folding_wraps_at_the_type_width() {
    let ty = Type::uint(8);
    let e = Expr::binary(BinOp::Add, Expr::make_const(ty, 200), Expr::make_const(ty, 100));
    assert_eq!(simplify(&e), Expr::make_const(ty, 44));
}

#[test]
fn unsigned_comparison_is_unsigned() {
    let ty = Type::uint(8);
    let e = Expr::binary(BinOp::Lt, Expr::make_const(ty, 200), Expr::make_const(ty, 100));
    assert_eq!(simplify(&e), Expr::make_const(Type::bool_vec(1), 0));
}

#[test]
fn broadcast_constants_fold() {
    let ty = Type::int_vec(16, 64);
    let e = Expr::make_const(ty, 6) * Expr::make_const(ty, 7);
    assert_eq!(simplify(&e), Expr::make_const(ty, 42));
}

#[test]
fn identities() {
    let x = Expr::var(Type::int_vec(32, 16), "x");
    assert_eq!(simplify(&(x.clone() + 0)), x);
    assert_eq!(simplify(&(x.clone() * 1)), x);
    assert_eq!(simplify(&(x.clone() / 1)), x);
    assert_eq!(simplify(&(x.clone() - 0)), x);
    assert_eq!(simplify(&(x.clone() * 0)), Expr::zero(x.ty()));
}

#[test]
fn difference_of_sums_cancels() {
    let base = Expr::var(Type::int(32), "base");
    let e = (base.clone() + 200) - base.clone();
    assert_eq!(simplify(&e), i32_imm(200));

    let e = base.clone() - (base.clone() + 30);
    assert_eq!(simplify(&e), i32_imm(-30));

    let e = base.clone() - base;
    assert_eq!(simplify(&e), i32_imm(0));
}

#[test]
fn negation_of_constant_folds() {
    let c = Expr::make_const(Type::int_vec(16, 8), 25);
    assert_eq!(simplify(&-c), Expr::make_const(Type::int_vec(16, 8), -25));
}

#[test]
fn cast_of_constant_folds_with_wrap() {
    let e = Expr::cast(Type::uint(8), i32_imm(300));
    assert_eq!(simplify(&e), Expr::make_const(Type::uint(8), 44));
}

#[test]
fn select_with_constant_condition() {
    let t = i32_imm(1);
    let f = i32_imm(2);
    let cond = Expr::make_const(Type::bool_vec(1), 1);
    assert_eq!(simplify(&Expr::select(cond, t.clone(), f)), t);
}

#[test]
fn trivial_let_values_inline() {
    let x = Expr::var(Type::int(32), "x");
    let body = Expr::var(Type::int(32), "v") + 1;
    let e = Expr::let_("v", x.clone(), body);
    assert_eq!(simplify(&e), x + 1);
}

#[test]
fn simplify_is_idempotent_on_mixed_expressions() {
    let x = Expr::var(Type::int_vec(32, 16), "x");
    let e = (x.clone() + 0) * (i32_imm(3) + 4) - x;
    let once = simplify(&e);
    assert_eq!(simplify(&once), once);
}
