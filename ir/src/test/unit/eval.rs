//! Reference evaluator tests.

use ripple_dtype::Type;
use test_case::test_case;

use crate::eval::{floor_div, floor_mod};
use crate::{CallType, EvalEnv, Expr, eval_expr, ops, shift_right};

fn env_with(name: &str, values: Vec<i64>) -> EvalEnv {
    let mut env = EvalEnv::default();
    env.vars.insert(name.to_string(), values);
    env
}

#[test_case(7, 2, 3, 1 ; "pos_pos")]
#[test_case(-7, 2, -4, 1 ; "neg_pos")]
#[test_case(7, -2, -4, -1 ; "pos_neg")]
#[test_case(-7, -2, 3, -1 ; "neg_neg")]
fn floor_division_semantics(a: i64, b: i64, q: i64, r: i64) {
    assert_eq!(floor_div(a, b), q);
    assert_eq!(floor_mod(a, b), r);
    assert_eq!(q * b + r, a);
}

#[test]
fn arithmetic_wraps_to_the_lane_type() {
    let ty = Type::uint_vec(8, 2);
    let a = Expr::var(ty, "a");
    let env = env_with("a", vec![200, 100]);
    assert_eq!(eval_expr(&(a + 100), &env), vec![44, 200]);
}

#[test]
fn shift_right_is_arithmetic_for_signed() {
    let ty = Type::int_vec(16, 2);
    let a = Expr::var(ty, "a");
    let e = shift_right(a, Expr::make_const(ty, 2));
    let env = env_with("a", vec![-7, 7]);
    assert_eq!(eval_expr(&e, &env), vec![-2, 1]);
}

#[test]
fn division_by_power_of_two_matches_shift() {
    let ty = Type::int_vec(16, 4);
    let a = Expr::var(ty, "a");
    let env = env_with("a", vec![-7, -8, 7, -32768]);
    let divided = eval_expr(&(a.clone() / 4), &env);
    let shifted = eval_expr(&shift_right(a, Expr::make_const(ty, 2)), &env);
    assert_eq!(divided, shifted);
}

#[test]
fn interleave_inverts_deinterleave() {
    let ty = Type::uint_vec(16, 8);
    let a = Expr::var(ty, "a");
    let deint = Expr::call(ty, "halide.hexagon.deinterleave.vh", [a.clone()], CallType::PureExtern);
    let round_trip = Expr::call(ty, "halide.hexagon.interleave.vh", [deint], CallType::PureExtern);

    let values = vec![1, 2, 3, 4, 5, 6, 7, 8];
    let env = env_with("a", values.clone());
    assert_eq!(eval_expr(&round_trip, &env), values);

    let deint_only = Expr::call(ty, "halide.hexagon.deinterleave.vh", [a], CallType::PureExtern);
    assert_eq!(eval_expr(&deint_only, &env), vec![1, 3, 5, 7, 2, 4, 6, 8]);
}

#[test]
fn saturating_add_clamps() {
    let ty = Type::uint_vec(8, 2);
    let a = Expr::var(ty, "a");
    let b = Expr::var(ty, "b");
    let e = Expr::call(ty, "halide.hexagon.satub_add.vub.vub", [a, b], CallType::PureExtern);
    let mut env = env_with("a", vec![200, 10]);
    env.vars.insert("b".into(), vec![100, 20]);
    assert_eq!(eval_expr(&e, &env), vec![255, 30]);
}

#[test]
fn count_leading_zeros_respects_bit_width() {
    let ty = Type::uint_vec(16, 3);
    let a = Expr::var(ty, "a");
    let e = crate::count_leading_zeros(a);
    let env = env_with("a", vec![0, 1, 0x8000]);
    assert_eq!(eval_expr(&e, &env), vec![16, 15, 0]);
}

#[test]
fn dynamic_shuffle_indexes_the_lut() {
    let lut_ty = Type::uint_vec(16, 4);
    let idx_ty = Type::uint_vec(8, 2);
    let lut = Expr::var(lut_ty, "lut");
    let idx = Expr::var(idx_ty, "idx");
    let zero = Expr::make_const(Type::int(32), 0);
    let four = Expr::make_const(Type::int(32), 4);
    let e = Expr::call(Type::uint_vec(16, 2), ops::DYNAMIC_SHUFFLE, [lut, idx, zero, four], CallType::PureIntrinsic);

    let mut env = env_with("lut", vec![10, 20, 30, 40]);
    env.vars.insert("idx".into(), vec![3, 0]);
    assert_eq!(eval_expr(&e, &env), vec![40, 10]);
}

#[test]
fn let_bindings_evaluate_in_scope() {
    let ty = Type::int(32);
    let v = Expr::var(ty, "v");
    let e = Expr::let_("v", Expr::make_const(ty, 5), v + 1);
    assert_eq!(eval_expr(&e, &EvalEnv::default()), vec![6]);
}
