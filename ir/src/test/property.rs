//! Property tests for the simplifier and evaluation semantics.

use proptest::prelude::*;

use ripple_dtype::Type;

use crate::eval::{floor_div, floor_mod};
use crate::{BinOp, EvalEnv, Expr, eval_expr, simplify};

fn foldable_op() -> impl Strategy<Value = BinOp> {
    prop_oneof![
        Just(BinOp::Add),
        Just(BinOp::Sub),
        Just(BinOp::Mul),
        Just(BinOp::Min),
        Just(BinOp::Max),
        Just(BinOp::Lt),
        Just(BinOp::Le),
        Just(BinOp::Eq),
    ]
}

proptest! {
    #[test]
    fn division_identity(a in -100_000i64..100_000, b in prop_oneof![-64i64..-1, 1i64..64]) {
        let q = floor_div(a, b);
        let r = floor_mod(a, b);
        prop_assert_eq!(q * b + r, a);
        // The remainder takes the divisor's sign.
        prop_assert!(r == 0 || (r < 0) == (b < 0));
        prop_assert!(r.abs() < b.abs());
    }

    #[test]
    fn constant_folding_agrees_with_evaluation(
        op in foldable_op(),
        a in -32768i64..=32767,
        b in -32768i64..=32767,
    ) {
        let ty = Type::int(16);
        let e = Expr::binary(op, Expr::make_const(ty, a), Expr::make_const(ty, b));
        let env = EvalEnv::default();
        prop_assert_eq!(eval_expr(&simplify(&e), &env), eval_expr(&e, &env));
    }

    #[test]
    fn simplify_preserves_value_with_variables(
        a in -1000i64..1000,
        c1 in -1000i64..1000,
        c2 in -1000i64..1000,
    ) {
        let ty = Type::int(32);
        let x = Expr::var(ty, "x");
        // The difference-of-sums shape the shuffle rewriter depends on.
        let e = (x.clone() + c1) - (x + c2);
        let mut env = EvalEnv::default();
        env.vars.insert("x".into(), vec![a]);
        prop_assert_eq!(eval_expr(&simplify(&e), &env), eval_expr(&e, &env));
    }
}
