//! Common subexpression elimination tests.

use ripple_dtype::Type;

use crate::{Expr, EvalEnv, common_subexpression_elimination, eval_expr, ExprKind};

#[test]
fn repeated_subtrees_are_bound_once() {
    let x = Expr::var(Type::int(32), "x");
    let y = Expr::var(Type::int(32), "y");
    let sum = x.clone() + y.clone();
    let e = sum.clone() * sum.clone();

    let result = common_subexpression_elimination(&e);
    let ExprKind::Let { name, value, body } = result.kind() else {
        panic!("expected a let, got {result}");
    };
    assert_eq!(value, &sum);
    let var = Expr::var(sum.ty(), name.clone());
    assert_eq!(body, &(var.clone() * var));
}

#[test]
fn cheap_subtrees_are_left_alone() {
    let x = Expr::var(Type::int(32), "x");
    let e = x.clone() + x.clone();
    let result = common_subexpression_elimination(&e);
    assert_eq!(result, e);
}

#[test]
fn unique_subtrees_are_left_alone() {
    let x = Expr::var(Type::int(32), "x");
    let y = Expr::var(Type::int(32), "y");
    let e = (x.clone() + 1) * (y.clone() + 2);
    let result = common_subexpression_elimination(&e);
    assert_eq!(result, e);
}

#[test]
fn cse_preserves_value() {
    let x = Expr::var(Type::int(32), "x");
    let y = Expr::var(Type::int(32), "y");
    let sum = x + y;
    let e = (sum.clone() * sum.clone()) - (sum.clone() + 1);

    let result = common_subexpression_elimination(&e);
    let mut env = EvalEnv::default();
    env.vars.insert("x".into(), vec![11]);
    env.vars.insert("y".into(), vec![31]);
    assert_eq!(eval_expr(&e, &env), eval_expr(&result, &env));
}
