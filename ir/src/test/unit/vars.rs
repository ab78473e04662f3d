//! Free-variable query and substitution tests.

use ripple_dtype::Type;

use crate::{Expr, Stmt, expr_uses_var, stmt_uses_var, substitute};

fn x() -> Expr {
    Expr::var(Type::int(32), "x")
}

#[test]
fn uses_var_sees_free_occurrences() {
    let e = x() + Expr::var(Type::int(32), "y");
    assert!(expr_uses_var(&e, "x"));
    assert!(expr_uses_var(&e, "y"));
    assert!(!expr_uses_var(&e, "z"));
}

#[test]
fn let_binding_shadows_its_body() {
    // x is bound by the let; only the bound value references a free x.
    let e = Expr::let_("x", Expr::make_const(Type::int(32), 1), x() + 2);
    assert!(!expr_uses_var(&e, "x"));

    let e = Expr::let_("x", x() + 1, x() + 2);
    assert!(expr_uses_var(&e, "x"));
}

#[test]
fn stmt_uses_var_respects_for_shadowing() {
    let body = Stmt::evaluate(x());
    let zero = Expr::make_const(Type::int(32), 0);
    let ten = Expr::make_const(Type::int(32), 10);
    let loop_ = Stmt::for_loop("x", zero, ten, body);
    assert!(!stmt_uses_var(&loop_, "x"));
}

#[test]
fn substitute_replaces_free_occurrences() {
    let replacement = Expr::make_const(Type::int(32), 7);
    let result = substitute("x", &replacement, &(x() + x()));
    assert_eq!(result, replacement.clone() + replacement);
}

#[test]
fn substitute_respects_shadowing() {
    let inner = Expr::let_("x", Expr::make_const(Type::int(32), 1), x());
    let replacement = Expr::make_const(Type::int(32), 7);
    let result = substitute("x", &replacement, &inner);
    // The body's x refers to the inner binding and stays.
    let expected = Expr::let_("x", Expr::make_const(Type::int(32), 1), x());
    assert_eq!(result, expected);
}
