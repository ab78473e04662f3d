//! Plain-text rendering of expressions and statements, used by
//! diagnostics and test output.

use std::fmt;

use crate::{BinOp, Expr, ExprKind, Stmt, StmtKind};

fn op_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
        BinOp::And => "&&",
        BinOp::Or => "||",
        BinOp::Min | BinOp::Max => unreachable!("min/max print as calls"),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::IntImm(v) => write!(f, "{v}"),
            ExprKind::UIntImm(v) => write!(f, "{v}"),
            ExprKind::Variable { name } => write!(f, "{name}"),
            ExprKind::Cast { value } => write!(f, "{}({value})", self.ty()),
            ExprKind::Broadcast { value, lanes } => write!(f, "x{lanes}({value})"),
            ExprKind::Ramp { base, stride, lanes } => write!(f, "ramp({base}, {stride}, {lanes})"),
            ExprKind::Binary { op: BinOp::Min, a, b } => write!(f, "min({a}, {b})"),
            ExprKind::Binary { op: BinOp::Max, a, b } => write!(f, "max({a}, {b})"),
            ExprKind::Binary { op, a, b } => write!(f, "({a} {} {b})", op_symbol(*op)),
            ExprKind::Not { value } => write!(f, "!{value}"),
            ExprKind::Select { cond, true_value, false_value } => {
                write!(f, "select({cond}, {true_value}, {false_value})")
            }
            ExprKind::Load { name, index } => write!(f, "{name}[{index}]"),
            ExprKind::Call { name, args, .. } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            ExprKind::Let { name, value, body } => write!(f, "(let {name} = {value} in {body})"),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            StmtKind::LetStmt { name, value, body } => write!(f, "let {name} = {value};\n{body}"),
            StmtKind::For { name, min, extent, body } => {
                write!(f, "for ({name}, {min}, {extent}) {{\n{body}\n}}")
            }
            StmtKind::Store { name, value, index } => write!(f, "{name}[{index}] = {value};"),
            StmtKind::Block { stmts } => {
                for (i, s) in stmts.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{s}")?;
                }
                Ok(())
            }
            StmtKind::Evaluate { value } => write!(f, "evaluate({value});"),
        }
    }
}
