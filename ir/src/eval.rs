//! Reference evaluation of expressions over integer vectors.
//!
//! Lane values are held as `i64` and wrapped to the lane type after
//! every operation. Widening intrinsics produce their lanes in the
//! paired even/odd ("deinterleaved") order, so wrapping them in the
//! interleave intrinsic restores natural order; narrowing intrinsics
//! that take deinterleaved operands re-interleave internally. This is
//! what makes rewritten programs evaluate bit-identically to their
//! originals.

use std::collections::HashMap;

use ripple_dtype::Type;

use crate::{BinOp, Expr, ExprKind, ops};

/// Inputs for evaluation: free variables and named buffers.
#[derive(Debug, Default, Clone)]
pub struct EvalEnv {
    pub vars: HashMap<String, Vec<i64>>,
    pub buffers: HashMap<String, Vec<i64>>,
}

/// Evaluate `e`, returning one value per lane.
pub fn eval_expr(e: &Expr, env: &EvalEnv) -> Vec<i64> {
    let mut ev = Evaluator { env, lets: Vec::new() };
    ev.eval(e)
}

struct Evaluator<'a> {
    env: &'a EvalEnv,
    lets: Vec<(String, Vec<i64>)>,
}

impl Evaluator<'_> {
    fn eval(&mut self, e: &Expr) -> Vec<i64> {
        match e.kind() {
            ExprKind::IntImm(v) => vec![*v],
            ExprKind::UIntImm(v) => vec![*v as i64],
            ExprKind::Variable { name } => self.lookup(name),
            ExprKind::Cast { value } => {
                let elem = e.ty().element_of();
                self.eval(value).into_iter().map(|v| elem.wrap(v)).collect()
            }
            ExprKind::Broadcast { value, lanes } => {
                let v = self.eval(value);
                assert_eq!(v.len(), 1, "broadcast of non-scalar");
                vec![v[0]; *lanes as usize]
            }
            ExprKind::Ramp { base, stride, lanes } => {
                let b = self.eval(base)[0];
                let s = self.eval(stride)[0];
                (0..*lanes as i64).map(|i| e.ty().element_of().wrap(b + i * s)).collect()
            }
            ExprKind::Binary { op, a, b } => {
                let lanes = e.ty().lanes;
                let operand_ty = a.ty().element_of();
                let result_ty = e.ty().element_of();
                let va = splat(self.eval(a), lanes);
                let vb = splat(self.eval(b), lanes);
                va.into_iter()
                    .zip(vb)
                    .map(|(x, y)| result_ty.wrap(binop(*op, operand_ty, x, y)))
                    .collect()
            }
            ExprKind::Not { value } => self.eval(value).into_iter().map(|v| (v == 0) as i64).collect(),
            ExprKind::Select { cond, true_value, false_value } => {
                let lanes = e.ty().lanes;
                let c = splat(self.eval(cond), lanes);
                let t = splat(self.eval(true_value), lanes);
                let f = splat(self.eval(false_value), lanes);
                c.into_iter().zip(t.into_iter().zip(f)).map(|(c, (t, f))| if c != 0 { t } else { f }).collect()
            }
            ExprKind::Load { name, index } => {
                let buffer = self.env.buffers.get(name).unwrap_or_else(|| panic!("eval: no buffer '{name}'"));
                self.eval(index).into_iter().map(|i| buffer[i as usize]).collect()
            }
            ExprKind::Call { name, args, .. } => self.eval_call(e, name, args),
            ExprKind::Let { name, value, body } => {
                let v = self.eval(value);
                self.lets.push((name.clone(), v));
                let result = self.eval(body);
                self.lets.pop();
                result
            }
        }
    }

    fn lookup(&self, name: &str) -> Vec<i64> {
        for (n, v) in self.lets.iter().rev() {
            if n == name {
                return v.clone();
            }
        }
        self.env.vars.get(name).unwrap_or_else(|| panic!("eval: unbound variable '{name}'")).clone()
    }

    fn eval_call(&mut self, e: &Expr, name: &str, args: &[Expr]) -> Vec<i64> {
        let lanes = e.ty().lanes;
        let elem = e.ty().element_of();
        let arg = |ev: &mut Self, i: usize| splat(ev.eval(&args[i]), lanes);

        match name {
            ops::SHIFT_LEFT => {
                let (a, b) = (arg(self, 0), arg(self, 1));
                zip_wrap(elem, a, b, |x, y| x.wrapping_shl(y as u32))
            }
            ops::SHIFT_RIGHT => {
                let (a, b) = (arg(self, 0), arg(self, 1));
                zip_wrap(elem, a, b, |x, y| x >> (y as u32).min(63))
            }
            ops::BITWISE_AND => {
                let (a, b) = (arg(self, 0), arg(self, 1));
                zip_wrap(elem, a, b, |x, y| x & y)
            }
            ops::BITWISE_OR => {
                let (a, b) = (arg(self, 0), arg(self, 1));
                zip_wrap(elem, a, b, |x, y| x | y)
            }
            ops::BITWISE_XOR => {
                let (a, b) = (arg(self, 0), arg(self, 1));
                zip_wrap(elem, a, b, |x, y| x ^ y)
            }
            ops::BITWISE_NOT => arg(self, 0).into_iter().map(|v| elem.wrap(!v)).collect(),
            ops::COUNT_LEADING_ZEROS => {
                let bits = elem.bits as u32;
                arg(self, 0).into_iter().map(|v| clz(v, bits)).collect()
            }
            ops::ABS => arg(self, 0).into_iter().map(|v| elem.wrap(v.wrapping_abs())).collect(),
            ops::ABSD => {
                let (a, b) = (arg(self, 0), arg(self, 1));
                zip_wrap(elem, a, b, |x, y| (x - y).abs())
            }
            ops::DYNAMIC_SHUFFLE => {
                let lut = self.eval(&args[0]);
                let idx = arg(self, 1);
                idx.into_iter().map(|i| lut[i as usize]).collect()
            }
            _ => {
                let suffix = name
                    .strip_prefix("halide.hexagon.")
                    .unwrap_or_else(|| panic!("eval: unknown call '{name}'"));
                self.eval_hexagon(suffix, e, args)
            }
        }
    }

    fn eval_hexagon(&mut self, op: &str, e: &Expr, args: &[Expr]) -> Vec<i64> {
        let lanes = e.ty().lanes;
        let elem = e.ty().element_of();
        let arg = |ev: &mut Self, i: usize| splat(ev.eval(&args[i]), lanes);
        // Scalar operands stay scalar; only splat when asked.
        let scalar = |ev: &mut Self, i: usize| ev.eval(&args[i])[0];

        match op {
            "interleave.vb" | "interleave.vh" | "interleave.vw" => interleave(&arg(self, 0)),
            "deinterleave.vb" | "deinterleave.vh" | "deinterleave.vw" => deinterleave(&arg(self, 0)),

            "avg.vub.vub" | "avg.vuh.vuh" | "avg.vh.vh" | "avg.vw.vw" => {
                let (a, b) = (arg(self, 0), arg(self, 1));
                zip_wrap(elem, a, b, |x, y| floor_div(x + y, 2))
            }
            "avg_rnd.vub.vub" | "avg_rnd.vuh.vuh" | "avg_rnd.vh.vh" | "avg_rnd.vw.vw" => {
                let (a, b) = (arg(self, 0), arg(self, 1));
                zip_wrap(elem, a, b, |x, y| floor_div(x + y + 1, 2))
            }
            "navg.vub.vub" | "navg.vh.vh" | "navg.vw.vw" => {
                let (a, b) = (arg(self, 0), arg(self, 1));
                zip_sat(elem, a, b, |x, y| floor_div(x - y, 2))
            }

            "satub_add.vub.vub" | "satuh_add.vuh.vuh" | "sath_add.vh.vh" | "satw_add.vw.vw" => {
                let (a, b) = (arg(self, 0), arg(self, 1));
                zip_sat(elem, a, b, |x, y| x + y)
            }
            "satub_sub.vub.vub" | "satuh_sub.vuh.vuh" | "sath_sub.vh.vh" | "satw_sub.vw.vw" => {
                let (a, b) = (arg(self, 0), arg(self, 1));
                zip_sat(elem, a, b, |x, y| x - y)
            }

            "trunc_satub_rnd.vh" | "trunc_satb_rnd.vh" => {
                interleave(&arg(self, 0)).into_iter().map(|x| sat(elem, floor_div(x + 128, 256))).collect()
            }
            "trunc_satuh_rnd.vw" | "trunc_sath_rnd.vw" => {
                interleave(&arg(self, 0)).into_iter().map(|x| sat(elem, floor_div(x + 32768, 65536))).collect()
            }

            "trunc_satub_shr.vh.h" | "trunc_satuh_shr.vw.w" | "trunc_sath_shr.vw.w" => {
                let n = scalar(self, 1) as u32;
                interleave(&arg(self, 0)).into_iter().map(|x| sat(elem, x >> n)).collect()
            }
            "trunc_shr.vw.w" => {
                let n = scalar(self, 1) as u32;
                interleave(&arg(self, 0)).into_iter().map(|x| elem.wrap(x >> n)).collect()
            }
            "trunclo.vh" => interleave(&arg(self, 0)).into_iter().map(|x| elem.wrap(floor_div(x, 256))).collect(),
            "trunclo.vw" => interleave(&arg(self, 0)).into_iter().map(|x| elem.wrap(floor_div(x, 65536))).collect(),

            "pack.vh" | "pack.vw" => arg(self, 0).into_iter().map(|x| elem.wrap(x)).collect(),
            "pack_satub.vh" | "pack_satb.vh" | "pack_satuh.vw" | "pack_sath.vw" => {
                arg(self, 0).into_iter().map(|x| sat(elem, x)).collect()
            }
            "trunc.vh" | "trunc.vw" => interleave(&arg(self, 0)).into_iter().map(|x| elem.wrap(x)).collect(),
            "trunc_satub.vh" | "trunc_sath.vw" => {
                interleave(&arg(self, 0)).into_iter().map(|x| sat(elem, x)).collect()
            }

            "zxt.vub" | "zxt.vuh" | "sxt.vb" | "sxt.vh" => deinterleave(&arg(self, 0)),

            "mpy.vub.ub" | "mpy.vub.b" | "mpy.vuh.uh" | "mpy.vh.h" | "mpy.vub.vub" | "mpy.vuh.vuh"
            | "mpy.vb.vb" | "mpy.vh.vh" | "mpy.vub.vb" | "mpy.vh.vuh" => {
                let (a, b) = (arg(self, 0), arg(self, 1));
                deinterleave(&zip_wrap(elem, a, b, |x, y| x * y))
            }

            "add_mpy.vuh.vub.ub" | "add_mpy.vh.vub.b" | "add_mpy.vuw.vuh.uh" | "add_mpy.vuh.vub.vub"
            | "add_mpy.vuw.vuh.vuh" | "add_mpy.vh.vb.vb" | "add_mpy.vw.vh.vh" | "add_mpy.vh.vub.vb"
            | "add_mpy.vw.vh.vuh" => {
                let acc = interleave(&arg(self, 0));
                let (a, b) = (arg(self, 1), arg(self, 2));
                let sums: Vec<i64> =
                    acc.into_iter().zip(a.into_iter().zip(b)).map(|(acc, (x, y))| elem.wrap(acc + x * y)).collect();
                deinterleave(&sums)
            }
            "satw_add_mpy.vw.vh.h" => {
                let acc = interleave(&arg(self, 0));
                let (a, b) = (arg(self, 1), arg(self, 2));
                let sums: Vec<i64> =
                    acc.into_iter().zip(a.into_iter().zip(b)).map(|(acc, (x, y))| sat(elem, acc + x * y)).collect();
                deinterleave(&sums)
            }

            "add_mul.vh.vh.b" | "add_mul.vw.vw.h" | "add_mul.vh.vh.vh" => {
                let acc = arg(self, 0);
                let (a, b) = (arg(self, 1), arg(self, 2));
                acc.into_iter().zip(a.into_iter().zip(b)).map(|(acc, (x, y))| elem.wrap(acc + x * y)).collect()
            }

            "add_shr.vw.vw.w" => {
                let (a, b) = (arg(self, 0), arg(self, 1));
                let n = scalar(self, 2) as u32;
                a.into_iter().zip(b).map(|(x, y)| elem.wrap(x + (y >> n))).collect()
            }
            "add_shl.vw.vw.w" => {
                let (a, b) = (arg(self, 0), arg(self, 1));
                let n = scalar(self, 2) as u32;
                a.into_iter().zip(b).map(|(x, y)| elem.wrap(x + (y.wrapping_shl(n)))).collect()
            }

            "cls.vh" | "cls.vw" => {
                let bits = args[0].ty().bits as u32;
                arg(self, 0)
                    .into_iter()
                    .map(|x| {
                        let not_x = args[0].ty().element_of().wrap(!x);
                        clz(x, bits).max(clz(not_x, bits)) - 1
                    })
                    .collect()
            }

            _ => panic!("eval: unknown hexagon intrinsic 'halide.hexagon.{op}'"),
        }
    }
}

/// Division rounding toward negative infinity. This is the IR's
/// division; it makes `x / 2^n` and `x >> n` agree on every input,
/// which the shift-for-division rewrites depend on.
pub fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && ((r < 0) != (b < 0)) { q - 1 } else { q }
}

/// Remainder matching [`floor_div`]: takes the sign of the divisor.
pub fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a % b;
    if r != 0 && ((r < 0) != (b < 0)) { r + b } else { r }
}

fn splat(v: Vec<i64>, lanes: u32) -> Vec<i64> {
    if v.len() == 1 && lanes > 1 { vec![v[0]; lanes as usize] } else { v }
}

fn zip_wrap(elem: Type, a: Vec<i64>, b: Vec<i64>, f: impl Fn(i64, i64) -> i64) -> Vec<i64> {
    a.into_iter().zip(b).map(|(x, y)| elem.wrap(f(x, y))).collect()
}

fn zip_sat(elem: Type, a: Vec<i64>, b: Vec<i64>, f: impl Fn(i64, i64) -> i64) -> Vec<i64> {
    a.into_iter().zip(b).map(|(x, y)| sat(elem, f(x, y))).collect()
}

fn sat(elem: Type, v: i64) -> i64 {
    v.clamp(elem.min_int(), elem.max_int())
}

fn clz(v: i64, bits: u32) -> i64 {
    let masked = (v as u64) & (u64::MAX >> (64 - bits));
    (masked.leading_zeros() - (64 - bits)) as i64
}

/// Natural interleave of a deinterleaved vector: the first half
/// provides the even lanes, the second half the odd lanes.
fn interleave(v: &[i64]) -> Vec<i64> {
    assert!(v.len() % 2 == 0, "interleave of odd-length vector");
    let half = v.len() / 2;
    let mut out = Vec::with_capacity(v.len());
    for i in 0..half {
        out.push(v[i]);
        out.push(v[half + i]);
    }
    out
}

/// Gather even lanes, then odd lanes.
fn deinterleave(v: &[i64]) -> Vec<i64> {
    let mut out: Vec<i64> = v.iter().copied().step_by(2).collect();
    out.extend(v.iter().copied().skip(1).step_by(2));
    out
}

fn binop(op: BinOp, operand_ty: Type, a: i64, b: i64) -> i64 {
    let unsigned = operand_ty.is_uint();
    match op {
        BinOp::Add => a.wrapping_add(b),
        BinOp::Sub => a.wrapping_sub(b),
        BinOp::Mul => a.wrapping_mul(b),
        BinOp::Div => {
            assert!(b != 0, "eval: division by zero");
            floor_div(a, b)
        }
        BinOp::Mod => {
            assert!(b != 0, "eval: modulo by zero");
            floor_mod(a, b)
        }
        BinOp::Min => {
            if unsigned {
                ((a as u64).min(b as u64)) as i64
            } else {
                a.min(b)
            }
        }
        BinOp::Max => {
            if unsigned {
                ((a as u64).max(b as u64)) as i64
            } else {
                a.max(b)
            }
        }
        BinOp::Eq => (a == b) as i64,
        BinOp::Ne => (a != b) as i64,
        BinOp::Lt => (if unsigned { (a as u64) < (b as u64) } else { a < b }) as i64,
        BinOp::Le => (if unsigned { (a as u64) <= (b as u64) } else { a <= b }) as i64,
        BinOp::Gt => (if unsigned { (a as u64) > (b as u64) } else { a > b }) as i64,
        BinOp::Ge => (if unsigned { (a as u64) >= (b as u64) } else { a >= b }) as i64,
        BinOp::And => ((a != 0) && (b != 0)) as i64,
        BinOp::Or => ((a != 0) || (b != 0)) as i64,
    }
}
