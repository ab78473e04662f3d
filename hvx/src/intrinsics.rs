//! HVX intrinsic call builders and name predicates.
//!
//! Interleave and deinterleave exist per lane width; both preserve the
//! type of their operand exactly. Requesting them for a lane width the
//! hardware has no permutation for is an internal error.

use ripple_ir::{CallType, Expr};

pub const INTERLEAVE_PREFIX: &str = "halide.hexagon.interleave";
pub const DEINTERLEAVE_PREFIX: &str = "halide.hexagon.deinterleave";

pub fn native_interleave(x: Expr) -> Expr {
    let name = match x.ty().bits {
        8 => "halide.hexagon.interleave.vb",
        16 => "halide.hexagon.interleave.vh",
        32 => "halide.hexagon.interleave.vw",
        _ => panic!("cannot interleave native vectors of type {} in {x}", x.ty()),
    };
    let ty = x.ty();
    Expr::call(ty, name, [x], CallType::PureExtern)
}

pub fn native_deinterleave(x: Expr) -> Expr {
    let name = match x.ty().bits {
        8 => "halide.hexagon.deinterleave.vb",
        16 => "halide.hexagon.deinterleave.vh",
        32 => "halide.hexagon.deinterleave.vw",
        _ => panic!("cannot deinterleave native vectors of type {} in {x}", x.ty()),
    };
    let ty = x.ty();
    Expr::call(ty, name, [x], CallType::PureExtern)
}

fn is_native_interleave_op(x: &Expr, prefix: &str) -> bool {
    match x.as_call() {
        Some((name, args)) => args.len() == 1 && name.starts_with(prefix),
        None => false,
    }
}

pub fn is_native_interleave(x: &Expr) -> bool {
    is_native_interleave_op(x, INTERLEAVE_PREFIX)
}

pub fn is_native_deinterleave(x: &Expr) -> bool {
    is_native_interleave_op(x, DEINTERLEAVE_PREFIX)
}
