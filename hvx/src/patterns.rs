//! Pattern tables for the instruction matcher.
//!
//! Tables are scanned in declaration order and the first match wins, so
//! specific patterns must precede general ones; the generic MAC at the
//! end of [`ADDS`] depends on this.

use enumset::{EnumSet, EnumSetType};
use once_cell::sync::Lazy;

use ripple_dtype::Type;
use ripple_ir::{
    Expr, ExprKind, Mutator, bitwise_not, count_leading_zeros, max, min, mutate::recurse_expr,
};

#[derive(Debug, EnumSetType)]
pub enum PatternFlag {
    /// Wrap the produced intrinsic call in `native_interleave`.
    InterleaveResult,
    /// Swap operands 0 and 1 prior to substitution.
    SwapOps01,
    /// Swap operands 1 and 2 prior to substitution.
    SwapOps12,
    /// Operand 1 must be a positive power of two; replace it with its
    /// base-2 logarithm.
    ExactLog2Op1,
    ExactLog2Op2,
    /// Deinterleave the given operand before substitution.
    DeinterleaveOp0,
    DeinterleaveOp1,
    DeinterleaveOp2,
    /// Replace the given operand with its half-width equivalent, or
    /// fail the match.
    NarrowOp0,
    NarrowOp1,
    NarrowOp2,
    /// Same, but narrow to the unsigned half-width type.
    NarrowUnsignedOp0,
    NarrowUnsignedOp1,
    NarrowUnsignedOp2,
}

impl PatternFlag {
    pub fn narrow(i: usize) -> Option<Self> {
        [Self::NarrowOp0, Self::NarrowOp1, Self::NarrowOp2].get(i).copied()
    }

    pub fn narrow_unsigned(i: usize) -> Option<Self> {
        [Self::NarrowUnsignedOp0, Self::NarrowUnsignedOp1, Self::NarrowUnsignedOp2].get(i).copied()
    }

    pub fn deinterleave(i: usize) -> Option<Self> {
        [Self::DeinterleaveOp0, Self::DeinterleaveOp1, Self::DeinterleaveOp2].get(i).copied()
    }

    /// Operand index is 1-based; operand 0 never holds a shift amount.
    pub fn exact_log2(i: usize) -> Option<Self> {
        match i {
            1 => Some(Self::ExactLog2Op1),
            2 => Some(Self::ExactLog2Op2),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct Pattern {
    /// Name of the intrinsic to emit.
    pub intrin: &'static str,
    /// The expression shape to match against.
    pub pattern: Expr,
    pub flags: EnumSet<PatternFlag>,
}

impl Pattern {
    fn new(intrin: &'static str, pattern: Expr, flags: impl Into<EnumSet<PatternFlag>>) -> Self {
        Self { intrin, pattern, flags: flags.into() }
    }

    fn plain(intrin: &'static str, pattern: Expr) -> Self {
        Self { intrin, pattern, flags: EnumSet::new() }
    }
}

// Wildcards. Scalar wildcards carry a fully specified type; the `x`
// variants match a vector of any lane count.

pub fn wild_u8() -> Expr {
    Expr::var(Type::uint(8), "*")
}
pub fn wild_u16() -> Expr {
    Expr::var(Type::uint(16), "*")
}
pub fn wild_u32() -> Expr {
    Expr::var(Type::uint(32), "*")
}
pub fn wild_i8() -> Expr {
    Expr::var(Type::int(8), "*")
}
pub fn wild_i16() -> Expr {
    Expr::var(Type::int(16), "*")
}
pub fn wild_i32() -> Expr {
    Expr::var(Type::int(32), "*")
}

pub fn wild_u8x() -> Expr {
    Expr::var(Type::uint_vec(8, 0), "*")
}
pub fn wild_u16x() -> Expr {
    Expr::var(Type::uint_vec(16, 0), "*")
}
pub fn wild_u32x() -> Expr {
    Expr::var(Type::uint_vec(32, 0), "*")
}
pub fn wild_u64x() -> Expr {
    Expr::var(Type::uint_vec(64, 0), "*")
}
pub fn wild_i8x() -> Expr {
    Expr::var(Type::int_vec(8, 0), "*")
}
pub fn wild_i16x() -> Expr {
    Expr::var(Type::int_vec(16, 0), "*")
}
pub fn wild_i32x() -> Expr {
    Expr::var(Type::int_vec(32, 0), "*")
}
pub fn wild_i64x() -> Expr {
    Expr::var(Type::int_vec(64, 0), "*")
}

/// A scalar broadcast with wildcard lane count.
pub fn bc(e: Expr) -> Expr {
    Expr::broadcast(e, 0)
}

// Cast shorthands, lane-count preserving.

pub fn u8(e: Expr) -> Expr {
    let t = Type::uint_vec(8, e.ty().lanes);
    Expr::cast(t, e)
}
pub fn i8(e: Expr) -> Expr {
    let t = Type::int_vec(8, e.ty().lanes);
    Expr::cast(t, e)
}
pub fn u16(e: Expr) -> Expr {
    let t = Type::uint_vec(16, e.ty().lanes);
    Expr::cast(t, e)
}
pub fn i16(e: Expr) -> Expr {
    let t = Type::int_vec(16, e.ty().lanes);
    Expr::cast(t, e)
}
pub fn u32(e: Expr) -> Expr {
    let t = Type::uint_vec(32, e.ty().lanes);
    Expr::cast(t, e)
}
pub fn i32(e: Expr) -> Expr {
    let t = Type::int_vec(32, e.ty().lanes);
    Expr::cast(t, e)
}

fn clamp(x: Expr, lo: i64, hi: i64) -> Expr {
    let ty = x.ty();
    max(min(x, Expr::make_const(ty, hi)), Expr::make_const(ty, lo))
}

/// The simplifier removes `max(x, 0)` on unsigned values, so the
/// saturating patterns must reflect the same shape.
fn simplified_clamp(x: Expr, lo: i64, hi: i64) -> Expr {
    if x.ty().is_uint() && lo == 0 {
        let ty = x.ty();
        min(x, Expr::make_const(ty, hi))
    } else {
        clamp(x, lo, hi)
    }
}

// Saturating cast shorthands.

pub fn u8c(e: Expr) -> Expr {
    u8(simplified_clamp(e, 0, 255))
}
pub fn i8c(e: Expr) -> Expr {
    i8(simplified_clamp(e, -128, 127))
}
pub fn u16c(e: Expr) -> Expr {
    u16(simplified_clamp(e, 0, 65535))
}
pub fn i16c(e: Expr) -> Expr {
    i16(simplified_clamp(e, -32768, 32767))
}
pub fn i32c(e: Expr) -> Expr {
    i32(simplified_clamp(e, -2147483648, 2147483647))
}

pub static CASTS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    use PatternFlag::*;
    let narrow_ops = NarrowOp0 | NarrowOp1 | NarrowOp2;
    let narrow_unsigned_ops = NarrowUnsignedOp0 | NarrowUnsignedOp1 | NarrowUnsignedOp2;
    vec![
        // Averaging
        Pattern::new("halide.hexagon.avg.vub.vub", u8((wild_u16x() + wild_u16x()) / 2), narrow_ops),
        Pattern::new("halide.hexagon.avg.vuh.vuh", u16((wild_u32x() + wild_u32x()) / 2), narrow_ops),
        Pattern::new("halide.hexagon.avg.vh.vh", i16((wild_i32x() + wild_i32x()) / 2), narrow_ops),
        Pattern::new("halide.hexagon.avg.vw.vw", i32((wild_i64x() + wild_i64x()) / 2), narrow_ops),
        Pattern::new("halide.hexagon.avg_rnd.vub.vub", u8((wild_u16x() + wild_u16x() + 1) / 2), narrow_ops),
        Pattern::new("halide.hexagon.avg_rnd.vuh.vuh", u16((wild_u32x() + wild_u32x() + 1) / 2), narrow_ops),
        Pattern::new("halide.hexagon.avg_rnd.vh.vh", i16((wild_i32x() + wild_i32x() + 1) / 2), narrow_ops),
        Pattern::new("halide.hexagon.avg_rnd.vw.vw", i32((wild_i64x() + wild_i64x() + 1) / 2), narrow_ops),
        Pattern::new("halide.hexagon.navg.vub.vub", i8c((wild_i16x() - wild_i16x()) / 2), narrow_unsigned_ops),
        Pattern::new("halide.hexagon.navg.vh.vh", i16c((wild_i32x() - wild_i32x()) / 2), narrow_ops),
        Pattern::new("halide.hexagon.navg.vw.vw", i32c((wild_i64x() - wild_i64x()) / 2), narrow_ops),
        // vnavg.uw doesn't exist.

        // Saturating add/subtract
        Pattern::new("halide.hexagon.satub_add.vub.vub", u8c(wild_u16x() + wild_u16x()), narrow_ops),
        Pattern::new("halide.hexagon.satuh_add.vuh.vuh", u16c(wild_u32x() + wild_u32x()), narrow_ops),
        Pattern::new("halide.hexagon.sath_add.vh.vh", i16c(wild_i32x() + wild_i32x()), narrow_ops),
        Pattern::new("halide.hexagon.satw_add.vw.vw", i32c(wild_i64x() + wild_i64x()), narrow_ops),
        Pattern::new("halide.hexagon.satub_sub.vub.vub", u8c(wild_i16x() - wild_i16x()), narrow_unsigned_ops),
        Pattern::new("halide.hexagon.satuh_sub.vuh.vuh", u16c(wild_i32x() - wild_i32x()), narrow_unsigned_ops),
        Pattern::new("halide.hexagon.sath_sub.vh.vh", i16c(wild_i32x() - wild_i32x()), narrow_ops),
        Pattern::new("halide.hexagon.satw_sub.vw.vw", i32c(wild_i64x() - wild_i64x()), narrow_ops),
        // Saturating narrowing casts with rounding
        Pattern::new(
            "halide.hexagon.trunc_satub_rnd.vh",
            u8c((wild_i32x() + 128) / 256),
            DeinterleaveOp0 | NarrowOp0,
        ),
        Pattern::new(
            "halide.hexagon.trunc_satb_rnd.vh",
            i8c((wild_i32x() + 128) / 256),
            DeinterleaveOp0 | NarrowOp0,
        ),
        Pattern::new(
            "halide.hexagon.trunc_satuh_rnd.vw",
            u16c((wild_i64x() + 32768) / 65536),
            DeinterleaveOp0 | NarrowOp0,
        ),
        Pattern::new(
            "halide.hexagon.trunc_sath_rnd.vw",
            i16c((wild_i64x() + 32768) / 65536),
            DeinterleaveOp0 | NarrowOp0,
        ),
        // Saturating narrowing casts
        Pattern::new("halide.hexagon.trunc_satub_shr.vh.h", u8c(wild_i16x() >> wild_i16()), DeinterleaveOp0),
        Pattern::new("halide.hexagon.trunc_satuh_shr.vw.w", u16c(wild_i32x() >> wild_i32()), DeinterleaveOp0),
        Pattern::new("halide.hexagon.trunc_sath_shr.vw.w", i16c(wild_i32x() >> wild_i32()), DeinterleaveOp0),
        Pattern::new(
            "halide.hexagon.trunc_satub_shr.vh.h",
            u8c(wild_i16x() / wild_i16()),
            DeinterleaveOp0 | ExactLog2Op1,
        ),
        Pattern::new(
            "halide.hexagon.trunc_satuh_shr.vw.w",
            u16c(wild_i32x() / wild_i32()),
            DeinterleaveOp0 | ExactLog2Op1,
        ),
        Pattern::new(
            "halide.hexagon.trunc_sath_shr.vw.w",
            i16c(wild_i32x() / wild_i32()),
            DeinterleaveOp0 | ExactLog2Op1,
        ),
        // For these narrowing ops, we have the choice of non-interleaving
        // instructions (vpack), or instructions which interleave (vsat).
        // Because we don't know which one we prefer during pattern
        // matching, we match these for now and replace them with the
        // instructions that interleave later if it makes sense.
        Pattern::plain("halide.hexagon.pack_satub.vh", u8c(wild_i16x())),
        Pattern::plain("halide.hexagon.pack_satuh.vw", u16c(wild_i32x())),
        Pattern::plain("halide.hexagon.pack_satb.vh", i8c(wild_i16x())),
        Pattern::plain("halide.hexagon.pack_sath.vw", i16c(wild_i32x())),
        // Narrowing casts
        Pattern::new("halide.hexagon.trunclo.vh", u8(wild_u16x() / 256), DeinterleaveOp0),
        Pattern::new("halide.hexagon.trunclo.vh", u8(wild_i16x() / 256), DeinterleaveOp0),
        Pattern::new("halide.hexagon.trunclo.vh", i8(wild_u16x() / 256), DeinterleaveOp0),
        Pattern::new("halide.hexagon.trunclo.vh", i8(wild_i16x() / 256), DeinterleaveOp0),
        Pattern::new("halide.hexagon.trunclo.vw", u16(wild_u32x() / 65536), DeinterleaveOp0),
        Pattern::new("halide.hexagon.trunclo.vw", u16(wild_i32x() / 65536), DeinterleaveOp0),
        Pattern::new("halide.hexagon.trunclo.vw", i16(wild_u32x() / 65536), DeinterleaveOp0),
        Pattern::new("halide.hexagon.trunclo.vw", i16(wild_i32x() / 65536), DeinterleaveOp0),
        Pattern::new("halide.hexagon.trunc_shr.vw.w", i16(wild_i32x() >> wild_i32()), DeinterleaveOp0),
        Pattern::new(
            "halide.hexagon.trunc_shr.vw.w",
            i16(wild_i32x() / wild_i32()),
            DeinterleaveOp0 | ExactLog2Op1,
        ),
        // Similar to the saturating narrows above, we have the choice of
        // non-interleaving or interleaving instructions.
        Pattern::plain("halide.hexagon.pack.vh", u8(wild_u16x())),
        Pattern::plain("halide.hexagon.pack.vh", u8(wild_i16x())),
        Pattern::plain("halide.hexagon.pack.vh", i8(wild_u16x())),
        Pattern::plain("halide.hexagon.pack.vh", i8(wild_i16x())),
        Pattern::plain("halide.hexagon.pack.vw", u16(wild_u32x())),
        Pattern::plain("halide.hexagon.pack.vw", u16(wild_i32x())),
        Pattern::plain("halide.hexagon.pack.vw", i16(wild_u32x())),
        Pattern::plain("halide.hexagon.pack.vw", i16(wild_i32x())),
        // Widening casts
        Pattern::new("halide.hexagon.zxt.vub", u16(wild_u8x()), InterleaveResult),
        Pattern::new("halide.hexagon.zxt.vub", i16(wild_u8x()), InterleaveResult),
        Pattern::new("halide.hexagon.zxt.vuh", u32(wild_u16x()), InterleaveResult),
        Pattern::new("halide.hexagon.zxt.vuh", i32(wild_u16x()), InterleaveResult),
        Pattern::new("halide.hexagon.sxt.vb", u16(wild_i8x()), InterleaveResult),
        Pattern::new("halide.hexagon.sxt.vb", i16(wild_i8x()), InterleaveResult),
        Pattern::new("halide.hexagon.sxt.vh", u32(wild_i16x()), InterleaveResult),
        Pattern::new("halide.hexagon.sxt.vh", i32(wild_i16x()), InterleaveResult),
    ]
});

pub static MULS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    use PatternFlag::*;
    let narrow_ops = NarrowOp0 | NarrowOp1 | NarrowOp2;
    vec![
        // Vector by scalar widening multiplies.
        Pattern::new("halide.hexagon.mpy.vub.ub", wild_u16x() * bc(wild_u16()), narrow_ops | InterleaveResult),
        Pattern::new(
            "halide.hexagon.mpy.vub.b",
            wild_i16x() * bc(wild_i16()),
            InterleaveResult | NarrowUnsignedOp0 | NarrowOp1,
        ),
        Pattern::new("halide.hexagon.mpy.vuh.uh", wild_u32x() * bc(wild_u32()), narrow_ops | InterleaveResult),
        Pattern::new("halide.hexagon.mpy.vh.h", wild_i32x() * bc(wild_i32()), narrow_ops | InterleaveResult),
        // Widening multiplication
        Pattern::new("halide.hexagon.mpy.vub.vub", wild_u16x() * wild_u16x(), narrow_ops | InterleaveResult),
        Pattern::new("halide.hexagon.mpy.vuh.vuh", wild_u32x() * wild_u32x(), narrow_ops | InterleaveResult),
        Pattern::new("halide.hexagon.mpy.vb.vb", wild_i16x() * wild_i16x(), narrow_ops | InterleaveResult),
        Pattern::new("halide.hexagon.mpy.vh.vh", wild_i32x() * wild_i32x(), narrow_ops | InterleaveResult),
        Pattern::new(
            "halide.hexagon.mpy.vub.vb",
            wild_i16x() * wild_i16x(),
            InterleaveResult | NarrowUnsignedOp0 | NarrowOp1,
        ),
        Pattern::new(
            "halide.hexagon.mpy.vh.vuh",
            wild_i32x() * wild_i32x(),
            InterleaveResult | NarrowOp0 | NarrowUnsignedOp1,
        ),
    ]
});

pub static ADDS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    use PatternFlag::*;
    // The accumulating widening operations deinterleave the accumulator
    // and reinterleave the result.
    let reinterleave_op0 = InterleaveResult | DeinterleaveOp0;
    vec![
        // Shift-accumulates.
        Pattern::plain("halide.hexagon.add_shr.vw.vw.w", wild_i32x() + (wild_i32x() >> bc(wild_i32()))),
        Pattern::plain("halide.hexagon.add_shl.vw.vw.w", wild_i32x() + (wild_i32x() << bc(wild_i32()))),
        Pattern::plain("halide.hexagon.add_shl.vw.vw.w", wild_u32x() + (wild_u32x() << bc(wild_u32()))),
        Pattern::new("halide.hexagon.add_shr.vw.vw.w", wild_i32x() + wild_i32x() / bc(wild_i32()), ExactLog2Op2),
        Pattern::new("halide.hexagon.add_shl.vw.vw.w", wild_i32x() + wild_i32x() * bc(wild_i32()), ExactLog2Op2),
        Pattern::new("halide.hexagon.add_shl.vw.vw.w", wild_u32x() + wild_u32x() * bc(wild_u32()), ExactLog2Op2),
        Pattern::new(
            "halide.hexagon.add_shl.vw.vw.w",
            wild_i32x() + bc(wild_i32()) * wild_i32x(),
            ExactLog2Op1 | SwapOps12,
        ),
        Pattern::new(
            "halide.hexagon.add_shl.vw.vw.w",
            wild_u32x() + bc(wild_u32()) * wild_u32x(),
            ExactLog2Op1 | SwapOps12,
        ),
        // Widening multiply-accumulates with a scalar.
        Pattern::new(
            "halide.hexagon.add_mpy.vuh.vub.ub",
            wild_u16x() + wild_u16x() * bc(wild_u16()),
            reinterleave_op0 | NarrowOp1 | NarrowOp2,
        ),
        Pattern::new(
            "halide.hexagon.add_mpy.vh.vub.b",
            wild_i16x() + wild_i16x() * bc(wild_i16()),
            reinterleave_op0 | NarrowUnsignedOp1 | NarrowOp2,
        ),
        Pattern::new(
            "halide.hexagon.add_mpy.vuw.vuh.uh",
            wild_u32x() + wild_u32x() * bc(wild_u32()),
            reinterleave_op0 | NarrowOp1 | NarrowOp2,
        ),
        Pattern::new(
            "halide.hexagon.add_mpy.vuh.vub.ub",
            wild_u16x() + bc(wild_u16()) * wild_u16x(),
            reinterleave_op0 | NarrowOp1 | NarrowOp2 | SwapOps12,
        ),
        Pattern::new(
            "halide.hexagon.add_mpy.vh.vub.b",
            wild_i16x() + bc(wild_i16()) * wild_i16x(),
            reinterleave_op0 | NarrowOp1 | NarrowUnsignedOp2 | SwapOps12,
        ),
        Pattern::new(
            "halide.hexagon.add_mpy.vuw.vuh.uh",
            wild_u32x() + bc(wild_u32()) * wild_u32x(),
            reinterleave_op0 | NarrowOp1 | NarrowOp2 | SwapOps12,
        ),
        // These patterns aren't exactly right because the instruction
        // saturates the result. However, this is really the instruction
        // we want to use in most cases, and we can exploit the fact that
        // 32 bit signed arithmetic overflow is undefined to argue that
        // these patterns are not completely incorrect.
        Pattern::new(
            "halide.hexagon.satw_add_mpy.vw.vh.h",
            wild_i32x() + wild_i32x() * bc(wild_i32()),
            reinterleave_op0 | NarrowOp1 | NarrowOp2,
        ),
        Pattern::new(
            "halide.hexagon.satw_add_mpy.vw.vh.h",
            wild_i32x() + bc(wild_i32()) * wild_i32x(),
            reinterleave_op0 | NarrowOp1 | NarrowOp2 | SwapOps12,
        ),
        // Non-widening multiply-accumulates with a scalar.
        Pattern::new("halide.hexagon.add_mul.vh.vh.b", wild_i16x() + wild_i16x() * bc(wild_i16()), NarrowOp2),
        Pattern::new("halide.hexagon.add_mul.vw.vw.h", wild_i32x() + wild_i32x() * bc(wild_i32()), NarrowOp2),
        Pattern::new(
            "halide.hexagon.add_mul.vh.vh.b",
            wild_i16x() + bc(wild_i16()) * wild_i16x(),
            NarrowOp1 | SwapOps12,
        ),
        Pattern::new(
            "halide.hexagon.add_mul.vw.vw.h",
            wild_i32x() + bc(wild_i32()) * wild_i32x(),
            NarrowOp1 | SwapOps12,
        ),
        // TODO: There's also a add_mul.vw.vw.b
        // Widening multiply-accumulates.
        Pattern::new(
            "halide.hexagon.add_mpy.vuh.vub.vub",
            wild_u16x() + wild_u16x() * wild_u16x(),
            reinterleave_op0 | NarrowOp1 | NarrowOp2,
        ),
        Pattern::new(
            "halide.hexagon.add_mpy.vuw.vuh.vuh",
            wild_u32x() + wild_u32x() * wild_u32x(),
            reinterleave_op0 | NarrowOp1 | NarrowOp2,
        ),
        Pattern::new(
            "halide.hexagon.add_mpy.vh.vb.vb",
            wild_i16x() + wild_i16x() * wild_i16x(),
            reinterleave_op0 | NarrowOp1 | NarrowOp2,
        ),
        Pattern::new(
            "halide.hexagon.add_mpy.vw.vh.vh",
            wild_i32x() + wild_i32x() * wild_i32x(),
            reinterleave_op0 | NarrowOp1 | NarrowOp2,
        ),
        Pattern::new(
            "halide.hexagon.add_mpy.vh.vub.vb",
            wild_i16x() + wild_i16x() * wild_i16x(),
            reinterleave_op0 | NarrowUnsignedOp1 | NarrowOp2,
        ),
        Pattern::new(
            "halide.hexagon.add_mpy.vw.vh.vuh",
            wild_i32x() + wild_i32x() * wild_i32x(),
            reinterleave_op0 | NarrowOp1 | NarrowUnsignedOp2,
        ),
        Pattern::new(
            "halide.hexagon.add_mpy.vh.vub.vb",
            wild_i16x() + wild_i16x() * wild_i16x(),
            reinterleave_op0 | NarrowUnsignedOp1 | NarrowOp2 | SwapOps12,
        ),
        Pattern::new(
            "halide.hexagon.add_mpy.vw.vh.vuh",
            wild_i32x() + wild_i32x() * wild_i32x(),
            reinterleave_op0 | NarrowOp1 | NarrowUnsignedOp2 | SwapOps12,
        ),
        // This pattern is very general, so it must come last.
        Pattern::plain("halide.hexagon.add_mul.vh.vh.vh", wild_i16x() + wild_i16x() * wild_i16x()),
    ]
});

/// The count-leading-sign-bits idiom matched under `Max`. Both operands
/// must capture the same expression.
pub static CLS_PATTERNS: Lazy<Vec<(&'static str, Expr)>> = Lazy::new(|| {
    vec![
        (
            "halide.hexagon.cls.vh",
            max(count_leading_zeros(wild_i16x()), count_leading_zeros(bitwise_not(wild_i16x()))),
        ),
        (
            "halide.hexagon.cls.vw",
            max(count_leading_zeros(wild_i32x()), count_leading_zeros(bitwise_not(wild_i32x()))),
        ),
    ]
});

/// Double-cast rewrites: wide casts split through an intermediate
/// 16-bit stage so the narrowing/widening patterns above can fire.
pub static CAST_REWRITES: Lazy<Vec<(Expr, Expr)>> = Lazy::new(|| {
    vec![
        // Saturating narrowing
        (u8c(wild_u32x()), u8c(u16c(wild_u32x()))),
        (u8c(wild_i32x()), u8c(i16c(wild_i32x()))),
        (i8c(wild_u32x()), i8c(u16c(wild_u32x()))),
        (i8c(wild_i32x()), i8c(i16c(wild_i32x()))),
        // Narrowing
        (u8(wild_u32x()), u8(u16(wild_u32x()))),
        (u8(wild_i32x()), u8(i16(wild_i32x()))),
        (i8(wild_u32x()), i8(u16(wild_u32x()))),
        (i8(wild_i32x()), i8(i16(wild_i32x()))),
        // Widening
        (u32(wild_u8x()), u32(u16(wild_u8x()))),
        (u32(wild_i8x()), u32(i16(wild_i8x()))),
        (i32(wild_u8x()), i32(u16(wild_u8x()))),
        (i32(wild_i8x()), i32(i16(wild_i8x()))),
    ]
});

/// Rewrite a pattern expression with an unknown number of lanes to
/// have the given lane count.
pub fn with_lanes(e: &Expr, lanes: u32) -> Expr {
    WithLanes { lanes }.mutate_expr(e)
}

struct WithLanes {
    lanes: u32,
}

impl Mutator for WithLanes {
    fn mutate_expr(&mut self, e: &Expr) -> Expr {
        match e.kind() {
            ExprKind::Cast { value } if e.ty().lanes != self.lanes => {
                Expr::cast(e.ty().with_lanes(self.lanes), self.mutate_expr(value))
            }
            ExprKind::Variable { name } if e.ty().lanes != self.lanes => {
                Expr::var(e.ty().with_lanes(self.lanes), name.clone())
            }
            ExprKind::Broadcast { value, lanes } if *lanes != self.lanes => {
                Expr::broadcast(value.clone(), self.lanes)
            }
            _ => recurse_expr(self, e),
        }
    }
}
