//! Pattern table ordering guards.

use ripple_dtype::Type;
use ripple_ir::{Expr, ExprKind, Mutator, mutate::recurse_expr};

use crate::matcher::apply_patterns;
use crate::patterns::{ADDS, CASTS, MULS, Pattern, i16 as cast_i16};

struct NoRewrites;

impl Mutator for NoRewrites {
    fn mutate_expr(&mut self, e: &Expr) -> Expr {
        recurse_expr(self, e)
    }
}

fn mac_scenario() -> Expr {
    let acc = Expr::var(Type::int_vec(16, 64), "acc");
    let a = Expr::var(Type::int_vec(8, 64), "a");
    let b = Expr::var(Type::int_vec(8, 64), "b");
    acc + cast_i16(a) * cast_i16(b)
}

#[test]
fn the_generic_mac_comes_last() {
    assert_eq!(ADDS.last().expect("adds table is not empty").intrin, "halide.hexagon.add_mul.vh.vh.vh");
}

#[test]
fn declaration_order_picks_the_widening_mac() {
    let e = mac_scenario();
    let out = apply_patterns(&e, &ADDS, &mut NoRewrites);
    let ExprKind::Call { name, .. } = out.kind() else {
        panic!("expected an interleaved call, got {out}");
    };
    // The interleaved widening MAC, not the generic fallback.
    assert_eq!(name, "halide.hexagon.interleave.vh");
}

#[test]
fn reversed_order_degrades_to_the_generic_mac() {
    // Guard against the "generic first" regression: with the table
    // reversed, the catch-all MAC shadows the widening form.
    let reversed: Vec<Pattern> = ADDS.iter().rev().cloned().collect();
    let e = mac_scenario();
    let out = apply_patterns(&e, &reversed, &mut NoRewrites);
    let ExprKind::Call { name, .. } = out.kind() else {
        panic!("expected a call, got {out}");
    };
    assert_eq!(name, "halide.hexagon.add_mul.vh.vh.vh");
}

#[test]
fn mixed_sign_macs_pair_their_narrow_flags() {
    use crate::patterns::PatternFlag::{NarrowOp1, NarrowOp2, NarrowUnsignedOp1, NarrowUnsignedOp2, SwapOps12};

    let flags_for = |intrin: &str, swapped: bool| {
        ADDS.iter()
            .find(|p| p.intrin == intrin && p.flags.contains(SwapOps12) == swapped)
            .unwrap_or_else(|| panic!("no {intrin} entry with swapped operands = {swapped}"))
            .flags
    };

    // The unsigned/signed multiply operands of the mixed-sign MACs
    // keep the same narrowing pairing in the swapped-operand entries.
    for swapped in [false, true] {
        let flags = flags_for("halide.hexagon.add_mpy.vh.vub.vb", swapped);
        assert!(flags.contains(NarrowUnsignedOp1) && flags.contains(NarrowOp2), "vh.vub.vb, swapped = {swapped}");

        let flags = flags_for("halide.hexagon.add_mpy.vw.vh.vuh", swapped);
        assert!(flags.contains(NarrowOp1) && flags.contains(NarrowUnsignedOp2), "vw.vh.vuh, swapped = {swapped}");
    }
}

#[test]
fn plain_averaging_precedes_the_rounding_variant() {
    let avg = CASTS.iter().position(|p| p.intrin == "halide.hexagon.avg.vub.vub").unwrap();
    let rnd = CASTS.iter().position(|p| p.intrin == "halide.hexagon.avg_rnd.vub.vub").unwrap();
    assert!(avg < rnd);
}

#[test]
fn specific_narrows_precede_the_packs() {
    let shr = CASTS.iter().position(|p| p.intrin == "halide.hexagon.trunc_satub_shr.vh.h").unwrap();
    let pack = CASTS.iter().position(|p| p.intrin == "halide.hexagon.pack_satub.vh").unwrap();
    assert!(shr < pack, "the shift narrow must be tried before the generic pack");
}

#[test]
fn vector_scalar_multiplies_precede_vector_vector() {
    let by_scalar = MULS.iter().position(|p| p.intrin == "halide.hexagon.mpy.vub.ub").unwrap();
    let by_vector = MULS.iter().position(|p| p.intrin == "halide.hexagon.mpy.vub.vub").unwrap();
    assert!(by_scalar < by_vector);
}
