//! Target-specific peephole optimization for a wide-SIMD DSP.
//!
//! Rewrites generic vectorized arithmetic into named HVX intrinsics,
//! inserting interleave/deinterleave markers where the instruction
//! encoding requires them and cancelling redundant pairs, so the
//! emitted program issues as few lane permutations as possible.
//!
//! Two entry points, both pure `Stmt -> Stmt` functions:
//!
//! - [`optimize_hexagon_shuffles`] replaces indirect vector loads with
//!   bounded index ranges by `dynamic_shuffle` table lookups.
//! - [`optimize_hexagon_instructions`] runs the pattern matcher and
//!   then the interleave eliminator.

use ripple_ir::{Mutator, Stmt};

pub mod interleave;
pub mod intrinsics;
pub mod matcher;
pub mod patterns;
pub mod shuffles;

#[cfg(test)]
pub mod test;

pub use interleave::EliminateInterleaves;
pub use intrinsics::{is_native_deinterleave, is_native_interleave, native_deinterleave, native_interleave};
pub use matcher::OptimizePatterns;
pub use shuffles::{OptimizeShuffles, upper_bound};

/// Replace indirect and other complicated loads with dynamic_shuffle
/// (vlut) calls.
pub fn optimize_hexagon_shuffles(s: &Stmt) -> Stmt {
    OptimizeShuffles::default().mutate_stmt(s)
}

/// Peephole optimize for HVX instructions. Generates interleaves and
/// deinterleaves alongside the intrinsics, then cancels the redundant
/// pairs.
pub fn optimize_hexagon_instructions(s: &Stmt) -> Stmt {
    let s = OptimizePatterns.mutate_stmt(s);
    EliminateInterleaves::default().mutate_stmt(&s)
}
