use ripple_dtype::Type;
use snafu::Snafu;

use crate::BinOp;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Operand types disagree in a binary operation.
    #[snafu(display("type mismatch: cannot build {op:?} from {lhs} and {rhs}"))]
    BinaryTypeMismatch { op: BinOp, lhs: Type, rhs: Type },

    /// A constant does not fit the type it was given.
    #[snafu(display("constant {value} is out of range for {ty}"))]
    ConstOutOfRange { value: i64, ty: Type },

    /// A scalar expression was required.
    #[snafu(display("expected a scalar expression, got type {ty}"))]
    ScalarRequired { ty: Type },

    /// Lane counts disagree between related expressions.
    #[snafu(display("lane count mismatch: expected {expected} lanes, got {actual}"))]
    LanesMismatch { expected: u32, actual: u32 },

    /// A cast may not change the lane count.
    #[snafu(display("cast cannot change lanes: {from} to {to}"))]
    CastLanesMismatch { from: Type, to: Type },

    /// Select condition must be boolean.
    #[snafu(display("select condition must be boolean, got {ty}"))]
    SelectCondNotBool { ty: Type },

    /// Select arms must agree.
    #[snafu(display("select arms disagree: {true_ty} vs {false_ty}"))]
    SelectArmMismatch { true_ty: Type, false_ty: Type },
}
