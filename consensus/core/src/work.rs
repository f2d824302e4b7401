use crate::errors::{RuleError, RuleResult};
use crate::BlueWorkType;
use primitive_types::U256;

/// Decodes compact difficulty bits into the full 256-bit target.
///
/// The top byte is a base-256 exponent and the low 23 bits the mantissa.
/// Bit 23 is a sign bit; negative targets, as well as targets that do not fit
/// 256 bits, are rejected.
pub fn compact_to_target(bits: u32) -> RuleResult<U256> {
    let exponent = bits >> 24;
    let (mantissa, shift) = if exponent <= 3 {
        ((bits & 0x00ff_ffff) >> (8 * (3 - exponent)), 0)
    } else {
        (bits & 0x00ff_ffff, 8 * (exponent - 3))
    };

    if mantissa > 0x007f_ffff {
        return Err(RuleError::InvalidDifficultyBits(bits));
    }
    if mantissa == 0 {
        return Ok(U256::zero());
    }
    let mantissa_bits = 32 - mantissa.leading_zeros();
    if mantissa_bits + shift > 256 {
        return Err(RuleError::InvalidDifficultyBits(bits));
    }
    Ok(U256::from(mantissa) << shift as usize)
}

/// Returns the expected number of hashes needed to find a block with the given
/// difficulty bits, `2^256 / (target + 1)`.
pub fn calc_work(bits: u32) -> RuleResult<BlueWorkType> {
    let target = compact_to_target(bits)?;
    if target.is_zero() {
        return Err(RuleError::InvalidDifficultyBits(bits));
    }
    // (2^256 - target - 1) / (target + 1) + 1 == 2^256 / (target + 1) without a 257-bit intermediate
    let work = (!target / (target + 1)) + 1;
    if work.0[3] != 0 {
        return Err(RuleError::WorkOverflow(bits));
    }
    Ok(BlueWorkType::from_limbs([work.0[0], work.0[1], work.0[2]]))
}
