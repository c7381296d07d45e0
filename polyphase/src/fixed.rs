//! Fixed-point conventions shared by both stage modes.
//!
//! Samples and coefficients are 16 bits wide. Coefficients are Q3.12, products
//! and pipeline cells are 32-bit. Nothing in here saturates: values that do
//! not fit wrap, and it is up to the producer of the input stream to keep
//! samples in range.

pub type Sample = i16;
pub type Coeff = i16;
pub type Acc = i32;

pub const SAMPLE_WIDTH: u32 = 16;
pub const COEFF_WIDTH: u32 = 16;
pub const COEFF_FRAC_BITS: u32 = 12;

/// `ceil(log2(phases))`, the right shift applied to every stage output.
pub const fn gain_bits(phases: usize) -> u32 {
    if phases <= 1 {
        0
    } else {
        usize::BITS - (phases - 1).leading_zeros()
    }
}

/// Coefficient value that passes a sample through a stage unchanged.
pub const fn unity(phases: usize) -> i32 {
    1 << (gain_bits(phases) + COEFF_FRAC_BITS)
}

#[inline]
pub fn mac(x: Sample, c: Coeff) -> Acc {
    // 16x16 always fits in 32 bits
    (x as Acc) * (c as Acc)
}

#[inline]
pub fn chain(product: Acc, carry: Acc) -> Acc {
    product.wrapping_add(carry)
}

/// Gain shift followed by the bit slice back down to sample width.
///
/// Both steps are plain bit selection: negative values floor, nothing rounds,
/// and anything above 16 bits is dropped.
#[inline]
pub fn rescale(acc: Acc, gain_bits: u32) -> Sample {
    ((acc >> gain_bits) >> COEFF_FRAC_BITS) as Sample
}

/// True when `value` is representable as a `COEFF_WIDTH`-bit signed integer.
pub const fn fits_coeff(value: i32) -> bool {
    let max = (1i32 << (COEFF_WIDTH - 1)) - 1;
    let min = -(1i32 << (COEFF_WIDTH - 1));
    value >= min && value <= max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_bits_is_ceil_log2() {
        assert_eq!(gain_bits(1), 0);
        assert_eq!(gain_bits(2), 1);
        assert_eq!(gain_bits(3), 2);
        assert_eq!(gain_bits(4), 2);
        assert_eq!(gain_bits(5), 3);
        assert_eq!(gain_bits(8), 3);
        assert_eq!(gain_bits(9), 4);
    }

    #[test]
    fn unity_coefficient_passes_sample() {
        for phases in [1usize, 2, 3] {
            let c = unity(phases) as Coeff;
            assert_eq!(rescale(mac(1234, c), gain_bits(phases)), 1234);
            assert_eq!(rescale(mac(-1234, c), gain_bits(phases)), -1234);
        }
    }

    #[test]
    fn rescale_floors_instead_of_rounding() {
        // 1.75 and -1.25 in Q12 after a one-bit gain shift
        assert_eq!(rescale(7 << 11, 1), 1);
        assert_eq!(rescale(-(5 << 11), 1), -2);
    }

    #[test]
    fn rescale_drops_headroom_bits() {
        // 40000 does not fit in 16 bits and wraps
        let acc = 40_000 << COEFF_FRAC_BITS;
        assert_eq!(rescale(acc, 0), (40_000 - (1 << SAMPLE_WIDTH)) as Sample);
    }

    #[test]
    fn chain_wraps_silently() {
        assert_eq!(chain(i32::MAX, 1), i32::MIN);
    }

    #[test]
    fn coefficient_width_bounds() {
        assert!(fits_coeff(32767));
        assert!(fits_coeff(-32768));
        assert!(!fits_coeff(32768));
        assert!(!fits_coeff(-32769));
    }
}
