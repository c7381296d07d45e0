//! Symmetric cosine-sum windows.
//!
//! Also compiled into `build.rs` through `#[path]`, so nothing in here may
//! reach into the rest of the crate.

use std::f64::consts::PI;

pub const HAMMING: [f64; 2] = [0.54, 0.46];
pub const BLACKMAN: [f64; 3] = [0.42, 0.5, 0.08];

/// Point `n` of a `len`-point window `a0 - a1 cos(x) + a2 cos(2x) - ...`.
pub fn cosine_sum(terms: &[f64], n: usize, len: usize) -> f64 {
    if len < 2 {
        return 1.0;
    }
    let x = 2.0 * PI * n as f64 / (len - 1) as f64;
    terms
        .iter()
        .enumerate()
        .map(|(k, &a)| {
            let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
            sign * a * (k as f64 * x).cos()
        })
        .sum()
}

pub fn window(terms: &[f64], len: usize) -> Vec<f64> {
    (0..len).map(|n| cosine_sum(terms, n, len)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_are_symmetric_and_peak_in_the_middle() {
        for terms in [&HAMMING[..], &BLACKMAN[..]] {
            let w = window(terms, 65);
            for n in 0..65 {
                assert!((w[n] - w[64 - n]).abs() < 1e-12);
            }
            assert!((w[32] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn edge_values() {
        assert!((cosine_sum(&HAMMING, 0, 16) - 0.08).abs() < 1e-12);
        assert!(cosine_sum(&BLACKMAN, 0, 16).abs() < 1e-12);
        assert_eq!(window(&HAMMING, 1), [1.0]);
    }
}
