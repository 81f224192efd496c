//! Stereo decorrelation: per-sub-block L/R vs mid/side decision by sum of
//! absolute differences, plus the (de)interleave helpers.

use crate::core::types::Sample;

/// split an interleaved pair stream into its two channel streams
pub fn deinterleave(samples: &[Sample]) -> (Vec<Sample>, Vec<Sample>) {
    let frames = samples.len() / 2;
    let mut left = Vec::with_capacity(frames);
    let mut right = Vec::with_capacity(frames);
    for pair in samples.chunks_exact(2) {
        left.push(pair[0]);
        right.push(pair[1]);
    }
    (left, right)
}

/// interleave two channel streams into `out`
pub fn interleave(left: &[Sample], right: &[Sample], out: &mut Vec<Sample>) {
    for (&l, &r) in left.iter().zip(right.iter()) {
        out.push(l);
        out.push(r);
    }
}

/// Mid/side wins when the transformed magnitudes sum smaller than the plain
/// channels.
pub fn prefer_mid_side(left: &[Sample], right: &[Sample]) -> bool {
    let mut sad_lr: u64 = 0;
    let mut sad_ms: u64 = 0;
    for (&l, &r) in left.iter().zip(right.iter()) {
        sad_lr += l.unsigned_abs() + r.unsigned_abs();
        sad_ms += ((l + r) >> 1).unsigned_abs() + (l - r).unsigned_abs();
    }
    sad_ms < sad_lr
}

/// forward transform: M = (L+R)>>1, S = L-R
pub fn to_mid_side(left: &mut [Sample], right: &mut [Sample]) {
    for (l, r) in left.iter_mut().zip(right.iter_mut()) {
        let mid = (*l + *r) >> 1;
        let side = *l - *r;
        *l = mid;
        *r = side;
    }
}

/// Inverse transform. The half-offset on the side channel compensates the
/// truncating shift of the forward mid and is required for bit exactness.
pub fn from_mid_side(mid: &mut [Sample], side: &mut [Sample]) {
    for (m, s) in mid.iter_mut().zip(side.iter_mut()) {
        let left = *m + ((*s + 1) >> 1);
        let right = *m - (*s >> 1);
        *m = left;
        *s = right;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mid_side_roundtrip() {
        let left: Vec<Sample> = vec![5, -5, 3, 0, 1_000_001, -7, i32::MAX as Sample];
        let right: Vec<Sample> = vec![3, 2, -3, 0, -999_999, -8, i32::MIN as Sample];

        let mut m = left.clone();
        let mut s = right.clone();
        to_mid_side(&mut m, &mut s);
        from_mid_side(&mut m, &mut s);
        assert_eq!(m, left);
        assert_eq!(s, right);
    }

    #[test]
    fn test_correlated_channels_pick_mid_side() {
        let left: Vec<Sample> = (0..256).map(|i| 1000 + i).collect();
        let right: Vec<Sample> = (0..256).map(|i| 1002 + i).collect();
        assert!(prefer_mid_side(&left, &right));
    }

    #[test]
    fn test_uncorrelated_channels_stay_lr() {
        let left: Vec<Sample> = (0..256).map(|i| if i % 2 == 0 { 500 } else { -500 }).collect();
        let right: Vec<Sample> = left.iter().map(|&l| -l - 1).collect();
        assert!(!prefer_mid_side(&left, &right));
    }

    #[test]
    fn test_interleave_roundtrip() {
        let samples: Vec<Sample> = (0..100).collect();
        let (l, r) = deinterleave(&samples);
        let mut back = Vec::new();
        interleave(&l, &r, &mut back);
        assert_eq!(back, samples);
    }
}
