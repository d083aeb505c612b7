use std::f64::consts::PI;

use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::{Error, Result};

/// Sampling interval (s)
pub const DT: f64 = 0.01;
/// Signal length (s)
pub const DURATION: f64 = 30.;
/// Frequency of the component shared by both signals (Hz)
pub const COMMON_FREQ: f64 = 10.;
/// Welch segment length
pub const NFFT: usize = 256;

/// Two signals sharing a sinusoid, each with its own white noise.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalPair {
    pub t: Vec<f64>,
    pub s1: Vec<f64>,
    pub s2: Vec<f64>,
}

impl SignalPair {
    /// Noise for `s1` is drawn entirely before noise for `s2`.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let n = (DURATION / DT).round() as usize;
        let t: Vec<f64> = (0..n).map(|i| i as f64 * DT).collect();
        let nse1: Vec<f64> = (0..n).map(|_| rng.sample(StandardNormal)).collect();
        let nse2: Vec<f64> = (0..n).map(|_| rng.sample(StandardNormal)).collect();
        let common = |t: f64| (2. * PI * COMMON_FREQ * t).sin();
        let s1 = t.iter().zip(&nse1).map(|(&t, n)| common(t) + n).collect();
        let s2 = t.iter().zip(&nse2).map(|(&t, n)| common(t) + n).collect();
        Self { t, s1, s2 }
    }

    pub fn sample_rate(&self) -> f64 {
        1. / DT
    }
}

/// Magnitude-squared coherence over the one-sided frequency axis.
#[derive(Debug, Clone)]
pub struct Coherence {
    pub freqs: Vec<f64>,
    pub cxy: Vec<f64>,
}

pub fn hann_window(n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![1.];
    }
    (0..n)
        .map(|i| 0.5 - 0.5 * (2. * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}

/// One-sided DFT of a windowed segment, bins `0..=nfft/2`.
fn spectrum(segment: &[f64], window: &[f64]) -> Vec<(f64, f64)> {
    let nfft = segment.len();
    (0..=nfft / 2)
        .map(|k| {
            segment
                .iter()
                .zip(window)
                .enumerate()
                .fold((0., 0.), |(re, im), (i, (x, w))| {
                    let phase = -2. * PI * (k * i % nfft) as f64 / nfft as f64;
                    (re + x * w * phase.cos(), im + x * w * phase.sin())
                })
        })
        .collect()
}

/// Welch estimate with non-overlapping Hann segments of length `nfft`, no detrending.
/// Trailing samples that don't fill a segment are ignored.
pub fn coherence(x: &[f64], y: &[f64], nfft: usize, fs: f64) -> Result<Coherence> {
    let len = x.len().min(y.len());
    if nfft == 0 || len < nfft {
        return Err(Error::InsufficientData {
            needed: nfft.max(1),
            got: len,
        });
    }
    let window = hann_window(nfft);
    let bins = nfft / 2 + 1;
    let mut pxx = vec![0.; bins];
    let mut pyy = vec![0.; bins];
    let mut pxy = vec![(0., 0.); bins];
    for (xs, ys) in x[..len].chunks_exact(nfft).zip(y[..len].chunks_exact(nfft)) {
        let fx = spectrum(xs, &window);
        let fy = spectrum(ys, &window);
        for k in 0..bins {
            let (xr, xi) = fx[k];
            let (yr, yi) = fy[k];
            pxx[k] += xr * xr + xi * xi;
            pyy[k] += yr * yr + yi * yi;
            // conj(X) * Y
            pxy[k].0 += xr * yr + xi * yi;
            pxy[k].1 += xr * yi - xi * yr;
        }
    }
    let cxy = (0..bins)
        .map(|k| {
            let denom = pxx[k] * pyy[k];
            if denom > 0. {
                (pxy[k].0 * pxy[k].0 + pxy[k].1 * pxy[k].1) / denom
            } else {
                0.
            }
        })
        .collect();
    let freqs = (0..bins).map(|k| k as f64 * fs / nfft as f64).collect();
    Ok(Coherence { freqs, cxy })
}

#[cfg(test)]
use rand::{rngs::StdRng, SeedableRng};

#[test]
fn signals_reproducible_with_seed() {
    let a = SignalPair::generate(&mut StdRng::seed_from_u64(19680801));
    let b = SignalPair::generate(&mut StdRng::seed_from_u64(19680801));
    assert_eq!(a, b);
    assert_eq!(a.t.len(), 3000);
    assert_ne!(a.s1, a.s2);
    let c = SignalPair::generate(&mut StdRng::seed_from_u64(1));
    assert_ne!(a.s1, c.s1);
}

#[test]
fn hann_window_shape() {
    let w = hann_window(5);
    assert_eq!(w.len(), 5);
    assert!(w[0].abs() < 1e-12 && w[4].abs() < 1e-12);
    assert!((w[2] - 1.).abs() < 1e-12);
}

#[test]
fn identical_signals_fully_coherent() {
    let s = SignalPair::generate(&mut StdRng::seed_from_u64(3));
    let c = coherence(&s.s1, &s.s1, NFFT, s.sample_rate()).unwrap();
    assert_eq!(c.freqs.len(), NFFT / 2 + 1);
    assert!((c.freqs[NFFT / 2] - 50.).abs() < 1e-12);
    assert!(c.cxy.iter().all(|v| (v - 1.).abs() < 1e-9));
}

#[test]
fn coherence_peaks_at_common_frequency() {
    let s = SignalPair::generate(&mut StdRng::seed_from_u64(19680801));
    let c = coherence(&s.s1, &s.s2, NFFT, s.sample_rate()).unwrap();
    let (peak, &max) = c
        .cxy
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .unwrap();
    assert!((c.freqs[peak] - COMMON_FREQ).abs() < 0.5);
    assert!(max > 0.8);
    assert!(c.cxy.iter().all(|&v| (0. ..=1. + 1e-9).contains(&v)));
}

#[test]
fn coherence_needs_full_segment() {
    let x = vec![0.; NFFT - 1];
    assert!(matches!(
        coherence(&x, &x, NFFT, 100.),
        Err(Error::InsufficientData { .. })
    ));
}
