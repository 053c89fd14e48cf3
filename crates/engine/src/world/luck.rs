use sha2::{Digest, Sha256};

const MANTISSA_BITS: u32 = 53;

/// Deterministic stand-in for randomness: the same key always yields the same
/// value in `[0, 1)`.
pub trait Luck {
    fn luck(&self, key: &str) -> f64;
}

impl<F> Luck for F
where
    F: Fn(&str) -> f64,
{
    fn luck(&self, key: &str) -> f64 {
        self(key)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Luck;

impl Luck for Sha256Luck {
    fn luck(&self, key: &str) -> f64 {
        let digest = Sha256::digest(key.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        let bits = u64::from_le_bytes(head) >> (64 - MANTISSA_BITS);
        bits as f64 / (1u64 << MANTISSA_BITS) as f64
    }
}
