//! # Noise Field
//!
//! Smooth, deterministic 2D noise used to modulate light brightness.
//!
//! The runtime samples it with one axis tied to a list id and the other
//! to a light index or to time, so neighbouring lights shimmer together
//! instead of flickering independently.
//!
//! ## Determinism Guarantee
//!
//! Given the same `NoiseSeed`, this implementation produces **exactly**
//! the same values on any platform, any time.

/// Seed for a noise field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NoiseSeed(u64);

impl NoiseSeed {
    /// Creates a new seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives an independent sub-seed for another purpose.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        let mut hash = self.0;
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }
}

impl Default for NoiseSeed {
    fn default() -> Self {
        Self(0x1164_7A7B_5EED_0001)
    }
}

/// Seeded permutation and gradient lookup.
struct PermutationTable {
    /// 256 entries, doubled so lookups never wrap.
    perm: [u8; 512],
}

impl PermutationTable {
    const GRADIENTS: [[i8; 2]; 12] = [
        [1, 0], [1, 1], [0, 1], [-1, 1],
        [-1, 0], [-1, -1], [0, -1], [1, -1],
        [1, 0], [0, 1], [-1, 0], [0, -1],
    ];

    fn new(seed: NoiseSeed) -> Self {
        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates with xorshift64; a zero state would never move
        let mut state = seed.value() | 1;
        for i in (1..256).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let j = (state % (i as u64 + 1)) as usize;
            perm.swap(i, j);
        }

        let (low, high) = perm.split_at_mut(256);
        high.copy_from_slice(low);

        Self { perm }
    }

    #[inline]
    fn get(&self, index: usize) -> u8 {
        self.perm[index & 511]
    }

    #[inline]
    fn gradient(hash: u8) -> [i8; 2] {
        Self::GRADIENTS[(hash % 12) as usize]
    }
}

/// 2D simplex noise.
///
/// `sample` returns values in `[-1, 1]`; `value` remaps to `[0, 1]`,
/// which is what brightness modulation wants.
pub struct NoiseField {
    perm_table: PermutationTable,
}

impl NoiseField {
    /// (sqrt(3) - 1) / 2
    const F2: f64 = 0.366_025_403_784_439;
    /// (3 - sqrt(3)) / 6
    const G2: f64 = 0.211_324_865_405_187;

    /// Creates a field from a seed.
    #[must_use]
    pub fn new(seed: NoiseSeed) -> Self {
        Self {
            perm_table: PermutationTable::new(seed),
        }
    }

    /// Samples the field at `(x, y)`.
    ///
    /// # Returns
    ///
    /// A value in the range [-1, 1].
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let skew = (x + y) * Self::F2;
        let i = fast_floor(x + skew);
        let j = fast_floor(y + skew);

        let unskew = f64::from(i + j) * Self::G2;
        let x0 = x - (f64::from(i) - unskew);
        let y0 = y - (f64::from(j) - unskew);

        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - f64::from(i1 as u8) + Self::G2;
        let y1 = y0 - f64::from(j1 as u8) + Self::G2;
        let x2 = x0 - 1.0 + 2.0 * Self::G2;
        let y2 = y0 - 1.0 + 2.0 * Self::G2;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;

        let gi0 = self.perm_table.get(ii + self.perm_table.get(jj) as usize);
        let gi1 = self
            .perm_table
            .get(ii + i1 + self.perm_table.get(jj + j1) as usize);
        let gi2 = self
            .perm_table
            .get(ii + 1 + self.perm_table.get(jj + 1) as usize);

        let n0 = Self::contribution(x0, y0, gi0);
        let n1 = Self::contribution(x1, y1, gi1);
        let n2 = Self::contribution(x2, y2, gi2);

        (70.0 * (n0 + n1 + n2)).clamp(-1.0, 1.0)
    }

    /// Samples the field remapped to `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn value(&self, x: f64, y: f64) -> f64 {
        (self.sample(x, y) + 1.0) * 0.5
    }

    /// Fractal sum of `octaves` layers, normalized to roughly [-1, 1].
    ///
    /// # Arguments
    ///
    /// * `persistence` - Amplitude decay per octave (typically 0.5)
    /// * `lacunarity` - Frequency increase per octave (typically 2.0)
    #[must_use]
    pub fn octaved(&self, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves {
            total += self.sample(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        if max_amplitude == 0.0 {
            0.0
        } else {
            total / max_amplitude
        }
    }

    #[inline]
    fn contribution(x: f64, y: f64, gradient_index: u8) -> f64 {
        let t = 0.5 - x * x - y * y;
        if t < 0.0 {
            0.0
        } else {
            let grad = PermutationTable::gradient(gradient_index);
            let t2 = t * t;
            t2 * t2 * (x * f64::from(grad[0]) + y * f64::from(grad[1]))
        }
    }
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new(NoiseSeed::default())
    }
}

#[inline]
fn fast_floor(x: f64) -> i32 {
    let xi = x as i32;
    if x < f64::from(xi) {
        xi - 1
    } else {
        xi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let seed = NoiseSeed::new(12345);
        let a = NoiseField::new(seed);
        let b = NoiseField::new(seed);

        for i in 0..100 {
            let x = f64::from(i) * 0.1;
            let y = f64::from(i) * 0.17;
            assert_eq!(a.sample(x, y), b.sample(x, y), "Noise should be deterministic");
        }
    }

    #[test]
    fn test_different_seeds_different_results() {
        let a = NoiseField::new(NoiseSeed::new(1));
        let b = NoiseField::new(NoiseSeed::new(2));

        let differs = (0..32).any(|i| {
            let x = f64::from(i) * 3.7 + 0.25;
            a.sample(x, x * 0.5) != b.sample(x, x * 0.5)
        });
        assert!(differs, "Different seeds should produce different results");
    }

    #[test]
    fn test_value_range() {
        let noise = NoiseField::new(NoiseSeed::new(42));

        for i in 0..10_000 {
            let x = f64::from(i) * 0.1 - 500.0;
            let y = f64::from(i) * 0.13 - 650.0;
            let value = noise.value(x, y);
            assert!((0.0..=1.0).contains(&value), "Value {value} out of range at ({x}, {y})");
        }
    }

    #[test]
    fn test_continuity() {
        let noise = NoiseField::new(NoiseSeed::new(42));
        let v1 = noise.sample(100.0, 100.0);
        let v2 = noise.sample(100.001, 100.0);
        assert!((v1 - v2).abs() < 0.01, "Noise should be continuous");
    }

    #[test]
    fn test_octaved_zero_octaves() {
        let noise = NoiseField::default();
        assert_eq!(noise.octaved(1.0, 2.0, 0, 0.5, 2.0), 0.0);
    }

    #[test]
    fn test_seed_derivation() {
        let base = NoiseSeed::new(42);
        assert_ne!(base.derive(1), base.derive(2));
        assert_eq!(base.derive(1), base.derive(1));
        assert_ne!(base.derive(1), base);
    }
}
