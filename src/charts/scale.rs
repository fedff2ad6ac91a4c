// ---------------------------------------------------------------------------
// Coordinate scales
// ---------------------------------------------------------------------------

/// Affine map from a data domain onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        LinearScale { domain, range }
    }

    /// Domain value → pixel. A zero-width domain maps to the range midpoint.
    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) * (r1 - r0) / (d1 - d0)
    }

    /// Pixel → domain value. A zero-width range maps to the domain start.
    pub fn invert(&self, pixel: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if r1 == r0 {
            return d0;
        }
        d0 + (pixel - r0) * (d1 - d0) / (r1 - r0)
    }
}

/// Evenly divides a pixel range into one band per key.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale<K> {
    keys: Vec<K>,
    range: (f64, f64),
    padding: f64,
}

impl<K: PartialEq> BandScale<K> {
    /// `padding` is the fraction of each step left empty between bands.
    pub fn new(keys: Vec<K>, range: (f64, f64), padding: f64) -> Self {
        BandScale {
            keys,
            range,
            padding: padding.clamp(0.0, 1.0),
        }
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    fn step(&self) -> f64 {
        let n = self.keys.len() as f64;
        if n == 0.0 {
            return 0.0;
        }
        // Outer padding equals inner padding, as in a typical band scale.
        (self.range.1 - self.range.0) / (n - self.padding + 2.0 * self.padding)
    }

    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    /// Start of the band for `key`, or `None` if the key is unknown.
    pub fn position(&self, key: &K) -> Option<f64> {
        let i = self.keys.iter().position(|k| k == key)?;
        let step = self.step();
        Some(self.range.0 + step * self.padding + step * i as f64)
    }
}
