//! 3D simplex noise with a per-instance permutation table.
//!
//! Each `NoiseField` owns its table, so fields can be built and sampled on many threads
//! at once. A non-zero seed XORs every table entry with each little-endian byte of the seed.

use std::fmt;

use glam::Vec3;
use noise::NoiseFn;

const F3: f64 = 1.0 / 3.0;
const G3: f64 = 1.0 / 6.0;

/// Squared radius of a corner's influence.
const FALLOFF: f64 = 0.6;

/// Brings the summed corner contributions to roughly [-1, 1].
const OUTPUT_SCALE: f64 = 32.0;

const GRAD3: [[f64; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

#[rustfmt::skip]
const PERMUTATION: [u8; 256] = [
    151, 160, 137,  91,  90,  15, 131,  13, 201,  95,  96,  53, 194, 233,   7, 225,
    140,  36, 103,  30,  69, 142,   8,  99,  37, 240,  21,  10,  23, 190,   6, 148,
    247, 120, 234,  75,   0,  26, 197,  62,  94, 252, 219, 203, 117,  35,  11,  32,
     57, 177,  33,  88, 237, 149,  56,  87, 174,  20, 125, 136, 171, 168,  68, 175,
     74, 165,  71, 134, 139,  48,  27, 166,  77, 146, 158, 231,  83, 111, 229, 122,
     60, 211, 133, 230, 220, 105,  92,  41,  55,  46, 245,  40, 244, 102, 143,  54,
     65,  25,  63, 161,   1, 216,  80,  73, 209,  76, 132, 187, 208,  89,  18, 169,
    200, 196, 135, 130, 116, 188, 159,  86, 164, 100, 109, 198, 173, 186,   3,  64,
     52, 217, 226, 250, 124, 123,   5, 202,  38, 147, 118, 126, 255,  82,  85, 212,
    207, 206,  59, 227,  47,  16,  58,  17, 182, 189,  28,  42, 223, 183, 170, 213,
    119, 248, 152,   2,  44, 154, 163,  70, 221, 153, 101, 155, 167,  43, 172,   9,
    129,  22,  39, 253,  19,  98, 108, 110,  79, 113, 224, 232, 178, 185, 112, 104,
    218, 246,  97, 228, 251,  34, 242, 193, 238, 210, 144,  12, 191, 179, 162, 241,
     81,  51, 145, 235, 249,  14, 239, 107,  49, 192, 214,  31, 181, 199, 106, 157,
    184,  84, 204, 176, 115, 121,  50,  45, 127,   4, 150, 254, 138, 236, 205,  93,
    222, 114,  67,  29,  24,  72, 243, 141, 128, 195,  78,  66, 215,  61, 156, 180,
];

/// Deterministic simplex noise field.
#[derive(Clone)]
pub struct NoiseField {
    seed: i32,
    perm: [u8; 512],
}

impl NoiseField {
    pub fn new(seed: i32) -> Self {
        let mask = if seed != 0 {
            seed.to_le_bytes().iter().fold(0u8, |acc, b| acc ^ b)
        } else {
            0
        };
        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = PERMUTATION[i & 0xff] ^ mask;
        }
        Self { seed, perm }
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    /// Sample the field; the result lies roughly in [-1, 1].
    pub fn evaluate(&self, point: Vec3) -> f32 {
        self.sample(point.x as f64, point.y as f64, point.z as f64) as f32
    }

    fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        // Skew into simplex space to find the containing cell.
        let s = (x + y + z) * F3;
        let i = (x + s).floor() as i32;
        let j = (y + s).floor() as i32;
        let k = (z + s).floor() as i32;
        let t = (i + j + k) as f64 * G3;
        let x0 = x - (i as f64 - t);
        let y0 = y - (j as f64 - t);
        let z0 = z - (k as f64 - t);

        // Offsets of the second and third corners, picked by coordinate ordering.
        let (i1, j1, k1, i2, j2, k2) = if x0 >= y0 {
            if y0 >= z0 {
                (1, 0, 0, 1, 1, 0)
            } else if x0 >= z0 {
                (1, 0, 0, 1, 0, 1)
            } else {
                (0, 0, 1, 1, 0, 1)
            }
        } else if y0 < z0 {
            (0, 0, 1, 0, 1, 1)
        } else if x0 < z0 {
            (0, 1, 0, 0, 1, 1)
        } else {
            (0, 1, 0, 1, 1, 0)
        };

        let x1 = x0 - i1 as f64 + G3;
        let y1 = y0 - j1 as f64 + G3;
        let z1 = z0 - k1 as f64 + G3;
        let x2 = x0 - i2 as f64 + F3;
        let y2 = y0 - j2 as f64 + F3;
        let z2 = z0 - k2 as f64 + F3;
        let x3 = x0 - 0.5;
        let y3 = y0 - 0.5;
        let z3 = z0 - 0.5;

        let ii = (i & 0xff) as usize;
        let jj = (j & 0xff) as usize;
        let kk = (k & 0xff) as usize;

        let n0 = self.corner(self.gradient(ii, jj, kk), x0, y0, z0);
        let n1 = self.corner(self.gradient(ii + i1, jj + j1, kk + k1), x1, y1, z1);
        let n2 = self.corner(self.gradient(ii + i2, jj + j2, kk + k2), x2, y2, z2);
        let n3 = self.corner(self.gradient(ii + 1, jj + 1, kk + 1), x3, y3, z3);

        (n0 + n1 + n2 + n3) * OUTPUT_SCALE
    }

    #[inline]
    fn gradient(&self, i: usize, j: usize, k: usize) -> usize {
        let p = &self.perm;
        p[i + p[j + p[k] as usize] as usize] as usize % GRAD3.len()
    }

    #[inline]
    fn corner(&self, gi: usize, x: f64, y: f64, z: f64) -> f64 {
        let t = FALLOFF - x * x - y * y - z * z;
        if t <= 0.0 {
            return 0.0;
        }
        let t2 = t * t;
        let g = GRAD3[gi];
        t2 * t2 * (g[0] * x + g[1] * y + g[2] * z)
    }
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoiseField").field("seed", &self.seed).finish_non_exhaustive()
    }
}

impl NoiseFn<f64, 3> for NoiseField {
    fn get(&self, point: [f64; 3]) -> f64 {
        self.sample(point[0], point[1], point[2])
    }
}
