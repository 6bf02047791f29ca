use rand::Rng;

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Uniform sample in `[0, 1)`.
pub fn unit(rng: &mut impl Rng) -> f32 {
    rng.gen_range(0.0_f32..1.0)
}

/// Uniform sample in `[low, high)`; collapses to `low` for empty ranges.
pub fn between(rng: &mut impl Rng, low: f32, high: f32) -> f32 {
    if high > low {
        lerp(low, high, unit(rng))
    } else {
        low
    }
}

/// Uniform sample in `[-amount, amount)`.
pub fn jitter(rng: &mut impl Rng, amount: f32) -> f32 {
    (unit(rng) - 0.5) * 2.0 * amount
}

pub fn label_case(raw: &str) -> String {
    raw.trim().to_uppercase()
}
