/// Hyperbolic tangent, its image is `(-1, 1)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tanh;

impl Tanh {
    pub fn new() -> Self {
        Self
    }

    pub fn f(&self, z: f32) -> f32 {
        z.tanh()
    }

    pub fn df(&self, z: f32) -> f32 {
        1. - z.tanh().powi(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivative_matches_finite_difference() {
        let t = Tanh::new();
        let h = 1e-3;

        for z in [-2.0, -0.5, 0.0, 0.3, 1.7] {
            let numeric = (t.f(z + h) - t.f(z - h)) / (2. * h);
            assert!((numeric - t.df(z)).abs() < 1e-3, "z = {z}");
        }
    }
}
