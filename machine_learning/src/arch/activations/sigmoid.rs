/// The logistic function, evaluated without overflowing `exp` for large `|z|`.
pub fn sigmoid(z: f32) -> f32 {
    if z >= 0. {
        1. / (1. + (-z).exp())
    } else {
        let e = z.exp();
        e / (1. + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_symmetric_around_zero() {
        assert_eq!(sigmoid(0.), 0.5);
        assert!((sigmoid(2.) + sigmoid(-2.) - 1.).abs() < 1e-6);
    }

    #[test]
    fn saturates_without_nans() {
        assert_eq!(sigmoid(1000.), 1.);
        assert_eq!(sigmoid(-1000.), 0.);
        assert!(sigmoid(-90.).is_finite());
    }
}
