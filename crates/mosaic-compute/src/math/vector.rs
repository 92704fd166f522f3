use nalgebra::{Complex, Vector2};

pub type Complex64 = Complex<f64>;

/// Scale a complex 2-vector to unit Euclidean length.
///
/// The zero vector is returned unchanged.
pub fn normalize_complex(v: Vector2<Complex64>) -> Vector2<Complex64> {
    let norm = (v[0].norm_sqr() + v[1].norm_sqr()).sqrt();
    if norm == 0.0 {
        return v;
    }
    v.map(|c| c / norm)
}
