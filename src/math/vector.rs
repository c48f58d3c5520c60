//! Fixed-size 3-vector helpers for color feature arithmetic

use num_traits::Float;

/// Dot product of two 3-vectors
pub fn dot<T: Float>(a: &[T; 3], b: &[T; 3]) -> T {
    let [ax, ay, az] = *a;
    let [bx, by, bz] = *b;
    ax.mul_add(bx, ay.mul_add(by, az * bz))
}

/// Component-wise sum
pub fn add<T: Float>(a: &[T; 3], b: &[T; 3]) -> [T; 3] {
    let [ax, ay, az] = *a;
    let [bx, by, bz] = *b;
    [ax + bx, ay + by, az + bz]
}

/// Component-wise difference `a - b`
pub fn sub<T: Float>(a: &[T; 3], b: &[T; 3]) -> [T; 3] {
    let [ax, ay, az] = *a;
    let [bx, by, bz] = *b;
    [ax - bx, ay - by, az - bz]
}

/// Multiply every component by `factor`
pub fn scale<T: Float>(a: &[T; 3], factor: T) -> [T; 3] {
    a.map(|component| component * factor)
}

/// Euclidean length
pub fn length<T: Float>(a: &[T; 3]) -> T {
    dot(a, a).sqrt()
}

/// Euclidean distance between two points
pub fn distance<T: Float>(a: &[T; 3], b: &[T; 3]) -> T {
    length(&sub(a, b))
}

/// Unit vector in the direction of `a`
///
/// Returns `None` for zero-length or non-finite input.
pub fn normalize<T: Float>(a: &[T; 3]) -> Option<[T; 3]> {
    let len = length(a);
    (len.is_finite() && len > T::zero()).then(|| scale(a, len.recip()))
}

/// Remove the component of `a` along the unit vector `axis` (Gram-Schmidt step)
pub fn reject<T: Float>(a: &[T; 3], axis: &[T; 3]) -> [T; 3] {
    sub(a, &scale(axis, dot(axis, a)))
}
