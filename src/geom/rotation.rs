use crate::{Point, Vector};
use ndarray as nd;

/// Rotation matrix for a unit axis `u` and angle `phi` (radians).
///
/// Uses Rodrigues' formula:
/// `R = I + sin(phi) W + 2 sin^2(phi / 2) W^2`
/// where `W` is the cross-product matrix of `u`.
/// Reference: https://en.wikipedia.org/wiki/Rodrigues%27_rotation_formula
fn rodrigues(u: &Vector, phi: f64) -> nd::Array2<f64> {
    let w: nd::Array2<f64> = nd::arr2(&[[0., -u.dz, u.dy], [u.dz, 0., -u.dx], [-u.dy, u.dx, 0.]]);

    nd::Array::eye(3) + phi.sin() * &w + (2. * (phi / 2.).sin().powi(2)) * w.dot(&w)
}

/// Rotation matrix for intrinsic Euler angles in XYZ order: `Rx * Ry * Rz`.
///
/// Vectors are rotated by left-multiplying them with the returned matrix,
/// so `Rz` is applied first.
pub fn euler_matrix(rotation: [f64; 3]) -> nd::Array2<f64> {
    let [ax, ay, az] = rotation;
    let rx = rodrigues(&Vector::new(1., 0., 0.), ax);
    let ry = rodrigues(&Vector::new(0., 1., 0.), ay);
    let rz = rodrigues(&Vector::new(0., 0., 1.), az);
    rx.dot(&ry).dot(&rz)
}

/// Applies rotation matrix `rot` to vector `v`.
pub fn rotate_vector(v: Vector, rot: &nd::ArrayView2<f64>) -> Vector {
    let col = nd::arr1(&[v.dx, v.dy, v.dz]);
    let out = rot.dot(&col);
    Vector::new(out[0], out[1], out[2])
}

/// Rotates point `pt` about the origin.
pub fn rotate_point(pt: Point, rot: &nd::ArrayView2<f64>) -> Point {
    let v = rotate_vector(Vector::new(pt.x, pt.y, pt.z), rot);
    Point::new(v.dx, v.dy, v.dz)
}
