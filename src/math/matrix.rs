use super::Vec3;

/// 4x4 matrix for transformations (column-major for WebGL)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub data: [f32; 16],
}

impl Mat4 {
    pub fn identity() -> Self {
        Self {
            data: [
                1.0, 0.0, 0.0, 0.0,
                0.0, 1.0, 0.0, 0.0,
                0.0, 0.0, 1.0, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    pub fn rotation_x(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self {
            data: [
                1.0, 0.0, 0.0, 0.0,
                0.0, c, s, 0.0,
                0.0, -s, c, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    pub fn rotation_y(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self {
            data: [
                c, 0.0, -s, 0.0,
                0.0, 1.0, 0.0, 0.0,
                s, 0.0, c, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    pub fn rotation_z(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self {
            data: [
                c, s, 0.0, 0.0,
                -s, c, 0.0, 0.0,
                0.0, 0.0, 1.0, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// Translation * Rotation(Euler XYZ) * uniform Scale, built in one pass.
    ///
    /// Equivalent to `T.mul(&rx.mul(&ry.mul(&rz))).mul(&S)`.
    pub fn from_translation_rotation_scale(position: Vec3, rotation: Vec3, scale: f32) -> Self {
        let (b, a) = rotation.x.sin_cos();
        let (d, c) = rotation.y.sin_cos();
        let (f, e) = rotation.z.sin_cos();

        let ae = a * e;
        let af = a * f;
        let be = b * e;
        let bf = b * f;

        Self {
            data: [
                c * e * scale,
                (af + be * d) * scale,
                (bf - ae * d) * scale,
                0.0,
                -c * f * scale,
                (ae - bf * d) * scale,
                (be + af * d) * scale,
                0.0,
                d * scale,
                -b * c * scale,
                a * c * scale,
                0.0,
                position.x,
                position.y,
                position.z,
                1.0,
            ],
        }
    }

    /// Perspective projection matrix
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y / 2.0).tan();
        let nf = 1.0 / (near - far);

        Self {
            data: [
                f / aspect, 0.0, 0.0, 0.0,
                0.0, f, 0.0, 0.0,
                0.0, 0.0, (far + near) * nf, -1.0,
                0.0, 0.0, 2.0 * far * near * nf, 0.0,
            ],
        }
    }

    /// Look-at view matrix
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let f = (target - eye).normalize();
        let r = f.cross(&up).normalize();
        let u = r.cross(&f);

        Self {
            data: [
                r.x, u.x, -f.x, 0.0,
                r.y, u.y, -f.y, 0.0,
                r.z, u.z, -f.z, 0.0,
                -r.dot(&eye), -u.dot(&eye), f.dot(&eye), 1.0,
            ],
        }
    }

    /// Matrix multiplication
    pub fn mul(&self, other: &Mat4) -> Self {
        let mut result = [0.0f32; 16];

        for row in 0..4 {
            for col in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.data[row + k * 4] * other.data[k + col * 4];
                }
                result[row + col * 4] = sum;
            }
        }

        Self { data: result }
    }

    /// Transform a point (applies translation)
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            self.data[0] * p.x + self.data[4] * p.y + self.data[8] * p.z + self.data[12],
            self.data[1] * p.x + self.data[5] * p.y + self.data[9] * p.z + self.data[13],
            self.data[2] * p.x + self.data[6] * p.y + self.data[10] * p.z + self.data[14],
        )
    }

    /// Get as slice for WebGL
    pub fn as_slice(&self) -> &[f32; 16] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translation(x: f32, y: f32, z: f32) -> Mat4 {
        let mut m = Mat4::identity();
        m.data[12] = x;
        m.data[13] = y;
        m.data[14] = z;
        m
    }

    fn scale(x: f32, y: f32, z: f32) -> Mat4 {
        let mut m = Mat4::identity();
        m.data[0] = x;
        m.data[5] = y;
        m.data[10] = z;
        m
    }

    fn assert_mat_close(a: &Mat4, b: &Mat4) {
        for i in 0..16 {
            assert!(
                (a.data[i] - b.data[i]).abs() < 1e-5,
                "element {} differs: {} vs {}",
                i,
                a.data[i],
                b.data[i]
            );
        }
    }

    #[test]
    fn test_translation() {
        let m = translation(1.0, 2.0, 3.0);
        let result = m.transform_point(Vec3::ZERO);
        assert!((result.x - 1.0).abs() < 0.0001);
        assert!((result.y - 2.0).abs() < 0.0001);
        assert!((result.z - 3.0).abs() < 0.0001);
    }

    #[test]
    fn test_rotation_z() {
        let m = Mat4::rotation_z(std::f32::consts::FRAC_PI_2);
        let result = m.transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert!(result.x.abs() < 0.0001);
        assert!((result.y - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_matrix_mul() {
        let combined = translation(1.0, 0.0, 0.0).mul(&scale(2.0, 2.0, 2.0));
        let result = combined.transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert!((result.x - 3.0).abs() < 0.0001);
    }

    #[test]
    fn test_trs_matches_composed_product() {
        let position = Vec3::new(1.5, -2.0, 3.25);
        let rotation = Vec3::new(0.4, 1.1, -0.7);
        let s = 0.65;

        let expected = translation(position.x, position.y, position.z)
            .mul(&Mat4::rotation_x(rotation.x)
                .mul(&Mat4::rotation_y(rotation.y).mul(&Mat4::rotation_z(rotation.z))))
            .mul(&scale(s, s, s));

        let actual = Mat4::from_translation_rotation_scale(position, rotation, s);
        assert_mat_close(&actual, &expected);
    }

    #[test]
    fn test_trs_identity_rotation() {
        let m = Mat4::from_translation_rotation_scale(Vec3::new(0.0, 9.5, 0.0), Vec3::ZERO, 1.0);
        assert_mat_close(&m, &translation(0.0, 9.5, 0.0));
    }

    #[test]
    fn test_trs_zero_scale_collapses_to_point() {
        let m = Mat4::from_translation_rotation_scale(Vec3::new(0.0, 20.0, 0.0), Vec3::new(0.3, 0.2, 0.1), 0.0);
        let p = m.transform_point(Vec3::new(5.0, 5.0, 5.0));
        assert!((p.y - 20.0).abs() < 1e-5);
        assert!(p.x.abs() < 1e-5);
    }
}
