//! Fitting a directional light's orthographic projection to the camera
//!
//! The slice of the camera frustum between the shadow near and far planes is
//! unprojected to world space, viewed from the light, and bounded by a box.
//! The box's depth range is stretched so casters outside the slice still
//! land in the shadow map.

use glam::{Mat4, Vec3, Vec4};

/// Intermediate results of a fit, kept for inspection and tests
#[derive(Debug, Clone, PartialEq)]
pub struct FrustumFit {
    /// World-space corners of the camera frustum slice
    pub corners: [Vec3; 8],
    pub center: Vec3,
    pub light_view: Mat4,
    /// Light-space bounds after depth extension
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
    pub projection: Mat4,
}

impl FrustumFit {
    pub fn projection_view(&self) -> Mat4 {
        self.projection * self.light_view
    }
}

/// World-space corners of the volume `inverse(projection * view)` maps the
/// NDC cube to, with depth in `0..1`
pub fn frustum_corners(projection_view: Mat4) -> [Vec3; 8] {
    let inverse = projection_view.inverse();
    let mut corners = [Vec3::ZERO; 8];
    let mut i = 0;
    for x in [-1.0, 1.0] {
        for y in [-1.0, 1.0] {
            for z in [0.0, 1.0] {
                let point = inverse * Vec4::new(x, y, z, 1.0);
                corners[i] = point.truncate() / point.w;
                i += 1;
            }
        }
    }
    corners
}

/// Push both ends of a light-space depth range away from zero by `multiplier`
pub fn extend_depth_range(min_z: f32, max_z: f32, multiplier: f32) -> (f32, f32) {
    let min_z = if min_z < 0.0 {
        min_z * multiplier
    } else {
        min_z / multiplier
    };
    let max_z = if max_z < 0.0 {
        max_z / multiplier
    } else {
        max_z * multiplier
    };
    (min_z, max_z)
}

/// View matrix looking at `center` from one unit along `direction`
///
/// `direction` points from the scene towards the light.
pub fn light_view(center: Vec3, direction: Vec3) -> Mat4 {
    let direction = direction.try_normalize().unwrap_or(Vec3::Y);
    let up = if direction.cross(Vec3::Y).length_squared() < 1e-6 {
        Vec3::X
    } else {
        Vec3::Y
    };
    Mat4::look_at_rh(center + direction, center, up)
}

/// Tight orthographic projection around the camera frustum between `near`
/// and `far`, seen from a light in `direction`
pub fn fit_light_to_frustum(
    camera_view: Mat4,
    fov_degrees: f32,
    aspect: f32,
    near: f32,
    far: f32,
    direction: Vec3,
    z_multiplier: f32,
) -> FrustumFit {
    let projection = Mat4::perspective_rh(fov_degrees.to_radians(), aspect, near, far);
    let corners = frustum_corners(projection * camera_view);
    let center = corners.iter().copied().sum::<Vec3>() / corners.len() as f32;
    let light_view = light_view(center, direction);

    let (mut bounds_min, mut bounds_max) = (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN));
    for corner in &corners {
        let p = light_view.transform_point3(*corner);
        bounds_min = bounds_min.min(p);
        bounds_max = bounds_max.max(p);
    }
    let (min_z, max_z) = extend_depth_range(bounds_min.z, bounds_max.z, z_multiplier);
    bounds_min.z = min_z;
    bounds_max.z = max_z;

    // View space looks down -Z, so the nearest plane sits at -max_z
    let projection = Mat4::orthographic_rh(
        bounds_min.x,
        bounds_max.x,
        bounds_min.y,
        bounds_max.y,
        -max_z,
        -min_z,
    );

    FrustumFit {
        corners,
        center,
        light_view,
        bounds_min,
        bounds_max,
        projection,
    }
}
