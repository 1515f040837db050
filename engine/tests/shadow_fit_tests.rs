//! Shadow frustum fitting properties

use glam::{Mat4, Vec3};
use umbra_engine::scene::shadow::{extend_depth_range, frustum_corners};
use umbra_engine::scene::fit_light_to_frustum;

const EPSILON: f32 = 1e-3;

fn camera_view() -> Mat4 {
    Mat4::look_at_rh(
        Vec3::new(4.0, 12.0, 30.0),
        Vec3::new(4.0, 10.0, 29.0),
        Vec3::Y,
    )
}

#[test]
fn test_corners_project_back_onto_ndc_cube() {
    let projection = Mat4::perspective_rh(60f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
    let projection_view = projection * camera_view();

    for corner in frustum_corners(projection_view) {
        let ndc = projection_view.project_point3(corner);
        assert!((ndc.x.abs() - 1.0).abs() < EPSILON, "x off the cube: {ndc}");
        assert!((ndc.y.abs() - 1.0).abs() < EPSILON, "y off the cube: {ndc}");
        assert!(ndc.z.abs() < EPSILON || (ndc.z - 1.0).abs() < EPSILON, "z off the cube: {ndc}");
    }
}

#[test]
fn test_fitted_projection_contains_frustum_slice() {
    for direction in [
        Vec3::new(0.3, 1.0, 0.2),
        Vec3::new(-1.0, 0.5, 0.0),
        Vec3::Y,
        Vec3::new(0.0, 0.2, -1.0),
    ] {
        let fit = fit_light_to_frustum(camera_view(), 60.0, 16.0 / 9.0, 0.1, 100.0, direction, 10.0);
        let light_pv = fit.projection_view();
        for corner in fit.corners {
            let p = light_pv.project_point3(corner);
            assert!(p.x >= -1.0 - EPSILON && p.x <= 1.0 + EPSILON, "{direction}: {p}");
            assert!(p.y >= -1.0 - EPSILON && p.y <= 1.0 + EPSILON, "{direction}: {p}");
            assert!(p.z >= -EPSILON && p.z <= 1.0 + EPSILON, "{direction}: {p}");
        }
    }
}

#[test]
fn test_fit_tracks_the_camera() {
    let direction = Vec3::new(0.3, 1.0, 0.2);
    let near = fit_light_to_frustum(camera_view(), 45.0, 1.5, 0.1, 50.0, direction, 10.0);

    let moved = Mat4::from_translation(Vec3::new(-100.0, 0.0, 0.0)) * camera_view();
    let far = fit_light_to_frustum(moved, 45.0, 1.5, 0.1, 50.0, direction, 10.0);

    // Moving the view by -100 on x moves the world-space slice by +100
    assert!((far.center - near.center - Vec3::new(100.0, 0.0, 0.0)).length() < 0.01);
    let near_extent = near.bounds_max - near.bounds_min;
    let far_extent = far.bounds_max - far.bounds_min;
    assert!((near_extent - far_extent).length() < 0.01);
}

#[test]
fn test_depth_range_is_stretched_by_multiplier() {
    let direction = Vec3::new(0.3, 1.0, 0.2);
    let plain = fit_light_to_frustum(camera_view(), 60.0, 16.0 / 9.0, 0.1, 100.0, direction, 1.0);
    let stretched =
        fit_light_to_frustum(camera_view(), 60.0, 16.0 / 9.0, 0.1, 100.0, direction, 10.0);

    let (min_z, max_z) = extend_depth_range(plain.bounds_min.z, plain.bounds_max.z, 10.0);
    assert!((stretched.bounds_min.z - min_z).abs() < EPSILON);
    assert!((stretched.bounds_max.z - max_z).abs() < EPSILON);
    assert!(stretched.bounds_min.z <= plain.bounds_min.z);
    assert!(stretched.bounds_max.z >= plain.bounds_max.z);
    // x/y are untouched
    assert_eq!(stretched.bounds_min.x, plain.bounds_min.x);
    assert_eq!(stretched.bounds_max.y, plain.bounds_max.y);
}

#[test]
fn test_degenerate_direction_falls_back_to_overhead() {
    let fit = fit_light_to_frustum(camera_view(), 60.0, 1.0, 0.1, 20.0, Vec3::ZERO, 10.0);
    let overhead = fit_light_to_frustum(camera_view(), 60.0, 1.0, 0.1, 20.0, Vec3::Y, 10.0);
    assert!(fit.projection.is_finite());
    assert_eq!(fit.light_view, overhead.light_view);
}
