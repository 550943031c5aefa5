use glam::{Vec2, Vec3};
use mpm_core::forces::containment::{polygon_force, sphere_pull, Polygon, Sphere};

fn triangle() -> Polygon {
    Polygon::new(&[
        Vec2::new(20.0, 10.0),
        Vec2::new(60.0, 10.0),
        Vec2::new(40.0, 50.0),
    ])
    .unwrap()
}

#[test]
fn test_triangle_centroid_inside_no_force() {
    let tri = triangle();
    let centroid = Vec2::new(40.0, 70.0 / 3.0);
    assert!(tri.contains(centroid));
    assert_eq!(polygon_force(centroid.extend(30.0), &tri, 1.0), Vec3::ZERO);
}

#[test]
fn test_triangle_outside_pushed_to_nearest_edge_point() {
    let tri = triangle();
    let p = Vec2::new(70.0, 40.0);
    assert!(!tri.contains(p));

    // Projection onto edge (60,10)-(40,50) lands at its midpoint.
    let nearest = Vec2::new(50.0, 30.0);
    assert!((tri.nearest_point(p) - nearest).length() < 1e-4);

    let force = polygon_force(p.extend(12.0), &tri, 0.5);
    let expected = (nearest - p).normalize();
    assert_eq!(force.z, 0.0);
    assert!(
        (force.truncate().normalize() - expected).length() < 1e-4,
        "force {force} not toward {nearest}"
    );
}

#[test]
fn test_triangle_outside_past_vertex_snaps_to_vertex() {
    let tri = triangle();
    let p = Vec2::new(100.0, 12.0);
    assert!((tri.nearest_point(p) - Vec2::new(60.0, 10.0)).length() < 1e-4);
}

#[test]
fn test_sphere_pull_proportional_to_excess() {
    let s = Sphere::new(Vec3::new(64.0, 32.0, 32.0), 10.0);
    let inside = sphere_pull(Vec3::new(70.0, 32.0, 32.0), &s, 1.0);
    let just_out = sphere_pull(Vec3::new(76.0, 32.0, 32.0), &s, 1.0);
    let far_out = sphere_pull(Vec3::new(84.0, 32.0, 32.0), &s, 1.0);
    assert_eq!(inside, Vec3::ZERO);
    assert!((just_out.x + 2.0).abs() < 1e-5);
    assert!((far_out.x + 10.0).abs() < 1e-5);
}

#[test]
fn test_regular_polygon_contains_center() {
    let hex = Polygon::regular(Vec2::new(64.0, 32.0), 20.0, 6);
    assert_eq!(hex.vertices().len(), 6);
    assert!(hex.contains(Vec2::new(64.0, 32.0)));
    assert!(!hex.contains(Vec2::new(90.0, 32.0)));
}
