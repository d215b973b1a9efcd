//! Vertex/index buffers for the primitive shapes the game draws.
//!
//! Every mesh is built once at load time, at unit scale, from the same shape
//! constants the collision code uses; per-instance model matrices then stretch
//! the unit meshes to each obstacle's size.

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};
use physics::{
    GroundPoint, Tree, BUILDING_UNIT_HEIGHT, BUILDING_UNIT_WIDTH, DRONE_ARM_LENGTH,
    DRONE_ARM_WIDTH, DRONE_BODY_HEIGHT, TREE_UNIT_HEIGHT, TREE_UNIT_RADIUS,
};

/// Number of segments around cones and cylinders.
pub const ROUND_SEGMENTS: u32 = 36;

pub const COLOR_BLACK: [f32; 3] = [0.0, 0.0, 0.0];
pub const COLOR_RED: [f32; 3] = [1.0, 0.0, 0.0];
pub const COLOR_BLUE: [f32; 3] = [0.0, 0.0, 1.0];
pub const COLOR_GREEN: [f32; 3] = [0.1, 0.6, 0.1];
pub const COLOR_YELLOW: [f32; 3] = [1.0, 0.9, 0.0];
pub const COLOR_DARK_BROWN: [f32; 3] = [0.36, 0.2, 0.09];
pub const COLOR_DARK_GREY: [f32; 3] = [0.25, 0.25, 0.25];
pub const COLOR_LIGHT_GREY: [f32; 3] = [0.75, 0.75, 0.75];

/// Vertex with position and flat colour.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl ColorVertex {
    pub fn new(position: Vec3, color: [f32; 3]) -> Self {
        Self {
            position: position.into(),
            color,
        }
    }
}

/// CPU-side triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<ColorVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append another mesh, re-basing its indices.
    pub fn append(&mut self, other: &MeshData) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + offset));
    }

    /// Concatenate several meshes into one draw.
    pub fn combine<'a>(meshes: impl IntoIterator<Item = &'a MeshData>) -> Self {
        let mut out = Self::new();
        for mesh in meshes {
            out.append(mesh);
        }
        out
    }

    /// Highest vertex y; 0 for an empty mesh.
    pub fn max_y(&self) -> f32 {
        self.vertices
            .iter()
            .map(|v| v.position[1])
            .fold(0.0, f32::max)
    }

    /// The raw vertex bytes, ready for a vertex buffer.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Flat rectangle on the ground, spanning `length` along +X and `depth` along +Z
/// from `corner`.
pub fn rectangle(corner: Vec3, depth: f32, length: f32, color: [f32; 3]) -> MeshData {
    MeshData {
        vertices: vec![
            ColorVertex::new(corner + Vec3::new(0.0, 0.0, depth), color),
            ColorVertex::new(corner + Vec3::new(length, 0.0, depth), color),
            ColorVertex::new(corner + Vec3::new(length, 0.0, 0.0), color),
            ColorVertex::new(corner, color),
        ],
        indices: vec![0, 1, 2, 3, 0, 2],
    }
}

/// Box centred on `center`: `length` along X, `width` along Z, `height` along Y,
/// then yawed by `yaw` radians.
pub fn cuboid(
    center: Vec3,
    width: f32,
    length: f32,
    height: f32,
    color: [f32; 3],
    yaw: f32,
) -> MeshData {
    let hl = length / 2.0;
    let hw = width / 2.0;
    let hh = height / 2.0;
    let rotation = Quat::from_rotation_y(yaw);

    let corners = [
        Vec3::new(-hl, -hh, -hw),
        Vec3::new(-hl, -hh, hw),
        Vec3::new(hl, -hh, -hw),
        Vec3::new(hl, -hh, hw),
        Vec3::new(-hl, hh, -hw),
        Vec3::new(-hl, hh, hw),
        Vec3::new(hl, hh, -hw),
        Vec3::new(hl, hh, hw),
    ];

    #[rustfmt::skip]
    let indices = vec![
        0, 2, 1, 1, 2, 3, // bottom
        4, 6, 5, 5, 6, 7, // top
        0, 4, 1, 1, 5, 4, // left
        2, 0, 6, 0, 4, 6, // back
        1, 3, 5, 3, 7, 5, // front
        3, 2, 7, 2, 6, 7, // right
    ];

    MeshData {
        vertices: corners
            .iter()
            .map(|&c| ColorVertex::new(center + rotation * c, color))
            .collect(),
        indices,
    }
}

/// Closed cylinder standing on `base`.
pub fn cylinder(base: Vec3, height: f32, radius: f32, color: [f32; 3]) -> MeshData {
    let mut mesh = MeshData::new();
    let step = std::f32::consts::TAU / ROUND_SEGMENTS as f32;

    // Ring vertices interleaved top/bottom, seam duplicated.
    for i in 0..=ROUND_SEGMENTS {
        let angle = i as f32 * step;
        let offset = Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);
        mesh.vertices
            .push(ColorVertex::new(base + offset + Vec3::Y * height, color));
        mesh.vertices.push(ColorVertex::new(base + offset, color));
    }
    let top_center = mesh.vertices.len() as u32;
    mesh.vertices
        .push(ColorVertex::new(base + Vec3::Y * height, color));
    let bottom_center = top_center + 1;
    mesh.vertices.push(ColorVertex::new(base, color));

    for i in 0..ROUND_SEGMENTS {
        let top = i * 2;
        let bottom = top + 1;
        let top_next = top + 2;
        let bottom_next = top + 3;

        mesh.indices
            .extend_from_slice(&[top, bottom, top_next, bottom, bottom_next, top_next]);
        mesh.indices
            .extend_from_slice(&[top_center, top_next, top, bottom_center, bottom, bottom_next]);
    }

    mesh
}

/// Cone standing on `base` with its apex `height` above. The apex is shaded
/// slightly darker so the silhouette reads without lighting.
pub fn cone(base: Vec3, height: f32, radius: f32, color: [f32; 3]) -> MeshData {
    let mut mesh = MeshData::new();
    let apex_color = color.map(|c| (c - 0.15).max(0.0));

    mesh.vertices.push(ColorVertex::new(base, color));
    mesh.vertices
        .push(ColorVertex::new(base + Vec3::Y * height, apex_color));

    let step = std::f32::consts::TAU / ROUND_SEGMENTS as f32;
    for i in 0..=ROUND_SEGMENTS {
        let angle = i as f32 * step;
        let offset = Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);
        mesh.vertices.push(ColorVertex::new(base + offset, color));

        if i > 0 {
            // Base fan, then side fan.
            mesh.indices.extend_from_slice(&[0, i + 1, i + 2, 1, i + 1, i + 2]);
        }
    }

    mesh
}

/// Unit ground tile: a 2 x 1 rectangle, squeezed to 1 x 1 by its model matrix.
pub fn tile_mesh() -> MeshData {
    rectangle(Vec3::ZERO, 1.0, 2.0, COLOR_BLACK)
}

/// Unit tree: trunk plus two canopy cones, laid out exactly like the
/// collision shapes of a tree of unit height and radius.
pub fn tree_mesh() -> MeshData {
    let tree = Tree::new(GroundPoint::ORIGIN, TREE_UNIT_RADIUS, TREE_UNIT_HEIGHT);
    let trunk = tree.trunk();
    let lower = tree.lower_lobe();
    let upper = tree.upper_lobe();

    MeshData::combine([
        &cylinder(trunk.base, trunk.height, trunk.radius, COLOR_DARK_BROWN),
        &cone(lower.base, lower.height, lower.radius, COLOR_GREEN),
        &cone(upper.base, upper.height, upper.radius, COLOR_GREEN),
    ])
}

/// Unit building, centred at the origin.
pub fn building_mesh() -> MeshData {
    cuboid(
        Vec3::ZERO,
        BUILDING_UNIT_WIDTH,
        BUILDING_UNIT_WIDTH,
        BUILDING_UNIT_HEIGHT,
        COLOR_DARK_GREY,
        0.0,
    )
}

/// Drone frame at size 1: two arms crossed at ±45° with a motor block at each tip.
pub fn drone_body_mesh() -> MeshData {
    let angles = [45f32.to_radians(), (-45f32).to_radians()];
    let half = DRONE_ARM_LENGTH / 2.0;
    let mut mesh = MeshData::new();

    for i in 0..4usize {
        let di = if i > 1 { 1.0 } else { -1.0 };
        let dj = 1.0 - (i % 2) as f32 * 2.0;
        let angle = angles[if i > 1 { 1 - i % 2 } else { i % 2 }];
        let offset = Vec3::new(
            di * angle.cos().abs() * half,
            0.0,
            dj * angle.sin().abs() * half,
        );
        mesh.append(&cuboid(
            offset,
            DRONE_ARM_WIDTH + 0.1,
            DRONE_ARM_LENGTH / 10.0,
            DRONE_BODY_HEIGHT * 1.5,
            COLOR_LIGHT_GREY,
            angle,
        ));
    }

    for angle in angles {
        mesh.append(&cuboid(
            Vec3::ZERO,
            DRONE_ARM_WIDTH,
            DRONE_ARM_LENGTH,
            DRONE_BODY_HEIGHT,
            COLOR_LIGHT_GREY,
            angle,
        ));
    }

    mesh
}

/// One rotor blade at size 1.
pub fn blade_mesh() -> MeshData {
    cuboid(
        Vec3::ZERO,
        DRONE_ARM_WIDTH / 3.0,
        DRONE_ARM_LENGTH / 7.0,
        DRONE_BODY_HEIGHT / 4.0,
        COLOR_BLACK,
        0.0,
    )
}

/// Unit cube used for the package and its drop zone.
pub fn crate_mesh(color: [f32; 3]) -> MeshData {
    cuboid(Vec3::ZERO, 1.0, 1.0, 1.0, color, 0.0)
}

/// Unit cone pointing at the current objective.
pub fn indicator_mesh() -> MeshData {
    cone(Vec3::ZERO, 1.0, 1.0, COLOR_YELLOW)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_indices_valid(mesh: &MeshData) {
        assert_eq!(mesh.indices.len() % 3, 0);
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n), "index out of range");
    }

    #[test]
    fn primitives_have_valid_index_buffers() {
        for mesh in [
            rectangle(Vec3::ZERO, 1.0, 2.0, COLOR_BLACK),
            cuboid(Vec3::ONE, 1.0, 2.0, 3.0, COLOR_RED, 0.3),
            cylinder(Vec3::ZERO, 2.0, 0.5, COLOR_DARK_BROWN),
            cone(Vec3::ZERO, 2.0, 0.5, COLOR_GREEN),
        ] {
            assert!(!mesh.vertices.is_empty());
            assert_indices_valid(&mesh);
        }
    }

    #[test]
    fn cuboid_spans_requested_extents() {
        let mesh = cuboid(Vec3::new(0.0, 1.0, 0.0), 1.0, 2.0, 4.0, COLOR_RED, 0.0);
        let xs: Vec<f32> = mesh.vertices.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = mesh.vertices.iter().map(|v| v.position[1]).collect();
        assert_eq!(xs.iter().cloned().fold(f32::MIN, f32::max), 1.0);
        assert_eq!(ys.iter().cloned().fold(f32::MAX, f32::min), -1.0);
        assert_eq!(mesh.max_y(), 3.0);
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn combine_rebases_indices() {
        let a = rectangle(Vec3::ZERO, 1.0, 1.0, COLOR_BLACK);
        let b = rectangle(Vec3::X, 1.0, 1.0, COLOR_BLACK);
        let both = MeshData::combine([&a, &b]);
        assert_eq!(both.vertices.len(), 8);
        assert_eq!(&both.indices[6..], &[4, 5, 6, 7, 4, 6]);
        assert_indices_valid(&both);
    }

    #[test]
    fn tree_mesh_tops_out_at_upper_lobe_apex() {
        let mesh = tree_mesh();
        assert_indices_valid(&mesh);
        let upper = Tree::new(GroundPoint::ORIGIN, TREE_UNIT_RADIUS, TREE_UNIT_HEIGHT).upper_lobe();
        assert!((mesh.max_y() - (upper.base.y + upper.height)).abs() < 1e-5);
    }

    #[test]
    fn building_mesh_matches_hit_footprint() {
        let mesh = building_mesh();
        let max_x = mesh
            .vertices
            .iter()
            .map(|v| v.position[0])
            .fold(f32::MIN, f32::max);
        let building = physics::Building::new(GroundPoint::ORIGIN, 1.0, 1.0);
        assert!((max_x - building.hit_half_width()).abs() < 1e-6);
    }

    #[test]
    fn drone_body_is_six_boxes() {
        let mesh = drone_body_mesh();
        assert_eq!(mesh.vertices.len(), 6 * 8);
        assert_indices_valid(&mesh);
    }

    #[test]
    fn vertex_bytes_cover_every_vertex() {
        let mesh = blade_mesh();
        assert_eq!(
            mesh.vertex_bytes().len(),
            mesh.vertices.len() * std::mem::size_of::<ColorVertex>()
        );
    }
}
