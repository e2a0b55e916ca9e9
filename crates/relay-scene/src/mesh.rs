use std::sync::Arc;

use relay_core::{upload_scene, DrawCommand, SceneBuffers, Vertex};

use crate::ObjectRegistry;

/// Tessellate every object into shared vertex/index arrays with a per-object
/// draw command. Each quad contributes four vertices and six indices, so the
/// u16 index space comfortably covers the scenes this pipeline renders.
pub fn tessellate(registry: &ObjectRegistry) -> (Vec<Vertex>, Vec<u16>, Vec<DrawCommand>) {
    let mut vertices = Vec::with_capacity(registry.len() * 4);
    let mut indices = Vec::with_capacity(registry.len() * 6);
    let mut draws = Vec::with_capacity(registry.len());

    for object in registry.objects() {
        let base = vertices.len() as u16;
        let h = object.size / 2.0;
        let z = object.depth;
        let color = object.color.to_array();
        vertices.push(Vertex { pos: [-h, -h, z], color });
        vertices.push(Vertex { pos: [h, -h, z], color });
        vertices.push(Vertex { pos: [h, h, z], color });
        vertices.push(Vertex { pos: [-h, h, z], color });

        let start = indices.len() as u32;
        for offset in [0u16, 1, 2, 0, 2, 3] {
            indices.push(base + offset);
        }
        draws.push(DrawCommand {
            name: object.name.clone(),
            mode: object.depth_mode,
            indices: start..start + 6,
        });
    }

    (vertices, indices, draws)
}

/// Tessellate and upload a registry in one step.
pub fn upload_registry(
    device: &Arc<wgpu::Device>,
    queue: &wgpu::Queue,
    registry: &ObjectRegistry,
) -> SceneBuffers {
    let (vertices, indices, draws) = tessellate(registry);
    upload_scene(device, queue, &vertices, &indices, draws)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::{DepthMode, TagFilter};

    #[test]
    fn standard_scene_tessellation() {
        let registry = ObjectRegistry::standard(true);
        let (vertices, indices, draws) = tessellate(&registry);
        assert_eq!(vertices.len(), 12);
        assert_eq!(indices.len(), 18);
        assert_eq!(draws.len(), 3);

        assert_eq!(draws[0].indices, 0..6);
        assert_eq!(draws[1].indices, 6..12);
        assert_eq!(draws[2].indices, 12..18);
        assert_eq!(draws[1].mode, DepthMode::Manual);

        // Second quad sits at z=2 with half-extent 2.
        assert_eq!(vertices[4].pos, [-2.0, -2.0, 2.0]);
        assert_eq!(vertices[6].pos, [2.0, 2.0, 2.0]);
    }

    #[test]
    fn draw_filtering_matches_registry() {
        let registry = ObjectRegistry::standard(true);
        let (_, _, draws) = tessellate(&registry);
        let manual: Vec<_> = draws
            .iter()
            .filter(|d| TagFilter::Manual.admits(d.mode))
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(manual, ["MediumVioletRed"]);
    }
}
