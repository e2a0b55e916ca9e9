//! GPU upload of tessellated scene geometry. Objects keep per-object index
//! ranges so each pass can draw a tag-filtered subset.

use std::ops::Range;
use std::sync::Arc;

/// How an object's fragments are depth-tested in the composite pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepthMode {
    /// The graphics API's built-in depth test.
    Hardware,
    /// Shader-side comparison against the relayed depth texture.
    Manual,
}

/// Per-pass visibility partition over [`DepthMode`] tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagFilter {
    All,
    Hardware,
    Manual,
}

impl TagFilter {
    pub fn admits(self, mode: DepthMode) -> bool {
        match self {
            Self::All => true,
            Self::Hardware => mode == DepthMode::Hardware,
            Self::Manual => mode == DepthMode::Manual,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub color: [f32; 4],
}

/// One object's draw: a named index range plus its depth-test tag.
#[derive(Clone, Debug)]
pub struct DrawCommand {
    pub name: String,
    pub mode: DepthMode,
    pub indices: Range<u32>,
}

/// Uploaded scene geometry: shared vertex/index buffers and the ordered
/// draw list.
pub struct SceneBuffers {
    pub vertex: wgpu::Buffer,
    pub index: wgpu::Buffer,
    pub draws: Vec<DrawCommand>,
}

impl SceneBuffers {
    pub fn filtered<'a>(&'a self, filter: TagFilter) -> impl Iterator<Item = &'a DrawCommand> {
        self.draws.iter().filter(move |draw| filter.admits(draw.mode))
    }
}

pub fn upload_scene(
    device: &Arc<wgpu::Device>,
    queue: &wgpu::Queue,
    vertices: &[Vertex],
    indices: &[u16],
    draws: Vec<DrawCommand>,
) -> SceneBuffers {
    let vsize = std::mem::size_of_val(vertices) as u64;
    let isize = std::mem::size_of_val(indices) as u64;
    let vertex = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("scene-vbuf"),
        size: vsize.max(4),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let index = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("scene-ibuf"),
        size: isize.max(4),
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    if vsize > 0 {
        queue.write_buffer(&vertex, 0, bytemuck::cast_slice(vertices));
    }
    if isize > 0 {
        queue.write_buffer(&index, 0, bytemuck::cast_slice(indices));
    }
    SceneBuffers { vertex, index, draws }
}
