//! Render-target pixel readback. Host element types follow the target's
//! color component type by exhaustive match; rows honor wgpu's 256-byte
//! alignment and the padding is stripped before returning.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::RelayError;
use crate::introspect::DiagnosticSink;
use crate::target::{ColorComponentType, RenderTarget};

/// Aligned bytes per row for texture readback (wgpu requires 256).
pub fn aligned_bytes_per_row(width: u32, bytes_per_pixel: u32) -> u32 {
    let unpadded = width * bytes_per_pixel;
    (unpadded + 255) & !255
}

/// Buffer size needed to read back a `width`×`height` texture.
pub fn readback_buffer_size(width: u32, height: u32, bytes_per_pixel: u32) -> u64 {
    (aligned_bytes_per_row(width, bytes_per_pixel) as u64) * (height as u64)
}

/// Host-side pixel storage, element type matching the source attachment.
/// Half floats stay as raw 16-bit patterns.
#[derive(Clone, Debug, PartialEq)]
pub enum PixelBuffer {
    Unorm8(Vec<u8>),
    Half(Vec<u16>),
    Float(Vec<f32>),
}

impl PixelBuffer {
    pub fn len(&self) -> usize {
        match self {
            Self::Unorm8(v) => v.len(),
            Self::Half(v) => v.len(),
            Self::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The set of distinct values, first-seen order. Floats are
    /// deduplicated by bit pattern.
    pub fn distinct(&self) -> PixelBuffer {
        match self {
            Self::Unorm8(v) => {
                let mut seen = [false; 256];
                let mut out = Vec::new();
                for &x in v {
                    if !seen[x as usize] {
                        seen[x as usize] = true;
                        out.push(x);
                    }
                }
                Self::Unorm8(out)
            }
            Self::Half(v) => {
                let mut seen = HashSet::new();
                Self::Half(v.iter().copied().filter(|x| seen.insert(*x)).collect())
            }
            Self::Float(v) => {
                let mut seen = HashSet::new();
                Self::Float(v.iter().copied().filter(|x| seen.insert(x.to_bits())).collect())
            }
        }
    }
}

/// Readback result: the raw pixel buffer plus its distinct-value summary.
#[derive(Clone, Debug)]
pub struct PixelData {
    pub buffer: PixelBuffer,
    pub distinct: PixelBuffer,
}

impl PixelData {
    fn new(buffer: PixelBuffer) -> Self {
        let distinct = buffer.distinct();
        Self { buffer, distinct }
    }
}

/// Read back a target's color attachment. The element type is selected by
/// the target's own component type; requesting a different interpretation
/// is a reportable error, not a silent misread.
pub fn read_back(
    device: &Arc<wgpu::Device>,
    queue: &wgpu::Queue,
    target: &RenderTarget,
) -> Result<PixelData, RelayError> {
    read_back_as(device, queue, target, target.component)
}

/// Read back a target's color attachment, checking that the requested
/// element type matches what the target stores.
pub fn read_back_as(
    device: &Arc<wgpu::Device>,
    queue: &wgpu::Queue,
    target: &RenderTarget,
    requested: ColorComponentType,
) -> Result<PixelData, RelayError> {
    if requested != target.component {
        return Err(RelayError::ReadbackTypeMismatch {
            stored: target.component,
            requested,
        });
    }
    let bytes = copy_to_host(
        device,
        queue,
        &target.color.texture,
        wgpu::TextureAspect::All,
        target.width,
        target.height,
        target.component.bytes_per_pixel(),
    )?;
    let buffer = match target.component {
        ColorComponentType::UnormU8 => PixelBuffer::Unorm8(bytes),
        ColorComponentType::HalfFloat => PixelBuffer::Half(bytemuck::pod_collect_to_vec(&bytes)),
        ColorComponentType::Float32 => PixelBuffer::Float(bytemuck::pod_collect_to_vec(&bytes)),
    };
    Ok(PixelData::new(buffer))
}

/// Read back a target's depth attachment directly (one f32 per pixel).
pub fn read_back_depth(
    device: &Arc<wgpu::Device>,
    queue: &wgpu::Queue,
    target: &RenderTarget,
) -> Result<PixelData, RelayError> {
    let depth = target.depth()?;
    read_back_depth_texture(device, queue, &depth.texture, target.width, target.height)
}

/// Read back a standalone depth texture, such as the composite
/// destination's own depth buffer (one f32 per pixel).
pub fn read_back_depth_texture(
    device: &Arc<wgpu::Device>,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    width: u32,
    height: u32,
) -> Result<PixelData, RelayError> {
    let bytes = copy_to_host(
        device,
        queue,
        texture,
        wgpu::TextureAspect::DepthOnly,
        width,
        height,
        4,
    )?;
    Ok(PixelData::new(PixelBuffer::Float(bytemuck::pod_collect_to_vec(&bytes))))
}

fn copy_to_host(
    device: &Arc<wgpu::Device>,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    aspect: wgpu::TextureAspect,
    width: u32,
    height: u32,
    bytes_per_pixel: u32,
) -> Result<Vec<u8>, RelayError> {
    let padded_row = aligned_bytes_per_row(width, bytes_per_pixel);
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("readback-staging"),
        size: readback_buffer_size(width, height, bytes_per_pixel),
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("readback-encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect,
        },
        wgpu::ImageCopyBuffer {
            buffer: &staging,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(padded_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
    );
    queue.submit(Some(encoder.finish()));

    let slice = staging.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device.poll(wgpu::Maintain::Wait);
    rx.recv()
        .map_err(|_| RelayError::ReadbackFailed { reason: "map callback dropped".into() })?
        .map_err(|e| RelayError::ReadbackFailed { reason: e.to_string() })?;

    let mapped = slice.get_mapped_range();
    let row_bytes = (width * bytes_per_pixel) as usize;
    let mut out = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * padded_row as usize;
        out.extend_from_slice(&mapped[start..start + row_bytes]);
    }
    drop(mapped);
    staging.unmap();
    Ok(out)
}

/// Emit the pixel-readback summary: element count and the distinct values.
pub fn report_pixels(label: &str, data: &PixelData, sink: &mut dyn DiagnosticSink) {
    let kind = match data.buffer {
        PixelBuffer::Unorm8(_) => "u8",
        PixelBuffer::Half(_) => "f16 bits",
        PixelBuffer::Float(_) => "f32",
    };
    sink.line(&format!("pixels ({label}): {} {kind} values", data.buffer.len()));
    let rendered = match &data.distinct {
        PixelBuffer::Unorm8(v) => format!("{v:?}"),
        PixelBuffer::Half(v) => format!("{v:?}"),
        PixelBuffer::Float(v) => format!("{v:?}"),
    };
    sink.line(&format!("unique values: {rendered}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_alignment() {
        // 250px of rgba8 is 1000 bytes, padded to the next 256 multiple.
        assert_eq!(aligned_bytes_per_row(250, 4), 1024);
        assert_eq!(aligned_bytes_per_row(64, 16), 1024);
        assert_eq!(aligned_bytes_per_row(64, 4), 256);
        assert_eq!(readback_buffer_size(250, 250, 4), 1024 * 250);
    }

    #[test]
    fn distinct_preserves_first_seen_order() {
        let buffer = PixelBuffer::Unorm8(vec![255, 0, 0, 255, 128, 0]);
        assert_eq!(buffer.distinct(), PixelBuffer::Unorm8(vec![255, 0, 128]));
    }

    #[test]
    fn distinct_floats_dedup_by_bit_pattern() {
        let buffer = PixelBuffer::Float(vec![1.0, 0.5, 1.0, 0.0, -0.0, 0.5]);
        // -0.0 has a distinct bit pattern from 0.0 and is kept.
        assert_eq!(buffer.distinct(), PixelBuffer::Float(vec![1.0, 0.5, 0.0, -0.0]));
    }

    #[test]
    fn raw_bytes_reinterpret_as_elements() {
        // Readback bytes are regrouped into the target's element type even
        // when the byte buffer is not element-aligned in memory.
        let bytes: Vec<u8> = 1.0f32
            .to_le_bytes()
            .iter()
            .chain(0.5f32.to_le_bytes().iter())
            .copied()
            .collect();
        let floats: Vec<f32> = bytemuck::pod_collect_to_vec(&bytes);
        assert_eq!(floats, [1.0, 0.5]);
        let halves: Vec<u16> = bytemuck::pod_collect_to_vec(&bytes);
        assert_eq!(halves.len(), 4);
    }

    #[test]
    fn report_shape() {
        use crate::introspect::CollectSink;
        let data = PixelData::new(PixelBuffer::Float(vec![0.25, 0.25, 1.0]));
        let mut sink = CollectSink::default();
        report_pixels("renderTarget2 Color Attachment", &data, &mut sink);
        assert_eq!(sink.lines.len(), 2);
        assert!(sink.lines[0].contains("3 f32 values"));
        assert!(sink.lines[1].contains("[0.25, 1.0]"));
    }
}
