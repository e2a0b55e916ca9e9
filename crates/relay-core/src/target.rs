//! Render target set: offscreen color/depth attachments sized to the output
//! surface. At most one target carries a sampleable depth attachment that
//! later passes consume as a texture input.

use std::sync::Arc;

use crate::error::RelayError;
use crate::introspect::{TextureDescriptor, codes};

/// Closed set of color component types a target can store. The host-side
/// readback element type is derived from this by exhaustive match, never by
/// a fallback branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorComponentType {
    /// 8-bit unsigned normalized (`Rgba8Unorm`).
    UnormU8,
    /// 16-bit half float (`Rgba16Float`).
    HalfFloat,
    /// 32-bit float (`Rgba32Float`).
    Float32,
}

impl ColorComponentType {
    pub fn texture_format(self) -> wgpu::TextureFormat {
        match self {
            Self::UnormU8 => wgpu::TextureFormat::Rgba8Unorm,
            Self::HalfFloat => wgpu::TextureFormat::Rgba16Float,
            Self::Float32 => wgpu::TextureFormat::Rgba32Float,
        }
    }

    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::UnormU8 => 4,
            Self::HalfFloat => 8,
            Self::Float32 => 16,
        }
    }

    /// Configuration code for the introspection report.
    pub fn type_code(self) -> u32 {
        match self {
            Self::UnormU8 => codes::UNSIGNED_BYTE_TYPE,
            Self::HalfFloat => codes::HALF_FLOAT_TYPE,
            Self::Float32 => codes::FLOAT_TYPE,
        }
    }

    /// Whether this type can hold relayed depth values without quantizing
    /// them into a normalized 8-bit range.
    pub fn holds_depth_range(self) -> bool {
        matches!(self, Self::HalfFloat | Self::Float32)
    }
}

/// An owned texture attachment together with its read-only configuration
/// descriptor.
#[derive(Debug)]
pub struct Attachment {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub descriptor: TextureDescriptor,
}

/// Offscreen render target. Created once at setup; a size change requires
/// destroying and recreating the target.
#[derive(Debug)]
pub struct RenderTarget {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub component: ColorComponentType,
    pub color: Attachment,
    depth: Option<Attachment>,
}

impl RenderTarget {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn has_depth_texture(&self) -> bool {
        self.depth.is_some()
    }

    /// The sampleable depth attachment, or an error when the target was
    /// created without one.
    pub fn depth(&self) -> Result<&Attachment, RelayError> {
        self.depth.as_ref().ok_or_else(|| RelayError::MissingDepthAttachment {
            label: self.label.clone(),
        })
    }
}

/// Handle into a [`TargetSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetId(usize);

/// Owns the offscreen render targets for one run.
pub struct TargetSet {
    device: Arc<wgpu::Device>,
    targets: Vec<RenderTarget>,
}

impl TargetSet {
    pub fn new(device: Arc<wgpu::Device>) -> Self {
        Self { device, targets: Vec::new() }
    }

    /// Create an offscreen target. When `wants_depth_texture` is set, the
    /// depth attachment is created with `TEXTURE_BINDING` usage so later
    /// shader stages can sample it; this is the feature the whole relay
    /// pipeline depends on, and it must be requested explicitly.
    pub fn create_render_target(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        wants_depth_texture: bool,
        component: ColorComponentType,
    ) -> TargetId {
        let color = self.create_color_attachment(label, width, height, component);
        let depth = wants_depth_texture.then(|| self.create_depth_attachment(label, width, height));
        log::info!(
            "created render target '{label}' {width}x{height} ({:?}, depth texture: {})",
            component,
            depth.is_some()
        );
        self.targets.push(RenderTarget {
            label: label.to_owned(),
            width,
            height,
            component,
            color,
            depth,
        });
        TargetId(self.targets.len() - 1)
    }

    pub fn get(&self, id: TargetId) -> &RenderTarget {
        &self.targets[id.0]
    }

    /// A plain depth buffer for the composite destination's hardware depth
    /// test. Not sampleable and not part of the target set, but readable
    /// back for inspection.
    pub fn surface_depth(&self, width: u32, height: u32) -> Attachment {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("surface-depth"),
            size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let descriptor = TextureDescriptor {
            name: "Surface Depth Attachment".to_owned(),
            encoding: codes::LINEAR_ENCODING,
            format: codes::DEPTH_FORMAT,
            mag_filter: codes::NEAREST_FILTER,
            min_filter: codes::NEAREST_FILTER,
            mapping: codes::UV_MAPPING,
            component_type: codes::FLOAT_TYPE,
            wrap_s: codes::CLAMP_TO_EDGE_WRAPPING,
            wrap_t: codes::CLAMP_TO_EDGE_WRAPPING,
        };
        Attachment { texture, view, descriptor }
    }

    fn create_color_attachment(
        &self,
        target_label: &str,
        width: u32,
        height: u32,
        component: ColorComponentType,
    ) -> Attachment {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{target_label}:color")),
            size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: component.texture_format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let descriptor = TextureDescriptor {
            name: format!("{target_label} Color Attachment"),
            encoding: codes::LINEAR_ENCODING,
            format: codes::RGBA_FORMAT,
            mag_filter: codes::LINEAR_FILTER,
            min_filter: codes::LINEAR_FILTER,
            mapping: codes::UV_MAPPING,
            component_type: component.type_code(),
            wrap_s: codes::CLAMP_TO_EDGE_WRAPPING,
            wrap_t: codes::CLAMP_TO_EDGE_WRAPPING,
        };
        Attachment { texture, view, descriptor }
    }

    fn create_depth_attachment(&self, target_label: &str, width: u32, height: u32) -> Attachment {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{target_label}:depth")),
            size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let descriptor = TextureDescriptor {
            name: format!("{target_label} Depth Attachment"),
            encoding: codes::LINEAR_ENCODING,
            format: codes::DEPTH_FORMAT,
            mag_filter: codes::NEAREST_FILTER,
            min_filter: codes::NEAREST_FILTER,
            mapping: codes::UV_MAPPING,
            component_type: codes::FLOAT_TYPE,
            wrap_s: codes::CLAMP_TO_EDGE_WRAPPING,
            wrap_t: codes::CLAMP_TO_EDGE_WRAPPING,
        };
        Attachment { texture, view, descriptor }
    }
}

/// Tracks the active draw destination. Binding the already-bound destination
/// is a no-op; `bind` reports whether the destination actually changed.
#[derive(Default)]
pub struct BindingTracker {
    bound: Option<String>,
}

impl BindingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, label: &str) -> bool {
        if self.bound.as_deref() == Some(label) {
            log::debug!("destination '{label}' already bound, no-op");
            return false;
        }
        self.bound = Some(label.to_owned());
        true
    }

    pub fn current(&self) -> Option<&str> {
        self.bound.as_deref()
    }

    /// Reject binding `destination` while it is a sampler source of the
    /// pass about to run.
    pub fn ensure_disjoint(destination: &str, sampled: &[&str]) -> Result<(), RelayError> {
        if sampled.contains(&destination) {
            return Err(RelayError::TargetBoundAsSampler { label: destination.to_owned() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_type_mapping() {
        assert_eq!(ColorComponentType::UnormU8.bytes_per_pixel(), 4);
        assert_eq!(ColorComponentType::HalfFloat.bytes_per_pixel(), 8);
        assert_eq!(ColorComponentType::Float32.bytes_per_pixel(), 16);
        assert_eq!(
            ColorComponentType::Float32.texture_format(),
            wgpu::TextureFormat::Rgba32Float
        );
        assert!(!ColorComponentType::UnormU8.holds_depth_range());
        assert!(ColorComponentType::HalfFloat.holds_depth_range());
    }

    #[test]
    fn rebinding_same_destination_is_noop() {
        let mut tracker = BindingTracker::new();
        assert!(tracker.bind("renderTarget1"));
        assert!(!tracker.bind("renderTarget1"));
        assert!(tracker.bind("renderTarget2"));
        assert_eq!(tracker.current(), Some("renderTarget2"));
    }

    #[test]
    fn destination_must_not_be_sampled() {
        let err = BindingTracker::ensure_disjoint("renderTarget1", &["renderTarget1"]).unwrap_err();
        assert!(matches!(err, RelayError::TargetBoundAsSampler { .. }));
        assert!(BindingTracker::ensure_disjoint("renderTarget2", &["renderTarget1"]).is_ok());
    }
}
