//! relay-scene: flat drawable objects, their registry, named colors and the
//! perspective camera feeding the relay pipeline.

mod camera;
mod color;
mod mesh;

pub use camera::Camera;
pub use color::{deep_pink, medium_violet_red, pale_violet_red, ColorLin};
pub use mesh::{tessellate, upload_registry};

use relay_core::{DepthMode, TagFilter};

/// A flat quad at a world depth offset, with a depth-test tag deciding how
/// its fragments are tested in the composite pass. Created once at setup,
/// immutable for the rest of the run.
#[derive(Clone, Debug)]
pub struct DrawableObject {
    pub name: String,
    /// Edge length of the square quad.
    pub size: f32,
    /// World-space z offset.
    pub depth: f32,
    pub color: ColorLin,
    pub depth_mode: DepthMode,
}

impl DrawableObject {
    pub fn new(name: &str, size: f32, depth: f32, color: ColorLin, depth_mode: DepthMode) -> Self {
        Self {
            name: name.to_owned(),
            size,
            depth,
            color,
            depth_mode,
        }
    }
}

/// Owns the canonical object list. Passes receive borrowed, read-only views
/// plus a tag filter, never a shared mutable array.
#[derive(Clone, Debug, Default)]
pub struct ObjectRegistry {
    objects: Vec<DrawableObject>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: DrawableObject) {
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[DrawableObject] {
        &self.objects
    }

    pub fn filtered<'a>(&'a self, filter: TagFilter) -> impl Iterator<Item = &'a DrawableObject> {
        self.objects.iter().filter(move |o| filter.admits(o.depth_mode))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// The three stacked quads every experiment variant renders. When
    /// `middle_manual` is set, the middle quad takes the manual depth test.
    pub fn standard(middle_manual: bool) -> Self {
        let middle_mode = if middle_manual { DepthMode::Manual } else { DepthMode::Hardware };
        let mut registry = Self::new();
        registry.add(DrawableObject::new(
            "DeepPink",
            20.0,
            1.0,
            color::deep_pink(),
            DepthMode::Hardware,
        ));
        registry.add(DrawableObject::new(
            "MediumVioletRed",
            4.0,
            2.0,
            color::medium_violet_red(),
            middle_mode,
        ));
        registry.add(DrawableObject::new(
            "PaleVioletRed",
            2.0,
            3.0,
            color::pale_violet_red(),
            DepthMode::Hardware,
        ));
        registry
    }
}
