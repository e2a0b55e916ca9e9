//! relay-shaders: WGSL shader sources for the depth-relay pipeline.

/// Flat-colored objects under the hardware depth test. Vertices carry a
/// world-space position (depth offset baked in) and a linear RGBA color.
pub const OBJECT_WGSL: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> camera: CameraUniform;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(@location(0) in_pos: vec3<f32>, @location(1) in_color: vec4<f32>) -> VsOut {
    var out: VsOut;
    out.pos = camera.view_proj * vec4<f32>(in_pos, 1.0);
    out.color = in_color;
    return out;
}

@fragment
fn fs_main(inp: VsOut) -> @location(0) vec4<f32> {
    return inp.color;
}
"#;

/// Manual depth test: the fragment compares its own device-space depth
/// against the captured depth texture at the same screen position and
/// discards when strictly farther. Ties render. The pipeline using this
/// shader runs with the hardware depth test and depth writes disabled.
/// The depth texture is read through a non-filtering sampler at the
/// fragment's normalized coordinate; capture and composite run at the
/// same resolution, so the nearest texel is exactly the matching one.
pub const MANUAL_DEPTH_WGSL: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> camera: CameraUniform;
@group(1) @binding(0) var t_depth: texture_2d<f32>;
@group(1) @binding(1) var s_depth: sampler;
@group(1) @binding(2) var<uniform> resolution: vec2<f32>;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(@location(0) in_pos: vec3<f32>, @location(1) in_color: vec4<f32>) -> VsOut {
    var out: VsOut;
    out.pos = camera.view_proj * vec4<f32>(in_pos, 1.0);
    out.color = in_color;
    return out;
}

@fragment
fn fs_main(inp: VsOut) -> @location(0) vec4<f32> {
    let this_frag_depth = inp.pos.z;
    // The fragment position sits at the pixel center, so dividing by the
    // resolution lands inside the matching depth texel.
    let uv = inp.pos.xy / resolution;
    let captured = textureSampleLevel(t_depth, s_depth, uv, 0.0).x;
    if (this_frag_depth > captured) {
        discard;
    }
    return inp.color;
}
"#;

/// Fullscreen relay: copies the depth texture into the red channel of a
/// color target so the otherwise invisible depth buffer can be inspected.
pub const DEPTH_RELAY_WGSL: &str = r#"
struct VsOut {
    @builtin(position) pos: vec4<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vi: u32) -> VsOut {
    var pos = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 3.0, -1.0),
        vec2<f32>(-1.0,  3.0),
    );
    var out: VsOut;
    out.pos = vec4<f32>(pos[vi], 0.0, 1.0);
    return out;
}

@group(0) @binding(0) var t_depth: texture_2d<f32>;
@group(0) @binding(1) var s_depth: sampler;
@group(0) @binding(2) var<uniform> resolution: vec2<f32>;

@fragment
fn fs_main(inp: VsOut) -> @location(0) vec4<f32> {
    let uv = inp.pos.xy / resolution;
    let depth = textureSampleLevel(t_depth, s_depth, uv, 0.0).x;
    return vec4<f32>(depth, 0.0, 0.0, 1.0);
}
"#;

/// Depth probe: objects emit their own device-space depth as color
/// (z in the blue channel, clip-space w in alpha), making the depth values
/// readable from a float color target without touching the depth buffer.
pub const DEPTH_PROBE_WGSL: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> camera: CameraUniform;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(@location(0) in_pos: vec3<f32>, @location(1) in_color: vec4<f32>) -> VsOut {
    var out: VsOut;
    out.pos = camera.view_proj * vec4<f32>(in_pos, 1.0);
    out.color = in_color;
    return out;
}

@fragment
fn fs_main(inp: VsOut) -> @location(0) vec4<f32> {
    // The fragment position's w holds 1/clip.w, so 1/pos.w recovers the
    // perspective divisor alongside the non-linear device depth in z.
    return vec4<f32>(0.0, 0.0, inp.pos.z, 1.0 / inp.pos.w);
}
"#;
