//! Texture configuration introspection: numeric configuration codes, the
//! immutable code→name table, and line-oriented diagnostic reports.

/// Numeric configuration codes, as recorded on each attachment's descriptor.
pub mod codes {
    pub const UV_MAPPING: u32 = 300;
    pub const CUBE_REFLECTION_MAPPING: u32 = 301;
    pub const CUBE_REFRACTION_MAPPING: u32 = 302;
    pub const EQUIRECTANGULAR_REFLECTION_MAPPING: u32 = 303;
    pub const EQUIRECTANGULAR_REFRACTION_MAPPING: u32 = 304;
    pub const CUBE_UV_REFLECTION_MAPPING: u32 = 306;

    pub const REPEAT_WRAPPING: u32 = 1000;
    pub const CLAMP_TO_EDGE_WRAPPING: u32 = 1001;
    pub const MIRRORED_REPEAT_WRAPPING: u32 = 1002;

    pub const NEAREST_FILTER: u32 = 1003;
    pub const NEAREST_MIPMAP_NEAREST_FILTER: u32 = 1004;
    pub const NEAREST_MIPMAP_LINEAR_FILTER: u32 = 1005;
    pub const LINEAR_FILTER: u32 = 1006;
    pub const LINEAR_MIPMAP_NEAREST_FILTER: u32 = 1007;
    pub const LINEAR_MIPMAP_LINEAR_FILTER: u32 = 1008;

    pub const UNSIGNED_BYTE_TYPE: u32 = 1009;
    pub const BYTE_TYPE: u32 = 1010;
    pub const SHORT_TYPE: u32 = 1011;
    pub const UNSIGNED_SHORT_TYPE: u32 = 1012;
    pub const INT_TYPE: u32 = 1013;
    pub const UNSIGNED_INT_TYPE: u32 = 1014;
    pub const FLOAT_TYPE: u32 = 1015;
    pub const HALF_FLOAT_TYPE: u32 = 1016;
    pub const UNSIGNED_SHORT_4444_TYPE: u32 = 1017;
    pub const UNSIGNED_SHORT_5551_TYPE: u32 = 1018;
    pub const UNSIGNED_INT_248_TYPE: u32 = 1020;

    pub const ALPHA_FORMAT: u32 = 1021;
    pub const RGB_FORMAT: u32 = 1022;
    pub const RGBA_FORMAT: u32 = 1023;
    pub const LUMINANCE_FORMAT: u32 = 1024;
    pub const LUMINANCE_ALPHA_FORMAT: u32 = 1025;
    pub const DEPTH_FORMAT: u32 = 1026;
    pub const DEPTH_STENCIL_FORMAT: u32 = 1027;
    pub const RED_FORMAT: u32 = 1028;
    pub const RED_INTEGER_FORMAT: u32 = 1029;
    pub const RG_FORMAT: u32 = 1030;
    pub const RG_INTEGER_FORMAT: u32 = 1031;
    pub const RGBA_INTEGER_FORMAT: u32 = 1033;

    pub const LINEAR_ENCODING: u32 = 3000;
    pub const SRGB_ENCODING: u32 = 3001;
}

/// Statically-built mapping from configuration code to display name.
/// Unknown codes return `None`; callers render those as `"? (code)"`.
pub fn constant_name(code: u32) -> Option<&'static str> {
    use codes::*;
    Some(match code {
        UV_MAPPING => "UVMapping",
        CUBE_REFLECTION_MAPPING => "CubeReflectionMapping",
        CUBE_REFRACTION_MAPPING => "CubeRefractionMapping",
        EQUIRECTANGULAR_REFLECTION_MAPPING => "EquirectangularReflectionMapping",
        EQUIRECTANGULAR_REFRACTION_MAPPING => "EquirectangularRefractionMapping",
        CUBE_UV_REFLECTION_MAPPING => "CubeUVReflectionMapping",
        REPEAT_WRAPPING => "RepeatWrapping",
        CLAMP_TO_EDGE_WRAPPING => "ClampToEdgeWrapping",
        MIRRORED_REPEAT_WRAPPING => "MirroredRepeatWrapping",
        NEAREST_FILTER => "NearestFilter",
        NEAREST_MIPMAP_NEAREST_FILTER => "NearestMipmapNearestFilter",
        NEAREST_MIPMAP_LINEAR_FILTER => "NearestMipmapLinearFilter",
        LINEAR_FILTER => "LinearFilter",
        LINEAR_MIPMAP_NEAREST_FILTER => "LinearMipmapNearestFilter",
        LINEAR_MIPMAP_LINEAR_FILTER => "LinearMipmapLinearFilter",
        UNSIGNED_BYTE_TYPE => "UnsignedByteType",
        BYTE_TYPE => "ByteType",
        SHORT_TYPE => "ShortType",
        UNSIGNED_SHORT_TYPE => "UnsignedShortType",
        INT_TYPE => "IntType",
        UNSIGNED_INT_TYPE => "UnsignedIntType",
        FLOAT_TYPE => "FloatType",
        HALF_FLOAT_TYPE => "HalfFloatType",
        UNSIGNED_SHORT_4444_TYPE => "UnsignedShort4444Type",
        UNSIGNED_SHORT_5551_TYPE => "UnsignedShort5551Type",
        UNSIGNED_INT_248_TYPE => "UnsignedInt248Type",
        ALPHA_FORMAT => "AlphaFormat",
        RGB_FORMAT => "RGBFormat",
        RGBA_FORMAT => "RGBAFormat",
        LUMINANCE_FORMAT => "LuminanceFormat",
        LUMINANCE_ALPHA_FORMAT => "LuminanceAlphaFormat",
        DEPTH_FORMAT => "DepthFormat",
        DEPTH_STENCIL_FORMAT => "DepthStencilFormat",
        RED_FORMAT => "RedFormat",
        RED_INTEGER_FORMAT => "RedIntegerFormat",
        RG_FORMAT => "RGFormat",
        RG_INTEGER_FORMAT => "RGIntegerFormat",
        RGBA_INTEGER_FORMAT => "RGBAIntegerFormat",
        LINEAR_ENCODING => "LinearEncoding",
        SRGB_ENCODING => "sRGBEncoding",
        _ => return None,
    })
}

/// Render a configuration code as `"Name (code)"`, or `"? (code)"` for an
/// unrecognized code. Never fails.
pub fn lookup_constant(code: u32) -> String {
    match constant_name(code) {
        Some(name) => format!("{name} ({code})"),
        None => format!("? ({code})"),
    }
}

/// Read-only view of a texture's configuration, captured when the
/// attachment is created. Purely for reporting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureDescriptor {
    pub name: String,
    pub encoding: u32,
    pub format: u32,
    pub mag_filter: u32,
    pub min_filter: u32,
    pub mapping: u32,
    pub component_type: u32,
    pub wrap_s: u32,
    pub wrap_t: u32,
}

const KEY_WIDTH: usize = 12;

impl TextureDescriptor {
    /// Produce the report body, one `key: value` entry per line with keys
    /// left-padded to a fixed width.
    pub fn report_lines(&self) -> Vec<String> {
        let entry = |key: &str, value: String| format!("  {key:<KEY_WIDTH$}: {value}");
        vec![
            entry("name", self.name.clone()),
            entry("encoding", lookup_constant(self.encoding)),
            entry("format", lookup_constant(self.format)),
            entry("magFilter", lookup_constant(self.mag_filter)),
            entry("minFilter", lookup_constant(self.min_filter)),
            entry("mapping", lookup_constant(self.mapping)),
            entry("type", lookup_constant(self.component_type)),
            entry("wrapS", lookup_constant(self.wrap_s)),
            entry("wrapT", lookup_constant(self.wrap_t)),
        ]
    }
}

/// Line-oriented sink for diagnostic reports.
pub trait DiagnosticSink {
    fn line(&mut self, line: &str);
}

/// Writes each report line to stdout.
pub struct StdoutSink;

impl DiagnosticSink for StdoutSink {
    fn line(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Collects report lines in memory, for tests and captured reports.
#[derive(Default)]
pub struct CollectSink {
    pub lines: Vec<String>,
}

impl DiagnosticSink for CollectSink {
    fn line(&mut self, line: &str) {
        self.lines.push(line.to_owned());
    }
}

/// Emit a labeled texture report. Read-only and idempotent: repeated calls
/// on an unchanged descriptor produce identical output.
pub fn describe_texture(label: &str, descriptor: &TextureDescriptor, sink: &mut dyn DiagnosticSink) {
    sink.line(&format!("{label}:"));
    for line in descriptor.report_lines() {
        sink.line(&line);
    }
}
