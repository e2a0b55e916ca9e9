//! Experiment variant selection and per-variant scene setup.

use relay_config::RelayConfig;
use relay_core::{ColorComponentType, Shading, TagFilter};
use relay_scene::{Camera, ObjectRegistry};

/// One runnable experiment configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// Every object hardware-tested, oblique camera, relay pass enabled.
    SingleTarget,
    /// Middle object manually tested; capture renders the hardware subset
    /// only; relay pass enabled.
    ManualSplit,
    /// Objects emit their own device-space depth as color.
    DepthProbe,
    /// Manual split without the diagnostic relay target.
    Layered,
}

impl Variant {
    /// Resolve the variant from command line, environment, then config file.
    pub fn select(config: &RelayConfig) -> Self {
        let from_config = config.experiment.variant.as_deref();
        if Self::requested("single-target", from_config) {
            Self::SingleTarget
        } else if Self::requested("depth-probe", from_config) {
            Self::DepthProbe
        } else if Self::requested("layered", from_config) {
            Self::Layered
        } else if Self::requested("manual-split", from_config) {
            Self::ManualSplit
        } else {
            Self::ManualSplit
        }
    }

    fn requested(name: &str, from_config: Option<&str>) -> bool {
        std::env::args().any(|a| a == format!("--variant={name}") || a == format!("--{name}"))
            || from_config == Some(name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::SingleTarget => "single-target",
            Self::ManualSplit => "manual-split",
            Self::DepthProbe => "depth-probe",
            Self::Layered => "layered",
        }
    }

    pub fn registry(self) -> ObjectRegistry {
        match self {
            Self::SingleTarget | Self::DepthProbe => ObjectRegistry::standard(false),
            Self::ManualSplit | Self::Layered => ObjectRegistry::standard(true),
        }
    }

    pub fn camera(self, aspect: f32) -> Camera {
        match self {
            Self::SingleTarget => Camera::oblique(aspect),
            _ => Camera::standard(aspect),
        }
    }

    pub fn shading(self) -> Shading {
        match self {
            Self::DepthProbe => Shading::DepthProbe,
            _ => Shading::Flat,
        }
    }

    pub fn capture_filter(self) -> TagFilter {
        match self {
            Self::ManualSplit | Self::Layered => TagFilter::Hardware,
            Self::SingleTarget | Self::DepthProbe => TagFilter::All,
        }
    }

    pub fn wants_relay(self) -> bool {
        !matches!(self, Self::Layered)
    }

    /// Only the single-target study keeps the default byte-typed capture
    /// color; the others store float values (the probe writes raw depth and
    /// 1/w into color and needs the range outright).
    pub fn capture_component(self) -> ColorComponentType {
        match self {
            Self::SingleTarget => ColorComponentType::UnormU8,
            Self::ManualSplit | Self::DepthProbe | Self::Layered => ColorComponentType::Float32,
        }
    }
}

/// Parse the relay-target component type named in the config file.
pub fn parse_component(name: &str) -> Option<ColorComponentType> {
    match name {
        "unorm8" => Some(ColorComponentType::UnormU8),
        "half-float" => Some(ColorComponentType::HalfFloat),
        "float32" => Some(ColorComponentType::Float32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_properties() {
        assert_eq!(Variant::SingleTarget.capture_filter(), TagFilter::All);
        assert_eq!(Variant::ManualSplit.capture_filter(), TagFilter::Hardware);
        assert!(Variant::ManualSplit.wants_relay());
        assert!(Variant::DepthProbe.wants_relay());
        assert!(!Variant::Layered.wants_relay());
        assert_eq!(Variant::DepthProbe.shading(), Shading::DepthProbe);
    }

    #[test]
    fn capture_color_types_per_variant() {
        // Only the single-target study keeps byte-typed capture color.
        assert_eq!(Variant::SingleTarget.capture_component(), ColorComponentType::UnormU8);
        assert_eq!(Variant::ManualSplit.capture_component(), ColorComponentType::Float32);
        assert_eq!(Variant::Layered.capture_component(), ColorComponentType::Float32);
        assert_eq!(Variant::DepthProbe.capture_component(), ColorComponentType::Float32);
    }

    #[test]
    fn component_names_parse() {
        assert_eq!(parse_component("float32"), Some(ColorComponentType::Float32));
        assert_eq!(parse_component("half-float"), Some(ColorComponentType::HalfFloat));
        assert_eq!(parse_component("unorm8"), Some(ColorComponentType::UnormU8));
        assert_eq!(parse_component("rgba"), None);
    }
}
