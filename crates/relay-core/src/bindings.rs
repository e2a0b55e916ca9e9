//! Named shader bindings for reporting and the one documented inter-pass
//! mutation: attaching the freshly captured depth texture.

use std::collections::BTreeMap;
use std::fmt;

use crate::introspect::DiagnosticSink;

/// Typed value behind a named binding. Texture references are non-owning
/// labels: the binding reads whatever the target set currently holds there
/// and does not extend the texture's lifetime.
#[derive(Clone, Debug, PartialEq)]
pub enum BindingValue {
    Scalar(f32),
    Vec2([f32; 2]),
    Texture(Option<String>),
}

impl fmt::Display for BindingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{v}"),
            Self::Vec2([x, y]) => write!(f, "({x}, {y})"),
            Self::Texture(Some(label)) => write!(f, "texture '{label}'"),
            Self::Texture(None) => write!(f, "texture <unbound>"),
        }
    }
}

/// Named uniform/parameter map owned by a program instance.
#[derive(Clone, Debug, Default)]
pub struct ShaderBindings {
    entries: BTreeMap<String, BindingValue>,
}

impl ShaderBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: BindingValue) {
        self.entries.insert(name.to_owned(), value);
    }

    pub fn get(&self, name: &str) -> Option<&BindingValue> {
        self.entries.get(name)
    }

    pub fn report(&self, label: &str, sink: &mut dyn DiagnosticSink) {
        sink.line(&format!("{label}:"));
        for (name, value) in &self.entries {
            sink.line(&format!("  {name:<12}: {value}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::CollectSink;

    #[test]
    fn texture_binding_starts_unbound() {
        let mut bindings = ShaderBindings::new();
        bindings.set("tDepth", BindingValue::Texture(None));
        bindings.set("resolution", BindingValue::Vec2([250.0, 250.0]));
        assert_eq!(bindings.get("tDepth"), Some(&BindingValue::Texture(None)));

        bindings.set("tDepth", BindingValue::Texture(Some("renderTarget1".into())));
        assert_eq!(
            bindings.get("tDepth"),
            Some(&BindingValue::Texture(Some("renderTarget1".into())))
        );
    }

    #[test]
    fn report_lists_entries_in_stable_order() {
        let mut bindings = ShaderBindings::new();
        bindings.set("tDepth", BindingValue::Texture(None));
        bindings.set("color", BindingValue::Scalar(1.0));
        let mut sink = CollectSink::default();
        bindings.report("material", &mut sink);
        assert_eq!(sink.lines[0], "material:");
        assert!(sink.lines[1].starts_with("  color"));
        assert!(sink.lines[2].starts_with("  tDepth"));
    }
}
