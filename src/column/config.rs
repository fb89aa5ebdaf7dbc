//! Serializable column configuration.
//!
//! Config files name their generators and formatters; a [`TransformRegistry`]
//! resolves those names into functions once, when the [`ColumnSpec`] is built.

use std::collections::HashMap;
use std::rc::Rc;
use std::str::FromStr;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

use super::{ColumnSpec, Columns, Formatter, Generator, SizePolicy};
use crate::clickable::LinkText;
use crate::value::{Content, Record, Value};
use crate::{Error, Result};

/// Column as written in a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    /// Name of a registered generator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate: Option<String>,
    /// Name of a registered formatter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// `[fg, bg]`; an empty string inherits the row color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeConfig>,
}

/// Either a bare fixed width or a full policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeConfig {
    Width(u16),
    Policy {
        kind: String,
        #[serde(default = "default_amount")]
        amount: u16,
        #[serde(default, rename = "box")]
        boxed: bool,
    },
}

const fn default_amount() -> u16 {
    1
}

impl SizeConfig {
    pub fn to_policy(&self) -> Result<SizePolicy> {
        match self {
            Self::Width(width) => Ok(SizePolicy::given(*width)),
            Self::Policy {
                kind,
                amount,
                boxed,
            } => SizePolicy::parse(kind, *amount, *boxed),
        }
    }
}

fn parse_color(value: &str) -> Result<Option<Color>> {
    if value.is_empty() {
        return Ok(None);
    }
    Color::from_str(value)
        .map(Some)
        .map_err(|_| Error::InvalidColor {
            value: value.to_string(),
        })
}

/// Named generators and formatters available to column configs.
pub struct TransformRegistry {
    generators: HashMap<String, Generator>,
    formatters: HashMap<String, Formatter>,
}

impl Default for TransformRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register_formatter("upper", |v| map_str(v, str::to_uppercase));
        registry.register_formatter("lower", |v| map_str(v, str::to_lowercase));
        registry.register_formatter("trim", |v| map_str(v, |s| s.trim().to_string()));
        registry.register_formatter("yes_no", |v| match v {
            Value::Bool(true) => "yes".into(),
            Value::Bool(false) => "no".into(),
            other => other.into(),
        });
        registry.register_formatter("bytes", |v| match v {
            #[allow(clippy::cast_precision_loss)]
            Value::Int(n) => format_bytes(n as f64).into(),
            Value::Float(x) => format_bytes(x).into(),
            other => other.into(),
        });
        registry.register_generator("link", link_generator);
        registry
    }
}

impl TransformRegistry {
    /// A registry without the built-in transforms.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            generators: HashMap::new(),
            formatters: HashMap::new(),
        }
    }

    pub fn register_generator(
        &mut self,
        name: impl Into<String>,
        generator: impl Fn(&Record) -> Content + 'static,
    ) {
        self.generators.insert(name.into(), Rc::new(generator));
    }

    pub fn register_formatter(
        &mut self,
        name: impl Into<String>,
        formatter: impl Fn(Value) -> Content + 'static,
    ) {
        self.formatters.insert(name.into(), Rc::new(formatter));
    }

    /// Turn one config entry into a column spec.
    pub fn resolve(&self, config: &ColumnConfig) -> Result<ColumnSpec> {
        let mut spec = ColumnSpec::new(&config.key);
        spec.header.clone_from(&config.header);

        if let Some(name) = &config.generate {
            let generator = self
                .generators
                .get(name)
                .ok_or_else(|| Error::UnknownTransform { name: name.clone() })?;
            spec.generator = Some(Rc::clone(generator));
        }
        if let Some(name) = &config.format {
            let formatter = self
                .formatters
                .get(name)
                .ok_or_else(|| Error::UnknownTransform { name: name.clone() })?;
            spec.formatter = Some(Rc::clone(formatter));
        }
        if let Some((fg, bg)) = &config.color {
            spec = spec.color(parse_color(fg)?, parse_color(bg)?);
        }
        if let Some(size) = &config.size {
            spec.size = size.to_policy()?;
        }
        Ok(spec)
    }

    pub fn resolve_all<'a>(&self, configs: impl IntoIterator<Item = &'a ColumnConfig>) -> Result<Columns> {
        let specs = configs
            .into_iter()
            .map(|c| self.resolve(c))
            .collect::<Result<Vec<_>>>()?;
        Columns::new(specs)
    }
}

fn map_str(value: Value, f: impl Fn(&str) -> String) -> Content {
    match value {
        Value::Str(s) => Content::Value(Value::Str(f(&s))),
        other => other.into(),
    }
}

fn link_generator(record: &Record) -> Content {
    let Some(url) = record.get("url").and_then(Value::as_str) else {
        return Value::Null.into();
    };
    let title = record
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or(url)
        .to_string();
    Content::widget(LinkText::new(title, url))
}

fn format_bytes(bytes: f64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes;
    let mut unit = 0;
    while size.abs() >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{size} {}", UNITS[0])
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::SizeKind;

    fn parse(toml_src: &str) -> Vec<ColumnConfig> {
        #[derive(Deserialize)]
        struct Wrapper {
            columns: Vec<ColumnConfig>,
        }
        toml::from_str::<Wrapper>(toml_src).unwrap().columns
    }

    #[test]
    fn test_parse_size_forms() {
        let configs = parse(
            r#"
            [[columns]]
            key = "name"
            size = { kind = "weight", amount = 3 }

            [[columns]]
            key = "port"
            size = 6

            [[columns]]
            key = "state"
            size = { kind = "pack" }
            "#,
        );
        let registry = TransformRegistry::default();
        let columns = registry.resolve_all(&configs).unwrap();
        let sizes: Vec<_> = columns.iter().map(|c| c.size).collect();
        assert_eq!(
            sizes,
            [SizePolicy::weight(3), SizePolicy::given(6), SizePolicy::pack()]
        );
        assert_eq!(sizes[2].kind, SizeKind::Pack);
    }

    #[test]
    fn test_bogus_size_fails() {
        let configs = parse(
            r#"
            [[columns]]
            key = "x"
            size = { kind = "bogus", amount = 1 }
            "#,
        );
        let result = TransformRegistry::default().resolve_all(&configs);
        assert!(matches!(result, Err(Error::InvalidColumnSize { .. })));
    }

    #[test]
    fn test_unknown_transform_fails() {
        let config = ColumnConfig {
            key: "x".into(),
            format: Some("shout".into()),
            ..Default::default()
        };
        let result = TransformRegistry::default().resolve(&config);
        assert!(matches!(result, Err(Error::UnknownTransform { ref name }) if name == "shout"));
    }

    #[test]
    fn test_color_parsing() {
        let config = ColumnConfig {
            key: "x".into(),
            color: Some(("yellow".into(), String::new())),
            ..Default::default()
        };
        let spec = TransformRegistry::default().resolve(&config).unwrap();
        assert_eq!(spec.color.unwrap().fg, Some(Color::Yellow));
        assert_eq!(spec.color.unwrap().bg, None);

        let bad = ColumnConfig {
            key: "x".into(),
            color: Some(("not-a-color".into(), String::new())),
            ..Default::default()
        };
        assert!(matches!(
            TransformRegistry::default().resolve(&bad),
            Err(Error::InvalidColor { .. })
        ));
    }

    #[test]
    fn test_builtin_formatters() {
        let registry = TransformRegistry::default();
        let upper = &registry.formatters["upper"];
        assert!(matches!(upper("abc".into()), Content::Value(Value::Str(ref s)) if s == "ABC"));

        let yes_no = &registry.formatters["yes_no"];
        assert!(matches!(yes_no(Value::Bool(false)), Content::Value(Value::Str(ref s)) if s == "no"));

        let bytes = &registry.formatters["bytes"];
        assert!(matches!(bytes(Value::Int(1536)), Content::Value(Value::Str(ref s)) if s == "1.5 KiB"));
        assert!(matches!(bytes(Value::Int(512)), Content::Value(Value::Str(ref s)) if s == "512 B"));
    }

    #[test]
    fn test_link_generator() {
        let record = Record::new()
            .with("url", "https://example.com")
            .with("title", "Example");
        let content = link_generator(&record);
        let Content::Widget(widget) = content else {
            panic!("expected a widget");
        };
        assert_eq!(widget.text(), "Example");

        assert!(matches!(link_generator(&Record::new()), Content::Value(Value::Null)));
    }
}
