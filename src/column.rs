//! Column configuration shared by a table and its rows.

pub mod config;

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use ratatui::style::{Color, Style};

use crate::value::{Content, Record, Value};
use crate::{Error, Result};

/// Derives a cell's value from the whole record.
pub type Generator = Rc<dyn Fn(&Record) -> Content>;

/// Turns a raw value into something displayable.
pub type Formatter = Rc<dyn Fn(Value) -> Content>;

/// Foreground/background pair. `None` leaves that channel alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorPair {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
}

impl ColorPair {
    #[must_use]
    pub const fn new(fg: Option<Color>, bg: Option<Color>) -> Self {
        Self { fg, bg }
    }

    /// Fill channels left as `None` from `fallback`.
    #[must_use]
    pub fn or(self, fallback: Option<Self>) -> Self {
        let fallback = fallback.unwrap_or_default();
        Self {
            fg: self.fg.or(fallback.fg),
            bg: self.bg.or(fallback.bg),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fg.is_none() && self.bg.is_none()
    }

    #[must_use]
    pub fn to_style(self) -> Style {
        let mut style = Style::default();
        if let Some(fg) = self.fg {
            style = style.fg(fg);
        }
        if let Some(bg) = self.bg {
            style = style.bg(bg);
        }
        style
    }
}

/// How a column claims horizontal space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeKind {
    /// Share of the space left after fixed columns, proportional to the amount.
    Weight,
    /// Exactly `amount` cells wide.
    Given,
    /// As wide as the cell's content.
    Pack,
}

impl FromStr for SizeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "weight" => Ok(Self::Weight),
            "given" => Ok(Self::Given),
            "pack" => Ok(Self::Pack),
            other => Err(Error::InvalidColumnSize {
                kind: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for SizeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Weight => "weight",
            Self::Given => "given",
            Self::Pack => "pack",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizePolicy {
    pub kind: SizeKind,
    /// Weight or width; unused for [`SizeKind::Pack`].
    pub amount: u16,
    /// Cell fills the row height instead of deciding it.
    pub boxed: bool,
}

impl SizePolicy {
    #[must_use]
    pub const fn weight(weight: u16) -> Self {
        Self {
            kind: SizeKind::Weight,
            amount: weight,
            boxed: false,
        }
    }

    #[must_use]
    pub const fn given(width: u16) -> Self {
        Self {
            kind: SizeKind::Given,
            amount: width,
            boxed: false,
        }
    }

    #[must_use]
    pub const fn pack() -> Self {
        Self {
            kind: SizeKind::Pack,
            amount: 0,
            boxed: false,
        }
    }

    #[must_use]
    pub const fn boxed(mut self) -> Self {
        self.boxed = true;
        self
    }

    /// Build a policy from a kind token such as `"weight"`.
    pub fn parse(kind: &str, amount: u16, boxed: bool) -> Result<Self> {
        let kind: SizeKind = kind.parse()?;
        let amount = if kind == SizeKind::Pack { 0 } else { amount };
        Ok(Self { kind, amount, boxed })
    }
}

impl Default for SizePolicy {
    fn default() -> Self {
        Self::weight(1)
    }
}

/// How one named record field becomes a cell.
#[derive(Clone)]
pub struct ColumnSpec {
    pub key: String,
    pub header: Option<String>,
    pub generator: Option<Generator>,
    pub formatter: Option<Formatter>,
    pub color: Option<ColorPair>,
    pub size: SizePolicy,
}

impl ColumnSpec {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: None,
            generator: None,
            formatter: None,
            color: None,
            size: SizePolicy::default(),
        }
    }

    #[must_use]
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    #[must_use]
    pub fn generator(mut self, generator: impl Fn(&Record) -> Content + 'static) -> Self {
        self.generator = Some(Rc::new(generator));
        self
    }

    #[must_use]
    pub fn formatter(mut self, formatter: impl Fn(Value) -> Content + 'static) -> Self {
        self.formatter = Some(Rc::new(formatter));
        self
    }

    #[must_use]
    pub const fn color(mut self, fg: Option<Color>, bg: Option<Color>) -> Self {
        self.color = Some(ColorPair::new(fg, bg));
        self
    }

    #[must_use]
    pub const fn size(mut self, size: SizePolicy) -> Self {
        self.size = size;
        self
    }

    /// Header label, falling back to the column key.
    #[must_use]
    pub fn label(&self) -> &str {
        self.header.as_deref().unwrap_or(&self.key)
    }
}

impl fmt::Debug for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("generator", &self.generator.is_some())
            .field("formatter", &self.formatter.is_some())
            .field("color", &self.color)
            .field("size", &self.size)
            .finish()
    }
}

/// Ordered set of column specs with unique keys.
///
/// Declaration order is left-to-right display order.
#[derive(Debug, Clone, Default)]
pub struct Columns {
    specs: Vec<ColumnSpec>,
}

impl Columns {
    pub fn new(specs: impl IntoIterator<Item = ColumnSpec>) -> Result<Self> {
        let mut columns = Self::default();
        for spec in specs {
            columns.push(spec)?;
        }
        Ok(columns)
    }

    pub fn push(&mut self, spec: ColumnSpec) -> Result<()> {
        if self.get(&spec.key).is_some() {
            return Err(Error::DuplicateColumn { key: spec.key });
        }
        self.specs.push(spec);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ColumnSpec> {
        self.specs.iter().find(|c| c.key == key)
    }

    /// Display position of `key`.
    pub fn position(&self, key: &str) -> Result<usize> {
        self.specs
            .iter()
            .position(|c| c.key == key)
            .ok_or_else(|| Error::UnknownColumn {
                key: key.to_string(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.specs.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|c| c.key.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl<'a> IntoIterator for &'a Columns {
    type Item = &'a ColumnSpec;
    type IntoIter = std::slice::Iter<'a, ColumnSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_parse() {
        assert_eq!(SizePolicy::parse("weight", 2, false).unwrap(), SizePolicy::weight(2));
        assert_eq!(SizePolicy::parse("given", 10, false).unwrap(), SizePolicy::given(10));
        assert_eq!(SizePolicy::parse("pack", 7, false).unwrap(), SizePolicy::pack());
        assert_eq!(
            SizePolicy::parse("weight", 1, true).unwrap(),
            SizePolicy::weight(1).boxed()
        );
    }

    #[test]
    fn test_invalid_size_rejected() {
        let err = SizePolicy::parse("bogus", 1, false).unwrap_err();
        assert!(matches!(err, Error::InvalidColumnSize { ref kind } if kind == "bogus"));
        assert_eq!(err.to_string(), "invalid column size `bogus`");
    }

    #[test]
    fn test_default_size() {
        let spec = ColumnSpec::new("a");
        assert_eq!(spec.size, SizePolicy::weight(1));
        assert!(!spec.size.boxed);
    }

    #[test]
    fn test_columns_order_and_lookup() {
        let columns = Columns::new([ColumnSpec::new("b"), ColumnSpec::new("a"), ColumnSpec::new("c")])
            .unwrap();
        assert_eq!(columns.keys().collect::<Vec<_>>(), ["b", "a", "c"]);
        assert_eq!(columns.position("a").unwrap(), 1);
        assert!(matches!(columns.position("z"), Err(Error::UnknownColumn { .. })));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let result = Columns::new([ColumnSpec::new("a"), ColumnSpec::new("a")]);
        assert!(matches!(result, Err(Error::DuplicateColumn { ref key }) if key == "a"));
    }

    #[test]
    fn test_color_pair_fallback() {
        let column = ColorPair::new(Some(Color::Red), None);
        let row = ColorPair::new(Some(Color::White), Some(Color::DarkGray));
        assert_eq!(
            column.or(Some(row)),
            ColorPair::new(Some(Color::Red), Some(Color::DarkGray))
        );
        assert_eq!(column.or(None), column);
    }

    #[test]
    fn test_label_falls_back_to_key() {
        assert_eq!(ColumnSpec::new("port").label(), "port");
        assert_eq!(ColumnSpec::new("port").header("Port").label(), "Port");
    }
}
