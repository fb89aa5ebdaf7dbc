use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossterm::event::MouseEvent;
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use tracing::debug;

use crate::column::{ColorPair, ColumnSpec, Columns, SizePolicy};
use crate::element::{Element, Label, Styled};
use crate::layout::{Slot, cell_areas, column_widths};
use crate::value::{Content, Record, Value};
use crate::{Error, Result};

static NEXT_CELL_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a built cell. A rebuilt cell always gets a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId(u64);

impl CellId {
    fn next() -> Self {
        Self(NEXT_CELL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Spacing rules shared by every row of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    /// Blank cells between adjacent columns.
    pub divider: u16,
    /// Narrowest a weighted column may get.
    pub min_width: u16,
}

impl Default for RowLayout {
    fn default() -> Self {
        Self {
            divider: 0,
            min_width: 1,
        }
    }
}

/// A rendered cell plus the size policy of its column.
pub struct Cell {
    id: CellId,
    widget: Box<dyn Element>,
    size: SizePolicy,
}

impl Cell {
    pub fn new(widget: Box<dyn Element>, size: SizePolicy) -> Self {
        Self {
            id: CellId::next(),
            widget,
            size,
        }
    }

    #[must_use]
    pub const fn id(&self) -> CellId {
        self.id
    }

    #[must_use]
    pub fn widget(&self) -> &dyn Element {
        self.widget.as_ref()
    }

    #[must_use]
    pub const fn size(&self) -> SizePolicy {
        self.size
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.widget.text()
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("id", &self.id)
            .field("text", &self.widget.text())
            .field("size", &self.size)
            .finish()
    }
}

/// Work out where each cell goes inside `area`.
///
/// Returns `(cell index, area)` pairs; cells dropped for lack of room are left
/// out.
pub(crate) fn layout_cells(cells: &[Cell], area: Rect, layout: RowLayout) -> Vec<(usize, Rect)> {
    let slots: Vec<Slot> = cells
        .iter()
        .map(|c| Slot::new(c.size, c.widget.width()))
        .collect();
    let widths = column_widths(area.width, &slots, layout.divider, layout.min_width);
    cell_areas(area, &widths, layout.divider)
        .into_iter()
        .enumerate()
        .collect()
}

/// Natural width of a row of cells: their widths plus the dividers between them.
pub(crate) fn cells_width(cells: &[Cell], layout: RowLayout) -> u16 {
    let content: u16 = cells.iter().map(|c| c.widget.width()).sum();
    let gaps = u16::try_from(cells.len().saturating_sub(1)).unwrap_or(u16::MAX);
    content.saturating_add(gaps.saturating_mul(layout.divider))
}

/// Height of a row of cells at `width`: the tallest non-box cell.
pub(crate) fn cells_height(cells: &[Cell], width: u16, layout: RowLayout) -> u16 {
    layout_cells(cells, Rect::new(0, 0, width, 1), layout)
        .into_iter()
        .filter(|(i, _)| !cells[*i].size.boxed)
        .map(|(i, area)| cells[i].widget.height(area.width))
        .max()
        .unwrap_or(1)
        .max(1)
}

pub(crate) fn render_cells(cells: &[Cell], area: Rect, buf: &mut Buffer, layout: RowLayout) {
    for (i, cell_area) in layout_cells(cells, area, layout) {
        cells[i].widget.render(cell_area, buf);
    }
}

/// One record laid out as a horizontal run of cells.
///
/// Cells follow the declared column order. Updating a field rebuilds only
/// that field's cell.
pub struct Row {
    record: Record,
    columns: Rc<Columns>,
    color: Option<ColorPair>,
    layout: RowLayout,
    cells: Vec<Cell>,
}

impl Row {
    pub fn new(
        record: Record,
        columns: Rc<Columns>,
        color: Option<ColorPair>,
        layout: RowLayout,
    ) -> Result<Self> {
        let mut row = Self {
            record,
            columns,
            color,
            layout,
            cells: Vec::new(),
        };
        row.cells = row
            .columns
            .iter()
            .map(|spec| row.build_cell(spec))
            .collect::<Result<_>>()?;
        Ok(row)
    }

    #[must_use]
    pub const fn record(&self) -> &Record {
        &self.record
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.record.get(key)
    }

    /// Store `value` under `key` and rebuild that column's cell.
    ///
    /// Fails without touching the record if `key` is not a declared column.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        let position = self.columns.position(key)?;
        self.record.insert(key, value);

        let columns = Rc::clone(&self.columns);
        let spec = columns.iter().nth(position).ok_or_else(|| Error::UnknownColumn {
            key: key.to_string(),
        })?;
        self.cells[position] = self.build_cell(spec)?;
        debug!(key, position, "Rebuilt cell");
        Ok(())
    }

    /// Rebuild every cell from the current record.
    ///
    /// Needed when a generated column depends on a field that was updated.
    pub fn refresh(&mut self) -> Result<()> {
        let columns = Rc::clone(&self.columns);
        self.cells = columns
            .iter()
            .map(|spec| self.build_cell(spec))
            .collect::<Result<_>>()?;
        Ok(())
    }

    #[must_use]
    pub const fn color(&self) -> Option<ColorPair> {
        self.color
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[must_use]
    pub fn cell(&self, key: &str) -> Option<&Cell> {
        let position = self.columns.position(key).ok()?;
        self.cells.get(position)
    }

    #[must_use]
    pub const fn layout(&self) -> RowLayout {
        self.layout
    }

    fn build_cell(&self, spec: &ColumnSpec) -> Result<Cell> {
        let mut content = match &spec.generator {
            Some(generate) => generate(&self.record),
            None => self
                .record
                .get(&spec.key)
                .cloned()
                .map(Content::Value)
                .ok_or_else(|| Error::MissingField {
                    key: spec.key.clone(),
                })?,
        };

        if let (Some(format), Content::Value(value)) = (&spec.formatter, &content) {
            content = format(value.clone());
        }

        // Numbers and strings alike end up as their display text.
        let mut widget: Box<dyn Element> = match content {
            Content::Value(value) => Box::new(Label::new(value.to_string())),
            Content::Widget(widget) => widget,
        };

        if let Some(column_color) = spec.color {
            let pair = column_color.or(self.color);
            if !pair.is_empty() {
                widget = Box::new(Styled::new(widget, pair.to_style()));
            }
        }

        Ok(Cell::new(widget, spec.size))
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("record", &self.record)
            .field("color", &self.color)
            .field("cells", &self.cells)
            .finish_non_exhaustive()
    }
}

impl Element for Row {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        render_cells(&self.cells, area, buf, self.layout);
    }

    fn width(&self) -> u16 {
        cells_width(&self.cells, self.layout)
    }

    fn height(&self, width: u16) -> u16 {
        cells_height(&self.cells, width, self.layout)
    }

    fn text(&self) -> String {
        self.cells
            .iter()
            .map(Cell::text)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn mouse_event(&mut self, event: &MouseEvent, area: Rect) -> Result<bool> {
        let pointer = Position::new(event.column, event.row);
        let hit = layout_cells(&self.cells, area, self.layout)
            .into_iter()
            .find(|(_, cell_area)| cell_area.contains(pointer));
        match hit {
            Some((i, cell_area)) => self.cells[i].widget.mouse_event(event, cell_area),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clickable::ClickableText;
    use crate::column::ColumnSpec;
    use ratatui::style::Color;

    fn columns(specs: impl IntoIterator<Item = ColumnSpec>) -> Rc<Columns> {
        Rc::new(Columns::new(specs).unwrap())
    }

    fn texts(row: &Row) -> Vec<String> {
        row.cells().iter().map(Cell::text).collect()
    }

    #[test]
    fn test_cells_follow_column_order() {
        let cols = columns([ColumnSpec::new("b"), ColumnSpec::new("a")]);
        let row = Row::new(Record::new().with("a", "1st").with("b", "2nd"), cols, None, RowLayout::default())
            .unwrap();
        assert_eq!(texts(&row), ["2nd", "1st"]);
    }

    #[test]
    fn test_generator_wins_over_record_value() {
        let cols = columns([ColumnSpec::new("total").generator(|r: &Record| {
            let a = match r.get("a") {
                Some(Value::Int(n)) => *n,
                _ => 0,
            };
            let b = match r.get("b") {
                Some(Value::Int(n)) => *n,
                _ => 0,
            };
            (a + b).into()
        })]);
        let record = Record::new().with("a", 2).with("b", 3).with("total", "ignored");
        let row = Row::new(record, cols, None, RowLayout::default()).unwrap();
        assert_eq!(texts(&row), ["5"]);
    }

    #[test]
    fn test_numbers_use_decimal_text() {
        let cols = columns([ColumnSpec::new("i"), ColumnSpec::new("f")]);
        let record = Record::new().with("i", 42).with("f", 2.5);
        let row = Row::new(record, cols, None, RowLayout::default()).unwrap();
        assert_eq!(texts(&row), ["42", "2.5"]);
    }

    #[test]
    fn test_whole_and_large_floats_stay_floats() {
        let cols = columns([ColumnSpec::new("whole"), ColumnSpec::new("large")]);
        let record = Record::new().with("whole", 2.0).with("large", 1e21);
        let row = Row::new(record, cols, None, RowLayout::default()).unwrap();
        assert_eq!(texts(&row), ["2.0", "1e+21"]);
    }

    #[test]
    fn test_formatter_applied_to_raw_values() {
        let cols = columns([ColumnSpec::new("n").formatter(|v| format!("<{v}>").into())]);
        let row = Row::new(Record::new().with("n", 7), cols, None, RowLayout::default()).unwrap();
        assert_eq!(texts(&row), ["<7>"]);
    }

    #[test]
    fn test_formatter_skipped_for_widgets() {
        let cols = columns([ColumnSpec::new("btn")
            .generator(|_| Content::widget(ClickableText::new("go", || Ok(()))))
            .formatter(|_| "formatted".into())]);
        let row = Row::new(Record::new(), cols, None, RowLayout::default()).unwrap();
        assert_eq!(texts(&row), ["go"]);
    }

    #[test]
    fn test_missing_field_fails() {
        let cols = columns([ColumnSpec::new("a"), ColumnSpec::new("b")]);
        let result = Row::new(Record::new().with("a", 1), cols, None, RowLayout::default());
        assert!(matches!(result, Err(Error::MissingField { ref key }) if key == "b"));
    }

    #[test]
    fn test_update_replaces_single_cell() {
        let cols = columns([ColumnSpec::new("a"), ColumnSpec::new("b"), ColumnSpec::new("c")]);
        let record = Record::new().with("a", "x").with("b", "y").with("c", "z");
        let mut row = Row::new(record, cols, None, RowLayout::default()).unwrap();
        let before: Vec<CellId> = row.cells().iter().map(Cell::id).collect();

        row.set("b", "new").unwrap();

        let after: Vec<CellId> = row.cells().iter().map(Cell::id).collect();
        assert_eq!(after[0], before[0]);
        assert_ne!(after[1], before[1]);
        assert_eq!(after[2], before[2]);
        assert_eq!(texts(&row), ["x", "new", "z"]);
        assert_eq!(row.get("b"), Some(&Value::from("new")));
    }

    #[test]
    fn test_update_example() {
        let cols = columns([ColumnSpec::new("a")]);
        let mut row = Row::new(Record::new().with("a", "x"), cols, None, RowLayout::default()).unwrap();
        row.set("a", "y").unwrap();
        assert_eq!(row.record(), &Record::new().with("a", "y"));
        assert_eq!(row.cell("a").unwrap().text(), "y");
    }

    #[test]
    fn test_update_unknown_column_fails() {
        let cols = columns([ColumnSpec::new("a")]);
        let mut row = Row::new(Record::new().with("a", "x"), cols, None, RowLayout::default()).unwrap();
        let result = row.set("nope", "y");
        assert!(matches!(result, Err(Error::UnknownColumn { .. })));
        assert!(!row.record().contains_key("nope"));
    }

    #[test]
    fn test_column_color_over_row_color() {
        let cols = columns([
            ColumnSpec::new("a").color(Some(Color::Red), None),
            ColumnSpec::new("b"),
        ]);
        let row_color = ColorPair::new(Some(Color::White), Some(Color::DarkGray));
        let row = Row::new(
            Record::new().with("a", "x").with("b", "y"),
            cols,
            Some(row_color),
            RowLayout::default(),
        )
        .unwrap();

        let mut buf = Buffer::empty(Rect::new(0, 0, 2, 1));
        row.render(buf.area, &mut buf);
        assert_eq!(buf[(0, 0)].fg, Color::Red);
        assert_eq!(buf[(0, 0)].bg, Color::DarkGray);
        // Uncolored columns are left to the table's row decoration.
        assert_eq!(buf[(1, 0)].fg, Color::Reset);
    }

    #[test]
    fn test_render_with_divider() {
        let cols = columns([
            ColumnSpec::new("a").size(SizePolicy::given(3)),
            ColumnSpec::new("b"),
        ]);
        let row = Row::new(
            Record::new().with("a", "ab").with("b", "cd"),
            cols,
            None,
            RowLayout {
                divider: 1,
                min_width: 1,
            },
        )
        .unwrap();
        let mut buf = Buffer::empty(Rect::new(0, 0, 8, 1));
        row.render(buf.area, &mut buf);
        assert_eq!(buf, Buffer::with_lines(["ab  cd  "]));
    }

    #[test]
    fn test_height_ignores_box_cells() {
        let cols = columns([
            ColumnSpec::new("a"),
            ColumnSpec::new("b").size(SizePolicy::weight(1).boxed()),
        ]);
        let row = Row::new(
            Record::new().with("a", "one\ntwo").with("b", "1\n2\n3"),
            cols,
            None,
            RowLayout::default(),
        )
        .unwrap();
        assert_eq!(row.height(20), 2);
    }
}
