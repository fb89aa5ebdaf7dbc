//! Tables of records with headers, zebra striping and list-like mutation.
//!
//! A [`Table`] owns its rows as retained widgets. Rows are built from
//! [`Record`]s through a [`RowBuilder`] and can be inserted, replaced and
//! removed by index; only the affected row is rebuilt.
//!
//! Zebra colors are decided when a row is built, from its position at that
//! moment. Inserting or removing rows does not restripe the rows around it;
//! call [`Table::recolor`] to do that explicitly.

pub mod key_value;
mod row;

pub use row::{Cell, CellId, Row, RowLayout};

use std::cell::Cell as Shared;
use std::fmt;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use tracing::debug;

use crate::Theme;
use crate::column::{ColorPair, Columns};
use crate::element::{Element, Label, Styled};
use crate::ui::{Component, EventResult};
use crate::value::{Content, Record};
use crate::{Error, Result};

const PAGE_STEP: usize = 10;

/// Builds a [`Row`] for a record. Lets callers substitute their own rows.
pub trait RowBuilder {
    fn build(
        &self,
        record: Record,
        columns: Rc<Columns>,
        color: Option<ColorPair>,
        layout: RowLayout,
    ) -> Result<Row>;
}

impl<F> RowBuilder for F
where
    F: Fn(Record, Rc<Columns>, Option<ColorPair>, RowLayout) -> Result<Row>,
{
    fn build(
        &self,
        record: Record,
        columns: Rc<Columns>,
        color: Option<ColorPair>,
        layout: RowLayout,
    ) -> Result<Row> {
        self(record, columns, color, layout)
    }
}

/// The stock builder: [`Row::new`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRowBuilder;

impl RowBuilder for DefaultRowBuilder {
    fn build(
        &self,
        record: Record,
        columns: Rc<Columns>,
        color: Option<ColorPair>,
        layout: RowLayout,
    ) -> Result<Row> {
        Row::new(record, columns, color, layout)
    }
}

/// Input for one table row: a record to build, or a finished widget.
pub enum RowInput {
    Record(Record),
    Widget(Box<dyn Element>),
}

impl From<Record> for RowInput {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

impl RowInput {
    pub fn widget(element: impl Element + 'static) -> Self {
        Self::Widget(Box::new(element))
    }
}

/// A row as stored in the table.
pub enum RowWidget {
    Record(Row),
    Widget(Box<dyn Element>),
}

impl RowWidget {
    /// The record-backed row, if this row was built from a record.
    #[must_use]
    pub const fn as_row(&self) -> Option<&Row> {
        match self {
            Self::Record(row) => Some(row),
            Self::Widget(_) => None,
        }
    }

    pub const fn as_row_mut(&mut self) -> Option<&mut Row> {
        match self {
            Self::Record(row) => Some(row),
            Self::Widget(_) => None,
        }
    }

    #[must_use]
    pub fn record(&self) -> Option<&Record> {
        self.as_row().map(Row::record)
    }

    fn element(&self) -> &dyn Element {
        match self {
            Self::Record(row) => row,
            Self::Widget(widget) => widget.as_ref(),
        }
    }

    fn element_mut(&mut self) -> &mut dyn Element {
        match self {
            Self::Record(row) => row,
            Self::Widget(widget) => widget.as_mut(),
        }
    }
}

impl Element for RowWidget {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        self.element().render(area, buf);
    }

    fn width(&self) -> u16 {
        self.element().width()
    }

    fn height(&self, width: u16) -> u16 {
        self.element().height(width)
    }

    fn text(&self) -> String {
        self.element().text()
    }

    fn mouse_event(&mut self, event: &MouseEvent, area: Rect) -> Result<bool> {
        self.element_mut().mouse_event(event, area)
    }
}

impl fmt::Debug for RowWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record(row) => f.debug_tuple("Record").field(row).finish(),
            Self::Widget(w) => f.debug_tuple("Widget").field(&w.text()).finish(),
        }
    }
}

/// A row plus the whole-row style laid underneath it.
struct Entry {
    widget: RowWidget,
    decoration: Option<Style>,
}

/// Colors a table draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStyle {
    pub header: Style,
    pub focus: Style,
    /// Zebra color for rows at odd 1-based positions.
    pub odd: ColorPair,
    /// Zebra color for rows at even 1-based positions.
    pub even: ColorPair,
}

impl TableStyle {
    #[must_use]
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            header: Style::default()
                .fg(theme.header())
                .bg(theme.crust())
                .add_modifier(Modifier::BOLD),
            focus: Style::default()
                .bg(theme.selection_bg())
                .add_modifier(Modifier::BOLD),
            odd: ColorPair::new(None, Some(theme.surface0())),
            even: ColorPair::default(),
        }
    }
}

impl Default for TableStyle {
    fn default() -> Self {
        Self::from_theme(&Theme::default())
    }
}

/// Construction options for [`Table`].
pub struct TableOptions {
    pub title: Option<Content>,
    pub headers: bool,
    pub zebra: bool,
    pub divider: u16,
    pub min_width: u16,
    /// Blank columns `(left, right)` around the whole table.
    pub padding: Option<(u16, u16)>,
    pub row_builder: Option<Rc<dyn RowBuilder>>,
    pub style: TableStyle,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            title: None,
            headers: false,
            zebra: false,
            divider: 1,
            min_width: 1,
            padding: None,
            row_builder: None,
            style: TableStyle::default(),
        }
    }
}

impl TableOptions {
    #[must_use]
    pub fn title(mut self, title: impl Into<Content>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub const fn headers(mut self, headers: bool) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub const fn zebra(mut self, zebra: bool) -> Self {
        self.zebra = zebra;
        self
    }

    #[must_use]
    pub const fn divider(mut self, divider: u16) -> Self {
        self.divider = divider;
        self
    }

    #[must_use]
    pub const fn padding(mut self, left: u16, right: u16) -> Self {
        self.padding = Some((left, right));
        self
    }

    #[must_use]
    pub fn row_builder(mut self, builder: impl RowBuilder + 'static) -> Self {
        self.row_builder = Some(Rc::new(builder));
        self
    }

    #[must_use]
    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.style = TableStyle::from_theme(theme);
        self
    }
}

/// Event emitted by [`Table`] input handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEvent {
    /// Focus moved to the row at this index.
    Changed(usize),
    /// The focused row was activated (Enter).
    Activated(usize),
}

/// Header cells, one per column, sized like the columns.
struct HeaderRow {
    cells: Vec<Cell>,
    layout: RowLayout,
}

impl Element for HeaderRow {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        row::render_cells(&self.cells, area, buf, self.layout);
    }

    fn width(&self) -> u16 {
        row::cells_width(&self.cells, self.layout)
    }

    fn height(&self, width: u16) -> u16 {
        row::cells_height(&self.cells, width, self.layout)
    }

    fn text(&self) -> String {
        self.cells
            .iter()
            .map(Cell::text)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A scrollable, focus-tracked list of rows sharing one column set.
pub struct Table {
    columns: Rc<Columns>,
    entries: Vec<Entry>,
    title: Option<Box<dyn Element>>,
    zebra: bool,
    layout: RowLayout,
    padding: (u16, u16),
    style: TableStyle,
    builder: Rc<dyn RowBuilder>,
    focus: Option<usize>,
    offset: Shared<usize>,
}

impl Table {
    pub fn new<I, R>(rows: I, columns: Columns, options: TableOptions) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: Into<RowInput>,
    {
        let layout = RowLayout {
            divider: options.divider,
            min_width: options.min_width,
        };
        let mut table = Self {
            columns: Rc::new(columns),
            entries: Vec::new(),
            title: None,
            zebra: options.zebra,
            layout,
            padding: options.padding.unwrap_or((0, 0)),
            style: options.style,
            builder: options
                .row_builder
                .unwrap_or_else(|| Rc::new(DefaultRowBuilder)),
            focus: None,
            offset: Shared::new(0),
        };

        if options.headers {
            table.title = Some(table.build_header());
        } else if let Some(title) = options.title {
            table.set_title(title);
        }

        for (i, input) in rows.into_iter().enumerate() {
            let entry = table.build_entry(input.into(), i)?;
            table.entries.push(entry);
        }
        if !table.entries.is_empty() {
            table.focus = Some(0);
        }
        debug!(rows = table.entries.len(), columns = table.columns.len(), "Built table");
        Ok(table)
    }

    fn build_header(&self) -> Box<dyn Element> {
        let cells = self
            .columns
            .iter()
            .map(|spec| Cell::new(Box::new(Label::new(spec.label().to_string())), spec.size))
            .collect();
        let header = HeaderRow {
            cells,
            layout: self.layout,
        };
        Box::new(Styled::new(Box::new(header), self.style.header))
    }

    /// Replace the title shown above the rows.
    pub fn set_title(&mut self, title: impl Into<Content>) {
        let widget: Box<dyn Element> = match title.into() {
            Content::Value(value) => Box::new(Label::new(value.to_string())),
            Content::Widget(widget) => widget,
        };
        self.title = Some(widget);
    }

    #[must_use]
    pub fn title(&self) -> Option<&dyn Element> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// Zebra color for a row built at `index`, if striping is on.
    #[must_use]
    pub const fn zebra_color(&self, index: usize) -> Option<ColorPair> {
        if !self.zebra {
            return None;
        }
        if (index + 1) % 2 == 0 {
            Some(self.style.even)
        } else {
            Some(self.style.odd)
        }
    }

    fn build_entry(&self, input: RowInput, index: usize) -> Result<Entry> {
        match input {
            RowInput::Widget(widget) => Ok(Entry {
                widget: RowWidget::Widget(widget),
                decoration: None,
            }),
            RowInput::Record(record) => {
                let color = self.zebra_color(index);
                let row = self
                    .builder
                    .build(record, Rc::clone(&self.columns), color, self.layout)?;
                Ok(Entry {
                    widget: RowWidget::Record(row),
                    decoration: color.map(ColorPair::to_style),
                })
            }
        }
    }

    /// Row at `index`, without its zebra decoration.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RowWidget> {
        self.entries.get(index).map(|e| &e.widget)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut RowWidget> {
        self.entries.get_mut(index).map(|e| &mut e.widget)
    }

    /// Record-backed row at `index`.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.get(index).and_then(RowWidget::as_row)
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.get_mut(index).and_then(RowWidget::as_row_mut)
    }

    /// Whole-row style applied underneath the row at `index`.
    #[must_use]
    pub fn decoration(&self, index: usize) -> Option<Style> {
        self.entries.get(index).and_then(|e| e.decoration)
    }

    /// Replace the row at `index`, striped for that position.
    pub fn set(&mut self, index: usize, input: impl Into<RowInput>) -> Result<()> {
        self.check_index(index, self.entries.len())?;
        let entry = self.build_entry(input.into(), index)?;
        self.entries[index] = entry;
        debug!(index, "Replaced row");
        Ok(())
    }

    /// Remove the row at `index`. Other rows keep their colors.
    pub fn remove(&mut self, index: usize) -> Result<RowWidget> {
        self.check_index(index, self.entries.len())?;
        let entry = self.entries.remove(index);
        self.focus = match self.focus {
            _ if self.entries.is_empty() => None,
            Some(f) if f > index => Some(f - 1),
            Some(f) => Some(f.min(self.entries.len() - 1)),
            None => None,
        };
        debug!(index, remaining = self.entries.len(), "Removed row");
        Ok(entry.widget)
    }

    /// Insert a row before `index`; `index == len` appends.
    pub fn insert(&mut self, index: usize, input: impl Into<RowInput>) -> Result<()> {
        self.check_index(index, self.entries.len() + 1)?;
        let entry = self.build_entry(input.into(), index)?;
        self.entries.insert(index, entry);
        self.focus = match self.focus {
            Some(f) if f >= index => Some(f + 1),
            Some(f) => Some(f),
            None => Some(0),
        };
        debug!(index, "Inserted row");
        Ok(())
    }

    pub fn push(&mut self, input: impl Into<RowInput>) -> Result<()> {
        self.insert(self.entries.len(), input)
    }

    /// Restripe every record row for its current position.
    pub fn recolor(&mut self) {
        for index in 0..self.entries.len() {
            let color = self.zebra_color(index);
            let entry = &mut self.entries[index];
            if let RowWidget::Record(row) = &entry.widget {
                if row.color() == color {
                    continue;
                }
                let record = row.record().clone();
                match self
                    .builder
                    .build(record, Rc::clone(&self.columns), color, self.layout)
                {
                    Ok(rebuilt) => {
                        entry.widget = RowWidget::Record(rebuilt);
                        entry.decoration = color.map(ColorPair::to_style);
                    }
                    Err(e) => debug!(index, error = %e, "Kept row colors, rebuild failed"),
                }
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RowWidget> {
        self.entries.iter().map(|e| &e.widget)
    }

    /// Records of all record-backed rows, in order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.iter().filter_map(RowWidget::record)
    }

    #[must_use]
    pub const fn focus(&self) -> Option<usize> {
        self.focus
    }

    pub fn set_focus(&mut self, index: usize) -> Result<()> {
        self.check_index(index, self.entries.len())?;
        self.focus = Some(index);
        Ok(())
    }

    fn check_index(&self, index: usize, bound: usize) -> Result<()> {
        if index < bound {
            Ok(())
        } else {
            Err(Error::IndexOutOfBounds {
                index,
                len: self.entries.len(),
            })
        }
    }

    fn inner_area(&self, area: Rect) -> Rect {
        let (left, right) = self.padding;
        let width = area.width.saturating_sub(left).saturating_sub(right);
        Rect::new(area.x.saturating_add(left).min(area.right()), area.y, width, area.height)
    }

    fn title_height(&self, width: u16) -> u16 {
        self.title.as_ref().map_or(0, |t| t.height(width))
    }

    /// Areas of the rows that fit on screen, scrolled so focus stays visible.
    fn visible_rows(&self, area: Rect) -> Vec<(usize, Rect)> {
        let inner = self.inner_area(area);
        let title_height = self.title_height(inner.width).min(inner.height);
        let body = Rect::new(
            inner.x,
            inner.y + title_height,
            inner.width,
            inner.height - title_height,
        );
        if body.is_empty() {
            return Vec::new();
        }

        let heights: Vec<u16> = self
            .entries
            .iter()
            .map(|e| e.widget.element().height(body.width))
            .collect();

        let mut offset = self.offset.get().min(self.entries.len().saturating_sub(1));
        if let Some(focus) = self.focus {
            if focus < offset {
                offset = focus;
            }
            // Scroll down until the focused row fits.
            while offset < focus
                && heights[offset..=focus].iter().map(|h| u32::from(*h)).sum::<u32>()
                    > u32::from(body.height)
            {
                offset += 1;
            }
        }
        self.offset.set(offset);

        let mut rows = Vec::new();
        let mut y = body.y;
        for (index, height) in heights.iter().enumerate().skip(offset) {
            if y >= body.bottom() {
                break;
            }
            let height = (*height).min(body.bottom() - y);
            rows.push((index, Rect::new(body.x, y, body.width, height)));
            y += height;
        }
        rows
    }

    fn select(&mut self, index: usize) -> EventResult<TableEvent> {
        if self.entries.is_empty() {
            return EventResult::Consumed;
        }
        let index = index.min(self.entries.len() - 1);
        let before = self.focus;
        self.focus = Some(index);
        if before == Some(index) {
            EventResult::Consumed
        } else {
            TableEvent::Changed(index).into()
        }
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("columns", &self.columns)
            .field("rows", &self.entries.len())
            .field("focus", &self.focus)
            .finish_non_exhaustive()
    }
}

impl Element for Table {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let inner = self.inner_area(area);
        if let Some(title) = &self.title {
            let height = title.height(inner.width).min(inner.height);
            title.render(Rect::new(inner.x, inner.y, inner.width, height), buf);
        }
        for (index, row_area) in self.visible_rows(area) {
            let entry = &self.entries[index];
            if let Some(decoration) = entry.decoration {
                buf.set_style(row_area, decoration);
            }
            entry.widget.element().render(row_area, buf);
            if self.focus == Some(index) {
                buf.set_style(row_area, self.style.focus);
            }
        }
    }

    fn width(&self) -> u16 {
        let rows = self.entries.iter().map(|e| e.widget.element().width());
        let title = self.title.iter().map(|t| t.width());
        rows.chain(title)
            .max()
            .unwrap_or(0)
            .saturating_add(self.padding.0)
            .saturating_add(self.padding.1)
    }

    fn height(&self, width: u16) -> u16 {
        let inner = width.saturating_sub(self.padding.0).saturating_sub(self.padding.1);
        self.entries
            .iter()
            .map(|e| e.widget.element().height(inner))
            .fold(self.title_height(inner), u16::saturating_add)
    }

    fn text(&self) -> String {
        self.title
            .iter()
            .map(|t| t.text())
            .chain(self.entries.iter().map(|e| e.widget.element().text()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn mouse_event(&mut self, event: &MouseEvent, area: Rect) -> Result<bool> {
        Ok(self.handle_mouse(*event, area)?.is_consumed())
    }
}

impl Component for Table {
    type Output = TableEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        let current = self.focus.unwrap_or(0);
        Ok(match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.select(current + 1),
            KeyCode::Up | KeyCode::Char('k') => self.select(current.saturating_sub(1)),
            KeyCode::Home | KeyCode::Char('g') => self.select(0),
            KeyCode::End | KeyCode::Char('G') => self.select(usize::MAX),
            KeyCode::PageDown => self.select(current.saturating_add(PAGE_STEP)),
            KeyCode::PageUp => self.select(current.saturating_sub(PAGE_STEP)),
            KeyCode::Enter => match self.focus {
                Some(index) => TableEvent::Activated(index).into(),
                None => EventResult::Ignored,
            },
            _ => EventResult::Ignored,
        })
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect) -> Result<EventResult<Self::Output>> {
        let current = self.focus.unwrap_or(0);
        match event.kind {
            MouseEventKind::ScrollDown => Ok(self.select(current + 1)),
            MouseEventKind::ScrollUp => Ok(self.select(current.saturating_sub(1))),
            MouseEventKind::Down(MouseButton::Left) => {
                let pointer = Position::new(event.column, event.row);
                let hit = self
                    .visible_rows(area)
                    .into_iter()
                    .find(|(_, row_area)| row_area.contains(pointer));
                let Some((index, row_area)) = hit else {
                    return Ok(EventResult::Ignored);
                };
                let result = self.select(index);
                self.entries[index]
                    .widget
                    .element_mut()
                    .mouse_event(&event, row_area)?;
                Ok(result)
            }
            _ => Ok(EventResult::Ignored),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnSpec, SizePolicy};
    use crate::value::Value;
    use crossterm::event::KeyModifiers;
    use ratatui::style::Color;
    use std::cell::Cell as Counter;

    fn numbered(n: i64) -> Record {
        Record::new().with("n", n)
    }

    fn table(rows: impl IntoIterator<Item = Record>, zebra: bool) -> Table {
        let columns = Columns::new([ColumnSpec::new("n")]).unwrap();
        Table::new(rows, columns, TableOptions::default().zebra(zebra)).unwrap()
    }

    fn values(table: &Table) -> Vec<Value> {
        table
            .records()
            .map(|r| r.get("n").cloned().unwrap_or_default())
            .collect()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_zebra_parity() {
        let t = table([numbered(1), numbered(2)], true);
        let style = TableStyle::default();
        assert_eq!(t.row(0).unwrap().color(), Some(style.odd));
        assert_eq!(t.row(1).unwrap().color(), Some(style.even));
    }

    #[test]
    fn test_no_zebra_no_color() {
        let t = table([numbered(1), numbered(2)], false);
        assert_eq!(t.row(0).unwrap().color(), None);
        assert_eq!(t.decoration(0), None);
    }

    #[test]
    fn test_append_grows_by_one() {
        let mut t = table([numbered(1)], false);
        t.push(numbered(2)).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.row(1).unwrap().record(), &numbered(2));
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut t = table((1..=4).map(numbered), false);
        t.remove(1).unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(values(&t), [Value::Int(1), Value::Int(3), Value::Int(4)]);
    }

    #[test]
    fn test_remove_keeps_stale_colors() {
        let mut t = table((1..=3).map(numbered), true);
        let style = TableStyle::default();
        t.remove(0).unwrap();
        // Former second row is now first but keeps its "even" color.
        assert_eq!(t.row(0).unwrap().color(), Some(style.even));

        t.recolor();
        assert_eq!(t.row(0).unwrap().color(), Some(style.odd));
        assert_eq!(t.row(1).unwrap().color(), Some(style.even));
    }

    #[test]
    fn test_set_uses_new_index_parity() {
        let mut t = table((1..=3).map(numbered), true);
        let style = TableStyle::default();
        t.set(1, numbered(20)).unwrap();
        assert_eq!(t.row(1).unwrap().color(), Some(style.even));
        assert_eq!(values(&t), [Value::Int(1), Value::Int(20), Value::Int(3)]);
    }

    #[test]
    fn test_insert() {
        let mut t = table([numbered(1), numbered(3)], true);
        t.insert(1, numbered(2)).unwrap();
        assert_eq!(values(&t), [Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(t.row(1).unwrap().color(), Some(TableStyle::default().even));
        assert!(matches!(
            t.insert(5, numbered(9)),
            Err(Error::IndexOutOfBounds { index: 5, len: 3 })
        ));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut t = table([numbered(1)], false);
        assert!(t.set(1, numbered(2)).is_err());
        assert!(t.remove(3).is_err());
        assert!(t.get(1).is_none());
    }

    #[test]
    fn test_missing_field_fails_construction() {
        let columns = Columns::new([ColumnSpec::new("n"), ColumnSpec::new("m")]).unwrap();
        let result = Table::new([numbered(1)], columns, TableOptions::default());
        assert!(matches!(result, Err(Error::MissingField { .. })));
    }

    #[test]
    fn test_prebuilt_widget_rows() {
        let columns = Columns::new([ColumnSpec::new("n")]).unwrap();
        let rows = vec![
            RowInput::from(numbered(1)),
            RowInput::widget(Label::new("separator")),
        ];
        let t = Table::new(rows, columns, TableOptions::default().zebra(true)).unwrap();
        assert!(t.get(0).unwrap().as_row().is_some());
        assert!(t.get(1).unwrap().as_row().is_none());
        assert_eq!(t.decoration(1), None);
    }

    #[test]
    fn test_custom_row_builder() {
        let calls = Rc::new(Counter::new(0));
        let seen = calls.clone();
        let builder = move |record: Record,
                            columns: Rc<Columns>,
                            color: Option<ColorPair>,
                            layout: RowLayout| {
            seen.set(seen.get() + 1);
            Row::new(record.with("n", 0), columns, color, layout)
        };
        let columns = Columns::new([ColumnSpec::new("n")]).unwrap();
        let mut t = Table::new(
            [numbered(1)],
            columns,
            TableOptions::default().row_builder(builder),
        )
        .unwrap();
        t.push(numbered(2)).unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(values(&t), [Value::Int(0), Value::Int(0)]);
    }

    #[test]
    fn test_headers_render() {
        let columns = Columns::new([
            ColumnSpec::new("name").header("Name").size(SizePolicy::given(6)),
            ColumnSpec::new("port"),
        ])
        .unwrap();
        let rows = [Record::new().with("name", "db").with("port", 5432)];
        let t = Table::new(rows, columns, TableOptions::default().headers(true)).unwrap();

        let mut buf = Buffer::empty(Rect::new(0, 0, 12, 2));
        t.render(buf.area, &mut buf);
        let lines: Vec<String> = (0..2)
            .map(|y| (0..12).map(|x| buf[(x, y)].symbol().to_string()).collect())
            .collect();
        assert_eq!(lines, ["Name   port ", "db     5432 "]);
        assert_eq!(t.title().unwrap().text(), "Name port");
    }

    #[test]
    fn test_header_width_counts_dividers() {
        let columns = Columns::new([
            ColumnSpec::new("a").header("Left"),
            ColumnSpec::new("b").header("Right"),
        ])
        .unwrap();
        let rows = [Record::new().with("a", "x").with("b", "y")];
        let options = TableOptions::default().headers(true).divider(2);
        let t = Table::new(rows, columns, options).unwrap();
        assert_eq!(t.title().unwrap().width(), 11);
        assert_eq!(t.row(0).unwrap().width(), 4);
        assert_eq!(t.width(), 11);
    }

    #[test]
    fn test_plain_title() {
        let columns = Columns::new([ColumnSpec::new("n")]).unwrap();
        let t = Table::new([numbered(1)], columns, TableOptions::default().title("Numbers")).unwrap();
        assert_eq!(t.title().unwrap().text(), "Numbers");
    }

    #[test]
    fn test_zebra_decoration_rendered() {
        let style = TableStyle {
            odd: ColorPair::new(None, Some(Color::DarkGray)),
            even: ColorPair::default(),
            focus: Style::default(),
            header: Style::default(),
        };
        let columns = Columns::new([ColumnSpec::new("n")]).unwrap();
        let options = TableOptions {
            zebra: true,
            style,
            ..TableOptions::default()
        };
        let t = Table::new([numbered(1), numbered(2)], columns, options).unwrap();
        let mut buf = Buffer::empty(Rect::new(0, 0, 3, 2));
        t.render(buf.area, &mut buf);
        assert_eq!(buf[(2, 0)].bg, Color::DarkGray);
        assert_eq!(buf[(2, 1)].bg, Color::Reset);
    }

    #[test]
    fn test_padding() {
        let columns = Columns::new([ColumnSpec::new("n")]).unwrap();
        let options = TableOptions {
            padding: Some((2, 1)),
            style: TableStyle {
                focus: Style::default(),
                ..TableStyle::default()
            },
            ..TableOptions::default()
        };
        let t = Table::new([numbered(7)], columns, options).unwrap();
        let mut buf = Buffer::empty(Rect::new(0, 0, 5, 1));
        t.render(buf.area, &mut buf);
        assert_eq!(buf, Buffer::with_lines(["  7  "]));
    }

    #[test]
    fn test_keyboard_focus() {
        let mut t = table((1..=3).map(numbered), false);
        assert_eq!(t.focus(), Some(0));

        let result = t.handle_key(key(KeyCode::Down)).unwrap();
        assert_eq!(result, EventResult::Event(TableEvent::Changed(1)));

        let result = t.handle_key(key(KeyCode::End)).unwrap();
        assert_eq!(result, EventResult::Event(TableEvent::Changed(2)));

        let result = t.handle_key(key(KeyCode::Down)).unwrap();
        assert_eq!(result, EventResult::Consumed);

        let result = t.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(result, EventResult::Event(TableEvent::Activated(2)));

        assert_eq!(t.handle_key(key(KeyCode::Char('x'))).unwrap(), EventResult::Ignored);
    }

    #[test]
    fn test_focus_follows_mutation() {
        let mut t = table((1..=3).map(numbered), false);
        t.set_focus(2).unwrap();
        t.insert(0, numbered(0)).unwrap();
        assert_eq!(t.focus(), Some(3));
        t.remove(3).unwrap();
        assert_eq!(t.focus(), Some(2));
        t.remove(0).unwrap();
        assert_eq!(t.focus(), Some(1));
    }

    #[test]
    fn test_scroll_keeps_focus_visible() {
        let mut t = table((0..10).map(numbered), false);
        t.set_focus(7).unwrap();
        let area = Rect::new(0, 0, 4, 3);
        let rows = t.visible_rows(area);
        assert_eq!(rows.iter().map(|(i, _)| *i).collect::<Vec<_>>(), [5, 6, 7]);
    }

    #[test]
    fn test_click_selects_row_and_reaches_cell() {
        let clicks = Rc::new(Counter::new(0));
        let counter = clicks.clone();
        let columns = Columns::new([ColumnSpec::new("n").generator(move |_| {
            let counter = counter.clone();
            Content::widget(crate::clickable::ClickableText::new("go", move || {
                counter.set(counter.get() + 1);
                Ok(())
            }))
        })])
        .unwrap();
        let mut t = Table::new([Record::new(), Record::new()], columns, TableOptions::default()).unwrap();

        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 0,
            row: 1,
            modifiers: KeyModifiers::NONE,
        };
        let result = t.handle_mouse(click, Rect::new(0, 0, 10, 5)).unwrap();
        assert_eq!(result, EventResult::Event(TableEvent::Changed(1)));
        assert_eq!(clicks.get(), 1);
    }
}
