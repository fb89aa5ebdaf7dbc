//! Record-driven table widgets for ratatui.
//!
//! A [`Table`] turns a list of [`Record`]s into rows of cells according to a
//! set of [`ColumnSpec`]s: each column can derive its value from the whole
//! record, format it, color it and size itself by weight, fixed width or
//! content. Rows stay retained, so single fields and single rows can be
//! updated without rebuilding the table.
//!
//! Around that sit a few supporting widgets: clickable text and links,
//! a header/body/footer [`FrameView`] with a transient footer
//! [`CommandLine`], and an HTML screenshot exporter.

pub mod clickable;
pub mod column;
pub mod element;
mod error;
pub mod layout;
pub mod redirect;
pub mod screenshot;
pub mod signal;
pub mod table;
pub mod theme;
pub mod ui;
pub mod value;
pub mod view;

pub use clickable::{ClickableText, LinkText};
pub use column::{ColorPair, ColumnSpec, Columns, SizeKind, SizePolicy};
pub use element::{Element, ElementWidget, Label, Styled};
pub use error::{Error, Result};
pub use screenshot::{ScreenshotOptions, take_screenshot};
pub use table::key_value::key_value_table;
pub use table::{Row, Table, TableEvent, TableOptions};
pub use theme::Theme;
pub use value::{Content, Record, Value};
pub use view::{CommandLine, CommandLineEvent, FrameView};
