use thiserror::Error;

/// Errors produced while building or mutating widgets.
#[derive(Debug, Error)]
pub enum Error {
    /// A record has no value for a column and the column has no generator.
    #[error("record has no field `{key}`")]
    MissingField { key: String },

    /// A column name that is not declared on the table.
    #[error("column `{key}` is not declared")]
    UnknownColumn { key: String },

    /// The same column name appears twice in one column set.
    #[error("column `{key}` is declared more than once")]
    DuplicateColumn { key: String },

    /// Size kind token other than `weight`, `given` or `pack`.
    #[error("invalid column size `{kind}`")]
    InvalidColumnSize { kind: String },

    /// A column config refers to a generator or formatter nobody registered.
    #[error("unknown column transform `{name}`")]
    UnknownTransform { name: String },

    #[error("invalid color `{value}`")]
    InvalidColor { value: String },

    #[error("row index {index} out of bounds for table of {len} rows")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("failed to open `{url}`")]
    OpenUrl {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
