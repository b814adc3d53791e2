//! Error types for table parsing and concatenation

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the core can surface.
///
/// Parsing failures and schema failures are kept apart so callers can tell
/// "the page had no data" from "the page could not be read".
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// The raw HTML does not have the shape of a statistics table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    /// Neither a `thead` nor a leading row of `th` cells was found.
    #[error("table has no header row")]
    MissingHeader,
    /// The element handed to the parser is not a `<table>`.
    #[error("expected a <table> element, found <{0}>")]
    NotATable(String),
    /// A fragment or page contained no table matching the request.
    #[error("no table found for {0}")]
    TableNotFound(String),
    /// A CSS selector from the parse options failed to compile.
    #[error("invalid selector '{0}'")]
    Selector(String),
}

/// Tables do not fit the column layout the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A concatenation key is absent from one of the input tables.
    #[error("key column '{key}' missing from table {table}")]
    MissingKey { key: String, table: usize },
    /// The same key column was requested twice.
    #[error("key column '{0}' given more than once")]
    DuplicateKey(String),
    /// A row does not have one cell per column.
    #[error("row has {found} cells, table has {expected} columns")]
    RowWidth { expected: usize, found: usize },
}
