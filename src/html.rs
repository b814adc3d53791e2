//! Locating statistics tables in a full page
//!
//! The site renders most secondary tables inside HTML comments and reveals
//! them with JavaScript. [`uncomment`] strips the comment markers so those
//! tables parse like any other.

use log::debug;
use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, StructuralError};
use crate::options::ParseOptions;
use crate::parse::parse_table;
use crate::types::Table;

/// Remove `<!--` / `-->` markers, keeping the commented markup
pub fn uncomment(html: &str) -> String {
    html.replace("<!--", "").replace("-->", "")
}

/// A parsed HTML page
pub struct Page {
    document: Html,
}

impl Page {
    /// Parse a page, revealing tables hidden in comments
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(&uncomment(html)),
        }
    }

    /// Table elements matching a CSS selector, in document order
    pub fn select_tables(&self, css: &str) -> Result<Vec<ElementRef<'_>>> {
        let selector =
            Selector::parse(css).map_err(|_| StructuralError::Selector(css.to_string()))?;
        Ok(self
            .document
            .select(&selector)
            .filter(|e| e.value().name() == "table")
            .collect())
    }

    /// The table with the given `id` attribute
    pub fn table_by_id(&self, id: &str) -> Result<ElementRef<'_>> {
        self.select_tables("table")?
            .into_iter()
            .find(|e| e.value().id() == Some(id))
            .ok_or_else(|| StructuralError::TableNotFound(format!("#{id}")).into())
    }

    /// Parse the table with the given `id` attribute
    pub fn parse_table_by_id(&self, id: &str, options: &ParseOptions) -> Result<Table> {
        parse_table(self.table_by_id(id)?, options)
    }

    /// Parse every table matching a CSS selector
    pub fn parse_tables(&self, css: &str, options: &ParseOptions) -> Result<Vec<Table>> {
        let tables = self
            .select_tables(css)?
            .into_iter()
            .map(|table| parse_table(table, options))
            .collect::<Result<Vec<_>>>()?;
        debug!("parsed {} tables matching '{}'", tables.len(), css);
        Ok(tables)
    }
}
