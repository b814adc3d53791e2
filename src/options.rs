//! Parser configuration: label source, identifier columns and ignored markup
//!
//! Options are built in code or loaded from a CONL file such as:
//!
//! ```text
//! labels = text
//! presets
//!   = player
//!   = team
//! id_columns
//!   =
//!     stat = squad
//!     column = team_id
//!     href = squads
//! ignore
//!   = span.f-i
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Valid values for the `labels` key
const VALID_LABEL_SOURCES: &[&str] = &["text", "data-stat"];

/// Names accepted in the `presets` list (see [`IdColumn::preset`])
pub const PRESET_NAMES: &[&str] = &["player", "team", "home_team", "away_team", "match_report"];

/// Where a column's name is read from in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelSource {
    /// Visible header text ("Gls")
    #[default]
    Text,
    /// The stable `data-stat` attribute ("goals")
    DataStat,
}

impl LabelSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelSource::Text => "text",
            LabelSource::DataStat => "data-stat",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "text" => Some(LabelSource::Text),
            "data-stat" => Some(LabelSource::DataStat),
            _ => None,
        }
    }
}

/// How an identifier is embedded in the primary cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdSource {
    /// Value of an attribute on the cell, e.g. `data-append-csv="e342ad68"`
    Attribute(String),
    /// Path segment after `/{segment}/` in the first link inside the cell,
    /// e.g. `squads` for `/en/squads/361ca564/Tottenham-Hotspur-Stats`
    Href(String),
}

/// An identifier column extracted from a primary column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdColumn {
    /// `data-stat` of the primary column
    pub stat: String,
    /// Name of the reserved output column
    pub column: String,
    pub source: IdSource,
}

impl IdColumn {
    pub fn new(stat: impl Into<String>, column: impl Into<String>, source: IdSource) -> Self {
        Self {
            stat: stat.into(),
            column: column.into(),
            source,
        }
    }

    pub fn player() -> Self {
        Self::new("player", "player_id", IdSource::Attribute("data-append-csv".to_string()))
    }

    pub fn team() -> Self {
        Self::new("team", "team_id", IdSource::Href("squads".to_string()))
    }

    pub fn home_team() -> Self {
        Self::new("home_team", "home_team_id", IdSource::Href("squads".to_string()))
    }

    pub fn away_team() -> Self {
        Self::new("away_team", "away_team_id", IdSource::Href("squads".to_string()))
    }

    pub fn match_report() -> Self {
        Self::new("match_report", "match_id", IdSource::Href("matches".to_string()))
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "player" => Some(Self::player()),
            "team" => Some(Self::team()),
            "home_team" => Some(Self::home_team()),
            "away_team" => Some(Self::away_team()),
            "match_report" => Some(Self::match_report()),
            _ => None,
        }
    }
}

/// Options controlling how a raw table is turned into a [`crate::Table`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub labels: LabelSource,
    /// Reserved identifier columns, appended in this order
    pub id_columns: Vec<IdColumn>,
    /// CSS selectors for markup excluded from cell text (flag icons, notes)
    pub ignore: Vec<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            labels: LabelSource::Text,
            id_columns: PRESET_NAMES.iter().filter_map(|name| IdColumn::preset(name)).collect(),
            // Flag icons render as a country code before the nationality
            ignore: vec!["span.f-i".to_string()],
        }
    }
}

impl ParseOptions {
    /// Options with no identifier columns and nothing ignored
    pub fn empty() -> Self {
        Self {
            labels: LabelSource::Text,
            id_columns: Vec::new(),
            ignore: Vec::new(),
        }
    }

    pub fn with_labels(mut self, labels: LabelSource) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_id_column(mut self, id_column: IdColumn) -> Self {
        self.id_columns.push(id_column);
        self
    }

    pub fn with_ignored(mut self, selector: impl Into<String>) -> Self {
        self.ignore.push(selector.into());
        self
    }

    /// Load options from a CONL file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file: {}", path.display()))?;
        Self::from_conl_str(&content)
            .with_context(|| format!("Failed to parse options file: {}", path.display()))
    }

    /// Parse options from CONL text
    pub fn from_conl_str(content: &str) -> Result<Self> {
        let file: OptionsFile = serde_conl::from_str(content)?;
        file.validate()
    }

    /// Render as CONL; presets are written out as full `id_columns` entries
    pub fn to_conl(&self) -> Result<String> {
        Ok(serde_conl::to_string(&OptionsFile::from(self))?)
    }

    /// Save options to a CONL file that [`ParseOptions::load_from_path`] reads back
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let conl = self.to_conl()?;
        fs::write(path, conl)
            .with_context(|| format!("Failed to write options file: {}", path.display()))
    }
}

/// Options as written in a CONL file, before validation
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct OptionsFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    labels: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    presets: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    id_columns: Vec<IdColumnEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    ignore: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct IdColumnEntry {
    stat: String,
    column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    href: Option<String>,
}

impl From<&ParseOptions> for OptionsFile {
    fn from(options: &ParseOptions) -> Self {
        let id_columns = options
            .id_columns
            .iter()
            .map(|id_column| {
                let (attribute, href) = match &id_column.source {
                    IdSource::Attribute(attr) => (Some(attr.clone()), None),
                    IdSource::Href(segment) => (None, Some(segment.clone())),
                };
                IdColumnEntry {
                    stat: id_column.stat.clone(),
                    column: id_column.column.clone(),
                    attribute,
                    href,
                }
            })
            .collect();
        Self {
            labels: Some(options.labels.as_str().to_string()),
            presets: Vec::new(),
            id_columns,
            ignore: options.ignore.clone(),
        }
    }
}

impl OptionsFile {
    fn validate(self) -> Result<ParseOptions> {
        let labels = match self.labels.as_deref() {
            None => LabelSource::default(),
            Some(s) => match LabelSource::from_str(s) {
                Some(labels) => labels,
                None => bail!(
                    "Invalid labels '{}'. Valid values: {:?}",
                    s,
                    VALID_LABEL_SOURCES
                ),
            },
        };

        let mut id_columns = Vec::new();
        for name in &self.presets {
            match IdColumn::preset(name) {
                Some(id_column) => id_columns.push(id_column),
                None => bail!("Unknown preset '{}'. Valid values: {:?}", name, PRESET_NAMES),
            }
        }

        for entry in self.id_columns {
            let source = match (entry.attribute, entry.href) {
                (Some(attr), None) => IdSource::Attribute(attr),
                (None, Some(segment)) => IdSource::Href(segment),
                _ => bail!(
                    "Id column '{}' must set exactly one of 'attribute' or 'href'",
                    entry.column
                ),
            };
            id_columns.push(IdColumn::new(entry.stat, entry.column, source));
        }

        Ok(ParseOptions {
            labels,
            id_columns,
            ignore: self.ignore,
        })
    }
}
