//! Normalize FBref-style statistics tables into one stable column schema
//!
//! ```no_run
//! use fbref_tables::{concat, Page, ParseOptions};
//!
//! # fn main() -> fbref_tables::Result<()> {
//! # let html = "";
//! let page = Page::parse(html);
//! let tables = page.parse_tables("table.stats_table", &ParseOptions::default())?;
//! let players = concat(&tables, &["Player"])?;
//! # Ok(())
//! # }
//! ```

pub mod concat;
pub mod error;
pub mod export;
pub mod html;
pub mod options;
pub mod parse;
pub mod types;
pub mod utils;

pub use concat::{canonical_columns, concat};
pub use error::{Error, Result, SchemaError, StructuralError};
pub use html::{uncomment, Page};
pub use options::{IdColumn, IdSource, LabelSource, ParseOptions};
pub use parse::{parse_table, parse_table_html};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    fn season_table(season: &str, goals_group: &str, ids: [&str; 2]) -> String {
        format!(
            r#"
            <table id="stats_standard_{season}">
                <thead>
                    <tr class="over_header">
                        <th colspan="2"></th>
                        <th colspan="1">{goals_group}</th>
                    </tr>
                    <tr>
                        <th data-stat="season">Season</th>
                        <th data-stat="player">Player</th>
                        <th data-stat="goals">Gls</th>
                    </tr>
                </thead>
                <tbody>
                    <tr>
                        <th data-stat="season">{season}</th>
                        <td data-stat="player" data-append-csv="{id0}">Player A</td>
                        <td data-stat="goals">10</td>
                    </tr>
                    <tr class="thead"><th>Season</th><th>Player</th><th>Gls</th></tr>
                    <tr>
                        <th data-stat="season">{season}</th>
                        <td data-stat="player" data-append-csv="{id1}">Player B</td>
                        <td data-stat="goals">4</td>
                    </tr>
                    <tr>
                        <th data-stat="season">{season}</th>
                        <td data-stat="player">Player C</td>
                        <td data-stat="goals">1</td>
                    </tr>
                </tbody>
            </table>
            "#,
            id0 = ids[0],
            id1 = ids[1],
        )
    }

    #[test]
    fn test_parse_then_concat() {
        let options = ParseOptions::default();
        let first = parse_table_html(&season_table("2021-2022", "Performance", ["a1", "b1"]), &options).unwrap();
        let second = parse_table_html(&season_table("2022-2023", "", ["a2", "b2"]), &options).unwrap();
        assert_eq!(second.columns()[2], ColumnLabel::new("Unnamed: 2_level_0", "Gls"));

        let merged = concat(&[second, first], &["Season", "Player"]).unwrap();
        assert_eq!(
            merged.columns(),
            &[
                ColumnLabel::flat("Season"),
                ColumnLabel::flat("Player"),
                ColumnLabel::new("Performance", "Gls"),
                ColumnLabel::flat("player_id"),
            ]
        );
        assert_eq!(merged.len(), 6);
        assert_eq!(
            merged.column("player_id"),
            Some(vec![Some("a2"), Some("b2"), None, Some("a1"), Some("b1"), None])
        );
        assert_eq!(merged.cell(3, "Season"), Some("2021-2022"));
    }
}
