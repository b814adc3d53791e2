//! Turn one raw HTML `<table>` into a [`Table`]
//!
//! Header rows are expanded over `colspan`/`rowspan` into a grid, the last
//! two header levels become `(group, name)` labels, and configured identifier
//! columns are read from attributes or links on each row's primary cell.

use log::debug;
use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, StructuralError};
use crate::options::{IdColumn, IdSource, LabelSource, ParseOptions};
use crate::types::{ColumnLabel, Row, Table};
use crate::utils::{non_empty, normalize_whitespace};

/// Row classes the site uses for repeated headers and visual breaks
const SEPARATOR_CLASSES: &[&str] = &["thead", "over_header", "spacer"];

/// Upper bound for colspan/rowspan, guards against absurd attribute values
const MAX_SPAN: usize = 1000;

/// Parse the first `<table>` in an HTML fragment
pub fn parse_table_html(html: &str, options: &ParseOptions) -> Result<Table> {
    let fragment = Html::parse_fragment(html);
    let selector = compile("table")?;
    let table = fragment
        .select(&selector)
        .next()
        .ok_or_else(|| StructuralError::TableNotFound("fragment".to_string()))?;
    parse_table(table, options)
}

/// Parse a `<table>` element
pub fn parse_table(table: ElementRef<'_>, options: &ParseOptions) -> Result<Table> {
    let tag = table.value().name();
    if tag != "table" {
        return Err(StructuralError::NotATable(tag.to_string()).into());
    }

    let mut ignored = Vec::new();
    for css in &options.ignore {
        let selector = compile(css)?;
        ignored.extend(table.select(&selector));
    }

    let sections = Sections::split(table);
    if sections.head.is_empty() {
        return Err(StructuralError::MissingHeader.into());
    }

    let header = Header::build(&sections.head, options.labels, &ignored);

    let mut dropped = 0;
    let mut body: Vec<Vec<ElementRef<'_>>> = Vec::new();
    for row in &sections.body {
        if is_separator(*row) {
            dropped += 1;
            continue;
        }
        body.push(cells_of(*row).collect());
    }

    let width = body
        .iter()
        .map(|cells| expanded_width(cells))
        .fold(header.labels.len(), usize::max);

    let mut columns = header.labels.clone();
    for i in columns.len()..width {
        columns.push(header.placeholder(i));
    }

    let id_columns: Vec<&IdColumn> = options
        .id_columns
        .iter()
        .filter(|id| header.has_stat(&id.stat) || body.iter().flatten().any(|c| has_stat(*c, &id.stat)))
        .collect();
    columns.extend(id_columns.iter().map(|id| ColumnLabel::flat(id.column.clone())));

    let mut parsed = Table::new(columns);
    for cells in &body {
        let mut row: Row = Vec::with_capacity(width + id_columns.len());
        for cell in cells {
            row.push(non_empty(cell_text(*cell, &ignored)));
            row.extend(std::iter::repeat(None).take(span(*cell, "colspan") - 1));
        }
        row.resize(width, None);

        for id in &id_columns {
            let primary = cells.iter().find(|c| has_stat(**c, &id.stat));
            row.push(primary.and_then(|c| extract_id(*c, &id.source)));
        }
        parsed.push_row(row)?;
    }

    debug!(
        "parsed table{}: {} columns, {} rows, {} separator rows dropped",
        table.value().id().map(|id| format!(" #{id}")).unwrap_or_default(),
        parsed.columns().len(),
        parsed.len(),
        dropped
    );
    Ok(parsed)
}

fn compile(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|_| StructuralError::Selector(css.to_string()).into())
}

/// Rows of a table split into header and data rows (tfoot rows last)
struct Sections<'a> {
    head: Vec<ElementRef<'a>>,
    body: Vec<ElementRef<'a>>,
}

impl<'a> Sections<'a> {
    fn split(table: ElementRef<'a>) -> Self {
        let mut head = Vec::new();
        let mut body = Vec::new();
        let mut foot = Vec::new();
        for section in child_elements(table) {
            match section.value().name() {
                "thead" => head.extend(rows_of(section)),
                "tbody" => body.extend(rows_of(section)),
                "tfoot" => foot.extend(rows_of(section)),
                "tr" => body.push(section),
                _ => {}
            }
        }

        // Without a thead, leading rows made only of th cells are the header
        if head.is_empty() {
            let leading = body.iter().take_while(|row| is_header_row(**row)).count();
            head = body.drain(..leading).collect();
        }

        body.extend(foot);
        Self { head, body }
    }
}

/// One position in the expanded header grid
#[derive(Clone, Copy)]
struct Slot<'a> {
    /// Index of the originating cell, shared by every position it spans
    cell: usize,
    element: ElementRef<'a>,
}

struct Header {
    labels: Vec<ColumnLabel>,
    stats: Vec<String>,
    levels: usize,
}

impl Header {
    fn build(rows: &[ElementRef<'_>], source: LabelSource, ignored: &[ElementRef<'_>]) -> Self {
        let levels = rows.len();
        let mut grid: Vec<Vec<Option<Slot<'_>>>> = vec![Vec::new(); levels];
        let mut stats = Vec::new();
        let mut next_cell = 0;

        for (r, row) in rows.iter().enumerate() {
            let mut c = 0;
            for element in cells_of(*row) {
                while grid[r].get(c).is_some_and(|slot| slot.is_some()) {
                    c += 1;
                }
                if let Some(stat) = element.value().attr("data-stat") {
                    stats.push(stat.to_string());
                }
                let slot = Slot {
                    cell: next_cell,
                    element,
                };
                next_cell += 1;

                let colspan = span(element, "colspan");
                let rowspan = span(element, "rowspan").min(levels - r);
                for grid_row in grid.iter_mut().skip(r).take(rowspan) {
                    if grid_row.len() < c + colspan {
                        grid_row.resize(c + colspan, None);
                    }
                    for pos in grid_row.iter_mut().skip(c).take(colspan) {
                        *pos = Some(slot);
                    }
                }
                c += colspan;
            }
        }

        let width = grid.iter().map(Vec::len).max().unwrap_or(0);
        let at = |r: usize, i: usize| grid[r].get(i).copied().flatten();

        let mut header = Self {
            labels: Vec::with_capacity(width),
            stats,
            levels,
        };
        for i in 0..width {
            let label = if levels == 1 {
                let name = at(0, i).map(|s| name_text(s.element, source, ignored));
                ColumnLabel::flat(name.filter(|n| !n.is_empty()).unwrap_or_else(|| format!("Unnamed: {i}")))
            } else {
                let top = at(levels - 2, i);
                let bottom = at(levels - 1, i);
                match (top, bottom) {
                    (Some(t), Some(b)) if t.cell == b.cell => {
                        let name = name_text(b.element, source, ignored);
                        if name.is_empty() {
                            header.placeholder(i)
                        } else {
                            ColumnLabel::flat(name)
                        }
                    }
                    _ => {
                        let group = top
                            .map(|s| cell_text(s.element, ignored))
                            .filter(|g| !g.is_empty())
                            .unwrap_or_else(|| format!("Unnamed: {i}_level_0"));
                        let name = bottom
                            .map(|s| name_text(s.element, source, ignored))
                            .filter(|n| !n.is_empty())
                            .unwrap_or_else(|| format!("Unnamed: {i}_level_1"));
                        ColumnLabel::new(group, name)
                    }
                }
            };
            header.labels.push(label);
        }
        header
    }

    /// Label for a column the header does not describe
    fn placeholder(&self, i: usize) -> ColumnLabel {
        if self.levels > 1 {
            ColumnLabel::new(format!("Unnamed: {i}_level_0"), format!("Unnamed: {i}_level_1"))
        } else {
            ColumnLabel::flat(format!("Unnamed: {i}"))
        }
    }

    fn has_stat(&self, stat: &str) -> bool {
        self.stats.iter().any(|s| s == stat)
    }
}

fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

fn rows_of<'a>(section: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    child_elements(section).filter(|e| e.value().name() == "tr")
}

fn cells_of<'a>(row: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    child_elements(row).filter(|e| matches!(e.value().name(), "th" | "td"))
}

fn is_header_row(row: ElementRef<'_>) -> bool {
    let mut cells = cells_of(row).peekable();
    cells.peek().is_some() && cells.all(|c| c.value().name() == "th")
}

/// Repeated header rows and spacers embedded in the body carry no data
fn is_separator(row: ElementRef<'_>) -> bool {
    row.value().classes().any(|class| SEPARATOR_CLASSES.contains(&class))
        || !cells_of(row).any(|c| c.value().name() == "td")
}

fn span(cell: ElementRef<'_>, attr: &str) -> usize {
    cell.value()
        .attr(attr)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_SPAN)
}

fn expanded_width(cells: &[ElementRef<'_>]) -> usize {
    cells.iter().map(|c| span(*c, "colspan")).sum()
}

fn has_stat(cell: ElementRef<'_>, stat: &str) -> bool {
    cell.value().attr("data-stat") == Some(stat)
}

/// Cell text with ignored markup skipped, whitespace collapsed
fn cell_text(cell: ElementRef<'_>, ignored: &[ElementRef<'_>]) -> String {
    let mut text = String::new();
    collect_text(cell, ignored, &mut text);
    normalize_whitespace(&text)
}

fn collect_text(element: ElementRef<'_>, ignored: &[ElementRef<'_>], out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            if !ignored.contains(&child) {
                collect_text(child, ignored, out);
            }
        }
    }
}

fn name_text(cell: ElementRef<'_>, source: LabelSource, ignored: &[ElementRef<'_>]) -> String {
    match (source, cell.value().attr("data-stat")) {
        (LabelSource::DataStat, Some(stat)) if !stat.is_empty() => stat.to_string(),
        _ => cell_text(cell, ignored),
    }
}

fn extract_id(cell: ElementRef<'_>, source: &IdSource) -> Option<String> {
    match source {
        IdSource::Attribute(attr) => cell
            .value()
            .attr(attr)
            .map(str::trim)
            .and_then(|v| non_empty(v.to_string())),
        IdSource::Href(segment) => {
            let marker = format!("/{segment}/");
            cell.descendants()
                .filter_map(ElementRef::wrap)
                .filter(|e| e.value().name() == "a")
                .filter_map(|a| a.value().attr("href"))
                .find_map(|href| {
                    let (_, rest) = href.split_once(&marker)?;
                    let id = rest.split(['/', '?', '#']).next()?;
                    non_empty(id.to_string())
                })
        }
    }
}
