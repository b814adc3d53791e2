//! Stack parsed tables under one reconciled column schema
//!
//! Tables scraped from different pages or seasons describe the same columns
//! with slightly different headers: a group may be missing, replaced by an
//! `Unnamed` placeholder, or the column may have been pushed into the upper
//! header level. Columns are matched by name (and by occurrence, for names
//! that repeat within a table) and given the first real group any table
//! offers. Column order is a merge of every table's order, so a table holding
//! a subset of another's columns does not move them. Rows are stacked, never
//! joined.

use log::{debug, warn};
use std::collections::HashMap;

use crate::error::{Result, SchemaError};
use crate::types::{ColumnLabel, Row, Table};

/// Concatenate `tables` row-wise with `key` columns first
///
/// Every key must name a column in every table. The output has one row per
/// input row, in input order; cells for columns a table lacks are `None`.
pub fn concat<S: AsRef<str>>(tables: &[Table], key: &[S]) -> Result<Table> {
    let plan = Plan::build(tables, key)?;
    let mut out = Table::new(plan.columns());
    let positions = plan.positions();

    for (t, table) in tables.iter().enumerate() {
        for row in table.rows() {
            let mut merged: Row = vec![None; plan.width()];
            for (k, &pos) in plan.keys[t].iter().enumerate() {
                merged[k] = row[pos].clone();
            }
            for &(slot, pos) in &plan.mappings[t] {
                merged[plan.key_count() + positions[slot]] = row[pos].clone();
            }
            out.push_row(merged)?;
        }
    }

    debug!(
        "concatenated {} tables into {} columns, {} rows",
        tables.len(),
        out.columns().len(),
        out.len()
    );
    Ok(out)
}

/// The reconciled schema `concat` would produce, without copying any rows
pub fn canonical_columns<S: AsRef<str>>(tables: &[Table], key: &[S]) -> Result<Vec<ColumnLabel>> {
    Ok(Plan::build(tables, key)?.columns())
}

/// A column of the output schema and the group chosen for it so far
struct Canonical {
    name: String,
    group: Option<String>,
    /// Table that supplied `group`
    source: usize,
}

impl Canonical {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            group: None,
            source: 0,
        }
    }

    /// Consider the group `label` has in table `t`; the first real group wins
    fn offer(&mut self, label: &ColumnLabel, t: usize) {
        if !label.has_real_group() {
            return;
        }
        match &self.group {
            None => {
                self.group = Some(label.group.clone());
                self.source = t;
            }
            Some(group) if *group != label.group => {
                warn!(
                    "column '{}' is grouped under '{}' in table {} but '{}' in table {}; keeping '{}'",
                    self.name, label.group, t, group, self.source, group
                );
            }
            Some(_) => {}
        }
    }

    fn label(&self) -> ColumnLabel {
        match &self.group {
            Some(group) => ColumnLabel::new(group.clone(), self.name.clone()),
            None => ColumnLabel::flat(self.name.clone()),
        }
    }
}

struct Plan {
    key_columns: Vec<Canonical>,
    /// Non-key columns indexed by slot, in discovery order
    columns: Vec<Canonical>,
    /// Slots in output order
    order: Vec<usize>,
    /// Per table: source position of each key column
    keys: Vec<Vec<usize>>,
    /// Per table: (canonical column, source position) for non-key columns
    mappings: Vec<Vec<(usize, usize)>>,
}

impl Plan {
    fn build<S: AsRef<str>>(tables: &[Table], key: &[S]) -> Result<Self> {
        let mut key_columns: Vec<Canonical> = Vec::with_capacity(key.len());
        for k in key {
            let k = k.as_ref();
            if key_columns.iter().any(|c| c.name == k) {
                return Err(SchemaError::DuplicateKey(k.to_string()).into());
            }
            key_columns.push(Canonical::new(k));
        }
        let mut columns: Vec<Canonical> = Vec::new();
        let mut order: Vec<usize> = Vec::new();
        let mut index: HashMap<(String, usize), usize> = HashMap::new();
        let mut keys = Vec::with_capacity(tables.len());
        let mut mappings = Vec::with_capacity(tables.len());

        for (t, table) in tables.iter().enumerate() {
            let labels: Vec<ColumnLabel> = table.columns().iter().map(ColumnLabel::normalized).collect();

            let mut key_positions = Vec::with_capacity(key_columns.len());
            for canonical in key_columns.iter_mut() {
                let pos = labels
                    .iter()
                    .position(|l| l.name == canonical.name)
                    .ok_or_else(|| SchemaError::MissingKey {
                        key: canonical.name.clone(),
                        table: t,
                    })?;
                canonical.offer(&labels[pos], t);
                key_positions.push(pos);
            }

            // (source position, (name, occurrence)) of each non-key column
            let mut seen: HashMap<&str, usize> = HashMap::new();
            let mut ids = Vec::with_capacity(labels.len());
            for (pos, label) in labels.iter().enumerate() {
                if key_positions.contains(&pos) {
                    continue;
                }
                let count = seen.entry(label.name.as_str()).or_insert(0);
                ids.push((pos, (label.name.clone(), *count)));
                *count += 1;
            }

            let mut mapping = Vec::with_capacity(ids.len());
            let mut previous: Option<usize> = None;
            for (i, (pos, id)) in ids.iter().enumerate() {
                let slot = match index.get(id) {
                    Some(&slot) => slot,
                    None => {
                        // After this table's previous column, else before its
                        // next already placed one, else at the end
                        let at = match previous {
                            Some(p) => order.iter().position(|&s| s == p).map_or(order.len(), |at| at + 1),
                            None => ids[i + 1..]
                                .iter()
                                .find_map(|(_, next)| index.get(next))
                                .and_then(|&n| order.iter().position(|&s| s == n))
                                .unwrap_or(order.len()),
                        };
                        let slot = columns.len();
                        columns.push(Canonical::new(&id.0));
                        index.insert(id.clone(), slot);
                        order.insert(at, slot);
                        slot
                    }
                };
                columns[slot].offer(&labels[*pos], t);
                mapping.push((slot, *pos));
                previous = Some(slot);
            }

            keys.push(key_positions);
            mappings.push(mapping);
        }

        Ok(Self {
            key_columns,
            columns,
            order,
            keys,
            mappings,
        })
    }

    fn key_count(&self) -> usize {
        self.key_columns.len()
    }

    fn width(&self) -> usize {
        self.key_columns.len() + self.columns.len()
    }

    fn columns(&self) -> Vec<ColumnLabel> {
        self.key_columns
            .iter()
            .chain(self.order.iter().map(|&slot| &self.columns[slot]))
            .map(Canonical::label)
            .collect()
    }

    /// Output position (after the keys) of each slot
    fn positions(&self) -> Vec<usize> {
        let mut positions = vec![0; self.columns.len()];
        for (i, &slot) in self.order.iter().enumerate() {
            positions[slot] = i;
        }
        positions
    }
}
