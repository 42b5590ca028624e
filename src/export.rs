use crate::constants::{JOIN_KEY, VOTES_TABLE};
use crate::error::Result;
use crate::storage::{load_flat_rows, Storage};
use crate::types::FlatRow;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{info, instrument};

/// A rectangular table of rendered cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn key_of(row: &FlatRow) -> Option<String> {
    row.get(JOIN_KEY).filter(|v| !v.is_null()).map(render_cell)
}

/// Column names in first-seen order.
fn column_order(rows: &[FlatRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for row in rows {
        for column in row.keys() {
            if seen.insert(column.as_str()) {
                columns.push(column.clone());
            }
        }
    }
    columns
}

/// Renders a JSON value as a CSV cell. Null becomes an empty cell.
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn cell(row: &FlatRow, column: &str) -> String {
    row.get(column).map(render_cell).unwrap_or_default()
}

/// Left join of `left` with `right` on the member id.
///
/// Every left row survives: once per matching right row, or once with empty
/// right-hand cells when nothing matches. Non-key columns present on both
/// sides are suffixed `_x` (left) and `_y` (right).
pub fn left_join(left: &[FlatRow], right: &[FlatRow]) -> Table {
    let left_columns = column_order(left);
    let right_columns: Vec<String> = column_order(right)
        .into_iter()
        .filter(|c| c != JOIN_KEY)
        .collect();
    let right_set: HashSet<&str> = right_columns.iter().map(String::as_str).collect();
    let left_set: HashSet<&str> = left_columns.iter().map(String::as_str).collect();

    let mut columns: Vec<String> = left_columns
        .iter()
        .map(|c| {
            if c != JOIN_KEY && right_set.contains(c.as_str()) {
                format!("{c}_x")
            } else {
                c.clone()
            }
        })
        .collect();
    columns.extend(right_columns.iter().map(|c| {
        if left_set.contains(c.as_str()) {
            format!("{c}_y")
        } else {
            c.clone()
        }
    }));

    let mut right_by_key: HashMap<String, Vec<&FlatRow>> = HashMap::new();
    for row in right {
        if let Some(key) = key_of(row) {
            right_by_key.entry(key).or_default().push(row);
        }
    }

    let mut rows = Vec::new();
    for left_row in left {
        let left_cells: Vec<String> = left_columns.iter().map(|c| cell(left_row, c)).collect();
        let matches = key_of(left_row)
            .and_then(|key| right_by_key.get(&key))
            .filter(|m| !m.is_empty());

        match matches {
            Some(matches) => {
                for right_row in matches {
                    let mut row = left_cells.clone();
                    row.extend(right_columns.iter().map(|c| cell(right_row, c)));
                    rows.push(row);
                }
            }
            None => {
                let mut row = left_cells;
                row.extend(std::iter::repeat(String::new()).take(right_columns.len()));
                rows.push(row);
            }
        }
    }

    Table { columns, rows }
}

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row to any writer.
pub fn write_row<W: Write>(mut w: W, row: &[String], sep: char) -> io::Result<()> {
    for (i, field) in row.iter().enumerate() {
        if i > 0 {
            write!(w, "{}", sep)?;
        }
        if needs_quotes(field, sep) {
            write!(w, "\"{}\"", field.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", field)?;
        }
    }
    writeln!(w)
}

/// Header row followed by every data row.
pub fn write_csv<W: Write>(mut w: W, table: &Table) -> io::Result<()> {
    write_row(&mut w, &table.columns, ',')?;
    for row in &table.rows {
        write_row(&mut w, row, ',')?;
    }
    w.flush()
}

/// Joins the member table with the vote table and writes the result to `path`.
#[instrument(skip(storage))]
pub fn export_raw_data(storage: &dyn Storage, members_table: &str, path: &Path) -> Result<usize> {
    let members = load_flat_rows(storage, members_table)?;
    let votes = load_flat_rows(storage, VOTES_TABLE)?;
    let table = left_join(&members, &votes);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_csv(BufWriter::new(file), &table)?;

    info!(
        "Merged {} members with {} votes into {} rows at {}",
        members.len(),
        votes.len(),
        table.rows.len(),
        path.display()
    );
    Ok(table.rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> FlatRow {
        match value {
            Value::Object(map) => map,
            _ => panic!("test rows must be objects"),
        }
    }

    #[test]
    fn test_left_join_keeps_unmatched_members() {
        let members = vec![
            row(json!({"bioguideID": "A1", "name": "Adams, Alma", "state": "NC"})),
            row(json!({"bioguideID": "Z9", "name": "Zed, Zoe", "state": "VT"})),
        ];
        let votes = vec![
            row(json!({"bioguideID": "A1", "voteCast": "Yea", "identifier": 1})),
            row(json!({"bioguideID": "A1", "voteCast": "Nay", "identifier": 2})),
        ];

        let table = left_join(&members, &votes);
        assert_eq!(
            table.columns,
            vec!["bioguideID", "name", "state", "voteCast", "identifier"]
        );
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0], vec!["A1", "Adams, Alma", "NC", "Yea", "1"]);
        assert_eq!(table.rows[1], vec!["A1", "Adams, Alma", "NC", "Nay", "2"]);
        assert_eq!(table.rows[2], vec!["Z9", "Zed, Zoe", "VT", "", ""]);
    }

    #[test]
    fn test_overlapping_columns_are_suffixed() {
        let members = vec![row(json!({"bioguideID": "A1", "state": "North Carolina"}))];
        let votes = vec![row(json!({"bioguideID": "A1", "state": "NC"}))];

        let table = left_join(&members, &votes);
        assert_eq!(table.columns, vec!["bioguideID", "state_x", "state_y"]);
        assert_eq!(table.rows[0], vec!["A1", "North Carolina", "NC"]);
    }

    #[test]
    fn test_csv_quoting() {
        let table = Table {
            columns: vec!["name".into(), "note".into()],
            rows: vec![vec!["Smith, John".into(), "said \"hi\"".into()]],
        };
        let mut out = Vec::new();
        write_csv(&mut out, &table).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "name,note\n\"Smith, John\",\"said \"\"hi\"\"\"\n"
        );
    }

    #[test]
    fn test_render_cell() {
        assert_eq!(render_cell(&Value::Null), "");
        assert_eq!(render_cell(&json!(2027)), "2027");
        assert_eq!(render_cell(&json!(true)), "true");
        assert_eq!(render_cell(&json!("Senate")), "Senate");
    }
}
