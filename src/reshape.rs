//! Pivoting between entity-attribute-value rows and tidy per-entity rows.

use std::collections::{BTreeSet, HashMap};

use log::debug;

use crate::{
    data::{ComparableValue, Value},
    error::{ReconcileError, ReconcileResult},
    table::{Cell, Table},
};

#[derive(Debug, Clone, Copy)]
pub struct EavLayout<'a> {
    pub identity_columns: &'a [String],
    pub attribute_name_column: &'a str,
    pub attribute_value_column: &'a str,
}

struct Entity {
    identity: Vec<Cell>,
    attributes: HashMap<String, ComparableValue>,
}

/// Pivots an EAV table into one row per distinct identity tuple.
///
/// Duplicate (entity, attribute) pairs keep the maximal value, with a missing
/// value ranking below any present one. Entities appear in order of first
/// occurrence; attribute columns follow the identity columns, sorted by name.
pub fn reshape(eav: &Table, layout: EavLayout<'_>) -> ReconcileResult<Table> {
    let identity_idx = layout
        .identity_columns
        .iter()
        .map(|name| eav.require_column(name))
        .collect::<ReconcileResult<Vec<_>>>()?;
    let name_idx = eav.require_column(layout.attribute_name_column)?;
    let value_idx = eav.require_column(layout.attribute_value_column)?;

    let mut entities: Vec<Entity> = Vec::new();
    let mut positions: HashMap<Vec<String>, usize> = HashMap::new();
    let mut attribute_names: BTreeSet<String> = BTreeSet::new();
    let mut unnamed = 0usize;

    for (row_idx, row) in eav.rows().iter().enumerate() {
        let mut key = Vec::with_capacity(identity_idx.len());
        for (&idx, column) in identity_idx.iter().zip(layout.identity_columns) {
            match &row[idx] {
                Some(value) => key.push(value.as_display()),
                None => {
                    return Err(ReconcileError::IncompleteIdentity {
                        row: row_idx + 1,
                        column: column.clone(),
                    });
                }
            }
        }
        let position = *positions.entry(key).or_insert_with(|| {
            entities.push(Entity {
                identity: identity_idx.iter().map(|&idx| row[idx].clone()).collect(),
                attributes: HashMap::new(),
            });
            entities.len() - 1
        });

        let Some(name) = row[name_idx].as_ref().map(|v| v.as_display()) else {
            unnamed += 1;
            continue;
        };
        let candidate = ComparableValue(row[value_idx].clone());
        let slot = entities[position]
            .attributes
            .entry(name.clone())
            .or_insert(ComparableValue(None));
        if candidate > *slot {
            *slot = candidate;
        }
        attribute_names.insert(name);
    }

    if unnamed > 0 {
        debug!("Skipped {unnamed} row(s) without an attribute name");
    }

    let mut headers = layout.identity_columns.to_vec();
    headers.extend(attribute_names.iter().cloned());
    let mut tidy = Table::new(headers)?;
    for mut entity in entities {
        let mut row = entity.identity;
        row.extend(
            attribute_names
                .iter()
                .map(|name| entity.attributes.remove(name).and_then(|v| v.0)),
        );
        tidy.push_row(row);
    }
    Ok(tidy)
}

/// Re-expands a tidy table into EAV rows; missing attribute cells emit no row.
pub fn melt(tidy: &Table, layout: EavLayout<'_>) -> ReconcileResult<Table> {
    let identity_idx = layout
        .identity_columns
        .iter()
        .map(|name| tidy.require_column(name))
        .collect::<ReconcileResult<Vec<_>>>()?;
    let attribute_idx: Vec<usize> = (0..tidy.column_count())
        .filter(|idx| !identity_idx.contains(idx))
        .collect();

    let mut headers = layout.identity_columns.to_vec();
    headers.push(layout.attribute_name_column.to_string());
    headers.push(layout.attribute_value_column.to_string());
    let mut eav = Table::new(headers)?;

    for row in tidy.rows() {
        for &idx in &attribute_idx {
            let Some(value) = &row[idx] else { continue };
            let mut out: Vec<Cell> = identity_idx.iter().map(|&i| row[i].clone()).collect();
            out.push(Some(Value::text(tidy.headers()[idx].clone())));
            out.push(Some(value.clone()));
            eav.push_row(out);
        }
    }
    Ok(eav)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> Vec<String> {
        vec!["ID".to_string(), "MakeText".to_string()]
    }

    fn layout(ids: &[String]) -> EavLayout<'_> {
        EavLayout {
            identity_columns: ids,
            attribute_name_column: "Attribute Names",
            attribute_value_column: "Attribute Values",
        }
    }

    fn eav(rows: &[(&str, &str, Option<&str>, Option<&str>)]) -> Table {
        let mut headers = ids();
        headers.push("Attribute Names".into());
        headers.push("Attribute Values".into());
        Table::from_rows(
            headers,
            rows.iter()
                .map(|(id, make, name, value)| {
                    vec![
                        Some(Value::text(*id)),
                        Some(Value::text(*make)),
                        name.map(Value::text),
                        value.map(Value::text),
                    ]
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn pivots_attributes_into_sorted_columns() {
        let ids = ids();
        let table = eav(&[
            ("1", "BMW", Some("Km"), Some("1000")),
            ("1", "BMW", Some("Color"), Some("rot")),
            ("2", "Audi", Some("Km"), Some("5")),
        ]);
        let tidy = reshape(&table, layout(&ids)).unwrap();
        assert_eq!(tidy.headers(), &["ID", "MakeText", "Color", "Km"]);
        assert_eq!(tidy.row_count(), 2);
        assert_eq!(tidy.cell(0, "Color"), Some(&Value::text("rot")));
        assert_eq!(tidy.cell(1, "Color"), None);
        assert_eq!(tidy.cell(1, "MakeText"), Some(&Value::text("Audi")));
    }

    #[test]
    fn duplicate_pairs_keep_the_maximum_and_present_beats_missing() {
        let ids = ids();
        let table = eav(&[
            ("1", "BMW", Some("Km"), Some("100")),
            ("1", "BMW", Some("Km"), Some("900")),
            ("1", "BMW", Some("Km"), Some("20")),
            ("1", "BMW", Some("Seats"), Some("4")),
            ("1", "BMW", Some("Seats"), None),
        ]);
        let tidy = reshape(&table, layout(&ids)).unwrap();
        assert_eq!(tidy.cell(0, "Km"), Some(&Value::text("900")));
        assert_eq!(tidy.cell(0, "Seats"), Some(&Value::text("4")));
    }

    #[test]
    fn missing_value_is_kept_as_missing_not_as_a_sentinel() {
        let ids = ids();
        let table = eav(&[("1", "BMW", Some("Seats"), None)]);
        let tidy = reshape(&table, layout(&ids)).unwrap();
        assert_eq!(tidy.headers().len(), 3);
        assert_eq!(tidy.cell(0, "Seats"), None);
    }

    #[test]
    fn incomplete_identity_fails_fast() {
        let ids = ids();
        let mut table = eav(&[("1", "BMW", Some("Km"), Some("1"))]);
        table.push_row(vec![Some(Value::text("2")), None]);
        let err = reshape(&table, layout(&ids)).unwrap_err();
        assert_eq!(
            err,
            ReconcileError::IncompleteIdentity {
                row: 2,
                column: "MakeText".into()
            }
        );
    }

    #[test]
    fn rows_without_attribute_name_still_register_the_entity() {
        let ids = ids();
        let table = eav(&[("7", "Fiat", None, Some("x"))]);
        let tidy = reshape(&table, layout(&ids)).unwrap();
        assert_eq!(tidy.shape(), (1, 2));
    }

    #[test]
    fn empty_input_yields_identity_columns_only() {
        let ids = ids();
        let tidy = reshape(&eav(&[]), layout(&ids)).unwrap();
        assert_eq!(tidy.shape(), (0, 2));
        assert_eq!(tidy.headers(), ids.as_slice());
    }

    #[test]
    fn melt_skips_missing_cells() {
        let ids = ids();
        let table = eav(&[
            ("1", "BMW", Some("Km"), Some("1")),
            ("2", "Audi", Some("Color"), Some("blau")),
        ]);
        let tidy = reshape(&table, layout(&ids)).unwrap();
        let melted = melt(&tidy, layout(&ids)).unwrap();
        assert_eq!(melted.row_count(), 2);
        assert_eq!(melted.cell(0, "Attribute Names"), Some(&Value::text("Km")));
        assert_eq!(melted.cell(1, "Attribute Values"), Some(&Value::text("blau")));
    }
}
