//! Table and JSON output of entity rows.

use nu_ansi_term::Color::{Cyan, Green};
use quarry_db::{display_value, to_json_value, Entity, FieldList};
use serde_json::{Map, Value as Json};
use tabled::{
    builder::Builder,
    settings::{peaker::PriorityMax, themes::BorderCorrection, Panel, Style, Width},
};
use tracing::info;

use crate::{error::CliResult, utils::{term_width, Colored}};

/// Projected column values of `row`, in projection order.
fn cells<E: Entity>(row: &E, fields: &FieldList<E>) -> Vec<quarry_db::rusqlite::types::Value> {
    let schema = E::schema();
    fields
        .iter()
        .filter_map(|f| schema.column(f.as_str()))
        .map(|c| (c.value)(row))
        .collect()
}

/// Rows as JSON objects holding only the projected columns.
pub fn to_json<E: Entity>(rows: &[E], fields: &FieldList<E>) -> Json {
    let names = fields.names();
    let objects = rows
        .iter()
        .map(|row| {
            let object: Map<String, Json> = names
                .iter()
                .zip(cells(row, fields))
                .map(|(name, value)| (name.to_string(), to_json_value(&value)))
                .collect();
            Json::Object(object)
        })
        .collect();
    Json::Array(objects)
}

pub fn to_table<E: Entity>(rows: &[E], fields: &FieldList<E>, header: &str) -> String {
    let mut builder = Builder::new();
    builder.push_record(fields.names());
    for row in rows {
        builder.push_record(cells(row, fields).iter().map(display_value));
    }

    builder
        .build()
        .with(Panel::header(header))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .with(Width::wrap(term_width()).priority(PriorityMax::default()))
        .to_string()
}

/// Prints `rows` as a table, or as a JSON array when `json` is set.
pub fn print_rows<E: Entity>(rows: &[E], fields: &FieldList<E>, json: bool) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&to_json(rows, fields))?);
        return Ok(());
    }

    let table = E::schema().table;
    if rows.is_empty() {
        info!("No {} found", Colored(Cyan, table));
        return Ok(());
    }
    let header = format!("{} ({} rows)", table, rows.len());
    info!("\n{}", to_table(rows, fields, &header));
    Ok(())
}

pub fn print_count(table: &str, count: u64, json: bool) -> CliResult<()> {
    if json {
        println!("{}", serde_json::json!({ "table": table, "count": count }));
    } else {
        info!("{}: {}", Colored(Cyan, table), Colored(Green, count));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use quarry_db::Field;

    use super::*;
    use crate::entities::{products, Product};

    fn bolt() -> Product {
        Product {
            product_id: 1,
            name: "bolt".into(),
            price: 2.5,
            qty: 10,
            ..Default::default()
        }
    }

    #[test]
    fn test_json_keeps_projection_order() {
        let fields: FieldList<Product> =
            vec![products::NAME.field(), Field::primary_key(), products::LABEL.field()].into();
        let json = to_json(&[bolt()], &fields);

        assert_eq!(
            serde_json::to_string(&json).unwrap(),
            r#"[{"name":"bolt","product_id":1,"label":null}]"#
        );
    }

    #[test]
    fn test_table_has_header_and_cells() {
        let fields = FieldList::<Product>::parse("name,price").unwrap();
        let table = to_table(&[bolt()], &fields, "products");

        assert!(table.contains("products"));
        assert!(table.contains("name"));
        assert!(table.contains("bolt"));
        assert!(table.contains("2.5"));
    }
}
