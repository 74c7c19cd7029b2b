//! Output formatting: table, JSON, YAML, plain.
//!
//! Records are opaque JSON objects, so tables are assembled at runtime
//! from the resource's preferred columns (or the record keys when none of
//! them are present).

use std::io::{self, Write};

use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crease_core::Resource;

use crate::cli::OutputFormat;

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of records in the chosen format.
pub fn render_list(format: OutputFormat, resource: Resource, records: &[Value]) -> String {
    match format {
        OutputFormat::Table => render_table(resource, records),
        OutputFormat::Json => render_json(records, false),
        OutputFormat::JsonCompact => render_json(records, true),
        OutputFormat::Yaml => render_yaml(records),
        OutputFormat::Plain => records.iter().map(record_id).collect::<Vec<_>>().join("\n"),
    }
}

/// Render one record in the chosen format. Tables are key/value pairs.
pub fn render_single(format: OutputFormat, record: &Value) -> String {
    match format {
        OutputFormat::Table => render_detail(record),
        OutputFormat::Json => render_json(record, false),
        OutputFormat::JsonCompact => render_json(record, true),
        OutputFormat::Yaml => render_yaml(record),
        OutputFormat::Plain => record_id(record),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn columns_for(resource: Resource, records: &[Value]) -> Vec<String> {
    let preferred: Vec<String> = resource
        .columns()
        .iter()
        .copied()
        .filter(|col| records.iter().any(|r| r.get(*col).is_some()))
        .map(str::to_owned)
        .collect();
    if !preferred.is_empty() {
        return preferred;
    }
    records
        .first()
        .and_then(Value::as_object)
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default()
}

fn render_table(resource: Resource, records: &[Value]) -> String {
    if records.is_empty() {
        return format!("No {} found.", resource.to_string().replace('-', " "));
    }
    let columns = columns_for(resource, records);
    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.to_uppercase()));
    for record in records {
        builder.push_record(columns.iter().map(|c| cell(record.get(c))));
    }
    builder.build().with(Style::rounded()).to_string()
}

fn render_detail(record: &Value) -> String {
    let Some(obj) = record.as_object() else {
        return cell(Some(record));
    };
    let mut builder = Builder::default();
    for (key, value) in obj {
        builder.push_record([key.clone(), cell(Some(value))]);
    }
    builder.build().with(Style::rounded()).to_string()
}

/// Table cell text: strings unquoted, null as "-".
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".into(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn record_id(record: &Value) -> String {
    cell(record.get("id"))
}

/// Pretty-printed or compact JSON.
fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    if compact {
        serde_json::to_string(data).expect("serialization should not fail")
    } else {
        serde_json::to_string_pretty(data).expect("serialization should not fail")
    }
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).expect("serialization should not fail")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn table_uses_preferred_columns() {
        let out = render_list(
            OutputFormat::Table,
            Resource::Teams,
            &[json!({"id": 1, "name": "Falcons", "logo": "x.png"})],
        );
        assert!(out.contains("NAME"));
        assert!(out.contains("Falcons"));
        assert!(!out.contains("LOGO"));
    }

    #[test]
    fn table_falls_back_to_record_keys() {
        let out = render_list(OutputFormat::Table, Resource::Teams, &[json!({"code": "FAL"})]);
        assert!(out.contains("CODE"));
    }

    #[test]
    fn empty_table_says_so() {
        assert_eq!(
            render_list(OutputFormat::Table, Resource::Voting, &[]),
            "No voting found."
        );
    }

    #[test]
    fn plain_prints_ids() {
        let out = render_list(
            OutputFormat::Plain,
            Resource::Players,
            &[json!({"id": 1}), json!({"id": "p-2"})],
        );
        assert_eq!(out, "1\np-2");
    }
}
