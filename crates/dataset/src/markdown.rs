//! Markdown summary of a schema.

use std::fmt::Write;

use serde_json::Value;

use crate::schema::{Schema, union_name};

/// Render a table with one row per master field.
pub fn render(schema: &Schema) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## {}\n", schema.name);
    out.push_str("| Field | Aliases | Type | Required | Default | Description |\n");
    out.push_str("|---|---|---|---|---|---|\n");

    for field in schema.fields.values() {
        let types = if field.types.is_empty() {
            "any".to_string()
        } else {
            union_name(&field.types)
        };
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} |",
            cell(&field.id),
            cell(&field.aliases.join(", ")),
            cell(&types),
            if field.required { "yes" } else { "no" },
            cell(&default_text(&field.default)),
            cell(&field.description),
        );
    }

    out
}

fn default_text(value: &Value) -> String {
    match value {
        Value::String(s) if s.is_empty() => String::new(),
        Value::String(s) => s.clone(),
        other => format!("`{}`", other),
    }
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
