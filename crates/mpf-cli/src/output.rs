//! Text and JSON output for each subcommand
//!
//! Every function returns the full output so the binary only prints it.

use crate::page::Page;
use anyhow::Context;
use mpf_form::{FormHint, GroupView, ShapeStatus};
use mpf_schema::{Classification, OptionKind, ResolvedShape, SchemaResolver};
use serde::Serialize;
use std::fmt::Write as _;

fn status_text(status: &ShapeStatus) -> String {
    match status {
        ShapeStatus::NoTypeSelected => "no type selected".to_string(),
        ShapeStatus::Loading => "loading".to_string(),
        ShapeStatus::Ready => "ready".to_string(),
        ShapeStatus::Error(message) => format!("error: {message}"),
        ShapeStatus::NoPrimaryKey(message) => format!("blocked: {message}"),
    }
}

fn write_hints(out: &mut String, hints: &[FormHint]) {
    if hints.is_empty() {
        return;
    }
    let _ = writeln!(out, "hints:");
    for hint in hints {
        let _ = writeln!(out, "  - {hint}");
    }
}

/// Indented outline of the rendered form, then hints
#[must_use]
pub fn render_text(page: &Page) -> String {
    let mut out = String::new();

    for group in page.tree.render() {
        let _ = writeln!(out, "{} {}", group.prefix, group.label);
        for object in &group.objects {
            let _ = writeln!(
                out,
                "  {} {} [{}] {}",
                object.prefix,
                object.name,
                object.object_type.as_deref().unwrap_or("-"),
                status_text(&object.status)
            );
            for section in &object.sections {
                let _ = writeln!(out, "    {}", section.title);
                for input in &section.inputs {
                    let marker = if input.required { "*" } else { "" };
                    let _ = writeln!(out, "      {}{marker} ({}) = {}", input.label, input.field, input.value);
                }
            }
        }
    }

    write_hints(&mut out, &page.tree.hints());
    out
}

#[derive(Serialize)]
struct RenderDocument {
    groups: Vec<GroupView>,
    hints: Vec<String>,
}

/// Rendered views and hints as pretty JSON
///
/// # Errors
/// If encoding fails
pub fn render_json(page: &Page) -> anyhow::Result<String> {
    let document = RenderDocument {
        groups: page.tree.render(),
        hints: page.tree.hints().iter().map(ToString::to_string).collect(),
    };
    serde_json::to_string_pretty(&document).context("encoding rendered form")
}

/// Submission pairs, one `name=value` per line
#[must_use]
pub fn fields_text(page: &Page) -> String {
    page.to_form_fields()
        .into_iter()
        .map(|(name, value)| format!("{name}={value}\n"))
        .collect()
}

/// Page document as pretty JSON
///
/// # Errors
/// If encoding fails
pub fn serialize_json(page: &Page) -> anyhow::Result<String> {
    serde_json::to_string_pretty(&page.payload()).context("encoding page payload")
}

/// Change history rows and the current-version projection
#[must_use]
pub fn ledger_text(page: &Page) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "change history ({} entries)", page.ledger.len());

    for (_, entry) in page.ledger.entries() {
        let _ = writeln!(
            out,
            "  {:<12} {:<8} {:<12} {}",
            entry.date, entry.version, entry.author, entry.description
        );
    }

    let projection = page.ledger.projection();
    if projection.is_cleared() {
        let _ = writeln!(out, "current version: none");
    } else {
        let _ = writeln!(
            out,
            "current version: {} ({}, {})",
            projection.version, projection.date, projection.author
        );
    }
    out
}

/// Object-type selector options, logical kinds first
pub async fn options_text(resolver: &SchemaResolver) -> String {
    resolver
        .selector_options()
        .await
        .into_iter()
        .map(|option| {
            let kind = match option.kind {
                OptionKind::Logical => "logical",
                OptionKind::Table => "table",
            };
            format!("{}\t{kind}\n", option.token)
        })
        .collect()
}

fn shape_text(out: &mut String, shape: &ResolvedShape) {
    match shape {
        ResolvedShape::Identifiers { columns, .. } => {
            let _ = writeln!(out, "identifiers: {}", columns.join(", "));
        }
        ResolvedShape::Data {
            schema, key_columns, ..
        } => {
            if !key_columns.is_empty() {
                let _ = writeln!(out, "primary key: {}", key_columns.join(", "));
            }
            for (title, fields) in &schema.sections {
                let _ = writeln!(out, "{title}");
                for field in fields {
                    let marker = if field.required { "*" } else { "" };
                    let _ = write!(out, "  {}{marker} {}", field.name, field.field_type);
                    if let Some(help) = field.help_text() {
                        let _ = write!(out, "  {help}");
                    }
                    let _ = writeln!(out);
                }
            }
        }
    }
}

/// Classification of a type token and the shape it resolves to
///
/// A resolution failure is part of the output, not an error.
pub async fn resolve_text(resolver: &SchemaResolver, token: &str) -> String {
    let mut out = String::new();

    match resolver.classify(token) {
        Classification::Unresolved => {
            let _ = writeln!(out, "no type given");
        }
        Classification::Logical(kind) => {
            let _ = writeln!(out, "{kind}: logical kind");
            if let Some(shape) = resolver.logical_shape(&kind) {
                shape_text(&mut out, &shape);
            }
        }
        Classification::SchemaBacked(table) => {
            let _ = writeln!(out, "{table}: registry table");
            match resolver.schema_backed_shape(&table).await {
                Ok(shape) => shape_text(&mut out, &shape),
                Err(e) => {
                    let _ = writeln!(out, "error: {e}");
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_read_plainly() {
        assert_eq!(status_text(&ShapeStatus::Ready), "ready");
        assert_eq!(
            status_text(&ShapeStatus::NoPrimaryKey("table T has no primary key defined".to_string())),
            "blocked: table T has no primary key defined"
        );
    }

    #[test]
    fn no_hints_no_section() {
        let mut out = String::new();
        write_hints(&mut out, &[]);
        assert!(out.is_empty());
    }
}
