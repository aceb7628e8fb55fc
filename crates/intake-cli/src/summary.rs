//! Table rendering for the review dashboards.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use intake_model::{FieldName, Profile, Record, RecordId};
use intake_store::DeskStats;

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

/// Abbreviated id for table listings; `show` prints the full id.
pub fn short_id(id: &RecordId) -> String {
    let hex = id.to_hex();
    hex[..8].to_string()
}

/// The handful of fields worth a column in a listing. Everything else is
/// visible via `show`.
fn list_columns(profile: &Profile) -> Vec<FieldName> {
    let names: &[&str] = match profile.name.as_str() {
        "job_application" => &[
            "timestamp",
            "first_name",
            "last_name",
            "department",
            "position",
            "room",
            "status",
        ],
        "visitor_feedback" => &[
            "timestamp",
            "school",
            "group_type",
            "programme",
            "visit_date",
            "children_no",
        ],
        _ => &[],
    };

    if names.is_empty() {
        // Unknown profile: fall back to the first few schema fields.
        return profile.field_names().take(6).cloned().collect();
    }
    names
        .iter()
        .filter_map(|name| profile.field(name).map(|def| def.name.clone()))
        .collect()
}

pub fn print_records(profile: &Profile, records: &[Record]) {
    let columns = list_columns(profile);

    let mut table = Table::new();
    apply_table_style(&mut table);
    let mut header = vec![header_cell("Id")];
    header.extend(columns.iter().map(|name| header_cell(name.as_str())));
    table.set_header(header);

    for record in records {
        let mut row = vec![Cell::new(short_id(&record.id))];
        row.extend(
            columns
                .iter()
                .map(|name| Cell::new(record.value(name).render())),
        );
        table.add_row(row);
    }

    println!("{table}");
    println!("{} record(s)", records.len());
}

pub fn print_record_detail(profile: &Profile, record: &Record) {
    println!("Id: {}", record.id);
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.set_header(vec![header_cell("Field"), header_cell("Value")]);
    for name in profile.field_names() {
        table.add_row(vec![
            Cell::new(name.as_str()),
            Cell::new(record.value(name).render()),
        ]);
    }
    println!("{table}");
}

pub fn print_stats(stats: &DeskStats) {
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    table.add_row(vec![Cell::new("Active records"), Cell::new(stats.total)]);
    table.add_row(vec![Cell::new("Deleted records"), Cell::new(stats.deleted)]);
    table.add_row(vec![
        Cell::new("With attachment"),
        Cell::new(stats.with_attachment),
    ]);
    println!("{table}");

    if stats.rating_averages.is_empty() {
        return;
    }
    let mut ratings = Table::new();
    apply_table_style(&mut ratings);
    ratings.set_header(vec![header_cell("Rating"), header_cell("Average")]);
    for (name, average) in &stats.rating_averages {
        let rendered = match average {
            Some(value) => format!("{value:.1}/5"),
            None => "N/A".to_string(),
        };
        ratings.add_row(vec![
            Cell::new(name),
            Cell::new(rendered).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{ratings}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_is_eight_hex_chars() {
        let id = RecordId::derive("visitor_feedback", 1, 1);
        let short = short_id(&id);
        assert_eq!(short.len(), 8);
        assert!(id.to_hex().starts_with(&short));
    }

    #[test]
    fn list_columns_only_contain_schema_fields() {
        for profile in [Profile::job_application(), Profile::visitor_feedback()] {
            let columns = list_columns(&profile);
            assert!(!columns.is_empty());
            for name in columns {
                assert!(profile.field(name.as_str()).is_some());
            }
        }
    }
}
