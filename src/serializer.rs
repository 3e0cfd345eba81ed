//! Plain-text report of a [`GenerationIR`].

use crate::ir::{ColumnIR, GenerationIR, TableIR};
use unicode_width::UnicodeWidthStr;

/// Serialize the IR as an aligned, human-readable report.
pub fn serialize(ir: &GenerationIR) -> String {
    let mut output = String::new();

    output.push_str(&format!("dialect: {:?}\n", ir.dialect));
    output.push_str(&format!(
        "last insert id: {}\n",
        if ir.uses_last_insert_id { "yes" } else { "no" }
    ));

    for table in &ir.tables {
        output.push('\n');
        serialize_table(&mut output, table);
    }

    output
}

fn serialize_table(output: &mut String, table: &TableIR) {
    output.push_str(&format!("table {}", table.name));
    if table.is_join_table {
        output.push_str(" (join)");
    }
    output.push('\n');

    let mut facts = vec![
        ("type", table.type_name.clone()),
        ("slice", table.slice.clone()),
        ("singular", table.singular.clone()),
        ("plural", table.plural.clone()),
        ("receiver", table.receiver.clone()),
    ];
    if let Some(pkey) = &table.primary_key {
        facts.push(("primary key", pkey.name.clone()));
        facts.push(("key params", pkey.func_sig.clone()));
        facts.push(("where", pkey.where_clause.clone()));
        if let Some(column) = &pkey.auto_increment {
            facts.push(("auto key", column.clone()));
        }
    }
    facts.push(("insert", table.insert_columns.clone()));
    facts.push(("params", table.insert_params.clone()));
    facts.push(("returning", table.returning_columns.clone()));
    facts.push(("generated", table.auto_increment_columns.clone()));
    write_aligned(output, "  ", &facts);

    output.push_str("  columns:\n");
    let rows = table.columns.iter().map(column_row).collect::<Vec<_>>();
    write_rows(output, "    ", &rows);

    if !table.to_one.is_empty() {
        output.push_str("  to one:\n");
        let rows = table
            .to_one
            .iter()
            .map(|r| {
                vec![
                    r.local_table.column_name.clone(),
                    format!("-> {}", r.foreign_table.name),
                    r.function.name.clone(),
                    format!(
                        "{}.{} = {}",
                        r.function.receiver, r.function.local_assignment, r.function.foreign_assignment
                    ),
                ]
            })
            .collect::<Vec<_>>();
        write_rows(output, "    ", &rows);
    }

    if !table.to_many.is_empty() {
        output.push_str("  to many:\n");
        let rows = table
            .to_many
            .iter()
            .map(|r| {
                vec![
                    r.function.name.clone(),
                    r.foreign_table.slice.clone(),
                    r.foreign_table.name_human_readable.clone(),
                    format!(
                        "{}.{} = {}",
                        r.function.receiver, r.function.local_assignment, r.function.foreign_assignment
                    ),
                ]
            })
            .collect::<Vec<_>>();
        write_rows(output, "    ", &rows);
    }
}

fn column_row(column: &ColumnIR) -> Vec<String> {
    let mut flags = Vec::new();
    if column.is_pk {
        flags.push("pk");
    }
    if column.is_fk {
        flags.push("fk");
    }
    if column.auto_increment {
        flags.push("auto");
    } else if column.has_default {
        flags.push("default");
    }

    vec![
        column.name.clone(),
        column.field.clone(),
        column.typ.clone(),
        column.db_type.clone(),
        flags.join(" "),
    ]
}

fn write_aligned(output: &mut String, indent: &str, facts: &[(&str, String)]) {
    let rows = facts
        .iter()
        .map(|(label, value)| vec![format!("{}:", label), value.clone()])
        .collect::<Vec<_>>();
    write_rows(output, indent, &rows);
}

/// Write rows as columns padded to their widest cell.
fn write_rows(output: &mut String, indent: &str, rows: &[Vec<String>]) {
    let cells = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths = (0..cells)
        .map(|i| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.width())
                .max()
                .unwrap_or(0)
        })
        .collect::<Vec<_>>();

    for row in rows {
        let mut line = String::from(indent);
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                line.push_str("  ");
            }
            line.push_str(cell);
            if i + 1 < row.len() {
                line.push_str(&" ".repeat(widths[i] - cell.width()));
            }
        }
        output.push_str(line.trim_end());
        output.push('\n');
    }
}
