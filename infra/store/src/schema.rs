use crate::record::Column;
use fhub_domain::constants;
use std::fmt::Write as _;

/// Every table with the columns it indexes; `true` marks a unique index.
const TABLES: &[(&str, &[(Column, bool)])] = &[
    (constants::USER, &[(Column::Code, true), (Column::Email, true)]),
    (constants::PACKAGE, &[(Column::Owner, false), (Column::Code, true)]),
    (constants::DELIVERY, &[(Column::Code, true)]),
    (constants::AUDIT, &[(Column::Parent, false)]),
    (constants::CONSOLIDATION, &[(Column::Owner, false), (Column::Code, true)]),
    (
        constants::SHIPMENT,
        &[(Column::Owner, false), (Column::Parent, false), (Column::Code, true)],
    ),
    (constants::PAYMENT, &[(Column::Owner, false), (Column::Parent, false)]),
    (constants::RATE, &[]),
    (constants::SETTINGS, &[]),
    (constants::ADDRESS, &[]),
    (constants::MAINTENANCE, &[]),
    (constants::TEMPLATE, &[]),
];

/// Index name of `column` on `table`. Duplicate errors are mapped back through it.
pub(crate) fn index_name(table: &str, column: Column) -> String {
    format!("{table}_{}", column.as_str())
}

/// Column named by an index in an engine error message.
pub(crate) fn column_of(index: &str) -> &str {
    index.rsplit_once('_').map_or(index, |(_, column)| column)
}

/// Idempotent schema script, applied in one transaction at startup.
pub(crate) fn script() -> String {
    let mut sql = String::from("BEGIN TRANSACTION;\n");
    for (table, indexes) in TABLES {
        let _ = writeln!(sql, "DEFINE TABLE IF NOT EXISTS {table} SCHEMALESS;");
        let ident = index_name(table, Column::Ident);
        let _ = writeln!(
            sql,
            "DEFINE INDEX IF NOT EXISTS {ident} ON TABLE {table} FIELDS ident UNIQUE;"
        );
        for (column, unique) in *indexes {
            let name = index_name(table, *column);
            let field = column.as_str();
            let unique = if *unique { " UNIQUE" } else { "" };
            let _ = writeln!(
                sql,
                "DEFINE INDEX IF NOT EXISTS {name} ON TABLE {table} FIELDS {field}{unique};"
            );
        }
    }
    sql.push_str("COMMIT TRANSACTION;");
    sql
}
