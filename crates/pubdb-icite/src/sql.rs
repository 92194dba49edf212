//! SQL generation for the iCite table and its indexes.

use crate::chunks::ColumnType;

/// `(index name, column)` pairs, created in this order after loading.
pub const INDEXES: [(&str, &str); 4] = [
    ("idx_pmid", "pmid"),
    ("idx_year", "year"),
    ("idx_cc", "citation_count"),
    ("idx_rcr", "relative_citation_ratio"),
];

/// Double-quote an identifier, escaping embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Table DDL from the header and the types inferred on the first chunk.
pub fn create_table(table: &str, columns: &[(String, ColumnType)]) -> String {
    let cols = columns
        .iter()
        .map(|(name, ty)| format!("{} {}", quote_ident(name), ty.sql()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE IF NOT EXISTS {} ({cols})", quote_ident(table))
}

/// Change a column's type in place; existing values are cast.
pub fn alter_column_type(table: &str, column: &str, ty: ColumnType) -> String {
    format!(
        "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
        quote_ident(table),
        quote_ident(column),
        ty.sql()
    )
}

/// Index DDL, in creation order.
pub fn create_indexes(table: &str) -> Vec<String> {
    INDEXES
        .iter()
        .map(|(name, column)| {
            format!(
                "CREATE INDEX {name} ON {} ({})",
                quote_ident(table),
                quote_ident(column)
            )
        })
        .collect()
}

pub fn count_rows(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", quote_ident(table))
}
