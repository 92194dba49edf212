pub mod dump;
pub mod icite;

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use crate::config::{Config, mask_uri};

/// Print the resolved settings as a table on stderr.
pub fn show_config(config: &Config) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    let uri = match config.mongo.resolved_uri() {
        Ok(uri) => mask_uri(&uri),
        Err(_) => format!("not set ({})", config.mongo.uri),
    };
    table.add_row(vec!["MongoDB URI", &uri]);
    table.add_row(vec!["Database", &config.mongo.database]);
    table.add_row(vec!["Collection", &config.mongo.collection]);
    table.add_row(vec!["Batch size", &config.export.batch_size.to_string()]);
    table.add_row(vec![
        "Schema drift",
        if config.export.strict_schema {
            "strict"
        } else {
            "lenient"
        },
    ]);
    table.add_row(vec!["Import table", &config.import.table]);
    table.add_row(vec!["Chunk size", &config.import.chunk_size.to_string()]);

    eprintln!("\n{table}");
}
