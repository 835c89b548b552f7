//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `criminal_intent_core` linkage against the local database.
//! - Print the stored records and active theme in a stable format.

use criminal_intent_core::db::{db_path_from_env, open_db};
use criminal_intent_core::{RecordStore, SqliteKeyValueStore, ThemePreference};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("criminal_intent_core ping={}", criminal_intent_core::ping());
    println!(
        "criminal_intent_core version={}",
        criminal_intent_core::core_version()
    );

    let path = db_path_from_env();
    let conn = match open_db(&path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("failed to open {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
    };

    let theme = ThemePreference::load(SqliteKeyValueStore::new(&conn)).current();
    println!(
        "theme name={} color={} status_bar={} light={}",
        theme.name,
        theme.color,
        theme.status_bar.as_str(),
        theme.is_light
    );

    let store = RecordStore::load(SqliteKeyValueStore::new(&conn));
    println!("records count={}", store.len());
    for record in store.records() {
        let mark = if record.solved { "x" } else { " " };
        println!("[{mark}] {} {} {}", record.id, record.date, record.title);
    }

    ExitCode::SUCCESS
}
