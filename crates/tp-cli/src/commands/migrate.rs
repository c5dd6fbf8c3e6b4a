//! Migrate command: the only place the schema is created or dropped.

use std::io::Write;

use anyhow::{Context, Result};
use tp_db::{Database, SCHEMA_VERSION};

pub fn run<W: Write>(writer: &mut W, db: &Database, reset: bool) -> Result<()> {
    if reset {
        db.reset().context("failed to reset database")?;
        writeln!(
            writer,
            "Database reset; all events dropped (schema version {SCHEMA_VERSION})."
        )?;
        return Ok(());
    }

    if db.migrate().context("failed to migrate database")? {
        writeln!(writer, "Migrated database to schema version {SCHEMA_VERSION}.")?;
    } else {
        writeln!(writer, "Database already at schema version {SCHEMA_VERSION}.")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrate_reports_progress() {
        let temp = tempfile::tempdir().unwrap();
        let db = Database::open(&temp.path().join("tp.db")).unwrap();

        let mut first = Vec::new();
        run(&mut first, &db, false).unwrap();
        let mut second = Vec::new();
        run(&mut second, &db, false).unwrap();

        assert_eq!(
            String::from_utf8(first).unwrap(),
            "Migrated database to schema version 1.\n"
        );
        assert_eq!(
            String::from_utf8(second).unwrap(),
            "Database already at schema version 1.\n"
        );
    }
}
