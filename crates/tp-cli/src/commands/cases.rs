//! Cases command for listing known cases.

use std::io::Write;

use anyhow::Result;
use tp_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let cases = db.list_cases()?;

    if cases.is_empty() {
        writeln!(writer, "No events recorded.")?;
        return Ok(());
    }

    for case in cases {
        writeln!(
            writer,
            "{}  {} events  last {}",
            case.case_id, case.events, case.last_event
        )?;
    }

    Ok(())
}
