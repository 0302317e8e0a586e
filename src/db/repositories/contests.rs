use anyhow::Result;
use rusqlite::{params, Row};

use crate::db::{connection::Database, helpers::parse_date, models::Contest};

fn row_to_contest(row: &Row) -> Result<Contest> {
    let starts_on: String = row.get("starts_on")?;
    let ends_on: String = row.get("ends_on")?;

    Ok(Contest {
        id: row.get("id")?,
        starts_on: parse_date(&starts_on, "starts_on")?,
        ends_on: parse_date(&ends_on, "ends_on")?,
    })
}

fn latest_contest(conn: &rusqlite::Connection) -> Result<Option<Contest>> {
    let mut stmt = conn.prepare(
        "SELECT id, starts_on, ends_on FROM contests
         ORDER BY starts_on DESC
         LIMIT 1",
    )?;

    let mut rows = stmt.query([])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_contest(row)?)),
        None => Ok(None),
    }
}

impl Database {
    /// Inserts or replaces the contest record and notifies
    /// [`Database::watch_contest`] subscribers.
    pub async fn upsert_contest(&self, contest: &Contest) -> Result<()> {
        let record = contest.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO contests (id, starts_on, ends_on)
                 VALUES (?1, ?2, ?3)",
                params![
                    record.id,
                    record.starts_on.format("%Y-%m-%d").to_string(),
                    record.ends_on.format("%Y-%m-%d").to_string(),
                ],
            )?;
            Ok(())
        })
        .await?;

        let current = self.current_contest().await?;
        self.watchers.contest.send_replace(current);
        Ok(())
    }

    pub async fn current_contest(&self) -> Result<Option<Contest>> {
        self.execute(|conn| latest_contest(conn)).await
    }
}
