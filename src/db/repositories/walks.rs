use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use uuid::Uuid;

use crate::{
    db::{
        connection::Database,
        helpers::{parse_datetime, parse_optional_datetime, to_i64, to_u64},
        models::Walk,
    },
    fitness::PedometerSample,
};

const WALK_COLUMNS: &str =
    "id, started_at, ended_at, pause_secs, steps, distance_meters, created_at, updated_at";

fn row_to_walk(row: &Row) -> Result<Walk> {
    let started_at: String = row.get("started_at")?;
    let ended_at: Option<String> = row.get("ended_at")?;
    let pause_secs: i64 = row.get("pause_secs")?;
    let steps: Option<i64> = row.get("steps")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Walk {
        id: row.get("id")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        ended_at: parse_optional_datetime(ended_at, "ended_at")?,
        pause_secs: to_u64(pause_secs, "pause_secs")?,
        steps: steps.map(|value| to_u64(value, "steps")).transpose()?,
        distance_meters: row.get("distance_meters")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

fn active_walk(conn: &rusqlite::Connection) -> Result<Option<Walk>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {WALK_COLUMNS} FROM walks
         WHERE ended_at IS NULL
         ORDER BY started_at DESC
         LIMIT 1"
    ))?;

    let mut rows = stmt.query([])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_walk(row)?)),
        None => Ok(None),
    }
}

impl Database {
    /// Creates the in-progress walk record. At most one walk can be in
    /// progress; subscribers of [`Database::watch_active_walk`] are notified.
    pub async fn start_walk(&self) -> Result<Walk> {
        let walk = self
            .execute(move |conn| {
                if active_walk(conn)?.is_some() {
                    return Err(anyhow!("a walk is already in progress"));
                }

                let now = Utc::now();
                let walk = Walk {
                    id: Uuid::new_v4().to_string(),
                    started_at: now,
                    ended_at: None,
                    pause_secs: 0,
                    steps: None,
                    distance_meters: None,
                    created_at: now,
                    updated_at: now,
                };

                conn.execute(
                    "INSERT INTO walks (id, started_at, ended_at, pause_secs, steps, distance_meters, created_at, updated_at)
                     VALUES (?1, ?2, NULL, 0, NULL, NULL, ?3, ?4)",
                    params![
                        walk.id,
                        walk.started_at.to_rfc3339(),
                        walk.created_at.to_rfc3339(),
                        walk.updated_at.to_rfc3339(),
                    ],
                )?;

                Ok(walk)
            })
            .await?;

        self.watchers.active_walk.send_replace(Some(walk.clone()));
        Ok(walk)
    }

    pub async fn get_active_walk(&self) -> Result<Option<Walk>> {
        self.execute(|conn| active_walk(conn)).await
    }

    /// Commits a stopped recording: end instant, accumulated pause, and the
    /// final pedometer reading are written as one record in one transaction.
    pub async fn finish_walk(
        &self,
        walk_id: &str,
        ended_at: DateTime<Utc>,
        pause_secs: u64,
        sample: Option<PedometerSample>,
    ) -> Result<Walk> {
        let walk_id = walk_id.to_string();
        let walk = self
            .execute(move |conn| {
                let tx = conn.transaction()?;
                let now = Utc::now();

                let rows_affected = tx.execute(
                    "UPDATE walks
                     SET ended_at = ?1,
                         pause_secs = ?2,
                         steps = ?3,
                         distance_meters = ?4,
                         updated_at = ?5
                     WHERE id = ?6 AND ended_at IS NULL",
                    params![
                        ended_at.to_rfc3339(),
                        to_i64(pause_secs)?,
                        sample.map(|s| to_i64(s.steps)).transpose()?,
                        sample.map(|s| s.distance_meters),
                        now.to_rfc3339(),
                        walk_id,
                    ],
                )?;

                if rows_affected == 0 {
                    return Err(anyhow!("walk {walk_id} not found or already finished"));
                }

                let walk = {
                    let mut stmt = tx.prepare(&format!(
                        "SELECT {WALK_COLUMNS} FROM walks WHERE id = ?1"
                    ))?;
                    let mut rows = stmt.query(params![walk_id])?;
                    match rows.next()? {
                        Some(row) => row_to_walk(row)?,
                        None => return Err(anyhow!("walk {walk_id} vanished during commit")),
                    }
                };

                tx.commit()?;
                Ok(walk)
            })
            .await?;

        let active = self.get_active_walk().await?;
        self.watchers.active_walk.send_replace(active);
        Ok(walk)
    }

    /// Committed walks whose recording falls inside `[from, to)`, most recent
    /// first.
    pub async fn list_walks_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Walk>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {WALK_COLUMNS} FROM walks
                 WHERE ended_at IS NOT NULL
                   AND started_at >= ?1
                   AND ended_at < ?2
                 ORDER BY ended_at DESC"
            ))?;

            let mut rows = stmt.query(params![from.to_rfc3339(), to.to_rfc3339()])?;
            let mut walks = Vec::new();
            while let Some(row) = rows.next()? {
                walks.push(row_to_walk(row)?);
            }

            Ok(walks)
        })
        .await
    }

    pub async fn delete_walk(&self, walk_id: &str) -> Result<()> {
        let walk_id = walk_id.to_string();
        self.execute(move |conn| {
            conn.execute("DELETE FROM walks WHERE id = ?1", params![walk_id])?;
            Ok(())
        })
        .await?;

        let active = self.get_active_walk().await?;
        self.watchers.active_walk.send_replace(active);
        Ok(())
    }
}
