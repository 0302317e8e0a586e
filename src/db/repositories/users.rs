use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Row};
use uuid::Uuid;

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, to_u64},
    models::AppUser,
};

fn row_to_user(row: &Row) -> Result<AppUser> {
    let age: i64 = row.get("age")?;
    let created_at: String = row.get("created_at")?;

    Ok(AppUser {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        zip: row.get("zip")?,
        age: to_u64(age, "age")? as u32,
        account_id: row.get("account_id")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    pub async fn create_user(
        &self,
        name: String,
        email: String,
        zip: String,
        age: u32,
    ) -> Result<AppUser> {
        self.execute(move |conn| {
            let user = AppUser {
                id: Uuid::new_v4().to_string(),
                name,
                email,
                zip,
                age,
                account_id: None,
                created_at: Utc::now(),
            };

            conn.execute(
                "INSERT INTO app_users (id, name, email, zip, age, account_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6)",
                params![
                    user.id,
                    user.name,
                    user.email,
                    user.zip,
                    user.age as i64,
                    user.created_at.to_rfc3339(),
                ],
            )?;

            Ok(user)
        })
        .await
    }

    /// The single local user, if onboarding has completed.
    pub async fn get_user(&self) -> Result<Option<AppUser>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, email, zip, age, account_id, created_at
                 FROM app_users
                 ORDER BY created_at ASC
                 LIMIT 1",
            )?;

            let mut rows = stmt.query([])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_user(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    pub async fn set_user_account_id(&self, user_id: &str, account_id: &str) -> Result<()> {
        let user_id = user_id.to_string();
        let account_id = account_id.to_string();
        self.execute(move |conn| {
            conn.execute(
                "UPDATE app_users SET account_id = ?1 WHERE id = ?2",
                params![account_id, user_id],
            )?;
            Ok(())
        })
        .await
    }
}
