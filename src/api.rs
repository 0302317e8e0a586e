//! Blocking client for the companion server. Uploads are best-effort: errors
//! are returned to the caller and never retried here.

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use serde_json::Value;
use ureq::Agent;

use crate::fitness::DailyTotal;

#[derive(Debug, Clone, Serialize)]
pub struct CreateAppUser {
    pub name: String,
    pub email: String,
    pub zip: String,
    pub age: u32,
    pub account_id: Option<String>,
}

pub struct ApiClient {
    agent: Agent,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(10))
            .build();
        Self {
            agent,
            base_url: base_url.into(),
        }
    }

    pub fn create_app_user(&self, user: &CreateAppUser) -> Result<Value> {
        let url = format!("{}/appuser/create", self.base_url);
        let response = self
            .agent
            .post(&url)
            .send_json(user)
            .with_context(|| format!("appuser/create request to {url} failed"))?;
        response
            .into_json()
            .context("invalid appuser/create response")
    }

    pub fn upload_daily_walks(&self, account_id: &str, totals: &[DailyTotal]) -> Result<()> {
        let url = format!("{}/dailywalk/create", self.base_url);
        let payload = serde_json::json!({
            "account_id": account_id,
            "daily_walks": totals,
        });
        self.agent
            .post(&url)
            .send_json(payload)
            .with_context(|| format!("dailywalk/create request to {url} failed"))?;
        info!("Uploaded {} daily walk totals", totals.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_app_user_payload_uses_server_field_names() {
        let user = CreateAppUser {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            zip: "94110".into(),
            age: 36,
            account_id: None,
        };

        let payload = serde_json::to_value(&user).unwrap();
        assert_eq!(payload["name"], "Ada");
        assert_eq!(payload["zip"], "94110");
        assert_eq!(payload["age"], 36);
        assert!(payload["account_id"].is_null());
    }
}
