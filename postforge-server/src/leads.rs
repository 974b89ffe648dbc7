//! Lead capture. Every valid request is upserted by email on a detached task;
//! the outcome never reaches the HTTP response.

use std::fmt;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tokio::{sync::Mutex, task::JoinHandle};

use postforge_core::PostforgeError;
use postforge_prompt::GenerationConfig;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LeadRecord {
    pub email: String,
    pub service: String,
    pub problem: String,
    pub result: String,
    pub price_range: String,
    pub audience: String,
    pub audience_stage: String,
    pub post_type: String,
    pub topic: Option<String>,
    pub tone: String,
    pub last_seen_at: DateTime<Utc>,
}

impl LeadRecord {
    pub fn from_config(config: &GenerationConfig, seen_at: DateTime<Utc>) -> Self {
        Self {
            email: normalize_email(config.contact_email()),
            service: config.service().to_string(),
            problem: config.problem().to_string(),
            result: config.result().to_string(),
            price_range: config.price_range().as_str().to_string(),
            audience: config.audience().to_string(),
            audience_stage: config.audience_stage().as_str().to_string(),
            post_type: config.post_type().as_str().to_string(),
            topic: config.topic().map(str::to_string),
            tone: config.tone().as_str().to_string(),
            last_seen_at: seen_at,
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
pub trait LeadStore: Send + Sync + 'static {
    async fn upsert(&self, lead: LeadRecord) -> Result<(), PostforgeError>;
}

/// Upserts into a PostgREST table (e.g. Supabase) keyed on `email`.
#[derive(Clone)]
pub struct RestLeadStore {
    http: reqwest::Client,
    base_url: String,
    table: String,
    api_key: SecretString,
}

impl fmt::Debug for RestLeadStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestLeadStore")
            .field("base_url", &self.base_url)
            .field("table", &self.table)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl RestLeadStore {
    pub fn new(
        base_url: impl Into<String>,
        table: impl Into<String>,
        api_key: SecretString,
    ) -> Result<Self, PostforgeError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(PostforgeError::InvalidConfig(
                "lead store base url is empty".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|err| PostforgeError::InvalidConfig(err.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            table: table.into(),
            api_key,
        })
    }

    fn upsert_url(&self) -> String {
        format!("{}/rest/v1/{}?on_conflict=email", self.base_url, self.table)
    }
}

#[async_trait]
impl LeadStore for RestLeadStore {
    async fn upsert(&self, lead: LeadRecord) -> Result<(), PostforgeError> {
        let key = self.api_key.expose_secret();
        let response = self
            .http
            .post(self.upsert_url())
            .header("apikey", key.as_str())
            .bearer_auth(key)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[lead])
            .send()
            .await
            .map_err(|err| PostforgeError::Persistence(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PostforgeError::Persistence(format!(
                "HTTP {}: {body}",
                status.as_u16()
            )));
        }
        Ok(())
    }
}

/// In-process store, last write per email wins.
#[derive(Clone, Default)]
pub struct MemoryLeadStore {
    leads: Arc<Mutex<Vec<LeadRecord>>>,
}

impl MemoryLeadStore {
    pub async fn snapshot(&self) -> Vec<LeadRecord> {
        self.leads.lock().await.clone()
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn upsert(&self, lead: LeadRecord) -> Result<(), PostforgeError> {
        let mut leads = self.leads.lock().await;
        match leads.iter_mut().find(|existing| existing.email == lead.email) {
            Some(existing) => *existing = lead,
            None => leads.push(lead),
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct LeadRecorder {
    store: Option<Arc<dyn LeadStore>>,
    failures: Arc<AtomicU64>,
}

impl LeadRecorder {
    pub fn new(store: Arc<dyn LeadStore>) -> Self {
        Self {
            store: Some(store),
            failures: Arc::default(),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Persistence failures since startup.
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Spawns the upsert and returns immediately.
    pub fn record(&self, config: &GenerationConfig) -> Option<JoinHandle<()>> {
        let Some(store) = self.store.clone() else {
            tracing::debug!("no lead store configured; skipping lead capture");
            return None;
        };
        let lead = LeadRecord::from_config(config, Utc::now());
        let failures = Arc::clone(&self.failures);

        Some(tokio::spawn(async move {
            if let Err(err) = store.upsert(lead).await {
                let total = failures.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(error = %err, failures = total, "lead upsert failed");
            }
        }))
    }
}
