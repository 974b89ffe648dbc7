use std::{fmt, net::SocketAddr, sync::Arc, time::Duration};

use clap::Parser;
use secrecy::SecretString;

use postforge_core::PostforgeError;
use postforge_llm::{OpenAiCompatibleClient, PostGenerator};

use crate::leads::{LeadRecorder, RestLeadStore};
use crate::SharedGenerator;

#[derive(Clone, Parser)]
#[command(name = "postforge", about = "Serve the post generation API")]
pub struct ServerConfig {
    /// Address to listen on.
    #[arg(long, env = "POSTFORGE_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// Provider credential. Without it every generation request fails with a
    /// configuration error.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = postforge_llm::openai_compatible::OPENAI_BASE_URL)]
    pub openai_base_url: String,

    #[arg(long, env = "OPENAI_MODEL", default_value = postforge_llm::openai_compatible::DEFAULT_MODEL)]
    pub openai_model: String,

    /// Per-attempt provider timeout.
    #[arg(long, env = "OPENAI_TIMEOUT_SECS", default_value_t = 60)]
    pub openai_timeout_secs: u64,

    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
    pub supabase_service_role_key: Option<String>,

    #[arg(long, env = "LEADS_TABLE", default_value = "leads")]
    pub leads_table: String,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| if value.is_some() { "<redacted>" } else { "<none>" };

        f.debug_struct("ServerConfig")
            .field("bind", &self.bind)
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("openai_timeout_secs", &self.openai_timeout_secs)
            .field("supabase_url", &self.supabase_url)
            .field(
                "supabase_service_role_key",
                &redact(&self.supabase_service_role_key),
            )
            .field("leads_table", &self.leads_table)
            .finish()
    }
}

impl ServerConfig {
    /// `Ok(None)` when no API key is set; the server still starts.
    pub fn build_generator(&self) -> Result<Option<SharedGenerator>, PostforgeError> {
        let Some(api_key) = non_blank(self.openai_api_key.as_deref()) else {
            return Ok(None);
        };

        let client = OpenAiCompatibleClient::builder()
            .base_url(&self.openai_base_url)?
            .api_key(api_key)
            .default_model(&self.openai_model)
            .timeout(Duration::from_secs(self.openai_timeout_secs))
            .build()?;

        let generator: SharedGenerator =
            Arc::new(PostGenerator::new(client).with_model(&self.openai_model));
        Ok(Some(generator))
    }

    pub fn build_lead_recorder(&self) -> Result<LeadRecorder, PostforgeError> {
        let url = non_blank(self.supabase_url.as_deref());
        let key = non_blank(self.supabase_service_role_key.as_deref());
        match (url, key) {
            (Some(url), Some(key)) => {
                let store = RestLeadStore::new(
                    url,
                    self.leads_table.clone(),
                    SecretString::new(key.to_string()),
                )?;
                Ok(LeadRecorder::new(Arc::new(store)))
            }
            (None, None) => Ok(LeadRecorder::disabled()),
            _ => {
                tracing::warn!(
                    "SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY must both be set; lead capture disabled"
                );
                Ok(LeadRecorder::disabled())
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
