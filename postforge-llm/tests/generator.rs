use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use httpmock::prelude::*;
use serde_json::json;

use postforge_core::{Backoff, PostforgeError, RetryPolicy, Role, Runnable, Sleeper};
use postforge_llm::{LlmRequest, LlmResponse, OpenAiCompatibleClient, PostGenerator};
use postforge_prompt::{compose, ComposedPrompt, GenerationConfig, GenerationResult};

const WELL_FORMED: &str = "POST:\nYour landing page isn't the problem.\n\nYour offer is.\n\nWHY THIS BUILDS AUTHORITY:\n- Names the real bottleneck\n- Takes a position\n- Filters out bargain hunters\n";

/// Replays scripted outcomes, one per call, and records every request.
#[derive(Clone, Default)]
struct ScriptedLlm {
    outcomes: Arc<Mutex<VecDeque<Result<String, PostforgeError>>>>,
    requests: Arc<Mutex<Vec<LlmRequest>>>,
}

impl ScriptedLlm {
    fn new(outcomes: Vec<Result<String, PostforgeError>>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(outcomes.into())),
            requests: Arc::default(),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Runnable<LlmRequest, LlmResponse> for ScriptedLlm {
    async fn invoke(&self, input: LlmRequest) -> Result<LlmResponse, PostforgeError> {
        self.requests.lock().unwrap().push(input);
        let next = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PostforgeError::LlmProvider("script exhausted".to_string())));
        next.map(|content| LlmResponse { content })
    }
}

#[derive(Clone, Default)]
struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

#[async_trait::async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

fn prompt() -> ComposedPrompt {
    let config = GenerationConfig::builder()
        .service("Landing page design")
        .problem("Low conversion")
        .result("More demos booked")
        .audience("B2B SaaS founders")
        .post_type("authority")
        .email("a@b.com")
        .build()
        .expect("config");
    compose(&config)
}

fn transient() -> PostforgeError {
    PostforgeError::LlmProvider("503 service unavailable".to_string())
}

#[tokio::test]
async fn well_formed_reply_is_parsed() {
    let llm = ScriptedLlm::new(vec![Ok(WELL_FORMED.to_string())]);
    let generator = PostGenerator::new(llm.clone()).with_sleeper(RecordingSleeper::default());

    let result = generator.generate(&prompt()).await.expect("generate");

    assert_eq!(
        result.post,
        "Your landing page isn't the problem.\n\nYour offer is."
    );
    assert_eq!(
        result.why,
        vec![
            "Names the real bottleneck",
            "Takes a position",
            "Filters out bargain hunters"
        ]
    );
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn request_carries_system_and_user_text_with_fixed_sampling() {
    let llm = ScriptedLlm::new(vec![Ok(WELL_FORMED.to_string())]);
    let generator = PostGenerator::new(llm.clone()).with_model("gpt-4o-mini");
    let prompt = prompt();

    generator.generate(&prompt).await.expect("generate");

    let requests = llm.requests.lock().unwrap();
    let sent = &requests[0];
    assert_eq!(sent.model, "gpt-4o-mini");
    assert_eq!(sent.temperature, Some(0.8));
    assert_eq!(sent.max_tokens, Some(700));
    assert_eq!(sent.messages.len(), 2);
    assert_eq!(sent.messages[0].role, Role::System);
    assert_eq!(sent.messages[0].content, prompt.system_text);
    assert_eq!(sent.messages[1].role, Role::User);
    assert_eq!(sent.messages[1].content, prompt.user_text);
}

#[tokio::test]
async fn two_failures_then_success_backs_off_linearly() {
    let llm = ScriptedLlm::new(vec![
        Err(transient()),
        Err(PostforgeError::Timeout(Duration::from_secs(60))),
        Ok(WELL_FORMED.to_string()),
    ]);
    let sleeper = RecordingSleeper::default();
    let generator = PostGenerator::new(llm.clone()).with_sleeper(sleeper.clone());

    let result = generator.generate(&prompt()).await.expect("generate");

    assert_eq!(result.why.len(), 3);
    assert_eq!(llm.calls(), 3);
    assert_eq!(
        *sleeper.delays.lock().unwrap(),
        vec![Duration::from_millis(800), Duration::from_millis(1600)]
    );
}

#[tokio::test]
async fn three_failures_surface_generation_failure_without_fourth_attempt() {
    let llm = ScriptedLlm::new(vec![
        Err(transient()),
        Err(transient()),
        Err(transient()),
        Ok(WELL_FORMED.to_string()),
    ]);
    let sleeper = RecordingSleeper::default();
    let generator = PostGenerator::new(llm.clone()).with_sleeper(sleeper.clone());

    let err = generator.generate(&prompt()).await.unwrap_err();

    assert!(matches!(err, PostforgeError::GenerationFailed { attempts: 3, .. }));
    assert_eq!(llm.calls(), 3);
    assert_eq!(sleeper.delays.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn malformed_reply_degrades_without_retrying() {
    let llm = ScriptedLlm::new(vec![Ok("  Just some text, no markers.  ".to_string())]);
    let sleeper = RecordingSleeper::default();
    let generator = PostGenerator::new(llm.clone()).with_sleeper(sleeper.clone());

    let result = generator.generate(&prompt()).await.expect("generate");

    assert_eq!(result.post, "Just some text, no markers.");
    assert!(result.why.is_empty());
    assert!(result.is_degraded());
    assert_eq!(llm.calls(), 1);
    assert!(sleeper.delays.lock().unwrap().is_empty());
}

#[tokio::test]
async fn generator_is_usable_through_the_runnable_seam() {
    let llm = ScriptedLlm::new(vec![Ok(WELL_FORMED.to_string())]);
    let generator: Arc<dyn Runnable<ComposedPrompt, GenerationResult> + Send + Sync> =
        Arc::new(PostGenerator::new(llm));

    let result = generator.invoke(prompt()).await.expect("generate");

    assert_eq!(result.why.len(), 3);
}

#[tokio::test]
async fn http_provider_failing_every_attempt_is_called_exactly_three_times() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(502).body("bad gateway");
    });
    let client = OpenAiCompatibleClient::builder()
        .base_url(server.base_url())
        .expect("url")
        .api_key("test-key")
        .build()
        .expect("client");
    let generator =
        PostGenerator::new(client).with_retry_policy(RetryPolicy::new(3, Backoff::None));

    let err = generator.generate(&prompt()).await.unwrap_err();

    match err {
        PostforgeError::GenerationFailed { attempts, source } => {
            assert_eq!(attempts, 3);
            assert_eq!(source.to_string(), "LLM provider failed: HTTP 502: bad gateway");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    mock.assert_hits(3);
}

#[tokio::test]
async fn http_provider_end_to_end() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(json!({
            "choices": [{"message": {"role": "assistant", "content": WELL_FORMED}}]
        }));
    });
    let client = OpenAiCompatibleClient::builder()
        .base_url(server.base_url())
        .expect("url")
        .api_key("test-key")
        .build()
        .expect("client");

    let result = PostGenerator::new(client)
        .generate(&prompt())
        .await
        .expect("generate");

    assert_eq!(result.why[2], "Filters out bargain hunters");
}
