//! Deterministic rendering of a [`GenerationConfig`] into the system/user
//! text pair sent to the model.

use std::fmt::Write as _;

use serde::Serialize;

use postforge_core::Message;

use crate::config::{AudienceStage, GenerationConfig, PostType};
use crate::output::{POST_MARKER, WHY_MARKER};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedPrompt {
    pub system_text: String,
    pub user_text: String,
}

impl ComposedPrompt {
    /// Role-tagged messages in the order the provider expects them.
    pub fn to_messages(&self) -> Vec<Message> {
        vec![
            Message::system(self.system_text.clone()),
            Message::user(self.user_text.clone()),
        ]
    }
}

const SYSTEM_TEXT: &str = "\
You write LinkedIn posts for independent service providers. You write as a practitioner \
who does this work every week, never as a teacher explaining a topic.

Hard rules:
- Never use the word \"most\".
- No hashtags. No emojis. No markdown. No bold or italics.
- No section labels or headings inside the post.
- No generic motivational lines and no listicles.

Every post must:
1. Open with a line of 8 words or fewer that names the reader's pain.
2. Create tension within the first two lines.
3. Include one micro-specific detail (a number, a moment, a concrete artifact).
4. Make 2-3 sharp observations the reader has not heard phrased this way.
5. State one uncomfortable truth in 6 words or fewer.
6. Use at least one short contrastive sentence (\"Not X. Y.\").
7. Say explicitly who this is not for.
8. Close with a call to action that asks for a concrete reply (a word, a number, a situation), \
never \"thoughts?\" or \"like and share\".

Output format. Return exactly this and nothing else:

POST:
<the post, plain text, short paragraphs separated by blank lines>

WHY THIS BUILDS AUTHORITY:
- <reason 1>
- <reason 2>
- <reason 3>";

/// The fixed instruction block; identical for every request.
pub fn system_text() -> &'static str {
    SYSTEM_TEXT
}

pub fn mode_guidance(post_type: PostType) -> &'static str {
    match post_type {
        PostType::Contrarian => {
            "Mode: contrarian. Pick one belief this audience holds about the problem and challenge it. \
Back the challenge with a specific pattern you keep seeing in client work, not a general claim."
        }
        PostType::Client => {
            "Mode: client. Teach one insight a buyer needs before hiring for this service. \
Spell out what it costs them to keep ignoring the problem, in their terms."
        }
        PostType::Authority => {
            "Mode: authority. Lead with a sharp opinion about how the problem is usually handled. \
Make it explicit who you work with and who you turn away."
        }
    }
}

pub fn stage_guidance(stage: AudienceStage) -> &'static str {
    match stage {
        AudienceStage::Beginner => {
            "Audience stage: beginner. Use simpler language and skip jargon. \
Keep the call to action low-friction: a one-word reply is enough."
        }
        AudienceStage::Scaling => {
            "Audience stage: scaling. Assume competence and skip the basics. \
Be selective and confident in the call to action; not everyone qualifies."
        }
        AudienceStage::Growing => {
            "Audience stage: growing. Balance clarity with depth. \
Assume they have tried the obvious fixes already."
        }
    }
}

/// Renders the prompt. Pure: the same config always yields the same bytes.
pub fn compose(config: &GenerationConfig) -> ComposedPrompt {
    let mut user_text = String::with_capacity(1024);

    user_text.push_str("Business profile:\n");
    push_field(&mut user_text, "Service", config.service());
    push_field(&mut user_text, "Problem solved", config.problem());
    push_field(&mut user_text, "Result delivered", config.result());
    push_field(&mut user_text, "Target audience", config.audience());
    push_field(&mut user_text, "Audience stage", config.audience_stage().label());
    push_field(&mut user_text, "Price range", config.price_range().label());
    push_field(&mut user_text, "Post type", config.post_type().label());
    push_field(&mut user_text, "Tone", config.tone().label());
    push_field(
        &mut user_text,
        "Topic / angle",
        config.topic().unwrap_or("None given. Choose the sharpest angle."),
    );

    user_text.push('\n');
    user_text.push_str(mode_guidance(config.post_type()));
    user_text.push_str("\n\n");
    user_text.push_str(stage_guidance(config.audience_stage()));
    user_text.push_str("\n\n");
    let _ = write!(
        user_text,
        "Write the post now. Respond in the exact format: a line reading {POST_MARKER}, \
the post, a blank line, a line reading {WHY_MARKER}, then exactly three lines starting with \"- \"."
    );

    ComposedPrompt {
        system_text: SYSTEM_TEXT.to_string(),
        user_text,
    }
}

fn push_field(buf: &mut String, label: &str, value: &str) {
    let _ = writeln!(buf, "- {label}: {value}");
}
