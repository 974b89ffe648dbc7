//! Normalization of loosely-typed inbound requests into a [`GenerationConfig`].
//!
//! Required text fields are trimmed and must be non-empty. Enum fields never
//! reject: anything unrecognized collapses to the field's default here, once,
//! so nothing downstream has to repeat the fallback.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use postforge_core::ValidationError;

macro_rules! lenient_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $variant:ident => $wire:literal, $label:literal; )+
        }
        default = $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Unknown or absent values map to the default.
            pub fn parse_lenient(raw: Option<&str>) -> Self {
                let Some(raw) = raw else {
                    return Self::default();
                };
                let key = raw.trim().to_ascii_lowercase();
                match key.as_str() {
                    $( $wire => $name::$variant, )+
                    _ => Self::default(),
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $wire, )+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }
    };
}

lenient_enum! {
    PriceRange {
        Under500 => "under_500", "Under $500";
        From500To2k => "500_2k", "$500 - $2k";
        From2kTo5k => "2k_5k", "$2k - $5k";
        Over5k => "5k_plus", "$5k+";
        Unsure => "unsure", "Not sure yet";
    }
    default = Unsure
}

lenient_enum! {
    AudienceStage {
        Beginner => "beginner", "Beginner";
        Growing => "growing", "Growing";
        Scaling => "scaling", "Scaling";
    }
    default = Growing
}

lenient_enum! {
    PostType {
        Authority => "authority", "Authority";
        Contrarian => "contrarian", "Contrarian";
        Client => "client", "Client-focused";
    }
    default = Authority
}

lenient_enum! {
    Tone {
        Direct => "direct", "Direct";
        Calm => "calm", "Calm";
        Educational => "educational", "Educational";
    }
    default = Direct
}

/// A validated, normalized generation request. Only constructible through
/// [`GenerationConfig::from_value`] or [`GenerationConfig::builder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    service: String,
    problem: String,
    result: String,
    audience: String,
    price_range: PriceRange,
    audience_stage: AudienceStage,
    post_type: PostType,
    tone: Tone,
    topic: Option<String>,
    contact_email: String,
}

impl GenerationConfig {
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder::default()
    }

    /// Normalizes an untyped JSON request body. Non-string values are treated
    /// as absent.
    pub fn from_value(input: &Value) -> Result<Self, ValidationError> {
        let field = |name: &str| input.get(name).and_then(Value::as_str);

        GenerationConfigBuilder {
            service: field("service").map(str::to_string),
            problem: field("problem").map(str::to_string),
            result: field("result").map(str::to_string),
            audience: field("audience").map(str::to_string),
            price_range: field("priceRange").map(str::to_string),
            audience_stage: field("audienceStage").map(str::to_string),
            post_type: field("postType").map(str::to_string),
            tone: field("tone").map(str::to_string),
            topic: field("topic").map(str::to_string),
            email: field("email").map(str::to_string),
        }
        .build()
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn problem(&self) -> &str {
        &self.problem
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn price_range(&self) -> PriceRange {
        self.price_range
    }

    pub fn audience_stage(&self) -> AudienceStage {
        self.audience_stage
    }

    pub fn post_type(&self) -> PostType {
        self.post_type
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn contact_email(&self) -> &str {
        &self.contact_email
    }
}

#[derive(Clone, Debug, Default)]
pub struct GenerationConfigBuilder {
    service: Option<String>,
    problem: Option<String>,
    result: Option<String>,
    audience: Option<String>,
    price_range: Option<String>,
    audience_stage: Option<String>,
    post_type: Option<String>,
    tone: Option<String>,
    topic: Option<String>,
    email: Option<String>,
}

impl GenerationConfigBuilder {
    pub fn service(mut self, value: impl Into<String>) -> Self {
        self.service = Some(value.into());
        self
    }

    pub fn problem(mut self, value: impl Into<String>) -> Self {
        self.problem = Some(value.into());
        self
    }

    pub fn result(mut self, value: impl Into<String>) -> Self {
        self.result = Some(value.into());
        self
    }

    pub fn audience(mut self, value: impl Into<String>) -> Self {
        self.audience = Some(value.into());
        self
    }

    pub fn price_range(mut self, value: impl Into<String>) -> Self {
        self.price_range = Some(value.into());
        self
    }

    pub fn audience_stage(mut self, value: impl Into<String>) -> Self {
        self.audience_stage = Some(value.into());
        self
    }

    pub fn post_type(mut self, value: impl Into<String>) -> Self {
        self.post_type = Some(value.into());
        self
    }

    pub fn tone(mut self, value: impl Into<String>) -> Self {
        self.tone = Some(value.into());
        self
    }

    pub fn topic(mut self, value: impl Into<String>) -> Self {
        self.topic = Some(value.into());
        self
    }

    pub fn email(mut self, value: impl Into<String>) -> Self {
        self.email = Some(value.into());
        self
    }

    pub fn build(self) -> Result<GenerationConfig, ValidationError> {
        let service = non_blank(self.service);
        let problem = non_blank(self.problem);
        let result = non_blank(self.result);
        let audience = non_blank(self.audience);
        let email = non_blank(self.email);

        let missing: Vec<&'static str> = [
            ("service", service.is_none()),
            ("problem", problem.is_none()),
            ("result", result.is_none()),
            ("audience", audience.is_none()),
            ("email", email.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        let (Some(service), Some(problem), Some(result), Some(audience), Some(contact_email)) =
            (service, problem, result, audience, email)
        else {
            return Err(ValidationError::MissingFields(missing));
        };

        if !is_valid_email(&contact_email) {
            return Err(ValidationError::InvalidEmail);
        }

        Ok(GenerationConfig {
            service,
            problem,
            result,
            audience,
            price_range: PriceRange::parse_lenient(self.price_range.as_deref()),
            audience_stage: AudienceStage::parse_lenient(self.audience_stage.as_deref()),
            post_type: PostType::parse_lenient(self.post_type.as_deref()),
            tone: Tone::parse_lenient(self.tone.as_deref()),
            topic: non_blank(self.topic),
            contact_email,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Conservative address shape check: `local@domain.tld`, no whitespace.
pub fn is_valid_email(candidate: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| {
            Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
        })
        .is_match(candidate)
}
