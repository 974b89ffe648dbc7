pub mod compose;
pub mod config;
pub mod output;

pub use compose::{compose, ComposedPrompt};
pub use config::{
    is_valid_email, AudienceStage, GenerationConfig, GenerationConfigBuilder, PostType,
    PriceRange, Tone,
};
pub use output::{parse_generation, GenerationResult};
