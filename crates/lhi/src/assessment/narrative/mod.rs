//! Narrative elaboration of scored assessments.
//!
//! A [`NarrativeGenerator`] turns an [`AssessmentResult`] into report prose. Generation is
//! additive: callers substitute [`FallbackNarrator`] output whenever a generator fails, so a
//! numeric result is never held back by the narrative step.

mod chat;
mod prompt;

pub use chat::ChatCompletionNarrator;
pub use prompt::{build_prompt, parse_sections, SYSTEM_PROMPT};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::report::AiAnalysis;
use super::scoring::AssessmentResult;
use crate::config::NarrativeConfig;

#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn analyze(&self, result: &AssessmentResult) -> Result<AiAnalysis, NarrativeError>;

    fn name(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("narrative API key not configured")]
    MissingApiKey,
    #[error("narrative request failed: {0}")]
    Transport(String),
    #[error("narrative API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("narrative response contained no content")]
    EmptyResponse,
}

/// Deterministic template text used when no generator is configured or a call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackNarrator;

impl FallbackNarrator {
    pub fn analysis(&self, result: &AssessmentResult) -> AiAnalysis {
        AiAnalysis {
            result_interpretation: format!(
                "您的恋爱健康指数为 {} 分，处于{}水平，反映了当前恋爱关系的整体健康状况。您的依恋风格是{}，它会影响您在亲密关系中的互动方式。",
                result.total_score,
                result.category.label(),
                result.attachment_style.label()
            ),
            strengths: "愿意了解并改善自己的关系，本身就是一种重要的自我觉察能力，也是健康关系的基础。".to_string(),
            areas_to_watch: "留意情绪管理、沟通方式和依恋模式对关系质量的影响，必要时及时寻求帮助。".to_string(),
            personalized_advice: "尝试识别并表达自己的真实需求，保持开放的沟通，建立健康的边界，同时给予伴侣信任和空间。".to_string(),
            professional_advice: "定期进行自我反思；如果困扰持续存在，可以考虑寻求专业心理咨询的支持。".to_string(),
        }
    }
}

#[async_trait]
impl NarrativeGenerator for FallbackNarrator {
    async fn analyze(&self, result: &AssessmentResult) -> Result<AiAnalysis, NarrativeError> {
        Ok(self.analysis(result))
    }

    fn name(&self) -> &str {
        "fallback"
    }
}

/// Pick the chat-completion narrator when an API key is configured, else the fallback.
pub fn narrator_from_config(config: &NarrativeConfig) -> Arc<dyn NarrativeGenerator> {
    if config.api_key.is_none() {
        return Arc::new(FallbackNarrator);
    }

    match ChatCompletionNarrator::new(config) {
        Ok(narrator) => Arc::new(narrator),
        Err(err) => {
            warn!(error = %err, "narrative client unavailable, using fallback text");
            Arc::new(FallbackNarrator)
        }
    }
}
