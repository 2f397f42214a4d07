//! Pipeline failure type
//!
//! Every failure carries the stage it happened in, so callers can report
//! which stage failed and why. Nothing is swallowed: template and backend
//! errors are wrapped unchanged as the error source.

use thiserror::Error;

use crate::stage::StageId;
use crate::template::TemplateError;
use codeforge_llm::LlmError;

/// A stage of the current invocation failed.
///
/// Earlier stages' outputs remain bound in the variable store; the run
/// transitions to `Failed` and the remaining planned stages are not
/// executed.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A required input variable was unbound at render time.
    #[error("stage {stage} failed to render its prompt: {source}")]
    Template {
        stage: StageId,
        #[source]
        source: TemplateError,
    },

    /// The generation backend failed.
    #[error("stage {stage} failed: {source}")]
    Backend {
        stage: StageId,
        #[source]
        source: LlmError,
    },
}

impl PipelineError {
    /// The stage the failure occurred in.
    #[must_use]
    pub fn stage(&self) -> StageId {
        match self {
            Self::Template { stage, .. } | Self::Backend { stage, .. } => *stage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_failing_stage() {
        let err = PipelineError::Backend {
            stage: StageId::Improve,
            source: LlmError::Unavailable("connection refused".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("improve"));
        assert_eq!(err.stage(), StageId::Improve);
    }

    #[test]
    fn template_failures_carry_the_variable_name_in_the_source() {
        let err = PipelineError::Template {
            stage: StageId::Review,
            source: TemplateError::UnboundVariable {
                name: "generated_code".to_string(),
            },
        };
        assert!(err.to_string().contains("generated_code"));
    }
}
