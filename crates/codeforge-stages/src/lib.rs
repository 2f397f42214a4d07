//! The five codeforge stage definitions
//!
//! This crate pins down WHAT each stage asks the backend to do: the five
//! prompt templates and the canonical [`StageRegistry`] wiring them to their
//! input and output variables. The engine that interprets the registry lives
//! in `codeforge-pipeline`; keeping the prompt text here means prompt tuning
//! never touches the executor.

use once_cell::sync::Lazy;

use codeforge_pipeline::{Stage, StageId, StageRegistry, keys};

mod prompts;

pub use prompts::{
    CODE_GENERATION, CODE_IMPROVEMENT, CODE_REVIEW, TEST_CASE_GENERATION, UNIT_TEST_GENERATION,
};

static REGISTRY: Lazy<StageRegistry> = Lazy::new(|| {
    StageRegistry::new([
        Stage {
            id: StageId::Generate,
            inputs: &[keys::BUSINESS_REQUIREMENT],
            output: keys::GENERATED_CODE,
            template: prompts::CODE_GENERATION,
        },
        Stage {
            id: StageId::Review,
            inputs: &[keys::BUSINESS_REQUIREMENT, keys::GENERATED_CODE],
            output: keys::CODE_REVIEW,
            template: prompts::CODE_REVIEW,
        },
        Stage {
            id: StageId::Improve,
            inputs: &[
                keys::BUSINESS_REQUIREMENT,
                keys::GENERATED_CODE,
                keys::CODE_REVIEW,
            ],
            output: keys::IMPROVED_CODE,
            template: prompts::CODE_IMPROVEMENT,
        },
        Stage {
            id: StageId::TestCases,
            inputs: &[keys::BUSINESS_REQUIREMENT, keys::IMPROVED_CODE],
            output: keys::TEST_CASES,
            template: prompts::TEST_CASE_GENERATION,
        },
        Stage {
            id: StageId::UnitTests,
            inputs: &[
                keys::BUSINESS_REQUIREMENT,
                keys::IMPROVED_CODE,
                keys::TEST_CASES,
            ],
            output: keys::UNIT_TESTS,
            template: prompts::UNIT_TEST_GENERATION,
        },
    ])
});

/// The canonical registry, shared read-only by every pipeline run.
#[must_use]
pub fn registry() -> &'static StageRegistry {
    &REGISTRY
}
