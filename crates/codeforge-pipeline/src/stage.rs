//! The fixed five-stage model
//!
//! Stages are a statically known, enumerable set interpreted by a single
//! executor; there is no dynamic stage registration and no per-stage
//! dispatch object.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Variable names used by the standard registry.
pub mod keys {
    /// The free-form requirement text supplied by the caller.
    pub const BUSINESS_REQUIREMENT: &str = "business_requirement";
    /// Output of stage 1.
    pub const GENERATED_CODE: &str = "generated_code";
    /// Output of stage 2.
    pub const CODE_REVIEW: &str = "code_review";
    /// Output of stage 3.
    pub const IMPROVED_CODE: &str = "improved_code";
    /// Output of stage 4.
    pub const TEST_CASES: &str = "test_cases";
    /// Output of stage 5.
    pub const UNIT_TESTS: &str = "unit_tests";
}

/// Stage identifiers for the code-generation pipeline.
///
/// The pipeline progresses through stages in this order:
///
/// ```text
/// generate → review → improve → test_cases → unit_tests
/// ```
///
/// Each stage consumes the requirement plus outputs of earlier stages and
/// produces exactly one output variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    /// Generate code from the business requirement.
    Generate,
    /// Review the generated code.
    Review,
    /// Improve the code according to the review.
    Improve,
    /// Describe test cases for the improved code.
    TestCases,
    /// Generate unit-test code from the test cases.
    UnitTests,
}

impl StageId {
    /// Every stage, in execution order.
    pub const ALL: [Self; 5] = [
        Self::Generate,
        Self::Review,
        Self::Improve,
        Self::TestCases,
        Self::UnitTests,
    ];

    /// One-based position in the pipeline.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Generate => 1,
            Self::Review => 2,
            Self::Improve => 3,
            Self::TestCases => 4,
            Self::UnitTests => 5,
        }
    }

    /// Canonical lowercase name used in logs, CLI output, and stubs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Review => "review",
            Self::Improve => "improve",
            Self::TestCases => "test_cases",
            Self::UnitTests => "unit_tests",
        }
    }

    /// The variable name this stage binds on success.
    #[must_use]
    pub const fn output_key(self) -> &'static str {
        match self {
            Self::Generate => keys::GENERATED_CODE,
            Self::Review => keys::CODE_REVIEW,
            Self::Improve => keys::IMPROVED_CODE,
            Self::TestCases => keys::TEST_CASES,
            Self::UnitTests => keys::UNIT_TESTS,
        }
    }

    /// Look a stage up by its one-based ordinal.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownStageError`] for ordinals outside 1..=5.
    pub fn from_ordinal(ordinal: u8) -> Result<Self, UnknownStageError> {
        match ordinal {
            1 => Ok(Self::Generate),
            2 => Ok(Self::Review),
            3 => Ok(Self::Improve),
            4 => Ok(Self::TestCases),
            5 => Ok(Self::UnitTests),
            other => Err(UnknownStageError(other.to_string())),
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageId {
    type Err = UnknownStageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generate" => Ok(Self::Generate),
            "review" => Ok(Self::Review),
            "improve" => Ok(Self::Improve),
            "test_cases" | "test-cases" => Ok(Self::TestCases),
            "unit_tests" | "unit-tests" => Ok(Self::UnitTests),
            other => Err(UnknownStageError(other.to_string())),
        }
    }
}

/// An invalid stage name or ordinal was requested. Programming error;
/// callers are expected to fail fast.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown stage '{0}'")]
pub struct UnknownStageError(pub String);

/// Immutable definition of one pipeline stage.
///
/// Invariant: `inputs` is a subset of `business_requirement` plus the outputs
/// of strictly earlier stages, and every slot in `template` names one of
/// `inputs`. The standard registry asserts both in its tests.
#[derive(Debug, Clone, Copy)]
pub struct Stage {
    /// Which stage this is.
    pub id: StageId,
    /// Variable names that must be bound before this stage can render.
    pub inputs: &'static [&'static str],
    /// Variable name bound with the backend completion on success.
    pub output: &'static str,
    /// Prompt template with `{name}` substitution slots.
    pub template: &'static str,
}

/// The fixed, ordered set of the five pipeline stages.
///
/// Process-wide and immutable; one instance is shared read-only by every
/// pipeline run.
#[derive(Debug)]
pub struct StageRegistry {
    stages: [Stage; 5],
}

impl StageRegistry {
    /// Build a registry from the five stage definitions.
    ///
    /// # Panics
    ///
    /// Panics if the definitions are not supplied in ordinal order; registry
    /// construction happens once at start-up and a mis-ordered registry is a
    /// programming error.
    #[must_use]
    pub fn new(stages: [Stage; 5]) -> Self {
        for (position, stage) in stages.iter().enumerate() {
            assert_eq!(
                stage.id,
                StageId::ALL[position],
                "stage definitions must be supplied in ordinal order"
            );
        }
        Self { stages }
    }

    /// The definition of one stage.
    #[must_use]
    pub fn get(&self, id: StageId) -> &Stage {
        &self.stages[(id.ordinal() - 1) as usize]
    }

    /// All five stages in execution order. Restartable; always 5 elements.
    pub fn in_order(&self) -> impl DoubleEndedIterator<Item = &Stage> {
        self.stages.iter()
    }
}
