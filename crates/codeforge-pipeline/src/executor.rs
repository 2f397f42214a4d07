//! Pipeline executor
//!
//! Drives stage execution against a run-scoped variable store: renders the
//! stage prompt from the live store, invokes the backend, and binds the
//! completion under the stage's output key. The store is the single source
//! of truth: no prompt or result is ever cached outside it, which is what
//! makes interactive edits take effect on the next invocation.

use tracing::{debug, info};

use crate::error::PipelineError;
use crate::stage::{Stage, StageId, StageRegistry, keys};
use crate::store::VariableStore;
use crate::template;
use codeforge_llm::{CompletionRequest, LlmBackend, SamplingConfig};

/// Execution state of a pipeline run.
///
/// Transitions: `NotStarted → Running(k)`; on success `Running(k) →
/// StageComplete(k)`; the next planned stage moves the machine back to
/// `Running`; completing stage 5 reaches `Complete`. Any failure during
/// `Running(k)` reaches `Failed`. `Complete` and `Failed` are terminal for
/// the invocation; a later invocation on the same store starts a fresh
/// traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running(StageId),
    StageComplete(StageId),
    Complete,
    Failed,
}

/// Terminal status reported for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// All five outputs are bound and the last invocation succeeded.
    Complete,
    /// Some stages ran; the pipeline has not produced all five outputs.
    Partial,
    /// The last invocation failed.
    Failed,
}

/// One execution context: a variable store plus the record of what ran.
///
/// The run exclusively owns its store. Hosts serving several users must give
/// each one an independent run; the registry alone is shared.
#[derive(Debug)]
pub struct PipelineRun {
    store: VariableStore,
    executed: Vec<StageId>,
    state: RunState,
}

impl PipelineRun {
    /// Create a run for a requirement, binding `business_requirement`.
    #[must_use]
    pub fn new(requirement: impl Into<String>) -> Self {
        let mut store = VariableStore::new();
        store.set(keys::BUSINESS_REQUIREMENT, requirement);
        Self::with_store(store)
    }

    /// Create a run over an existing store (pre-bound artifacts included).
    #[must_use]
    pub fn with_store(store: VariableStore) -> Self {
        Self {
            store,
            executed: Vec::new(),
            state: RunState::NotStarted,
        }
    }

    /// Read access to the store.
    #[must_use]
    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    /// Write access to the store, for pre-binding artifacts and user edits.
    pub fn store_mut(&mut self) -> &mut VariableStore {
        &mut self.store
    }

    /// Stages executed so far, in execution order, across invocations.
    #[must_use]
    pub fn executed(&self) -> &[StageId] {
        &self.executed
    }

    /// Current state of the execution machine.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Collapse the machine state into the reported status.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        match self.state {
            RunState::Failed => RunStatus::Failed,
            RunState::Complete => RunStatus::Complete,
            _ => RunStatus::Partial,
        }
    }
}

/// Compute the execution plan for a selective run.
///
/// Requested targets always run: that is how re-invoking a stage after an
/// upstream edit produces a fresh artifact. Backfill is demand-driven:
/// walking the registry from the last stage backwards, a non-target stage is
/// required iff its output key is unbound and its output feeds a stage
/// already marked required. A dependency whose output is already bound
/// (supplied externally or produced earlier) is never re-run. The returned
/// plan is in ascending execution order.
///
/// Pure function; no backend is consulted.
#[must_use]
pub fn plan_selected(
    registry: &StageRegistry,
    store: &VariableStore,
    targets: &[StageId],
) -> Vec<StageId> {
    let mut required = [false; 5];

    let stages: Vec<&Stage> = registry.in_order().collect();
    for stage in stages.iter().rev() {
        let targeted = targets.contains(&stage.id);
        let feeds_required = !store.has(stage.output)
            && stages.iter().filter(|later| later.id > stage.id).any(|later| {
                required[(later.id.ordinal() - 1) as usize] && later.inputs.contains(&stage.output)
            });

        if targeted || feeds_required {
            required[(stage.id.ordinal() - 1) as usize] = true;
        }
    }

    StageId::ALL
        .into_iter()
        .filter(|id| required[(id.ordinal() - 1) as usize])
        .collect()
}

/// Drives stage execution for one run at a time.
///
/// Stage execution is strictly sequential: stage *k+1*'s input is stage
/// *k*'s output, so there is nothing to parallelise. The only suspension
/// point is awaiting the backend response.
pub struct PipelineExecutor<'r> {
    registry: &'r StageRegistry,
    backend: Box<dyn LlmBackend>,
    sampling: SamplingConfig,
}

impl<'r> PipelineExecutor<'r> {
    /// Create an executor over a registry and a backend.
    #[must_use]
    pub fn new(
        registry: &'r StageRegistry,
        backend: Box<dyn LlmBackend>,
        sampling: SamplingConfig,
    ) -> Self {
        Self {
            registry,
            backend,
            sampling,
        }
    }

    /// Full run: stages 1..5 in order, re-executing bound stages, with one
    /// exception: stage 1 is skipped when `generated_code` is already bound
    /// (the caller supplied existing code). That is the only built-in skip.
    ///
    /// # Errors
    ///
    /// Propagates the first stage failure; earlier outputs stay bound.
    pub async fn run_full(&self, run: &mut PipelineRun) -> Result<(), PipelineError> {
        let plan: Vec<StageId> = StageId::ALL
            .into_iter()
            .filter(|id| {
                !(*id == StageId::Generate && run.store.has(keys::GENERATED_CODE))
            })
            .collect();
        self.execute_plan(run, &plan).await
    }

    /// Selective run: guarantee output for `targets`, backfilling unsatisfied
    /// upstream stages per [`plan_selected`].
    ///
    /// # Errors
    ///
    /// Propagates the first stage failure; earlier outputs stay bound.
    pub async fn run_selected(
        &self,
        run: &mut PipelineRun,
        targets: &[StageId],
    ) -> Result<(), PipelineError> {
        let plan = plan_selected(self.registry, &run.store, targets);
        self.execute_plan(run, &plan).await
    }

    async fn execute_plan(
        &self,
        run: &mut PipelineRun,
        plan: &[StageId],
    ) -> Result<(), PipelineError> {
        for &id in plan {
            run.state = RunState::Running(id);
            let stage = self.registry.get(id);

            match self.run_stage(stage, &mut run.store).await {
                Ok(()) => {
                    run.executed.push(id);
                    run.state = RunState::StageComplete(id);
                }
                Err(err) => {
                    run.state = RunState::Failed;
                    return Err(err);
                }
            }
        }

        if run.state == RunState::StageComplete(StageId::UnitTests) {
            run.state = RunState::Complete;
        }
        Ok(())
    }

    /// The stage-run primitive: render, invoke, bind.
    async fn run_stage(
        &self,
        stage: &Stage,
        store: &mut VariableStore,
    ) -> Result<(), PipelineError> {
        let prompt = template::render(stage.template, store).map_err(|source| {
            PipelineError::Template {
                stage: stage.id,
                source,
            }
        })?;

        info!(stage = %stage.id, "invoking backend");

        let request = CompletionRequest {
            stage: stage.id.as_str().to_string(),
            prompt,
            sampling: self.sampling.clone(),
        };

        let response = self
            .backend
            .complete(request)
            .await
            .map_err(|source| PipelineError::Backend {
                stage: stage.id,
                source,
            })?;

        debug!(
            stage = %stage.id,
            model = %response.model_used,
            tokens_input = ?response.tokens_input,
            tokens_output = ?response.tokens_output,
            "stage output bound"
        );

        store.set(stage.output, response.text);
        Ok(())
    }
}

/// Interactive session: a store that persists across executor invocations.
///
/// Each [`invoke`](Self::invoke) behaves as a selective run against the
/// accumulated store. Edits written through [`edit`](Self::edit) land in the
/// store before the next invocation renders anything, so downstream stages
/// always see the edited value.
pub struct Session<'r> {
    executor: PipelineExecutor<'r>,
    run: PipelineRun,
}

impl<'r> Session<'r> {
    /// Start a session for a requirement.
    #[must_use]
    pub fn new(executor: PipelineExecutor<'r>, requirement: impl Into<String>) -> Self {
        Self {
            executor,
            run: PipelineRun::new(requirement),
        }
    }

    /// Run a selective invocation against the accumulated store.
    ///
    /// # Errors
    ///
    /// Propagates the first stage failure of this invocation; artifacts
    /// produced earlier in the session remain bound.
    pub async fn invoke(&mut self, targets: &[StageId]) -> Result<(), PipelineError> {
        self.executor.run_selected(&mut self.run, targets).await
    }

    /// Run a full invocation (stage 1 skipped when code is pre-bound).
    ///
    /// # Errors
    ///
    /// Propagates the first stage failure of this invocation.
    pub async fn invoke_all(&mut self) -> Result<(), PipelineError> {
        self.executor.run_full(&mut self.run).await
    }

    /// Overwrite an artifact; the next invocation uses the edited value.
    pub fn edit(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.run.store_mut().set(key, value);
    }

    /// The current value of an artifact, if produced.
    #[must_use]
    pub fn artifact(&self, key: &str) -> Option<&str> {
        self.run.store().get(key)
    }

    /// The underlying run, for status and store inspection.
    #[must_use]
    pub fn run(&self) -> &PipelineRun {
        &self.run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;
    use codeforge_llm::{FailingBackend, FailureKind, StubBackend};

    fn test_registry() -> StageRegistry {
        StageRegistry::new([
            Stage {
                id: StageId::Generate,
                inputs: &[keys::BUSINESS_REQUIREMENT],
                output: keys::GENERATED_CODE,
                template: "generate for: {business_requirement}",
            },
            Stage {
                id: StageId::Review,
                inputs: &[keys::BUSINESS_REQUIREMENT, keys::GENERATED_CODE],
                output: keys::CODE_REVIEW,
                template: "review: {generated_code} ({business_requirement})",
            },
            Stage {
                id: StageId::Improve,
                inputs: &[
                    keys::BUSINESS_REQUIREMENT,
                    keys::GENERATED_CODE,
                    keys::CODE_REVIEW,
                ],
                output: keys::IMPROVED_CODE,
                template: "improve: {generated_code} per {code_review} ({business_requirement})",
            },
            Stage {
                id: StageId::TestCases,
                inputs: &[keys::BUSINESS_REQUIREMENT, keys::IMPROVED_CODE],
                output: keys::TEST_CASES,
                template: "cases for: {improved_code} ({business_requirement})",
            },
            Stage {
                id: StageId::UnitTests,
                inputs: &[
                    keys::BUSINESS_REQUIREMENT,
                    keys::IMPROVED_CODE,
                    keys::TEST_CASES,
                ],
                output: keys::UNIT_TESTS,
                template: "tests for: {improved_code} with {test_cases} ({business_requirement})",
            },
        ])
    }

    fn sampling() -> SamplingConfig {
        SamplingConfig::new("stub-model", 0.0)
    }

    #[test]
    fn plan_backfills_everything_for_an_empty_store() {
        let registry = test_registry();
        let store = VariableStore::new();
        let plan = plan_selected(&registry, &store, &[StageId::UnitTests]);
        assert_eq!(plan, StageId::ALL);
    }

    #[test]
    fn plan_is_minimal_when_inputs_are_pre_bound() {
        let registry = test_registry();
        let mut store = VariableStore::new();
        store.set(keys::IMPROVED_CODE, "code");
        store.set(keys::TEST_CASES, "cases");

        let plan = plan_selected(&registry, &store, &[StageId::UnitTests]);
        assert_eq!(plan, vec![StageId::UnitTests]);
    }

    #[test]
    fn plan_fills_gaps_between_satisfied_stages() {
        let registry = test_registry();
        let mut store = VariableStore::new();
        store.set(keys::GENERATED_CODE, "supplied code");

        let plan = plan_selected(&registry, &store, &[StageId::UnitTests]);
        assert_eq!(
            plan,
            vec![
                StageId::Review,
                StageId::Improve,
                StageId::TestCases,
                StageId::UnitTests
            ]
        );
    }

    #[test]
    fn plan_reruns_an_explicitly_requested_stage() {
        let registry = test_registry();
        let mut store = VariableStore::new();
        store.set(keys::GENERATED_CODE, "supplied code");
        store.set(keys::CODE_REVIEW, "existing review");

        // Review's output is bound, but the caller asked for it again.
        let plan = plan_selected(&registry, &store, &[StageId::Review]);
        assert_eq!(plan, vec![StageId::Review]);
    }

    #[test]
    fn plan_never_reruns_satisfied_dependencies() {
        let registry = test_registry();
        let mut store = VariableStore::new();
        store.set(keys::IMPROVED_CODE, "code");
        store.set(keys::TEST_CASES, "cases");
        store.set(keys::UNIT_TESTS, "stale tests");

        // Re-requesting unit_tests re-runs it alone; bound inputs are reused.
        let plan = plan_selected(&registry, &store, &[StageId::UnitTests]);
        assert_eq!(plan, vec![StageId::UnitTests]);
    }

    #[test]
    fn plan_ignores_stages_downstream_targets_do_not_need() {
        let registry = test_registry();
        let mut store = VariableStore::new();
        store.set(keys::GENERATED_CODE, "supplied code");

        // Review needs only the requirement and the generated code.
        let plan = plan_selected(&registry, &store, &[StageId::Review]);
        assert_eq!(plan, vec![StageId::Review]);
    }

    #[tokio::test]
    async fn full_run_completes_and_binds_in_stage_order() {
        let registry = test_registry();
        let stub = StubBackend::new();
        let executor = PipelineExecutor::new(&registry, Box::new(stub.clone()), sampling());
        let mut run = PipelineRun::new("add two integers");

        executor.run_full(&mut run).await.unwrap();

        assert_eq!(run.executed(), &StageId::ALL);
        assert_eq!(run.state(), RunState::Complete);
        assert_eq!(run.status(), RunStatus::Complete);
        for id in StageId::ALL {
            let value = run.store().get(id.output_key()).unwrap();
            assert!(value.starts_with(id.as_str()));
        }
    }

    #[tokio::test]
    async fn full_run_skips_generate_when_code_is_pre_bound() {
        let registry = test_registry();
        let stub = StubBackend::new();
        let executor = PipelineExecutor::new(&registry, Box::new(stub.clone()), sampling());
        let mut run = PipelineRun::new("add two integers");
        run.store_mut().set(keys::GENERATED_CODE, "def add(a, b): return a + b");

        executor.run_full(&mut run).await.unwrap();

        assert_eq!(
            run.executed(),
            &[
                StageId::Review,
                StageId::Improve,
                StageId::TestCases,
                StageId::UnitTests
            ]
        );
        // The pre-supplied code is reused untouched.
        assert_eq!(
            run.store().get(keys::GENERATED_CODE),
            Some("def add(a, b): return a + b")
        );
    }

    #[tokio::test]
    async fn failure_leaves_earlier_outputs_bound_and_later_unbound() {
        let registry = test_registry();
        let backend = FailingBackend::new("improve", FailureKind::Unavailable);
        let executor = PipelineExecutor::new(&registry, Box::new(backend), sampling());
        let mut run = PipelineRun::new("add two integers");

        let err = executor.run_full(&mut run).await.unwrap_err();

        assert_eq!(err.stage(), StageId::Improve);
        assert_eq!(run.state(), RunState::Failed);
        assert_eq!(run.status(), RunStatus::Failed);
        assert_eq!(run.executed(), &[StageId::Generate, StageId::Review]);
        assert!(run.store().has(keys::GENERATED_CODE));
        assert!(run.store().has(keys::CODE_REVIEW));
        assert!(!run.store().has(keys::IMPROVED_CODE));
        assert!(!run.store().has(keys::TEST_CASES));
        assert!(!run.store().has(keys::UNIT_TESTS));
    }

    #[tokio::test]
    async fn selective_run_with_missing_requirement_reports_the_variable() {
        let registry = test_registry();
        let stub = StubBackend::new();
        let executor = PipelineExecutor::new(&registry, Box::new(stub), sampling());
        let mut run = PipelineRun::with_store(VariableStore::new());

        let err = executor
            .run_selected(&mut run, &[StageId::Generate])
            .await
            .unwrap_err();

        assert_eq!(err.stage(), StageId::Generate);
        assert!(err.to_string().contains(keys::BUSINESS_REQUIREMENT));
        assert_eq!(run.status(), RunStatus::Failed);
    }

    #[tokio::test]
    async fn session_accumulates_across_invocations() {
        let registry = test_registry();
        let stub = StubBackend::new();
        let executor = PipelineExecutor::new(&registry, Box::new(stub.clone()), sampling());
        let mut session = Session::new(executor, "add two integers");

        session.invoke(&[StageId::Review]).await.unwrap();
        assert_eq!(session.run().executed(), &[StageId::Generate, StageId::Review]);

        session.invoke(&[StageId::UnitTests]).await.unwrap();
        assert_eq!(
            session.run().executed(),
            &[
                StageId::Generate,
                StageId::Review,
                StageId::Improve,
                StageId::TestCases,
                StageId::UnitTests
            ]
        );
    }

    #[tokio::test]
    async fn session_edit_feeds_the_next_invocation() {
        let registry = test_registry();
        let stub = StubBackend::new();
        let executor = PipelineExecutor::new(&registry, Box::new(stub.clone()), sampling());
        let mut session = Session::new(executor, "add two integers");

        session.invoke_all().await.unwrap();
        let original = session.artifact(keys::TEST_CASES).unwrap().to_string();

        session.edit(keys::TEST_CASES, "edited: only test zero inputs");
        session.invoke(&[StageId::UnitTests]).await.unwrap();

        let prompt = stub.last_prompt_for("unit_tests").unwrap();
        assert!(prompt.contains("edited: only test zero inputs"));
        assert!(!prompt.contains(&original));
    }
}
