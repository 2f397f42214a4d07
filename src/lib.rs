//! codeforge - staged code generation from a business requirement
//!
//! codeforge drives a fixed five-stage pipeline against an LLM backend:
//! generate code for a requirement, review it, improve it, describe test
//! cases, and produce unit-test code. Each stage is a templated prompt whose
//! output feeds the next stage through a run-scoped variable store.
//!
//! codeforge can be used in two ways:
//! - **CLI**: run `codeforge -r "your requirement"` and collect the
//!   artifacts from the output directory
//! - **Library**: use the re-exported crates to embed the pipeline: build a
//!   [`pipeline::PipelineExecutor`] over [`stages::registry()`] and a
//!   [`llm::LlmBackend`] of your choosing
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! export SILICONFLOW_API_KEY=sk-...
//!
//! # Run every stage
//! codeforge -r "write a function that adds two integers"
//!
//! # Reuse existing code, only produce review and improvement
//! codeforge -r "add two integers" --code src/add.py --review --improve
//! ```
//!
//! # Crate Layout
//!
//! | Crate | Contents |
//! |-------|----------|
//! | `codeforge-pipeline` | Stage model, variable store, renderer, executor |
//! | `codeforge-stages` | The five prompt templates + canonical registry |
//! | `codeforge-llm` | Backend trait and the openai-compatible provider |
//! | `codeforge` (this) | CLI, configuration, artifact persistence |

pub mod artifacts;
pub mod cli;
pub mod config;

// Re-export the workspace crates for library consumers.
pub use codeforge_llm as llm;
pub use codeforge_pipeline as pipeline;
pub use codeforge_stages as stages;
