//! psebench: Perspective Shift Effect benchmark
//!
//! Compares a base model and a shift model over a fixed prompt set,
//! scoring their outputs against each other and against optional
//! ground-truth references with BLEU-4 and ROUGE-L, then writing a CSV
//! report, a markdown table, and a console summary.
//!
//! The whole run is one sequential pipeline:
//! load prompts -> generate (base, then shift) -> score -> report.
//! Every error is fatal; nothing is retried or recovered.

pub mod error;
pub mod config;
pub mod prompts;
pub mod client;
pub mod metrics;
pub mod evaluate;
pub mod report;

pub use client::{ChatClient, GenerationOutcome};
pub use config::RunConfig;
pub use error::Error;
pub use evaluate::{EvaluationRecord, Generator, ReferenceScores, evaluate};
pub use metrics::{bleu_score, rouge_l_score};
pub use prompts::{Prompt, Reference, load_prompts};
pub use report::{LIFT_THRESHOLD, summarize};
