//! Evaluation driver: one record per prompt, strictly in input order

use std::time::Duration;
use log::{debug, info};

use crate::client::GenerationOutcome;
use crate::config::RunConfig;
use crate::metrics::{bleu_score, rouge_l_score};
use crate::prompts::Prompt;

/// Generation backend seam; the live client implements this, and tests
/// substitute stubs
#[allow(async_fn_in_trait)]
pub trait Generator
{   async fn generate(
      &self
    , model: &str
    , prompt: &str
    , max_tokens: u32
    , temperature: f64
    ) -> Result<GenerationOutcome, crate::error::Error>;
}

impl Generator for crate::client::ChatClient
{   async fn generate(
      &self
    , model: &str
    , prompt: &str
    , max_tokens: u32
    , temperature: f64
    ) -> Result<GenerationOutcome, crate::error::Error>
    {   crate::client::ChatClient::generate(
          self, model, prompt, max_tokens, temperature
        ).await
    }
}

/// Scores against the ground-truth reference
/// Present iff the source prompt carried a reference
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceScores
{   pub bleu_base: f64
  , pub bleu_shift: f64
  , pub rouge_base: f64
  , pub rouge_shift: f64
}

/// Everything measured for one prompt; never mutated after creation
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRecord
{   pub prompt: String
  , pub base_text: String
  , pub shift_text: String
  , pub base_latency: Duration
  , pub shift_latency: Duration
  , pub base_tokens: u64
  , pub shift_tokens: u64
  , pub bleu_base_shift: f64
  , pub rouge_base_shift: f64
  , pub reference_scores: Option<ReferenceScores>
}

/// Run the benchmark over every prompt, sequentially
///
/// The base-model call is fully awaited before the shift-model call
/// starts. Any generation failure aborts the whole run.
pub async fn evaluate(
  generator: &impl Generator
, prompts: &[Prompt]
, config: &RunConfig
) -> Result<Vec<EvaluationRecord>, crate::error::Error>
{   info!(
      "Evaluating {} prompts: {} vs {}",
      prompts.len(),
      config.base_model,
      config.shift_model
    );

    let mut records = Vec::with_capacity(prompts.len());
    for (index, prompt) in prompts.iter().enumerate()
    {   debug!("Prompt {}: {}", index, prompt.text);

        let base = generator
          .generate(
            &config.base_model
          , &prompt.text
          , config.max_tokens
          , config.temperature
          )
          .await?;

        let shift = generator
          .generate(
            &config.shift_model
          , &prompt.text
          , config.max_tokens
          , config.temperature
          )
          .await?;

        // Pairwise agreement: shift output scored against base output
        let bleu_base_shift = bleu_score(&shift.text, &base.text);
        let rouge_base_shift = rouge_l_score(&shift.text, &base.text);

        let reference_scores = prompt.reference
          .as_text()
          .map(|reference| ReferenceScores
          {   bleu_base: bleu_score(&base.text, reference)
            , bleu_shift: bleu_score(&shift.text, reference)
            , rouge_base: rouge_l_score(&base.text, reference)
            , rouge_shift: rouge_l_score(&shift.text, reference)
          });

        records.push(EvaluationRecord
        {   prompt: prompt.text.clone()
          , base_text: base.text
          , shift_text: shift.text
          , base_latency: base.latency
          , shift_latency: shift.latency
          , base_tokens: base.token_count
          , shift_tokens: shift.token_count
          , bleu_base_shift
          , rouge_base_shift
          , reference_scores
        });
    }

    info!("Evaluation complete: {} records", records.len());
    Ok(records)
}
