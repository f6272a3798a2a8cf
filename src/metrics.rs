//! Text-similarity scoring
//!
//! Two pure functions over (candidate, reference). Neither metric is
//! mathematically symmetric; call sites must keep the argument roles
//! straight.

use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashMap;
use log::trace;

const MAX_NGRAM_ORDER: usize = 4;

/// Numerator substituted for zero-match n-gram counts so short texts
/// never collapse to an exact zero
const SMOOTHING_EPSILON: f64 = 0.1;

/// Tokens longer than this are stemmed before ROUGE-L matching
const STEM_MIN_LEN: usize = 3;

// ===== BLEU =====

/// Smoothed BLEU-4 precision score in [0, 1]
///
/// Whitespace tokens, clipped n-gram precision up to order 4 (capped at
/// the candidate length so self-comparison of short texts still scores
/// 1.0), uniform weights, and a brevity penalty when the candidate is
/// shorter than the reference.
pub fn bleu_score(candidate: &str, reference: &str) -> f64
{   let cand: Vec<&str>
      = candidate.split_whitespace().collect();
    let refr: Vec<&str>
      = reference.split_whitespace().collect();

    if cand.is_empty() || refr.is_empty()
    {   return 0.0;
    }

    let max_order = MAX_NGRAM_ORDER.min(cand.len());
    let mut log_sum = 0.0;
    for order in 1..=max_order
    {   let (matched, total)
          = clipped_ngram_matches(&cand, &refr, order);
        let denominator = total.max(1) as f64;
        let precision = if matched == 0
        {   SMOOTHING_EPSILON / denominator
        } else
        {   matched as f64 / denominator
        };
        log_sum += precision.ln() / max_order as f64;
    }

    let brevity = if cand.len() > refr.len()
    {   1.0
    } else
    {   (1.0 - refr.len() as f64 / cand.len() as f64).exp()
    };

    let score = brevity * log_sum.exp();
    trace!("bleu_score = {:.4}", score);
    score.clamp(0.0, 1.0)
}

/// Clipped n-gram matches: each candidate n-gram counts at most as
/// often as it occurs in the reference
fn clipped_ngram_matches(
  candidate: &[&str]
, reference: &[&str]
, order: usize
) -> (usize, usize)
{   if candidate.len() < order
    {   return (0, 0);
    }

    let mut reference_counts: HashMap<&[&str], usize>
      = HashMap::new();
    for gram in reference.windows(order)
    {   *reference_counts.entry(gram).or_insert(0) += 1;
    }

    let mut candidate_counts: HashMap<&[&str], usize>
      = HashMap::new();
    for gram in candidate.windows(order)
    {   *candidate_counts.entry(gram).or_insert(0) += 1;
    }

    let total = candidate.len() - order + 1;
    let matched = candidate_counts
      .iter()
      .map(|(gram, count)| {
        (*count).min(
          reference_counts.get(gram).copied().unwrap_or(0)
        )
      })
      .sum();

    (matched, total)
}

// ===== ROUGE-L =====

/// ROUGE-L F-measure in [0, 1]
///
/// Lowercased alphanumeric tokens, stemmed, scored as the F-measure of
/// the longest common subsequence between candidate and reference.
pub fn rouge_l_score(candidate: &str, reference: &str) -> f64
{   let cand = rouge_tokens(candidate);
    let refr = rouge_tokens(reference);

    if cand.is_empty() || refr.is_empty()
    {   return 0.0;
    }

    let lcs = lcs_length(&cand, &refr);
    if lcs == 0
    {   return 0.0;
    }

    let precision = lcs as f64 / cand.len() as f64;
    let recall = lcs as f64 / refr.len() as f64;
    let score = 2.0 * precision * recall / (precision + recall);
    trace!("rouge_l_score = {:.4}", score);
    score.clamp(0.0, 1.0)
}

/// Lowercase, keep ascii alphanumeric runs, stem the longer tokens
fn rouge_tokens(text: &str) -> Vec<String>
{   let stemmer = Stemmer::create(Algorithm::English);
    let lowered = text.to_lowercase();
    lowered
      .split(|c: char| !c.is_ascii_alphanumeric())
      .filter(|run| !run.is_empty())
      .map(|run| {
        if run.len() > STEM_MIN_LEN
        {   stemmer.stem(run).to_string()
        } else
        {   run.to_string()
        }
      })
      .collect()
}

/// Longest common subsequence length, two-row dynamic programming
fn lcs_length(a: &[String], b: &[String]) -> usize
{   let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for token_a in a
    {   for (j, token_b) in b.iter().enumerate()
        {   curr[j + 1] = if token_a == token_b
            {   prev[j] + 1
            } else
            {   curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
        curr.fill(0);
    }

    prev[b.len()]
}
