//! Report output: CSV, markdown sibling, and a console summary

use colored::Colorize;
use std::path::Path;
use log::{debug, info};

use crate::evaluate::EvaluationRecord;

/// Shift-over-base mean-BLEU ratio counted as a success
/// Kept verbatim from the benchmark definition
pub const LIFT_THRESHOLD: f64 = 1.5;

/// Column set of the row-oriented output, in record field order
const COLUMNS: [&str; 13] = [
  "prompt"
, "base_text"
, "shift_text"
, "base_latency"
, "shift_latency"
, "base_tokens"
, "shift_tokens"
, "bleu_base_shift"
, "rouge_base_shift"
, "bleu_ref_base"
, "bleu_ref_shift"
, "rouge_ref_base"
, "rouge_ref_shift"
];

/// Mean reference scores over the records that carry them
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceMeans
{   pub bleu_base: f64
  , pub bleu_shift: f64
  , pub rouge_base: f64
  , pub rouge_shift: f64
}

/// Average the reference-dependent scores; None when no record has any
pub fn reference_means(
  records: &[EvaluationRecord]
) -> Option<ReferenceMeans>
{   let scored: Vec<_> = records
      .iter()
      .filter_map(|r| r.reference_scores.as_ref())
      .collect();

    if scored.is_empty()
    {   return None;
    }

    let count = scored.len() as f64;
    Some(ReferenceMeans
    {   bleu_base: scored.iter().map(|s| s.bleu_base).sum::<f64>() / count
      , bleu_shift: scored.iter().map(|s| s.bleu_shift).sum::<f64>() / count
      , rouge_base: scored.iter().map(|s| s.rouge_base).sum::<f64>() / count
      , rouge_shift: scored.iter().map(|s| s.rouge_shift).sum::<f64>() / count
    })
}

/// Whether the shift model cleared the lift threshold on mean BLEU
pub fn lift_achieved(means: &ReferenceMeans) -> bool
{   means.bleu_shift >= LIFT_THRESHOLD * means.bleu_base
}

/// Write the CSV report, its markdown sibling, and the console summary
pub fn summarize(
  records: &[EvaluationRecord]
, output_path: &Path
) -> Result<(), crate::error::Error>
{   debug!(
      "Writing report for {} records to {}",
      records.len(),
      output_path.display()
    );

    write_csv(records, output_path)?;

    let markdown_path = output_path.with_extension("md");
    write_markdown(records, &markdown_path)?;

    print_summary(records);

    info!(
      "Report written to {} and {}",
      output_path.display(),
      markdown_path.display()
    );
    Ok(())
}

fn record_fields(record: &EvaluationRecord) -> Vec<String>
{   let optional = |score: Option<f64>| {
      score.map(|s| s.to_string()).unwrap_or_default()
    };
    let scores = record.reference_scores.as_ref();
    vec![
      record.prompt.clone()
    , record.base_text.clone()
    , record.shift_text.clone()
    , record.base_latency.as_secs_f64().to_string()
    , record.shift_latency.as_secs_f64().to_string()
    , record.base_tokens.to_string()
    , record.shift_tokens.to_string()
    , record.bleu_base_shift.to_string()
    , record.rouge_base_shift.to_string()
    , optional(scores.map(|s| s.bleu_base))
    , optional(scores.map(|s| s.bleu_shift))
    , optional(scores.map(|s| s.rouge_base))
    , optional(scores.map(|s| s.rouge_shift))
    ]
}

fn write_csv(
  records: &[EvaluationRecord]
, path: &Path
) -> Result<(), crate::error::Error>
{   let mut writer = csv::Writer::from_path(path)
      .map_err(|e| {
        crate::error::Error::ReportWrite(
          format!("{}: {}", path.display(), e)
        )
      })?;

    writer.write_record(COLUMNS)
      .map_err(|e| {
        crate::error::Error::ReportWrite(e.to_string())
      })?;

    for record in records
    {   writer.write_record(record_fields(record))
          .map_err(|e| {
            crate::error::Error::ReportWrite(e.to_string())
          })?;
    }

    writer.flush()
      .map_err(|e| {
        crate::error::Error::ReportWrite(e.to_string())
      })
}

fn write_markdown(
  records: &[EvaluationRecord]
, path: &Path
) -> Result<(), crate::error::Error>
{   let escape = |field: String| field.replace('|', "\\|");

    let mut contents = String::new();
    contents.push_str(&format!("| {} |\n", COLUMNS.join(" | ")));
    contents.push_str(&format!(
      "|{}\n",
      " --- |".repeat(COLUMNS.len())
    ));
    for record in records
    {   let fields: Vec<String> = record_fields(record)
          .into_iter()
          .map(escape)
          .collect();
        contents.push_str(&format!("| {} |\n", fields.join(" | ")));
    }

    std::fs::write(path, contents)
      .map_err(|e| {
        crate::error::Error::ReportWrite(
          format!("{}: {}", path.display(), e)
        )
      })
}

fn print_summary(records: &[EvaluationRecord])
{   println!("\n{}", "Model Comparison".bold());
    println!(
      "{:<22} {:>10} {:>10} {:>10}",
      "Metric", "Base", "Shift", "Delta"
    );

    let means = match reference_means(records)
    {   Some(means) => means
      , None => {
          // Without references only the pairwise comparison exists
          debug!("No reference scores; skipping aggregate rows");
          return;
        }
    };

    print_metric_row(
      "Avg BLEU vs Ref"
    , means.bleu_base
    , means.bleu_shift
    );
    print_metric_row(
      "Avg ROUGE-L vs Ref"
    , means.rouge_base
    , means.rouge_shift
    );

    if lift_achieved(&means)
    {   println!("\n🚀 150 % lift achieved");
    } else
    {   println!("\nNeeds work 😊");
    }
}

fn print_metric_row(label: &str, base: f64, shift: f64)
{   let delta = shift - base;
    let delta_text = format!("{:>+10.3}", delta);
    let delta_colored = if delta > 0.0
    {   delta_text.green().bold()
    } else
    {   delta_text.red().bold()
    };
    println!(
      "{:<22} {:>10.3} {:>10.3} {}",
      label, base, shift, delta_colored
    );
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::evaluate::ReferenceScores;
    use std::time::Duration;

    fn record(
      prompt: &str
    , reference_scores: Option<ReferenceScores>
    ) -> EvaluationRecord
    {   EvaluationRecord
        {   prompt: prompt.to_string()
          , base_text: "base output".to_string()
          , shift_text: "shift output".to_string()
          , base_latency: Duration::from_millis(120)
          , shift_latency: Duration::from_millis(340)
          , base_tokens: 20
          , shift_tokens: 24
          , bleu_base_shift: 0.5
          , rouge_base_shift: 0.6
          , reference_scores
        }
    }

    fn scores(bleu_base: f64, bleu_shift: f64) -> ReferenceScores
    {   ReferenceScores
        {   bleu_base
          , bleu_shift
          , rouge_base: 0.4
          , rouge_shift: 0.5
        }
    }

    #[test]
    fn csv_has_header_plus_one_row_per_record()
    {   let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("results.csv");
        let records = vec![
          record("p1", Some(scores(0.2, 0.3)))
        , record("p2", None)
        , record("p3", Some(scores(0.4, 0.1)))
        ];

        summarize(&records, &out).unwrap();

        let contents = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), records.len() + 1);
        assert_eq!(lines[0].split(',').count(), COLUMNS.len());
        assert_eq!(lines[0], COLUMNS.join(","));
    }

    #[test]
    fn reference_cells_empty_when_absent()
    {   let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("results.csv");
        let records = vec![record("p1", None)];

        summarize(&records, &out).unwrap();

        let contents = std::fs::read_to_string(&out).unwrap();
        let row = contents.lines().nth(1).unwrap();
        assert!(row.ends_with(",,,,"));
    }

    #[test]
    fn markdown_sibling_written_next_to_csv()
    {   let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("results.csv");
        let records = vec![record("p1", Some(scores(0.2, 0.3)))];

        summarize(&records, &out).unwrap();

        let markdown = std::fs::read_to_string(
          dir.path().join("results.md")
        ).unwrap();
        // header + separator + one data row
        assert_eq!(markdown.lines().count(), 3);
        assert!(markdown.starts_with("| prompt |"));
    }

    #[test]
    fn means_use_only_records_with_references()
    {   let records = vec![
          record("p1", Some(scores(0.2, 0.4)))
        , record("p2", None)
        , record("p3", Some(scores(0.4, 0.2)))
        ];
        let means = reference_means(&records).unwrap();
        assert!((means.bleu_base - 0.3).abs() < 1e-9);
        assert!((means.bleu_shift - 0.3).abs() < 1e-9);
    }

    #[test]
    fn no_reference_records_yields_no_means()
    {   let records = vec![record("p1", None), record("p2", None)];
        assert!(reference_means(&records).is_none());
    }

    #[test]
    fn lift_threshold_boundary()
    {   let exactly = ReferenceMeans
        {   bleu_base: 0.2
          , bleu_shift: 0.3
          , rouge_base: 0.0
          , rouge_shift: 0.0
        };
        assert!(lift_achieved(&exactly));

        let below = ReferenceMeans
        {   bleu_base: 0.2
          , bleu_shift: 0.29
          , rouge_base: 0.0
          , rouge_shift: 0.0
        };
        assert!(!lift_achieved(&below));

        // Matching the base exactly is not a lift
        let equal = ReferenceMeans
        {   bleu_base: 1.0
          , bleu_shift: 1.0
          , rouge_base: 1.0
          , rouge_shift: 1.0
        };
        assert!(!lift_achieved(&equal));
    }
}
