//! Prompt file loading

use serde::Deserialize;
use std::path::Path;
use log::{debug, error};

/// Ground-truth attachment for a prompt
/// Modeled as a variant so callers cannot skip the branch
#[derive(Debug, Clone, PartialEq)]
pub enum Reference
{   WithReference(String)
  , WithoutReference
}

impl Reference
{   pub fn as_text(&self) -> Option<&str>
    {   match self
        {   Reference::WithReference(text) => Some(text)
          , Reference::WithoutReference => None
        }
    }
}

/// A single evaluation prompt, immutable once loaded
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt
{   pub text: String
  , pub reference: Reference
}

/// Raw shape of one YAML entry before validation
#[derive(Debug, Deserialize)]
struct RawPrompt
{   prompt: Option<String>
  , reference: Option<String>
}

/// Load prompts from a YAML list of mappings, preserving file order
pub fn load_prompts(path: &Path)
  -> Result<Vec<Prompt>, crate::error::Error>
{   debug!("Loading prompts from: {}", path.display());

    let contents = std::fs::read_to_string(path)
      .map_err(|e| {
        error!("Cannot read {}: {}", path.display(), e);
        crate::error::Error::PromptFile(
          format!("{}: {}", path.display(), e)
        )
      })?;

    let raw: Vec<RawPrompt> = serde_yaml::from_str(&contents)
      .map_err(|e| {
        error!("Malformed prompt file: {}", e);
        crate::error::Error::PromptFile(e.to_string())
      })?;

    let mut prompts = Vec::with_capacity(raw.len());
    for (index, entry) in raw.into_iter().enumerate()
    {   let text = entry.prompt.ok_or_else(|| {
          error!("Entry {} has no \"prompt\" key", index);
          crate::error::Error::PromptFile(
            format!("entry {} is missing the \"prompt\" key", index)
          )
        })?;

        let reference = match entry.reference
        {   Some(text) => Reference::WithReference(text)
          , None => Reference::WithoutReference
        };

        prompts.push(Prompt
        {   text
          , reference
        });
    }

    debug!("Loaded {} prompts", prompts.len());
    Ok(prompts)
}

#[cfg(test)]
mod tests
{   use super::*;
    use std::io::Write;

    fn write_yaml(contents: &str) -> tempfile::NamedTempFile
    {   let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn preserves_order_and_reference_absence()
    {   let file = write_yaml(
          "- prompt: First question\n\
           \x20 reference: First answer\n\
           - prompt: Second question\n\
           - prompt: Third question\n\
           \x20 reference: Third answer\n"
        );
        let prompts = load_prompts(file.path()).unwrap();
        assert_eq!(prompts.len(), 3);
        assert_eq!(prompts[0].text, "First question");
        assert_eq!(
          prompts[0].reference,
          Reference::WithReference("First answer".to_string())
        );
        assert_eq!(prompts[1].text, "Second question");
        assert_eq!(prompts[1].reference, Reference::WithoutReference);
        assert_eq!(prompts[2].text, "Third question");
        assert!(prompts[2].reference.as_text().is_some());
    }

    #[test]
    fn rejects_entry_without_prompt_key()
    {   let file = write_yaml(
          "- prompt: Fine\n\
           - reference: Orphan answer\n"
        );
        match load_prompts(file.path())
        {   Err(crate::error::Error::PromptFile(msg)) => {
              assert!(msg.contains("entry 1"));
            }
          , other => panic!("Expected prompt file error, got {:?}", other)
        }
    }

    #[test]
    fn rejects_malformed_yaml()
    {   let file = write_yaml("prompt: [unterminated\n");
        assert!(matches!(
          load_prompts(file.path()),
          Err(crate::error::Error::PromptFile(_))
        ));
    }

    #[test]
    fn rejects_missing_file()
    {   let result = load_prompts(Path::new("no/such/prompts.yml"));
        assert!(matches!(
          result,
          Err(crate::error::Error::PromptFile(_))
        ));
    }

    #[test]
    fn empty_list_loads_as_empty()
    {   let file = write_yaml("[]\n");
        let prompts = load_prompts(file.path()).unwrap();
        assert!(prompts.is_empty());
    }
}
