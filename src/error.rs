use std::fmt;

/// Custom error type for benchmark operations
/// Every failure is fatal; nothing here is retried
#[derive(Debug, Clone, PartialEq)]
pub enum Error
{   /// API key is missing for the generation service
    MissingApiKey(String)
  , /// HTTP request error
    HttpError(String)
  , /// API returned an error response
    ApiError(String)
  , /// Failed to parse API response
    ParseError(String)
  , /// No choices in API response
    NoChoicesInResponse
  , /// Prompt file missing, malformed, or incomplete
    PromptFile(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Failed to write a report file
    ReportWrite(String)
  , /// Generic error
    Other(String)
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::MissingApiKey(service) => {
              write!(f, "Missing API key for: {}", service)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError(msg) => {
              write!(f, "API error: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::NoChoicesInResponse => {
              write!(f, "API response contained no choices")
            }
          , Error::PromptFile(msg) => {
              write!(f, "Prompt file error: {}", msg)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::ReportWrite(msg) => {
              write!(f, "Report write error: {}", msg)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}
