//! cl100k_base tokenizer implementation using tiktoken

use once_cell::sync::Lazy;
use tiktoken_rs::CoreBPE;

use super::Provider;
use crate::tokenizer::error::{TokenizerError, TokenizerResult};

const ENCODING: &str = "cl100k_base";

// Loading the encoding tables is expensive, do it once per process.
static CL100K: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| tiktoken_rs::cl100k_base().map_err(|e| e.to_string()));

/// Exact BPE token counts for GPT-4 class models
pub struct OpenAIProvider {
    encoding: &'static CoreBPE,
}

impl OpenAIProvider {
    /// Create a new cl100k tokenizer
    pub fn new() -> TokenizerResult<Self> {
        match CL100K.as_ref() {
            Ok(encoding) => Ok(Self { encoding }),
            Err(reason) => Err(TokenizerError::EncodingUnavailable {
                encoding: ENCODING.to_string(),
                reason: reason.clone(),
            }),
        }
    }
}

impl Provider for OpenAIProvider {
    fn count_tokens(&self, text: &str) -> usize {
        self.encoding.encode_ordinary(text).len()
    }
}
