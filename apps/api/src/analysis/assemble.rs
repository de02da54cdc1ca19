//! Prompt assembly: a normalized request in, the model payload out.
//! Pure and deterministic — same inputs always produce the same payload.

use crate::analysis::models::AnalysisRequest;
use crate::analysis::prompts;
use crate::model_client::{Content, GenerationConfig, ModelPayload, Part, SystemInstruction};

const TEMPERATURE: f32 = 0.3;
const TOP_K: u32 = 40;
const TOP_P: f32 = 0.95;
const MAX_OUTPUT_TOKENS: u32 = 4096;

/// Builds the `generateContent` payload: one user turn, the
/// language-selected system instruction, and fixed generation parameters
/// with a structured-JSON response directive.
pub fn assemble(request: &AnalysisRequest) -> ModelPayload {
    ModelPayload {
        contents: vec![Content {
            role: "user",
            parts: vec![Part {
                text: prompts::user_prompt(&request.job_description, &request.resume),
            }],
        }],
        system_instruction: SystemInstruction {
            parts: vec![Part {
                text: prompts::system_prompt(request.language),
            }],
        },
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
            top_k: TOP_K,
            top_p: TOP_P,
            max_output_tokens: MAX_OUTPUT_TOKENS,
            response_mime_type: "application/json",
        },
    }
}
