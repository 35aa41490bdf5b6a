//! Submission payload construction.
//!
//! Maps a validated [`GenerationRequest`] plus one model group to the JSON
//! body the provider's `POST /generate/async` endpoint expects.

use genrelay_core::generation::{GenerationRequest, ModelGroup};

/// Build the submission body for one model group.
///
/// `n` is pinned to 1: the relay requests exactly one image per job, and
/// the resolver takes the first generation of a completed job.
pub fn build_submit_payload(request: &GenerationRequest, models: &ModelGroup) -> serde_json::Value {
    serde_json::json!({
        "prompt": prompt_with_negative(request),
        "params": {
            "width": request.width,
            "height": request.height,
            "steps": request.steps,
            "sampler_name": request.sampler_name,
            "cfg_scale": request.cfg_scale,
            "n": 1,
        },
        "models": models,
        "nsfw": false,
        "censor_nsfw": true,
        "r2": true,
    })
}

/// Join prompt and negative prompt with the provider's `###` separator.
fn prompt_with_negative(request: &GenerationRequest) -> String {
    match request
        .negative_prompt
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
    {
        Some(negative) => format!("{} ### {}", request.prompt, negative),
        None => request.prompt.clone(),
    }
}
