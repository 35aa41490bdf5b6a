//! Generation request model, defaults, and validation.
//!
//! A [`GenerationRequest`] is built once per incoming call, validated, and
//! is immutable from submission onward. Dimension and sampler rules mirror
//! the upstream provider contract so bad requests are rejected before any
//! network call is made.

use crate::error::RelayError;

// ---------------------------------------------------------------------------
// Model groups
// ---------------------------------------------------------------------------

/// An ordered list of upstream model names submitted together. Groups are
/// tried in sequence until one is accepted.
pub type ModelGroup = Vec<String>;

/// Model requested when the caller does not name any.
pub const DEFAULT_MODEL: &str = "stable_diffusion";

// ---------------------------------------------------------------------------
// Generation defaults
// ---------------------------------------------------------------------------

/// Default image width in pixels.
pub const DEFAULT_WIDTH: u32 = 512;
/// Default image height in pixels.
pub const DEFAULT_HEIGHT: u32 = 512;
/// Default number of diffusion steps.
pub const DEFAULT_STEPS: u32 = 25;
/// Default sampler name.
pub const DEFAULT_SAMPLER: &str = "k_euler";
/// Default classifier-free guidance scale.
pub const DEFAULT_CFG_SCALE: f64 = 7.5;

/// Smallest accepted image dimension.
pub const MIN_DIMENSION: u32 = 64;
/// Largest accepted image dimension.
pub const MAX_DIMENSION: u32 = 1024;
/// Upstream requires dimensions in multiples of this.
pub const DIMENSION_STEP: u32 = 64;
/// Hard ceiling on diffusion steps.
pub const MAX_STEPS: u32 = 150;
/// Hard ceiling on cfg scale.
pub const MAX_CFG_SCALE: f64 = 30.0;
/// Hard ceiling on prompt length in characters.
pub const MAX_PROMPT_CHARS: usize = 1500;

/// Sampler names the upstream provider accepts.
pub const VALID_SAMPLERS: &[&str] = &[
    "k_euler",
    "k_euler_a",
    "k_heun",
    "k_lms",
    "k_dpm_2",
    "k_dpm_2_a",
    "k_dpmpp_2m",
    "k_dpmpp_2s_a",
    "k_dpmpp_sde",
    "DDIM",
];

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A validated image-generation request.
///
/// Created per incoming call; immutable after [`validate`](Self::validate)
/// succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub sampler_name: String,
    pub cfg_scale: f64,
    /// Ordered fallback groups, tried first to last.
    pub model_groups: Vec<ModelGroup>,
}

impl GenerationRequest {
    /// Build a request for `prompt` with all defaults and a single
    /// [`DEFAULT_MODEL`] group.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: None,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            steps: DEFAULT_STEPS,
            sampler_name: DEFAULT_SAMPLER.to_string(),
            cfg_scale: DEFAULT_CFG_SCALE,
            model_groups: vec![vec![DEFAULT_MODEL.to_string()]],
        }
    }

    /// Validate the request against the upstream contract.
    ///
    /// Returns [`RelayError::InvalidRequest`] on the first violated rule.
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.prompt.trim().is_empty() {
            return Err(RelayError::InvalidRequest(
                "Prompt must not be empty".to_string(),
            ));
        }
        if self.prompt.chars().count() > MAX_PROMPT_CHARS {
            return Err(RelayError::InvalidRequest(format!(
                "Prompt exceeds {MAX_PROMPT_CHARS} characters"
            )));
        }
        validate_dimension("width", self.width)?;
        validate_dimension("height", self.height)?;
        if self.steps == 0 || self.steps > MAX_STEPS {
            return Err(RelayError::InvalidRequest(format!(
                "Steps must be between 1 and {MAX_STEPS}"
            )));
        }
        if !(0.0..=MAX_CFG_SCALE).contains(&self.cfg_scale) {
            return Err(RelayError::InvalidRequest(format!(
                "cfg_scale must be between 0 and {MAX_CFG_SCALE}"
            )));
        }
        validate_sampler(&self.sampler_name)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Validate a single image dimension: bounded and a multiple of
/// [`DIMENSION_STEP`].
pub fn validate_dimension(name: &str, value: u32) -> Result<(), RelayError> {
    if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&value) {
        return Err(RelayError::InvalidRequest(format!(
            "{name} must be between {MIN_DIMENSION} and {MAX_DIMENSION}"
        )));
    }
    if value % DIMENSION_STEP != 0 {
        return Err(RelayError::InvalidRequest(format!(
            "{name} must be a multiple of {DIMENSION_STEP}"
        )));
    }
    Ok(())
}

/// Validate that a sampler name is one of the known constants.
pub fn validate_sampler(sampler: &str) -> Result<(), RelayError> {
    if VALID_SAMPLERS.contains(&sampler) {
        Ok(())
    } else {
        Err(RelayError::InvalidRequest(format!(
            "Invalid sampler '{sampler}'. Must be one of: {}",
            VALID_SAMPLERS.join(", ")
        )))
    }
}
