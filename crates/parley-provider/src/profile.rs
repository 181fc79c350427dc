use serde::{Deserialize, Serialize};

/// Per-provider capability record, resolved once per build from the
/// registry. The message builder branches on these fields instead of
/// matching provider names ad hoc.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderProfile {
    pub id: String,
    /// Whether the provider accepts image content inside assistant-role
    /// messages. When false, assistant-generated images are resubmitted in
    /// a synthetic trailing user message so the visual context survives.
    pub supports_assistant_images: bool,
    /// Whether document attachments (PDF) may ride along as file content.
    pub supports_documents: bool,
    /// Whether opaque reasoning signatures round-trip to this provider.
    pub supports_reasoning_signature: bool,
}

impl ProviderProfile {
    /// Conservative defaults for providers the registry does not know:
    /// no assistant images, no documents, no signature round-trip.
    pub fn unknown(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            supports_assistant_images: false,
            supports_documents: false,
            supports_reasoning_signature: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelProfile {
    pub id: String,
    pub provider_id: String,
    pub reasoning: bool,
    /// Selectable reasoning levels; empty when the model has one fixed
    /// level (in which case the level never decorates `model_used`).
    pub reasoning_levels: Vec<String>,
}

impl ModelProfile {
    pub fn new(id: impl Into<String>, provider_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            provider_id: provider_id.into(),
            reasoning: false,
            reasoning_levels: Vec::new(),
        }
    }

    pub fn with_reasoning(mut self, levels: &[&str]) -> Self {
        self.reasoning = true;
        self.reasoning_levels = levels.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn has_selectable_reasoning(&self) -> bool {
        self.reasoning_levels.len() > 1
    }

    /// A stored reasoning signature is only meaningful when it was minted
    /// by this model's own provider and the model actually reasons.
    pub fn keeps_signature_from(&self, profile: &ProviderProfile) -> bool {
        self.reasoning
            && profile.supports_reasoning_signature
            && profile.id.eq_ignore_ascii_case(&self.provider_id)
    }
}
