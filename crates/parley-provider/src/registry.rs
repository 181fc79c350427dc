use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::profile::{ModelProfile, ProviderProfile};

/// Built-in capability table. Entries: (id, assistant images, documents,
/// reasoning signature).
const WELLKNOWN_PROVIDERS: &[(&str, bool, bool, bool)] = &[
    ("anthropic", true, true, true),
    ("google", true, true, false),
    ("openrouter", true, true, true),
    ("openai", false, true, false),
    ("mistral", false, false, false),
    ("deepseek", false, false, false),
    ("xai", false, false, false),
];

static PROFILES: Lazy<HashMap<&'static str, ProviderProfile>> = Lazy::new(|| {
    WELLKNOWN_PROVIDERS
        .iter()
        .map(|(id, images, documents, signature)| {
            (
                *id,
                ProviderProfile {
                    id: id.to_string(),
                    supports_assistant_images: *images,
                    supports_documents: *documents,
                    supports_reasoning_signature: *signature,
                },
            )
        })
        .collect()
});

/// Resolves provider and model capability profiles. Lives for the process;
/// each message build resolves its profile exactly once and passes the
/// record down, so no component re-queries the table mid-build.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    overrides: HashMap<String, ProviderProfile>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a profile, e.g. from user configuration.
    pub fn insert(&mut self, profile: ProviderProfile) {
        self.overrides.insert(profile.id.to_lowercase(), profile);
    }

    pub fn resolve(&self, provider_id: &str) -> ProviderProfile {
        let key = provider_id.to_lowercase();
        if let Some(profile) = self.overrides.get(&key) {
            return profile.clone();
        }
        if let Some(profile) = PROFILES.get(key.as_str()) {
            return profile.clone();
        }
        ProviderProfile::unknown(key)
    }

    /// Capability profile for a model id. Reasoning-level tables follow the
    /// provider families; unknown models get a non-reasoning profile.
    pub fn model(&self, provider_id: &str, model_id: &str) -> ModelProfile {
        let id = model_id.to_lowercase();
        let base = ModelProfile::new(model_id, provider_id.to_lowercase());

        if id.contains("claude") || id.contains("opus") || id.contains("sonnet") {
            return base.with_reasoning(&["low", "medium", "high", "max"]);
        }
        if id.contains("gemini") && !id.contains("flash-lite") {
            return base.with_reasoning(&["low", "high"]);
        }
        if id.contains("gpt-5") || id.contains("o3") || id.contains("o4") {
            return base.with_reasoning(&["low", "medium", "high"]);
        }
        if id.contains("deepseek-r") {
            // Reasoning is always on for the R series, not selectable.
            return base.with_reasoning(&[]);
        }

        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_wellknown_provider() {
        let registry = ProviderRegistry::new();
        let anthropic = registry.resolve("Anthropic");
        assert!(anthropic.supports_assistant_images);
        assert!(anthropic.supports_reasoning_signature);

        let openai = registry.resolve("openai");
        assert!(!openai.supports_assistant_images);
        assert!(openai.supports_documents);
    }

    #[test]
    fn unknown_provider_gets_conservative_defaults() {
        let registry = ProviderRegistry::new();
        let profile = registry.resolve("acme-llm");
        assert!(!profile.supports_assistant_images);
        assert!(!profile.supports_documents);
    }

    #[test]
    fn override_wins_over_builtin_table() {
        let mut registry = ProviderRegistry::new();
        let mut custom = ProviderProfile::unknown("openai");
        custom.supports_assistant_images = true;
        registry.insert(custom);
        assert!(registry.resolve("openai").supports_assistant_images);
    }

    #[test]
    fn model_reasoning_levels_follow_family() {
        let registry = ProviderRegistry::new();
        let claude = registry.model("anthropic", "claude-sonnet-4");
        assert!(claude.has_selectable_reasoning());

        let fixed = registry.model("deepseek", "deepseek-r1");
        assert!(fixed.reasoning);
        assert!(!fixed.has_selectable_reasoning());
    }

    #[test]
    fn signature_kept_only_for_matching_reasoning_provider() {
        let registry = ProviderRegistry::new();
        let anthropic = registry.resolve("anthropic");
        let openai = registry.resolve("openai");

        let claude = registry.model("anthropic", "claude-opus-4");
        assert!(claude.keeps_signature_from(&anthropic));
        assert!(!claude.keeps_signature_from(&openai));

        let plain = registry.model("anthropic", "haiku-lite");
        assert!(!plain.keeps_signature_from(&anthropic));
    }
}
