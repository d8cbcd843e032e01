//! Narrator voice catalog.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Voice used when the caller does not pick one.
pub const DEFAULT_NARRATOR: &str = "alloy";

/// Text-to-speech provider behind a voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VoiceProvider {
    Openai,
    Novita,
}

impl VoiceProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceProvider::Openai => "openai",
            VoiceProvider::Novita => "novita",
        }
    }
}

/// A narrator voice offered at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Voice {
    pub id: &'static str,
    pub name: &'static str,
    pub provider: VoiceProvider,
    pub sample_url: &'static str,
}

pub static VOICES: &[Voice] = &[
    Voice {
        id: "alloy",
        name: "Alloy",
        provider: VoiceProvider::Openai,
        sample_url: "https://cdn.openai.com/API/docs/audio/alloy.wav",
    },
    Voice {
        id: "echo",
        name: "Echo",
        provider: VoiceProvider::Openai,
        sample_url: "https://cdn.openai.com/API/docs/audio/echo.wav",
    },
    Voice {
        id: "fable",
        name: "Fable",
        provider: VoiceProvider::Openai,
        sample_url: "https://cdn.openai.com/API/docs/audio/fable.wav",
    },
    Voice {
        id: "onyx",
        name: "Onyx",
        provider: VoiceProvider::Openai,
        sample_url: "https://cdn.openai.com/API/docs/audio/onyx.wav",
    },
    Voice {
        id: "nova",
        name: "Nova",
        provider: VoiceProvider::Openai,
        sample_url: "https://cdn.openai.com/API/docs/audio/nova.wav",
    },
    Voice {
        id: "shimmer",
        name: "Shimmer",
        provider: VoiceProvider::Openai,
        sample_url: "https://cdn.openai.com/API/docs/audio/shimmer.wav",
    },
    Voice {
        id: "James",
        name: "James",
        provider: VoiceProvider::Novita,
        sample_url: "https://novita.ai/product/audio/txt2speech/voice_preview_james.wav",
    },
    Voice {
        id: "Emily",
        name: "Emily",
        provider: VoiceProvider::Novita,
        sample_url: "https://novita.ai/product/audio/txt2speech/voice_prieview_emily.wav",
    },
    Voice {
        id: "Olivia",
        name: "Olivia",
        provider: VoiceProvider::Novita,
        sample_url: "https://novita.ai/product/audio/txt2speech/voice_preview_olivia.wav",
    },
    Voice {
        id: "Michael",
        name: "Michael",
        provider: VoiceProvider::Novita,
        sample_url: "https://novita.ai/product/audio/txt2speech/voice_preview_michael.wav",
    },
    Voice {
        id: "Sarah",
        name: "Sarah",
        provider: VoiceProvider::Novita,
        sample_url: "https://novita.ai/product/audio/txt2speech/voice_preview_sarah.wav",
    },
    Voice {
        id: "John",
        name: "John",
        provider: VoiceProvider::Novita,
        sample_url: "https://novita.ai/product/audio/txt2speech/voice_preview_john.wav",
    },
];

/// Look up a voice by its exact id.
pub fn find_voice(id: &str) -> Option<&'static Voice> {
    VOICES.iter().find(|v| v.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_narrator_exists() {
        let voice = find_voice(DEFAULT_NARRATOR).unwrap();
        assert_eq!(voice.provider, VoiceProvider::Openai);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(find_voice("James").is_some());
        assert!(find_voice("james").is_none());
    }
}
