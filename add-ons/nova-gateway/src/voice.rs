//! Speech wiring: pick the TTS backend named in config and log what was chosen.

use std::sync::Arc;

use nova_core::{NovaConfig, TtsProvider};
use nova_voice::{GoogleTranslateTts, OpenAiCompatibleTts, SharedTts, SilentTts, VoiceResult};
use tracing::{info, warn};

fn build_backend(config: &NovaConfig) -> VoiceResult<SharedTts> {
    let tts: SharedTts = match config.tts_provider {
        TtsProvider::Google => Arc::new(GoogleTranslateTts::new(&config.tts_language)?),
        TtsProvider::OpenAi => Arc::new(OpenAiCompatibleTts::new(
            &config.tts_api_url,
            config.tts_api_key.clone(),
            &config.tts_model,
            &config.tts_voice,
        )?),
        TtsProvider::None => Arc::new(SilentTts),
    };
    Ok(tts)
}

/// Backend for the configured provider. A misconfigured provider degrades to silence.
pub fn tts_from_config(config: &NovaConfig) -> SharedTts {
    match build_backend(config) {
        Ok(tts) => {
            let status = match config.tts_provider {
                TtsProvider::Google => format!("TTS: [Google Translate] (lang {})", config.tts_language),
                TtsProvider::OpenAi => format!("TTS: [OpenAI-compatible] (voice {})", config.tts_voice),
                TtsProvider::None => "TTS: [Silent] (narration disabled)".to_string(),
            };
            info!(target: "nova::voice", "{}", status);
            tts
        }
        Err(e) => {
            warn!(target: "nova::voice", "TTS: [Silent] ({}); replies will not be narrated", e);
            Arc::new(SilentTts)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn openai_without_key_degrades_to_silence() {
        let config = NovaConfig {
            tts_provider: TtsProvider::OpenAi,
            tts_api_key: None,
            ..NovaConfig::default()
        };
        let tts = tts_from_config(&config);
        assert!(tts.synthesize("hello").await.unwrap().is_empty());
    }

    #[test]
    fn each_provider_builds() {
        for provider in [TtsProvider::Google, TtsProvider::None] {
            let config = NovaConfig {
                tts_provider: provider,
                ..NovaConfig::default()
            };
            assert!(build_backend(&config).is_ok());
        }
        let config = NovaConfig {
            tts_provider: TtsProvider::OpenAi,
            tts_api_key: Some("sk-test".into()),
            ..NovaConfig::default()
        };
        assert!(build_backend(&config).is_ok());
    }
}
