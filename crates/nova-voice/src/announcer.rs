//! **Announcer** — fire-and-forget narration of reply text.
//!
//! `announce` spawns a detached tokio task and returns immediately. The task synthesizes the text and
//! writes `nova_<millis>_<uuid>.mp3` into the audio directory. Nothing it does is visible to the
//! caller: failures are logged at `warn` and dropped, and the task may still be running at exit.

use std::path::{Path, PathBuf};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::VoiceResult;
use crate::tts::SharedTts;

#[derive(Clone)]
pub struct Announcer {
    tts: SharedTts,
    audio_dir: PathBuf,
}

impl Announcer {
    pub fn new(tts: SharedTts, audio_dir: impl Into<PathBuf>) -> Self {
        Self {
            tts,
            audio_dir: audio_dir.into(),
        }
    }

    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    /// Start narrating `text` in the background. The handle may be dropped; tests await it.
    pub fn announce(&self, text: impl Into<String>) -> JoinHandle<()> {
        let text = text.into();
        let this = self.clone();
        tokio::spawn(async move {
            if text.trim().is_empty() {
                debug!("announce: nothing to say");
                return;
            }
            match this.synthesize_to_file(&text).await {
                Ok(Some(path)) => info!("Narration written to {}", path.display()),
                Ok(None) => debug!("announce: backend produced no audio"),
                Err(e) => warn!("announce failed (ignored): {}", e),
            }
        })
    }

    /// Synthesize to a uniquely named file, read it back and remove it.
    pub async fn render_to_temp(&self, text: &str) -> VoiceResult<Vec<u8>> {
        let path = self.unique_path();
        let audio = self.tts.synthesize(text).await?;
        tokio::fs::create_dir_all(&self.audio_dir).await?;
        round_trip(&path, &audio).await
    }

    async fn synthesize_to_file(&self, text: &str) -> VoiceResult<Option<PathBuf>> {
        let audio = self.tts.synthesize(text).await?;
        if audio.is_empty() {
            return Ok(None);
        }
        tokio::fs::create_dir_all(&self.audio_dir).await?;
        let path = self.unique_path();
        tokio::fs::write(&path, &audio).await?;
        Ok(Some(path))
    }

    fn unique_path(&self) -> PathBuf {
        let millis = chrono::Utc::now().timestamp_millis();
        self.audio_dir
            .join(format!("nova_{}_{}.mp3", millis, uuid::Uuid::new_v4().simple()))
    }
}

/// Write `audio` to `path` and read it back. The file is removed whether or not either step worked.
async fn round_trip(path: &Path, audio: &[u8]) -> VoiceResult<Vec<u8>> {
    let read = match tokio::fs::write(path, audio).await {
        Ok(()) => tokio::fs::read(path).await,
        Err(e) => Err(e),
    };
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("could not remove {}: {}", path.display(), e),
    }
    Ok(read?)
}
