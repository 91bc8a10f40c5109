//! D-Bus client for speechd-ng integration
//!
//! Uses zbus for async D-Bus communication with the speechd-ng daemon. Shared
//! by the speechd TTS engine and the speechd listener.

use crate::error::SpeechError;
use tracing::{debug, info, warn};
use zbus::{proxy, Connection};

/// D-Bus proxy for the speechd-ng service
#[proxy(
    interface = "org.speech.Service",
    default_service = "org.speech.Service",
    default_path = "/org/speech/Service"
)]
trait SpeechService {
    /// Speak text using default voice
    fn speak(&self, text: &str) -> zbus::Result<()>;

    /// Listen with VAD and return transcript
    fn listen_vad(&self) -> zbus::Result<String>;

    /// Ping the service
    fn ping(&self) -> zbus::Result<String>;
}

/// Shared handle to the speechd-ng daemon
#[derive(Debug, Clone)]
pub struct SpeechdClient {
    proxy: SpeechServiceProxy<'static>,
}

fn unavailable(context: &str, e: zbus::Error) -> SpeechError {
    SpeechError::DeviceUnavailable(format!("{}: {}", context, e))
}

fn service(e: zbus::Error) -> SpeechError {
    SpeechError::ServiceError(e.to_string())
}

impl SpeechdClient {
    /// A daemon that is registered but does not answer a ping counts as absent
    pub async fn connect() -> Result<Self, SpeechError> {
        let connection = Connection::session()
            .await
            .map_err(|e| unavailable("no session bus", e))?;
        let proxy = SpeechServiceProxy::new(&connection)
            .await
            .map_err(|e| unavailable("speechd-ng proxy", e))?;

        let version = proxy.ping().await.map_err(|e| {
            warn!("⚠️ speechd-ng not responding: {}", e);
            unavailable("speechd-ng not responding", e)
        })?;
        info!("🔊 Connected to speechd-ng: {}", version);

        Ok(Self { proxy })
    }

    /// Returns once the daemon has finished speaking
    pub async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        debug!("🔊 speechd-ng speak: {}", text);
        self.proxy.speak(text).await.map_err(service)
    }

    /// One VAD-bounded capture; the raw transcript, possibly empty
    pub async fn listen(&self) -> Result<String, SpeechError> {
        debug!("🎤 speechd-ng capture");
        self.proxy.listen_vad().await.map_err(service)
    }

    pub async fn is_available(&self) -> bool {
        self.proxy.ping().await.is_ok()
    }
}
