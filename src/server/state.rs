//! Server state and configuration.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::canvas::Canvas;
use crate::error::PickslipError;
use crate::render::image_source::ImageResolver;

/// Default idle time before a canvas session or preview is dropped.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Idle seconds before sessions and previews expire
    pub session_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}

impl ServerConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

/// A visual builder canvas kept between requests.
pub struct CanvasSession {
    pub canvas: Canvas,
    pub last_accessed: Instant,
}

impl CanvasSession {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            last_accessed: Instant::now(),
        }
    }

    /// Update last accessed time.
    pub fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }
}

/// A rendered PDF served from `/api/previews/:id`.
pub struct Preview {
    pub pdf: Vec<u8>,
    pub last_accessed: Instant,
}

impl Preview {
    pub fn new(pdf: Vec<u8>) -> Self {
        Self {
            pdf,
            last_accessed: Instant::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub canvases: RwLock<HashMap<Uuid, CanvasSession>>,
    pub previews: RwLock<HashMap<Uuid, Preview>>,
    pub images: ImageResolver,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Self, PickslipError> {
        Ok(Self {
            config,
            canvases: RwLock::new(HashMap::new()),
            previews: RwLock::new(HashMap::new()),
            images: ImageResolver::new()?
                .with_local_files(false)
                .with_private_hosts(false),
        })
    }

    /// Store a rendered PDF, first releasing the preview it replaces.
    pub async fn store_preview(&self, pdf: Vec<u8>, replaces: Option<Uuid>) -> Uuid {
        let id = Uuid::new_v4();
        let mut previews = self.previews.write().await;
        if let Some(old) = replaces
            && previews.remove(&old).is_some()
        {
            tracing::debug!(preview = %old, "Released replaced preview");
        }
        previews.insert(id, Preview::new(pdf));
        id
    }

    /// Drop sessions and previews idle for longer than the TTL.
    ///
    /// Returns the number of canvases and previews removed.
    pub async fn expire(&self, now: Instant) -> (usize, usize) {
        let ttl = self.config.session_ttl();

        let canvases = {
            let mut map = self.canvases.write().await;
            let before = map.len();
            map.retain(|_, v| now.duration_since(v.last_accessed) < ttl);
            before - map.len()
        };

        let previews = {
            let mut map = self.previews.write().await;
            let before = map.len();
            map.retain(|_, v| now.duration_since(v.last_accessed) < ttl);
            before - map.len()
        };

        (canvases, previews)
    }
}
