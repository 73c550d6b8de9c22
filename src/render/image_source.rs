//! Image resolution: turns image element `src` values into bitmaps.
//!
//! `ImageResolver` handles all fetching concerns so the renderer stays a
//! pure function of elements and decoded images.
//!
//! A fresh resolver only accepts `data:` URLs and public `http(s)` hosts.
//! Local paths and private network addresses must be enabled explicitly,
//! which the CLI does and the server does not.

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::DynamicImage;

use crate::canvas::{CanvasElement, ElementKind};
use crate::error::PickslipError;

/// Largest accepted image download, in bytes.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Decoded images keyed by the index of the element that uses them.
pub type ResolvedImages = HashMap<usize, DynamicImage>;

/// Fetches and decodes image sources.
#[derive(Clone)]
pub struct ImageResolver {
    client: reqwest::Client,
    local_files: bool,
    private_hosts: bool,
}

impl ImageResolver {
    pub fn new() -> Result<Self, PickslipError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pickslip/", env!("CARGO_PKG_VERSION")))
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(|e| PickslipError::Image(format!("HTTP client error: {}", e)))?;
        Ok(Self {
            client,
            local_files: false,
            private_hosts: false,
        })
    }

    /// Allow `src` values that are file paths.
    pub fn with_local_files(mut self, allow: bool) -> Self {
        self.local_files = allow;
        self
    }

    /// Allow URLs whose host resolves to a loopback, private or link-local
    /// address.
    pub fn with_private_hosts(mut self, allow: bool) -> Self {
        self.private_hosts = allow;
        self
    }

    /// Resolve one `src`: a `data:` URL, an `http(s)` URL or a file path.
    pub async fn resolve(&self, src: &str) -> Result<DynamicImage, PickslipError> {
        let src = src.trim();
        if src.is_empty() {
            return Err(PickslipError::Image("image has no source".into()));
        }

        let bytes = if src.starts_with("data:") {
            decode_data_url(src)?
        } else if src.starts_with("http://") || src.starts_with("https://") {
            if !self.private_hosts {
                check_public_host(src).await?;
            }
            self.download(src).await?
        } else if self.local_files {
            read_file(Path::new(src)).await?
        } else {
            return Err(PickslipError::Image(
                "only data: and http(s) image sources are accepted".into(),
            ));
        };

        image::load_from_memory(&bytes)
            .map_err(|e| PickslipError::Image(format!("Failed to decode image: {}", e)))
    }

    /// Resolve every image element that has a source.
    ///
    /// Failures are logged and skipped; the renderer draws a placeholder
    /// for any image element missing from the result.
    pub async fn resolve_all(&self, elements: &[CanvasElement]) -> ResolvedImages {
        let mut resolved = HashMap::new();
        for (index, element) in elements.iter().enumerate() {
            let ElementKind::Image(image) = &element.kind else {
                continue;
            };
            if image.src.trim().is_empty() {
                continue;
            }
            match self.resolve(&image.src).await {
                Ok(decoded) => {
                    resolved.insert(index, decoded);
                }
                Err(e) => {
                    tracing::warn!(element = %element.id, error = %e, "Image unavailable");
                }
            }
        }
        resolved
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, PickslipError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PickslipError::Image(format!("Failed to download {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(PickslipError::Image(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }

        if let Some(len) = response.content_length()
            && len > MAX_IMAGE_BYTES as u64
        {
            return Err(too_large(url));
        }

        let mut data = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| PickslipError::Image(format!("Failed to read image data: {}", e)))?
        {
            data.extend_from_slice(&chunk);
            if data.len() > MAX_IMAGE_BYTES {
                return Err(too_large(url));
            }
        }
        Ok(data)
    }
}

fn too_large(url: &str) -> PickslipError {
    PickslipError::Image(format!(
        "Image at {} exceeds {} bytes",
        url, MAX_IMAGE_BYTES
    ))
}

/// Loopback, private, link-local, CGNAT and unspecified addresses.
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                || v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64
        }
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                || (first & 0xFE00) == 0xFC00
                || (first & 0xFFC0) == 0xFE80
                || v6.to_ipv4_mapped().is_some_and(|v4| is_private_ip(&IpAddr::V4(v4)))
        }
    }
}

/// Reject URLs whose host resolves to a non-public address.
async fn check_public_host(url: &str) -> Result<(), PickslipError> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| PickslipError::Image(format!("Invalid image URL {}: {}", url, e)))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| PickslipError::Image(format!("Image URL {} has no host", url)))?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let port = parsed.port_or_known_default().unwrap_or(443);

    let addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| PickslipError::Image(format!("Failed to resolve {}: {}", host, e)))?;
    for addr in addrs {
        if is_private_ip(&addr.ip()) {
            return Err(PickslipError::Image(format!(
                "Image host {} is not publicly routable",
                host
            )));
        }
    }
    Ok(())
}

async fn read_file(path: &Path) -> Result<Vec<u8>, PickslipError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| PickslipError::Image(format!("Failed to read {}: {}", path.display(), e)))
}

/// Payload of a base64 `data:` URL.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, PickslipError> {
    let (header, payload) = url
        .split_once(',')
        .ok_or_else(|| PickslipError::Image("data URL has no payload".into()))?;
    if !header.ends_with(";base64") {
        return Err(PickslipError::Image(
            "only base64 data URLs are supported".into(),
        ));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| PickslipError::Image(format!("Invalid base64 image data: {}", e)))
}
