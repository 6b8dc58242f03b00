//! Consent gating for the ad-pixel collaborators.
//!
//! This service does not implement pixel vendor logic. It owns the seam: a
//! per-visitor marketing-consent flag and two idempotent "load now" entry
//! points, invoked when the consent UI reports a change. Each entry point
//! re-checks the consent flag itself before doing anything.

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Per-visitor marketing consent flags, keyed like the client-side
/// `marketing_consent` storage entry.
#[derive(Clone, Default)]
pub struct ConsentRegistry {
    flags: Arc<DashMap<String, bool>>,
}

impl ConsentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, client_id: &str, granted: bool) {
        self.flags.insert(client_id.to_string(), granted);
    }

    pub fn granted(&self, client_id: &str) -> bool {
        self.flags.get(client_id).map(|v| *v).unwrap_or(false)
    }
}

/// One ad-vendor pixel loader. `load` must be idempotent and must be a no-op
/// without consent.
pub trait PixelLoader: Send + Sync {
    fn vendor(&self) -> &'static str;
    fn load(&self, registry: &ConsentRegistry, client_id: &str);
}

/// Stub loader standing in for the external pixel collaborator: records
/// whether the vendor script was requested, exactly once.
pub struct VendorPixel {
    vendor: &'static str,
    loaded: AtomicBool,
}

impl VendorPixel {
    pub fn meta() -> Self {
        Self::named("meta")
    }

    pub fn tiktok() -> Self {
        Self::named("tiktok")
    }

    pub fn named(vendor: &'static str) -> Self {
        Self {
            vendor,
            loaded: AtomicBool::new(false),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }
}

impl PixelLoader for VendorPixel {
    fn vendor(&self) -> &'static str {
        self.vendor
    }

    fn load(&self, registry: &ConsentRegistry, client_id: &str) {
        if !registry.granted(client_id) {
            debug!(vendor = %self.vendor, client_id = %client_id, "consent not granted, pixel not loaded");
            return;
        }
        if self.loaded.swap(true, Ordering::SeqCst) {
            debug!(vendor = %self.vendor, "pixel already loaded");
            return;
        }
        info!(vendor = %self.vendor, "loading ad pixel");
    }
}
