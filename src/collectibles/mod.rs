//! Collectible (shop item) metadata cache.
//!
//! SKU lookups are deduplicated in flight, negative results are cached,
//! and repeated fetch failures suspend the cache for the rest of the
//! session so a broken endpoint cannot be hammered.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use serde_json::Value;
use tracing::{info, warn};

use crate::download::{DownloadError, HttpClient};

/// Consecutive fetch failures tolerated before lookups suspend.
const MAX_FETCH_ERRORS: u32 = 5;

const TYPE_AVATAR_DECORATION: i64 = 0;
const TYPE_PROFILE_EFFECT: i64 = 1;
const TYPE_NAMEPLATE: i64 = 2;

/// Pruned metadata for one shop collectible.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectibleRecord {
    AvatarDecoration {
        id: String,
        sku_id: String,
        name: String,
        asset: String,
        label: String,
    },
    ProfileEffect {
        id: String,
        sku_id: String,
        name: String,
        title: String,
        description: String,
        thumbnail_preview_src: String,
        reduced_motion_src: Option<String>,
        effect_srcs: Vec<String>,
    },
    Nameplate {
        id: String,
        sku_id: String,
        name: String,
        asset: String,
        label: String,
        palette: String,
    },
}

/// Reads a field that the API serves either as a string or a number.
fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_field_or_default(value: &Value, key: &str) -> String {
    string_field(value, key).unwrap_or_default()
}

impl CollectibleRecord {
    /// Builds a record from a listing item, with `listing_name`
    /// overriding the item's own name when present. Unknown type
    /// codes yield `None`.
    pub fn from_item(item: &Value, listing_name: Option<&str>) -> Option<Self> {
        let type_code = item.get("type").and_then(Value::as_i64)?;
        let name = listing_name
            .map(str::to_string)
            .or_else(|| string_field(item, "name"))
            .unwrap_or_default();

        match type_code {
            TYPE_AVATAR_DECORATION => Some(Self::AvatarDecoration {
                id: string_field_or_default(item, "id"),
                sku_id: string_field(item, "sku_id")?,
                name,
                asset: string_field_or_default(item, "asset"),
                label: string_field_or_default(item, "label"),
            }),
            TYPE_PROFILE_EFFECT => Some(Self::ProfileEffect {
                id: string_field_or_default(item, "id"),
                sku_id: string_field(item, "sku_id")?,
                name,
                title: string_field_or_default(item, "title"),
                description: string_field_or_default(item, "description"),
                thumbnail_preview_src: string_field_or_default(item, "thumbnailPreviewSrc"),
                reduced_motion_src: string_field(item, "reducedMotionSrc"),
                effect_srcs: item
                    .get("effects")
                    .and_then(Value::as_array)
                    .map(|effects| {
                        effects
                            .iter()
                            .filter_map(|e| string_field(e, "src"))
                            .collect()
                    })
                    .unwrap_or_default(),
            }),
            TYPE_NAMEPLATE => Some(Self::Nameplate {
                id: string_field_or_default(item, "id"),
                sku_id: string_field(item, "sku_id")?,
                name,
                asset: string_field_or_default(item, "asset"),
                label: string_field_or_default(item, "label"),
                palette: string_field_or_default(item, "palette"),
            }),
            _ => None,
        }
    }

    pub fn sku_id(&self) -> &str {
        match self {
            Self::AvatarDecoration { sku_id, .. }
            | Self::ProfileEffect { sku_id, .. }
            | Self::Nameplate { sku_id, .. } => sku_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::AvatarDecoration { name, .. }
            | Self::ProfileEffect { name, .. }
            | Self::Nameplate { name, .. } => name,
        }
    }

    /// The CDN asset path, for record types that have one.
    pub fn asset(&self) -> Option<&str> {
        match self {
            Self::AvatarDecoration { asset, .. } | Self::Nameplate { asset, .. } => Some(asset),
            Self::ProfileEffect { .. } => None,
        }
    }
}

fn is_collectible_type(listing: &Value) -> bool {
    matches!(
        listing.get("type").and_then(Value::as_i64),
        Some(TYPE_AVATAR_DECORATION | TYPE_PROFILE_EFFECT | TYPE_NAMEPLATE)
    )
}

type InFlightFuture = Shared<BoxFuture<'static, Option<CollectibleRecord>>>;

/// Session cache of collectible metadata keyed by SKU id.
pub struct CollectiblesCache {
    client: HttpClient,
    base_url: String,
    resolved: DashMap<String, CollectibleRecord>,
    invalid: DashMap<String, ()>,
    in_flight: Mutex<HashMap<String, InFlightFuture>>,
    errors: AtomicU32,
    suspended: AtomicBool,
}

impl CollectiblesCache {
    /// `base_url` is the API root, without a trailing slash.
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            resolved: DashMap::new(),
            invalid: DashMap::new(),
            in_flight: Mutex::new(HashMap::new()),
            errors: AtomicU32::new(0),
            suspended: AtomicBool::new(false),
        }
    }

    /// Stores a record under `sku_id`. Empty keys are ignored.
    pub fn store(&self, sku_id: &str, record: CollectibleRecord) {
        if sku_id.is_empty() {
            return;
        }
        self.resolved.insert(sku_id.to_string(), record);
    }

    /// Cached record, if any. Never triggers a fetch.
    pub fn peek(&self, sku_id: &str) -> Option<CollectibleRecord> {
        self.resolved.get(sku_id).map(|r| r.clone())
    }

    /// Finds a cached record by its CDN asset path.
    pub fn peek_by_asset(&self, asset: &str) -> Option<CollectibleRecord> {
        if asset.is_empty() {
            return None;
        }
        self.resolved
            .iter()
            .find(|entry| entry.value().asset() == Some(asset))
            .map(|entry| entry.value().clone())
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::SeqCst)
    }

    pub fn error_count(&self) -> u32 {
        self.errors.load(Ordering::SeqCst)
    }

    /// Cached record if present; otherwise kicks off a background
    /// fetch and reports a miss now.
    pub fn get_or_schedule(self: &Arc<Self>, sku_id: &str) -> Option<CollectibleRecord> {
        if sku_id.is_empty() {
            return None;
        }
        if let Some(record) = self.peek(sku_id) {
            return Some(record);
        }
        if self.invalid.contains_key(sku_id) {
            return None;
        }
        {
            let in_flight = self
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if in_flight.contains_key(sku_id) {
                return None;
            }
        }
        let this = Arc::clone(self);
        let sku = sku_id.to_string();
        tokio::spawn(async move {
            this.fetch(&sku, false).await;
        });
        None
    }

    /// Fetches a SKU's record, deduplicating concurrent lookups.
    ///
    /// `force` bypasses the positive and negative caches but not the
    /// suspension: once suspended the cache only serves what it has.
    pub async fn fetch(self: &Arc<Self>, sku_id: &str, force: bool) -> Option<CollectibleRecord> {
        if sku_id.is_empty() {
            return None;
        }
        let suspended = self.is_suspended();
        if !force || suspended {
            if let Some(record) = self.peek(sku_id) {
                return Some(record);
            }
        }
        if !force && self.invalid.contains_key(sku_id) {
            return None;
        }
        if suspended {
            return None;
        }

        let fut = {
            let mut in_flight = self
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            match in_flight.get(sku_id) {
                Some(existing) => existing.clone(),
                None => {
                    let this = Arc::clone(self);
                    let sku = sku_id.to_string();
                    let fut: InFlightFuture =
                        async move { this.fetch_and_cache(&sku).await }.boxed().shared();
                    in_flight.insert(sku_id.to_string(), fut.clone());
                    fut
                }
            }
        };

        let result = fut.await;
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(sku_id);
        result
    }

    async fn fetch_and_cache(self: Arc<Self>, sku_id: &str) -> Option<CollectibleRecord> {
        let url = format!("{}/collectibles-products/{sku_id}", self.base_url);
        let body = match self.client.get_json(&url).await {
            Ok(body) => body,
            Err(DownloadError::HttpStatus { status: 404, .. }) => {
                info!(sku_id, "sku not found, caching as invalid");
                self.invalid.insert(sku_id.to_string(), ());
                return None;
            }
            Err(e) => {
                let errors = self.errors.fetch_add(1, Ordering::SeqCst) + 1;
                warn!(sku_id, error = %e, errors, "sku fetch failed");
                if errors >= MAX_FETCH_ERRORS {
                    self.suspended.store(true, Ordering::SeqCst);
                    warn!("collectible fetch error limit reached, suspending lookups");
                }
                return None;
            }
        };

        if body.get("sku_id").is_none() {
            warn!(sku_id, "listing response carried no sku_id");
            self.invalid.insert(sku_id.to_string(), ());
            return None;
        }
        if !is_collectible_type(&body) {
            self.invalid.insert(sku_id.to_string(), ());
            return None;
        }

        let item = body.get("items").and_then(|items| items.get(0))?;
        let listing_name = body.get("name").and_then(Value::as_str);
        let record = CollectibleRecord::from_item(item, listing_name)?;
        self.store(record.sku_id(), record.clone());
        Some(record)
    }

    /// Primes the cache from the session endpoints: owned purchases,
    /// the shop catalog, and the user's profile effects. Each call is
    /// best effort; failures only log.
    pub async fn load_session_data(&self) {
        match self
            .client
            .get_json(&format!("{}/users/@me/collectibles-purchases", self.base_url))
            .await
        {
            Ok(body) => self.prime_listing(&body),
            Err(e) => warn!(error = %e, "could not load collectible purchases"),
        }

        match self
            .client
            .get_json(&format!("{}/collectibles-categories/v2", self.base_url))
            .await
        {
            Ok(body) => {
                let categories = body
                    .get("categories")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                for category in &categories {
                    let products = category
                        .get("products")
                        .and_then(Value::as_array)
                        .cloned()
                        .unwrap_or_default();
                    for listing in &products {
                        self.prime_listing(listing);
                    }
                }
            }
            Err(e) => warn!(error = %e, "could not load collectible categories"),
        }

        match self
            .client
            .get_json(&format!("{}/user-profile-effects", self.base_url))
            .await
        {
            Ok(body) => {
                let configs = body
                    .get("profile_effect_configs")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                for effect in &configs {
                    let title = effect.get("title").and_then(Value::as_str);
                    if let Some(record) = CollectibleRecord::from_item(effect, title) {
                        let sku = record.sku_id().to_string();
                        self.store(&sku, record);
                    }
                }
            }
            Err(e) => warn!(error = %e, "could not load profile effects"),
        }
    }

    fn prime_listing(&self, listing: &Value) {
        if !is_collectible_type(listing) {
            return;
        }
        let Some(item) = listing.get("items").and_then(|items| items.get(0)) else {
            return;
        };
        let listing_name = listing.get("name").and_then(Value::as_str);
        if let Some(record) = CollectibleRecord::from_item(item, listing_name) {
            let sku = record.sku_id().to_string();
            self.store(&sku, record);
        }
    }
}
