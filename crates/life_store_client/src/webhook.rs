//! Raw-write notifications from the store's database webhooks.

use crate::Source;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use std::collections::{HashSet, VecDeque};
use tokio::sync::RwLock;

type HmacSha256 = Hmac<Sha256>;

pub fn verify_hmac(secret: &SecretString, payload: &[u8], signature_header: &str) -> bool {
    // signature_header expected like: "sha256=..."
    let Some(hex_sig) = signature_header.trim().strip_prefix("sha256=") else {
        return false;
    };
    let Ok(sig) = hex::decode(hex_sig) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.expose_secret().as_bytes()) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&sig).is_ok()
}

/// Body of an insert/update/delete notification.
#[derive(Clone, Debug, Deserialize)]
pub struct RawWriteEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    pub table: String,
    #[serde(default)]
    pub record: Option<serde_json::Value>,
    #[serde(default)]
    pub old_record: Option<serde_json::Value>,
}

impl RawWriteEvent {
    /// Owner of the written row; deletes only carry `old_record`.
    pub fn user_id(&self) -> Option<&str> {
        self.record
            .as_ref()
            .and_then(|r| r.get("user_id"))
            .or_else(|| self.old_record.as_ref().and_then(|r| r.get("user_id")))
            .and_then(|v| v.as_str())
    }

    pub fn source(&self) -> Option<Source> {
        Source::from_table(&self.table)
    }

    pub fn dedupe_key(&self) -> String {
        if let Some(id) = &self.id {
            return id.clone();
        }
        let row_id = self
            .record
            .as_ref()
            .or(self.old_record.as_ref())
            .and_then(|r| r.get("id"))
            .map(|v| v.to_string())
            .unwrap_or_default();
        format!(
            "{}:{}:{}",
            self.table,
            self.kind.as_deref().unwrap_or("UNKNOWN"),
            row_id
        )
    }
}

/// Event ids remembered by a default [`Deduper`].
pub const DEFAULT_DEDUPE_CAPACITY: usize = 10_000;

#[derive(Default)]
struct SeenIds {
    ids: HashSet<String>,
    order: VecDeque<String>,
}

/// Remembers the most recent event ids; the oldest id is forgotten once
/// `capacity` is reached.
pub struct Deduper {
    capacity: usize,
    seen: RwLock<SeenIds>,
}

impl Default for Deduper {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_DEDUPE_CAPACITY)
    }
}

impl Deduper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            seen: RwLock::new(SeenIds::default()),
        }
    }

    pub async fn is_duplicate(&self, uid: &str) -> bool {
        let mut lock = self.seen.write().await;
        if !lock.ids.insert(uid.to_string()) {
            return true;
        }
        lock.order.push_back(uid.to_string());
        while lock.order.len() > self.capacity {
            if let Some(oldest) = lock.order.pop_front() {
                lock.ids.remove(&oldest);
            }
        }
        false
    }

    pub async fn len(&self) -> usize {
        self.seen.read().await.ids.len()
    }
}
