//! The resolver's cache (C1): a TTL-bounded, capacity-limited, concurrently
//! accessed map from fingerprint to cached answer, with background eviction.
//!
//! Grounded on the teacher's `cache/mod.rs`, trimmed to the spec's single-lock
//! design: the spec calls for one exclusive lock over the whole map (hit
//! counting is read-modify-write), which is a `parking_lot::Mutex<HashMap<_>>`
//! rather than the teacher's `DashMap` — sharding would blur the "one lock"
//! invariant the spec's concurrency model depends on. `parking_lot` itself is
//! still the teacher's lock crate.

mod fingerprint;
mod policy;

pub use fingerprint::fingerprint;
pub use policy::Policy;

use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use crate::dns::{DnsClass, DnsHeader, DnsMessage, DnsQuestion, DnsRecord, DnsType, fqdn};

/// A single cached answer (spec.md §3's "Cache Entry").
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Unix seconds at which this entry expires, or `0` meaning "never".
    pub expiry_epoch: i64,
    pub hits: u64,
    pub value: DnsMessage,
}

pub struct Cache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    capacity: usize,
    min_ttl: u32,
    flush_interval: u64,
    #[allow(dead_code)] // the policy tag is validated at config load; `default` is the only behavior
    policy: Policy,
}

fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before Unix epoch")
        .as_secs() as i64
}

impl Cache {
    /// `capacity <= 0` defaults to 1000 per spec.md §6 (`MaxEntries`).
    pub fn new(capacity: i64, min_ttl: u32, flush_interval: u64, policy: Policy) -> Self {
        let capacity = if capacity <= 0 { 1000 } else { capacity as usize };
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity,
            min_ttl,
            flush_interval,
            policy,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts an upstream answer under `key`. Fails without mutating state
    /// when the answer is empty, the cache is at capacity, or the key already
    /// exists — never displaces an existing entry (spec.md §4.1: no LRU).
    pub fn insert(&self, key: String, value: DnsMessage) -> bool {
        let Some(min_answer_ttl) = value.min_answer_ttl() else {
            info!(key = %key, "refusing to cache message with no answers");
            return false;
        };

        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity {
            info!(key = %key, capacity = self.capacity, "cache at capacity, refusing insert");
            return false;
        }
        if entries.contains_key(&key) {
            info!(key = %key, "cache entry already exists, refusing insert");
            return false;
        }

        let expiry_epoch = if min_answer_ttl == 0 {
            0
        } else {
            now_epoch() + min_answer_ttl.max(self.min_ttl) as i64
        };

        trace!(key = %key, expiry_epoch, "inserted cache entry");
        entries.insert(
            key,
            CacheEntry {
                expiry_epoch,
                hits: 0,
                value,
            },
        );
        true
    }

    /// Builds a single-RR answer message for `name`/`rtype` and inserts it
    /// under that pair's normative fingerprint, for config-file seeding.
    pub fn insert_synthetic(&self, name: &str, ip: &str, rtype: DnsType, ttl: u32) -> bool {
        let name = fqdn(name);
        let Some(key) = fingerprint(&name, rtype) else {
            return false;
        };
        match synthetic_message(&name, ip, rtype, ttl) {
            Some(message) => self.insert(key, message),
            None => false,
        }
    }

    /// As [`Cache::insert_synthetic`], but inserts under an explicit,
    /// caller-chosen key rather than one derived from `name` — the admin
    /// surface's `/cache/insert` takes `key` as its own parameter, separate
    /// from the record it describes (the original program's `InsertFromParams`
    /// shape).
    pub fn insert_at(&self, key: &str, name: &str, ip: &str, rtype: DnsType, ttl: u32) -> bool {
        match synthetic_message(&fqdn(name), ip, rtype, ttl) {
            Some(message) => self.insert(key.to_string(), message),
            None => false,
        }
    }

    /// On hit, increments the access counter and returns a copy of the
    /// stored message. The counter mutation is visible to later
    /// `get_entry` observers under the same lock.
    pub fn get(&self, key: &str) -> Option<DnsMessage> {
        let mut entries = self.entries.lock();
        let entry = entries.get_mut(key)?;
        entry.hits += 1;
        Some(entry.value.clone())
    }

    /// Side-effect-free snapshot of one entry, used by the admin surface.
    pub fn get_entry(&self, key: &str) -> Option<CacheEntry> {
        self.entries.lock().get(key).cloned()
    }

    pub fn delete(&self, key: &str) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    /// A consistent enumeration of every live entry, for the admin surface
    /// and the HTML view.
    pub fn snapshot(&self) -> Vec<(String, CacheEntry)> {
        self.entries
            .lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn sweep(&self) {
        let now = now_epoch();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.expiry_epoch == 0 || entry.expiry_epoch > now);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, remaining = entries.len(), "swept expired cache entries");
        }
    }

    /// Spawns the periodic eviction task. Exits at the next tick after
    /// `shutdown` fires — a missed final sweep is acceptable, a leaked timer
    /// is not (spec.md §9).
    pub fn spawn_sweeper(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        let interval = Duration::from_secs(self.flush_interval.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => self.sweep(),
                    _ = shutdown.recv() => {
                        info!("cache sweeper shutting down");
                        break;
                    }
                }
            }
        })
    }
}

fn synthetic_message(name: &str, ip: &str, rtype: DnsType, ttl: u32) -> Option<DnsMessage> {
    let record = match rtype {
        DnsType::A => DnsRecord::new_a(name, ip.parse::<Ipv4Addr>().ok()?, ttl),
        DnsType::Aaaa => DnsRecord::new_aaaa(name, ip.parse::<Ipv6Addr>().ok()?, ttl),
        DnsType::Other(_) => return None,
    };

    let question = DnsQuestion {
        name: name.to_string(),
        qtype: rtype,
        qclass: DnsClass::In,
    };
    Some(DnsMessage {
        header: DnsHeader {
            qr: true,
            rd: true,
            ra: true,
            qdcount: 1,
            ancount: 1,
            ..Default::default()
        },
        questions: vec![question],
        answers: vec![record],
        authorities: Vec::new(),
        additional: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::DnsRecord;
    use std::net::Ipv4Addr;

    fn msg_with_ttl(ttl: u32) -> DnsMessage {
        let mut msg = DnsMessage::new_query(1, vec![DnsQuestion {
            name: "a.bg.".into(),
            qtype: DnsType::A,
            qclass: DnsClass::In,
        }]);
        msg.header.qr = true;
        msg.answers
            .push(DnsRecord::new_a("a.bg.", Ipv4Addr::new(1, 2, 3, 4), ttl));
        msg
    }

    #[test]
    fn insert_rejects_empty_answers() {
        let cache = Cache::new(10, 0, 60, Policy::Default);
        let empty = DnsMessage::new_query(1, vec![]);
        assert!(!cache.insert("x".into(), empty));
    }

    #[test]
    fn capacity_refusal_keeps_existing_entry() {
        let cache = Cache::new(1, 0, 60, Policy::Default);
        assert!(cache.insert("a.bg.A.".into(), msg_with_ttl(300)));
        assert!(!cache.insert("b.bg.A.".into(), msg_with_ttl(300)));
        assert_eq!(cache.len(), 1);
        assert!(cache.get_entry("a.bg.A.").is_some());
    }

    #[test]
    fn duplicate_key_refused() {
        let cache = Cache::new(10, 0, 60, Policy::Default);
        assert!(cache.insert("a.bg.A.".into(), msg_with_ttl(300)));
        assert!(!cache.insert("a.bg.A.".into(), msg_with_ttl(300)));
    }

    #[test]
    fn min_ttl_floor_applies() {
        let cache = Cache::new(10, 60, 60, Policy::Default);
        let before = now_epoch();
        cache.insert("a.bg.A.".into(), msg_with_ttl(10));
        let entry = cache.get_entry("a.bg.A.").unwrap();
        assert!(entry.expiry_epoch >= before + 60);
    }

    #[test]
    fn zero_ttl_is_permanent() {
        let cache = Cache::new(10, 0, 60, Policy::Default);
        cache.insert("a.bg.A.".into(), msg_with_ttl(0));
        let entry = cache.get_entry("a.bg.A.").unwrap();
        assert_eq!(entry.expiry_epoch, 0);
    }

    #[test]
    fn hit_counter_increments_and_is_visible() {
        let cache = Cache::new(10, 0, 60, Policy::Default);
        cache.insert("a.bg.A.".into(), msg_with_ttl(300));
        assert!(cache.get("a.bg.A.").is_some());
        assert!(cache.get("a.bg.A.").is_some());
        assert_eq!(cache.get_entry("a.bg.A.").unwrap().hits, 2);
    }

    #[test]
    fn delete_is_idempotent_after_first_call() {
        let cache = Cache::new(10, 0, 60, Policy::Default);
        cache.insert("a.bg.A.".into(), msg_with_ttl(300));
        assert!(cache.delete("a.bg.A."));
        assert!(!cache.delete("a.bg.A."));
    }

    #[test]
    fn sweep_removes_only_expired() {
        let cache = Cache::new(10, 0, 60, Policy::Default);
        cache.insert("permanent.A.".into(), msg_with_ttl(0));
        cache.insert("short.A.".into(), msg_with_ttl(1));
        {
            let mut entries = cache.entries.lock();
            entries.get_mut("short.A.").unwrap().expiry_epoch = now_epoch() - 1;
        }
        cache.sweep();
        assert!(cache.get_entry("permanent.A.").is_some());
        assert!(cache.get_entry("short.A.").is_none());
    }

    #[test]
    fn insert_synthetic_round_trips() {
        let cache = Cache::new(10, 0, 60, Policy::Default);
        assert!(cache.insert_synthetic("a.bg", "1.2.3.4", DnsType::A, 120));
        let msg = cache.get("a.bg.A.").unwrap();
        assert_eq!(msg.answers.len(), 1);
        assert_eq!(msg.answers[0].ttl, 120);
    }
}
