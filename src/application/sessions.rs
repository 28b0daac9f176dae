//! Server-side session store backing the login cookie.
//!
//! Tokens look like `cs_<prefix>_<secret>`. Only the SHA-256 of the secret is
//! kept, keyed by the prefix, and comparisons are constant time. Expired
//! entries are evicted when they are looked up and swept on every issue.

use std::time::Duration;

use dashmap::DashMap;
use metrics::counter;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use time::OffsetDateTime;
use uuid::Uuid;

const TOKEN_PREFIX: &str = "cs";
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
struct SessionEntry {
    user_id: Uuid,
    hashed_secret: Vec<u8>,
    expires_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: OffsetDateTime,
}

#[derive(Debug)]
pub struct SessionStore {
    entries: DashMap<String, SessionEntry>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user_id: Uuid) -> IssuedSession {
        let prefix = Uuid::new_v4().simple().to_string()[..12].to_string();
        let secret = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let now = OffsetDateTime::now_utc();
        let expires_at = now + self.ttl;

        self.sweep_expired(now);
        self.entries.insert(
            prefix.clone(),
            SessionEntry {
                user_id,
                hashed_secret: hash_secret(&secret),
                expires_at,
            },
        );
        counter!("coursehub_sessions_issued_total").increment(1);

        IssuedSession {
            token: format!("{TOKEN_PREFIX}_{prefix}_{secret}"),
            expires_at,
        }
    }

    /// Resolve a token to the user it was issued for.
    pub fn resolve(&self, token: &str) -> Option<Uuid> {
        let (prefix, secret) = parse_token(token)?;
        let now = OffsetDateTime::now_utc();

        let entry = self.entries.get(prefix)?;
        if entry.expires_at <= now {
            drop(entry);
            self.entries.remove(prefix);
            counter!("coursehub_sessions_expired_total").increment(1);
            return None;
        }

        let hashed = hash_secret(secret);
        if entry.hashed_secret.ct_eq(&hashed).unwrap_u8() == 0 {
            return None;
        }
        Some(entry.user_id)
    }

    fn sweep_expired(&self, now: OffsetDateTime) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        let evicted = u64::try_from(before.saturating_sub(self.entries.len())).unwrap_or(u64::MAX);
        if evicted > 0 {
            counter!("coursehub_sessions_expired_total").increment(evicted);
        }
    }

    /// Drop the session behind `token`; returns whether one existed.
    pub fn revoke(&self, token: &str) -> bool {
        let Some((prefix, secret)) = parse_token(token) else {
            return false;
        };
        let hashed = hash_secret(secret);
        self.entries
            .remove_if(prefix, |_, entry| {
                entry.hashed_secret.ct_eq(&hashed).unwrap_u8() == 1
            })
            .is_some()
    }

    /// Drop every session of a user, e.g. after the account is deactivated.
    pub fn revoke_user(&self, user_id: Uuid) {
        self.entries.retain(|_, entry| entry.user_id != user_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn hash_secret(secret: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.finalize().to_vec()
}

fn parse_token(token: &str) -> Option<(&str, &str)> {
    let mut parts = token.splitn(3, '_');
    if parts.next()? != TOKEN_PREFIX {
        return None;
    }
    let prefix = parts.next()?;
    let secret = parts.next()?;
    if prefix.is_empty() || secret.len() < MIN_SECRET_LEN {
        return None;
    }
    Some((prefix, secret))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_resolves_to_user() {
        let store = SessionStore::new(Duration::from_secs(60));
        let user = Uuid::new_v4();
        let issued = store.issue(user);

        assert!(issued.token.starts_with("cs_"));
        assert_eq!(store.resolve(&issued.token), Some(user));
    }

    #[test]
    fn tampered_secret_is_rejected() {
        let store = SessionStore::new(Duration::from_secs(60));
        let issued = store.issue(Uuid::new_v4());
        let mut tampered = issued.token.clone();
        tampered.pop();
        tampered.push('x');

        assert_eq!(store.resolve(&tampered), None);
        assert_eq!(store.resolve("garbage"), None);
    }

    #[test]
    fn expired_sessions_are_evicted_on_lookup() {
        let store = SessionStore::new(Duration::ZERO);
        let issued = store.issue(Uuid::new_v4());

        assert_eq!(store.resolve(&issued.token), None);
        assert!(store.is_empty());
    }

    #[test]
    fn issuing_sweeps_abandoned_sessions() {
        let store = SessionStore::new(Duration::from_millis(1));
        for _ in 0..100 {
            store.issue(Uuid::new_v4());
        }
        std::thread::sleep(Duration::from_millis(20));

        store.issue(Uuid::new_v4());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn revoke_removes_only_matching_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        let user = Uuid::new_v4();
        let first = store.issue(user);
        let second = store.issue(user);

        assert!(store.revoke(&first.token));
        assert!(!store.revoke(&first.token));
        assert_eq!(store.resolve(&second.token), Some(user));

        store.revoke_user(user);
        assert!(store.is_empty());
    }
}
