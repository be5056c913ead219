//! Confirmation session store
//!
//! Bridges a user's "buy" message and their later form response. Entries live
//! in process memory only and expire after a maximum age; expired entries are
//! evicted lazily on every create/consume and by [`SessionStore::purge_expired`]
//! which the binary runs on an interval.
//!
//! `consume` removes the entry under the same lock acquisition that finds it,
//! so a duplicated or replayed form response can start the swap flow at most
//! once per session.

use super::intent::PurchaseIntent;
use crate::apis::TokenInfo;
use crate::logger::{self, LogTag};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub struct PendingPurchase {
    pub session_id: String,
    pub requesting_user: String,
    pub origin_channel: String,
    pub amount_usd: Decimal,
    pub token_address: String,
    pub resolved_symbol: Option<String>,
    pub resolved_name: Option<String>,
    pub created_at: Instant,
}

impl PendingPurchase {
    /// Display label such as `**Degen ($DEGEN)**`, if the token was resolved
    pub fn token_label(&self) -> Option<String> {
        match (&self.resolved_name, &self.resolved_symbol) {
            (Some(name), Some(symbol)) => Some(format!("**{} (${})**", name, symbol)),
            _ => None,
        }
    }
}

pub struct SessionStore {
    sessions: Mutex<HashMap<String, PendingPurchase>>,
    max_age: Duration,
    sequence: AtomicU64,
}

impl SessionStore {
    pub fn new(max_age: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_age,
            sequence: AtomicU64::new(0),
        }
    }

    /// Store a pending purchase and return its session id
    pub fn create(
        &self,
        intent: &PurchaseIntent,
        user_id: &str,
        channel_id: &str,
        token_info: Option<&TokenInfo>,
    ) -> String {
        let session_id = self.next_session_id(user_id);
        let pending = PendingPurchase {
            session_id: session_id.clone(),
            requesting_user: user_id.to_string(),
            origin_channel: channel_id.to_string(),
            amount_usd: intent.amount_usd,
            token_address: intent.token_address.clone(),
            resolved_symbol: token_info.map(|info| info.symbol.clone()),
            resolved_name: token_info.map(|info| info.name.clone()),
            created_at: Instant::now(),
        };

        let mut sessions = self.sessions.lock();
        Self::evict_expired(&mut sessions, self.max_age);
        sessions.insert(session_id.clone(), pending);

        logger::debug(
            LogTag::Sessions,
            &format!("Session {} created ({} pending)", session_id, sessions.len()),
        );

        session_id
    }

    /// Take the pending purchase for `session_id`, at most once
    pub fn consume(&self, session_id: &str) -> Option<PendingPurchase> {
        let mut sessions = self.sessions.lock();
        Self::evict_expired(&mut sessions, self.max_age);
        sessions.remove(session_id)
    }

    /// Take the pending purchase only when `user_id` is the one who requested it
    ///
    /// A response from another user leaves the session in place.
    pub fn consume_for_user(&self, session_id: &str, user_id: &str) -> Option<PendingPurchase> {
        let mut sessions = self.sessions.lock();
        Self::evict_expired(&mut sessions, self.max_age);

        match sessions.get(session_id) {
            Some(pending) if pending.requesting_user.eq_ignore_ascii_case(user_id) => {
                sessions.remove(session_id)
            }
            Some(_) => {
                logger::warning(
                    LogTag::Sessions,
                    &format!(
                        "Session {} answered by {} who did not request it",
                        session_id, user_id
                    ),
                );
                None
            }
            None => None,
        }
    }

    /// Drop a session without acting on it
    pub fn discard(&self, session_id: &str) -> bool {
        self.sessions.lock().remove(session_id).is_some()
    }

    /// Evict expired sessions, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.lock();
        let evicted = Self::evict_expired(&mut sessions, self.max_age);
        if evicted > 0 {
            logger::debug(
                LogTag::Sessions,
                &format!("Evicted {} expired sessions ({} pending)", evicted, sessions.len()),
            );
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    fn next_session_id(&self, user_id: &str) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("buy-{}-{}-{}", millis, sequence, user_id)
    }

    fn evict_expired(sessions: &mut HashMap<String, PendingPurchase>, max_age: Duration) -> usize {
        let before = sessions.len();
        sessions.retain(|_, pending| pending.created_at.elapsed() < max_age);
        before - sessions.len()
    }
}
