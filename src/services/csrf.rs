//! CSRF tokens derived from a rotating secret.
//!
//! A token is `hex(HMAC-SHA256(secret, user))`. Two secret generations are
//! kept, so a token stays valid for at least one and at most two rotation
//! periods.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SECRET_LEN: usize = 64;

struct Secrets {
    current: [u8; SECRET_LEN],
    previous: [u8; SECRET_LEN],
    rotated_at: DateTime<Utc>,
}

fn fresh_secret() -> [u8; SECRET_LEN] {
    let mut secret = [0u8; SECRET_LEN];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}

fn mac(secret: &[u8], user: &str) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(user.as_bytes());
    mac
}

pub struct CsrfService {
    secrets: RwLock<Secrets>,
    period: chrono::Duration,
}

impl CsrfService {
    /// Service with fresh secrets, rotating every `period` starting from `now`
    pub fn new(period: Duration, now: DateTime<Utc>) -> Self {
        Self {
            secrets: RwLock::new(Secrets {
                current: fresh_secret(),
                previous: fresh_secret(),
                rotated_at: now,
            }),
            period: chrono::Duration::from_std(period).unwrap_or(chrono::Duration::days(1)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Secrets> {
        self.secrets.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Secrets> {
        self.secrets.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Token for `user` under the current secret
    pub fn issue(&self, user: &str) -> String {
        hex::encode(mac(&self.read().current, user).finalize().into_bytes())
    }

    /// Accept a token issued under the current or the previous secret
    pub fn validate(&self, user: Option<&str>, token: Option<&str>) -> bool {
        let (Some(user), Some(token)) = (user, token) else {
            return false;
        };
        let Ok(token) = hex::decode(token.trim()) else {
            return false;
        };

        let secrets = self.read();
        let valid = [&secrets.current, &secrets.previous]
            .into_iter()
            .any(|secret| mac(secret, user).verify_slice(&token).is_ok());
        valid
    }

    /// Shift the current secret to previous and draw a new current one
    pub fn rotate(&self, now: DateTime<Utc>) {
        let mut secrets = self.write();
        let current = secrets.current;
        secrets.previous = current;
        secrets.current = fresh_secret();
        secrets.rotated_at = now;
    }

    /// Rotate if a full period has elapsed since the last rotation. Returns whether it did.
    pub fn rotate_if_due(&self, now: DateTime<Utc>) -> bool {
        let due = now - self.read().rotated_at >= self.period;
        if due {
            self.rotate(now);
            tracing::info!("Rotated CSRF secret");
        }
        due
    }

    /// Check for due rotations on a timer for the lifetime of the process
    pub fn spawn_rotation(self: Arc<Self>, tick: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            loop {
                interval.tick().await;
                self.rotate_if_due(Utc::now());
            }
        })
    }
}
