//! Client identity pool and rotation

use crate::ConfigError;
use rand::Rng;

/// Browser user agents used when no identities are configured
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    // Chrome - Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36",
    // Chrome - Mac
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_14_6) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    // Chrome - Linux
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    // Firefox
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
    // Edge
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
    // Safari
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    // Mobile
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 14; SM-S918B) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.210 Mobile Safari/537.36",
];

/// A non-empty set of client identity strings
#[derive(Debug, Clone)]
pub struct IdentityPool {
    identities: Vec<String>,
}

impl IdentityPool {
    /// Creates a pool from the given identities
    ///
    /// Blank entries are dropped; a pool left empty is a configuration error.
    pub fn new(identities: Vec<String>) -> Result<Self, ConfigError> {
        let identities: Vec<String> = identities
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if identities.is_empty() {
            return Err(ConfigError::Validation(
                "identity pool cannot be empty".to_string(),
            ));
        }

        Ok(Self { identities })
    }

    /// Picks one identity uniformly at random
    pub fn select(&self) -> &str {
        self.select_with(&mut rand::thread_rng())
    }

    pub fn select_with<R: Rng>(&self, rng: &mut R) -> &str {
        let index = rng.gen_range(0..self.identities.len());
        &self.identities[index]
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.identities.iter().any(|i| i == identity)
    }
}

impl Default for IdentityPool {
    fn default() -> Self {
        Self {
            identities: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Applies a fresh identity every `frequency` requests
#[derive(Debug, Clone)]
pub struct IdentityRotator {
    pool: IdentityPool,
    frequency: u32,
    request_count: u64,
    rotations: u64,
    current: String,
}

impl IdentityRotator {
    /// Creates a rotator; an initial identity is drawn immediately
    pub fn new(pool: IdentityPool, frequency: u32) -> Self {
        let current = pool.select().to_string();
        Self {
            pool,
            frequency: frequency.max(1),
            request_count: 0,
            rotations: 0,
            current,
        }
    }

    /// Counts one request and rotates when the counter hits a multiple of
    /// the frequency. Returns true when a new identity was applied.
    pub fn next_request(&mut self) -> bool {
        self.request_count += 1;

        if self.request_count % u64::from(self.frequency) != 0 {
            return false;
        }

        self.current = self.pool.select().to_string();
        self.rotations += 1;
        tracing::debug!(
            "Rotated identity after {} requests: {}",
            self.request_count,
            self.current
        );
        true
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    pub fn rotations(&self) -> u64 {
        self.rotations
    }

    pub fn pool(&self) -> &IdentityPool {
        &self.pool
    }
}
