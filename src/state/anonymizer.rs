//! Anonymous display labels.
//!
//! Every (session, scope) pair gets a label such as `AnonQZK`. Scopes are
//! channels plus one private-message scope per recipient. Labels are drawn
//! at random from `A..=Z` suffixes, are unique inside their scope, and are
//! independent across scopes. There is no reverse index from label to
//! session outside the scope that issued it.

use crate::config::{AnonymityConfig, RejoinPolicy};
use crate::state::SessionId;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};

const LETTERS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Longest suffix the anonymizer will widen to.
pub const MAX_SUFFIX_LEN: usize = 8;

/// Random draws per width before widening.
const DRAWS_PER_WIDTH: usize = 16;

/// Labels issued within one scope.
#[derive(Debug, Default)]
pub struct LabelCache {
    assigned: HashMap<SessionId, String>,
    in_use: HashSet<String>,
    /// Labels of departed sessions, kept for [`RejoinPolicy::Reuse`].
    parked: HashMap<SessionId, String>,
}

impl LabelCache {
    pub fn get(&self, id: SessionId) -> Option<&str> {
        self.assigned.get(&id).map(String::as_str)
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.assigned.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SessionId, &str)> {
        self.assigned.iter().map(|(id, label)| (*id, label.as_str()))
    }

    pub fn ids(&self) -> impl Iterator<Item = SessionId> + '_ {
        self.assigned.keys().copied()
    }

    /// Linear scan for the holder of `label`. Only used for targeting
    /// inside the scope; the result is never shown to anyone.
    pub fn find(&self, label: &str) -> Option<SessionId> {
        self.assigned
            .iter()
            .find(|(_, l)| anonirc_proto::irc_eq(l, label))
            .map(|(id, _)| *id)
    }

    /// Remove every trace of `id`, parked label included.
    pub fn forget(&mut self, id: SessionId) {
        if let Some(label) = self.assigned.remove(&id) {
            self.in_use.remove(&label);
        }
        self.parked.remove(&id);
    }

    fn insert(&mut self, id: SessionId, label: String) -> String {
        self.in_use.insert(label.clone());
        self.assigned.insert(id, label.clone());
        label
    }
}

/// Issues labels from a single RNG seeded at startup.
pub struct Anonymizer {
    rng: Mutex<StdRng>,
    prefix: String,
    suffix_len: usize,
    rejoin: RejoinPolicy,
}

impl Anonymizer {
    /// Deterministic anonymizer, for tests.
    pub fn new(seed: u64, config: &AnonymityConfig) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), config)
    }

    /// Anonymizer seeded from the OS entropy source.
    pub fn from_entropy(config: &AnonymityConfig) -> Self {
        Self::with_rng(StdRng::from_entropy(), config)
    }

    fn with_rng(rng: StdRng, config: &AnonymityConfig) -> Self {
        Self {
            rng: Mutex::new(rng),
            prefix: config.label_prefix.clone(),
            suffix_len: config.suffix_len.clamp(1, MAX_SUFFIX_LEN),
            rejoin: config.rejoin,
        }
    }

    /// The label of `id` in `cache`, issuing one if it has none yet.
    pub fn label_for(&self, cache: &mut LabelCache, id: SessionId) -> String {
        if let Some(label) = cache.assigned.get(&id) {
            return label.clone();
        }

        if let Some(parked) = cache.parked.remove(&id)
            && !cache.in_use.contains(&parked)
        {
            return cache.insert(id, parked);
        }

        let label = self.draw(&cache.in_use);
        cache.insert(id, label)
    }

    /// Drop the binding for `id`. Under [`RejoinPolicy::Reuse`] the label is
    /// parked so the same session can get it back.
    pub fn release(&self, cache: &mut LabelCache, id: SessionId) -> Option<String> {
        let label = cache.assigned.remove(&id)?;
        cache.in_use.remove(&label);
        if self.rejoin == RejoinPolicy::Reuse {
            cache.parked.insert(id, label.clone());
        }
        Some(label)
    }

    fn draw(&self, in_use: &HashSet<String>) -> String {
        let mut rng = self.rng.lock();
        let mut width = self.suffix_len;

        loop {
            // keep the scope at most half full so draws stay cheap
            let capacity = 26usize.saturating_pow(width as u32);
            let crowded = in_use.len().saturating_mul(2) >= capacity;

            if !crowded || width == MAX_SUFFIX_LEN {
                let attempts = if width == MAX_SUFFIX_LEN {
                    usize::MAX
                } else {
                    DRAWS_PER_WIDTH
                };
                for _ in 0..attempts {
                    let label = self.candidate(&mut rng, width);
                    if !in_use.contains(&label) {
                        return label;
                    }
                }
            }

            width += 1;
        }
    }

    fn candidate(&self, rng: &mut StdRng, width: usize) -> String {
        let mut label = String::with_capacity(self.prefix.len() + width);
        label.push_str(&self.prefix);
        for _ in 0..width {
            label.push(LETTERS[rng.gen_range(0..LETTERS.len())] as char);
        }
        label
    }
}
