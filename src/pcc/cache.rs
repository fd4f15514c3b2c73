//! Bounded FIFO memo of computed robot shapes, keyed by a digest of the
//! geometric parameters.
//!
//! Eviction is strictly insertion-ordered: a lookup hit does not refresh an
//! entry, and re-inserting an existing key replaces the value in place without
//! moving it to the back of the queue.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use serde_json::{Value, json};
use sha2::{Digest, Sha256};

use super::chain::RobotShape;
use super::params::PccParams;

/// Default number of cached shapes.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Hex SHA-256 digest of the canonical JSON form of the five chain inputs.
///
/// The tendon configuration is excluded since it never changes the shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamsHash(String);

impl ParamsHash {
    #[must_use]
    pub fn of(params: &PccParams) -> Self {
        // Keys in lexicographic order so the encoding is stable whatever map
        // implementation serde_json was built with.
        let canonical = json!({
            "backbone_lengths": canonical_floats(&params.backbone_lengths),
            "bending_angles": canonical_floats(&params.bending_angles),
            "coupling_lengths": canonical_floats(&params.coupling_lengths),
            "discretization_steps": params.discretization_steps,
            "rotation_angles": canonical_floats(&params.rotation_angles),
        });
        let digest = Sha256::digest(canonical.to_string().as_bytes());
        Self(hex::encode(digest))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParamsHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// JSON numbers for finite values; `Infinity`, `-Infinity` and `NaN` tokens
/// otherwise, which `json!` would all collapse to `null`.
fn canonical_floats(values: &[f64]) -> Value {
    values
        .iter()
        .map(|&value| {
            if value.is_nan() {
                Value::from("NaN")
            } else if value.is_infinite() {
                Value::from(if value > 0.0 { "Infinity" } else { "-Infinity" })
            } else {
                Value::from(value)
            }
        })
        .collect()
}

/// Shorthand for [`ParamsHash::of`].
#[must_use]
pub fn params_hash(params: &PccParams) -> ParamsHash {
    ParamsHash::of(params)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeCacheOptions {
    pub capacity: usize,
}

impl Default for ShapeCacheOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Cache statistics for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShapeCacheStats {
    pub hits: usize,
    pub misses: usize,
    pub evictions: usize,
    pub entries: usize,
}

#[derive(Debug)]
pub struct ShapeCache {
    entries: HashMap<ParamsHash, RobotShape>,
    order: VecDeque<ParamsHash>,
    capacity: usize,
    hits: usize,
    misses: usize,
    evictions: usize,
}

impl Default for ShapeCache {
    fn default() -> Self {
        Self::with_options(ShapeCacheOptions::default())
    }
}

impl ShapeCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_options(ShapeCacheOptions { capacity })
    }

    #[must_use]
    pub fn with_options(options: ShapeCacheOptions) -> Self {
        Self {
            entries: HashMap::with_capacity(options.capacity),
            order: VecDeque::with_capacity(options.capacity),
            capacity: options.capacity,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Looks up a shape, counting the hit or miss.
    pub fn get(&mut self, key: &ParamsHash) -> Option<&RobotShape> {
        if let Some(shape) = self.entries.get(key) {
            self.hits += 1;
            return Some(shape);
        }
        self.misses += 1;
        None
    }

    #[must_use]
    pub fn contains(&self, key: &ParamsHash) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts a shape, evicting the oldest insertions beyond capacity.
    pub fn insert(&mut self, key: ParamsHash, shape: RobotShape) {
        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = shape;
            return;
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, shape);

        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            self.evictions += 1;
            log::trace!("shape cache evicted {oldest}");
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn stats(&self) -> ShapeCacheStats {
        ShapeCacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            entries: self.entries.len(),
        }
    }
}
