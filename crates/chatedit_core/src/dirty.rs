//! Modification tracking: a cheap flag or an exact content hash.

use crate::line_store::LineStore;
use serde::Deserialize;

/// How a buffer decides whether its content changed since load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirtyPolicy {
    /// Any edit marks the buffer modified, even one later undone.
    Fast,
    /// Compare a content hash against the baseline captured at load.
    Accurate,
    /// `Fast` above `fast_dirty_threshold` bytes at load, else `Accurate`.
    #[default]
    Auto,
}

impl DirtyPolicy {
    /// Concrete policy for content of `len_bytes` bytes.
    pub fn resolve(self, len_bytes: usize, fast_threshold: usize) -> Self {
        match self {
            Self::Auto if len_bytes > fast_threshold => Self::Fast,
            Self::Auto => Self::Accurate,
            other => other,
        }
    }
}

/// Hash rope chunks without materialising the whole text.
pub(crate) fn hash_chunks<'a, I>(chunks: I) -> blake3::Hash
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hasher = blake3::Hasher::new();
    for chunk in chunks {
        hasher.update(chunk.as_bytes());
    }
    hasher.finalize()
}

#[derive(Debug, Clone)]
enum Baseline {
    Flag(bool),
    Hash(blake3::Hash),
}

/// Per-buffer modification state.
#[derive(Debug, Clone)]
pub struct DirtyTracker {
    baseline: Baseline,
}

impl DirtyTracker {
    /// Start clean against the current content of `lines`.
    ///
    /// `policy` must already be resolved; `Auto` is treated as `Accurate`.
    pub fn new(policy: DirtyPolicy, lines: &LineStore) -> Self {
        let baseline = match policy {
            DirtyPolicy::Fast => Baseline::Flag(false),
            DirtyPolicy::Accurate | DirtyPolicy::Auto => {
                Baseline::Hash(hash_chunks(lines.chunks()))
            }
        };
        Self { baseline }
    }

    pub fn policy(&self) -> DirtyPolicy {
        match self.baseline {
            Baseline::Flag(_) => DirtyPolicy::Fast,
            Baseline::Hash(_) => DirtyPolicy::Accurate,
        }
    }

    /// Record that an edit happened. Only meaningful for the flag policy.
    pub fn mark_dirty(&mut self) {
        if let Baseline::Flag(dirty) = &mut self.baseline {
            *dirty = true;
        }
    }

    /// Treat the current content as the new baseline.
    pub fn mark_clean(&mut self, lines: &LineStore) {
        self.baseline = match self.baseline {
            Baseline::Flag(_) => Baseline::Flag(false),
            Baseline::Hash(_) => Baseline::Hash(hash_chunks(lines.chunks())),
        };
    }

    /// Whether `lines` differs from the baseline. The hash policy rehashes
    /// on every call.
    pub fn is_modified(&self, lines: &LineStore) -> bool {
        match &self.baseline {
            Baseline::Flag(dirty) => *dirty,
            Baseline::Hash(baseline) => hash_chunks(lines.chunks()) != *baseline,
        }
    }
}
