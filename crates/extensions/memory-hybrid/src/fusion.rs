//! Result fusion algorithms.

use std::collections::HashMap;

/// Configuration for result fusion.
#[derive(Debug, Clone)]
pub struct FusionConfig {
    /// Weight for vector results (0.0 - 1.0).
    /// Keyword results get weight (1.0 - alpha).
    pub alpha: f32,
    /// RRF parameter k (typically 60).
    pub k: f32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            k: 60.0,
        }
    }
}

impl FusionConfig {
    /// Weighted config with the standard `k`; `alpha` is clamped into `[0, 1]`.
    pub fn with_alpha(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..Self::default()
        }
    }

    /// Create config favoring vector (semantic) results.
    pub fn favor_semantic() -> Self {
        Self::with_alpha(0.7)
    }

    /// Create config favoring keyword results.
    pub fn favor_keyword() -> Self {
        Self::with_alpha(0.3)
    }
}

/// Reciprocal Rank Fusion (RRF) over two ranked lists.
///
/// Each item scores `weight / (k + rank)` per list it appears in (rank starts at 1),
/// with `alpha` weighting the vector list and `1 - alpha` the keyword list. Output is
/// sorted by descending score; equal scores keep first-seen order, vector list first.
pub fn rrf_fusion(
    vector_results: &[String],
    keyword_results: &[String],
    config: &FusionConfig,
) -> Vec<(String, f32)> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut fused: Vec<(String, f32)> = Vec::new();

    let weighted = [
        (vector_results, config.alpha),
        (keyword_results, 1.0 - config.alpha),
    ];
    for (list, weight) in weighted {
        for (rank, item) in list.iter().enumerate() {
            let score = weight / (config.k + rank as f32 + 1.0);
            match slots.get(item.as_str()) {
                Some(&slot) => fused[slot].1 += score,
                None => {
                    slots.insert(item.as_str(), fused.len());
                    fused.push((item.clone(), score));
                }
            }
        }
    }

    // Stable sort keeps first-seen order among ties.
    fused.sort_by(|a, b| b.1.total_cmp(&a.1));
    fused
}

#[cfg(test)]
#[path = "fusion_tests.rs"]
mod tests;
