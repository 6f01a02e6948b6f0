use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::consts::CT_WINDOW_PREFIX;
use crate::error::{NormError, Result};

use super::scheme::{CtWindow, NormalizationScheme};

/// Resolves channel names to normalization schemes.
///
/// Custom CT windows (`ct_to_<lower>_<upper>`) are interned by canonical
/// name: every resolution of the same bounds returns the same `Arc`. Entries
/// live as long as the registry and are never evicted, so one registry is
/// meant to be owned by a single preprocessing run.
#[derive(Debug, Default)]
pub struct SchemeRegistry {
    windows: RwLock<HashMap<String, Arc<CtWindow>>>,
}

impl SchemeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a channel name (any case).
    ///
    /// Fixed names take precedence, then the custom CT window pattern; any
    /// other name falls back to z-score.
    pub fn resolve(&self, channel_name: &str) -> Result<NormalizationScheme> {
        let key = channel_name.to_lowercase();

        if let Some(scheme) = fixed_scheme(&key) {
            debug!(channel = channel_name, scheme = %scheme.name(), "Fixed scheme");
            return Ok(scheme);
        }

        if let Some(window) = parse_ct_window(&key)? {
            let window = self.intern(window);
            debug!(channel = channel_name, scheme = %window.canonical_name(), "CT window scheme");
            return Ok(NormalizationScheme::CtWindow(window));
        }

        debug!(channel = channel_name, "No scheme matched, using z-score");
        Ok(NormalizationScheme::ZScore)
    }

    /// Return the cached window for these bounds, inserting it if absent.
    pub fn intern(&self, window: CtWindow) -> Arc<CtWindow> {
        let name = window.canonical_name();

        if let Some(cached) = self.windows.read().get(&name) {
            return Arc::clone(cached);
        }

        // Another thread may have inserted between the two locks.
        let mut windows = self.windows.write();
        let entry = windows.entry(name).or_insert_with_key(|name| {
            info!(scheme = %name, "Registered custom CT window");
            Arc::new(window)
        });
        Arc::clone(entry)
    }

    /// Number of distinct custom windows resolved so far.
    pub fn len(&self) -> usize {
        self.windows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.read().is_empty()
    }

    /// Canonical names of the cached windows, sorted.
    pub fn cached_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.windows.read().keys().cloned().collect();
        names.sort();
        names
    }
}

fn fixed_scheme(key: &str) -> Option<NormalizationScheme> {
    let scheme = match key {
        "ct" => NormalizationScheme::Ct,
        "nonorm" => NormalizationScheme::NoNorm,
        "zscore" => NormalizationScheme::ZScore,
        "rescale_to_0_1" => NormalizationScheme::RescaleTo01,
        "rgb_to_0_1" => NormalizationScheme::RgbTo01,
        _ => return None,
    };
    Some(scheme)
}

/// Match `ct_to_<lower>_<upper>` where both bounds are optionally negative
/// decimal integers. `Ok(None)` means the name does not follow the pattern.
fn parse_ct_window(key: &str) -> Result<Option<CtWindow>> {
    let Some(rest) = key.strip_prefix(CT_WINDOW_PREFIX) else {
        return Ok(None);
    };
    let Some((lower, upper)) = rest.split_once('_') else {
        return Ok(None);
    };
    if !is_signed_integer(lower) || !is_signed_integer(upper) {
        return Ok(None);
    }

    let lower = parse_bound(lower)?;
    let upper = parse_bound(upper)?;
    CtWindow::new(lower, upper).map(Some)
}

fn is_signed_integer(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn parse_bound(s: &str) -> Result<i64> {
    s.parse::<i64>()
        .map_err(|_| NormError::InvalidCtWindowBound(format!("{s} does not fit in a 64-bit integer")))
}
