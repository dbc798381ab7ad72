/// One intersection observation of the tracked region.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IntersectionSample {
    pub is_intersecting: bool,
    /// Visible fraction of the region's area, `0..=1`.
    pub ratio: f64,
}

impl IntersectionSample {
    /// Sample for a region showing `ratio` of its area.
    pub fn with_ratio(ratio: f64) -> Self {
        Self {
            is_intersecting: ratio > 0.0,
            ratio,
        }
    }

    pub fn hidden() -> Self {
        Self {
            is_intersecting: false,
            ratio: 0.0,
        }
    }
}

/// Whether the host can observe viewport intersection at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObserverSupport {
    #[default]
    Available,
    /// No observation mechanism; the tracker reports "not in view" forever.
    Unsupported,
}

/// Thresholded view of intersection updates.
///
/// Emits only transitions of `in_view`, so repeated observations on the same side of the
/// threshold are no-ops downstream.
#[derive(Clone, Debug)]
pub struct VisibilityTracker {
    threshold: f64,
    support: ObserverSupport,
    registered: bool,
    in_view: bool,
}

impl VisibilityTracker {
    pub fn new(threshold: f64, support: ObserverSupport) -> Self {
        Self {
            threshold,
            support,
            registered: false,
            in_view: false,
        }
    }

    /// Register the observer. Without support this stays unregistered.
    pub fn mount(&mut self) {
        self.registered = self.support == ObserverSupport::Available;
        if !self.registered {
            tracing::debug!("intersection observer unavailable; region treated as out of view");
        }
    }

    /// Deregister. Returns `Some(false)` if the region was in view.
    pub fn unmount(&mut self) -> Option<bool> {
        self.registered = false;
        if self.in_view {
            self.in_view = false;
            return Some(false);
        }
        None
    }

    /// Feed one observation; returns the new `in_view` value when it changed.
    pub fn observe(&mut self, sample: IntersectionSample) -> Option<bool> {
        if !self.registered {
            return None;
        }
        // NaN ratios compare false and count as not visible.
        let next = sample.is_intersecting && sample.ratio >= self.threshold;
        if next == self.in_view {
            return None;
        }
        self.in_view = next;
        Some(next)
    }

    pub fn in_view(&self) -> bool {
        self.in_view
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reveal/visibility.rs"]
mod tests;
