//! Viewport tracking
//!
//! Decides which reel is "the" visible one inside the scroll container.
//! Reels are registered with their geometry in document order; after each
//! settled scroll the tracker computes how much of every reel lies inside
//! the container and reports the first one at or above the threshold.
//!
//! A reel is reported only when it crosses into view, so repeated scroll
//! notifications over the same reel stay silent. Mid-scroll positions where
//! no reel qualifies report nothing, and a reel that leaves the threshold and
//! comes back is reported again.

use tracing::trace;

/// Geometry of one registered reel element, relative to the container content
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservedElement {
    pub index: usize,
    pub offset_top: f64,
    pub height: f64,
}

#[derive(Debug, Clone)]
pub struct ViewportTracker {
    threshold: f64,
    container_height: f64,
    elements: Vec<ObservedElement>,
    reported: Option<usize>,
}

impl ViewportTracker {
    pub fn new(container_height: f64, threshold: f64) -> Self {
        Self {
            threshold,
            container_height,
            elements: Vec::new(),
            reported: None,
        }
    }

    /// Full-viewport reel layout: `count` reels of `item_height` stacked vertically
    pub fn uniform(count: usize, item_height: f64, container_height: f64, threshold: f64) -> Self {
        let mut tracker = Self::new(container_height, threshold);
        for index in 0..count {
            tracker.register(ObservedElement {
                index,
                offset_top: index as f64 * item_height,
                height: item_height,
            });
        }
        tracker
    }

    /// Start observing an element; keeps document order by offset
    pub fn register(&mut self, element: ObservedElement) {
        self.elements.retain(|e| e.index != element.index);
        let at = self
            .elements
            .partition_point(|e| e.offset_top <= element.offset_top);
        self.elements.insert(at, element);
    }

    /// De-register everything (item list changed or view disposed)
    pub fn clear(&mut self) {
        self.elements.clear();
        self.reported = None;
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Scroll position that brings `index` to the top of the container
    pub fn offset_of(&self, index: usize) -> Option<f64> {
        self.elements
            .iter()
            .find(|e| e.index == index)
            .map(|e| e.offset_top)
    }

    /// Fraction of `element` inside the container at `scroll_top`
    fn visible_ratio(&self, element: &ObservedElement, scroll_top: f64) -> f64 {
        if element.height <= 0.0 {
            return 0.0;
        }
        let top = element.offset_top.max(scroll_top);
        let bottom = (element.offset_top + element.height).min(scroll_top + self.container_height);
        ((bottom - top).max(0.0) / element.height).min(1.0)
    }

    /// Report a settled scroll position
    ///
    /// Returns the index that just became visible, if any.
    pub fn observe(&mut self, scroll_top: f64) -> Option<usize> {
        let visible = self
            .elements
            .iter()
            .find(|e| self.visible_ratio(e, scroll_top) >= self.threshold)
            .map(|e| e.index);

        trace!("Scroll at {:.1}: visible {:?}", scroll_top, visible);

        match visible {
            Some(index) if self.reported != Some(index) => {
                self.reported = Some(index);
                Some(index)
            }
            Some(_) => None,
            None => {
                // Nothing qualifies: whatever settles next is a fresh crossing
                self.reported = None;
                None
            }
        }
    }

    /// Last index reported
    pub fn reported(&self) -> Option<usize> {
        self.reported
    }
}
