//! Context fragments and the change records the pool emits.

use chrono::{DateTime, Utc};
use ephemera_core::presentation::{FragmentId, FragmentPosition, FragmentView, RemovalReason};

/// A transient piece of contextual text.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub(crate) id: FragmentId,
    pub(crate) text: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) opacity: f64,
    pub(crate) fading: bool,
    pub(crate) position: FragmentPosition,
}

impl Fragment {
    /// Fragment identifier.
    #[must_use]
    pub fn id(&self) -> FragmentId {
        self.id
    }

    /// Fragment text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// When the fragment entered the pool.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Current opacity.
    #[must_use]
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Whether the fragment has started to fade.
    #[must_use]
    pub fn is_fading(&self) -> bool {
        self.fading
    }

    /// Where the fragment sits on the context layer.
    #[must_use]
    pub fn position(&self) -> FragmentPosition {
        self.position
    }

    /// Whether the fragment is bright enough to count as visible context.
    #[must_use]
    pub fn is_visible_above(&self, threshold: f64) -> bool {
        self.opacity > threshold
    }

    pub(crate) fn view(&self) -> FragmentView {
        FragmentView {
            id: self.id,
            text: self.text.clone(),
            position: self.position,
            opacity: self.opacity,
        }
    }
}

/// A pool mutation waiting to be projected onto the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum FragmentChange {
    /// A fragment entered the pool.
    Added(FragmentView),
    /// A fading fragment lost opacity.
    Faded {
        /// The fragment.
        id: FragmentId,
        /// Its new opacity.
        opacity: f64,
    },
    /// A fragment left the pool.
    Removed {
        /// The fragment.
        id: FragmentId,
        /// Why it left.
        reason: RemovalReason,
    },
}
