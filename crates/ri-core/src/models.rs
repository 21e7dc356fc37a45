//! # Domain Models
//!
//! These structs represent the core entities of Rusty-Illust.
//! We use UUID v7 for time-ordered, globally unique identification.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// A published illustration: one user-visible record referencing a set of
/// content-addressed images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Illustration {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub caption: String,
    pub is_public: bool,
    pub allow_comments: bool,
    /// Content hashes of the images belonging to this illustration.
    /// A set by design: two identical uploads collapse to one entry.
    /// Immutable after creation — there is no edit path.
    pub hashes: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

/// The submission payload for a new illustration, before any image has
/// been decoded. `images` holds data-URI-encoded payloads as received.
#[derive(Debug, Clone, Deserialize)]
pub struct NewIllustration {
    pub author_id: Uuid,
    pub title: String,
    pub caption: String,
    pub is_public: bool,
    pub allow_comments: bool,
    pub images: Vec<String>,
}

/// A width/height (or x/y offset) pair on the pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Extent {
    pub x: u32,
    pub y: u32,
}

impl Extent {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// A square extent, used for crop regions and thumbnail targets.
    pub fn square(side: u32) -> Self {
        Self { x: side, y: side }
    }
}

/// The message handed to the scaling worker: everything it needs to fetch
/// the original by hash, crop it, and produce each target size.
///
/// Field names are part of the wire contract with the worker — camelCase,
/// self-describing JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingTask {
    pub hash: String,
    pub crop_position: Extent,
    pub crop_size: Extent,
    /// Target sizes strictly smaller than the crop. May be empty: an image
    /// already smaller than every target needs no downscaling.
    pub scales: BTreeSet<Extent>,
}
