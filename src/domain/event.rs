//! Atom feed event as handed over by the feed client

use super::ids::ResourcePath;
use super::{BridgeError, Result};
use serde::{Deserialize, Serialize};

/// A single entry read from an OpenELIS atom feed
///
/// Delivery, ordering and retries are owned by the feed client; workers only
/// see one event at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEvent {
    /// Feed entry id
    pub id: String,

    /// Relative path of the changed resource
    pub content: String,

    /// Entry title
    #[serde(default)]
    pub title: String,

    /// Uri of the feed page the entry came from
    #[serde(default)]
    pub feed_uri: String,
}

impl FeedEvent {
    /// Creates a new feed event
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        title: impl Into<String>,
        feed_uri: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            title: title.into(),
            feed_uri: feed_uri.into(),
        }
    }

    /// Validated resource path of the event content
    pub fn resource_path(&self) -> Result<ResourcePath> {
        ResourcePath::new(self.content.as_str()).map_err(|e| {
            BridgeError::Validation(format!("Feed event {} has bad content: {e}", self.id))
        })
    }
}
