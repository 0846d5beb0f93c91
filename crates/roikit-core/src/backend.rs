//! Region store interface
//!
//! The regions subsystem never talks to the image server itself. Hosts
//! implement [`RegionsBackend`] to persist batches and fetch ROI listings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::PersistenceError;
use crate::region::ShapeId;

/// Body of a persistence request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistRequest {
    #[serde(rename = "imageId")]
    pub image_id: i64,
    /// Serialized batch as produced by the region collection
    pub rois: serde_json::Value,
}

/// Body of a persistence response
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersistResponse {
    /// Temporary (or old) id to the id assigned by the server
    #[serde(default)]
    pub ids: BTreeMap<ShapeId, ShapeId>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl PersistResponse {
    /// Parses a raw response body.
    pub fn from_json(body: &str) -> Result<Self, PersistenceError> {
        serde_json::from_str(body).map_err(|e| PersistenceError::MalformedResponse {
            reason: e.to_string(),
        })
    }
}

/// Asynchronous region store
#[async_trait]
pub trait RegionsBackend: Send + Sync {
    /// Sends a batch of changed shapes to the server
    async fn persist_rois(&self, request: &PersistRequest)
        -> Result<PersistResponse, PersistenceError>;

    /// Fetches the ROI listing of an image in wire JSON
    async fn fetch_rois(&self, image_id: i64) -> Result<Vec<serde_json::Value>, PersistenceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parsing() {
        let response =
            PersistResponse::from_json(r#"{"ids": {"-1:-3": "8:21"}, "errors": []}"#)
                .expect("valid response");
        assert_eq!(
            response.ids.get(&ShapeId::new(-1, -3)),
            Some(&ShapeId::new(8, 21))
        );
        assert!(response.errors.is_empty());
    }

    #[test]
    fn test_response_missing_fields_default() {
        let response = PersistResponse::from_json("{}").expect("valid response");
        assert!(response.ids.is_empty());
    }

    #[test]
    fn test_response_garbage_is_malformed() {
        assert!(matches!(
            PersistResponse::from_json("not json"),
            Err(PersistenceError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_request_uses_wire_names() {
        let request = PersistRequest {
            image_id: 5,
            rois: serde_json::json!({"count": 0}),
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["imageId"], 5);
        assert_eq!(json["rois"]["count"], 0);
    }
}
