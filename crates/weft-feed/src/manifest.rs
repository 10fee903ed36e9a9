//! Persisted feed manifest

use serde::{Deserialize, Serialize};

/// Type tag of the append-only feed
pub const FEED_TYPE: &str = "feed";

/// Persisted descriptor of a governed feed
///
/// The `accessController` field is the object-store path of the controller
/// manifest; resolving it is how an opening peer reconstructs the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedManifest {
    /// Feed name, the final path segment of its address
    pub name: String,
    /// Log type tag
    #[serde(rename = "type")]
    pub log_type: String,
    /// Object-store path of the controller manifest
    #[serde(rename = "accessController")]
    pub access_controller: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_access::manifest_path;
    use weft_core::Cid;

    #[test]
    fn test_wire_shape() {
        let manifest = FeedManifest {
            name: "AABB".to_string(),
            log_type: FEED_TYPE.to_string(),
            access_controller: manifest_path(&Cid::for_bytes(b"controller")),
        };

        let value = serde_json::to_value(&manifest).unwrap();
        assert_eq!(value["name"], "AABB");
        assert_eq!(value["type"], "feed");
        assert!(value["accessController"]
            .as_str()
            .unwrap()
            .starts_with("/ipfs/"));

        let back: FeedManifest = serde_json::from_value(value).unwrap();
        assert_eq!(back, manifest);
    }
}
