use serde::{Deserialize, Serialize};

/// System metadata carried by every Contentful resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sys {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(
        rename = "publishedVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub published_version: Option<u32>,
}

/// A Contentful space.
#[derive(Debug, Clone, Deserialize)]
pub struct Space {
    pub sys: Sys,
    #[serde(default)]
    pub name: Option<String>,
}

/// An environment within a space.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentData {
    pub sys: Sys,
    #[serde(default)]
    pub name: Option<String>,
}

/// A media asset. Field payloads stay schemaless: the management API
/// accepts locale-keyed JSON and callers own the shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub sys: Sys,
    #[serde(default)]
    pub fields: serde_json::Value,
}

/// A content entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub sys: Sys,
    #[serde(default)]
    pub fields: serde_json::Value,
}

/// A sys link referencing another resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub sys: LinkSys,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSys {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "linkType")]
    pub link_type: String,
    pub id: String,
}

impl Link {
    fn new(link_type: &str, id: impl Into<String>) -> Self {
        Self {
            sys: LinkSys {
                kind: "Link".to_string(),
                link_type: link_type.to_string(),
                id: id.into(),
            },
        }
    }

    pub fn asset(id: impl Into<String>) -> Self {
        Self::new("Asset", id)
    }

    pub fn entry(id: impl Into<String>) -> Self {
        Self::new("Entry", id)
    }
}

impl From<Link> for serde_json::Value {
    fn from(link: Link) -> Self {
        serde_json::json!({
            "sys": {
                "type": link.sys.kind,
                "linkType": link.sys.link_type,
                "id": link.sys.id,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_serializes_to_sys_shape() {
        let link = Link::asset("abc123");
        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(value["sys"]["type"], "Link");
        assert_eq!(value["sys"]["linkType"], "Asset");
        assert_eq!(value["sys"]["id"], "abc123");
    }

    #[test]
    fn sys_roundtrips_version() {
        let raw = serde_json::json!({"id": "e1", "type": "Entry", "version": 3});
        let sys: Sys = serde_json::from_value(raw).unwrap();
        assert_eq!(sys.version, Some(3));
        assert_eq!(sys.published_version, None);
    }
}
