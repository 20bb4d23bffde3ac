//! Site content documents: project list and blog post list
//!
//! Each document is either a bare JSON array or an object holding the array
//! under a named field (`projects` / `posts`).

use crate::error::{OffcacheError, OffcacheResult};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Record identifier; documents use either numbers or strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Portfolio project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ContentId,
    pub title: String,
    pub category: String,
    pub thumbnail: String,
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo: Option<String>,
}

impl Project {
    /// `"all"` matches every project
    pub fn in_category(&self, category: &str) -> bool {
        category == "all" || self.category == category
    }
}

/// Blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: ContentId,
    pub title: String,
    pub date: NaiveDate,
    pub cover: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Parse a project list document
pub fn parse_projects(endpoint: &str, data: &[u8]) -> OffcacheResult<Vec<Project>> {
    parse_list(endpoint, "projects", data)
}

/// Parse a blog post list document
pub fn parse_posts(endpoint: &str, data: &[u8]) -> OffcacheResult<Vec<Post>> {
    parse_list(endpoint, "posts", data)
}

fn parse_list<T: DeserializeOwned>(endpoint: &str, field: &str, data: &[u8]) -> OffcacheResult<Vec<T>> {
    let shape = |reason: String| OffcacheError::DataShape {
        endpoint: endpoint.to_string(),
        reason,
    };

    let value: Value = serde_json::from_slice(data).map_err(|e| shape(e.to_string()))?;
    let items = match value {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => match map.remove(field) {
            Some(items @ Value::Array(_)) => items,
            Some(_) => return Err(shape(format!("'{}' is not an array", field))),
            None => return Err(shape(format!("missing '{}' array", field))),
        },
        _ => return Err(shape("expected an array or an object".to_string())),
    };

    serde_json::from_value(items).map_err(|e| shape(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECTS: &str = r#"{
        "projects": [
            {
                "id": 1,
                "title": "Storetic",
                "category": "web",
                "thumbnail": "assets/img/storetic-preview.png",
                "summary": "Inventario",
                "tags": ["python", "flask"],
                "github": "https://github.com/xenon/storetic"
            },
            {
                "id": "ges",
                "title": "GES",
                "category": "desktop",
                "thumbnail": "assets/img/ges-preview.png",
                "summary": "Gestion"
            }
        ]
    }"#;

    #[test]
    fn parses_wrapped_projects() {
        let projects = parse_projects("/data/projects.json", PROJECTS.as_bytes()).unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].id, ContentId::Number(1));
        assert_eq!(projects[1].id.to_string(), "ges");
        assert!(projects[1].tags.is_empty());
        assert!(projects[1].demo.is_none());
        assert!(projects[0].in_category("web"));
        assert!(!projects[0].in_category("desktop"));
        assert!(projects[1].in_category("all"));
    }

    #[test]
    fn parses_bare_post_array() {
        let data = r#"[
            {"id": 1, "title": "Offline", "date": "2025-08-10", "cover": "c.jpg", "link": "blog/a"},
            {"id": 2, "title": "Perf", "date": "2025-06-21", "cover": "d.jpg"}
        ]"#;
        let posts = parse_posts("/data/blog.json", data.as_bytes()).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].date, NaiveDate::from_ymd_opt(2025, 8, 10).unwrap());
        assert!(posts[1].link.is_none());
    }

    #[test]
    fn shape_errors_name_the_endpoint() {
        let err = parse_posts("/data/blog.json", br#"{"items": []}"#).unwrap_err();
        match err {
            OffcacheError::DataShape { endpoint, reason } => {
                assert_eq!(endpoint, "/data/blog.json");
                assert!(reason.contains("posts"));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(parse_posts("/data/blog.json", b"42").is_err());
        assert!(parse_posts("/data/blog.json", b"not json").is_err());
        assert!(parse_posts("/data/blog.json", br#"[{"id": 1, "title": "x", "date": "yesterday", "cover": ""}]"#).is_err());
    }
}
