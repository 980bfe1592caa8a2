use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    pub fn new(s: impl Into<String>) -> Result<Self, String> {
        let s = s.into();
        if s.is_empty() {
            return Err("Identifier cannot be empty.".to_string());
        }
        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err("Identifier cannot contain whitespace or control characters.".to_string());
        }
        if s.len() > 128 {
            return Err("Identifier is too long (max 128 chars).".to_string());
        }
        Ok(Self(s))
    }

    pub fn new_unchecked(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentType {
    Blog,
    Telegram,
}

impl CommentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentType::Blog => "blog",
            CommentType::Telegram => "telegram",
        }
    }
}

impl FromStr for CommentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blog" => Ok(CommentType::Blog),
            "telegram" => Ok(CommentType::Telegram),
            other => Err(format!("Unknown comment type: {}", other)),
        }
    }
}

impl fmt::Display for CommentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat comment as stored and served. `likes` and `is_liked` are computed
/// per request against the caller's device id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub id: String,
    pub parent_id: Option<String>,
    pub nickname: String,
    pub email: String,
    pub website: Option<String>,
    pub avatar: Option<String>,
    pub is_admin: bool,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub likes: i64,
    pub is_liked: bool,
    pub identifier: PageId,
    pub comment_type: CommentType,
}

/// One comment in the assembled thread: the record plus the subtree it owns
/// and its depth from the root. Rebuilt on every fetch, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    #[serde(flatten)]
    pub record: CommentRecord,
    pub level: u32,
    pub children: Vec<CommentNode>,
}

impl CommentNode {
    pub fn new(record: CommentRecord) -> Self {
        Self {
            record,
            level: 0,
            children: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_id_rejects_garbage() {
        assert!(PageId::new("").is_err());
        assert!(PageId::new("has space").is_err());
        assert!(PageId::new("tab\there").is_err());
        assert!(PageId::new("a".repeat(129)).is_err());
        assert!(PageId::new("my-post/2024").is_ok());
    }

    #[test]
    fn comment_type_round_trips() {
        assert_eq!("blog".parse::<CommentType>().unwrap(), CommentType::Blog);
        assert_eq!(CommentType::Telegram.to_string(), "telegram");
        assert!("giscus".parse::<CommentType>().is_err());
    }
}
