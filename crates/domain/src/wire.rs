//! Normalization of over-the-wire comment payloads.
//!
//! Older backends served `objectId` / `parent.objectId` instead of `id` /
//! `parentId`. The adapter lives here so the thread builder only ever sees
//! canonical records.

use crate::models::{CommentRecord, CommentType, PageId};
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParent {
    pub object_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComment {
    pub id: Option<String>,
    pub object_id: Option<String>,
    pub parent_id: Option<String>,
    pub parent: Option<RawParent>,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub email: String,
    pub website: Option<String>,
    pub avatar: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub content: String,
    pub created_at: Option<String>,
    pub likes: Option<i64>,
    pub is_liked: Option<bool>,
}

impl RawComment {
    /// Canonical record, or `None` when no id can be resolved. Records
    /// without an id are dropped rather than surfaced as errors.
    pub fn normalize(self, identifier: &PageId, comment_type: CommentType) -> Option<CommentRecord> {
        let id = match self.id.filter(|s| !s.is_empty()).or(self.object_id) {
            Some(id) if !id.is_empty() => id,
            _ => {
                tracing::debug!("dropping wire comment without a resolvable id");
                return None;
            }
        };

        // Legacy `parent.objectId` wins only when `parentId` is absent.
        let parent_id = self
            .parent_id
            .filter(|s| !s.is_empty())
            .or_else(|| self.parent.and_then(|p| p.object_id))
            .filter(|s| !s.is_empty());

        Some(CommentRecord {
            id,
            parent_id,
            nickname: self.nickname,
            email: self.email,
            website: self.website,
            avatar: self.avatar,
            is_admin: self.is_admin,
            content: self.content,
            created_at: parse_timestamp(self.created_at.as_deref()),
            likes: self.likes.unwrap_or(0).max(0),
            is_liked: self.is_liked.unwrap_or(false),
            identifier: identifier.clone(),
            comment_type,
        })
    }
}

fn parse_timestamp(s: Option<&str>) -> NaiveDateTime {
    let Some(s) = s else {
        return NaiveDateTime::default();
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.naive_utc();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt;
    }
    tracing::debug!(raw = %s, "unparseable comment timestamp, defaulting to epoch");
    NaiveDateTime::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> (PageId, CommentType) {
        (PageId::new_unchecked("post-1".to_string()), CommentType::Blog)
    }

    fn raw(json: serde_json::Value) -> RawComment {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn canonical_fields_pass_through() {
        let (page, ty) = scope();
        let rec = raw(serde_json::json!({
            "id": "c1",
            "parentId": "c0",
            "nickname": "Ferris",
            "email": "f@example.com",
            "content": "<p>hi</p>",
            "createdAt": "2024-05-01T12:00:00Z",
            "likes": 3,
            "isLiked": true
        }))
        .normalize(&page, ty)
        .unwrap();

        assert_eq!(rec.id, "c1");
        assert_eq!(rec.parent_id.as_deref(), Some("c0"));
        assert_eq!(rec.likes, 3);
        assert!(rec.is_liked);
    }

    #[test]
    fn legacy_object_id_aliases_resolve() {
        let (page, ty) = scope();
        let rec = raw(serde_json::json!({
            "objectId": "legacy1",
            "parent": { "objectId": "legacy0" },
            "createdAt": "2024-05-01T12:00:00.000Z"
        }))
        .normalize(&page, ty)
        .unwrap();

        assert_eq!(rec.id, "legacy1");
        assert_eq!(rec.parent_id.as_deref(), Some("legacy0"));
    }

    #[test]
    fn missing_id_is_dropped() {
        let (page, ty) = scope();
        assert!(raw(serde_json::json!({ "content": "ghost" }))
            .normalize(&page, ty)
            .is_none());
        assert!(raw(serde_json::json!({ "id": "" })).normalize(&page, ty).is_none());
    }

    #[test]
    fn missing_counters_default() {
        let (page, ty) = scope();
        let rec = raw(serde_json::json!({ "id": "c1" }))
            .normalize(&page, ty)
            .unwrap();
        assert_eq!(rec.likes, 0);
        assert!(!rec.is_liked);
        assert!(rec.parent_id.is_none());
    }
}
