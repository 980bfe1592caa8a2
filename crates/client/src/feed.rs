use crate::api::{ApiError, CommentApi};
use domain::{build_thread, present, CommentNode, CommentType, DisplayMode, PageId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// One page's comment thread as the UI sees it: fetches, rebuilds and
/// presents the tree, applies optimistic like toggles, and keeps racing
/// fetches from clobbering each other.
///
/// Share across tasks with `Arc<CommentFeed<_>>`; dropping the last handle
/// cancels anything still in flight so no state is touched after teardown.
pub struct CommentFeed<A: CommentApi> {
    api: Arc<A>,
    identifier: PageId,
    comment_type: CommentType,
    display_mode: DisplayMode,
    device_id: String,
    seq: AtomicU64,
    state: Mutex<FeedState>,
    shutdown: CancellationToken,
}

struct FeedState {
    comments: Vec<CommentNode>,
    inflight: Option<CancellationToken>,
}

impl<A: CommentApi> CommentFeed<A> {
    pub fn new(
        api: Arc<A>,
        identifier: PageId,
        comment_type: CommentType,
        display_mode: DisplayMode,
        device_id: String,
    ) -> Self {
        Self {
            api,
            identifier,
            comment_type,
            display_mode,
            device_id,
            seq: AtomicU64::new(0),
            state: Mutex::new(FeedState {
                comments: Vec::new(),
                inflight: None,
            }),
            shutdown: CancellationToken::new(),
        }
    }

    /// Current presented snapshot.
    pub fn comments(&self) -> Vec<CommentNode> {
        self.state.lock().unwrap().comments.clone()
    }

    /// Fetches the list and replaces the snapshot — unless a newer refresh
    /// was issued meanwhile, in which case this result is discarded
    /// (last-fetch-wins). The previous in-flight request is cancelled up
    /// front. Failures keep the prior snapshot.
    pub async fn refresh(&self) {
        let my_seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;

        let token = self.shutdown.child_token();
        {
            let mut state = self.state.lock().unwrap();
            if let Some(previous) = state.inflight.replace(token.clone()) {
                previous.cancel();
            }
        }

        let fetched = tokio::select! {
            _ = token.cancelled() => return,
            res = self.api.fetch_comments(&self.identifier, self.comment_type, &self.device_id) => res,
        };

        match fetched {
            Ok(raw) => {
                let records: Vec<_> = raw
                    .into_iter()
                    .filter_map(|r| r.normalize(&self.identifier, self.comment_type))
                    .collect();
                let presented = present(&build_thread(records), self.display_mode);

                let mut state = self.state.lock().unwrap();
                let is_latest = self.seq.load(Ordering::SeqCst) == my_seq;
                if is_latest && !token.is_cancelled() {
                    state.comments = presented;
                }
            }
            Err(ApiError::Cancelled) => {}
            Err(e) => {
                tracing::warn!(identifier = %self.identifier, error = %e, "comment fetch failed");
            }
        }
    }

    /// Optimistically flips the like on `comment_id` in the local snapshot,
    /// then asks the server to persist it. On failure the optimistic state
    /// is not reverted field by field: a silent full refresh resynchronizes
    /// from the server instead.
    pub async fn toggle_like(&self, comment_id: &str) {
        {
            let mut state = self.state.lock().unwrap();
            toggle_like_in(&mut state.comments, comment_id);
        }

        match self
            .api
            .toggle_like(comment_id, self.comment_type, &self.device_id)
            .await
        {
            // The optimistic value stands; the next full fetch reconciles.
            Ok(_) => {}
            Err(ApiError::Cancelled) => {}
            Err(e) => {
                tracing::warn!(comment_id, error = %e, "like toggle failed, resyncing");
                self.refresh().await;
            }
        }
    }
}

impl<A: CommentApi> Drop for CommentFeed<A> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Recursive optimistic toggle. Searches the whole tree (a liked comment may
/// be nested at any depth), flips at most one node, and reports whether a
/// node was found.
pub fn toggle_like_in(nodes: &mut [CommentNode], comment_id: &str) -> bool {
    for node in nodes {
        if node.record.id == comment_id {
            node.record.is_liked = !node.record.is_liked;
            node.record.likes += if node.record.is_liked { 1 } else { -1 };
            return true;
        }
        if toggle_like_in(&mut node.children, comment_id) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{LikeOutcome, NewComment, SubmitOutcome};
    use async_trait::async_trait;
    use domain::{CommentRecord, RawComment};
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    fn record(id: &str, parent: Option<&str>, secs: i64) -> CommentRecord {
        CommentRecord {
            id: id.to_string(),
            parent_id: parent.map(str::to_string),
            nickname: "Ferris".to_string(),
            email: "f@example.com".to_string(),
            website: None,
            avatar: None,
            is_admin: false,
            content: "<p>hi</p>".to_string(),
            created_at: chrono::DateTime::from_timestamp(secs, 0).unwrap().naive_utc(),
            likes: 2,
            is_liked: false,
            identifier: PageId::new_unchecked("post-1".to_string()),
            comment_type: CommentType::Blog,
        }
    }

    fn raw(id: &str, secs: i64) -> RawComment {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "createdAt": chrono::DateTime::from_timestamp(secs, 0).unwrap().to_rfc3339(),
        }))
        .unwrap()
    }

    #[test]
    fn toggle_twice_restores_original_state() {
        let mut nodes = build_thread(vec![record("a", None, 1)]);
        assert!(toggle_like_in(&mut nodes, "a"));
        assert_eq!(nodes[0].record.likes, 3);
        assert!(nodes[0].record.is_liked);

        assert!(toggle_like_in(&mut nodes, "a"));
        assert_eq!(nodes[0].record.likes, 2);
        assert!(!nodes[0].record.is_liked);
    }

    #[test]
    fn toggle_reaches_nested_nodes_only() {
        let mut nodes = build_thread(vec![
            record("root", None, 1),
            record("child", Some("root"), 2),
            record("grandchild", Some("child"), 3),
            record("sibling", Some("root"), 4),
        ]);

        assert!(toggle_like_in(&mut nodes, "grandchild"));

        let root = &nodes[0];
        let child = root.children.iter().find(|n| n.record.id == "child").unwrap();
        let grandchild = &child.children[0];
        let sibling = root.children.iter().find(|n| n.record.id == "sibling").unwrap();

        assert_eq!(grandchild.record.likes, 3);
        assert!(grandchild.record.is_liked);
        assert_eq!(root.record.likes, 2);
        assert_eq!(child.record.likes, 2);
        assert_eq!(sibling.record.likes, 2);
    }

    #[test]
    fn toggle_on_unknown_id_is_a_noop() {
        let mut nodes = build_thread(vec![record("a", None, 1)]);
        assert!(!toggle_like_in(&mut nodes, "ghost"));
        assert_eq!(nodes[0].record.likes, 2);
    }

    /// First fetch blocks on a gate and answers ["stale"]; every later
    /// fetch answers ["fresh"] immediately.
    struct GatedApi {
        calls: AtomicUsize,
        first_started: Notify,
        release_first: Notify,
    }

    #[async_trait]
    impl CommentApi for GatedApi {
        async fn fetch_comments(
            &self,
            _identifier: &PageId,
            _comment_type: CommentType,
            _device_id: &str,
        ) -> Result<Vec<RawComment>, ApiError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.first_started.notify_one();
                self.release_first.notified().await;
                Ok(vec![raw("stale", 1)])
            } else {
                Ok(vec![raw("fresh", 2)])
            }
        }

        async fn submit_comment(&self, _c: &NewComment) -> Result<SubmitOutcome, ApiError> {
            unimplemented!()
        }

        async fn toggle_like(
            &self,
            _comment_id: &str,
            _comment_type: CommentType,
            _device_id: &str,
        ) -> Result<LikeOutcome, ApiError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn newer_fetch_wins_over_slower_older_one() {
        let api = Arc::new(GatedApi {
            calls: AtomicUsize::new(0),
            first_started: Notify::new(),
            release_first: Notify::new(),
        });
        let feed = Arc::new(CommentFeed::new(
            api.clone(),
            PageId::new_unchecked("post-1".to_string()),
            CommentType::Blog,
            DisplayMode::Full,
            "device-1".to_string(),
        ));

        let first = {
            let feed = feed.clone();
            tokio::spawn(async move { feed.refresh().await })
        };
        api.first_started.notified().await;

        feed.refresh().await;

        api.release_first.notify_one();
        first.await.unwrap();

        let ids: Vec<String> = feed
            .comments()
            .iter()
            .map(|n| n.record.id.clone())
            .collect();
        assert_eq!(ids, ["fresh"]);
    }

    struct FailingLikeApi;

    #[async_trait]
    impl CommentApi for FailingLikeApi {
        async fn fetch_comments(
            &self,
            _identifier: &PageId,
            _comment_type: CommentType,
            _device_id: &str,
        ) -> Result<Vec<RawComment>, ApiError> {
            // Server truth: one comment, no likes.
            Ok(vec![raw("a", 1)])
        }

        async fn submit_comment(&self, _c: &NewComment) -> Result<SubmitOutcome, ApiError> {
            unimplemented!()
        }

        async fn toggle_like(
            &self,
            _comment_id: &str,
            _comment_type: CommentType,
            _device_id: &str,
        ) -> Result<LikeOutcome, ApiError> {
            Err(ApiError::Status(500))
        }
    }

    #[tokio::test]
    async fn failed_like_resyncs_from_server() {
        let feed = CommentFeed::new(
            Arc::new(FailingLikeApi),
            PageId::new_unchecked("post-1".to_string()),
            CommentType::Blog,
            DisplayMode::Full,
            "device-1".to_string(),
        );
        feed.refresh().await;

        feed.toggle_like("a").await;

        // Optimistic +1 was discarded by the refetch.
        let comments = feed.comments();
        assert_eq!(comments[0].record.likes, 0);
        assert!(!comments[0].record.is_liked);
    }
}
