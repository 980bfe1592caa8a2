use std::sync::Arc;

use client::{device_id, CommentApi, CommentFeed, HttpApi, MemoryStore, NewComment, UserInfo};
use domain::{CommentNode, CommentType, DisplayMode, PageId};

const BASE_URL: &str = "http://127.0.0.1:3000";
const IDENTIFIER: &str = "hello-murmur";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let api = Arc::new(HttpApi::new(BASE_URL));
    let store = MemoryStore::new();
    let device = device_id(&store);

    println!("Starting murmur test client (device {})...", device);

    println!("\n[1/3] Submitting a comment...");
    let identifier = PageId::new(IDENTIFIER).map_err(anyhow::Error::msg)?;
    let outcome = api
        .submit_comment(&NewComment {
            identifier: identifier.clone(),
            comment_type: CommentType::Blog,
            content: "Hello from the **murmur** test client!".to_string(),
            parent_id: None,
            user_info: UserInfo {
                nickname: "Ferris".to_string(),
                email: "ferris@example.com".to_string(),
                website: None,
                avatar: None,
            },
        })
        .await?;
    println!("   -> success: {}", outcome.success);

    println!("\n[2/3] Fetching the thread...");
    let feed = CommentFeed::new(
        api,
        identifier,
        CommentType::Blog,
        DisplayMode::Full,
        device,
    );
    feed.refresh().await;

    let comments = feed.comments();
    println!("   -> {} comment(s):", comments.len());
    for node in &comments {
        print_node(node);
    }

    if let Some(first) = comments.first() {
        println!("\n[3/3] Toggling a like on {}...", first.record.id);
        feed.toggle_like(&first.record.id).await;
        let after = feed.comments();
        println!(
            "   -> likes now {} (liked: {})",
            after[0].record.likes, after[0].record.is_liked
        );
    }

    Ok(())
}

fn print_node(node: &CommentNode) {
    println!(
        "      {}- [{}] {} ({} likes)",
        "  ".repeat(node.level as usize),
        node.record.created_at,
        node.record.nickname,
        node.record.likes
    );
}
