use markdown_it::MarkdownIt;
use std::sync::OnceLock;

/// Markdown to sanitized HTML. Comment content goes through this exactly
/// once, at submission time; the database only ever holds the cleaned HTML.
pub fn render_comment(text: &str) -> String {
    static INSTANCE: OnceLock<MarkdownIt> = OnceLock::new();
    let html = INSTANCE
        .get_or_init(comment_markdown)
        .parse(text)
        .render();
    ammonia::clean(&html)
}

fn comment_markdown() -> MarkdownIt {
    let mut parser = MarkdownIt::new();
    markdown_it::plugins::cmark::add(&mut parser);
    parser
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_basic_markdown() {
        let html = render_comment("hello **world**");
        assert!(html.contains("<strong>world</strong>"));
    }

    #[test]
    fn strips_script_tags() {
        let html = render_comment("hi <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("hi"));
    }

    #[test]
    fn strips_event_handlers() {
        let html = render_comment(r#"<a href="https://example.com" onclick="evil()">x</a>"#);
        assert!(!html.contains("onclick"));
    }
}
