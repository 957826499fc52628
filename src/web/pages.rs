//! Public listing page rendered with maud.

use maud::{html, Markup, DOCTYPE};

use crate::db::TopicDisplay;
use crate::links::NO_IMAGE;

/// Render the public listing page: all active topics, newest first.
#[must_use]
pub fn render_home(topics: &[TopicDisplay]) -> Markup {
    base_layout(
        "Topics",
        html! {
            h1 { "Topics" }

            @if topics.is_empty() {
                article {
                    p { "Nothing here yet." }
                }
            } @else {
                @for topic in topics {
                    (topic_card(topic))
                }
            }
        },
    )
}

fn topic_card(topic: &TopicDisplay) -> Markup {
    html! {
        article class="topic-card" {
            @if topic.image_url != NO_IMAGE {
                img src=(topic.image_url) alt=(topic.title) loading="lazy";
            }
            header {
                a href=(topic.url) target="_blank" rel="noopener noreferrer" {
                    strong { (topic.title) }
                }
            }
            @if !topic.description.is_empty() {
                p { (topic.description) }
            }
            footer {
                small { "#" (topic.id) }
            }
        }
    }
}

fn base_layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta name="color-scheme" content="light dark";
                title { (title) " - Topic Board" }
                link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.min.css";
                style {
                    ".topic-card img { max-height: 12rem; object-fit: cover; width: 100%; }"
                }
            }
            body {
                main class="container" {
                    (content)
                }
                footer class="container" {
                    small { "Topic Board" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_topic() -> TopicDisplay {
        TopicDisplay {
            id: 1,
            title: "Docs".to_string(),
            url: "https://example.com/readme".to_string(),
            description: String::new(),
            image_url: "-".to_string(),
        }
    }

    #[test]
    fn test_render_home_lists_topics() {
        let html = render_home(&[sample_topic()]).into_string();
        assert!(html.contains("Docs"));
        assert!(html.contains("https://example.com/readme"));
    }

    #[test]
    fn test_render_home_hides_image_sentinel() {
        let html = render_home(&[sample_topic()]).into_string();
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_render_home_empty_state() {
        let html = render_home(&[]).into_string();
        assert!(html.contains("Nothing here yet."));
    }
}
