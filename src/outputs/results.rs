//! Results formatting.
//!
//! Articles are first turned into a [`ResultsView`], a plain list of
//! view-models with every field already cleaned and a link chosen. The view
//! is then rendered to lightweight markdown for the chat transcript. Keeping
//! the two steps apart means the presentation layer can render the same
//! view some other way without touching article data.
//!
//! # Markdown Layout
//!
//! ```text
//! **LATEST NEWS:**
//!
//! 📰 **Chip exports rise**
//! 💬 Semiconductor shipments climbed.
//! _Example Times_
//! 🔗 [Read more](https://example.com/chips)
//!
//! ---
//!
//! 📰 **...**
//! ```

use crate::models::NormalizedArticle;
use crate::utils::{escape_markdown, google_search_url};
use std::fmt::Write;

/// Marker line that opens every results message.
pub const RESULTS_HEADING: &str = "**LATEST NEWS:**";

/// One article, ready to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleView {
    pub title: String,
    pub description: String,
    pub source: String,
    /// Article URL, or a search link for the title when the article has none.
    pub link: String,
    pub image: Option<String>,
}

impl ArticleView {
    pub fn from_article(article: &NormalizedArticle) -> Self {
        let link = if article.url.is_empty() {
            if article.title.is_empty() {
                String::new()
            } else {
                google_search_url(&article.title)
            }
        } else {
            article.url.clone()
        };

        Self {
            title: article.title.clone(),
            description: article.description.clone(),
            source: article.source_name.clone(),
            link,
            image: article.image_url.clone(),
        }
    }
}

/// A full results message as data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultsView {
    pub items: Vec<ArticleView>,
}

impl ResultsView {
    pub fn from_articles(articles: &[NormalizedArticle]) -> Self {
        Self {
            items: articles.iter().map(ArticleView::from_article).collect(),
        }
    }

    /// Render as markdown. Missing fields become empty segments.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        writeln!(md, "{RESULTS_HEADING}").unwrap();

        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(md, "\n---").unwrap();
            }
            writeln!(md).unwrap();
            writeln!(md, "📰 **{}**", escape_markdown(&item.title)).unwrap();
            writeln!(md, "💬 {}", escape_markdown(&item.description)).unwrap();
            writeln!(md, "_{}_", escape_markdown(&item.source)).unwrap();
            if item.link.is_empty() {
                writeln!(md, "🔗").unwrap();
            } else {
                writeln!(md, "🔗 [Read more]({})", item.link).unwrap();
            }
            if let Some(image) = &item.image {
                writeln!(md, "🖼️ [Image]({image})").unwrap();
            }
        }
        md.trim_end().to_string()
    }
}

/// Format `articles` as the text of a results message.
pub fn format_results(articles: &[NormalizedArticle]) -> String {
    ResultsView::from_articles(articles).to_markdown()
}
