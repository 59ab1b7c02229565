use log::debug;

use crate::{NewsArticle, NewsError, NewsResponse, Result};

/// Picks the article with the given 1-based position from an API response.
pub fn select_article(response: &NewsResponse, position: usize) -> Result<&NewsArticle> {
    if position == 0 {
        return Err(NewsError::InvalidInput {
            message: "result numbers start at 1".to_string(),
        });
    }

    debug!(
        "Selecting result {} of {}",
        position,
        response.articles.len()
    );
    response
        .articles
        .get(position - 1)
        .ok_or_else(|| NewsError::InvalidInput {
            message: format!(
                "result {} does not exist, only {} returned",
                position,
                response.articles.len()
            ),
        })
}

/// First `max_chars` characters of the first non-empty line.
pub fn preview(text: &str, max_chars: usize) -> String {
    let first_line = text
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("")
        .trim();

    if first_line.chars().count() <= max_chars {
        first_line.to_string()
    } else {
        let cut: String = first_line.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
