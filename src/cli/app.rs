//! CLI module for the newsarchive application
//!
//! This module handles the command-line interface: it runs news lookups
//! through `NewsClient` and manages saved articles through `Archive`.
use std::{
    io::{stdin, stdout, Write},
    sync::Arc,
};

use log::{info, warn};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    preview, select_article, Archive, Category, Commands, Config, NewsClient, NewsError,
    NewsResponse, Patch, Result, ResultOptions, SavedArticle, SortBy,
};

/// CLI Application handler - processes CLI commands against the archive and the news API
pub struct App {
    /// The saved-article archive
    archive: Arc<Mutex<Archive>>,

    /// Application configuration
    config: Config,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    /// Create a new CLI application with the given archive and config
    pub fn new(archive: Arc<Mutex<Archive>>, config: Config, verbose: bool) -> Self {
        Self {
            archive,
            config,
            verbose,
        }
    }

    /// Run the CLI application with the given command
    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Headlines {
                country,
                category,
                output,
            } => {
                let country = country.unwrap_or_else(|| self.config.default_country.clone());
                let response = self.client()?.top_headlines(&country, category).await;
                self.handle_results(response, output).await?
            }

            Commands::Search {
                query,
                from,
                to,
                sort_by,
                output,
            } => {
                let response = self
                    .client()?
                    .search_articles(&query, from, to, sort_by)
                    .await;
                self.handle_results(response, output).await?
            }

            Commands::Daily {
                query,
                country,
                output,
            } => {
                let country = country.unwrap_or_else(|| self.config.default_country.clone());
                let response = self.client()?.daily_news(query.as_deref(), &country).await;
                self.handle_results(response, output).await?
            }

            Commands::Weekly { query, output } => {
                let response = self.client()?.weekly_news(&query).await;
                self.handle_results(response, output).await?
            }

            Commands::Monthly { query, output } => {
                let response = self.client()?.monthly_news(&query).await;
                self.handle_results(response, output).await?
            }

            Commands::List { json } => self.list_saved(json).await?,

            Commands::View { id, json } => self.view_saved(id, json).await?,

            Commands::Update { id, notes, set } => self.handle_update(id, notes, set).await?,

            Commands::Delete { id, force } => self.handle_delete(id, force).await?,

            Commands::Demo => self.run_demo().await?,
        }

        Ok(())
    }

    fn client(&self) -> Result<NewsClient> {
        NewsClient::new(&self.config)
    }

    /// Print API results and optionally save one of them
    async fn handle_results(
        &self,
        response: Option<NewsResponse>,
        options: ResultOptions,
    ) -> Result<()> {
        let Some(response) = response else {
            println!("The news API request failed. Run with --verbose for details.");
            return Ok(());
        };

        self.display_results(&response, options.limit);

        if let Some(position) = options.save {
            let article = select_article(&response, position)?;
            let id = self
                .archive
                .lock()
                .await
                .save_article(article.to_fields())?;
            println!("Article saved. ID: {}", id);
        }

        Ok(())
    }

    fn display_results(&self, response: &NewsResponse, limit: usize) {
        if response.articles.is_empty() {
            println!("No articles found.");
            return;
        }

        for (i, article) in response.articles.iter().take(limit).enumerate() {
            println!(
                "{}. {}",
                i + 1,
                console::style(article.title.as_deref().unwrap_or("(untitled)")).bold()
            );
            println!(
                "   Source: {}",
                article.source.name.as_deref().unwrap_or("unknown")
            );
            println!(
                "   Date: {}",
                article.published_at.as_deref().unwrap_or("unknown")
            );
            println!("   URL: {}", article.url.as_deref().unwrap_or(""));
            if self.verbose {
                if let Some(description) = &article.description {
                    println!("   {}", preview(description, 120));
                }
            }
            println!();
        }

        let total = response
            .total_results
            .unwrap_or(response.articles.len() as u64);
        println!(
            "Showing {} of {} article{}",
            response.articles.len().min(limit),
            total,
            if total == 1 { "" } else { "s" }
        );
    }

    /// List all saved articles
    async fn list_saved(&self, json: bool) -> Result<()> {
        let archive = self.archive.lock().await;
        let articles = archive.all_saved_articles();

        if json {
            println!("{}", serde_json::to_string_pretty(articles)?);
            return Ok(());
        }

        if articles.is_empty() {
            println!("No saved articles.");
            return Ok(());
        }

        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);

        for (i, article) in articles.iter().enumerate() {
            if i > 0 {
                println!("{}", "-".repeat(term_width.min(50)));
            }
            self.display_saved_brief(article);
        }

        println!(
            "\n{} saved article{}",
            articles.len(),
            if articles.len() == 1 { "" } else { "s" }
        );
        Ok(())
    }

    fn display_saved_brief(&self, article: &SavedArticle) {
        println!(
            "ID: {} | Saved: {}",
            article.id,
            article.saved_date.format("%Y-%m-%d %H:%M")
        );
        println!("Title: {}", console::style(article.title()).bold());
        if let Some(notes) = article.field_str("notes") {
            println!("Notes: {}", console::style(preview(notes, 80)).cyan());
        }
    }

    async fn view_saved(&self, id: u64, json: bool) -> Result<()> {
        let archive = self.archive.lock().await;
        let article = archive
            .get_saved_article(id)
            .ok_or(NewsError::ArticleNotFound { id })?;

        if json {
            println!("{}", serde_json::to_string_pretty(article)?);
            return Ok(());
        }

        println!("ID:      {}", article.id);
        println!("Title:   {}", console::style(article.title()).bold());
        println!("Saved:   {}", article.saved_date);
        if let Some(updated) = article.updated_date {
            println!("Updated: {}", updated);
        }
        for (key, value) in &article.fields {
            if key == "title" {
                continue;
            }
            match value {
                Value::String(s) => println!("{}: {}", key, s),
                Value::Null => {}
                other => println!("{}: {}", key, other),
            }
        }
        Ok(())
    }

    async fn handle_update(&self, id: u64, notes: Option<String>, set: Vec<String>) -> Result<()> {
        let mut patch: Patch = set
            .iter()
            .map(|assignment| Patch::parse_assignment(assignment))
            .collect::<Result<_>>()?;
        if let Some(notes) = notes {
            patch = patch.set("notes", notes);
        }

        if patch.is_empty() {
            return Err(NewsError::InvalidInput {
                message: "nothing to update, pass --notes or --set key=value".to_string(),
            });
        }

        if !self.archive.lock().await.update_article(id, patch)? {
            return Err(NewsError::ArticleNotFound { id });
        }

        println!("Article {} updated.", id);
        Ok(())
    }

    async fn handle_delete(&self, id: u64, force: bool) -> Result<()> {
        // Step 1: make sure the article exists and show it
        let article = match self.archive.lock().await.get_saved_article(id) {
            Some(article) => article.clone(),
            None => return Err(NewsError::ArticleNotFound { id }),
        };

        // Step 2: ask for confirmation unless forced
        if !force {
            println!("You are about to delete the following article:");
            println!("ID:    {}", article.id);
            println!("Title: {}", article.title());
            println!("Saved: {}", article.saved_date);

            print!("\nAre you sure you want to delete this article? [y/N]: ");
            stdout().flush()?;

            let mut input = String::new();
            stdin().read_line(&mut input)?;

            let input = input.trim().to_lowercase();
            if input != "y" && input != "yes" {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        // Step 3: delete
        if !self.archive.lock().await.delete_article(id)? {
            return Err(NewsError::ArticleNotFound { id });
        }

        println!("Article '{}' ({}) has been deleted.", article.title(), id);
        Ok(())
    }

    /// Sample session: technology headlines, save the first search hit,
    /// weekly economy news, list saved articles and annotate the first one.
    async fn run_demo(&self) -> Result<()> {
        let client = self.client()?;
        info!("Running demo session");

        println!("{}", console::style("Top technology headlines:").underlined());
        let headlines = client
            .top_headlines(&self.config.default_country, Some(Category::Technology))
            .await;
        if let Some(headlines) = &headlines {
            self.display_results(headlines, 3);
        }

        println!("\n{}", console::style("Latest on artificial intelligence:").underlined());
        let search = client
            .search_articles("yapay zeka", None, None, SortBy::PublishedAt)
            .await;
        match search.as_ref().and_then(|r| r.articles.first()) {
            Some(first) => {
                let id = self.archive.lock().await.save_article(first.to_fields())?;
                println!("Article saved. ID: {}", id);
            }
            None => warn!("Search returned no articles, nothing saved"),
        }

        println!("\n{}", console::style("Economy news from the last week:").underlined());
        if let Some(weekly) = client.weekly_news("ekonomi").await {
            println!("Found {} articles in total.", weekly.articles.len());
        }

        println!("\n{}", console::style("Saved articles:").underlined());
        let first_id = {
            let archive = self.archive.lock().await;
            for article in archive.all_saved_articles() {
                println!("ID: {} - {}", article.id, article.title());
            }
            archive.all_saved_articles().first().map(|a| a.id)
        };

        if let Some(id) = first_id {
            let patch = Patch::new().set("notes", "Bu makale çok ilginç!");
            self.archive.lock().await.update_article(id, patch)?;
            println!("\nArticle {} updated.", id);
        }

        Ok(())
    }
}
