//! Saved-article archive backed by a single JSON file.
//!
//! Mutations are staged on a copy and only become visible once the file
//! has been rewritten, so a failed write leaves the archive unchanged.
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Local;
use log::{debug, error, info, trace, warn};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::{now, ArticleFields, LoadOutcome, NewsError, Patch, Result, SavedArticle};

/// Owns the saved articles and mirrors them to a single JSON file.
///
/// Every mutating operation rewrites the whole file before returning, so the
/// file always holds a complete serialization of the in-memory list.
#[derive(Debug)]
pub struct Archive {
    /// Backing JSON file
    path: PathBuf,

    /// Saved articles in insertion order
    articles: Vec<SavedArticle>,

    /// Identifier handed out by the next save. Only ever grows while the
    /// archive is open. It is not stored in the file: on load it restarts at
    /// the highest live id + 1, so an id freed by deleting the newest
    /// article in an earlier session can be handed out again. It never
    /// matches a live article.
    next_id: u64,
}

impl Archive {
    /// Opens the archive at `path`.
    ///
    /// A missing file gives an empty archive. A file that cannot be parsed is
    /// reported as [`NewsError::CorruptArchive`].
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut archive = Self::empty(path.into());
        let outcome = archive.load()?;
        debug!("Opened archive {}: {:?}", archive.path.display(), outcome);
        Ok(archive)
    }

    /// Opens the archive, starting empty if the file is corrupt.
    ///
    /// The unreadable file is moved aside first so the next persist cannot
    /// overwrite it.
    pub fn open_or_empty(path: impl Into<PathBuf>) -> Result<Self> {
        let mut archive = Self::empty(path.into());
        match archive.load() {
            Ok(_) => Ok(archive),
            Err(NewsError::CorruptArchive { path, source }) => {
                error!(
                    "Archive file {} is corrupt ({}); starting with an empty archive",
                    path.display(),
                    source
                );
                let quarantine = quarantine_path(&path);
                fs::rename(&path, &quarantine)?;
                warn!("Moved corrupt archive to {}", quarantine.display());
                Ok(archive)
            }
            Err(e) => Err(e),
        }
    }

    fn empty(path: PathBuf) -> Self {
        Self {
            path,
            articles: Vec::new(),
            next_id: 1,
        }
    }

    /// Replaces the in-memory list with the contents of the backing file.
    pub fn load(&mut self) -> Result<LoadOutcome> {
        if !self.path.exists() {
            info!(
                "Archive file {} does not exist yet, starting empty",
                self.path.display()
            );
            self.articles.clear();
            self.next_id = 1;
            return Ok(LoadOutcome::Missing);
        }

        debug!("Loading archive from {}", self.path.display());
        let content = fs::read_to_string(&self.path).map_err(|e| {
            error!("Failed to read archive {}: {}", self.path.display(), e);
            NewsError::Io(e)
        })?;

        let articles: Vec<SavedArticle> =
            serde_json::from_str(&content).map_err(|source| NewsError::CorruptArchive {
                path: self.path.clone(),
                source,
            })?;

        let highest = articles.iter().map(|a| a.id).max().unwrap_or(0);
        let next_id = highest.checked_add(1).ok_or_else(|| NewsError::CorruptArchive {
            path: self.path.clone(),
            source: serde::de::Error::custom(format!(
                "article id {} leaves no room for new ids",
                highest
            )),
        })?;

        self.next_id = next_id;
        self.articles = articles;

        info!(
            "Loaded {} saved articles from {}",
            self.articles.len(),
            self.path.display()
        );
        Ok(LoadOutcome::Loaded(self.articles.len()))
    }

    /// Writes the complete list to disk through a temporary file in the same
    /// directory, then renames it over the target.
    pub fn persist(&self) -> Result<()> {
        self.write_articles(&self.articles)
    }

    fn write_articles(&self, articles: &[SavedArticle]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !dir.exists() {
            debug!("Creating archive directory: {}", dir.display());
            fs::create_dir_all(dir)?;
        }

        trace!("Serializing {} articles", articles.len());
        let json = to_indented_json(articles)?;

        let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            NewsError::Io(e)
        })?;
        temp_file.write_all(&json)?;
        temp_file.flush()?;

        temp_file.persist(&self.path).map_err(|e| {
            error!(
                "Failed to persist archive {}: {}",
                self.path.display(),
                e.error
            );
            NewsError::Io(e.error)
        })?;

        debug!("Archive written to {}", self.path.display());
        Ok(())
    }

    /// Saves a new article and returns its identifier.
    pub fn save_article(&mut self, fields: ArticleFields) -> Result<u64> {
        let id = self.next_id;
        let next_id = id.checked_add(1).ok_or_else(|| NewsError::InvalidInput {
            message: "no article ids left".to_string(),
        })?;
        let article = SavedArticle::new(id, fields);
        info!("Saving article {}: {}", id, article.title());

        let mut staged = self.articles.clone();
        staged.push(article);
        self.write_articles(&staged)?;

        self.articles = staged;
        self.next_id = next_id;
        Ok(id)
    }

    pub fn get_saved_article(&self, id: u64) -> Option<&SavedArticle> {
        self.articles.iter().find(|a| a.id == id)
    }

    /// All saved articles in the order they were saved.
    pub fn all_saved_articles(&self) -> &[SavedArticle] {
        &self.articles
    }

    /// Merges `patch` into the article with the given id.
    ///
    /// `id` and `saved_date` in the patch are ignored. Returns `Ok(false)`
    /// when no article has that id.
    pub fn update_article(&mut self, id: u64, patch: Patch) -> Result<bool> {
        let Some(position) = self.articles.iter().position(|a| a.id == id) else {
            debug!("Cannot update article {}: not found", id);
            return Ok(false);
        };

        let mut staged = self.articles.clone();
        let article = &mut staged[position];
        for (key, value) in patch {
            match key.as_str() {
                "id" | "saved_date" => {
                    debug!("Ignoring immutable field '{}' in update of {}", key, id);
                }
                // always restamped below
                "updated_date" => {}
                _ => {
                    article.fields.insert(key, value);
                }
            }
        }
        article.updated_date = Some(now());

        self.write_articles(&staged)?;
        self.articles = staged;
        info!("Updated article {}", id);
        Ok(true)
    }

    /// Removes the article with the given id. Returns `Ok(false)` when no
    /// article has that id.
    pub fn delete_article(&mut self, id: u64) -> Result<bool> {
        let Some(position) = self.articles.iter().position(|a| a.id == id) else {
            debug!("Cannot delete article {}: not found", id);
            return Ok(false);
        };

        let mut staged = self.articles.clone();
        let removed = staged.remove(position);
        self.write_articles(&staged)?;

        self.articles = staged;
        info!("Deleted article {}: {}", id, removed.title());
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Pretty JSON with four-space indentation. Non-ASCII text is written as is.
fn to_indented_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer).map_err(|e| {
        error!("Failed to serialize archive: {}", e);
        NewsError::Serialization(e)
    })?;
    Ok(buf)
}

fn quarantine_path(path: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d%H%M%S");
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".to_string());
    path.with_file_name(format!("{}.corrupt-{}", name, stamp))
}
