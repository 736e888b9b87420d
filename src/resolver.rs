//! Content resolver
//!
//! Maps a requested media id onto playable files in the Seedr account and
//! resolves each match to a direct URL. Matching precedence:
//!
//! 1. direct id equality against the file's internal identifier
//! 2. derived-id equality (normalized title + extracted year)
//! 3. for IMDb-style ids, title/year matching against an external metadata
//!    lookup — every matching file is returned, with no tie-breaking
//!
//! Traversal uses an explicit worklist instead of recursion, so arbitrarily
//! deep folder trees cannot blow the stack, and files surface lazily in the
//! order the API reports them.

use std::collections::VecDeque;

use futures::stream::{self, StreamExt, TryStreamExt};
use regex::Regex;
use thiserror::Error;

use crate::api::cinemeta::{CinemetaClient, MetadataError, TitleMeta};
use crate::api::seedr::{SeedrClient, SeedrError};
use crate::models::{FileRecord, ResolvedStream};

/// Upper bound on concurrent per-file URL fetches
const FETCH_CONCURRENCY: usize = 4;

/// Catalog ids are prefixed so Stremio routes them back to this addon
pub const ID_PREFIX: &str = "seedr:";

/// Resolution error types
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error(transparent)]
    Storage(#[from] SeedrError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

// =============================================================================
// Target Parsing
// =============================================================================

/// What a requested id asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Internal file id or a derived title id
    FileId(String),
    /// IMDb-style id; series episode suffixes are kept out of the lookup key
    Imdb { id: String },
}

impl Target {
    /// Parse a raw request id, stripping the catalog prefix if present
    pub fn parse(raw: &str) -> Self {
        let id = raw.strip_prefix(ID_PREFIX).unwrap_or(raw);
        if is_imdb_id(id) {
            let base = id.split(':').next().unwrap_or(id);
            Target::Imdb {
                id: base.to_string(),
            }
        } else {
            Target::FileId(id.to_string())
        }
    }
}

/// True for ids like `tt0133093` or `tt0903747:1:2`
pub fn is_imdb_id(id: &str) -> bool {
    let base = id.split(':').next().unwrap_or(id);
    base.len() > 2
        && base.starts_with("tt")
        && base[2..].chars().all(|c| c.is_ascii_digit())
}

// =============================================================================
// Name Normalization
// =============================================================================

/// Lowercase and strip everything that is not ASCII alphanumeric
pub fn normalize_title(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Extract a plausible 4-digit release year from a file name
///
/// The last match wins, so titles that themselves contain a year
/// ("2001.A.Space.Odyssey.1968.mkv") resolve to the release year.
pub fn extract_year(name: &str) -> Option<String> {
    let re = Regex::new(r"(19|20)\d{2}").ok()?;
    re.find_iter(name).last().map(|m| m.as_str().to_string())
}

/// Derived id for a file name: normalized title portion plus the year
///
/// `The.Matrix.1999.1080p.mkv` → `thematrix1999`. Without an extractable
/// year the whole name (minus extension) is normalized.
pub fn derived_id(name: &str) -> String {
    let re = match Regex::new(r"(19|20)\d{2}") {
        Ok(re) => re,
        Err(_) => return normalize_title(name),
    };
    match re.find_iter(name).last() {
        Some(m) => {
            let title = &name[..m.start()];
            format!("{}{}", normalize_title(title), m.as_str())
        }
        None => {
            let stem = name.rsplit_once('.').map(|(s, _)| s).unwrap_or(name);
            normalize_title(stem)
        }
    }
}

// =============================================================================
// Folder Traversal
// =============================================================================

/// Lazy depth-first walk over the account's playable files
///
/// Keeps an explicit stack of folder ids plus a buffer of files from the
/// last listed level; [`FolderWalker::next_file`] refills the buffer one
/// listing at a time, so callers can stop early without fetching the rest
/// of the tree.
pub struct FolderWalker<'a> {
    client: &'a SeedrClient,
    pending: Vec<Option<u64>>,
    buffer: VecDeque<FileRecord>,
}

impl<'a> FolderWalker<'a> {
    /// Walk starting at the account root
    pub fn new(client: &'a SeedrClient) -> Self {
        Self {
            client,
            pending: vec![None],
            buffer: VecDeque::new(),
        }
    }

    /// Next playable file in stable traversal order, `None` when exhausted
    pub async fn next_file(&mut self) -> Result<Option<FileRecord>, SeedrError> {
        loop {
            if let Some(file) = self.buffer.pop_front() {
                return Ok(Some(file));
            }
            let Some(folder_id) = self.pending.pop() else {
                return Ok(None);
            };
            let listing = self.client.list_contents(folder_id).await?;
            self.buffer
                .extend(listing.files.into_iter().filter(|f| f.playable));
            // Depth-first: children pushed in reverse so the first listed
            // folder is the next one visited
            for folder in listing.folders.into_iter().rev() {
                self.pending.push(Some(folder.id));
            }
        }
    }
}

/// Collect every playable file in the account
pub async fn collect_playable(client: &SeedrClient) -> Result<Vec<FileRecord>, SeedrError> {
    let mut walker = FolderWalker::new(client);
    let mut files = Vec::new();
    while let Some(file) = walker.next_file().await? {
        files.push(file);
    }
    Ok(files)
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolve a requested id to playable streams
///
/// No match is an empty list, not an error; any storage or metadata failure
/// aborts the whole resolution so the caller can report it.
pub async fn resolve(
    seedr: &SeedrClient,
    metadata: &CinemetaClient,
    media_type: &str,
    target_raw: &str,
) -> Result<Vec<ResolvedStream>, ResolveError> {
    let target = Target::parse(target_raw);

    let matched = match &target {
        Target::FileId(id) => find_by_id(seedr, id).await?,
        Target::Imdb { id } => {
            let Some(meta) = metadata.lookup(media_type, id).await? else {
                tracing::debug!(%id, "no metadata for imdb id");
                return Ok(Vec::new());
            };
            find_by_title(seedr, &meta).await?
        }
    };

    if matched.is_empty() {
        return Ok(Vec::new());
    }

    // Independent read-only fetches; bounded fan-out, traversal order kept
    let streams = stream::iter(matched)
        .map(|file| async move {
            let link = seedr.fetch_file(file.id).await?;
            Ok::<_, ResolveError>(ResolvedStream::for_file(&file, link.url))
        })
        .buffered(FETCH_CONCURRENCY)
        .try_collect::<Vec<_>>()
        .await?;

    Ok(streams)
}

/// Walk until a direct or derived id match; single result, stops early
async fn find_by_id(seedr: &SeedrClient, id: &str) -> Result<Vec<FileRecord>, SeedrError> {
    let mut walker = FolderWalker::new(seedr);
    while let Some(file) = walker.next_file().await? {
        if file.id.to_string() == id || derived_id(&file.name) == id {
            return Ok(vec![file]);
        }
    }
    Ok(Vec::new())
}

/// Full walk collecting every title/year match
///
/// A file matches when its normalized name contains the normalized title
/// and its raw name contains the literal year string. Without a reported
/// year the title alone decides, which can over-match; with one, files
/// that omit the year are skipped, which can under-match. Both behaviors
/// are deliberate.
async fn find_by_title(seedr: &SeedrClient, meta: &TitleMeta) -> Result<Vec<FileRecord>, SeedrError> {
    let wanted = normalize_title(&meta.name);
    if wanted.is_empty() {
        return Ok(Vec::new());
    }

    let mut walker = FolderWalker::new(seedr);
    let mut matched = Vec::new();
    while let Some(file) = walker.next_file().await? {
        let title_ok = normalize_title(&file.name).contains(&wanted);
        let year_ok = match &meta.year {
            Some(year) => file.name.contains(year.as_str()),
            None => true,
        };
        if title_ok && year_ok {
            matched.push(file);
        }
    }
    Ok(matched)
}

// =============================================================================
// Unit Tests
// =============================================================================
