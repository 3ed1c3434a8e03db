//! Card file storage with XDG path support.
//!
//! Cards are read from a JSON file at `~/.local/share/rq/cards.json` by
//! default. The file holds either a bare array of card objects or an object
//! with a `cards` array, which is what most card-store exports produce.

use std::convert::Infallible;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::record::Record;

/// Default card filename.
const CARDS_FILENAME: &str = "cards.json";

/// Application qualifier (for XDG paths).
const QUALIFIER: &str = "";

/// Application organization (for XDG paths).
const ORGANIZATION: &str = "";

/// Application name (for XDG paths).
const APPLICATION: &str = "rq";

/// Errors that can occur while loading cards.
#[derive(Debug, Error)]
pub enum CardStoreError {
    /// Failed to determine the XDG data directory.
    #[error("failed to determine data directory: no valid home directory found")]
    NoDataDir,

    /// I/O error during file read.
    #[error("failed to read card file '{path}': {source}")]
    ReadError {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file is not valid JSON, or not a card array.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for card store operations.
pub type Result<T> = std::result::Result<T, CardStoreError>;

/// Anything that can hand out a snapshot of every record.
///
/// The search pipeline only ever reads records; a source is asked once per
/// search and the snapshot is not refreshed while the search runs.
pub trait RecordSource {
    /// Error produced when the records cannot be read.
    type Error;

    /// Returns every record, in store order.
    fn all_records(&self) -> std::result::Result<Vec<Record>, Self::Error>;
}

impl RecordSource for [Record] {
    type Error = Infallible;

    fn all_records(&self) -> std::result::Result<Vec<Record>, Self::Error> {
        Ok(self.to_vec())
    }
}

impl RecordSource for Vec<Record> {
    type Error = Infallible;

    fn all_records(&self) -> std::result::Result<Vec<Record>, Self::Error> {
        Ok(self.clone())
    }
}

/// Accepted layouts of a card file.
#[derive(Deserialize)]
#[serde(untagged)]
enum CardFile {
    List(Vec<Record>),
    Wrapped { cards: Vec<Record> },
}

impl CardFile {
    fn into_records(self) -> Vec<Record> {
        match self {
            CardFile::List(cards) | CardFile::Wrapped { cards } => cards,
        }
    }
}

/// Read-only record source backed by a JSON file.
///
/// # Example
///
/// ```no_run
/// use recall_search::{CardStore, RecordSource};
///
/// let store = CardStore::new()?;
/// let cards = store.all_records()?;
/// println!("{} cards in {}", cards.len(), store.path().display());
/// # Ok::<(), recall_search::CardStoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CardStore {
    /// Path to the card file.
    path: PathBuf,
}

impl CardStore {
    /// Creates a `CardStore` at the default XDG data path.
    ///
    /// # Errors
    ///
    /// Returns `CardStoreError::NoDataDir` if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        let path = Self::default_path()?;
        Ok(Self { path })
    }

    /// Creates a `CardStore` reading from `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the default card file path.
    ///
    /// On Unix: `~/.local/share/rq/cards.json`
    /// On macOS: `~/Library/Application Support/rq/cards.json`
    ///
    /// # Errors
    ///
    /// Returns `CardStoreError::NoDataDir` if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .ok_or(CardStoreError::NoDataDir)?;

        Ok(project_dirs.data_dir().join(CARDS_FILENAME))
    }

    /// Returns the path to the card file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the card file exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads every card from disk.
    ///
    /// A missing file is an empty collection. Array elements that are not
    /// objects are rejected as a JSON error.
    ///
    /// # Errors
    ///
    /// - Returns `CardStoreError::ReadError` for I/O errors other than "file not found".
    /// - Returns `CardStoreError::Json` if the file is not a card array.
    pub fn load(&self) -> Result<Vec<Record>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("card file {} not found, using no cards", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(CardStoreError::ReadError {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        let cards = parse_cards(&contents)?;
        log::debug!("loaded {} cards from {}", cards.len(), self.path.display());
        Ok(cards)
    }
}

impl RecordSource for CardStore {
    type Error = CardStoreError;

    fn all_records(&self) -> Result<Vec<Record>> {
        self.load()
    }
}

/// Parses the contents of a card file.
fn parse_cards(contents: &str) -> Result<Vec<Record>> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    let file: CardFile = serde_json::from_str(contents)?;
    Ok(file.into_records())
}
