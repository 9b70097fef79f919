use include_dir::{include_dir, Dir};
use serde::Deserialize;
use std::{collections::HashSet, fs, path::Path, sync::Arc};
use thiserror::Error;
use tracing::debug;

static CATALOG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/assets/catalog");

const BUILTIN_FILE: &str = "tracks.json";

/// Track opened by the home screen's "continue" action when nothing was recommended
pub const DEFAULT_TRACK_ID: &str = "meu-nome";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file `{0}` not found")]
    Missing(String),
    #[error("unable to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("track with an empty id")]
    EmptyId,
    #[error("duplicate track id `{0}`")]
    DuplicateId(String),
    #[error("track `{track}` step {step} has no options")]
    NoOptions { track: String, step: usize },
    #[error("track `{track}` step {step} marks option {index} correct but has {len} options")]
    CorrectIndexOutOfRange {
        track: String,
        step: usize,
        index: usize,
        len: usize,
    },
}

/// Kind-specific payload of a step
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepKind {
    TextEntry {
        #[serde(default)]
        placeholder: Option<String>,
    },
    ChoiceSelect {
        options: Vec<String>,
        /// Carried with the data but never graded
        #[serde(default)]
        correct_index: Option<usize>,
    },
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StepDefinition {
    pub question: String,
    pub instruction: String,
    #[serde(flatten)]
    pub kind: StepKind,
}

impl StepDefinition {
    pub fn options(&self) -> &[String] {
        match &self.kind {
            StepKind::ChoiceSelect { options, .. } => options,
            StepKind::TextEntry { .. } => &[],
        }
    }

    pub fn is_text_entry(&self) -> bool {
        matches!(self.kind, StepKind::TextEntry { .. })
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

#[derive(Deserialize)]
struct CatalogFile {
    tracks: Vec<Track>,
}

/// Read-only table of tracks in display order
#[derive(Debug, Clone)]
pub struct TrackCatalog {
    tracks: Vec<Arc<Track>>,
}

impl TrackCatalog {
    pub fn new(tracks: Vec<Track>) -> Result<Self, CatalogError> {
        validate(&tracks)?;
        Ok(Self {
            tracks: tracks.into_iter().map(Arc::new).collect(),
        })
    }

    /// The catalog compiled into the binary
    pub fn builtin() -> Result<Self, CatalogError> {
        let file = CATALOG_DIR
            .get_file(BUILTIN_FILE)
            .ok_or_else(|| CatalogError::Missing(BUILTIN_FILE.to_string()))?;
        let contents = file
            .contents_utf8()
            .ok_or_else(|| CatalogError::Missing(BUILTIN_FILE.to_string()))?;
        Self::from_json(contents)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "loading catalog");
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.tracks)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Track>> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn tracks(&self) -> &[Arc<Track>] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn first_unlocked(&self) -> Option<&Arc<Track>> {
        self.tracks.iter().find(|t| !t.locked)
    }
}

fn validate(tracks: &[Track]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for track in tracks {
        if track.id.trim().is_empty() {
            return Err(CatalogError::EmptyId);
        }
        if !seen.insert(track.id.as_str()) {
            return Err(CatalogError::DuplicateId(track.id.clone()));
        }
        for (step, def) in track.steps.iter().enumerate() {
            if let StepKind::ChoiceSelect {
                options,
                correct_index,
            } = &def.kind
            {
                if options.is_empty() {
                    return Err(CatalogError::NoOptions {
                        track: track.id.clone(),
                        step,
                    });
                }
                if let Some(index) = *correct_index {
                    if index >= options.len() {
                        return Err(CatalogError::CorrectIndexOutOfRange {
                            track: track.id.clone(),
                            step,
                            index,
                            len: options.len(),
                        });
                    }
                }
            }
        }
    }
    Ok(())
}
