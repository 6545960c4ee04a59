//! Fee proposal composer.
//!
//! # Responsibility
//! - Turn a `ProposalForm` into formatted text blocks (`composer`).
//! - Paginate blocks into a letterhead-safe area (`pagination`).
//! - Render the blocks as an HTML preview and as a DOCX package.
//!
//! # Invariants
//! - Composition is deterministic: the same form, firm and date yield the same blocks.
//! - Preview and document embed the same block text.

pub mod composer;
pub mod docx;
pub mod form;
pub mod pagination;
pub mod preview;

use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Horizontal alignment of one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
    Justify,
}

/// A span of text with uniform weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

/// One paragraph of the proposal.
///
/// Spacing is expressed in twentieths of a point, the unit the document
/// format uses natively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub runs: Vec<Run>,
    pub align: Align,
    pub spacing_before: u32,
    pub spacing_after: u32,
}

impl Block {
    pub fn new(runs: Vec<Run>) -> Self {
        Self {
            runs,
            align: Align::Justify,
            spacing_before: 0,
            spacing_after: 200,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![Run::plain(text)])
    }

    pub fn bold_text(text: impl Into<String>) -> Self {
        Self::new(vec![Run::bold(text)])
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn before(mut self, twips: u32) -> Self {
        self.spacing_before = twips;
        self
    }

    pub fn after(mut self, twips: u32) -> Self {
        self.spacing_after = twips;
        self
    }

    /// Concatenated text of every run.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

#[derive(Debug)]
pub enum ProposalError {
    /// The linked contract does not exist.
    ContractNotFound(crate::model::EntityId),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Package(zip::result::ZipError),
    Repo(RepoError),
}

impl Display for ProposalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContractNotFound(id) => write!(f, "contract not found: {id}"),
            Self::Io { path, source } => {
                write!(f, "cannot write `{}`: {source}", path.display())
            }
            Self::Package(err) => write!(f, "document packaging failed: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProposalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Package(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::ContractNotFound(_) => None,
        }
    }
}

impl From<zip::result::ZipError> for ProposalError {
    fn from(value: zip::result::ZipError) -> Self {
        Self::Package(value)
    }
}

impl From<RepoError> for ProposalError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "contract",
                id,
            } => Self::ContractNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type ProposalResult<T> = Result<T, ProposalError>;
