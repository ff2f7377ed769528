//! Books manifest for the `submission` command
//!
//! ```toml
//! [[books]]
//! code = "paf"
//! first_chapter = 1
//! last_chapter = 19
//! path = "data/prelude/chapter_{chapter}.tagged.txt"
//! ```

use std::path::{Path, PathBuf};

use castgraph_core::{ChapterId, ChapterInput, ChapterJob};
use color_eyre::eyre::{bail, Result, WrapErr};
use serde::Deserialize;

/// Placeholder replaced by the chapter number in a book's path template
pub const CHAPTER_PLACEHOLDER: &str = "{chapter}";

/// Every book of a submission
#[derive(Debug, Clone, Deserialize)]
pub struct BooksManifest {
    /// Books in submission order
    pub books: Vec<Book>,
}

/// One book and where its tagged chapters live
#[derive(Debug, Clone, Deserialize)]
pub struct Book {
    /// Prefix of the chapter ids, e.g. `paf`
    pub code: String,
    /// First chapter number, counted from 1
    #[serde(default = "default_first_chapter")]
    pub first_chapter: usize,
    /// Last chapter number, inclusive
    pub last_chapter: usize,
    /// Path template containing `{chapter}`, relative to the manifest
    pub path: String,
}

fn default_first_chapter() -> usize {
    1
}

impl BooksManifest {
    /// Read a manifest and resolve relative chapter paths against its directory
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading books manifest {}", path.display()))?;
        let mut manifest: BooksManifest = toml::from_str(&content)
            .wrap_err_with(|| format!("parsing books manifest {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for book in &mut manifest.books {
            if Path::new(&book.path).is_relative() {
                book.path = base.join(&book.path).to_string_lossy().into_owned();
            }
        }
        manifest.check()?;
        Ok(manifest)
    }

    fn check(&self) -> Result<()> {
        for book in &self.books {
            if !book.path.contains(CHAPTER_PLACEHOLDER) {
                bail!("book '{}': path has no {} placeholder", book.code, CHAPTER_PLACEHOLDER);
            }
            if book.first_chapter == 0 || book.first_chapter > book.last_chapter {
                bail!(
                    "book '{}': invalid chapter range {}..={}",
                    book.code,
                    book.first_chapter,
                    book.last_chapter
                );
            }
        }
        Ok(())
    }

    /// Read every chapter into a job, books in manifest order
    pub fn jobs(&self) -> Result<Vec<ChapterJob>> {
        let mut jobs = Vec::new();
        for book in &self.books {
            for chapter in book.first_chapter..=book.last_chapter {
                let path = book.chapter_path(chapter);
                let input = ChapterInput::tagged_file(&path)
                    .wrap_err_with(|| format!("reading chapter {}", path.display()))?;
                jobs.push(ChapterJob {
                    id: ChapterId::from_chapter_number(&book.code, chapter),
                    input,
                });
            }
        }
        Ok(jobs)
    }
}

impl Book {
    /// File holding chapter `chapter`
    pub fn chapter_path(&self, chapter: usize) -> PathBuf {
        PathBuf::from(self.path.replace(CHAPTER_PLACEHOLDER, &chapter.to_string()))
    }
}
