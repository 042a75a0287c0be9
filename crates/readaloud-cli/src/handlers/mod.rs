//! Command handlers.
//!
//! Handlers are thin: they turn CLI input into controller calls and format
//! results for the terminal. Reading logic lives in `readaloud-core`.

pub mod config;
pub mod languages;
pub mod read;
pub mod segment;

use std::path::{Path, PathBuf};

use readaloud_core::compose_chapters;

use crate::error::CliError;

/// Read one file as UTF-8 text.
pub(crate) fn read_text(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Input {
        path: path.to_path_buf(),
        source,
    })
}

/// Text for a list of files: one file as-is, several as titled chapters.
pub(crate) fn load_document(files: &[PathBuf]) -> Result<String, CliError> {
    if let [single] = files {
        return read_text(single);
    }

    let chapters = files
        .iter()
        .map(|path| Ok((chapter_title(path), read_text(path)?)))
        .collect::<Result<Vec<_>, CliError>>()?;
    Ok(compose_chapters(
        chapters
            .iter()
            .map(|(title, body)| (title.as_str(), body.as_str())),
    ))
}

fn chapter_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace(['_', '-'], " "))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_file_is_read_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        std::fs::write(&path, "Just text.").unwrap();
        assert_eq!(load_document(&[path]).unwrap(), "Just text.");
    }

    #[test]
    fn test_several_files_become_chapters() {
        let dir = tempfile::tempdir().unwrap();
        let one = dir.path().join("chapter_one.txt");
        let two = dir.path().join("chapter-two.txt");
        std::fs::write(&one, "It begins.").unwrap();
        std::fs::write(&two, "It ends.").unwrap();

        assert_eq!(
            load_document(&[one, two]).unwrap(),
            "chapter one. It begins. chapter two. It ends."
        );
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = load_document(&[PathBuf::from("/nonexistent/book.txt")]).unwrap_err();
        assert!(matches!(err, CliError::Input { .. }));
        assert!(err.to_string().contains("book.txt"));
    }
}
