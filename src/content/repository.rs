use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use super::model::{AboutRecord, ContactRecord, ContactsFile, ProjectRecord};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("content worker is no longer running")]
    WorkerGone,
}

/// Source of site content. Implementations are moved onto the loader thread.
pub trait ContentRepository: Send + 'static {
    fn projects(&self) -> Result<Vec<ProjectRecord>, ContentError>;
    fn contacts(&self) -> Result<Vec<ContactRecord>, ContentError>;
    fn about(&self) -> Result<AboutRecord, ContentError>;
}

/// Reads the site's JSON files from a content directory.
#[derive(Clone, Debug)]
pub struct FsRepository {
    root: PathBuf,
}

impl FsRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_json<T: DeserializeOwned>(&self, relative: &str) -> Result<T, ContentError> {
        let path = self.root.join(relative);
        let raw = fs::read_to_string(&path).map_err(|source| ContentError::Io {
            path: path.clone(),
            source,
        })?;
        parse_json(&path, &raw)
    }
}

fn parse_json<T: DeserializeOwned>(path: &Path, raw: &str) -> Result<T, ContentError> {
    serde_json::from_str(raw).map_err(|source| ContentError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl ContentRepository for FsRepository {
    fn projects(&self) -> Result<Vec<ProjectRecord>, ContentError> {
        self.read_json("projects/_index.json")
    }

    fn contacts(&self) -> Result<Vec<ContactRecord>, ContentError> {
        self.read_json::<ContactsFile>("contacts.json")
            .map(|file| file.items)
    }

    fn about(&self) -> Result<AboutRecord, ContentError> {
        self.read_json("about.json")
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn reads_all_three_content_files() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "projects/_index.json",
            r#"[{"title": "Drift", "slug": "drift", "category": "visuals"}]"#,
        );
        write(
            dir.path(),
            "contacts.json",
            r#"{"items": [{"name": "Mail", "slug": "mail", "url": "mailto:a@b.c"}]}"#,
        );
        write(dir.path(), "about.json", r#"{"text": "hello ==world=="}"#);

        let repository = FsRepository::new(dir.path());
        assert_eq!(repository.projects().unwrap()[0].category, "visuals");
        assert_eq!(
            repository.contacts().unwrap()[0].url.as_deref(),
            Some("mailto:a@b.c")
        );
        assert_eq!(repository.about().unwrap().text, "hello ==world==");
    }

    #[test]
    fn missing_and_malformed_files_are_typed_errors() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "about.json", "{ not json");

        let repository = FsRepository::new(dir.path());
        assert!(matches!(
            repository.projects(),
            Err(ContentError::Io { .. })
        ));
        assert!(matches!(repository.about(), Err(ContentError::Parse { .. })));
    }
}
