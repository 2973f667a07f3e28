use std::fs;
use std::path::PathBuf;

use crate::error::Result;
use crate::store::Session;
use crate::types::File;

/// Stores uploaded file contents next to their metadata row.
pub trait FileStorage: Send + Sync {
    fn create(&self, session: &Session<'_>, content: &[u8], name: &str, owner_id: i64) -> Result<File>;

    fn read(&self, file: &File) -> Result<Vec<u8>>;
}

/// Keeps file contents under `<data_dir>/files/<id>`.
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: data_dir.into().join("files"),
        }
    }

    fn path_for(&self, id: i64) -> PathBuf {
        self.root.join(id.to_string())
    }
}

impl FileStorage for LocalFileStorage {
    fn create(&self, session: &Session<'_>, content: &[u8], name: &str, owner_id: i64) -> Result<File> {
        let size = i64::try_from(content.len()).unwrap_or(i64::MAX);
        let file = session.create_file(name, size, owner_id)?;

        fs::create_dir_all(&self.root)?;
        fs::write(self.path_for(file.id), content)?;

        tracing::debug!(file_id = file.id, size, "Stored file {name}");
        Ok(file)
    }

    fn read(&self, file: &File) -> Result<Vec<u8>> {
        Ok(fs::read(self.path_for(file.id))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{SqliteStore, Store, transact};
    use tempfile::TempDir;

    #[test]
    fn test_create_and_read() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::new(&dir.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        let storage = LocalFileStorage::new(dir.path());

        let file = transact(&store, |s| {
            let user = s.create_user("alice", "alice@example.com")?;
            storage.create(s, b"background", "bg.png", user.id)
        })
        .unwrap();

        assert_eq!(file.size, 10);
        assert!(dir.path().join("files").join(file.id.to_string()).exists());
        assert_eq!(storage.read(&file).unwrap(), b"background");

        let session = store.session().unwrap();
        assert_eq!(session.get_file(file.id).unwrap().unwrap().name, "bg.png");
    }
}
