#![allow(dead_code)]

use assert_fs::TempDir;
use strata::{ObjectId, RepoId, Repository, RepositoryStore, StoreConfig, UserId};

/// A store rooted in a temp directory that lives as long as the fixture.
pub struct EngineFixture {
    pub store: RepositoryStore,
    temp: TempDir,
}

impl EngineFixture {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("failed to create temp directory");
        let store = RepositoryStore::new(temp.path());
        EngineFixture { store, temp }
    }

    pub fn with_config(config: StoreConfig) -> Self {
        let temp = TempDir::new().expect("failed to create temp directory");
        let store = RepositoryStore::with_config(temp.path(), config);
        EngineFixture { store, temp }
    }

    pub fn init_repo(&self) -> Repository {
        self.store
            .init(RepoId::new(1))
            .expect("failed to initialize repository")
    }
}

pub fn alice() -> UserId {
    UserId::new(1)
}

pub fn bob() -> UserId {
    UserId::new(2)
}

/// Write, stage, and commit a single file.
pub fn commit_file(
    repo: &Repository,
    user: UserId,
    path: &str,
    content: &str,
    message: &str,
) -> ObjectId {
    repo.write_file(user, path, content.as_bytes())
        .expect("failed to write file");
    repo.stage(user, &[path.to_string()])
        .expect("failed to stage file");
    repo.commit(user, message).expect("failed to commit")
}

pub fn read_string(repo: &Repository, path: &str) -> Option<String> {
    repo.read_file(path)
        .expect("failed to read file")
        .map(|content| String::from_utf8(content.to_vec()).expect("non-utf8 file content"))
}
