mod common;

use common::{alice, bob, commit_file, read_string, EngineFixture};
use pretty_assertions::assert_eq;
use std::sync::Barrier;
use std::time::Duration;
use strata::{Error, RepoId, StoreConfig};

#[test]
fn the_lock_can_be_reacquired_after_the_guard_drops() {
    let fixture = EngineFixture::new();
    let repo = fixture.init_repo();

    let guard = repo.lock().unwrap();
    drop(guard);
    let _guard = repo.lock().unwrap();
}

#[test]
fn a_held_lock_makes_other_acquisitions_busy() {
    let fixture = EngineFixture::with_config(StoreConfig {
        lock_wait: Duration::from_millis(50),
        ..StoreConfig::default()
    });
    let repo = fixture.init_repo();
    let other = fixture.store.open(RepoId::new(1)).unwrap();

    let guard = repo.lock().unwrap();
    let err = other.lock().unwrap_err();
    assert!(matches!(err, Error::Busy(_)));

    drop(guard);
    assert!(other.lock().is_ok());
}

#[test]
fn simultaneous_commits_serialize_into_one_chain() {
    let fixture = EngineFixture::new();
    fixture.init_repo();

    let barrier = Barrier::new(2);
    std::thread::scope(|scope| {
        for (user, path) in [(alice(), "a.txt"), (bob(), "b.txt")] {
            let store = &fixture.store;
            let barrier = &barrier;
            scope.spawn(move || {
                let repo = store.open(RepoId::new(1)).unwrap();
                repo.write_file(user, path, b"content").unwrap();
                repo.stage(user, &[path.to_string()]).unwrap();
                barrier.wait();
                repo.commit(user, "racing commit").unwrap();
            });
        }
    });

    // whichever commit lost the race chained onto the winner
    let repo = fixture.store.open(RepoId::new(1)).unwrap();
    let commits = repo.list_commits().unwrap();
    assert_eq!(commits.len(), 2);
    assert!(commits[0].parents.is_empty());
    assert_eq!(commits[1].parents, vec![commits[0].hash.clone()]);
    assert_eq!(read_string(&repo, "a.txt"), Some("content".into()));
    assert_eq!(read_string(&repo, "b.txt"), Some("content".into()));
}

#[test]
fn separate_handles_to_one_repository_share_state() {
    let fixture = EngineFixture::new();
    fixture.init_repo();

    let first = fixture.store.open(RepoId::new(1)).unwrap();
    let second = fixture.store.open(RepoId::new(1)).unwrap();

    commit_file(&first, alice(), "a.txt", "from first", "via first handle");
    commit_file(&second, bob(), "b.txt", "from second", "via second handle");

    let commits = first.list_commits().unwrap();
    assert_eq!(commits.len(), 2);
    assert_eq!(read_string(&second, "a.txt"), Some("from first".into()));
    assert_eq!(read_string(&first, "b.txt"), Some("from second".into()));
}

#[test]
fn repositories_are_isolated_from_each_other() {
    let fixture = EngineFixture::new();

    let one = fixture.store.init(RepoId::new(1)).unwrap();
    let two = fixture.store.init(RepoId::new(2)).unwrap();

    commit_file(&one, alice(), "only-in-one.txt", "x", "first");

    assert!(two.list_commits().unwrap().is_empty());
    assert_eq!(read_string(&two, "only-in-one.txt"), None);
    assert!(fixture.store.exists(RepoId::new(1)));
    assert!(fixture.store.exists(RepoId::new(2)));
    assert!(!fixture.store.exists(RepoId::new(3)));
}
