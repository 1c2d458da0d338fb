mod common;

use common::{alice, bob, commit_file, EngineFixture};
use pretty_assertions::assert_eq;
use strata::{Error, FileStatus};

#[test]
fn a_stashed_staging_set_round_trips() {
    let fixture = EngineFixture::new();
    let repo = fixture.init_repo();

    repo.write_file(alice(), "a.txt", b"one").unwrap();
    repo.write_file(alice(), "b.txt", b"two").unwrap();
    repo.stage(alice(), &["a.txt".into(), "b.txt".into()])
        .unwrap();

    let slot = repo.stash_save(alice()).unwrap();
    assert_eq!(slot, 0);
    assert!(repo.status(alice()).unwrap().staged.is_empty());

    let listing = repo.stash_list(alice()).unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].entry_count, 2);

    repo.stash_apply(alice(), 0).unwrap();
    assert_eq!(repo.status(alice()).unwrap().staged.len(), 2);
    assert!(repo.stash_list(alice()).unwrap().is_empty());
}

#[test]
fn stashing_with_nothing_staged_fails() {
    let fixture = EngineFixture::new();
    let repo = fixture.init_repo();

    repo.write_file(alice(), "a.txt", b"unstaged").unwrap();
    let err = repo.stash_save(alice()).unwrap_err();
    assert!(matches!(err, Error::NothingToStash));
}

#[test]
fn applying_an_unknown_slot_fails() {
    let fixture = EngineFixture::new();
    let repo = fixture.init_repo();

    let err = repo.stash_apply(alice(), 0).unwrap_err();
    assert!(matches!(err, Error::NoSuchStash(0)));
}

#[test]
fn stacks_are_kept_per_user() {
    let fixture = EngineFixture::new();
    let repo = fixture.init_repo();

    repo.write_file(alice(), "a.txt", b"alice").unwrap();
    repo.stage(alice(), &["a.txt".into()]).unwrap();
    repo.stash_save(alice()).unwrap();

    assert!(repo.stash_list(bob()).unwrap().is_empty());
    let err = repo.stash_apply(bob(), 0).unwrap_err();
    assert!(matches!(err, Error::NoSuchStash(0)));

    // alice's slot is untouched by bob's attempt
    assert_eq!(repo.stash_list(alice()).unwrap().len(), 1);
}

#[test]
fn slots_are_addressed_by_position_in_the_users_stack() {
    let fixture = EngineFixture::new();
    let repo = fixture.init_repo();

    repo.write_file(alice(), "first.txt", b"1").unwrap();
    repo.stage(alice(), &["first.txt".into()]).unwrap();
    assert_eq!(repo.stash_save(alice()).unwrap(), 0);

    repo.write_file(alice(), "second.txt", b"2").unwrap();
    repo.stage(alice(), &["second.txt".into()]).unwrap();
    assert_eq!(repo.stash_save(alice()).unwrap(), 1);

    // consuming the oldest slot shifts the newer one down
    repo.stash_apply(alice(), 0).unwrap();
    let staged = repo.status(alice()).unwrap().staged;
    assert_eq!(staged.len(), 1);
    assert_eq!(staged[0].path, "first.txt");

    let listing = repo.stash_list(alice()).unwrap();
    assert_eq!(listing.len(), 1);
    repo.stash_apply(alice(), 0).unwrap();
    assert_eq!(repo.status(alice()).unwrap().staged.len(), 2);
}

#[test]
fn applying_over_a_colliding_path_prefers_the_stashed_entry() {
    let fixture = EngineFixture::new();
    let repo = fixture.init_repo();

    commit_file(&repo, alice(), "a.txt", "committed", "base");

    repo.write_file(alice(), "a.txt", b"edited").unwrap();
    repo.stage(alice(), &["a.txt".into()]).unwrap();
    repo.stash_save(alice()).unwrap();

    repo.delete_file(alice(), "a.txt").unwrap();
    repo.stage(alice(), &["a.txt".into()]).unwrap();

    repo.stash_apply(alice(), 0).unwrap();
    let staged = repo.status(alice()).unwrap().staged;
    assert_eq!(staged.len(), 1);
    assert_eq!(staged[0].status, FileStatus::Modified);
}
