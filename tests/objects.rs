mod common;

use anyhow::Result;
use common::{alice, commit_file, EngineFixture};
use pretty_assertions::assert_eq;
use strata::artifacts::objects::blob::Blob;
use strata::{Error, ObjectId};

#[test]
fn identical_content_stores_under_one_id() -> Result<()> {
    let fixture = EngineFixture::new();
    let repo = fixture.init_repo();

    let first = repo.database().store(&Blob::new("payload".into()))?;
    let second = repo.database().store(&Blob::new("payload".into()))?;
    let other = repo.database().store(&Blob::new("different".into()))?;

    assert_eq!(first, second);
    assert_ne!(first, other);
    Ok(())
}

#[test]
fn stored_blobs_read_back_verbatim() -> Result<()> {
    let fixture = EngineFixture::new();
    let repo = fixture.init_repo();

    let oid = repo.database().store(&Blob::new("hello world\n".into()))?;
    let blob = repo.database().load_blob(&oid)?;

    assert_eq!(blob.data().as_ref(), b"hello world\n");
    Ok(())
}

#[test]
fn loading_an_absent_object_fails_with_not_found() {
    let fixture = EngineFixture::new();
    let repo = fixture.init_repo();

    let oid = ObjectId::try_parse("0".repeat(40)).unwrap();
    let err = repo.database().load(&oid).unwrap_err();
    assert!(matches!(err, Error::ObjectNotFound(_)));
}

#[test]
fn loading_an_object_as_the_wrong_kind_fails() -> Result<()> {
    let fixture = EngineFixture::new();
    let repo = fixture.init_repo();

    let oid = repo.database().store(&Blob::new("not a commit".into()))?;
    let err = repo.database().load_commit(&oid).unwrap_err();
    assert!(matches!(err, Error::Corrupt(_)));
    Ok(())
}

#[test]
fn objects_shard_under_two_hex_directories() -> Result<()> {
    let fixture = EngineFixture::new();
    let repo = fixture.init_repo();

    let oid = repo.database().store(&Blob::new("sharded".into()))?;

    let hash = oid.to_string();
    let path = repo
        .database()
        .objects_path()
        .join(&hash[..2])
        .join(&hash[2..]);
    assert!(path.is_file());
    Ok(())
}

#[test]
fn commit_objects_survive_a_reload() -> Result<()> {
    let fixture = EngineFixture::new();
    let repo = fixture.init_repo();

    let oid = commit_file(&repo, alice(), "a.txt", "content", "  a message  ");
    let commit = repo.database().load_commit(&oid)?;

    assert_eq!(commit.message(), "a message");
    assert_eq!(commit.author(), alice());
    assert_eq!(commit.parent(), None);

    let tree = repo.database().load_tree(commit.tree_oid())?;
    let blob_oid = tree.get("a.txt").expect("tree carries the file");
    assert_eq!(
        repo.database().load_blob(blob_oid)?.data().as_ref(),
        b"content"
    );
    Ok(())
}

#[test]
fn identical_snapshots_reuse_the_same_tree_and_blob() {
    let fixture = EngineFixture::new();
    let repo = fixture.init_repo();

    let first = commit_file(&repo, alice(), "a.txt", "stable", "first");
    // re-commit the same content; only the commit object should be new
    repo.write_file(alice(), "a.txt", b"stable").unwrap();
    repo.stage(alice(), &["a.txt".into()]).unwrap();
    let second = repo.commit(alice(), "second").unwrap();

    let first_commit = repo.database().load_commit(&first).unwrap();
    let second_commit = repo.database().load_commit(&second).unwrap();
    assert_ne!(first, second);
    assert_eq!(first_commit.tree_oid(), second_commit.tree_oid());
}
