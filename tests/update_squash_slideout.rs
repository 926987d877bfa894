mod common;

use common::TestRepo;
use machete::branch::LocalBranchShortName;
use machete::ops::{AddOptions, Session};

fn branch(name: &str) -> LocalBranchShortName {
    LocalBranchShortName::new(name.to_string()).unwrap()
}

fn add(session: &mut Session, name: &str, onto: Option<&str>, as_root: bool) {
    session
        .add(
            branch(name),
            AddOptions {
                onto: onto.map(|o| branch(o)),
                as_root,
                as_first_child: false,
                switch_head: false,
            },
        )
        .unwrap();
}

#[test]
fn update_rebases_child_onto_advanced_parent() {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "root commit");
    repo.checkout_new_branch("feature");
    repo.commit_file("feature.txt", "feature work");
    repo.checkout("main");
    repo.commit_file("main2.txt", "main moves on");
    repo.checkout("feature");

    let mut session = Session::open_at(repo.handle(), true).unwrap();
    add(&mut session, "main", None, true);
    add(&mut session, "feature", Some("main"), false);

    session.update(false, None).unwrap();

    let log = repo.run_git_stdout(&["log", "--oneline", "main..feature"]);
    assert_eq!(log.lines().count(), 1, "feature should have exactly its own commit on top of main: {log}");

    // Rebased onto the new tip of main means main is now an ancestor of feature.
    repo.run_git(&["merge-base", "--is-ancestor", "main", "feature"]);
}

#[test]
fn squash_collapses_multiple_commits_into_one() {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "root commit");
    repo.checkout_new_branch("feature");
    repo.commit_file("a.txt", "commit a");
    repo.commit_file("b.txt", "commit b");
    repo.commit_file("c.txt", "commit c");

    let mut session = Session::open_at(repo.handle(), true).unwrap();
    add(&mut session, "main", None, true);
    add(&mut session, "feature", Some("main"), false);

    session.squash(None).unwrap();

    let log = repo.run_git_stdout(&["log", "--oneline", "main..feature"]);
    assert_eq!(log.lines().count(), 1, "expected a single squashed commit: {log}");

    // Working tree should still carry all three files' content.
    assert!(repo.path().join("a.txt").exists());
    assert!(repo.path().join("b.txt").exists());
    assert!(repo.path().join("c.txt").exists());
}

#[test]
fn squash_with_single_commit_is_a_no_op() {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "root commit");
    repo.checkout_new_branch("feature");
    repo.commit_file("a.txt", "commit a");

    let mut session = Session::open_at(repo.handle(), true).unwrap();
    add(&mut session, "main", None, true);
    add(&mut session, "feature", Some("main"), false);

    let before = repo.run_git_stdout(&["rev-parse", "feature"]);
    session.squash(None).unwrap();
    let after = repo.run_git_stdout(&["rev-parse", "feature"]);
    assert_eq!(before, after, "squash with a single commit must not rewrite history");
}

#[test]
fn slide_out_reparents_children_onto_grandparent() {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "root commit");
    repo.checkout_new_branch("middle");
    repo.commit_file("middle.txt", "middle work");
    repo.checkout_new_branch("leaf");
    repo.commit_file("leaf.txt", "leaf work");
    repo.checkout("main");

    let mut session = Session::open_at(repo.handle(), true).unwrap();
    add(&mut session, "main", None, true);
    add(&mut session, "middle", Some("main"), false);
    add(&mut session, "leaf", Some("middle"), false);

    session.slide_out(&[branch("middle")], false).unwrap();

    assert!(!session.layout.is_managed(&branch("middle")));
    assert!(session.layout.is_managed(&branch("leaf")));
    assert_eq!(session.layout.parent_of(&branch("leaf")), Some(&branch("main")));
}

#[test]
fn slide_out_rejects_non_unique_child_chain() {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "root commit");
    repo.checkout_new_branch("middle");
    repo.commit_file("middle.txt", "middle work");
    repo.checkout("main");
    repo.checkout_new_branch("sibling");
    repo.commit_file("sibling.txt", "sibling work");
    repo.checkout("main");

    let mut session = Session::open_at(repo.handle(), true).unwrap();
    add(&mut session, "main", None, true);
    add(&mut session, "middle", Some("main"), false);
    add(&mut session, "sibling", Some("main"), false);

    let result = session.slide_out(&[branch("main"), branch("middle")], false);
    assert!(result.is_err(), "main has two children, so the chain is ambiguous");
}
