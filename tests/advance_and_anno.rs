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
fn advance_fast_forwards_to_in_sync_child() {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "root commit");
    repo.checkout_new_branch("feature");
    repo.commit_file("feature.txt", "feature work");
    repo.checkout("main");

    let mut session = Session::open_at(repo.handle(), true).unwrap();
    add(&mut session, "main", None, true);
    add(&mut session, "feature", Some("main"), false);

    session.advance(false, false).unwrap();

    let main_tip = repo.run_git_stdout(&["rev-parse", "main"]);
    let feature_tip = repo.run_git_stdout(&["rev-parse", "feature"]);
    assert_eq!(main_tip, feature_tip, "advance should fast-forward main to feature's tip");
}

#[test]
fn advance_errors_when_no_child_is_in_sync() {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "root commit");
    repo.checkout_new_branch("feature");
    repo.commit_file("feature.txt", "feature work");
    repo.checkout("main");
    repo.commit_file("main2.txt", "main diverges");

    let mut session = Session::open_at(repo.handle(), true).unwrap();
    add(&mut session, "main", None, true);
    add(&mut session, "feature", Some("main"), false);

    let result = session.advance(false, false);
    assert!(result.is_err(), "feature is behind main's new commit, not in sync");
}

#[test]
fn anno_set_and_show_round_trip() {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "root commit");
    repo.checkout_new_branch("feature");
    repo.commit_file("feature.txt", "feature work");

    let mut session = Session::open_at(repo.handle(), true).unwrap();
    add(&mut session, "main", None, true);
    add(&mut session, "feature", Some("main"), false);

    session.anno_set(&branch("feature"), "needs review").unwrap();
    assert_eq!(
        session.layout.annotations.get(&branch("feature")).unwrap().unformatted_full_text(),
        "needs review"
    );

    // Persisted across a fresh load.
    let reopened = Session::open_at(repo.handle(), true).unwrap();
    assert_eq!(
        reopened.layout.annotations.get(&branch("feature")).unwrap().unformatted_full_text(),
        "needs review"
    );
}

#[test]
fn anno_set_empty_text_clears_annotation() {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "root commit");
    repo.checkout_new_branch("feature");
    repo.commit_file("feature.txt", "feature work");

    let mut session = Session::open_at(repo.handle(), true).unwrap();
    add(&mut session, "main", None, true);
    add(&mut session, "feature", Some("main"), false);

    session.anno_set(&branch("feature"), "needs review").unwrap();
    session.anno_set(&branch("feature"), "").unwrap();
    assert!(session.layout.annotations.get(&branch("feature")).is_none());
}
