mod common;

use common::TestRepo;
use machete::branch::LocalBranchShortName;
use machete::ops::{DiscoverOptions, Direction, Session};

fn branch(name: &str) -> LocalBranchShortName {
    LocalBranchShortName::new(name.to_string()).unwrap()
}

#[test]
fn discover_infers_layout_from_branch_history() {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "root commit");
    repo.checkout_new_branch("feature");
    repo.commit_file("feature.txt", "feature work");
    repo.checkout("main");

    let mut session = Session::open_at(repo.handle(), true).unwrap();
    session
        .discover(DiscoverOptions {
            roots: vec![branch("main")],
            checked_out_since: None,
            yes: true,
        })
        .unwrap();

    assert!(session.layout.is_managed(&branch("feature")));
    assert_eq!(session.layout.parent_of(&branch("feature")), Some(&branch("main")));

    let reopened = Session::open_at(repo.handle(), true).unwrap();
    assert!(reopened.layout.is_managed(&branch("feature")));
}

#[test]
fn go_up_checks_out_parent() {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "root commit");
    repo.checkout_new_branch("feature");
    repo.commit_file("feature.txt", "feature work");

    let mut session = Session::open_at(repo.handle(), true).unwrap();
    session
        .add(
            branch("main"),
            machete::ops::AddOptions {
                onto: None,
                as_root: true,
                as_first_child: false,
                switch_head: false,
            },
        )
        .unwrap();
    session
        .add(
            branch("feature"),
            machete::ops::AddOptions {
                onto: Some(branch("main")),
                as_root: false,
                as_first_child: false,
                switch_head: false,
            },
        )
        .unwrap();

    session.go(Direction::Up).unwrap();
    assert_eq!(repo.current_branch(), "main");
}

#[test]
fn show_down_reports_unique_child_without_checking_out() {
    let repo = TestRepo::new();
    repo.commit_file("README.md", "root commit");
    repo.checkout_new_branch("feature");
    repo.commit_file("feature.txt", "feature work");
    repo.checkout("main");

    let mut session = Session::open_at(repo.handle(), true).unwrap();
    session
        .add(
            branch("main"),
            machete::ops::AddOptions {
                onto: None,
                as_root: true,
                as_first_child: false,
                switch_head: false,
            },
        )
        .unwrap();
    session
        .add(
            branch("feature"),
            machete::ops::AddOptions {
                onto: Some(branch("main")),
                as_root: false,
                as_first_child: false,
                switch_head: false,
            },
        )
        .unwrap();

    let target = session.resolve_direction(Direction::Down).unwrap();
    assert_eq!(target, branch("feature"));
    assert_eq!(repo.current_branch(), "main", "show must not check anything out");
}
