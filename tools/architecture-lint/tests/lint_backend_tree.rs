//! Runs the lint over a small on-disk source tree.

use std::fs;
use std::path::Path;

use architecture_lint::{ArchitectureLintError, lint_backend_sources};
use rstest::rstest;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join("src").join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create source directory");
    }
    fs::write(path, contents).expect("write source file");
}

fn valid_tree() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    write(
        dir.path(),
        "domain/project.rs",
        "use crate::domain::ports::ProjectRepository; pub struct ProjectService;",
    );
    write(
        dir.path(),
        "inbound/http/projects.rs",
        "use actix_web::web; use crate::domain::ProjectId; fn handler() {}",
    );
    write(
        dir.path(),
        "outbound/persistence/diesel_project_repository.rs",
        "use diesel::prelude::*; use crate::domain::ports::ProjectRepository; fn query() {}",
    );
    write(dir.path(), "main.rs", "fn main() { let _ = actix_web::web::Data::new(1); }");
    dir
}

#[rstest]
fn clean_tree_passes() {
    let dir = valid_tree();
    lint_backend_sources(dir.path()).expect("no violations");
}

#[rstest]
fn violations_are_collected_across_files() {
    let dir = valid_tree();
    write(
        dir.path(),
        "inbound/http/invites.rs",
        "use tripboard::outbound::mail::SmtpInviteMailer; fn handler() {}",
    );
    write(
        dir.path(),
        "outbound/mail/smtp_invite_mailer.rs",
        "use crate::inbound::http::state::HttpState; fn send() {}",
    );

    let Err(ArchitectureLintError::Violations(violations)) = lint_backend_sources(dir.path())
    else {
        panic!("expected violations");
    };
    let mut files = violations
        .iter()
        .map(|violation| violation.file.to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    files.sort();
    assert_eq!(
        files,
        vec![
            "inbound/http/invites.rs".to_owned(),
            "outbound/mail/smtp_invite_mailer.rs".to_owned(),
        ]
    );
}
