//! Unit tests for the architecture lint.

use std::path::PathBuf;

use rstest::fixture;
use rstest::rstest;

use super::*;

#[derive(Clone, Copy)]
struct LintSingle;

impl LintSingle {
    fn lint(self, file: &str, contents: &str) -> Result<(), ArchitectureLintError> {
        lint_sources(&[LintSource {
            file: PathBuf::from(file),
            contents: contents.to_owned(),
        }])
    }
}

#[fixture]
fn lint_single() -> LintSingle {
    LintSingle
}

#[rstest]
#[case(
    "inbound/http/projects.rs",
    "use crate::domain::ProjectId; fn handler() { let _ = ProjectId::random(); }",
    true
)]
#[case(
    "inbound/http/projects.rs",
    "use crate::outbound::persistence::DieselProjectRepository; fn handler() { let _ = DieselProjectRepository; }",
    false
)]
#[case(
    "inbound/http/projects.rs",
    "use outbound::persistence::DieselProjectRepository; fn handler() {}",
    false
)]
#[case(
    "inbound/http/projects.rs",
    "use tripboard::outbound::persistence::DieselProjectRepository; fn handler() {}",
    false
)]
#[case("inbound/http/projects.rs", "use diesel::prelude::*; fn handler() {}", false)]
#[case(
    "inbound/http/places.rs",
    "fn handler() { let _ = reqwest::Client::new(); }",
    false
)]
#[case(
    "domain/project.rs",
    "use crate::inbound::http; fn thing() { let _ = 1; }",
    false
)]
#[case(
    "domain/invite_service.rs",
    "use lettre::Message; fn thing() {}",
    false
)]
#[case(
    "domain/place.rs",
    "use utoipa::ToSchema; #[derive(ToSchema)] struct Foo;",
    false
)]
#[case(
    "domain/places_search.rs",
    "use sha2::{Digest, Sha256}; fn key() { let _ = Sha256::digest(b\"q\"); }",
    true
)]
#[case(
    "outbound/persistence/diesel_project_repository.rs",
    "use crate::inbound::http; fn thing() { let _ = 1; }",
    false
)]
#[case(
    "outbound/cache/redis_search_cache.rs",
    "use actix_web::HttpResponse; fn thing() {}",
    false
)]
#[case(
    "outbound/cache/redis_search_cache.rs",
    "use bb8_redis::RedisConnectionManager; use crate::domain::ports::SearchCache; fn thing() {}",
    true
)]
fn detects_boundary_violations(
    lint_single: LintSingle,
    #[case] file: &str,
    #[case] contents: &str,
    #[case] ok: bool,
) {
    let result = lint_single.lint(file, contents);
    assert_eq!(result.is_ok(), ok, "result: {result:?}");
}

#[rstest]
fn files_outside_the_layers_are_rejected(lint_single: LintSingle) {
    let result = lint_single.lint("server/mod.rs", "fn main() {}");
    assert!(matches!(result, Err(ArchitectureLintError::Parse { .. })));
}

#[rstest]
fn each_file_reports_each_rule_once(lint_single: LintSingle) {
    let result = lint_single.lint(
        "domain/project.rs",
        "use diesel::prelude::*; use diesel::sql_types::Text; fn thing() { let _ = diesel::insert_into; }",
    );
    let Err(ArchitectureLintError::Violations(violations)) = result else {
        panic!("expected violations");
    };
    let messages: Vec<&str> = violations.iter().map(|v| v.message.as_str()).collect();
    assert_eq!(
        messages,
        ["domain module must not depend on external crate `diesel`"]
    );
}
