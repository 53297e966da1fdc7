//! Contract checks over the exported OpenAPI document.

use std::collections::HashSet;

use serde_json::Value;
use tripboard::ApiDoc;
use utoipa::OpenApi;

fn document() -> Value {
    let json = ApiDoc::openapi().to_pretty_json().expect("document serialises");
    serde_json::from_str(&json).expect("document is JSON")
}

fn operations(doc: &Value) -> Vec<(String, String, &Value)> {
    doc["paths"]
        .as_object()
        .expect("paths")
        .iter()
        .flat_map(|(path, item)| {
            item.as_object()
                .expect("path item")
                .iter()
                .map(move |(method, op)| (path.clone(), method.clone(), op))
        })
        .collect()
}

#[test]
fn operation_ids_are_unique() {
    let doc = document();
    let mut seen = HashSet::new();
    for (path, method, op) in operations(&doc) {
        let id = op["operationId"].as_str().unwrap_or_default().to_owned();
        assert!(!id.is_empty(), "{method} {path} has no operationId");
        assert!(seen.insert(id.clone()), "duplicate operationId {id}");
    }
}

#[test]
fn session_guarded_api_routes_document_unauthorised() {
    let doc = document();
    let public: HashSet<&str> = ["signIn", "signOut"].into_iter().collect();
    for (path, method, op) in operations(&doc) {
        if !path.starts_with("/api/v1/") || public.contains(op["operationId"].as_str().unwrap_or("")) {
            continue;
        }
        let responses = op["responses"].as_object().expect("responses");
        assert!(
            responses.contains_key("401") || responses.contains_key("403"),
            "{method} {path} documents neither 401 nor 403"
        );
    }
}

#[test]
fn error_responses_reference_the_shared_schema() {
    let doc = document();
    for (path, method, op) in operations(&doc) {
        if path.starts_with("/health/") {
            continue;
        }
        for (status, response) in op["responses"].as_object().expect("responses") {
            if !status.starts_with('4') {
                continue;
            }
            let reference = response["content"]["application/json"]["schema"]["$ref"]
                .as_str()
                .unwrap_or_default();
            assert!(
                reference.ends_with("crate.domain.Error"),
                "{method} {path} {status} uses {reference:?}"
            );
        }
    }
}
