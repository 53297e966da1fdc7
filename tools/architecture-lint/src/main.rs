//! `cargo run -p architecture-lint [BACKEND_DIR]`
//!
//! Without an argument the backend is found next to the workspace manifest
//! that contains this tool.

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn workspace_backend() -> Option<PathBuf> {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .map(|dir| dir.join("backend"))
        .find(|candidate| candidate.join("Cargo.toml").is_file())
}

fn main() -> ExitCode {
    let backend = env::args_os().nth(1).map(PathBuf::from).or_else(workspace_backend);
    let Some(backend) = backend else {
        eprintln!("backend directory not found; pass it as the first argument");
        return ExitCode::from(2);
    };
    match architecture_lint::lint_backend_sources(&backend) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprint!("{err}");
            ExitCode::FAILURE
        }
    }
}
