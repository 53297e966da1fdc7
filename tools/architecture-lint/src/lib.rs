//! Import-boundary lint for the tripboard backend.
//!
//! The backend's hexagon lives at module level under `backend/src`:
//! `domain` holds entities, services and ports; `inbound` the HTTP adapter;
//! `outbound` the Postgres, Redis, SMTP, Places and identity adapters. Every
//! `use` item and qualified path in those trees is checked against [`RULES`].
//!
//! Run with `cargo run -p architecture-lint`.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use syn::visit::Visit;

/// How `use` paths name the backend library from its own binaries.
const CRATE_NAME: &str = "tripboard";

const LAYER_DIRS: [&str; 3] = ["domain", "inbound", "outbound"];

/// HTTP framework and API documentation crates.
const WEB: &[&str] = &[
    "actix",
    "actix_http",
    "actix_session",
    "actix_web",
    "utoipa",
    "utoipa_swagger_ui",
];

/// Storage, cache, mail, token and outbound HTTP crates.
const INFRA: &[&str] = &[
    "bb8",
    "bb8_redis",
    "diesel",
    "diesel_async",
    "diesel_migrations",
    "jsonwebtoken",
    "lettre",
    "redis",
    "reqwest",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Domain,
    Inbound,
    Outbound,
}

struct Rule {
    layer: Layer,
    modules: &'static [&'static str],
    crates: &'static [&'static [&'static str]],
}

/// The dependency direction the backend must keep.
static RULES: [Rule; 3] = [
    Rule {
        layer: Layer::Domain,
        modules: &["inbound", "outbound"],
        crates: &[WEB, INFRA],
    },
    Rule {
        layer: Layer::Inbound,
        modules: &["outbound"],
        crates: &[INFRA],
    },
    Rule {
        layer: Layer::Outbound,
        modules: &["inbound"],
        crates: &[WEB],
    },
];

impl Layer {
    fn of(relative: &Path) -> Option<Self> {
        let first = relative.components().next()?.as_os_str().to_str()?;
        match first {
            "domain" => Some(Self::Domain),
            "inbound" => Some(Self::Inbound),
            "outbound" => Some(Self::Outbound),
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }

    fn rule(self) -> Option<&'static Rule> {
        RULES.iter().find(|rule| rule.layer == self)
    }
}

/// One forbidden dependency found in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Relative to `backend/src`.
    pub file: PathBuf,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}

#[derive(Debug)]
pub enum ArchitectureLintError {
    Io(io::Error),
    /// The file is not valid Rust or sits outside the three layers.
    Parse { file: PathBuf, message: String },
    Violations(Vec<Violation>),
}

impl fmt::Display for ArchitectureLintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "could not read backend sources: {err}"),
            Self::Parse { file, message } => {
                write!(f, "could not lint {}: {message}", file.display())
            }
            Self::Violations(violations) => {
                writeln!(f, "{} boundary violation(s):", violations.len())?;
                violations
                    .iter()
                    .try_for_each(|violation| writeln!(f, "  {violation}"))
            }
        }
    }
}

impl std::error::Error for ArchitectureLintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse { .. } | Self::Violations(_) => None,
        }
    }
}

impl From<io::Error> for ArchitectureLintError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// A source file and its path relative to `backend/src`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    pub file: PathBuf,
    pub contents: String,
}

/// Lint every `.rs` file under `backend_dir/src/{domain,inbound,outbound}`.
pub fn lint_backend_sources(backend_dir: &Path) -> Result<(), ArchitectureLintError> {
    let src = backend_dir.join("src");
    let mut sources = Vec::new();
    for dir in LAYER_DIRS.map(|layer| src.join(layer)) {
        if dir.is_dir() {
            read_tree(&src, &dir, &mut sources)?;
        }
    }
    lint_sources(&sources)
}

/// Lint in-memory sources; violations from all files are reported together.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), ArchitectureLintError> {
    let mut violations = Vec::new();
    for source in sources {
        let parse_error = |message: String| ArchitectureLintError::Parse {
            file: source.file.clone(),
            message,
        };
        let layer = Layer::of(&source.file)
            .ok_or_else(|| parse_error("not under domain/, inbound/ or outbound/".to_owned()))?;
        let ast = syn::parse_file(&source.contents).map_err(|err| parse_error(err.to_string()))?;
        violations.extend(check(&source.file, layer, &ast));
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ArchitectureLintError::Violations(violations))
    }
}

fn check(file: &Path, layer: Layer, ast: &syn::File) -> Vec<Violation> {
    let mut imports = Imports::default();
    imports.visit_file(ast);

    let Some(rule) = layer.rule() else {
        return Vec::new();
    };
    let mut messages = BTreeSet::new();
    for path in &imports.paths {
        if let Some(module) = internal_root(path).filter(|root| rule.modules.contains(root)) {
            messages.insert(format!(
                "{} module must not depend on crate::{module}",
                layer.name()
            ));
        }
        if let Some(krate) = external_root(path)
            .filter(|root| rule.crates.iter().any(|group| group.contains(root)))
        {
            messages.insert(format!(
                "{} module must not depend on external crate `{krate}`",
                layer.name()
            ));
        }
    }
    messages
        .into_iter()
        .map(|message| Violation {
            file: file.to_path_buf(),
            message,
        })
        .collect()
}

fn is_relative(segment: &str) -> bool {
    matches!(segment, "crate" | "self" | "super")
}

/// The backend module a path points into, e.g. `outbound` for
/// `crate::outbound::mail` or `tripboard::outbound::mail`.
fn internal_root(path: &[String]) -> Option<&str> {
    let first = path.first()?.as_str();
    if LAYER_DIRS.contains(&first) {
        return Some(first);
    }
    let rest = if is_relative(first) {
        path.iter().find(|segment| !is_relative(segment))?
    } else if first == CRATE_NAME {
        path.get(1)?
    } else {
        return None;
    };
    Some(rest.as_str())
}

fn external_root(path: &[String]) -> Option<&str> {
    let first = path.first()?.as_str();
    (!is_relative(first) && first != CRATE_NAME).then_some(first)
}

/// Every path mentioned by `use` items or written out in full.
#[derive(Default)]
struct Imports {
    paths: BTreeSet<Vec<String>>,
}

impl Imports {
    fn flatten(&mut self, tree: &syn::UseTree, prefix: &[String]) {
        let extend = |leaf: String| {
            let mut path = prefix.to_vec();
            path.push(leaf);
            path
        };
        match tree {
            syn::UseTree::Path(node) => self.flatten(&node.tree, &extend(node.ident.to_string())),
            syn::UseTree::Name(node) => {
                self.paths.insert(extend(node.ident.to_string()));
            }
            syn::UseTree::Rename(node) => {
                self.paths.insert(extend(node.ident.to_string()));
            }
            syn::UseTree::Glob(_) => {
                self.paths.insert(extend("*".to_owned()));
            }
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.flatten(item, prefix);
                }
            }
        }
    }
}

impl<'ast> Visit<'ast> for Imports {
    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.flatten(&node.tree, &[]);
    }

    fn visit_path(&mut self, node: &'ast syn::Path) {
        let segments: Vec<String> = node
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        if !segments.is_empty() {
            self.paths.insert(segments);
        }
        syn::visit::visit_path(self, node);
    }
}

fn read_tree(
    src: &Path,
    dir: &Path,
    sources: &mut Vec<LintSource>,
) -> Result<(), ArchitectureLintError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            read_tree(src, &path, sources)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            let file = path
                .strip_prefix(src)
                .map(Path::to_path_buf)
                .map_err(|err| ArchitectureLintError::Parse {
                    file: path.clone(),
                    message: err.to_string(),
                })?;
            let contents = fs::read_to_string(&path)?;
            sources.push(LintSource { file, contents });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
