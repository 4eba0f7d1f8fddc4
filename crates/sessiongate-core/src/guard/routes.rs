//! Route table: path patterns, static redirects and per-view requirements.

use std::collections::BTreeMap;

use thiserror::Error;

use super::{Role, RouteRequirement};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RouteError {
    #[error("Route pattern {0:?} has a parameter without a name")]
    UnnamedParam(String),

    #[error("Route pattern {pattern:?} repeats parameter {param:?}")]
    DuplicateParam { pattern: String, param: String },

    #[error("Redirect target {0:?} must be an absolute path")]
    RelativeRedirect(String),
}

/// A declared route, possibly with nested children whose paths are relative
/// to this one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteRecord {
    pub path: String,
    pub view: Option<String>,
    pub redirect: Option<String>,
    pub requirement: RouteRequirement,
    pub children: Vec<RouteRecord>,
}

impl RouteRecord {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }

    pub fn redirect(mut self, to: impl Into<String>) -> Self {
        self.redirect = Some(to.into());
        self
    }

    pub fn requires(mut self, requirement: RouteRequirement) -> Self {
        self.requirement = requirement;
        self
    }

    pub fn child(mut self, child: RouteRecord) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    pattern: String,
    segments: Vec<Segment>,
    view: Option<String>,
    redirect: Option<String>,
    requirement: RouteRequirement,
}

impl CompiledRoute {
    fn static_segments(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Static(_)))
            .count()
    }

    fn capture(&self, segments: &[&str]) -> Option<BTreeMap<String, String>> {
        if segments.len() != self.segments.len() {
            return None;
        }
        let mut params = BTreeMap::new();
        for (pattern, actual) in self.segments.iter().zip(segments) {
            match pattern {
                Segment::Static(expected) if expected.eq_ignore_ascii_case(actual) => {}
                Segment::Static(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), (*actual).to_string());
                }
            }
        }
        Some(params)
    }
}

/// Result of resolving a concrete path against the table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteMatch {
    /// Normalized path that was resolved
    pub path: String,
    /// Pattern of the matched record, `None` for unknown paths
    pub pattern: Option<String>,
    pub view: Option<String>,
    pub redirect: Option<String>,
    pub params: BTreeMap<String, String>,
    /// Requirement merged from every ancestor down to the matched record
    pub requirement: RouteRequirement,
}

/// Split a path into its non-empty segments, ignoring query and fragment.
fn path_segments(path: &str) -> Vec<&str> {
    let end = path.find(|c: char| c == '?' || c == '#').unwrap_or(path.len());
    path[..end].split('/').filter(|s| !s.is_empty()).collect()
}

/// Normalize a path: leading slash, no trailing slash, no query or fragment.
pub fn normalize_path(path: &str) -> String {
    format!("/{}", path_segments(path).join("/"))
}

fn join_paths(parent: &str, child: &str) -> String {
    if child.starts_with('/') {
        child.to_string()
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), child)
    }
}

/// Flattened, validated route table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    pub fn new(records: Vec<RouteRecord>) -> Result<Self, RouteError> {
        let mut routes = Vec::new();
        for record in &records {
            Self::compile(record, "", &RouteRequirement::public(), &mut routes)?;
        }
        Ok(Self { routes })
    }

    fn compile(
        record: &RouteRecord,
        parent_path: &str,
        inherited: &RouteRequirement,
        out: &mut Vec<CompiledRoute>,
    ) -> Result<(), RouteError> {
        let pattern = normalize_path(&join_paths(parent_path, &record.path));
        let requirement = inherited.merge(&record.requirement);

        let mut segments = Vec::new();
        for raw in path_segments(&pattern) {
            let segment = match raw.strip_prefix(':') {
                Some("") => return Err(RouteError::UnnamedParam(pattern.clone())),
                Some(name) => {
                    if segments.contains(&Segment::Param(name.to_string())) {
                        return Err(RouteError::DuplicateParam {
                            pattern: pattern.clone(),
                            param: name.to_string(),
                        });
                    }
                    Segment::Param(name.to_string())
                }
                None => Segment::Static(raw.to_string()),
            };
            segments.push(segment);
        }

        if let Some(ref to) = record.redirect {
            if !to.starts_with('/') {
                return Err(RouteError::RelativeRedirect(to.clone()));
            }
        }

        // Children are registered first so that they win ties against the parent
        for child in &record.children {
            Self::compile(child, &pattern, &requirement, out)?;
        }

        out.push(CompiledRoute {
            pattern,
            segments,
            view: record.view.clone(),
            redirect: record.redirect.clone(),
            requirement,
        });
        Ok(())
    }

    /// The route table of the booking application.
    pub fn application() -> Result<Self, RouteError> {
        let user = || RouteRequirement::with_role(Role::user());
        let records = vec![
            RouteRecord::new("/").redirect("/login"),
            RouteRecord::new("/login").view("Login"),
            RouteRecord::new("/register").view("Register"),
            RouteRecord::new("/admin")
                .view("AdminDashboard")
                .requires(RouteRequirement::with_role(Role::admin())),
            RouteRecord::new("/user")
                .view("UserDashboard")
                .requires(user())
                .child(RouteRecord::new("history").view("BookingHistory")),
            RouteRecord::new("/user/session/:id")
                .view("ActiveSession")
                .requires(user()),
        ];
        Self::new(records)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Resolve a path. Among matching records the one with the most static
    /// segments wins; ties go to the first declared. Unknown paths resolve to
    /// a match with no requirement.
    pub fn resolve(&self, path: &str) -> RouteMatch {
        let segments = path_segments(path);
        let mut best: Option<(&CompiledRoute, BTreeMap<String, String>)> = None;

        for route in &self.routes {
            let Some(params) = route.capture(&segments) else {
                continue;
            };
            let better = match &best {
                Some((current, _)) => route.static_segments() > current.static_segments(),
                None => true,
            };
            if better {
                best = Some((route, params));
            }
        }

        let path = normalize_path(path);
        match best {
            Some((route, params)) => RouteMatch {
                path,
                pattern: Some(route.pattern.clone()),
                view: route.view.clone(),
                redirect: route.redirect.clone(),
                params,
                requirement: route.requirement.clone(),
            },
            None => RouteMatch {
                path,
                ..RouteMatch::default()
            },
        }
    }
}
