//! Workspace boundary enforcement for whole commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use shellward_core::ViolationKind;
use tracing::{debug, warn};

use crate::paths::{
    Joiner, Segment, argument_tokens, cd_target, expand_home, extract_paths, normalize_lexically,
    split_segments,
};
use crate::validator::PathValidator;

/// System locations refused even when the generic workspace check passes.
pub const SYSTEM_PATH_PREFIXES: &[&str] = &["/etc", "/proc", "/sys", "/dev", "/root"];

/// Device files that are safe to reference.
const ALLOWED_DEVICES: &[&str] = &["/dev/null"];

/// Outcome of validating every path referenced by a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathValidationResult {
    /// Whether every path is acceptable.
    pub valid: bool,
    /// Why validation failed, naming the offending path.
    pub reason: Option<String>,
    /// The offending path as written, when invalid.
    pub offending_path: Option<String>,
    /// Absolute forms of the accepted paths.
    pub resolved_paths: Vec<PathBuf>,
}

/// Outcome of validating the directory a command will run in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingDirectoryValidationResult {
    /// Whether the directory is inside the workspace.
    pub valid: bool,
    /// Why validation failed.
    pub reason: Option<String>,
    /// The directory after every `cd` in the command.
    pub resolved_cwd: Option<PathBuf>,
}

/// A refused path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryViolation {
    /// Which rule was tripped.
    pub kind: ViolationKind,
    /// The path as written in the command.
    pub path: String,
    /// Human-readable explanation.
    pub reason: String,
}

/// Combined result of [`BoundaryEnforcer::enforce`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryReport {
    /// The first violation found, if any.
    pub violation: Option<BoundaryViolation>,
    /// Absolute forms of every referenced path.
    pub resolved_paths: Vec<PathBuf>,
    /// The validated directory the command starts in. The command's own
    /// `cd`s run from here.
    pub working_directory: Option<PathBuf>,
    /// Directory the command ends up in after every `cd` succeeds.
    pub resolved_cwd: Option<PathBuf>,
    /// The command with `./` paths rewritten to absolute workspace paths,
    /// each against the directory its segment runs in.
    pub rewritten_command: Option<String>,
}

impl BoundaryReport {
    /// Whether the command stays within the workspace.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        self.violation.is_none()
    }

    fn refused(violation: BoundaryViolation) -> Self {
        Self {
            violation: Some(violation),
            resolved_paths: Vec::new(),
            working_directory: None,
            resolved_cwd: None,
            rewritten_command: None,
        }
    }
}

/// Directories one segment of a command may run in.
#[derive(Debug, Clone)]
struct SegmentDirs {
    /// Reached when every earlier `cd` succeeded.
    primary: PathBuf,
    /// Every directory the segment could run in, `primary` included. A `cd`
    /// that fails leaves the shell where it was, so later segments may see
    /// any combination of earlier moves.
    possible: Vec<PathBuf>,
}

struct WalkedSegment<'a> {
    segment: Segment<'a>,
    dirs: SegmentDirs,
}

/// A command split into segments, each with its directories.
struct Walk<'a> {
    start: PathBuf,
    segments: Vec<WalkedSegment<'a>>,
    end: PathBuf,
}

/// Validates every path a command references against the workspace.
///
/// Read-only with respect to the filesystem.
#[derive(Debug, Clone)]
pub struct BoundaryEnforcer {
    validator: Arc<dyn PathValidator>,
    denied: GlobSet,
    denied_patterns: Vec<String>,
    home: Option<PathBuf>,
}

impl BoundaryEnforcer {
    /// Create an enforcer over `validator`.
    ///
    /// `denied_paths` are globs refused even inside the workspace; patterns
    /// that fail to compile are skipped with a warning.
    #[must_use]
    pub fn new(validator: Arc<dyn PathValidator>, denied_paths: &[String]) -> Self {
        let mut builder = GlobSetBuilder::new();
        let mut denied_patterns = Vec::new();
        for pattern in denied_paths {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                    denied_patterns.push(pattern.clone());
                },
                Err(e) => {
                    warn!(pattern = %pattern, error = %e, "Failed to compile denied path glob");
                },
            }
        }
        let denied = builder.build().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to build denied path set; no paths denied by glob");
            GlobSet::empty()
        });

        Self {
            validator,
            denied,
            denied_patterns,
            home: directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()),
        }
    }

    /// Override the current user's home directory.
    #[must_use]
    pub fn with_home_dir(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// The workspace root.
    #[must_use]
    pub fn workspace_root(&self) -> &Path {
        self.validator.workspace_root()
    }

    /// Path-looking substrings of `command`.
    #[must_use]
    pub fn extract_paths(&self, command: &str) -> Vec<String> {
        extract_paths(command)
    }

    /// Validate every path referenced by `command`. Relative paths resolve
    /// against the directory their segment runs in: `cwd`, moved by any
    /// earlier `cd`.
    #[must_use]
    pub fn validate_command_paths(&self, command: &str, cwd: &Path) -> PathValidationResult {
        match self
            .walk(command, cwd)
            .and_then(|walk| self.check_paths(&walk))
        {
            Ok(resolved_paths) => PathValidationResult {
                valid: true,
                reason: None,
                offending_path: None,
                resolved_paths,
            },
            Err(violation) => PathValidationResult {
                valid: false,
                reason: Some(violation.reason),
                offending_path: Some(violation.path),
                resolved_paths: Vec::new(),
            },
        }
    }

    /// Validate `cwd` and every `cd` target in `command`, in order.
    #[must_use]
    pub fn validate_working_directory(
        &self,
        command: &str,
        cwd: &Path,
    ) -> WorkingDirectoryValidationResult {
        match self.walk(command, cwd) {
            Ok(walk) => WorkingDirectoryValidationResult {
                valid: true,
                reason: None,
                resolved_cwd: Some(walk.end),
            },
            Err(violation) => WorkingDirectoryValidationResult {
                valid: false,
                reason: Some(violation.reason),
                resolved_cwd: None,
            },
        }
    }

    /// The first system path `command` references, if any.
    ///
    /// Refuses `/etc`, `/proc`, `/sys`, `/dev`, `/root`, other users'
    /// `/home/<user>` and anything starting with `~`. A prefix that contains
    /// the workspace root itself is not treated as a system path.
    #[must_use]
    pub fn check_system_paths(&self, command: &str) -> Option<BoundaryViolation> {
        for token in argument_tokens(command) {
            if token.starts_with('~') {
                return Some(BoundaryViolation {
                    kind: ViolationKind::SystemPath,
                    path: token.to_owned(),
                    reason: format!("home directory reference '{token}' is not allowed"),
                });
            }
            if !token.starts_with('/') {
                continue;
            }
            if let Some(reason) = self.system_path_reason(Path::new(token)) {
                return Some(BoundaryViolation {
                    kind: ViolationKind::SystemPath,
                    path: token.to_owned(),
                    reason,
                });
            }
        }
        None
    }

    /// Rewrite `./x` arguments to their absolute, validated workspace form,
    /// each against the directory its segment runs in.
    ///
    /// Returns `None` when a `cd` or any rewritten path falls outside the
    /// workspace.
    #[must_use]
    pub fn rewrite_relative_paths(&self, command: &str, cwd: &Path) -> Option<String> {
        let walk = self.walk(command, cwd).ok()?;
        self.rewrite_walked(&walk)
    }

    /// Run every boundary check over `command` executed from `cwd`.
    ///
    /// Order: system paths, working directory and `cd` targets, referenced
    /// paths (including denied globs), then relative-path rewriting.
    #[must_use]
    pub fn enforce(&self, command: &str, cwd: &Path) -> BoundaryReport {
        if let Some(violation) = self.check_system_paths(command) {
            debug!(command, path = %violation.path, "system path referenced");
            return BoundaryReport::refused(violation);
        }

        let walk = match self.walk(command, cwd) {
            Ok(walk) => walk,
            Err(violation) => return BoundaryReport::refused(violation),
        };
        let resolved_paths = match self.check_paths(&walk) {
            Ok(paths) => paths,
            Err(violation) => return BoundaryReport::refused(violation),
        };

        BoundaryReport {
            violation: None,
            resolved_paths,
            rewritten_command: self.rewrite_walked(&walk),
            working_directory: Some(walk.start),
            resolved_cwd: Some(walk.end),
        }
    }

    /// Split `command` into segments and work out where each one runs,
    /// refusing a start directory or `cd` target outside the workspace.
    fn walk<'a>(&self, command: &'a str, cwd: &Path) -> Result<Walk<'a>, BoundaryViolation> {
        let start = self
            .validator
            .validate_path(cwd)
            .map_err(|_| BoundaryViolation {
                kind: ViolationKind::WorkspaceViolation,
                path: cwd.display().to_string(),
                reason: format!(
                    "working directory {} is outside the workspace",
                    cwd.display()
                ),
            })?;

        let mut primary = start.clone();
        let mut reachable = vec![start.clone()];
        // Directories after a `cd` joined by `&&`: the next segment only
        // runs if that `cd` succeeded.
        let mut after_cd: Option<Vec<PathBuf>> = None;
        let mut segments = Vec::new();

        for segment in split_segments(command) {
            let dirs = SegmentDirs {
                primary: primary.clone(),
                possible: after_cd.take().unwrap_or_else(|| reachable.clone()),
            };

            if let Some(target) = cd_target(segment.text) {
                let mut moved = Vec::new();
                for dir in &dirs.possible {
                    push_unique(&mut moved, self.resolve_cd(&target, dir)?);
                }
                primary = self.resolve_cd(&target, &dirs.primary)?;
                for dir in &moved {
                    push_unique(&mut reachable, dir.clone());
                }
                if segment.joiner() == Joiner::And {
                    after_cd = Some(moved);
                }
            }

            segments.push(WalkedSegment { segment, dirs });
        }

        Ok(Walk {
            start,
            segments,
            end: primary,
        })
    }

    fn resolve_cd(&self, target: &str, from: &Path) -> Result<PathBuf, BoundaryViolation> {
        let next = self.absolute(target, from);
        self.validator
            .validate_path(&next)
            .map_err(|_| BoundaryViolation {
                kind: self.escape_kind(target, &next),
                path: target.to_owned(),
                reason: format!("cd target '{target}' leaves the workspace"),
            })
    }

    /// Check each segment's paths from every directory it may run in.
    /// Returns the paths as resolved from each segment's primary directory.
    fn check_paths(&self, walk: &Walk<'_>) -> Result<Vec<PathBuf>, BoundaryViolation> {
        let mut resolved_paths = Vec::new();
        for WalkedSegment { segment, dirs } in &walk.segments {
            for raw in extract_paths(segment.text) {
                if is_allowed_device(&raw) {
                    continue;
                }
                for dir in &dirs.possible {
                    let resolved = self.check_one(&raw, dir)?;
                    if *dir == dirs.primary {
                        push_unique(&mut resolved_paths, resolved);
                    }
                }
            }
        }
        Ok(resolved_paths)
    }

    fn rewrite_walked(&self, walk: &Walk<'_>) -> Option<String> {
        walk.segments
            .iter()
            .map(|WalkedSegment { segment, dirs }| {
                let text = self.rewrite_segment(segment.text, &dirs.primary)?;
                Some(format!("{text}{}", segment.operator))
            })
            .collect()
    }

    /// Rewrite the `./` words of one segment, keeping its spacing.
    fn rewrite_segment(&self, text: &str, cwd: &Path) -> Option<String> {
        let mut words = Vec::new();
        for word in text.split(' ') {
            let (key, value) = match word.split_once('=') {
                Some((k, v)) if v.starts_with("./") => (Some(k), v),
                _ => (None, word),
            };
            if !value.starts_with("./") {
                words.push(word.to_owned());
                continue;
            }

            let resolved = self.validator.validate_path(&cwd.join(value)).ok()?;
            let resolved = resolved.display().to_string();
            words.push(match key {
                Some(k) => format!("{k}={resolved}"),
                None => resolved,
            });
        }
        Some(words.join(" "))
    }

    fn check_one(&self, raw: &str, cwd: &Path) -> Result<PathBuf, BoundaryViolation> {
        let candidate = self.absolute(raw, cwd);
        let resolved = self
            .validator
            .validate_path(&candidate)
            .map_err(|_| BoundaryViolation {
                kind: self.escape_kind(raw, &candidate),
                path: raw.to_owned(),
                reason: format!("path '{raw}' resolves outside the workspace"),
            })?;

        let relative = self.validator.relative_path_from_workspace(&resolved);
        if self.denied.is_match(&resolved) || self.denied.is_match(&relative) {
            return Err(BoundaryViolation {
                kind: ViolationKind::WorkspaceViolation,
                path: raw.to_owned(),
                reason: format!(
                    "path '{raw}' matches a denied path pattern ({})",
                    self.denied_patterns.join(", ")
                ),
            });
        }

        Ok(resolved)
    }

    fn absolute(&self, raw: &str, base: &Path) -> PathBuf {
        let expanded = expand_home(raw, self.home.as_deref());
        if expanded.is_absolute() {
            expanded
        } else {
            base.join(expanded)
        }
    }

    /// `..` and symlink escapes are traversal; anything else is a plain
    /// workspace violation.
    fn escape_kind(&self, raw: &str, candidate: &Path) -> ViolationKind {
        let lexically_inside =
            normalize_lexically(candidate).starts_with(self.validator.workspace_root());
        if raw.split('/').any(|part| part == "..") || lexically_inside {
            ViolationKind::PathTraversal
        } else {
            ViolationKind::WorkspaceViolation
        }
    }

    fn system_path_reason(&self, path: &Path) -> Option<String> {
        if is_allowed_device(&path.to_string_lossy()) {
            return None;
        }
        let root = self.validator.workspace_root();
        let normalized = normalize_lexically(path);

        for prefix in SYSTEM_PATH_PREFIXES {
            if normalized.starts_with(prefix) && !root.starts_with(prefix) {
                return Some(format!(
                    "system path '{}' is protected ({prefix})",
                    path.display()
                ));
            }
        }

        if let Ok(under_home) = normalized.strip_prefix("/home") {
            let owner = under_home.components().next()?;
            let own_home = self
                .home
                .as_deref()
                .and_then(|h| h.strip_prefix("/home").ok())
                .and_then(|rest| rest.components().next())
                == Some(owner);
            if !own_home && !root.starts_with(Path::new("/home").join(owner)) {
                return Some(format!(
                    "path '{}' belongs to another user's home directory",
                    path.display()
                ));
            }
        }

        None
    }
}

fn is_allowed_device(raw: &str) -> bool {
    ALLOWED_DEVICES.contains(&raw)
}

fn push_unique(paths: &mut Vec<PathBuf>, path: PathBuf) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}

#[cfg(test)]
#[path = "enforcer_tests.rs"]
mod tests;
