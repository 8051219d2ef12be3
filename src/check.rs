// src/check.rs

//! Static checks over a rendered deployment tree
//!
//! `check` parses every YAML file under `ansible/` and applies shape
//! rules per file kind (playbooks, task lists, inventories, var files,
//! the Galaxy manifest), then inspects `ansible.cfg` and the container
//! build file. Findings carry a severity: errors fail the command,
//! warnings do not.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::scaffold::assets::{ANSIBLE_CFG_PATH, ASSETS, DOCKERFILE_PATH};

/// Keys that may appear on a task besides its module invocation
const TASK_KEYWORDS: &[&str] = &[
    "name",
    "args",
    "become",
    "become_user",
    "changed_when",
    "delay",
    "delegate_to",
    "environment",
    "failed_when",
    "ignore_errors",
    "loop",
    "loop_control",
    "no_log",
    "notify",
    "register",
    "retries",
    "run_once",
    "tags",
    "until",
    "vars",
    "when",
    "with_items",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// One problem found in the tree
#[derive(Debug, Clone)]
pub struct Finding {
    pub severity: Severity,
    pub path: String,
    pub message: String,
}

impl Finding {
    fn error(path: &str, message: impl Into<String>) -> Self {
        Finding {
            severity: Severity::Error,
            path: path.to_string(),
            message: message.into(),
        }
    }

    fn warning(path: &str, message: impl Into<String>) -> Self {
        Finding {
            severity: Severity::Warning,
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// All findings from one check run
#[derive(Debug, Default)]
pub struct CheckReport {
    pub findings: Vec<Finding>,
    /// Number of files inspected
    pub files_checked: usize,
}

impl CheckReport {
    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .count()
    }

    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }
}

/// How a YAML file is linted depends on where it sits in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Playbook,
    TaskList,
    Inventory,
    Vars,
    Requirements,
    Generic,
}

fn classify(rel: &str) -> FileKind {
    if rel.contains("/tasks/") || rel.contains("/handlers/") {
        FileKind::TaskList
    } else if rel.starts_with("ansible/playbooks/") {
        FileKind::Playbook
    } else if rel.starts_with("ansible/inventory/") {
        FileKind::Inventory
    } else if rel.contains("/group_vars/") || rel.contains("/defaults/") || rel.contains("/vars/") {
        FileKind::Vars
    } else if rel.ends_with("requirements.yml") || rel.ends_with("requirements.yaml") {
        FileKind::Requirements
    } else {
        FileKind::Generic
    }
}

/// Run every check against the tree under `root`
pub fn check_tree(root: &Path) -> Result<CheckReport> {
    let mut report = CheckReport::default();

    // Every file of the standard tree must be present.
    for asset in ASSETS {
        if !root.join(asset.path).is_file() {
            report.push(Finding::error(asset.path, "expected file is missing"));
        }
    }

    // Lint whatever YAML actually exists, including files a user added.
    let ansible_dir = root.join("ansible");
    if ansible_dir.is_dir() {
        let mut yaml_files = Vec::new();
        collect_yaml(&ansible_dir, &mut yaml_files)?;
        yaml_files.sort();

        for path in yaml_files {
            let rel = rel_path(root, &path);
            report.files_checked += 1;
            match fs::read_to_string(&path) {
                Ok(contents) => lint_yaml(root, &rel, &contents, &mut report),
                Err(e) => report.push(Finding::error(&rel, format!("unreadable: {e}"))),
            }
        }
    }

    let cfg_path = root.join(ANSIBLE_CFG_PATH);
    if cfg_path.is_file() {
        report.files_checked += 1;
        match fs::read_to_string(&cfg_path) {
            Ok(contents) => lint_ansible_cfg(&contents, &mut report),
            Err(e) => report.push(Finding::error(ANSIBLE_CFG_PATH, format!("unreadable: {e}"))),
        }
    }

    let dockerfile_path = root.join(DOCKERFILE_PATH);
    if dockerfile_path.is_file() {
        report.files_checked += 1;
        match fs::read_to_string(&dockerfile_path) {
            Ok(contents) => lint_dockerfile(&contents, &mut report),
            Err(e) => report.push(Finding::error(DOCKERFILE_PATH, format!("unreadable: {e}"))),
        }
    }

    Ok(report)
}

fn collect_yaml(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.file_name());
    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            collect_yaml(&path, out)?;
        } else if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yml") | Some("yaml")
        ) {
            out.push(path);
        }
    }
    Ok(())
}

fn rel_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn lint_yaml(root: &Path, rel: &str, contents: &str, report: &mut CheckReport) {
    let value: serde_yaml::Value = match serde_yaml::from_str(contents) {
        Ok(v) => v,
        Err(e) => {
            report.push(Finding::error(rel, format!("invalid YAML: {e}")));
            return;
        }
    };

    match classify(rel) {
        FileKind::Playbook => lint_playbook(root, rel, &value, report),
        FileKind::TaskList => lint_task_list(rel, &value, report),
        FileKind::Inventory => lint_inventory(rel, &value, report),
        FileKind::Vars => lint_vars(rel, &value, report),
        FileKind::Requirements => lint_requirements(rel, &value, report),
        FileKind::Generic => {}
    }
}

fn lint_playbook(root: &Path, rel: &str, value: &serde_yaml::Value, report: &mut CheckReport) {
    let Some(plays) = value.as_sequence() else {
        report.push(Finding::error(rel, "playbook must be a list of plays"));
        return;
    };
    if plays.is_empty() {
        report.push(Finding::error(rel, "playbook has no plays"));
        return;
    }
    for (i, play) in plays.iter().enumerate() {
        if !play.is_mapping() {
            report.push(Finding::error(rel, format!("play {} is not a mapping", i + 1)));
            continue;
        }
        let imports = play.get("import_playbook").is_some();
        let targets = play.get("hosts").is_some();
        if !imports && !targets {
            report.push(Finding::error(
                rel,
                format!("play {} has neither `hosts` nor `import_playbook`", i + 1),
            ));
        }
        if targets && play.get("roles").is_none() && play.get("tasks").is_none() {
            report.push(Finding::warning(
                rel,
                format!("play {} targets hosts but runs no roles or tasks", i + 1),
            ));
        }
        for role in play_role_names(play) {
            if !root.join("ansible/roles").join(&role).is_dir() {
                report.push(Finding::error(
                    rel,
                    format!("play {} uses role `{}` but ansible/roles/{} does not exist", i + 1, role, role),
                ));
            }
        }
    }
}

/// Role names a play applies, whether listed as strings or mappings
fn play_role_names(play: &serde_yaml::Value) -> Vec<String> {
    play.get("roles")
        .and_then(serde_yaml::Value::as_sequence)
        .map(|seq| {
            seq.iter()
                .filter_map(|entry| {
                    entry
                        .as_str()
                        .or_else(|| entry.get("role").and_then(serde_yaml::Value::as_str))
                        .map(str::to_string)
                })
                .collect()
        })
        .unwrap_or_default()
}

fn lint_task_list(rel: &str, value: &serde_yaml::Value, report: &mut CheckReport) {
    let Some(tasks) = value.as_sequence() else {
        report.push(Finding::error(rel, "task file must be a list of tasks"));
        return;
    };
    if tasks.is_empty() {
        report.push(Finding::warning(rel, "task file is empty"));
        return;
    }
    for (i, task) in tasks.iter().enumerate() {
        let Some(mapping) = task.as_mapping() else {
            report.push(Finding::error(rel, format!("task {} is not a mapping", i + 1)));
            continue;
        };
        let modules: Vec<&str> = mapping
            .keys()
            .filter_map(serde_yaml::Value::as_str)
            .filter(|k| !TASK_KEYWORDS.contains(k))
            .collect();
        if modules.is_empty() {
            report.push(Finding::error(
                rel,
                format!("task {} does not invoke a module", i + 1),
            ));
        }
        if task.get("name").and_then(serde_yaml::Value::as_str).is_none() {
            report.push(Finding::warning(rel, format!("task {} has no name", i + 1)));
        }
    }
}

fn lint_inventory(rel: &str, value: &serde_yaml::Value, report: &mut CheckReport) {
    let Some(all) = value.get("all") else {
        report.push(Finding::error(rel, "inventory has no `all` group"));
        return;
    };
    if all.get("hosts").is_none() && all.get("children").is_none() {
        report.push(Finding::warning(rel, "inventory defines no hosts"));
    }
}

fn lint_vars(rel: &str, value: &serde_yaml::Value, report: &mut CheckReport) {
    if !value.is_mapping() {
        report.push(Finding::error(rel, "var file must be a mapping"));
        return;
    }
    if let Some(version) = value.get("app_version").and_then(serde_yaml::Value::as_str) {
        if semver::Version::parse(version).is_err() {
            report.push(Finding::warning(
                rel,
                format!("app_version {version:?} is not a semantic version"),
            ));
        }
    }
}

fn lint_requirements(rel: &str, value: &serde_yaml::Value, report: &mut CheckReport) {
    let Some(collections) = value.get("collections").and_then(serde_yaml::Value::as_sequence)
    else {
        report.push(Finding::error(rel, "no `collections` list"));
        return;
    };
    for (i, entry) in collections.iter().enumerate() {
        if entry.get("name").and_then(serde_yaml::Value::as_str).is_none() {
            report.push(Finding::error(rel, format!("collection {} has no name", i + 1)));
        }
    }
}

fn lint_ansible_cfg(contents: &str, report: &mut CheckReport) {
    if contents.trim().is_empty() {
        report.push(Finding::error(ANSIBLE_CFG_PATH, "file is empty"));
    } else if !contents.lines().any(|l| l.trim() == "[defaults]") {
        report.push(Finding::error(ANSIBLE_CFG_PATH, "no [defaults] section"));
    }
}

fn lint_dockerfile(contents: &str, report: &mut CheckReport) {
    let directives: Vec<(&str, &str)> = contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| l.split_once(char::is_whitespace))
        .map(|(d, rest)| (d, rest.trim()))
        .collect();

    if !directives.iter().any(|(d, _)| *d == "FROM") {
        report.push(Finding::error(DOCKERFILE_PATH, "no FROM instruction"));
    }
    match directives.iter().rev().find(|(d, _)| *d == "USER") {
        None => report.push(Finding::error(
            DOCKERFILE_PATH,
            "no USER instruction: container would run as root",
        )),
        Some((_, user)) if *user == "root" || *user == "0" => {
            report.push(Finding::error(DOCKERFILE_PATH, "container runs as root"));
        }
        Some(_) => {}
    }
    if !directives.iter().any(|(d, _)| *d == "HEALTHCHECK") {
        report.push(Finding::error(DOCKERFILE_PATH, "no HEALTHCHECK instruction"));
    }
    if !directives.iter().any(|(d, _)| *d == "EXPOSE") {
        report.push(Finding::warning(DOCKERFILE_PATH, "no EXPOSE instruction"));
    }
}
