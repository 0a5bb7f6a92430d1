//! [`IssueTracker`] backed by the GitHub CLI (`gh`).
//!
//! Every call spawns one `gh` process. Credentials stay with `gh`; this module
//! never touches tokens.

use std::io::ErrorKind;
use std::process::Command;

use serde::Deserialize;

use crate::error::{Result, TrackerError};
use crate::issue::{Issue, IssueState, IssueTracker, StateFilter};

const ISSUE_FIELDS: &str = "number,title,body,state,labels,url";

/// GitHub issue tracker driven through the `gh` executable.
#[derive(Debug, Clone)]
pub struct GhClient {
    program: String,
    repo: Option<String>,
}

impl GhClient {
    /// `repo` is `owner/name`; `None` lets `gh` infer it from the git remote.
    pub fn new(program: impl Into<String>, repo: Option<String>) -> Self {
        Self {
            program: program.into(),
            repo,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn repo_args(&self) -> Vec<String> {
        match &self.repo {
            Some(repo) => vec!["-R".to_string(), repo.clone()],
            None => vec![],
        }
    }

    /// Run `gh <args> [-R repo]` and return stdout. `number` refines
    /// "not found" failures into [`TrackerError::IssueNotFound`].
    fn run(&self, operation: &str, args: &[String], number: Option<u64>) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args).args(self.repo_args());
        tracing::debug!("running {} {}", self.program, args.join(" "));

        let output = cmd.output().map_err(|e| self.spawn_error(operation, e))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(classify_failure(operation, &stderr, number));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn spawn_error(&self, operation: &str, e: std::io::Error) -> TrackerError {
        if e.kind() == ErrorKind::NotFound {
            TrackerError::NotInstalled {
                program: self.program.clone(),
            }
        } else {
            TrackerError::Io {
                operation: operation.to_string(),
                source: e,
            }
        }
    }

    fn label_exists(&self, name: &str) -> Result<bool> {
        let args = strings(&["label", "list", "--search", name, "--json", "name", "--limit", "100"]);
        let out = self.run("gh label list", &args, None)?;
        let labels: Vec<GhLabel> = parse_json("gh label list", &out)?;
        Ok(labels.iter().any(|l| l.name == name))
    }
}

impl IssueTracker for GhClient {
    fn check_auth(&self) -> Result<()> {
        let output = Command::new(&self.program)
            .args(["auth", "status"])
            .output()
            .map_err(|e| self.spawn_error("gh auth status", e))?;
        if output.status.success() {
            Ok(())
        } else {
            Err(TrackerError::NotAuthenticated)
        }
    }

    fn list_issues(
        &self,
        state: StateFilter,
        label: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Issue>> {
        let args = list_args(state, label, limit);
        let out = self.run("gh issue list", &args, None)?;
        parse_issue_list(&out)
    }

    fn get_issue(&self, number: u64) -> Result<Issue> {
        let args = strings(&["issue", "view", &number.to_string(), "--json", ISSUE_FIELDS]);
        let out = self.run("gh issue view", &args, Some(number))?;
        parse_issue(&out)
    }

    fn create_issue(&self, title: &str, body: &str, labels: &[String]) -> Result<Issue> {
        let mut args = strings(&["issue", "create", "--title", title, "--body", body]);
        for label in labels {
            args.push("--label".to_string());
            args.push(label.clone());
        }
        let out = self.run("gh issue create", &args, None)?;
        let number = issue_number_from_url(out.trim()).ok_or_else(|| TrackerError::Parse {
            operation: "gh issue create".to_string(),
            message: format!("no issue number in '{}'", out.trim()),
        })?;
        self.get_issue(number)
    }

    fn update_issue(
        &self,
        number: u64,
        title: Option<&str>,
        body: Option<&str>,
    ) -> Result<Issue> {
        if title.is_none() && body.is_none() {
            return self.get_issue(number);
        }
        let mut args = strings(&["issue", "edit", &number.to_string()]);
        if let Some(title) = title {
            args.extend(strings(&["--title", title]));
        }
        if let Some(body) = body {
            args.extend(strings(&["--body", body]));
        }
        self.run("gh issue edit", &args, Some(number))?;
        self.get_issue(number)
    }

    fn close_issue(&self, number: u64) -> Result<Issue> {
        let args = strings(&["issue", "close", &number.to_string()]);
        self.run("gh issue close", &args, Some(number))?;
        self.get_issue(number)
    }

    fn reopen_issue(&self, number: u64) -> Result<Issue> {
        let args = strings(&["issue", "reopen", &number.to_string()]);
        self.run("gh issue reopen", &args, Some(number))?;
        self.get_issue(number)
    }

    fn delete_issue(&self, number: u64) -> Result<()> {
        let args = strings(&["issue", "delete", &number.to_string(), "--yes"]);
        self.run("gh issue delete", &args, Some(number))?;
        Ok(())
    }

    fn add_labels(&self, number: u64, labels: &[String]) -> Result<()> {
        if labels.is_empty() {
            return Ok(());
        }
        let args = strings(&["issue", "edit", &number.to_string(), "--add-label", &labels.join(",")]);
        self.run("gh issue edit", &args, Some(number))?;
        Ok(())
    }

    fn remove_labels(&self, number: u64, labels: &[String]) -> Result<()> {
        if labels.is_empty() {
            return Ok(());
        }
        let args = strings(&[
            "issue",
            "edit",
            &number.to_string(),
            "--remove-label",
            &labels.join(","),
        ]);
        self.run("gh issue edit", &args, Some(number))?;
        Ok(())
    }

    fn ensure_label_exists(&self, name: &str, color: &str) -> Result<()> {
        if self.label_exists(name)? {
            return Ok(());
        }
        let args = strings(&[
            "label",
            "create",
            name,
            "--color",
            color,
            "--description",
            "Managed by cfs",
        ]);
        match self.run("gh label create", &args, None) {
            Ok(_) => {
                tracing::info!("created label {name}");
                Ok(())
            }
            // Lost a race with another creator.
            Err(TrackerError::Api { stderr, .. }) if stderr.contains("already exists") => Ok(()),
            Err(e) => Err(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Output parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GhLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GhIssue {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    state: String,
    #[serde(default)]
    labels: Vec<GhLabel>,
    #[serde(default)]
    url: String,
}

impl GhIssue {
    fn into_issue(self) -> Result<Issue> {
        let state = IssueState::parse(&self.state).ok_or_else(|| TrackerError::Parse {
            operation: "issue json".to_string(),
            message: format!("unknown issue state '{}'", self.state),
        })?;
        Ok(Issue {
            number: self.number,
            title: self.title,
            body: self.body.unwrap_or_default(),
            state,
            labels: self.labels.into_iter().map(|l| l.name).collect(),
            url: self.url,
        })
    }
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

fn parse_json<T: serde::de::DeserializeOwned>(operation: &str, out: &str) -> Result<T> {
    serde_json::from_str(out).map_err(|e| TrackerError::Parse {
        operation: operation.to_string(),
        message: e.to_string(),
    })
}

pub(crate) fn list_args(state: StateFilter, label: Option<&str>, limit: usize) -> Vec<String> {
    let mut args = strings(&[
        "issue",
        "list",
        "--state",
        state.as_str(),
        "--limit",
        &limit.to_string(),
        "--json",
        ISSUE_FIELDS,
    ]);
    if let Some(label) = label {
        args.extend(strings(&["--label", label]));
    }
    args
}

pub(crate) fn parse_issue(out: &str) -> Result<Issue> {
    parse_json::<GhIssue>("gh issue view", out)?.into_issue()
}

pub(crate) fn parse_issue_list(out: &str) -> Result<Vec<Issue>> {
    parse_json::<Vec<GhIssue>>("gh issue list", out)?
        .into_iter()
        .map(GhIssue::into_issue)
        .collect()
}

/// `https://github.com/owner/repo/issues/42` → `42`.
pub(crate) fn issue_number_from_url(url: &str) -> Option<u64> {
    url.lines()
        .last()?
        .trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()?
        .parse()
        .ok()
}

pub(crate) fn classify_failure(operation: &str, stderr: &str, number: Option<u64>) -> TrackerError {
    let lower = stderr.to_ascii_lowercase();
    if lower.contains("not logged") || lower.contains("gh auth login") {
        return TrackerError::NotAuthenticated;
    }
    if let Some(number) = number {
        if lower.contains("not found") || lower.contains("could not resolve to an issue") {
            return TrackerError::IssueNotFound { number };
        }
    }
    TrackerError::Api {
        operation: operation.to_string(),
        stderr: stderr.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST: &str = r#"[
        {"number": 12, "title": "Crash", "body": "boom", "state": "OPEN",
         "labels": [{"name": "cfs:issues", "color": "0e8a16"}], "url": "https://github.com/o/r/issues/12"},
        {"number": 3, "title": "Old", "body": null, "state": "CLOSED",
         "labels": [], "url": "https://github.com/o/r/issues/3"}
    ]"#;

    #[test]
    fn parses_issue_list() {
        let issues = parse_issue_list(LIST).unwrap();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].number, 12);
        assert_eq!(issues[0].state, IssueState::Open);
        assert_eq!(issues[0].labels, vec!["cfs:issues".to_string()]);
        assert!(issues[1].is_closed());
        assert_eq!(issues[1].body, "");
    }

    #[test]
    fn unknown_state_is_a_parse_error() {
        let out = r#"{"number": 1, "title": "t", "body": "", "state": "MERGED", "labels": [], "url": ""}"#;
        assert!(matches!(parse_issue(out), Err(TrackerError::Parse { .. })));
    }

    #[test]
    fn garbage_output_is_a_parse_error() {
        assert!(matches!(
            parse_issue_list("not json"),
            Err(TrackerError::Parse { .. })
        ));
    }

    #[test]
    fn number_from_create_output() {
        assert_eq!(
            issue_number_from_url("https://github.com/o/r/issues/42\n"),
            Some(42)
        );
        assert_eq!(
            issue_number_from_url("Creating issue in o/r\n\nhttps://github.com/o/r/issues/7"),
            Some(7)
        );
        assert_eq!(issue_number_from_url("no url here"), None);
    }

    #[test]
    fn list_args_carry_state_limit_and_label() {
        let args = list_args(StateFilter::All, Some("cfs:features"), 50);
        assert_eq!(
            args,
            strings(&[
                "issue",
                "list",
                "--state",
                "all",
                "--limit",
                "50",
                "--json",
                ISSUE_FIELDS,
                "--label",
                "cfs:features",
            ])
        );
        assert!(!list_args(StateFilter::Open, None, 1).contains(&"--label".to_string()));
    }

    #[test]
    fn repo_args_only_when_configured() {
        assert!(GhClient::new("gh", None).repo_args().is_empty());
        assert_eq!(
            GhClient::new("gh", Some("o/r".into())).repo_args(),
            vec!["-R".to_string(), "o/r".to_string()]
        );
    }

    #[test]
    fn classifies_auth_and_not_found() {
        assert!(matches!(
            classify_failure("x", "You are not logged into any GitHub hosts", None),
            TrackerError::NotAuthenticated
        ));
        assert!(matches!(
            classify_failure("x", "GraphQL: Could not resolve to an issue", Some(9)),
            TrackerError::IssueNotFound { number: 9 }
        ));
        assert!(matches!(
            classify_failure("x", "not found", None),
            TrackerError::Api { .. }
        ));
    }

    #[test]
    fn missing_program_is_not_installed() {
        let client = GhClient::new("cfs-definitely-not-a-real-binary", None);
        let err = client.check_auth().unwrap_err();
        assert!(matches!(err, TrackerError::NotInstalled { .. }));
        assert!(err.is_fatal());
        let err = client.list_issues(StateFilter::All, None, 10).unwrap_err();
        assert!(matches!(err, TrackerError::NotInstalled { .. }));
    }
}
