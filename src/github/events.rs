//! GitHub activity events and their summary-ready projection.

use chrono::{DateTime, Utc};
use core::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// The `type` of an activity event.
///
/// Kinds the classifier does not know about are kept verbatim in [`EventKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    Push,
    Create,
    Delete,
    Issues,
    PullRequest,
    Other(String),
}

impl EventKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Push => "PushEvent",
            Self::Create => "CreateEvent",
            Self::Delete => "DeleteEvent",
            Self::Issues => "IssuesEvent",
            Self::PullRequest => "PullRequestEvent",
            Self::Other(kind) => kind,
        }
    }
}

impl From<String> for EventKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "PushEvent" => Self::Push,
            "CreateEvent" => Self::Create,
            "DeleteEvent" => Self::Delete,
            "IssuesEvent" => Self::Issues,
            "PullRequestEvent" => Self::PullRequest,
            _ => Self::Other(kind),
        }
    }
}

impl From<&str> for EventKind {
    fn from(kind: &str) -> Self {
        Self::from(kind.to_string())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the `/users/{user}/events` feed, with only the fields we consume.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawActivityEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub repo: RepoRef,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoRef {
    /// `owner/name`
    pub name: String,
}

/// Union of the payload fields used by the event kinds we classify.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Payload {
    #[serde(default, rename = "ref")]
    pub git_ref: Option<String>,
    #[serde(default)]
    pub ref_type: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub commits: Vec<Commit>,
    #[serde(default)]
    pub pull_request: Option<PullRequestRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Commit {
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "id")]
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequestRef {
    #[serde(default)]
    pub title: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Commit>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Commit>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Normalized, summary-ready view of an activity event.
///
/// Only the optional fields relevant to `kind` are populated; absent fields are left out
/// of the JSON form entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedActivityEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(rename = "repo")]
    pub repository: String,
    pub created_at: DateTime<Utc>,
    pub is_private: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(rename = "commits", skip_serializing_if = "Option::is_none")]
    pub commit_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_messages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_type: Option<String>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(rename = "pr_title", skip_serializing_if = "Option::is_none")]
    pub pull_request_title: Option<String>,
}

impl FormattedActivityEvent {
    fn common(event: &RawActivityEvent) -> Self {
        Self {
            kind: event.kind.clone(),
            repository: event.repo.name.clone(),
            created_at: event.created_at,
            is_private: !event.public,
            branch: None,
            commit_count: None,
            commit_messages: None,
            ref_type: None,
            git_ref: None,
            action: None,
            pull_request_title: None,
        }
    }
}

impl From<&RawActivityEvent> for FormattedActivityEvent {
    fn from(event: &RawActivityEvent) -> Self {
        let payload = &event.payload;
        let mut formatted = Self::common(event);

        match event.kind {
            EventKind::Push => {
                let messages: Vec<String> = payload.commits.iter().map(|c| c.message.clone()).collect();
                formatted.commit_count = Some(messages.len());
                formatted.commit_messages = Some(messages);
                formatted.branch = Some(extract_branch(payload.git_ref.as_deref().unwrap_or_default()).to_string());
            }
            EventKind::Create | EventKind::Delete => {
                formatted.ref_type.clone_from(&payload.ref_type);
                formatted.git_ref.clone_from(&payload.git_ref);
            }
            EventKind::Issues | EventKind::PullRequest => {
                formatted.action.clone_from(&payload.action);
                formatted.pull_request_title = payload.pull_request.as_ref().and_then(|pr| pr.title.clone());
            }
            EventKind::Other(_) => {}
        }

        formatted
    }
}

/// Project raw events into their summary-ready form, preserving order.
#[must_use]
pub fn classify(events: &[RawActivityEvent]) -> Vec<FormattedActivityEvent> {
    events.iter().map(FormattedActivityEvent::from).collect()
}

/// Strip the `refs/heads/` prefix from a git ref.
///
/// Refs that don't carry the prefix, or that are no longer than the prefix itself, are
/// returned unchanged.
#[must_use]
pub fn extract_branch(git_ref: &str) -> &str {
    if git_ref.len() > BRANCH_REF_PREFIX.len()
        && let Some(branch) = git_ref.strip_prefix(BRANCH_REF_PREFIX)
    {
        return branch;
    }

    git_ref
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn raw(kind: &str, public: bool, payload: Payload) -> RawActivityEvent {
        RawActivityEvent {
            kind: EventKind::from(kind),
            repo: RepoRef {
                name: "testuser/testrepo".to_string(),
            },
            created_at: at(),
            public,
            payload,
        }
    }

    #[test]
    fn test_extract_branch() {
        assert_eq!(extract_branch("refs/heads/main"), "main");
        assert_eq!(extract_branch("refs/heads/feature/new-feature"), "feature/new-feature");
        assert_eq!(extract_branch("main"), "main");
        assert_eq!(extract_branch(""), "");
        assert_eq!(extract_branch("refs/heads"), "refs/heads");
        assert_eq!(extract_branch("refs/heads/"), "refs/heads/");
        assert_eq!(extract_branch("refs/tags/v1.0"), "refs/tags/v1.0");
    }

    #[test]
    fn test_extract_branch_roundtrips_any_branch_name() {
        for name in ["a", "main", "release/1.2", "refs/heads/nested", "ção"] {
            assert_eq!(extract_branch(&format!("{BRANCH_REF_PREFIX}{name}")), name);
        }
    }

    #[test]
    fn test_event_kind_from_str() {
        assert_eq!(EventKind::from("PushEvent"), EventKind::Push);
        assert_eq!(EventKind::from("CreateEvent"), EventKind::Create);
        assert_eq!(EventKind::from("DeleteEvent"), EventKind::Delete);
        assert_eq!(EventKind::from("IssuesEvent"), EventKind::Issues);
        assert_eq!(EventKind::from("PullRequestEvent"), EventKind::PullRequest);
        assert_eq!(EventKind::from("WatchEvent"), EventKind::Other("WatchEvent".to_string()));
        assert_eq!(EventKind::from("WatchEvent").to_string(), "WatchEvent");
        assert_eq!(EventKind::Push.to_string(), "PushEvent");
    }

    #[test]
    fn test_classify_push() {
        let payload = Payload {
            git_ref: Some("refs/heads/main".to_string()),
            commits: vec![
                Commit {
                    message: "Initial commit".to_string(),
                    sha: "abc123".to_string(),
                },
                Commit {
                    message: "Add feature".to_string(),
                    sha: "def456".to_string(),
                },
            ],
            ..Payload::default()
        };

        let formatted = classify(&[raw("PushEvent", true, payload)]);
        assert_eq!(formatted.len(), 1);

        let event = &formatted[0];
        assert_eq!(event.kind, EventKind::Push);
        assert_eq!(event.repository, "testuser/testrepo");
        assert!(!event.is_private);
        assert_eq!(event.branch.as_deref(), Some("main"));
        assert_eq!(event.commit_count, Some(2));
        assert_eq!(
            event.commit_messages.as_deref(),
            Some(&["Initial commit".to_string(), "Add feature".to_string()][..])
        );
        assert!(event.ref_type.is_none());
        assert!(event.git_ref.is_none());
        assert!(event.action.is_none());
        assert!(event.pull_request_title.is_none());
    }

    #[test]
    fn test_classify_push_without_commits() {
        let formatted = classify(&[raw("PushEvent", true, Payload::default())]);
        let event = &formatted[0];
        assert_eq!(event.commit_count, Some(0));
        assert_eq!(event.commit_messages.as_ref().map(Vec::len), Some(0));
        assert_eq!(event.branch.as_deref(), Some(""));
    }

    #[test]
    fn test_classify_create_and_delete() {
        let payload = Payload {
            ref_type: Some("branch".to_string()),
            git_ref: Some("feature/new".to_string()),
            ..Payload::default()
        };

        for kind in ["CreateEvent", "DeleteEvent"] {
            let formatted = classify(&[raw(kind, false, payload.clone())]);
            let event = &formatted[0];
            assert!(event.is_private);
            assert_eq!(event.ref_type.as_deref(), Some("branch"));
            assert_eq!(event.git_ref.as_deref(), Some("feature/new"));
            assert!(event.branch.is_none());
            assert!(event.commit_count.is_none());
            assert!(event.action.is_none());
        }
    }

    #[test]
    fn test_classify_issue_and_pull_request() {
        let issue = Payload {
            action: Some("opened".to_string()),
            ..Payload::default()
        };
        let pr = Payload {
            action: Some("closed".to_string()),
            pull_request: Some(PullRequestRef {
                title: Some("Fix the thing".to_string()),
            }),
            ..Payload::default()
        };

        let formatted = classify(&[raw("IssuesEvent", true, issue), raw("PullRequestEvent", true, pr)]);
        assert_eq!(formatted[0].action.as_deref(), Some("opened"));
        assert!(formatted[0].pull_request_title.is_none());
        assert_eq!(formatted[1].action.as_deref(), Some("closed"));
        assert_eq!(formatted[1].pull_request_title.as_deref(), Some("Fix the thing"));
    }

    #[test]
    fn test_classify_pull_request_without_pr_object() {
        let payload = Payload {
            action: Some("opened".to_string()),
            ..Payload::default()
        };

        let formatted = classify(&[raw("PullRequestEvent", true, payload)]);
        assert_eq!(formatted[0].action.as_deref(), Some("opened"));
        assert!(formatted[0].pull_request_title.is_none());
    }

    #[test]
    fn test_classify_unknown_kind_keeps_common_fields_only() {
        let payload = Payload {
            action: Some("started".to_string()),
            git_ref: Some("refs/heads/main".to_string()),
            ..Payload::default()
        };

        let formatted = classify(&[raw("WatchEvent", true, payload)]);
        let event = &formatted[0];
        assert_eq!(event.kind, EventKind::Other("WatchEvent".to_string()));
        assert_eq!(event.created_at, at());
        assert!(event.action.is_none());
        assert!(event.branch.is_none());
        assert!(event.git_ref.is_none());
    }

    #[test]
    fn test_classify_preserves_order() {
        let kinds = ["PushEvent", "CreateEvent", "DeleteEvent", "IssuesEvent", "PullRequestEvent", "WatchEvent"];
        let raws: Vec<_> = kinds.iter().map(|k| raw(k, true, Payload::default())).collect();

        let formatted = classify(&raws);
        let got: Vec<String> = formatted.iter().map(|e| e.kind.to_string()).collect();
        assert_eq!(got, kinds);
    }

    #[test]
    fn test_classify_empty() {
        assert!(classify(&[]).is_empty());
    }

    #[test]
    fn test_raw_event_deserialize() {
        let json = r#"{
            "id": "123",
            "type": "PushEvent",
            "actor": {"login": "testuser"},
            "repo": {"id": 1, "name": "testuser/testrepo", "url": "https://api.github.com/repos/testuser/testrepo"},
            "payload": {
                "push_id": 42,
                "ref": "refs/heads/main",
                "commits": [{"sha": "abc123", "message": "Initial commit", "distinct": true}]
            },
            "public": false,
            "created_at": "2024-05-01T12:00:00Z"
        }"#;

        let event: RawActivityEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.kind, EventKind::Push);
        assert_eq!(event.repo.name, "testuser/testrepo");
        assert!(!event.public);
        assert_eq!(event.created_at, at());
        assert_eq!(event.payload.git_ref.as_deref(), Some("refs/heads/main"));
        assert_eq!(event.payload.commits[0].sha, "abc123");
    }

    #[test]
    fn test_raw_event_deserialize_sparse_payload() {
        let json = r#"{
            "type": "CreateEvent",
            "repo": {"name": "o/r"},
            "created_at": "2024-05-01T12:00:00Z",
            "public": true,
            "payload": {"ref": null, "ref_type": "repository", "commits": null}
        }"#;

        let event: RawActivityEvent = serde_json::from_str(json).unwrap();
        assert!(event.payload.git_ref.is_none());
        assert_eq!(event.payload.ref_type.as_deref(), Some("repository"));
        assert!(event.payload.commits.is_empty());
    }

    #[test]
    fn test_commit_id_alias() {
        let commit: Commit = serde_json::from_str(r#"{"id": "xyz", "message": "m"}"#).unwrap();
        assert_eq!(commit.sha, "xyz");
    }

    #[test]
    fn test_formatted_event_serializes_only_relevant_fields() {
        let payload = Payload {
            git_ref: Some("refs/heads/dev".to_string()),
            commits: vec![Commit {
                message: "wip".to_string(),
                sha: "1".to_string(),
            }],
            ..Payload::default()
        };

        let formatted = classify(&[raw("PushEvent", false, payload)]);
        let value = serde_json::to_value(&formatted[0]).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "type": "PushEvent",
                "repo": "testuser/testrepo",
                "created_at": "2024-05-01T12:00:00Z",
                "is_private": true,
                "branch": "dev",
                "commits": 1,
                "commit_messages": ["wip"],
            })
        );
    }

    #[test]
    fn test_formatted_unknown_event_serialization() {
        let formatted = classify(&[raw("ForkEvent", true, Payload::default())]);
        let value = serde_json::to_value(&formatted[0]).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "type": "ForkEvent",
                "repo": "testuser/testrepo",
                "created_at": "2024-05-01T12:00:00Z",
                "is_private": false,
            })
        );
    }
}
