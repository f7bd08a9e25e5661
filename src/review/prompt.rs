use crate::pr::PullRequest;

pub const SYSTEM_PROMPT: &str = "You are a GitHub PR reviewer assistant.";

const USER_PREAMBLE: &str = "Analyze this pull request text and provide a review:";

/// Assemble the review document for a PR: description, per-file patches and
/// comment bodies, as three labeled sections separated by blank lines.
///
/// Nothing is escaped or truncated. Oversized documents are rejected by the
/// completion API.
pub fn build_prompt(pr: &PullRequest) -> String {
    let content = pr
        .files
        .iter()
        .map(|file| {
            format!(
                "filename: {} status: {} patch: {}",
                file.path,
                file.status,
                file.patch_text()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let comments = pr
        .comments
        .iter()
        .map(|comment| comment.body.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "pr_description\n{}\n\npr_content\n{}\n\npr_comments\n{}",
        pr.description, content, comments
    )
}

/// The user message wrapping the review document.
pub fn user_message(document: &str) -> String {
    format!("{USER_PREAMBLE}\n\n{document}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pr::{FileChange, FileStatus, ReviewComment};

    fn sample_pr() -> PullRequest {
        PullRequest {
            number: 42,
            title: "Add OAuth2 login flow".to_string(),
            author: "alice".to_string(),
            description: "Adds the login flow.".to_string(),
            files: vec![
                FileChange {
                    path: "src/auth.rs".to_string(),
                    status: FileStatus::Added,
                    additions: 1,
                    deletions: 0,
                    patch: Some("@@ -0,0 +1 @@\n+fn login() {}".to_string()),
                },
                FileChange {
                    path: "docs/README.md".to_string(),
                    status: FileStatus::Renamed,
                    additions: 0,
                    deletions: 0,
                    patch: None,
                },
            ],
            comments: vec![
                ReviewComment {
                    body: "Why not reuse the session?".to_string(),
                },
                ReviewComment {
                    body: "+1".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_sections_in_order() {
        let doc = build_prompt(&sample_pr());
        let description = doc.find("pr_description\nAdds the login flow.").unwrap();
        let content = doc.find("\n\npr_content\n").unwrap();
        let comments = doc.find("\n\npr_comments\n").unwrap();
        assert!(description < content);
        assert!(content < comments);
        assert!(doc.ends_with("Why not reuse the session?\n+1"));
    }

    #[test]
    fn test_file_entries() {
        let doc = build_prompt(&sample_pr());
        assert!(doc.contains(
            "filename: src/auth.rs status: added patch: @@ -0,0 +1 @@\n+fn login() {}"
        ));
        assert!(doc.contains("filename: docs/README.md status: renamed patch: no changes"));
    }

    #[test]
    fn test_unchanged_file_yields_no_changes() {
        let mut pr = sample_pr();
        pr.files = vec![FileChange {
            path: "Cargo.lock".to_string(),
            status: FileStatus::Modified,
            additions: 0,
            deletions: 0,
            patch: Some(String::new()),
        }];
        let doc = build_prompt(&pr);
        assert!(doc.contains("patch: no changes"));
    }

    #[test]
    fn test_empty_pr() {
        let mut pr = sample_pr();
        pr.description.clear();
        pr.files.clear();
        pr.comments.clear();
        assert_eq!(
            build_prompt(&pr),
            "pr_description\n\n\npr_content\n\n\npr_comments\n"
        );
    }

    #[test]
    fn test_user_message() {
        let message = user_message("doc");
        assert_eq!(
            message,
            "Analyze this pull request text and provide a review:\n\ndoc"
        );
    }
}
