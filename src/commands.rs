use thiserror::Error;
use tracing::{info, info_span, Instrument};

use crate::config::Settings;
use crate::llm::CompletionModel;
use crate::pr::{CodeHost, HostError};
use crate::publish;
use crate::report;
use crate::review::{ReviewError, Reviewer, Verdict};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Review(#[from] ReviewError),
}

/// Review every open PR, one at a time in listing order. The first failure
/// aborts the remaining batch.
pub async fn review_all_open_prs<H, M>(
    host: &H,
    model: &M,
    settings: &Settings,
    dry_run: bool,
) -> Result<Vec<(u64, Verdict)>, CommandError>
where
    H: CodeHost,
    M: CompletionModel,
{
    info!("listing open pull requests");
    let open = host.list_open_pull_requests().await?;
    info!(count = open.len(), "found open pull requests");

    let reviewer = Reviewer::new(model, settings);
    let mut outcomes = Vec::with_capacity(open.len());
    for number in open {
        let verdict = review_one(host, &reviewer, settings, number, dry_run)
            .instrument(info_span!("pr_review", pr = number))
            .await?;
        outcomes.push((number, verdict));
    }
    Ok(outcomes)
}

/// Review a single PR by number.
pub async fn review_pr<H, M>(
    host: &H,
    model: &M,
    settings: &Settings,
    number: u64,
    dry_run: bool,
) -> Result<Verdict, CommandError>
where
    H: CodeHost,
    M: CompletionModel,
{
    let reviewer = Reviewer::new(model, settings);
    review_one(host, &reviewer, settings, number, dry_run)
        .instrument(info_span!("pr_review", pr = number))
        .await
}

async fn review_one<H, M>(
    host: &H,
    reviewer: &Reviewer<'_, M>,
    settings: &Settings,
    number: u64,
    dry_run: bool,
) -> Result<Verdict, CommandError>
where
    H: CodeHost,
    M: CompletionModel,
{
    info!("fetching pull request");
    let pr = host.fetch_pull_request(number).await?;
    info!(
        files = pr.files.len(),
        additions = pr.additions(),
        deletions = pr.deletions(),
        comments = pr.comments.len(),
        "fetched pull request"
    );

    info!("requesting review from model");
    let review = reviewer.review(&pr).await?;
    info!(verdict = %review.verdict, total_tokens = review.total_tokens, cost = review.cost, "review ready");

    if dry_run {
        report::print_dry_run(&pr, &review, &settings.currency);
    } else {
        info!("publishing review");
        publish::publish_review(host, number, &review, &settings.label_name).await?;
        report::print_submitted(number, &review);
    }
    Ok(review.verdict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::tests::FakeHost;
    use crate::review::tests::{sample_pr, CannedModel};

    fn settings() -> Settings {
        Settings::for_tests("http://unused", "http://unused")
    }

    #[tokio::test]
    async fn test_review_pr_publishes() {
        let host = FakeHost::new(vec![sample_pr(3)]);
        let model = CannedModel::new("Please request changes on the error handling.", 50);
        let verdict = review_pr(&host, &model, &settings(), 3, false).await.unwrap();

        assert_eq!(verdict, Verdict::RequestChanges);
        assert_eq!(
            host.calls(),
            vec![
                "fetch 3",
                "create_label pr_review_bot",
                "add_label 3 pr_review_bot",
                "review 3 REQUEST_CHANGES",
            ]
        );
    }

    #[tokio::test]
    async fn test_review_pr_dry_run_does_not_publish() {
        let host = FakeHost::new(vec![sample_pr(3)]);
        let model = CannedModel::new("Approve.", 50);
        let verdict = review_pr(&host, &model, &settings(), 3, true).await.unwrap();

        assert_eq!(verdict, Verdict::Approve);
        assert_eq!(host.calls(), vec!["fetch 3"]);
    }

    #[tokio::test]
    async fn test_review_pr_unknown_number() {
        let host = FakeHost::new(vec![sample_pr(3)]);
        let model = CannedModel::new("Approve.", 50);
        let result = review_pr(&host, &model, &settings(), 99, false).await;

        assert!(matches!(result, Err(CommandError::Host(HostError::NotFound(99)))));
        assert!(model.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_review_all_open_prs_in_order() {
        let host = FakeHost::new(vec![sample_pr(5), sample_pr(2)]);
        let model = CannedModel::new("Consider renaming this variable.", 10);
        let outcomes = review_all_open_prs(&host, &model, &settings(), false)
            .await
            .unwrap();

        assert_eq!(outcomes, vec![(5, Verdict::Comment), (2, Verdict::Comment)]);
        assert_eq!(
            host.calls(),
            vec![
                "fetch 5",
                "create_label pr_review_bot",
                "add_label 5 pr_review_bot",
                "review 5 COMMENT",
                "fetch 2",
                "add_label 2 pr_review_bot",
                "review 2 COMMENT",
            ]
        );
    }

    #[tokio::test]
    async fn test_review_all_stops_at_first_failure() {
        let mut host = FakeHost::new(vec![sample_pr(5), sample_pr(2)]);
        host.fail_review_for = Some(5);
        let model = CannedModel::new("Approve.", 10);
        let result = review_all_open_prs(&host, &model, &settings(), false).await;

        assert!(matches!(result, Err(CommandError::Host(HostError::Api { .. }))));
        assert!(!host.calls().iter().any(|c| c == "fetch 2"));
    }

    #[tokio::test]
    async fn test_review_all_with_no_open_prs() {
        let host = FakeHost::new(vec![]);
        let model = CannedModel::new("Approve.", 10);
        let outcomes = review_all_open_prs(&host, &model, &settings(), false)
            .await
            .unwrap();
        assert!(outcomes.is_empty());
        assert!(host.calls().is_empty());
    }
}
