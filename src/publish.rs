use tracing::{debug, info, instrument};

use crate::pr::{CodeHost, HostError};
use crate::review::Review;

/// Record a review against a PR: make sure the bot's label exists, tag the
/// PR with it, then submit the review with its verdict as the event.
///
/// Nothing is retried; the first failing call is returned.
#[instrument(skip(host, review), fields(verdict = %review.verdict))]
pub async fn publish_review<H: CodeHost + ?Sized>(
    host: &H,
    number: u64,
    review: &Review,
    label: &str,
) -> Result<(), HostError> {
    ensure_label(host, label).await?;
    host.add_label(number, label).await?;
    host.submit_review(number, review).await?;
    debug!("review published");
    Ok(())
}

/// Create `label` in the repository if it is not there yet.
pub async fn ensure_label<H: CodeHost + ?Sized>(host: &H, label: &str) -> Result<(), HostError> {
    if host.label_exists(label).await? {
        return Ok(());
    }
    info!(label, "creating review label");
    host.create_label(label).await
}
