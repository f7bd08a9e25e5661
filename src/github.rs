use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::Settings;
use crate::pr::{diff, CodeHost, HostError, PullRequest, ReviewComment};
use crate::review::Review;

const USER_AGENT: &str = "pr-review-bot";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const DIFF_MEDIA_TYPE: &str = "application/vnd.github.diff";
const PER_PAGE: usize = 100;

const LABEL_COLOR: &str = "0e8a16";
const LABEL_DESCRIPTION: &str = "Reviewed by pr-review-bot";

#[derive(Deserialize)]
struct User {
    login: String,
}

#[derive(Deserialize)]
struct PullSummary {
    number: u64,
}

#[derive(Deserialize)]
struct PullResponse {
    number: u64,
    title: String,
    body: Option<String>,
    user: User,
}

#[derive(Deserialize)]
struct CommentResponse {
    body: String,
}

/// GitHub REST client bound to the configured repository.
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: Url,
    token: String,
    owner: String,
    repo: String,
}

impl GitHubClient {
    pub fn new(settings: &Settings) -> Result<Self, HostError> {
        let api_url = Url::parse(&settings.github_api_url)
            .map_err(|_| HostError::InvalidUrl(settings.github_api_url.clone()))?;
        if api_url.cannot_be_a_base() {
            return Err(HostError::InvalidUrl(settings.github_api_url.clone()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_url,
            token: settings.github_token.clone(),
            owner: settings.owner.clone(),
            repo: settings.repo_name.clone(),
        })
    }

    /// `{api_url}/repos/{owner}/{repo}/{segments...}` with each segment
    /// percent-encoded.
    fn repo_url(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .push("repos")
                .push(&self.owner)
                .push(&self.repo)
                .extend(segments);
        }
        url
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("User-Agent", USER_AGENT)
            .header("X-GitHub-Api-Version", "2022-11-28")
            .bearer_auth(&self.token)
    }

    fn get(&self, url: Url) -> RequestBuilder {
        self.request(self.client.get(url))
            .header("Accept", JSON_MEDIA_TYPE)
    }

    fn post(&self, url: Url) -> RequestBuilder {
        self.request(self.client.post(url))
            .header("Accept", JSON_MEDIA_TYPE)
    }

    /// Collect every page of a list endpoint.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, HostError> {
        let mut items = Vec::new();
        let per_page = PER_PAGE.to_string();
        let mut page = 1usize;
        loop {
            let page_str = page.to_string();
            let response = self
                .get(url.clone())
                .query(query)
                .query(&[("per_page", per_page.as_str()), ("page", page_str.as_str())])
                .send()
                .await?;
            let batch: Vec<T> = check(response).await?.json().await?;
            let len = batch.len();
            items.extend(batch);
            debug!(page, len, "fetched page");
            if len < PER_PAGE {
                break;
            }
            page += 1;
        }
        Ok(items)
    }
}

/// Map non-2xx responses to [`HostError::Api`].
async fn check(response: Response) -> Result<Response, HostError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(HostError::Api { status, body })
}

#[async_trait]
impl CodeHost for GitHubClient {
    #[instrument(skip(self), fields(owner = %self.owner, repo = %self.repo))]
    async fn list_open_pull_requests(&self) -> Result<Vec<u64>, HostError> {
        let pulls: Vec<PullSummary> = self
            .get_all_pages(self.repo_url(&["pulls"]), &[("state", "open")])
            .await?;
        debug!(count = pulls.len(), "listed open pull requests");
        Ok(pulls.into_iter().map(|p| p.number).collect())
    }

    #[instrument(skip(self), fields(owner = %self.owner, repo = %self.repo))]
    async fn fetch_pull_request(&self, number: u64) -> Result<PullRequest, HostError> {
        let number_str = number.to_string();
        let pull_url = self.repo_url(&["pulls", number_str.as_str()]);

        debug!("fetching PR metadata from GitHub API");
        let response = self.get(pull_url.clone()).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(HostError::NotFound(number));
        }
        let metadata: PullResponse = check(response).await?.json().await?;
        debug!(title = %metadata.title, "received PR metadata");

        debug!("fetching PR diff from GitHub API");
        let diff_text = self
            .request(self.client.get(pull_url))
            .header("Accept", DIFF_MEDIA_TYPE)
            .send()
            .await?;
        let diff_text = check(diff_text).await?.text().await?;
        debug!(diff_bytes = diff_text.len(), "received PR diff");

        let files = diff::parse_diff(&diff_text)?;
        debug!(parsed_files = files.len(), "parsed diff");

        let comments: Vec<CommentResponse> = self
            .get_all_pages(self.repo_url(&["pulls", number_str.as_str(), "comments"]), &[])
            .await?;
        debug!(comments = comments.len(), "received review comments");

        Ok(PullRequest {
            number: metadata.number,
            title: metadata.title,
            author: metadata.user.login,
            description: metadata.body.unwrap_or_default(),
            files,
            comments: comments
                .into_iter()
                .map(|c| ReviewComment { body: c.body })
                .collect(),
        })
    }

    #[instrument(skip(self))]
    async fn label_exists(&self, name: &str) -> Result<bool, HostError> {
        let response = self.get(self.repo_url(&["labels", name])).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check(response).await?;
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn create_label(&self, name: &str) -> Result<(), HostError> {
        let body = serde_json::json!({
            "name": name,
            "color": LABEL_COLOR,
            "description": LABEL_DESCRIPTION,
        });
        let response = self
            .post(self.repo_url(&["labels"]))
            .json(&body)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_label(&self, number: u64, name: &str) -> Result<(), HostError> {
        let number_str = number.to_string();
        let response = self
            .post(self.repo_url(&["issues", number_str.as_str(), "labels"]))
            .json(&serde_json::json!({ "labels": [name] }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    #[instrument(skip(self, review), fields(verdict = %review.verdict))]
    async fn submit_review(&self, number: u64, review: &Review) -> Result<(), HostError> {
        let number_str = number.to_string();
        let body = serde_json::json!({
            "body": review.body,
            "event": review.verdict.as_str(),
        });
        let response = self
            .post(self.repo_url(&["pulls", number_str.as_str(), "reviews"]))
            .json(&body)
            .send()
            .await?;
        check(response).await?;
        debug!("review submitted");
        Ok(())
    }
}
