//! A [`ContentProvider`] backed by the GitHub REST "repository contents" API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::error::ProviderError;
use super::provider::{ContentEntry, ContentProvider, EntryKind, RepositoryId};

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const REPOSITORIES_PER_PAGE: &str = "100";

/// A repository visible to the configured token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositorySummary {
    pub id: u64,
    pub name: String,
    pub owner: String,
    pub description: Option<String>,
    pub updated_at: Option<String>,
    pub html_url: String,
    pub private: bool,
}

#[derive(Deserialize)]
struct GithubItem {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
    download_url: Option<String>,
}

#[derive(Deserialize)]
struct GithubOwner {
    login: String,
}

#[derive(Deserialize)]
struct GithubRepository {
    id: u64,
    name: String,
    description: Option<String>,
    updated_at: Option<String>,
    html_url: String,
    private: bool,
    owner: GithubOwner,
}

pub struct GithubContentProvider {
    client: reqwest::Client,
    api_base_url: Url,
    token: Option<String>,
}

impl GithubContentProvider {
    /// Creates a provider talking to `api_base_url` (normally
    /// `https://api.github.com`). Every request is bounded by `timeout`.
    pub fn new(
        api_base_url: &str,
        token: Option<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let api_base_url = Url::parse(api_base_url)
            .with_context(|| format!("Invalid API base URL: {api_base_url}"))?;
        if api_base_url.cannot_be_a_base() {
            anyhow::bail!("API base URL cannot carry a path: {api_base_url}");
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent.to_string())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_base_url,
            token,
        })
    }

    /// Lists the repositories the token can access, most recently updated first.
    pub async fn list_repositories(&self) -> Result<Vec<RepositorySummary>, ProviderError> {
        if self.token.is_none() {
            return Err(ProviderError::Forbidden(
                "listing repositories requires an access token".to_string(),
            ));
        }

        let body = self.get(self.repositories_url(), "user/repos").await?;
        parse_repositories(&body)
    }

    fn repositories_url(&self) -> Url {
        let mut url = self.endpoint(&["user", "repos"]);
        url.query_pairs_mut()
            .append_pair("per_page", REPOSITORIES_PER_PAGE)
            .append_pair("sort", "updated")
            .append_pair("visibility", "all");
        url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn contents_url(&self, repository: &RepositoryId, path: &str) -> Url {
        let mut segments = vec![
            "repos",
            repository.owner.as_str(),
            repository.repo.as_str(),
            "contents",
        ];
        // Paths go out exactly as the provider reported them.
        if !path.is_empty() {
            segments.extend(path.split('/'));
        }
        self.endpoint(&segments)
    }

    fn request(&self, url: Url) -> RequestBuilder {
        let request = self.client.get(url).header(ACCEPT, GITHUB_MEDIA_TYPE);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get(&self, url: Url, subject: &str) -> Result<Vec<u8>, ProviderError> {
        tracing::debug!("GET {}", url);
        let response = self.request(url).send().await.map_err(transport_error)?;
        if let Some(err) = classify_status(response.status(), response.headers(), subject) {
            tracing::warn!("GitHub request for '{}' failed: {}", subject, err);
            return Err(err);
        }
        let body = response.bytes().await.map_err(transport_error)?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl ContentProvider for GithubContentProvider {
    async fn list_children(
        &self,
        repository: &RepositoryId,
        path: &str,
    ) -> Result<Vec<ContentEntry>, ProviderError> {
        let url = self.contents_url(repository, path);
        let subject = if path.is_empty() {
            repository.to_string()
        } else {
            path.to_string()
        };
        let body = self.get(url, &subject).await?;
        parse_listing(&body, &subject)
    }

    fn identifier(&self) -> String {
        format!("github({})", self.api_base_url)
    }
}

fn transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Unavailable("request timed out".to_string())
    } else {
        ProviderError::Unavailable(err.to_string())
    }
}

/// Maps a non-success HTTP status onto the provider error taxonomy.
fn classify_status(status: StatusCode, headers: &HeaderMap, subject: &str) -> Option<ProviderError> {
    if status.is_success() {
        return None;
    }

    let quota_exhausted = headers
        .get(RATE_LIMIT_REMAINING)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|remaining| remaining.trim() == "0");

    Some(match status {
        StatusCode::NOT_FOUND => ProviderError::NotFound(subject.to_string()),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited,
        StatusCode::FORBIDDEN if quota_exhausted => ProviderError::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::Forbidden(format!("HTTP {status} for {subject}"))
        }
        s if s.is_server_error() => ProviderError::Unavailable(format!("HTTP {status}")),
        _ => ProviderError::Unavailable(format!("unexpected HTTP {status}")),
    })
}

/// Decodes a contents response, keeping files and directories in the order
/// GitHub returned them. Symlinks and submodules are skipped.
///
/// A directory answers with an array and a file path with a single object.
fn parse_listing(body: &[u8], subject: &str) -> Result<Vec<ContentEntry>, ProviderError> {
    let response: Value = serde_json::from_slice(body).map_err(invalid_response)?;
    let items: Vec<GithubItem> = match response {
        listing @ Value::Array(_) => serde_json::from_value(listing).map_err(invalid_response)?,
        Value::Object(_) => return Err(ProviderError::NotADirectory(subject.to_string())),
        other => {
            return Err(ProviderError::InvalidResponse(format!(
                "expected a listing, got {other}"
            )))
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| {
            let kind = match item.kind.as_str() {
                "dir" => EntryKind::Directory,
                "file" => EntryKind::File,
                other => {
                    tracing::debug!("Skipping '{}' of type '{}'", item.path, other);
                    return None;
                }
            };
            Some(ContentEntry {
                name: item.name,
                kind,
                path: item.path,
                download_url: match kind {
                    EntryKind::File => item.download_url,
                    EntryKind::Directory => None,
                },
            })
        })
        .collect())
}

/// Decodes a `/user/repos` response.
fn parse_repositories(body: &[u8]) -> Result<Vec<RepositorySummary>, ProviderError> {
    let repositories: Vec<GithubRepository> =
        serde_json::from_slice(body).map_err(invalid_response)?;

    Ok(repositories
        .into_iter()
        .map(|repo| RepositorySummary {
            id: repo.id,
            name: repo.name,
            owner: repo.owner.login,
            description: repo.description,
            updated_at: repo.updated_at,
            html_url: repo.html_url,
            private: repo.private,
        })
        .collect())
}

fn invalid_response(err: serde_json::Error) -> ProviderError {
    ProviderError::InvalidResponse(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, AUTHORIZATION};

    fn provider() -> GithubContentProvider {
        GithubContentProvider::new(
            "https://api.github.com",
            None,
            "repo-tree-tests",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_contents_url_encodes_each_segment() {
        let repo = RepositoryId::new("facebook", "react");
        let provider = provider();

        assert_eq!(
            provider.contents_url(&repo, "").as_str(),
            "https://api.github.com/repos/facebook/react/contents"
        );
        assert_eq!(
            provider.contents_url(&repo, "packages/react dom").as_str(),
            "https://api.github.com/repos/facebook/react/contents/packages/react%20dom"
        );
    }

    #[test]
    fn test_enterprise_base_path_is_kept() {
        let provider = GithubContentProvider::new(
            "https://ghe.example.com/api/v3/",
            Some("token".into()),
            "repo-tree-tests",
            Duration::from_secs(5),
        )
        .unwrap();
        let url = provider.contents_url(&RepositoryId::new("o", "r"), "src");
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/repos/o/r/contents/src");
    }

    #[test]
    fn test_contents_url_passes_path_through_unchanged() {
        let url = provider().contents_url(&RepositoryId::new("o", "r"), "a//b/");
        assert_eq!(url.as_str(), "https://api.github.com/repos/o/r/contents/a//b/");
    }

    #[test]
    fn test_repositories_url_has_paging_and_sort_query() {
        assert_eq!(
            provider().repositories_url().as_str(),
            "https://api.github.com/user/repos?per_page=100&sort=updated&visibility=all"
        );
    }

    #[test]
    fn test_bearer_header_only_sent_with_token() {
        let url = Url::parse("https://api.github.com/repos/o/r/contents").unwrap();

        let anonymous = provider().request(url.clone()).build().unwrap();
        assert!(anonymous.headers().get(AUTHORIZATION).is_none());
        assert_eq!(anonymous.headers()[ACCEPT], GITHUB_MEDIA_TYPE);

        let authenticated = GithubContentProvider::new(
            "https://api.github.com",
            Some("ghp_secret".into()),
            "repo-tree-tests",
            Duration::from_secs(5),
        )
        .unwrap()
        .request(url)
        .build()
        .unwrap();
        assert_eq!(authenticated.headers()[AUTHORIZATION], "Bearer ghp_secret");
    }

    #[test]
    fn test_parse_repositories_flattens_owner() {
        let body = br#"[
            {
                "id": 10270250,
                "name": "react",
                "full_name": "facebook/react",
                "private": false,
                "owner": {"login": "facebook", "id": 69631, "type": "Organization"},
                "html_url": "https://github.com/facebook/react",
                "description": "The library for web and native user interfaces.",
                "fork": false,
                "updated_at": "2025-01-05T10:00:00Z"
            },
            {
                "id": 42,
                "name": "notes",
                "private": true,
                "owner": {"login": "octocat"},
                "html_url": "https://github.com/octocat/notes",
                "description": null,
                "updated_at": null
            }
        ]"#;

        let repositories = parse_repositories(body).unwrap();
        assert_eq!(
            repositories,
            vec![
                RepositorySummary {
                    id: 10270250,
                    name: "react".into(),
                    owner: "facebook".into(),
                    description: Some("The library for web and native user interfaces.".into()),
                    updated_at: Some("2025-01-05T10:00:00Z".into()),
                    html_url: "https://github.com/facebook/react".into(),
                    private: false,
                },
                RepositorySummary {
                    id: 42,
                    name: "notes".into(),
                    owner: "octocat".into(),
                    description: None,
                    updated_at: None,
                    html_url: "https://github.com/octocat/notes".into(),
                    private: true,
                },
            ]
        );
    }

    #[test]
    fn test_parse_repositories_rejects_unexpected_shape() {
        assert!(matches!(
            parse_repositories(br#"{"message": "Bad credentials"}"#),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = GithubContentProvider::new("not a url", None, "ua", Duration::from_secs(1));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_listing_keeps_order_and_skips_other_types() {
        let body = br#"[
            {"name": "src", "path": "src", "type": "dir", "download_url": null},
            {"name": "README.md", "path": "README.md", "type": "file",
             "download_url": "https://raw.githubusercontent.com/o/r/main/README.md"},
            {"name": "vendor", "path": "vendor", "type": "submodule", "download_url": null},
            {"name": "docs", "path": "docs", "type": "dir", "download_url": null}
        ]"#;

        let entries = parse_listing(body, "o/r").unwrap();
        assert_eq!(
            entries,
            vec![
                ContentEntry::directory("src", "src"),
                ContentEntry::file(
                    "README.md",
                    "README.md",
                    Some("https://raw.githubusercontent.com/o/r/main/README.md"),
                ),
                ContentEntry::directory("docs", "docs"),
            ]
        );
    }

    #[test]
    fn test_parse_listing_distinguishes_empty_and_file() {
        assert_eq!(parse_listing(b"[]", "empty"), Ok(Vec::new()));
        assert_eq!(
            parse_listing(br#"{"name": "a.rs", "type": "file"}"#, "a.rs"),
            Err(ProviderError::NotADirectory("a.rs".into()))
        );
        assert!(matches!(
            parse_listing(b"<html>", "x"),
            Err(ProviderError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_listing(br#"[{"unexpected": true}]"#, "x"),
            Err(ProviderError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_listing(b"42", "x"),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_classify_status() {
        let none = HeaderMap::new();
        let mut exhausted = HeaderMap::new();
        exhausted.insert(RATE_LIMIT_REMAINING, HeaderValue::from_static("0"));

        assert_eq!(classify_status(StatusCode::OK, &none, "src"), None);
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND, &none, "src"),
            Some(ProviderError::NotFound("src".into()))
        );
        assert_eq!(
            classify_status(StatusCode::FORBIDDEN, &exhausted, "src"),
            Some(ProviderError::RateLimited)
        );
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, &none, "src"),
            Some(ProviderError::RateLimited)
        );
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, &none, "src"),
            Some(ProviderError::Forbidden(_))
        ));
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, &none, "src"),
            Some(ProviderError::Forbidden(_))
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, &none, "src"),
            Some(ProviderError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_list_repositories_requires_token() {
        let result = provider().list_repositories().await;
        assert!(matches!(result, Err(ProviderError::Forbidden(_))));
    }
}
