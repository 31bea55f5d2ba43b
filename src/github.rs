use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::Deserialize;

// Reviews are capped at the first 100 returned per pull request; a PR with
// heavier review activity is classified from that truncated window.
const PULL_REQUESTS_QUERY: &str = r#"
query($owner: String!, $name: String!, $prCursor: String) {
  repository(owner: $owner, name: $name) {
    pullRequests(states: OPEN, first: 100, after: $prCursor) {
      nodes {
        title
        author { login }
        isDraft
        createdAt
        reviews(first: 100) {
          nodes {
            state
            submittedAt
          }
        }
      }
      pageInfo {
        endCursor
        hasNextPage
      }
    }
  }
}
"#;

/// An open pull request as seen at fetch time.
#[derive(Debug, Clone)]
pub struct PullRequest {
    pub title: String,
    /// Login of the author; empty when the account no longer exists.
    pub author: String,
    pub is_draft: bool,
    pub created_at: DateTime<Utc>,
    /// In submission order as returned by the API, capped at 100.
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone)]
pub struct Review {
    pub state: ReviewState,
    /// Null upstream for reviews that were never submitted (PENDING).
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Review states that carry weight for classification.
///
/// GitHub returns more states (CHANGES_REQUESTED, DISMISSED, PENDING, and
/// whatever gets added next); all of them collapse into `Other` and are
/// inert here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    Commented,
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<QueryData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    repository: Option<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    pull_requests: PullRequestConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestConnection {
    nodes: Vec<PullRequestNode>,
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestNode {
    title: String,
    author: Option<AuthorNode>,
    is_draft: bool,
    created_at: DateTime<Utc>,
    reviews: ReviewConnection,
}

#[derive(Debug, Deserialize)]
struct AuthorNode {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ReviewConnection {
    nodes: Vec<ReviewNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewNode {
    state: ReviewState,
    submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    end_cursor: Option<String>,
    has_next_page: bool,
}

impl From<PullRequestNode> for PullRequest {
    fn from(node: PullRequestNode) -> Self {
        PullRequest {
            title: node.title,
            author: node.author.map(|a| a.login).unwrap_or_default(),
            is_draft: node.is_draft,
            created_at: node.created_at,
            reviews: node
                .reviews
                .nodes
                .into_iter()
                .map(|review| Review {
                    state: review.state,
                    submitted_at: review.submitted_at,
                })
                .collect(),
        }
    }
}

#[derive(Clone)]
pub struct GitHubClient {
    octocrab: Octocrab,
}

impl GitHubClient {
    pub fn new(token: String) -> Result<Self> {
        Ok(Self {
            octocrab: Octocrab::builder().personal_token(token).build()?,
        })
    }

    /// Retrieves every currently-open pull request of a repository.
    ///
    /// Pages of up to 100 pull requests are followed via the continuation
    /// cursor until the API reports no further pages. Any transport or
    /// query error aborts the whole fetch with no partial result; deciding
    /// when to try again is the caller's job.
    pub async fn fetch_open_pull_requests(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<PullRequest>> {
        let mut prs = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let payload = serde_json::json!({
                "query": PULL_REQUESTS_QUERY,
                "variables": {
                    "owner": owner,
                    "name": repo,
                    "prCursor": cursor,
                },
            });

            let response: GraphQlResponse = self
                .octocrab
                .graphql(&payload)
                .await
                .context("cannot query GitHub")?;

            if let Some(error) = response.errors.first() {
                bail!("GitHub GraphQL query failed: {}", error.message);
            }

            let repository = response
                .data
                .and_then(|data| data.repository)
                .with_context(|| format!("repository {owner}/{repo} not found"))?;

            let page = repository.pull_requests;
            prs.extend(page.nodes.into_iter().map(PullRequest::from));

            if !page.page_info.has_next_page {
                break;
            }
            cursor = page.page_info.end_cursor;
        }

        Ok(prs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_pull_request_page() {
        let body = serde_json::json!({
            "data": {
                "repository": {
                    "pullRequests": {
                        "nodes": [
                            {
                                "title": "Add workspace prewarming",
                                "author": { "login": "octocat" },
                                "isDraft": false,
                                "createdAt": "2024-03-01T12:00:00Z",
                                "reviews": {
                                    "nodes": [
                                        { "state": "APPROVED", "submittedAt": "2024-03-02T09:30:00Z" },
                                        { "state": "CHANGES_REQUESTED", "submittedAt": "2024-03-01T15:00:00Z" },
                                        { "state": "PENDING", "submittedAt": null }
                                    ]
                                }
                            },
                            {
                                "title": "Orphaned branch cleanup",
                                "author": null,
                                "isDraft": true,
                                "createdAt": "2024-02-28T08:00:00Z",
                                "reviews": { "nodes": [] }
                            }
                        ],
                        "pageInfo": {
                            "endCursor": "Y3Vyc29yOjI=",
                            "hasNextPage": true
                        }
                    }
                }
            }
        });

        let response: GraphQlResponse = serde_json::from_value(body).unwrap();
        assert!(response.errors.is_empty());

        let page = response
            .data
            .unwrap()
            .repository
            .unwrap()
            .pull_requests;
        assert!(page.page_info.has_next_page);
        assert_eq!(page.page_info.end_cursor.as_deref(), Some("Y3Vyc29yOjI="));

        let prs: Vec<PullRequest> = page.nodes.into_iter().map(PullRequest::from).collect();
        assert_eq!(prs.len(), 2);

        assert_eq!(prs[0].author, "octocat");
        assert!(!prs[0].is_draft);
        assert_eq!(prs[0].reviews.len(), 3);
        assert_eq!(prs[0].reviews[0].state, ReviewState::Approved);
        // Unknown-to-us states collapse into Other.
        assert_eq!(prs[0].reviews[1].state, ReviewState::Other);
        assert_eq!(prs[0].reviews[2].state, ReviewState::Other);
        assert!(prs[0].reviews[2].submitted_at.is_none());

        // Deleted author deserializes to an empty login.
        assert_eq!(prs[1].author, "");
        assert!(prs[1].is_draft);
    }

    #[test]
    fn test_deserialize_graphql_errors() {
        let body = serde_json::json!({
            "data": null,
            "errors": [
                { "message": "API rate limit exceeded" }
            ]
        });

        let response: GraphQlResponse = serde_json::from_value(body).unwrap();
        assert!(response.data.is_none());
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].message, "API rate limit exceeded");
    }
}
