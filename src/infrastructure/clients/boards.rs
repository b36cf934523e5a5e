//! Link-aggregator API client (board listings and comment threads)

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::application::errors::BotError;
use crate::application::formatting::{Comment, Post};

/// Link-aggregator endpoint
const API_BASE: &str = "https://www.reddit.com";

const INTEGRATION: &str = "boards";

/// Time windows accepted by the top-posts listing
pub const TOP_WINDOWS: &[&str] = &["hour", "day", "week", "month", "year", "all"];

/// Sort orders accepted by the comment listing
pub const COMMENT_SORTS: &[&str] = &["top", "best", "new", "controversial", "old"];

/// Unauthenticated client for the public JSON listings
pub struct BoardsClient {
    client: Client,
    user_agent: String,
    base_url: String,
}

impl BoardsClient {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            user_agent: user_agent.into(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Point the client at a different server, for local testing
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BotError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("User-Agent", &self.user_agent)
            .query(query)
            .send()
            .await
            .map_err(|e| BotError::upstream(INTEGRATION, e))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(BotError::upstream(
                INTEGRATION,
                format!("HTTP {}", status),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| BotError::upstream(INTEGRATION, e))
    }

    /// Hot posts for a named board
    pub async fn hot(&self, board: &str, count: u32) -> Result<Vec<Post>, BotError> {
        let listing: Listing = self
            .get_json(
                &format!("/r/{}/hot.json", board),
                &[("limit", count.to_string())],
            )
            .await?;
        listing_posts(&self.base_url, listing)
    }

    /// Top posts for a named board over a named time window
    pub async fn top(&self, board: &str, window: &str, count: u32) -> Result<Vec<Post>, BotError> {
        let listing: Listing = self
            .get_json(
                &format!("/r/{}/top.json", board),
                &[("t", window.to_string()), ("limit", count.to_string())],
            )
            .await?;
        listing_posts(&self.base_url, listing)
    }

    /// Recent posts from a random board; returns the board's name too.
    ///
    /// The random endpoint redirects to a concrete board, so the name
    /// comes back out of the first post.
    pub async fn random(&self, count: u32) -> Result<(String, Vec<Post>), BotError> {
        let listing: Listing = self
            .get_json("/r/random/new.json", &[("limit", count.to_string())])
            .await?;
        let board = listing
            .data
            .children
            .first()
            .and_then(|t| t.data.subreddit.clone())
            .ok_or_else(|| BotError::upstream(INTEGRATION, "random board came back empty"))?;
        let posts = listing_posts(&self.base_url, listing)?;
        Ok((board, posts))
    }

    /// Nested replies for a post, in a named sort order
    pub async fn comments(&self, post_id: &str, sort: &str) -> Result<Vec<Comment>, BotError> {
        // The comments endpoint returns two listings: the post, then replies
        let listings: Vec<Listing> = self
            .get_json(
                &format!("/comments/{}.json", post_id),
                &[("sort", sort.to_string())],
            )
            .await?;
        let replies = listings
            .into_iter()
            .nth(1)
            .ok_or_else(|| BotError::upstream(INTEGRATION, "comment listing missing"))?;

        replies
            .data
            .children
            .into_iter()
            .filter(|t| t.data.body.is_some())
            .map(|t| {
                Comment::from_parts(t.data.author, t.data.body, t.data.score)
                    .map_err(BotError::from)
            })
            .collect()
    }
}

fn listing_posts(base_url: &str, listing: Listing) -> Result<Vec<Post>, BotError> {
    listing
        .data
        .children
        .into_iter()
        .map(|t| {
            let url = t
                .data
                .url
                .filter(|u| !u.is_empty())
                .or_else(|| t.data.permalink.map(|p| format!("{}{}", base_url, p)));
            Post::from_parts(t.data.title, url, t.data.score).map_err(BotError::from)
        })
        .collect()
}

/// API wire types
#[derive(Debug, Clone, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Clone, Deserialize)]
struct ListingData {
    children: Vec<Thing>,
}

#[derive(Debug, Clone, Deserialize)]
struct Thing {
    data: ThingData,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ThingData {
    title: Option<String>,
    url: Option<String>,
    permalink: Option<String>,
    score: Option<i64>,
    subreddit: Option<String>,
    author: Option<String>,
    body: Option<String>,
}
