//! Social timeline API client (lists, timelines, rate limit, expiry)

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::application::errors::BotError;
use crate::application::formatting::{CuratedList, Status};

/// Timeline API endpoint
const API_BASE: &str = "https://api.twitter.com/1.1";

const INTEGRATION: &str = "timeline";

/// Created-at format used by the timeline API
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Outcome of an expire-older-than pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpireReport {
    pub deleted: u64,
    pub ignored: u64,
}

/// Authenticated timeline client
pub struct TimelineClient {
    client: Client,
    bearer_token: String,
    base_url: String,
}

impl TimelineClient {
    pub fn new(bearer_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            bearer_token: bearer_token.into(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Point the client at a different server, for local testing
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BotError> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.bearer_token)
            .query(query)
            .send()
            .await
            .map_err(|e| BotError::upstream(INTEGRATION, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::upstream(
                INTEGRATION,
                format!("HTTP {}: {}", status, body),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| BotError::upstream(INTEGRATION, e))
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<T, BotError> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.bearer_token)
            .form(form)
            .send()
            .await
            .map_err(|e| BotError::upstream(INTEGRATION, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::upstream(
                INTEGRATION,
                format!("HTTP {}: {}", status, body),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| BotError::upstream(INTEGRATION, e))
    }

    /// Resolve the authenticated account's handle
    pub async fn verify_credentials(&self) -> Result<String, BotError> {
        let user: ApiUser = self
            .get_json("/account/verify_credentials.json", &[])
            .await?;
        Ok(user.screen_name)
    }

    /// All curated lists owned by `owner`
    pub async fn lists_all(&self, owner: &str) -> Result<Vec<CuratedList>, BotError> {
        let lists: Vec<ApiList> = self
            .get_json(
                "/lists/list.json",
                &[("screen_name", owner.to_string())],
            )
            .await?;
        lists.into_iter().map(into_curated_list).collect()
    }

    /// Create a private curated list
    pub async fn create_list(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<CuratedList, BotError> {
        let mut form = vec![
            ("name", name.to_string()),
            ("mode", "private".to_string()),
        ];
        if let Some(description) = description.filter(|d| !d.is_empty()) {
            form.push(("description", description.to_string()));
        }
        let list: ApiList = self.post_json("/lists/create.json", &form).await?;
        into_curated_list(list)
    }

    /// Delete a curated list by slug
    pub async fn destroy_list(&self, slug: &str, owner: &str) -> Result<(), BotError> {
        let _: ApiList = self
            .post_json(
                "/lists/destroy.json",
                &[
                    ("slug", slug.to_string()),
                    ("owner_screen_name", owner.to_string()),
                ],
            )
            .await?;
        Ok(())
    }

    pub async fn add_list_member(
        &self,
        slug: &str,
        owner: &str,
        member: &str,
    ) -> Result<(), BotError> {
        let _: ApiList = self
            .post_json(
                "/lists/members/create.json",
                &[
                    ("slug", slug.to_string()),
                    ("owner_screen_name", owner.to_string()),
                    ("screen_name", member.to_string()),
                ],
            )
            .await?;
        Ok(())
    }

    pub async fn remove_list_member(
        &self,
        slug: &str,
        owner: &str,
        member: &str,
    ) -> Result<(), BotError> {
        let _: ApiList = self
            .post_json(
                "/lists/members/destroy.json",
                &[
                    ("slug", slug.to_string()),
                    ("owner_screen_name", owner.to_string()),
                    ("screen_name", member.to_string()),
                ],
            )
            .await?;
        Ok(())
    }

    /// Recent posts from a curated list's timeline
    pub async fn list_timeline(
        &self,
        slug: &str,
        owner: &str,
        count: u32,
        include_reposts: bool,
    ) -> Result<Vec<Status>, BotError> {
        let statuses: Vec<ApiStatus> = self
            .get_json(
                "/lists/statuses.json",
                &[
                    ("slug", slug.to_string()),
                    ("owner_screen_name", owner.to_string()),
                    ("count", count.to_string()),
                    ("include_rts", include_reposts.to_string()),
                    ("include_entities", "true".to_string()),
                ],
            )
            .await?;
        statuses.into_iter().map(into_status).collect()
    }

    /// Recent posts from one user's timeline
    pub async fn user_timeline(&self, handle: &str, count: u32) -> Result<Vec<Status>, BotError> {
        let statuses: Vec<ApiStatus> = self
            .get_json(
                "/statuses/user_timeline.json",
                &[
                    ("screen_name", handle.to_string()),
                    ("count", count.to_string()),
                ],
            )
            .await?;
        statuses.into_iter().map(into_status).collect()
    }

    /// Raw rate-limit status document
    pub async fn rate_limit_status(&self) -> Result<serde_json::Value, BotError> {
        self.get_json("/application/rate_limit_status.json", &[])
            .await
    }

    /// Delete the authenticated user's posts older than `cutoff`.
    ///
    /// Pages through the whole own timeline (200 per page, `max_id`
    /// stepping) until the listing is exhausted. With `dry_run` nothing
    /// is deleted, only counted.
    pub async fn expire_posts(
        &self,
        cutoff: DateTime<Utc>,
        dry_run: bool,
    ) -> Result<ExpireReport, BotError> {
        let mut report = ExpireReport {
            deleted: 0,
            ignored: 0,
        };
        let mut max_id: Option<i64> = None;

        loop {
            let mut query = vec![
                ("count", "200".to_string()),
                ("trim_user", "true".to_string()),
            ];
            if let Some(id) = max_id {
                query.push(("max_id", id.to_string()));
            }
            let statuses: Vec<ApiStatus> = self
                .get_json("/statuses/user_timeline.json", &query)
                .await?;
            let Some(next) = next_max_id(&statuses) else {
                break;
            };

            let (expired, ignored) = split_expired(&statuses, cutoff);
            if !dry_run {
                for id in &expired {
                    let _: serde_json::Value = self
                        .post_json(&format!("/statuses/destroy/{}.json", id), &[])
                        .await?;
                }
            }
            report.deleted += expired.len() as u64;
            report.ignored += ignored;

            max_id = Some(next);
        }
        Ok(report)
    }
}

/// `max_id` for the page after this one; `None` on an exhausted listing.
///
/// The parameter is inclusive, so step one below the oldest id seen.
fn next_max_id(statuses: &[ApiStatus]) -> Option<i64> {
    statuses.iter().map(|s| s.id).min().map(|id| id - 1)
}

/// Partition one timeline page into expired ids and an ignored count
fn split_expired(statuses: &[ApiStatus], cutoff: DateTime<Utc>) -> (Vec<i64>, u64) {
    let mut expired = Vec::new();
    let mut ignored = 0u64;
    for status in statuses {
        let created = status.created_at.as_deref().and_then(parse_created_at);
        match created {
            Some(created) if created < cutoff => expired.push(status.id),
            _ => ignored += 1,
        }
    }
    (expired, ignored)
}

fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, CREATED_AT_FORMAT)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn into_curated_list(list: ApiList) -> Result<CuratedList, BotError> {
    CuratedList::from_parts(list.name, list.member_count.unwrap_or(0), list.description)
        .map_err(BotError::from)
}

fn into_status(status: ApiStatus) -> Result<Status, BotError> {
    let link = status
        .entities
        .as_ref()
        .and_then(|e| e.urls.as_ref())
        .and_then(|urls| urls.first())
        .and_then(|u| u.url.clone());
    let media = status
        .entities
        .as_ref()
        .and_then(|e| e.media.as_ref())
        .and_then(|media| media.first())
        .and_then(|m| m.media_url_https.clone())
        .filter(|m| !m.is_empty());
    let created_at = status.created_at.as_deref().and_then(parse_created_at);

    Status::from_parts(
        status.user.map(|u| u.screen_name),
        status.text,
        status.retweet_count.unwrap_or(0),
        status.favorite_count.unwrap_or(0),
        link,
        media,
        created_at,
    )
    .map_err(BotError::from)
}

/// API wire types
#[derive(Debug, Clone, Deserialize)]
struct ApiUser {
    screen_name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiList {
    name: Option<String>,
    member_count: Option<i64>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiStatus {
    id: i64,
    text: Option<String>,
    user: Option<ApiUser>,
    retweet_count: Option<i64>,
    favorite_count: Option<i64>,
    created_at: Option<String>,
    entities: Option<ApiEntities>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiEntities {
    urls: Option<Vec<ApiUrl>>,
    media: Option<Vec<ApiMedia>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiUrl {
    url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiMedia {
    media_url_https: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_status_payload() {
        let raw = serde_json::json!({
            "id": 1050118621198921700i64,
            "text": "a fairly ordinary post",
            "user": { "screen_name": "someone" },
            "retweet_count": 4,
            "favorite_count": 11,
            "created_at": "Wed Oct 10 20:19:24 +0000 2018",
            "entities": {
                "urls": [{ "url": "https://t.co/abc" }],
                "media": [{ "media_url_https": "https://pbs.example/img.jpg" }]
            }
        });
        let api: ApiStatus = serde_json::from_value(raw).unwrap();
        let status = into_status(api).unwrap();
        assert_eq!(status.author, "someone");
        assert_eq!(status.reposts, 4);
        assert_eq!(status.link.as_deref(), Some("https://t.co/abc"));
        assert!(status.created_at.is_some());
    }

    #[test]
    fn status_without_author_is_malformed() {
        let raw = serde_json::json!({ "id": 1, "text": "orphaned" });
        let api: ApiStatus = serde_json::from_value(raw).unwrap();
        let err = into_status(api).unwrap_err();
        assert!(matches!(err, BotError::Format(_)));
    }

    #[test]
    fn parses_created_at_format() {
        let parsed = parse_created_at("Wed Oct 10 20:19:24 +0000 2018").unwrap();
        assert_eq!(parsed.timestamp(), 1539202764);
    }

    fn timeline_page(entries: &[(i64, &str)]) -> Vec<ApiStatus> {
        entries
            .iter()
            .map(|(id, created_at)| {
                serde_json::from_value(serde_json::json!({
                    "id": id,
                    "created_at": created_at,
                }))
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn expiry_paging_steps_below_the_oldest_id() {
        let page = timeline_page(&[
            (900, "Wed Oct 10 20:19:24 +0000 2018"),
            (700, "Tue Oct 09 20:19:24 +0000 2018"),
            (800, "Wed Oct 10 08:00:00 +0000 2018"),
        ]);
        assert_eq!(next_max_id(&page), Some(699));
        assert_eq!(next_max_id(&[]), None);
    }

    #[test]
    fn expiry_splits_a_page_against_the_cutoff() {
        let cutoff = parse_created_at("Wed Oct 10 00:00:00 +0000 2018").unwrap();
        let page = timeline_page(&[
            (900, "Wed Oct 10 20:19:24 +0000 2018"),
            (800, "Tue Oct 09 20:19:24 +0000 2018"),
            (700, "Mon Oct 08 06:30:00 +0000 2018"),
        ]);
        let (expired, ignored) = split_expired(&page, cutoff);
        assert_eq!(expired, vec![800, 700]);
        assert_eq!(ignored, 1);
    }

    #[test]
    fn unparseable_created_at_is_never_expired() {
        let cutoff = parse_created_at("Wed Oct 10 00:00:00 +0000 2018").unwrap();
        let page = timeline_page(&[(500, "not a date")]);
        let (expired, ignored) = split_expired(&page, cutoff);
        assert!(expired.is_empty());
        assert_eq!(ignored, 1);
    }
}
