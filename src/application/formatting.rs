//! Response formatting - API records rendered as display units
//!
//! Each upstream integration gets one presentation template. Records are
//! explicit schemas validated here at the formatting boundary, so a payload
//! missing a required field becomes a typed [`FormatError::MalformedRecord`]
//! instead of a surprise at render time. Templates are deterministic for the
//! same record, except the footer timestamp, which is decoration.

use chrono::{DateTime, Utc};

use crate::application::errors::FormatError;
use crate::application::messaging::segmenter::segment;
use crate::domain::entities::{Card, DisplayUnit};

pub const TIMELINE_COLOR: u32 = 0x1DA1F2;
pub const BOARDS_COLOR: u32 = 0x00FF00;
pub const WEATHER_COLOR: u32 = 0x27E1DC;

fn footer_stamp() -> String {
    Utc::now().format("%m-%d-%Y %I:%M %p").to_string()
}

// ---------------------------------------------------------------------------
// Record schemas
// ---------------------------------------------------------------------------

/// A link-aggregator post
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub title: String,
    pub url: String,
    pub score: Option<i64>,
}

impl Post {
    pub fn from_parts(
        title: Option<String>,
        url: Option<String>,
        score: Option<i64>,
    ) -> Result<Self, FormatError> {
        let title = title
            .filter(|t| !t.is_empty())
            .ok_or(FormatError::MalformedRecord("title"))?;
        let url = url
            .filter(|u| !u.is_empty())
            .ok_or(FormatError::MalformedRecord("url"))?;
        Ok(Self { title, url, score })
    }
}

/// A nested reply under a link-aggregator post
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub author: String,
    pub body: String,
    pub score: Option<i64>,
}

impl Comment {
    pub fn from_parts(
        author: Option<String>,
        body: Option<String>,
        score: Option<i64>,
    ) -> Result<Self, FormatError> {
        let author = author
            .filter(|a| !a.is_empty())
            .ok_or(FormatError::MalformedRecord("author"))?;
        let body = body
            .filter(|b| !b.is_empty())
            .ok_or(FormatError::MalformedRecord("body"))?;
        Ok(Self { author, body, score })
    }
}

/// One post from a social timeline
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub author: String,
    pub text: String,
    pub reposts: i64,
    pub favorites: i64,
    pub link: Option<String>,
    pub media: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Status {
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        author: Option<String>,
        text: Option<String>,
        reposts: i64,
        favorites: i64,
        link: Option<String>,
        media: Option<String>,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<Self, FormatError> {
        let author = author
            .filter(|a| !a.is_empty())
            .ok_or(FormatError::MalformedRecord("author"))?;
        let text = text.ok_or(FormatError::MalformedRecord("text"))?;
        Ok(Self {
            author,
            text,
            reposts,
            favorites,
            link,
            media,
            created_at,
        })
    }
}

/// A curated list on the social timeline service
#[derive(Debug, Clone, PartialEq)]
pub struct CuratedList {
    pub name: String,
    pub member_count: i64,
    pub description: Option<String>,
}

impl CuratedList {
    pub fn from_parts(
        name: Option<String>,
        member_count: i64,
        description: Option<String>,
    ) -> Result<Self, FormatError> {
        let name = name
            .filter(|n| !n.is_empty())
            .ok_or(FormatError::MalformedRecord("name"))?;
        Ok(Self {
            name,
            member_count,
            description: description.filter(|d| !d.is_empty()),
        })
    }
}

/// One reading of a current-conditions or forecast response
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    pub at: String,
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: i64,
    pub condition: String,
    pub description: Option<String>,
    pub wind: f64,
}

/// City metadata attached to a weather response
#[derive(Debug, Clone, PartialEq)]
pub struct CityInfo {
    pub name: String,
    pub country: Option<String>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub timezone_offset: Option<i64>,
}

impl CityInfo {
    pub fn from_parts(
        name: Option<String>,
        country: Option<String>,
        sunrise: Option<String>,
        sunset: Option<String>,
        timezone_offset: Option<i64>,
    ) -> Result<Self, FormatError> {
        let name = name
            .filter(|n| !n.is_empty())
            .ok_or(FormatError::MalformedRecord("name"))?;
        Ok(Self {
            name,
            country,
            sunrise,
            sunset,
            timezone_offset,
        })
    }
}

/// One day of a regional allergen index
#[derive(Debug, Clone, PartialEq)]
pub struct PollenDay {
    pub label: String,
    pub index: f64,
    pub predominant: Option<String>,
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Emit a card, chunking an over-limit body through the segmenter.
///
/// Continuation cards repeat title/author/color but not the field list.
fn card_with_body(base: Card, body: &str, limit: usize) -> Vec<DisplayUnit> {
    let chunks = segment(body, limit);
    match chunks.len() {
        0 => vec![DisplayUnit::Card(base)],
        1 => {
            let mut card = base;
            card.description = chunks.into_iter().next();
            vec![DisplayUnit::Card(card)]
        }
        _ => {
            let mut units = Vec::with_capacity(chunks.len());
            let mut continuation = Card::new(base.title.clone(), base.color);
            continuation.author = base.author.clone();
            let mut first = Some(base);
            for chunk in chunks {
                let card = match first.take() {
                    Some(mut c) => {
                        c.description = Some(chunk);
                        c
                    }
                    None => continuation.clone().with_description(chunk),
                };
                units.push(DisplayUnit::Card(card));
            }
            units
        }
    }
}

/// Cards for link-aggregator posts, one per record
pub fn format_posts(posts: &[Post], limit: usize) -> Vec<DisplayUnit> {
    posts
        .iter()
        .flat_map(|post| {
            let mut card = Card::new(&post.title, BOARDS_COLOR).with_url(&post.url);
            if let Some(score) = post.score {
                card = card.with_field("Score", score, true);
            }
            card = card.with_footer(footer_stamp());
            card_with_body(card, &post.url, limit)
        })
        .collect()
}

/// Cards for nested comment threads
pub fn format_comments(comments: &[Comment], limit: usize) -> Vec<DisplayUnit> {
    comments
        .iter()
        .flat_map(|comment| {
            let mut card = Card::new(&comment.author, BOARDS_COLOR);
            if let Some(score) = comment.score {
                card = card.with_field("Score", score, true);
            }
            card = card.with_footer(footer_stamp());
            card_with_body(card, &comment.body, limit)
        })
        .collect()
}

/// Cards for timeline posts, one per record
pub fn format_statuses(statuses: &[Status], limit: usize) -> Vec<DisplayUnit> {
    statuses
        .iter()
        .flat_map(|status| {
            let mut card = Card::new(&status.author, TIMELINE_COLOR)
                .with_field("# Reposts", status.reposts, true)
                .with_field("# Favs", status.favorites, true);
            if let Some(ref link) = status.link {
                card = card.with_url(link);
            }
            if let Some(ref media) = status.media {
                card = card.with_image(media);
            }
            if let Some(created) = status.created_at {
                card = card.with_footer(created.format("%m-%d-%Y %I:%M %p").to_string());
            } else {
                card = card.with_footer(footer_stamp());
            }
            card_with_body(card, &status.text, limit)
        })
        .collect()
}

/// Plain-text table of curated lists, segmented to the limit
pub fn format_lists(lists: &[CuratedList], limit: usize) -> Vec<DisplayUnit> {
    let mut out = String::from("Available lists:\n");
    for list in lists {
        out.push_str(&format!("{} | {} members", list.name, list.member_count));
        if let Some(ref desc) = list.description {
            out.push_str(&format!(" | {}", desc));
        }
        out.push('\n');
    }
    segment(&out, limit).into_iter().map(DisplayUnit::Text).collect()
}

fn weather_card(city: &CityInfo, reading: &WeatherReading, limit: usize) -> Vec<DisplayUnit> {
    let mut desc = city.name.clone();
    if let Some(ref country) = city.country {
        desc.push_str(&format!(", {}", country));
    }
    desc.push('\n');
    desc.push_str(&reading.condition);
    if let Some(ref detail) = reading.description {
        desc.push_str(&format!(" with {}", detail));
    }

    let mut card = Card::new(format!("Weather data for: {}", reading.at), WEATHER_COLOR)
        .with_field("Current Temp", reading.temp, true)
        .with_field("Feels Like", reading.feels_like, true)
        .with_field("Humidity", reading.humidity, true)
        .with_field("Temp Min", reading.temp_min, true)
        .with_field("Temp Max", reading.temp_max, true)
        .with_field("Wind Speed", reading.wind, true);
    if let Some(ref sunrise) = city.sunrise {
        card = card.with_field("Sunrise", sunrise, true);
    }
    if let Some(ref sunset) = city.sunset {
        card = card.with_field("Sunset", sunset, true);
    }
    if let Some(offset) = city.timezone_offset {
        card = card.with_field("Timezone", offset, true);
    }
    card = card.with_footer(footer_stamp());
    card_with_body(card, &desc, limit)
}

/// One card for current conditions
pub fn format_current_weather(
    city: &CityInfo,
    reading: &WeatherReading,
    limit: usize,
) -> Vec<DisplayUnit> {
    weather_card(city, reading, limit)
}

/// One card per forecast step, in step order
pub fn format_forecast(
    city: &CityInfo,
    readings: &[WeatherReading],
    limit: usize,
) -> Vec<DisplayUnit> {
    readings
        .iter()
        .flat_map(|reading| weather_card(city, reading, limit))
        .collect()
}

/// One card summarizing the 3-day allergen outlook
pub fn format_pollen(postal_code: &str, days: &[PollenDay]) -> Vec<DisplayUnit> {
    let mut card = Card::new(format!("Allergen outlook for {}", postal_code), WEATHER_COLOR);
    for day in days {
        let value = match day.predominant {
            Some(ref p) => format!("{:.1} ({})", day.index, p),
            None => format!("{:.1}", day.index),
        };
        card = card.with_field(&day.label, value, true);
    }
    card = card.with_footer(footer_stamp());
    vec![DisplayUnit::Card(card)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_posts(n: usize) -> Vec<Post> {
        (0..n)
            .map(|i| Post {
                title: format!("Post {}", i),
                url: format!("https://example.com/{}", i),
                score: Some(i as i64 * 10),
            })
            .collect()
    }

    #[test]
    fn one_card_per_post_with_title() {
        let posts = sample_posts(5);
        let units = format_posts(&posts, 2000);
        assert_eq!(units.len(), 5);
        for (unit, post) in units.iter().zip(&posts) {
            let DisplayUnit::Card(card) = unit else {
                panic!("expected a card")
            };
            assert!(!card.title.is_empty());
            assert_eq!(card.title, post.title);
        }
    }

    #[test]
    fn missing_title_is_a_malformed_record() {
        let err = Post::from_parts(None, Some("https://example.com".into()), None).unwrap_err();
        assert_eq!(err, FormatError::MalformedRecord("title"));

        let err = Post::from_parts(Some(String::new()), Some("u".into()), None).unwrap_err();
        assert_eq!(err, FormatError::MalformedRecord("title"));
    }

    #[test]
    fn formatting_is_deterministic_except_footer() {
        let status = Status {
            author: "someone".into(),
            text: "a short post".into(),
            reposts: 3,
            favorites: 7,
            link: Some("https://example.com".into()),
            media: None,
            created_at: None,
        };
        let a = format_statuses(std::slice::from_ref(&status), 2000);
        let b = format_statuses(std::slice::from_ref(&status), 2000);
        assert_eq!(a.len(), b.len());
        for (ua, ub) in a.iter().zip(&b) {
            let (DisplayUnit::Card(ca), DisplayUnit::Card(cb)) = (ua, ub) else {
                panic!("expected cards")
            };
            assert_eq!(ca.title, cb.title);
            assert_eq!(ca.description, cb.description);
            assert_eq!(ca.fields, cb.fields);
            assert_eq!(ca.url, cb.url);
        }
    }

    #[test]
    fn long_body_is_segmented_with_repeated_title() {
        let status = Status {
            author: "someone".into(),
            text: "y".repeat(4500),
            reposts: 0,
            favorites: 0,
            link: None,
            media: None,
            created_at: None,
        };
        let units = format_statuses(std::slice::from_ref(&status), 2000);
        assert_eq!(units.len(), 3);
        let mut body = String::new();
        for unit in &units {
            let DisplayUnit::Card(card) = unit else {
                panic!("expected a card")
            };
            assert_eq!(card.title, "someone");
            body.push_str(card.description.as_deref().unwrap_or_default());
        }
        assert_eq!(body, status.text);
    }

    #[test]
    fn pollen_outlook_is_one_card() {
        let days = vec![
            PollenDay {
                label: "Today".into(),
                index: 8.2,
                predominant: Some("Ragweed".into()),
            },
            PollenDay {
                label: "Tomorrow".into(),
                index: 6.1,
                predominant: None,
            },
        ];
        let units = format_pollen("97201", &days);
        assert_eq!(units.len(), 1);
        let DisplayUnit::Card(card) = &units[0] else {
            panic!("expected a card")
        };
        assert_eq!(card.fields.len(), 2);
        assert_eq!(card.fields[0].value, "8.2 (Ragweed)");
    }
}
