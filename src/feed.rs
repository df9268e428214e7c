//! Syndication feed emission.
//!
//! Projects the posts collection into an RSS channel: one item per post
//! with title, publish date, description, and an absolute link derived
//! from the post's route (`<base_url>/posts/<slug>/`).
//!
//! Items are ordered strictly descending by publish date; same-day posts
//! keep their input order (the sort is stable and there is no secondary
//! key). [`build_feed`] performs no I/O — it returns the channel value
//! and the caller decides where the XML goes.

use crate::config::SiteConfig;
use crate::record::Record;
use crate::routes;
use chrono::NaiveDate;
use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};

/// Build the RSS channel for the posts collection.
///
/// Posts are validated upstream, so every record carries a title, date,
/// and description; a record missing any of them is skipped rather than
/// re-validated here.
pub fn build_feed(config: &SiteConfig, posts: &[Record]) -> Channel {
    let mut ordered: Vec<&Record> = posts.iter().collect();
    // Stable sort: same-date posts keep input order.
    ordered.sort_by_key(|post| std::cmp::Reverse(post.date_field("date")));

    let items: Vec<Item> = ordered.iter().filter_map(|post| feed_item(config, post)).collect();

    ChannelBuilder::default()
        .title(config.title.clone())
        .link(config.base_url.clone())
        .description(config.description.clone())
        .language(Some(config.language.clone()))
        .generator(Some("colophon".to_string()))
        .items(items)
        .build()
}

fn feed_item(config: &SiteConfig, post: &Record) -> Option<Item> {
    let title = post.str_field("title")?;
    let date = post.date_field("date")?;
    let description = post.str_field("description")?;

    let link = format!(
        "{}/{}",
        config.base_url,
        routes::route_path(&post.collection, &post.slug)
    );

    Some(
        ItemBuilder::default()
            .title(Some(title.to_string()))
            .link(Some(link.clone()))
            .guid(Some(
                GuidBuilder::default().permalink(true).value(link).build(),
            ))
            .description(Some(description.to_string()))
            .pub_date(Some(rfc2822_midnight(date)?))
            .build(),
    )
}

/// Publish dates are calendar dates; feeds want a timestamp, so posts go
/// out at midnight UTC.
fn rfc2822_midnight(date: NaiveDate) -> Option<String> {
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().to_rfc2822())
}
