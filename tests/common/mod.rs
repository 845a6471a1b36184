#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use showtimes_scraper::app::ports::{FetchTimeouts, PageFetcher, RawPage};
use showtimes_scraper::config::Config;
use showtimes_scraper::error::FetchError;
use std::collections::HashMap;
use std::sync::Mutex;

pub const BASE_URL: &str = "https://listing.test/cines/ciudades-1/";
pub const VENUE_URL_BASE: &str = "https://listing.test/cines/cine/";

/// Serves canned pages by exact URL and records every request in order.
/// Unscripted URLs answer 404.
#[derive(Default)]
pub struct ScriptedFetcher {
    pages: HashMap<String, Result<String, FetchError>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), Ok(html.into()));
        self
    }

    pub fn failing(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        let err = FetchError::Network {
            url: url.clone(),
            message: "connection reset".into(),
        };
        self.pages.insert(url, Err(err));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, _timeouts: FetchTimeouts) -> Result<RawPage, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(Ok(html)) => Ok(RawPage {
                url: url.to_string(),
                status: 200,
                body: html.clone(),
            }),
            Some(Err(e)) => Err(e.clone()),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.source.base_url = BASE_URL.to_string();
    config.source.venue_url_base = VENUE_URL_BASE.to_string();
    config.enrichment.concurrency = 3;
    config
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

pub fn listing_page(cards: &[String], last_page: Option<u32>) -> String {
    let pagination = match last_page {
        Some(n) => {
            let buttons: String = (2..=n)
                .map(|p| format!(r#"<a class="button button-md" href="?page={p}">{p}</a>"#))
                .collect();
            format!(
                r#"<div class="pagination-item-holder"><span class="button button-md active">1</span>{buttons}</div>"#
            )
        }
        None => String::new(),
    };
    format!("<html><body><section>{}</section>{}</body></html>", cards.concat(), pagination)
}

pub fn venue_card(name: &str, data_theater: Option<&str>) -> String {
    let anchor = data_theater
        .map(|attr| format!(r#"<span class="add-theater-anchor" data-theater="{attr}"></span>"#))
        .unwrap_or_default();
    format!(
        r#"<div class="theater-card hred cf card-thumb-large">
             <h3 class="title">{name}</h3>
             <address class="address">{name} 1, Madrid</address>
             <div class="screen-number">4 salas</div>
             {anchor}
           </div>"#
    )
}

pub fn movie_card(id: &str, title: &str, times: &[&str]) -> String {
    let blocks: String = times
        .iter()
        .map(|t| {
            format!(
                r#"<div class="showtimes-hour-block"><span class="showtimes-hour-item-value">{t}</span></div>"#
            )
        })
        .collect();
    format!(
        r#"<div class="card entity-card entity-card-list movie-card-theater cf hred">
             <a class="meta-title-link" href="/peliculas/pelicula-{id}/">{title}</a>
             <div class="meta-body-item meta-body-direction">De <span class="dark-grey-link">Director {id}</span></div>
             <div class="meta-body-item meta-body-actor">Con <span class="dark-grey-link">Actor {id}</span></div>
             <div class="synopsis"><div class="content-txt">About {title}</div></div>
             <div class="showtimes-anchor">{blocks}</div>
           </div>"#
    )
}

pub fn day_page(cards: &[String]) -> String {
    format!("<html><body>{}</body></html>", cards.concat())
}

pub fn day_url(venue_id: &str, date: NaiveDate) -> String {
    format!("{VENUE_URL_BASE}{venue_id}/#shwt_date={}", date.format("%Y-%m-%d"))
}
