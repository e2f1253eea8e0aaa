//! Shared setup for the integration tests

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::mpsc;

use film_catalog::AppState;
use film_catalog::config::Config;
use film_catalog::db::{CreateFilm, Database, Genre, NewCastMember, NewTitle};
use film_catalog::services::{MailMessage, Mailer};

/// Forwards every sent message to a channel
pub struct RecordingMailer {
    tx: mpsc::UnboundedSender<MailMessage>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        self.tx.send(message.clone())?;
        Ok(())
    }
}

pub struct TestContext {
    pub state: AppState,
    pub mail_rx: mpsc::UnboundedReceiver<MailMessage>,
    /// Ids of the seeded films: Alpha, Beta, Gamma, Delta
    pub ids: Vec<i64>,
}

impl TestContext {
    pub async fn next_mail(&mut self) -> Option<MailMessage> {
        tokio::time::timeout(std::time::Duration::from_secs(2), self.mail_rx.recv())
            .await
            .ok()
            .flatten()
    }
}

pub fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn new_film(isan: &str, title: &str) -> CreateFilm {
    CreateFilm {
        isan: isan.to_string(),
        rating: 1,
        genre: Some(Genre::ScienceFiction),
        price: decimal("99.99"),
        discount: Some(decimal("0.123")),
        available: true,
        release_date: NaiveDate::from_ymd_opt(2022, 2, 28),
        homepage: Some("https://post.rest/".to_string()),
        keywords: vec!["JAVASCRIPT".to_string(), "TYPESCRIPT".to_string()],
        title: NewTitle {
            title: title.to_string(),
            subtitle: Some("subtitlepost".to_string()),
        },
        cast: vec![NewCastMember {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        }],
    }
}

fn seed_films() -> Vec<CreateFilm> {
    let mut alpha = new_film("978-3-897-22583-1", "Alpha");
    alpha.rating = 4;
    alpha.genre = Some(Genre::Action);
    alpha.price = decimal("11.1");
    alpha.discount = Some(decimal("0.011"));
    alpha.keywords = vec!["JAVASCRIPT".to_string()];

    let mut beta = new_film("978-0-201-63361-0", "Beta");
    beta.rating = 2;
    beta.genre = Some(Genre::Fantasy);
    beta.price = decimal("22.2");
    beta.discount = Some(decimal("0.022"));
    beta.available = false;
    beta.keywords = vec!["TYPESCRIPT".to_string()];
    beta.cast = vec![];

    let mut gamma = new_film("978-0-007-09732-6", "Gamma");
    gamma.rating = 1;
    gamma.genre = Some(Genre::Action);
    gamma.price = decimal("33.3");
    gamma.discount = None;
    gamma.cast.push(NewCastMember {
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
    });

    let mut delta = new_film("978-1-234-56789-7", "Delta");
    delta.rating = 3;
    delta.genre = None;
    delta.price = decimal("44.4");
    delta.keywords = vec![];

    vec![alpha, beta, gamma, delta]
}

/// In-memory database with schema and four seeded films
pub async fn setup() -> TestContext {
    setup_with_config(&Config::default()).await
}

pub async fn setup_with_config(config: &Config) -> TestContext {
    let db = Database::in_memory().await.unwrap();
    db.sync_schema().await.unwrap();

    let mut ids = Vec::new();
    for film in seed_films() {
        ids.push(db.films().insert(&film).await.unwrap());
    }

    let (tx, mail_rx) = mpsc::unbounded_channel();
    let state = AppState::new(config, db, Arc::new(RecordingMailer { tx }));

    TestContext {
        state,
        mail_rx,
        ids,
    }
}

pub fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
