//! GraphQL object and input types

use async_graphql::{ComplexObject, InputObject, SimpleObject};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::db::films::{DISCOUNT_SCALE, PRICE_SCALE};
use crate::db::sqlite_helpers::{decimal_to_f64, f64_to_decimal};
use crate::db::{self, Genre};

#[derive(Debug, Clone, SimpleObject)]
pub struct Title {
    pub title: String,
    pub subtitle: Option<String>,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct CastMember {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Film {
    pub id: i64,
    pub version: i64,
    pub isan: String,
    pub rating: i32,
    pub genre: Option<Genre>,
    pub price: f64,
    #[graphql(skip)]
    pub discount: Option<Decimal>,
    pub available: bool,
    pub release_date: Option<NaiveDate>,
    pub homepage: Option<String>,
    pub keywords: Vec<String>,
    pub title: Title,
    /// Only loaded when selected on a single film
    pub cast: Option<Vec<CastMember>>,
}

#[ComplexObject]
impl Film {
    /// Discount as a percentage, e.g. "12.30 %" or "12.30 percent"
    async fn discount(&self, #[graphql(default = true)] short: bool) -> Option<String> {
        self.discount.map(|d| format_discount(d, short))
    }
}

pub fn format_discount(discount: Decimal, short: bool) -> String {
    let percent = (discount * Decimal::ONE_HUNDRED).round_dp(2);
    let unit = if short { "%" } else { "percent" };
    format!("{:.2} {}", percent, unit)
}

impl From<db::Film> for Film {
    fn from(film: db::Film) -> Self {
        Self {
            id: film.id,
            version: film.version,
            isan: film.isan,
            rating: film.rating,
            genre: film.genre,
            price: decimal_to_f64(film.price),
            discount: film.discount,
            available: film.available,
            release_date: film.release_date,
            homepage: film.homepage,
            keywords: film.keywords.into_iter().collect(),
            title: Title {
                title: film.title.title,
                subtitle: film.title.subtitle,
            },
            cast: film.cast.map(|cast| {
                cast.into_iter()
                    .map(|m| CastMember {
                        first_name: m.first_name,
                        last_name: m.last_name,
                    })
                    .collect()
            }),
        }
    }
}

#[derive(Debug, Clone, InputObject)]
pub struct TitleInput {
    pub title: String,
    pub subtitle: Option<String>,
}

#[derive(Debug, Clone, InputObject)]
pub struct CastMemberInput {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, InputObject)]
pub struct FilmInput {
    pub isan: String,
    pub rating: i32,
    pub genre: Option<Genre>,
    pub price: f64,
    pub discount: Option<f64>,
    pub available: bool,
    pub release_date: Option<NaiveDate>,
    pub homepage: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub title: TitleInput,
    pub cast: Option<Vec<CastMemberInput>>,
}

impl From<FilmInput> for db::CreateFilm {
    fn from(input: FilmInput) -> Self {
        Self {
            isan: input.isan,
            rating: input.rating,
            genre: input.genre,
            price: f64_to_decimal(input.price, PRICE_SCALE),
            discount: input.discount.map(|d| f64_to_decimal(d, DISCOUNT_SCALE)),
            available: input.available,
            release_date: input.release_date,
            homepage: input.homepage,
            keywords: input.keywords.unwrap_or_default(),
            title: db::NewTitle {
                title: input.title.title,
                subtitle: input.title.subtitle,
            },
            cast: input
                .cast
                .unwrap_or_default()
                .into_iter()
                .map(|m| db::NewCastMember {
                    first_name: m.first_name,
                    last_name: m.last_name,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, InputObject)]
pub struct FilmUpdateInput {
    pub id: i64,
    /// Version the client last saw
    pub version: i64,
    pub isan: String,
    pub rating: i32,
    pub genre: Option<Genre>,
    pub price: f64,
    pub discount: Option<f64>,
    pub available: bool,
    pub release_date: Option<NaiveDate>,
    pub homepage: Option<String>,
    pub keywords: Option<Vec<String>>,
}

impl FilmUpdateInput {
    /// Split into film id, version and the scalar update
    pub fn into_parts(self) -> (i64, i64, db::UpdateFilm) {
        let update = db::UpdateFilm {
            isan: self.isan,
            rating: self.rating,
            genre: self.genre,
            price: f64_to_decimal(self.price, PRICE_SCALE),
            discount: self.discount.map(|d| f64_to_decimal(d, DISCOUNT_SCALE)),
            available: self.available,
            release_date: self.release_date,
            homepage: self.homepage,
            keywords: self.keywords,
        };
        (self.id, self.version, update)
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct CreatePayload {
    pub id: i64,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct UpdatePayload {
    pub version: i64,
}
