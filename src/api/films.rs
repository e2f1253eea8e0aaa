//! REST endpoints for films
//!
//! Single films are returned as HAL documents with an `ETag` carrying the version.
//! Updates must send that ETag back in `If-Match`.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::AppState;
use crate::db::{CreateFilm, Film, Genre, UpdateFilm};
use crate::services::{FilmError, VersionToken};

const HAL_JSON: &str = "application/hal+json";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rest", get(list_films).post(create_film))
        .route(
            "/rest/{id}",
            get(get_film).put(update_film).delete(delete_film),
        )
}

#[derive(Debug, Serialize)]
pub struct Link {
    pub href: String,
}

#[derive(Debug, Serialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: Link,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<Link>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add: Option<Link>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<Link>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Link>,
}

impl Links {
    fn full(base: &str, id: i64) -> Self {
        let href = format!("{}/{}", base, id);
        Self {
            self_link: Link { href: href.clone() },
            list: Some(Link {
                href: base.to_string(),
            }),
            add: Some(Link {
                href: base.to_string(),
            }),
            update: Some(Link { href: href.clone() }),
            delete: Some(Link { href }),
        }
    }

    fn self_only(base: &str, id: i64) -> Self {
        Self {
            self_link: Link {
                href: format!("{}/{}", base, id),
            },
            list: None,
            add: None,
            update: None,
            delete: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TitleModel {
    pub title: String,
    pub subtitle: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CastMemberModel {
    pub first_name: String,
    pub last_name: String,
}

/// HAL representation of a film
#[derive(Debug, Serialize)]
pub struct FilmModel {
    pub isan: String,
    pub rating: i32,
    pub genre: Option<Genre>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub discount: Option<Decimal>,
    pub available: bool,
    pub release_date: Option<NaiveDate>,
    pub homepage: Option<String>,
    pub keywords: Vec<String>,
    pub title: TitleModel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cast: Option<Vec<CastMemberModel>>,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl FilmModel {
    fn new(film: Film, links: Links) -> Self {
        Self {
            isan: film.isan,
            rating: film.rating,
            genre: film.genre,
            price: film.price,
            discount: film.discount,
            available: film.available,
            release_date: film.release_date,
            homepage: film.homepage,
            keywords: film.keywords.into_iter().collect(),
            title: TitleModel {
                title: film.title.title,
                subtitle: film.title.subtitle,
            },
            cast: film.cast.map(|cast| {
                cast.into_iter()
                    .map(|m| CastMemberModel {
                        first_name: m.first_name,
                        last_name: m.last_name,
                    })
                    .collect()
            }),
            links,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FilmsEmbedded {
    pub films: Vec<FilmModel>,
}

#[derive(Debug, Serialize)]
pub struct FilmsModel {
    #[serde(rename = "_embedded")]
    pub embedded: FilmsEmbedded,
}

/// Base URL of the film resources as seen by the client
fn base_url(headers: &HeaderMap) -> String {
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{}://{}/rest", proto, host)
}

/// Ids are positive integers; anything else cannot name a film
fn parse_id(raw: &str) -> Result<i64, FilmError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| FilmError::NotFound(format!("no film found with id {}", raw)))
}

fn header_str<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

async fn get_film(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, FilmError> {
    let id = parse_id(&id)?;
    let film = state.reader.find_by_id(id, false).await?;
    let etag = VersionToken(film.version).to_string();

    if header_str(&headers, header::IF_NONE_MATCH) == Some(etag.as_str()) {
        debug!(film_id = id, "Film not modified");
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
    }

    let model = FilmModel::new(film, Links::full(&base_url(&headers), id));
    Ok((
        [(header::CONTENT_TYPE, HAL_JSON.to_string()), (header::ETAG, etag)],
        Json(model),
    )
        .into_response())
}

async fn list_films(
    State(state): State<AppState>,
    Query(criteria): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Result<Response, FilmError> {
    let films = state.reader.find(Some(criteria.as_slice())).await?;
    let base = base_url(&headers);

    let films = films
        .into_iter()
        .map(|film| {
            let links = Links::self_only(&base, film.id);
            FilmModel::new(film, links)
        })
        .collect();

    Ok((
        [(header::CONTENT_TYPE, HAL_JSON)],
        Json(FilmsModel {
            embedded: FilmsEmbedded { films },
        }),
    )
        .into_response())
}

async fn create_film(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreateFilm>,
) -> Result<Response, FilmError> {
    let id = state.writer.create(input).await?;
    let location = format!("{}/{}", base_url(&headers), id);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)]).into_response())
}

async fn update_film(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(input): Json<UpdateFilm>,
) -> Result<Response, FilmError> {
    let id = parse_id(&id)?;
    let if_match = header_str(&headers, header::IF_MATCH);
    let version = state.writer.update(id, input, if_match).await?;

    Ok((
        StatusCode::NO_CONTENT,
        [(header::ETAG, VersionToken(version).to_string())],
    )
        .into_response())
}

async fn delete_film(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, FilmError> {
    let id = parse_id(&id)?;
    state.writer.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_matches!(parse_id("abc"), Err(FilmError::NotFound(_)));
        assert_matches!(parse_id("0"), Err(FilmError::NotFound(_)));
        assert_matches!(parse_id("-1"), Err(FilmError::NotFound(_)));
    }

    #[test]
    fn test_base_url_honors_forwarded_proto() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "films.acme.test".parse().unwrap());
        assert_eq!(base_url(&headers), "http://films.acme.test/rest");

        headers.insert("x-forwarded-proto", "https".parse().unwrap());
        assert_eq!(base_url(&headers), "https://films.acme.test/rest");
    }

    #[test]
    fn test_list_links_only_self() {
        let json = serde_json::to_value(Links::self_only("http://localhost/rest", 3)).unwrap();
        assert_eq!(json["self"]["href"], "http://localhost/rest/3");
        assert!(json.get("list").is_none());
    }
}
