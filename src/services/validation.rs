//! Input constraints for film writes
//!
//! Every violated constraint is reported, not only the first one.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use super::error::FilmError;
use crate::db::{CreateFilm, NewCastMember, NewTitle, UpdateFilm};

pub const MAX_RATING: i32 = 5;
pub const MAX_TITLE_LEN: usize = 40;
pub const MAX_NAME_LEN: usize = 32;

static ISAN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:[\da-f]{4}-){4}[\da-z](?:-(?:[\da-f]{4}-){2}[\da-z])?|\d{3}-\d-\d{3}-\d{5}-\d)$")
        .expect("valid ISAN regex")
});

static TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w").expect("valid title regex"));

#[derive(Default)]
struct Violations(Vec<String>);

impl Violations {
    fn check(&mut self, ok: bool, message: impl FnOnce() -> String) {
        if !ok {
            self.0.push(message());
        }
    }

    fn into_result(self) -> Result<(), FilmError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(FilmError::Validation(self.0))
        }
    }
}

/// Attributes shared by create and update input
struct Scalars<'a> {
    isan: &'a str,
    rating: i32,
    price: Decimal,
    discount: Option<Decimal>,
    homepage: Option<&'a str>,
    keywords: Option<&'a [String]>,
}

fn check_scalars(v: &mut Violations, s: Scalars<'_>) {
    v.check(ISAN_RE.is_match(s.isan), || {
        format!("isan: '{}' is not a valid ISAN", s.isan)
    });
    v.check((0..=MAX_RATING).contains(&s.rating), || {
        format!("rating: must be between 0 and {}", MAX_RATING)
    });
    v.check(s.price > Decimal::ZERO, || "price: must be positive".to_string());
    if let Some(discount) = s.discount {
        v.check(discount >= Decimal::ZERO && discount <= Decimal::ONE, || {
            "discount: must be between 0 and 1".to_string()
        });
    }
    if let Some(homepage) = s.homepage {
        v.check(url::Url::parse(homepage).is_ok(), || {
            format!("homepage: '{}' is not a valid URL", homepage)
        });
    }
    if let Some(keywords) = s.keywords {
        let mut seen = HashSet::new();
        let unique = keywords.iter().all(|k| seen.insert(k));
        v.check(unique, || "keywords: must be unique".to_string());
    }
}

fn check_title(v: &mut Violations, title: &NewTitle) {
    v.check(TITLE_RE.is_match(&title.title), || {
        "title: must start with a letter or digit".to_string()
    });
    v.check(title.title.chars().count() <= MAX_TITLE_LEN, || {
        format!("title: at most {} characters", MAX_TITLE_LEN)
    });
    if let Some(subtitle) = &title.subtitle {
        v.check(subtitle.chars().count() <= MAX_TITLE_LEN, || {
            format!("subtitle: at most {} characters", MAX_TITLE_LEN)
        });
    }
}

fn check_cast(v: &mut Violations, cast: &[NewCastMember]) {
    for (i, member) in cast.iter().enumerate() {
        v.check(member.first_name.chars().count() <= MAX_NAME_LEN, || {
            format!("cast[{}].first_name: at most {} characters", i, MAX_NAME_LEN)
        });
        v.check(member.last_name.chars().count() <= MAX_NAME_LEN, || {
            format!("cast[{}].last_name: at most {} characters", i, MAX_NAME_LEN)
        });
    }
}

pub fn validate_create(input: &CreateFilm) -> Result<(), FilmError> {
    let mut v = Violations::default();
    check_scalars(
        &mut v,
        Scalars {
            isan: &input.isan,
            rating: input.rating,
            price: input.price,
            discount: input.discount,
            homepage: input.homepage.as_deref(),
            keywords: Some(&input.keywords),
        },
    );
    check_title(&mut v, &input.title);
    check_cast(&mut v, &input.cast);
    v.into_result()
}

pub fn validate_update(input: &UpdateFilm) -> Result<(), FilmError> {
    let mut v = Violations::default();
    check_scalars(
        &mut v,
        Scalars {
            isan: &input.isan,
            rating: input.rating,
            price: input.price,
            discount: input.discount,
            homepage: input.homepage.as_deref(),
            keywords: input.keywords.as_deref(),
        },
    );
    v.into_result()
}
