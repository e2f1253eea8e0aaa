//! Integration tests for creating, updating and deleting films

mod common;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use common::{decimal, new_film, setup, setup_with_config};
use film_catalog::config::Config;
use film_catalog::db::{Genre, UpdateFilm};
use film_catalog::services::FilmError;

fn update_input(isan: &str) -> UpdateFilm {
    UpdateFilm {
        isan: isan.to_string(),
        rating: 5,
        genre: Some(Genre::Horror),
        price: decimal("12.5"),
        discount: None,
        available: true,
        release_date: None,
        homepage: None,
        keywords: None,
    }
}

#[tokio::test]
async fn test_create_persists_film_title_and_cast() {
    let mut ctx = setup().await;
    let input = new_film("978-0-007-00644-1", "Titlepost");

    let id = ctx.state.writer.create(input.clone()).await.unwrap();
    let film = ctx.state.reader.find_by_id(id, true).await.unwrap();

    assert_eq!(film.version, 0);
    assert_eq!(film.isan, input.isan);
    assert_eq!(film.rating, input.rating);
    assert_eq!(film.genre, input.genre);
    assert_eq!(film.price, input.price);
    assert_eq!(film.discount, input.discount);
    assert_eq!(film.available, input.available);
    assert_eq!(film.release_date, input.release_date);
    assert_eq!(film.homepage, input.homepage);
    assert_eq!(film.keywords.len(), 2);
    assert_eq!(film.title.title, "Titlepost");
    assert_eq!(film.cast.unwrap().len(), 1);

    let mail = ctx.next_mail().await.expect("notification mail");
    assert_eq!(mail.subject, format!("New film {}", id));
    assert!(mail.body.contains("Titlepost"));
}

#[tokio::test]
async fn test_create_sends_no_mail_when_disabled() {
    let config = Config {
        mail_enabled: false,
        ..Config::default()
    };
    let mut ctx = setup_with_config(&config).await;

    let id = ctx
        .state
        .writer
        .create(new_film("978-0-007-00644-1", "Quiet"))
        .await
        .unwrap();

    assert!(ctx.state.reader.find_by_id(id, false).await.is_ok());
    assert!(ctx.next_mail().await.is_none());
}

#[tokio::test]
async fn test_create_with_existing_isan_is_rejected() {
    let mut ctx = setup().await;
    let input = new_film("978-3-897-22583-1", "Another");

    let result = ctx.state.writer.create(input).await;
    assert_matches!(result, Err(FilmError::DuplicateCode(isan)) if isan == "978-3-897-22583-1");

    assert_eq!(ctx.state.reader.find(None).await.unwrap().len(), 4);
    assert!(ctx.next_mail().await.is_none());
}

#[tokio::test]
async fn test_create_with_existing_title_is_rolled_back() {
    let ctx = setup().await;
    let input = new_film("978-0-007-00644-1", "Alpha");

    let result = ctx.state.writer.create(input).await;
    assert_matches!(result, Err(FilmError::TitleExists(title)) if title == "Alpha");

    // The film row inserted before the title failed must be gone as well
    assert_eq!(ctx.state.reader.find(None).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_create_with_invalid_input() {
    let ctx = setup().await;
    let mut input = new_film("falsche-isan", "Titlepost");
    input.rating = -1;

    let result = ctx.state.writer.create(input).await;
    assert_matches!(result, Err(FilmError::Validation(messages)) if messages.len() == 2);
}

#[tokio::test]
async fn test_update_without_token() {
    let ctx = setup().await;
    let id = ctx.ids[0];

    let result = ctx
        .state
        .writer
        .update(id, update_input("978-3-897-22583-1"), None)
        .await;
    assert_matches!(result, Err(FilmError::VersionMissing));

    let film = ctx.state.reader.find_by_id(id, false).await.unwrap();
    assert_eq!(film.version, 0);
    assert_eq!(film.rating, 4);
}

#[tokio::test]
async fn test_update_with_invalid_token() {
    let ctx = setup().await;
    let result = ctx
        .state
        .writer
        .update(ctx.ids[0], update_input("978-3-897-22583-1"), Some("\"abc\""))
        .await;
    assert_matches!(result, Err(FilmError::VersionInvalid(token)) if token == "\"abc\"");
}

#[tokio::test]
async fn test_update_version_sequence() {
    let ctx = setup().await;
    let writer = &ctx.state.writer;
    let id = ctx.ids[0];
    let isan = "978-3-897-22583-1";

    assert_eq!(writer.update(id, update_input(isan), Some("\"0\"")).await.unwrap(), 1);
    assert_eq!(writer.update(id, update_input(isan), Some("\"1\"")).await.unwrap(), 2);

    // persisted version is now 2
    let outdated = writer.update(id, update_input(isan), Some("\"1\"")).await;
    assert_matches!(outdated, Err(FilmError::VersionOutdated(1)));

    assert_eq!(writer.update(id, update_input(isan), Some("\"2\"")).await.unwrap(), 3);

    let film = ctx.state.reader.find_by_id(id, false).await.unwrap();
    assert_eq!(film.version, 3);
}

#[tokio::test]
async fn test_update_accepts_newer_token() {
    let ctx = setup().await;
    let version = ctx
        .state
        .writer
        .update(ctx.ids[0], update_input("978-3-897-22583-1"), Some("\"7\""))
        .await
        .unwrap();
    assert_eq!(version, 1);
}

#[tokio::test]
async fn test_update_merges_scalars() {
    let ctx = setup().await;
    let id = ctx.ids[0];

    ctx.state
        .writer
        .update(id, update_input("978-3-897-22583-1"), Some("\"0\""))
        .await
        .unwrap();

    let film = ctx.state.reader.find_by_id(id, true).await.unwrap();
    assert_eq!(film.rating, 5);
    assert_eq!(film.genre, Some(Genre::Horror));
    assert_eq!(film.price, decimal("12.5"));
    // absent optionals keep their persisted values
    assert_eq!(film.discount, Some(decimal("0.011")));
    assert_eq!(film.homepage.as_deref(), Some("https://post.rest/"));
    assert!(film.keywords.contains("JAVASCRIPT"));
    // title and cast are untouched
    assert_eq!(film.title.title, "Alpha");
    assert_eq!(film.cast.unwrap().len(), 1);
    assert!(film.updated_at >= film.created_at);
}

#[tokio::test]
async fn test_update_to_existing_isan_is_a_conflict() {
    let ctx = setup().await;
    let id = ctx.ids[0];

    // Beta's ISAN
    let result = ctx
        .state
        .writer
        .update(id, update_input("978-0-201-63361-0"), Some("\"0\""))
        .await;
    assert_matches!(result, Err(FilmError::DuplicateCode(isan)) if isan == "978-0-201-63361-0");

    let film = ctx.state.reader.find_by_id(id, false).await.unwrap();
    assert_eq!(film.version, 0);
    assert_eq!(film.isan, "978-3-897-22583-1");
}

#[tokio::test]
async fn test_stale_film_is_not_written_after_concurrent_update() {
    let ctx = setup().await;
    let id = ctx.ids[0];
    let stale = ctx.state.reader.find_by_id(id, false).await.unwrap();

    ctx.state
        .writer
        .update(id, update_input("978-3-897-22583-1"), Some("\"0\""))
        .await
        .unwrap();

    assert_eq!(ctx.state.db.films().update(&stale).await.unwrap(), None);

    let film = ctx.state.reader.find_by_id(id, false).await.unwrap();
    assert_eq!(film.version, 1);
    assert_eq!(film.rating, 5);
}

#[tokio::test]
async fn test_concurrent_updates_with_same_token() {
    let ctx = setup().await;
    let writer = &ctx.state.writer;
    let id = ctx.ids[0];
    let isan = "978-3-897-22583-1";

    let (first, second) = tokio::join!(
        writer.update(id, update_input(isan), Some("\"0\"")),
        writer.update(id, update_input(isan), Some("\"0\"")),
    );

    let mut results = [first, second];
    results.sort_by_key(|r| r.is_err());
    assert_matches!(results[0], Ok(1));
    assert_matches!(results[1], Err(FilmError::VersionOutdated(0)));

    let film = ctx.state.reader.find_by_id(id, false).await.unwrap();
    assert_eq!(film.version, 1);
}

#[tokio::test]
async fn test_update_missing_film() {
    let ctx = setup().await;
    let result = ctx
        .state
        .writer
        .update(999, update_input("978-3-897-22583-1"), Some("\"0\""))
        .await;
    assert_matches!(result, Err(FilmError::NotFound(_)));
}

#[tokio::test]
async fn test_update_with_invalid_input() {
    let ctx = setup().await;
    let mut input = update_input("978-3-897-22583-1");
    input.price = decimal("-1");

    let result = ctx.state.writer.update(ctx.ids[0], input, Some("\"0\"")).await;
    assert_matches!(result, Err(FilmError::Validation(_)));
}

#[tokio::test]
async fn test_delete_removes_film_title_and_cast() {
    let ctx = setup().await;
    let id = ctx.ids[2];

    assert_eq!(ctx.state.db.films().count_children(id).await.unwrap(), (1, 2));
    assert!(ctx.state.writer.delete(id).await.unwrap());

    assert_eq!(ctx.state.db.films().count_children(id).await.unwrap(), (0, 0));
    assert_matches!(
        ctx.state.reader.find_by_id(id, false).await,
        Err(FilmError::NotFound(_))
    );
    assert_eq!(ctx.state.reader.find(None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_delete_missing_film() {
    let ctx = setup().await;
    let result = ctx.state.writer.delete(999).await;
    assert_matches!(result, Err(FilmError::NotFound(_)));
}
