use super::prelude::*;

#[derive(Default)]
pub struct FilmQueries;

#[Object]
impl FilmQueries {
    /// Get a film by id; the cast is only loaded when selected
    async fn film(&self, ctx: &Context<'_>, id: i64) -> Result<Film> {
        let reader = ctx.data_unchecked::<Arc<FilmReadService>>();
        let include_cast = ctx.look_ahead().field("cast").exists();

        let film = reader
            .find_by_id(id, include_cast)
            .await
            .map_err(|e| e.extend())?;
        Ok(film.into())
    }

    /// Get all films, or those whose title contains `title`
    async fn films(&self, ctx: &Context<'_>, title: Option<String>) -> Result<Vec<Film>> {
        let reader = ctx.data_unchecked::<Arc<FilmReadService>>();
        let criteria: Vec<(String, String)> = title
            .into_iter()
            .map(|t| ("title".to_string(), t))
            .collect();

        let films = reader
            .find(Some(criteria.as_slice()))
            .await
            .map_err(|e| e.extend())?;
        Ok(films.into_iter().map(Film::from).collect())
    }
}
