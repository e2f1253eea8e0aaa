use super::prelude::*;

#[derive(Default)]
pub struct FilmMutations;

#[Object]
impl FilmMutations {
    /// Create a film with its title and cast
    async fn create(&self, ctx: &Context<'_>, input: FilmInput) -> Result<CreatePayload> {
        let writer = ctx.data_unchecked::<Arc<FilmWriteService>>();
        let id = writer
            .create(input.into())
            .await
            .map_err(|e| e.extend())?;
        Ok(CreatePayload { id })
    }

    /// Update the scalar fields of a film; `version` must not be older than the stored one
    async fn update(&self, ctx: &Context<'_>, input: FilmUpdateInput) -> Result<UpdatePayload> {
        let writer = ctx.data_unchecked::<Arc<FilmWriteService>>();
        let (id, version, update) = input.into_parts();
        let token = VersionToken(version).to_string();

        let version = writer
            .update(id, update, Some(&token))
            .await
            .map_err(|e| e.extend())?;
        Ok(UpdatePayload { version })
    }

    /// Delete a film; true if it was removed
    async fn delete(&self, ctx: &Context<'_>, id: i64) -> Result<bool> {
        let writer = ctx.data_unchecked::<Arc<FilmWriteService>>();
        writer.delete(id).await.map_err(|e| e.extend())
    }
}
