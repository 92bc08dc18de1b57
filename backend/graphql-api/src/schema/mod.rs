//! GraphQL schema
//!
//! Types are declared with derive macros; this module only assembles them
//! and attaches the per-process data.

pub mod content;
pub mod finance;
pub mod loaders;
pub mod pagination;
pub mod user;

use async_graphql::{
    dataloader::DataLoader, Context, EmptySubscription, MergedObject, Result as GraphQLResult,
    Schema, SchemaBuilder,
};

use crate::config::GraphQLConfig;
use crate::context::DataContext;

/// Root query object
#[derive(MergedObject, Default)]
pub struct QueryRoot(user::UserQuery, content::ContentQuery, finance::FinanceQuery);

/// Root mutation object
#[derive(MergedObject, Default)]
pub struct MutationRoot(user::UserMutation, content::ContentMutation);

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

fn schema_builder() -> SchemaBuilder<QueryRoot, MutationRoot, EmptySubscription> {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
}

/// Build the executable schema around a data context
pub fn build_schema(ctx: DataContext, config: &GraphQLConfig) -> AppSchema {
    let mut builder = schema_builder()
        .data(DataLoader::new(
            loaders::UserIdLoader::new(ctx.clone()),
            tokio::task::spawn,
        ))
        .data(ctx)
        .limit_depth(config.max_depth)
        .limit_complexity(config.max_complexity);

    if !config.introspection {
        builder = builder.disable_introspection();
    }

    builder.finish()
}

/// Schema definition language, produced without any data attached
pub fn schema_sdl() -> String {
    schema_builder().finish().sdl()
}

pub(crate) fn data_context<'ctx>(ctx: &Context<'ctx>) -> GraphQLResult<&'ctx DataContext> {
    ctx.data::<DataContext>()
        .map_err(|_| "Data context not available".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_builds() {
        let schema = build_schema(DataContext::in_memory(), &GraphQLConfig::default());
        assert!(schema.sdl().contains("type Query"));
    }

    #[test]
    fn test_sdl_exposes_full_surface() {
        let sdl = schema_sdl();

        for field in [
            "allUsers(",
            "allTransactions(",
            "allCategories(",
            "allAccounts(",
            "postById(",
            "feed(",
            "draftsByUser(",
            "signupUser(",
            "createDraft(",
            "togglePublishPost(",
            "incrementPostViewCount(",
            "deletePost(",
        ] {
            assert!(sdl.contains(field), "missing {field} in SDL");
        }

        for ty in [
            "type User",
            "type Post",
            "type Account",
            "type Category",
            "type Transaction",
            "input UserCreateInput",
            "input UserUniqueInput",
            "input PostCreateInput",
            "input PostOrderByUpdatedAtInput",
            "enum SortOrder",
            "scalar DateTime",
        ] {
            assert!(sdl.contains(ty), "missing {ty} in SDL");
        }

        assert!(!sdl.contains("authorId"));
    }
}
