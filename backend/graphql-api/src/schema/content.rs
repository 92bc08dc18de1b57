//! Post and feed schema

use async_graphql::dataloader::DataLoader;
use async_graphql::{
    ComplexObject, Context, Enum, ErrorExtensions, InputObject, Object, Result as GraphQLResult,
};
use tracing::{info, warn};

use super::data_context;
use super::loaders::UserIdLoader;
use super::pagination::PageArgs;
use crate::error::StoreError;
use crate::models::{NewPost, Post, User};
use crate::store::SortDirection;

#[ComplexObject]
impl Post {
    async fn author(&self, ctx: &Context<'_>) -> GraphQLResult<Option<User>> {
        let Some(author_id) = self.author_id else {
            return Ok(None);
        };

        let loader = ctx
            .data::<DataLoader<UserIdLoader>>()
            .map_err(|_| "User loader not available")?;

        loader
            .load_one(author_id)
            .await
            .map_err(|e| e.as_ref().extend())
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(rename_items = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl From<SortOrder> for SortDirection {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => SortDirection::Asc,
            SortOrder::Desc => SortDirection::Desc,
        }
    }
}

#[derive(InputObject, Clone, Copy, Debug)]
pub struct PostOrderByUpdatedAtInput {
    pub updated_at: SortOrder,
}

#[derive(InputObject, Clone, Debug)]
pub struct PostCreateInput {
    pub title: String,
    pub content: Option<String>,
}

impl From<PostCreateInput> for NewPost {
    fn from(input: PostCreateInput) -> Self {
        NewPost {
            title: input.title,
            content: input.content,
        }
    }
}

#[derive(Default)]
pub struct ContentQuery;

#[Object]
impl ContentQuery {
    /// Null when `id` is omitted or no post matches
    async fn post_by_id(&self, ctx: &Context<'_>, id: Option<i32>) -> GraphQLResult<Option<Post>> {
        let Some(id) = id else {
            return Ok(None);
        };

        data_context(ctx)?
            .store()
            .find_post(id)
            .await
            .map_err(|e| e.extend())
    }

    /// Published posts whose title or content contains `searchString`
    async fn feed(
        &self,
        ctx: &Context<'_>,
        search_string: Option<String>,
        skip: Option<i32>,
        take: Option<i32>,
        order_by: Option<PostOrderByUpdatedAtInput>,
    ) -> GraphQLResult<Vec<Post>> {
        let page = PageArgs::new(skip, take).into_page().map_err(|e| e.extend())?;
        let order = order_by.map(|o| SortDirection::from(o.updated_at));

        data_context(ctx)?
            .store()
            .feed(search_string.as_deref(), page, order)
            .await
            .map_err(|e| e.extend())
    }
}

#[derive(Default)]
pub struct ContentMutation;

#[Object]
impl ContentMutation {
    async fn create_draft(
        &self,
        ctx: &Context<'_>,
        data: PostCreateInput,
        author_email: String,
    ) -> GraphQLResult<Option<Post>> {
        let post = data_context(ctx)?
            .store()
            .create_draft(data.into(), &author_email)
            .await
            .map_err(|e| e.extend())?;

        info!(post_id = post.id, "Draft created");
        Ok(Some(post))
    }

    async fn toggle_publish_post(&self, ctx: &Context<'_>, id: i32) -> GraphQLResult<Option<Post>> {
        let store = data_context(ctx)?.store();

        match store.toggle_publish(id).await {
            Ok(post) => Ok(Some(post)),
            Err(e) => {
                // Every failure surfaces as a missing post
                warn!(post_id = id, error = %e, "Toggle publish failed");
                Err(StoreError::not_found("Post", id).extend())
            }
        }
    }

    async fn increment_post_view_count(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> GraphQLResult<Option<Post>> {
        data_context(ctx)?
            .store()
            .increment_view_count(id)
            .await
            .map(Some)
            .map_err(|e| e.extend())
    }

    async fn delete_post(&self, ctx: &Context<'_>, id: i32) -> GraphQLResult<Option<Post>> {
        let post = data_context(ctx)?
            .store()
            .delete_post(id)
            .await
            .map_err(|e| e.extend())?;

        info!(post_id = id, "Post deleted");
        Ok(Some(post))
    }
}
