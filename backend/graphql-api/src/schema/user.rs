//! User schema and resolvers

use async_graphql::{
    ComplexObject, Context, ErrorExtensions, InputObject, Object, Result as GraphQLResult,
};

use super::content::PostCreateInput;
use super::data_context;
use super::pagination::PageArgs;
use crate::models::{NewUser, Post, User, UserLookup};

#[ComplexObject]
impl User {
    /// Posts authored by this user, published or not
    async fn posts(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<Post>> {
        data_context(ctx)?
            .store()
            .posts_by_author(self.id)
            .await
            .map_err(|e| e.extend())
    }
}

/// Selects a single user by id and/or email
#[derive(InputObject, Clone, Debug, Default)]
pub struct UserUniqueInput {
    pub id: Option<i32>,
    pub email: Option<String>,
}

impl From<UserUniqueInput> for UserLookup {
    fn from(input: UserUniqueInput) -> Self {
        UserLookup {
            id: input.id,
            email: input.email.filter(|email| !email.is_empty()),
        }
    }
}

#[derive(InputObject, Clone, Debug)]
pub struct UserCreateInput {
    pub email: String,
    pub name: Option<String>,
    pub posts: Option<Vec<PostCreateInput>>,
}

impl From<UserCreateInput> for NewUser {
    fn from(input: UserCreateInput) -> Self {
        NewUser {
            email: input.email,
            name: input.name,
            posts: input
                .posts
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    /// Users whose name contains `nameFilter`
    async fn all_users(
        &self,
        ctx: &Context<'_>,
        name_filter: Option<String>,
        skip: Option<i32>,
        take: Option<i32>,
    ) -> GraphQLResult<Vec<User>> {
        let page = PageArgs::new(skip, take).into_page().map_err(|e| e.extend())?;

        data_context(ctx)?
            .store()
            .list_users(name_filter.as_deref(), page)
            .await
            .map_err(|e| e.extend())
    }

    /// Unpublished posts of a user; null when the user does not exist
    async fn drafts_by_user(
        &self,
        ctx: &Context<'_>,
        user_unique_input: UserUniqueInput,
    ) -> GraphQLResult<Option<Vec<Post>>> {
        let lookup = UserLookup::from(user_unique_input);

        data_context(ctx)?
            .store()
            .drafts_by_user(&lookup)
            .await
            .map_err(|e| e.extend())
    }
}

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    /// Create a user together with any initial posts
    async fn signup_user(&self, ctx: &Context<'_>, data: UserCreateInput) -> GraphQLResult<User> {
        let user = data_context(ctx)?
            .store()
            .create_user(data.into())
            .await
            .map_err(|e| e.extend())?;

        tracing::info!(user_id = user.id, "User signed up");
        Ok(user)
    }
}
