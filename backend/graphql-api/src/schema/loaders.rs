//! DataLoader implementations for N+1 query prevention
//!
//! Resolving `Post.author` for a list of posts batches every author id
//! into a single `users_by_ids` store call.

use async_graphql::dataloader::Loader;
use std::collections::HashMap;
use std::sync::Arc;

use crate::context::DataContext;
use crate::error::StoreError;
use crate::models::User;

/// User ID loader - batches author lookups
#[derive(Clone)]
pub struct UserIdLoader {
    ctx: DataContext,
}

impl UserIdLoader {
    pub fn new(ctx: DataContext) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl Loader<i32> for UserIdLoader {
    type Value = User;
    type Error = Arc<StoreError>;

    async fn load(&self, keys: &[i32]) -> Result<HashMap<i32, Self::Value>, Self::Error> {
        let users = self.ctx.store().users_by_ids(keys).await.map_err(Arc::new)?;

        Ok(users.into_iter().map(|user| (user.id, user)).collect())
    }
}
