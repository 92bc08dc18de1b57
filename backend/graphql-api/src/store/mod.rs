//! Store boundary
//!
//! Resolvers only talk to [`Store`]; the Postgres backend is used in
//! production and the in-memory backend in tests and local development.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{Account, Category, NewPost, NewUser, Post, Transaction, User, UserLookup};

/// Offset/limit window applied after filtering
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    /// `None` means no limit
    pub take: Option<i64>,
}

impl Page {
    pub fn new(skip: i64, take: Option<i64>) -> Self {
        Self { skip, take }
    }

    /// Apply the window to rows already in result order
    pub fn slice<T>(&self, rows: impl Iterator<Item = T>) -> Vec<T> {
        let rows = rows.skip(self.skip.max(0) as usize);
        match self.take {
            Some(take) => rows.take(take.max(0) as usize).collect(),
            None => rows.collect(),
        }
    }
}

/// Sort direction for the feed's `updatedAt` ordering
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Text filter treated as absent when empty
pub(crate) fn non_empty(filter: Option<&str>) -> Option<&str> {
    filter.filter(|f| !f.is_empty())
}

/// Data-access operations used by the resolvers and seed programs
///
/// List operations return rows in primary key order unless an explicit
/// ordering is requested.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_users(&self, name_filter: Option<&str>, page: Page) -> StoreResult<Vec<User>>;

    /// Substring match on `accountId`, `reference` or `category`
    async fn list_transactions(
        &self,
        search: Option<&str>,
        page: Page,
    ) -> StoreResult<Vec<Transaction>>;

    async fn list_categories(&self, page: Page) -> StoreResult<Vec<Category>>;

    async fn list_accounts(&self, page: Page) -> StoreResult<Vec<Account>>;

    async fn find_post(&self, id: i32) -> StoreResult<Option<Post>>;

    /// Published posts whose title or content contains `search`
    async fn feed(
        &self,
        search: Option<&str>,
        page: Page,
        order: Option<SortDirection>,
    ) -> StoreResult<Vec<Post>>;

    async fn find_user(&self, lookup: &UserLookup) -> StoreResult<Option<User>>;

    /// Unpublished posts of the selected user, `None` if the user does not exist
    async fn drafts_by_user(&self, lookup: &UserLookup) -> StoreResult<Option<Vec<Post>>>;

    async fn posts_by_author(&self, author_id: i32) -> StoreResult<Vec<Post>>;

    async fn users_by_ids(&self, ids: &[i32]) -> StoreResult<Vec<User>>;

    /// Creates the user and its posts atomically
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    /// Creates an unpublished post owned by the user with `author_email`
    async fn create_draft(&self, post: NewPost, author_email: &str) -> StoreResult<Post>;

    /// Inverts `published` in a single store-level update
    async fn toggle_publish(&self, id: i32) -> StoreResult<Post>;

    async fn increment_view_count(&self, id: i32) -> StoreResult<Post>;

    /// Deletes the post and returns the removed row
    async fn delete_post(&self, id: i32) -> StoreResult<Post>;

    async fn create_account(&self, account: Account) -> StoreResult<Account>;

    async fn create_category(&self, category: Category) -> StoreResult<Category>;

    async fn create_transaction(&self, transaction: Transaction) -> StoreResult<Transaction>;

    /// Release connections; further calls fail
    async fn close(&self);
}
