//! In-process store backed by ordered maps
//!
//! Mirrors the Postgres backend's observable behaviour: primary key
//! ordering, case-sensitive substring filters, unique emails and the
//! `Transaction` foreign keys.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{non_empty, Page, SortDirection, Store};
use crate::error::{StoreError, StoreResult};
use crate::models::{Account, Category, NewPost, NewUser, Post, Transaction, User, UserLookup};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    posts: BTreeMap<i32, Post>,
    accounts: BTreeMap<String, Account>,
    categories: BTreeMap<String, Category>,
    transactions: BTreeMap<String, Transaction>,
    last_user_id: i32,
    last_post_id: i32,
}

impl Tables {
    fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email == email)
    }

    fn insert_post(&mut self, post: NewPost, author_id: i32) -> Post {
        self.last_post_id += 1;
        let now = Utc::now();
        let row = Post {
            id: self.last_post_id,
            created_at: now,
            updated_at: now,
            title: post.title,
            content: post.content,
            published: false,
            view_count: 0,
            author_id: Some(author_id),
        };
        self.posts.insert(row.id, row.clone());
        row
    }

    fn update_post(&mut self, id: i32, apply: impl FnOnce(&mut Post)) -> StoreResult<Post> {
        let post = self
            .posts
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Post", id))?;
        apply(post);
        post.updated_at = Utc::now();
        Ok(post.clone())
    }
}

fn contains(field: Option<&str>, needle: &str) -> bool {
    field.is_some_and(|value| value.contains(needle))
}

/// Store keeping every table in memory
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_users(&self, name_filter: Option<&str>, page: Page) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        let filter = non_empty(name_filter);

        Ok(page.slice(
            tables
                .users
                .values()
                .filter(|u| filter.map_or(true, |f| contains(u.name.as_deref(), f)))
                .cloned(),
        ))
    }

    async fn list_transactions(
        &self,
        search: Option<&str>,
        page: Page,
    ) -> StoreResult<Vec<Transaction>> {
        let tables = self.tables.read().await;
        let search = non_empty(search);

        Ok(page.slice(
            tables
                .transactions
                .values()
                .filter(|t| {
                    search.map_or(true, |s| {
                        contains(t.account_id.as_deref(), s)
                            || contains(t.reference.as_deref(), s)
                            || contains(t.category.as_deref(), s)
                    })
                })
                .cloned(),
        ))
    }

    async fn list_categories(&self, page: Page) -> StoreResult<Vec<Category>> {
        let tables = self.tables.read().await;
        Ok(page.slice(tables.categories.values().cloned()))
    }

    async fn list_accounts(&self, page: Page) -> StoreResult<Vec<Account>> {
        let tables = self.tables.read().await;
        Ok(page.slice(tables.accounts.values().cloned()))
    }

    async fn find_post(&self, id: i32) -> StoreResult<Option<Post>> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn feed(
        &self,
        search: Option<&str>,
        page: Page,
        order: Option<SortDirection>,
    ) -> StoreResult<Vec<Post>> {
        let tables = self.tables.read().await;
        let search = non_empty(search);

        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| p.published)
            .filter(|p| {
                search.map_or(true, |s| p.title.contains(s) || contains(p.content.as_deref(), s))
            })
            .cloned()
            .collect();

        if let Some(direction) = order {
            // Stable sort keeps primary key order among equal timestamps
            posts.sort_by(|a, b| match direction {
                SortDirection::Asc => a.updated_at.cmp(&b.updated_at),
                SortDirection::Desc => b.updated_at.cmp(&a.updated_at),
            });
        }

        Ok(page.slice(posts.into_iter()))
    }

    async fn find_user(&self, lookup: &UserLookup) -> StoreResult<Option<User>> {
        if lookup.is_empty() {
            return Err(StoreError::InvalidArgument(
                "user lookup requires an id or an email".into(),
            ));
        }

        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| lookup.matches(u)).cloned())
    }

    async fn drafts_by_user(&self, lookup: &UserLookup) -> StoreResult<Option<Vec<Post>>> {
        let Some(user) = self.find_user(lookup).await? else {
            return Ok(None);
        };

        let tables = self.tables.read().await;
        Ok(Some(
            tables
                .posts
                .values()
                .filter(|p| p.author_id == Some(user.id) && !p.published)
                .cloned()
                .collect(),
        ))
    }

    async fn posts_by_author(&self, author_id: i32) -> StoreResult<Vec<Post>> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .values()
            .filter(|p| p.author_id == Some(author_id))
            .cloned()
            .collect())
    }

    async fn users_by_ids(&self, ids: &[i32]) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id))
            .cloned()
            .collect())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.user_by_email(&user.email).is_some() {
            return Err(StoreError::Conflict(format!(
                "a user with email {} already exists",
                user.email
            )));
        }

        tables.last_user_id += 1;
        let row = User {
            id: tables.last_user_id,
            name: user.name,
            email: user.email,
        };
        tables.users.insert(row.id, row.clone());

        for post in user.posts {
            tables.insert_post(post, row.id);
        }

        Ok(row)
    }

    async fn create_draft(&self, post: NewPost, author_email: &str) -> StoreResult<Post> {
        let mut tables = self.tables.write().await;

        let author_id = tables
            .user_by_email(author_email)
            .map(|u| u.id)
            .ok_or_else(|| StoreError::not_found_by("User", "email", author_email))?;

        Ok(tables.insert_post(post, author_id))
    }

    async fn toggle_publish(&self, id: i32) -> StoreResult<Post> {
        self.tables
            .write()
            .await
            .update_post(id, |p| p.published = !p.published)
    }

    async fn increment_view_count(&self, id: i32) -> StoreResult<Post> {
        self.tables
            .write()
            .await
            .update_post(id, |p| p.view_count += 1)
    }

    async fn delete_post(&self, id: i32) -> StoreResult<Post> {
        self.tables
            .write()
            .await
            .posts
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("Post", id))
    }

    async fn create_account(&self, account: Account) -> StoreResult<Account> {
        let mut tables = self.tables.write().await;
        if tables.accounts.contains_key(&account.id) {
            return Err(StoreError::Conflict(format!("account {} already exists", account.id)));
        }
        tables.accounts.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    async fn create_category(&self, category: Category) -> StoreResult<Category> {
        let mut tables = self.tables.write().await;
        if tables.categories.contains_key(&category.id) {
            return Err(StoreError::Conflict(format!(
                "category {} already exists",
                category.id
            )));
        }
        tables.categories.insert(category.id.clone(), category.clone());
        Ok(category)
    }

    async fn create_transaction(&self, transaction: Transaction) -> StoreResult<Transaction> {
        let mut tables = self.tables.write().await;

        if let Some(account_id) = &transaction.account_id {
            if !tables.accounts.contains_key(account_id) {
                return Err(StoreError::Conflict(format!("unknown account {}", account_id)));
            }
        }
        if let Some(category_id) = &transaction.category_id {
            if !tables.categories.contains_key(category_id) {
                return Err(StoreError::Conflict(format!("unknown category {}", category_id)));
            }
        }
        if tables.transactions.contains_key(&transaction.id) {
            return Err(StoreError::Conflict(format!(
                "transaction {} already exists",
                transaction.id
            )));
        }

        tables
            .transactions
            .insert(transaction.id.clone(), transaction.clone());
        Ok(transaction)
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, name: Option<&str>, titles: &[&str]) -> NewUser {
        NewUser {
            email: email.to_string(),
            name: name.map(str::to_string),
            posts: titles
                .iter()
                .map(|t| NewPost {
                    title: t.to_string(),
                    content: None,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_create_user_with_posts() {
        let store = MemoryStore::new();
        let user = store
            .create_user(new_user("a@b.com", None, &["T"]))
            .await
            .unwrap();

        let posts = store.posts_by_author(user.id).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "T");
        assert!(!posts[0].published);
        assert_eq!(posts[0].view_count, 0);
        assert_eq!(posts[0].author_id, Some(user.id));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store.create_user(new_user("a@b.com", None, &[])).await.unwrap();

        let err = store
            .create_user(new_user("a@b.com", None, &["lost"]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        // Nothing from the rejected signup was written
        assert!(store.list_users(None, Page::default()).await.unwrap().len() == 1);
    }

    #[tokio::test]
    async fn test_list_users_filters_on_name() {
        let store = MemoryStore::new();
        store.create_user(new_user("a@x.io", Some("Alice"), &[])).await.unwrap();
        store.create_user(new_user("b@x.io", Some("Bob"), &[])).await.unwrap();
        store.create_user(new_user("c@x.io", None, &[])).await.unwrap();

        let users = store.list_users(Some("li"), Page::default()).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "a@x.io");

        // Case-sensitive match
        assert!(store.list_users(Some("alice"), Page::default()).await.unwrap().is_empty());
        // Empty filter scans everything
        assert_eq!(store.list_users(Some(""), Page::default()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_missing_post_is_not_found() {
        let store = MemoryStore::new();
        let err = store.increment_view_count(9).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "Post", .. }));
    }

    #[tokio::test]
    async fn test_transaction_requires_known_account() {
        let store = MemoryStore::new();
        let err = store
            .create_transaction(Transaction {
                id: "t1".into(),
                account_id: Some("missing".into()),
                category_id: None,
                category: None,
                reference: None,
                amount: Some(1.0),
                currency: None,
                date: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_find_user_requires_selector() {
        let store = MemoryStore::new();
        let err = store.find_user(&UserLookup::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_categories_listed_in_id_order() {
        let store = MemoryStore::new();
        for (id, name) in [("1235", "Category 2"), ("1234", "Category 1")] {
            store
                .create_category(Category {
                    id: id.into(),
                    name: Some(name.into()),
                    color: Some("green".into()),
                })
                .await
                .unwrap();
        }

        let ids: Vec<String> = store
            .list_categories(Page::default())
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["1234", "1235"]);

        let err = store
            .create_category(Category {
                id: "1235".into(),
                name: None,
                color: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }
}
