//! Postgres store backed by an sqlx connection pool

use async_trait::async_trait;
use db_pool::DbConfig;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};

use super::{non_empty, Page, SortDirection, Store};
use crate::error::{StoreError, StoreResult};
use crate::models::{Account, Category, NewPost, NewUser, Post, Transaction, User, UserLookup};

const USER_COLUMNS: &str = "id, name, email";
const POST_COLUMNS: &str =
    r#"id, "createdAt", "updatedAt", title, content, published, "viewCount", "authorId""#;
const ACCOUNT_COLUMNS: &str = "id, name, bank";
const CATEGORY_COLUMNS: &str = "id, name, color";
const TRANSACTION_COLUMNS: &str =
    r#"id, "accountId", "categoryId", category, reference, amount, currency, date"#;

/// Appends `(strpos(c1, $n) > 0 OR strpos(c2, $m) > 0 ...)`
///
/// `strpos` treats the needle literally, so `%` and `_` in user input are
/// not wildcards. NULL columns never match.
fn push_contains_any(qb: &mut QueryBuilder<'_, Postgres>, columns: &[&str], needle: &str) {
    qb.push("(");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push("strpos(")
            .push(*column)
            .push(", ")
            .push_bind(needle.to_owned())
            .push(") > 0");
    }
    qb.push(")");
}

fn push_page(qb: &mut QueryBuilder<'_, Postgres>, page: Page) {
    if let Some(take) = page.take {
        qb.push(" LIMIT ").push_bind(take);
    }
    if page.skip > 0 {
        qb.push(" OFFSET ").push_bind(page.skip);
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the pool and verify connectivity
    pub async fn connect(config: DbConfig) -> StoreResult<Self> {
        config.log_config();
        let pool = db_pool::create_pool(config).await?;
        Ok(Self::new(pool))
    }

    /// Apply the bundled schema migrations
    pub async fn migrate(&self) -> StoreResult<()> {
        debug!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.into()))?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn list_simple<T>(&self, columns: &str, table: &str, page: Page) -> StoreResult<Vec<T>>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            r#"SELECT {columns} FROM "{table}" ORDER BY id COLLATE "C" ASC"#
        ));
        push_page(&mut qb, page);

        Ok(qb.build_query_as::<T>().fetch_all(&self.pool).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_users(&self, name_filter: Option<&str>, page: Page) -> StoreResult<Vec<User>> {
        let mut qb =
            QueryBuilder::<Postgres>::new(format!(r#"SELECT {USER_COLUMNS} FROM "User""#));
        if let Some(filter) = non_empty(name_filter) {
            qb.push(" WHERE ");
            push_contains_any(&mut qb, &["name"], filter);
        }
        qb.push(" ORDER BY id ASC");
        push_page(&mut qb, page);

        Ok(qb.build_query_as::<User>().fetch_all(&self.pool).await?)
    }

    async fn list_transactions(
        &self,
        search: Option<&str>,
        page: Page,
    ) -> StoreResult<Vec<Transaction>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            r#"SELECT {TRANSACTION_COLUMNS} FROM "Transaction""#
        ));
        if let Some(search) = non_empty(search) {
            qb.push(" WHERE ");
            push_contains_any(&mut qb, &[r#""accountId""#, "reference", "category"], search);
        }
        // Text keys sort bytewise, independent of the database collation
        qb.push(r#" ORDER BY id COLLATE "C" ASC"#);
        push_page(&mut qb, page);

        Ok(qb
            .build_query_as::<Transaction>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_categories(&self, page: Page) -> StoreResult<Vec<Category>> {
        self.list_simple(CATEGORY_COLUMNS, "Category", page).await
    }

    async fn list_accounts(&self, page: Page) -> StoreResult<Vec<Account>> {
        self.list_simple(ACCOUNT_COLUMNS, "Account", page).await
    }

    async fn find_post(&self, id: i32) -> StoreResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"SELECT {POST_COLUMNS} FROM "Post" WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn feed(
        &self,
        search: Option<&str>,
        page: Page,
        order: Option<SortDirection>,
    ) -> StoreResult<Vec<Post>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            r#"SELECT {POST_COLUMNS} FROM "Post" WHERE published = TRUE"#
        ));
        if let Some(search) = non_empty(search) {
            qb.push(" AND ");
            push_contains_any(&mut qb, &["title", "content"], search);
        }
        match order {
            Some(SortDirection::Asc) => qb.push(r#" ORDER BY "updatedAt" ASC, id ASC"#),
            Some(SortDirection::Desc) => qb.push(r#" ORDER BY "updatedAt" DESC, id ASC"#),
            None => qb.push(" ORDER BY id ASC"),
        };
        push_page(&mut qb, page);

        Ok(qb.build_query_as::<Post>().fetch_all(&self.pool).await?)
    }

    async fn find_user(&self, lookup: &UserLookup) -> StoreResult<Option<User>> {
        if lookup.is_empty() {
            return Err(StoreError::InvalidArgument(
                "user lookup requires an id or an email".into(),
            ));
        }

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM "User"
            WHERE ($1::INTEGER IS NULL OR id = $1)
              AND ($2::TEXT IS NULL OR email = $2)
            "#
        ))
        .bind(lookup.id)
        .bind(lookup.email.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn drafts_by_user(&self, lookup: &UserLookup) -> StoreResult<Option<Vec<Post>>> {
        let Some(user) = self.find_user(lookup).await? else {
            return Ok(None);
        };

        let drafts = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS} FROM "Post"
            WHERE "authorId" = $1 AND published = FALSE
            ORDER BY id ASC
            "#
        ))
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(drafts))
    }

    async fn posts_by_author(&self, author_id: i32) -> StoreResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"SELECT {POST_COLUMNS} FROM "Post" WHERE "authorId" = $1 ORDER BY id ASC"#
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn users_by_ids(&self, ids: &[i32]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM "User" WHERE id = ANY($1) ORDER BY id ASC"#
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, User>(&format!(
            r#"INSERT INTO "User" (name, email) VALUES ($1, $2) RETURNING {USER_COLUMNS}"#
        ))
        .bind(&user.name)
        .bind(&user.email)
        .fetch_one(&mut *tx)
        .await?;

        if !user.posts.is_empty() {
            let mut qb =
                QueryBuilder::<Postgres>::new(r#"INSERT INTO "Post" (title, content, "authorId") "#);
            qb.push_values(user.posts, |mut b, post| {
                b.push_bind(post.title)
                    .push_bind(post.content)
                    .push_bind(row.id);
            });
            qb.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        debug!(user_id = row.id, "Created user");

        Ok(row)
    }

    async fn create_draft(&self, post: NewPost, author_email: &str) -> StoreResult<Post> {
        let row = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO "Post" (title, content, "authorId")
            SELECT $1, $2, u.id FROM "User" u WHERE u.email = $3
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(&post.title)
        .bind(&post.content)
        .bind(author_email)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| StoreError::not_found_by("User", "email", author_email))
    }

    async fn toggle_publish(&self, id: i32) -> StoreResult<Post> {
        sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE "Post"
            SET published = NOT published, "updatedAt" = NOW()
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Post", id))
    }

    async fn increment_view_count(&self, id: i32) -> StoreResult<Post> {
        sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE "Post"
            SET "viewCount" = "viewCount" + 1, "updatedAt" = NOW()
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Post", id))
    }

    async fn delete_post(&self, id: i32) -> StoreResult<Post> {
        sqlx::query_as::<_, Post>(&format!(
            r#"DELETE FROM "Post" WHERE id = $1 RETURNING {POST_COLUMNS}"#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Post", id))
    }

    async fn create_account(&self, account: Account) -> StoreResult<Account> {
        let row = sqlx::query_as::<_, Account>(&format!(
            r#"INSERT INTO "Account" (id, name, bank) VALUES ($1, $2, $3) RETURNING {ACCOUNT_COLUMNS}"#
        ))
        .bind(&account.id)
        .bind(&account.name)
        .bind(&account.bank)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn create_category(&self, category: Category) -> StoreResult<Category> {
        let row = sqlx::query_as::<_, Category>(&format!(
            r#"INSERT INTO "Category" (id, name, color) VALUES ($1, $2, $3) RETURNING {CATEGORY_COLUMNS}"#
        ))
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.color)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn create_transaction(&self, transaction: Transaction) -> StoreResult<Transaction> {
        let row = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            INSERT INTO "Transaction"
                (id, "accountId", "categoryId", category, reference, amount, currency, date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {TRANSACTION_COLUMNS}
            "#
        ))
        .bind(&transaction.id)
        .bind(&transaction.account_id)
        .bind(&transaction.category_id)
        .bind(&transaction.category)
        .bind(&transaction.reference)
        .bind(transaction.amount)
        .bind(&transaction.currency)
        .bind(transaction.date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}
