//! Accounts, categories and transactions (read-only)

use async_graphql::{Context, ErrorExtensions, Object, Result as GraphQLResult};

use super::data_context;
use super::pagination::PageArgs;
use crate::models::{Account, Category, Transaction};

#[derive(Default)]
pub struct FinanceQuery;

#[Object]
impl FinanceQuery {
    /// Transactions whose account id, reference or category contains `searchAll`
    async fn all_transactions(
        &self,
        ctx: &Context<'_>,
        search_all: Option<String>,
        skip: Option<i32>,
        take: Option<i32>,
    ) -> GraphQLResult<Vec<Transaction>> {
        let page = PageArgs::new(skip, take).into_page().map_err(|e| e.extend())?;

        data_context(ctx)?
            .store()
            .list_transactions(search_all.as_deref(), page)
            .await
            .map_err(|e| e.extend())
    }

    async fn all_categories(
        &self,
        ctx: &Context<'_>,
        skip: Option<i32>,
        take: Option<i32>,
    ) -> GraphQLResult<Vec<Category>> {
        let page = PageArgs::new(skip, take).into_page().map_err(|e| e.extend())?;

        data_context(ctx)?
            .store()
            .list_categories(page)
            .await
            .map_err(|e| e.extend())
    }

    async fn all_accounts(
        &self,
        ctx: &Context<'_>,
        skip: Option<i32>,
        take: Option<i32>,
    ) -> GraphQLResult<Vec<Account>> {
        let page = PageArgs::new(skip, take).into_page().map_err(|e| e.extend())?;

        data_context(ctx)?
            .store()
            .list_accounts(page)
            .await
            .map_err(|e| e.extend())
    }
}
