//! Shared fixtures for the GraphQL integration tests

#![allow(dead_code)]

use async_graphql::{Request, Variables};
use serde_json::Value;

use graphql_api::config::GraphQLConfig;
use graphql_api::models::{Account, Category, NewPost, NewUser, Transaction};
use graphql_api::schema::{build_schema, AppSchema};
use graphql_api::DataContext;

/// Schema over a fresh in-memory store
pub fn test_schema() -> (AppSchema, DataContext) {
    let ctx = DataContext::in_memory();
    let schema = build_schema(ctx.clone(), &GraphQLConfig::default());
    (schema, ctx)
}

/// Execute and return `data`, panicking on GraphQL errors
pub async fn execute(schema: &AppSchema, query: &str) -> Value {
    execute_with(schema, query, Value::Null).await
}

pub async fn execute_with(schema: &AppSchema, query: &str, variables: Value) -> Value {
    let response = schema
        .execute(Request::new(query).variables(Variables::from_json(variables)))
        .await;
    assert!(
        response.errors.is_empty(),
        "unexpected errors: {:?}",
        response.errors
    );
    response.data.into_json().unwrap()
}

/// Execute and return the first error message
pub async fn execute_err(schema: &AppSchema, query: &str) -> String {
    let response = schema.execute(query).await;
    assert!(!response.errors.is_empty(), "expected an error");
    response.errors[0].message.clone()
}

pub fn new_user(email: &str, name: Option<&str>, posts: &[(&str, Option<&str>)]) -> NewUser {
    NewUser {
        email: email.to_string(),
        name: name.map(str::to_string),
        posts: posts
            .iter()
            .map(|(title, content)| NewPost {
                title: title.to_string(),
                content: content.map(str::to_string),
            })
            .collect(),
    }
}

/// Two accounts, two categories and three transactions
pub async fn seed_finance(ctx: &DataContext) {
    let store = ctx.store();

    for (id, name, bank) in [("acc-1", "Checking", "Monzo"), ("acc-2", "Savings", "Starling")] {
        store
            .create_account(Account {
                id: id.into(),
                name: Some(name.into()),
                bank: Some(bank.into()),
            })
            .await
            .unwrap();
    }

    for (id, name, color) in [("cat-1", "Groceries", "green"), ("cat-2", "Travel", "blue")] {
        store
            .create_category(Category {
                id: id.into(),
                name: Some(name.into()),
                color: Some(color.into()),
            })
            .await
            .unwrap();
    }

    for (id, account, category, reference, amount) in [
        ("tx-1", "acc-1", "cat-1", "TESCO STORES", -12.5),
        ("tx-2", "acc-1", "cat-2", "TRAINLINE", -40.0),
        ("tx-3", "acc-2", "cat-1", "SAINSBURYS", -7.25),
    ] {
        store
            .create_transaction(Transaction {
                id: id.into(),
                account_id: Some(account.into()),
                category_id: Some(category.into()),
                category: Some(if category == "cat-1" { "Groceries" } else { "Travel" }.into()),
                reference: Some(reference.into()),
                amount: Some(amount),
                currency: Some("GBP".into()),
                date: None,
            })
            .await
            .unwrap();
    }
}
