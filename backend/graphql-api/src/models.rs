//! Row types shared by the store backends and the GraphQL schema
//!
//! Each struct mirrors one table; column names keep the camelCase
//! identifiers of the existing database.

use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(SimpleObject, FromRow, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[graphql(complex)]
pub struct User {
    pub id: i32,
    pub name: Option<String>,
    pub email: String,
}

#[derive(SimpleObject, FromRow, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[graphql(complex)]
#[sqlx(rename_all = "camelCase")]
pub struct Post {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub content: Option<String>,
    pub published: bool,
    pub view_count: i32,
    #[graphql(skip)]
    pub author_id: Option<i32>,
}

#[derive(SimpleObject, FromRow, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: Option<String>,
    pub bank: Option<String>,
}

#[derive(SimpleObject, FromRow, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(SimpleObject, FromRow, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[sqlx(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub account_id: Option<String>,
    pub category_id: Option<String>,
    pub category: Option<String>,
    pub reference: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// New user plus the posts created alongside it
#[derive(Clone, Debug, Default)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub posts: Vec<NewPost>,
}

#[derive(Clone, Debug, Default)]
pub struct NewPost {
    pub title: String,
    pub content: Option<String>,
}

/// Unique user selector; at least one field must be set
#[derive(Clone, Debug, Default)]
pub struct UserLookup {
    pub id: Option<i32>,
    pub email: Option<String>,
}

impl UserLookup {
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.email.is_none()
    }

    pub fn matches(&self, user: &User) -> bool {
        self.id.map_or(true, |id| id == user.id)
            && self.email.as_deref().map_or(true, |email| email == user.email)
    }
}
