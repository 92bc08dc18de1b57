//! Offset pagination arguments (`skip`/`take`)

use crate::error::StoreError;
use crate::store::Page;

/// Raw `skip`/`take` arguments as received from the client
#[derive(Clone, Copy, Debug, Default)]
pub struct PageArgs {
    /// Rows to skip after filtering (default: 0)
    pub skip: Option<i32>,
    /// Max rows to return (default: unlimited)
    pub take: Option<i32>,
}

impl PageArgs {
    pub fn new(skip: Option<i32>, take: Option<i32>) -> Self {
        Self { skip, take }
    }

    /// Validate pagination arguments
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.skip.is_some_and(|skip| skip < 0) {
            return Err(StoreError::InvalidArgument(
                "'skip' must be non-negative".to_string(),
            ));
        }

        if self.take.is_some_and(|take| take < 0) {
            return Err(StoreError::InvalidArgument(
                "'take' must be non-negative".to_string(),
            ));
        }

        Ok(())
    }

    /// Validated window handed to the store
    pub fn into_page(self) -> Result<Page, StoreError> {
        self.validate()?;
        Ok(Page::new(
            i64::from(self.skip.unwrap_or(0)),
            self.take.map(i64::from),
        ))
    }
}
