use crate::error::{DbError, Result};

/// A 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pagination {
    page: u32,
    size: u32,
}

impl Pagination {
    /// # Errors
    ///
    /// Returns [`DbError::InvalidArgument`] if `page` or `size` is zero.
    pub fn new(page: u32, size: u32) -> Result<Self> {
        if page == 0 {
            return Err(DbError::invalid("page must be at least 1"));
        }
        if size == 0 {
            return Err(DbError::invalid("page size must be at least 1"));
        }
        Ok(Self {
            page,
            size,
        })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Rows to skip: `(page - 1) * size`.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.size)
    }
}
