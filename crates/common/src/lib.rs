//! Common utilities and shared types for yatube-rs.
//!
//! - **Configuration**: application settings via [`Config`]
//! - **Error handling**: unified error types via [`AppError`] and [`AppResult`]
//! - **ID generation**: ULID-based identifiers via [`IdGenerator`]
//! - **Pagination**: page-number slicing via [`paginate`] and [`PageWindow`]
//!
//! # Example
//!
//! ```
//! use yatube_common::paginate;
//!
//! let posts: Vec<u32> = (1..=13).collect();
//! let page = paginate(&posts, Some("2"), 10);
//! assert_eq!(page.items, vec![11, 12, 13]);
//! assert!(!page.has_next);
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod pagination;

pub use config::Config;
pub use error::{AppError, AppResult, FieldErrors};
pub use id::IdGenerator;
pub use pagination::{DEFAULT_PAGE_SIZE, Page, PageWindow, paginate};
