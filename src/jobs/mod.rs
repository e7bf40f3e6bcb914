//! The lab applications: mapper/reducer pairs plus the auxiliary loaders each one needs
//! before the job starts.

pub mod duplicate_images;
pub mod matrix_multiply;
pub mod sql_select;
pub mod word_count;

pub use duplicate_images::{fingerprint, load_image_list, DuplicateImages};
pub use matrix_multiply::{Cell, Matrix, MatrixMultiply};
pub use sql_select::{ColumnIndex, SelectQuery, SqlSelect};
pub use word_count::{StopWords, WordCount};
