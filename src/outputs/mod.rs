//! Output generation for harvested record batches.
//!
//! # Submodules
//!
//! - [`csv`]: serializes a worker's accumulated batch and writes it as one
//!   date-bounded CSV file
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── news_2023-01-15_to_2023-01-31_proc_0.csv
//! ├── news_2023-02-01_to_2023-02-28_proc_1.csv
//! └── news_2023-03-01_to_2023-03-10_proc_2.csv
//! ```
//!
//! File names are keyed by the worker's range start, the last completed
//! day, and the worker id, so no two workers ever touch the same file and
//! re-running a sub-range overwrites its own output instead of merging.

pub mod csv;
