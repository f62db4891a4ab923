//! End-to-end tests through the public `Table` API.
//!
//! Each test file covers one scenario against a real table file in a
//! temporary directory, using deterministic inputs.

#![cfg(test)]

mod helpers;

mod test_file_format;
mod test_insert_scenario;
mod test_persistence;
mod test_row_limits;
mod test_shuffled_workloads;
mod test_splits;
mod test_table_full;
