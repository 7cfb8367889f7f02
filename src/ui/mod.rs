pub mod summary_table;
