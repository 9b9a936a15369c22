pub mod script_reader;
pub mod summary_writer;
