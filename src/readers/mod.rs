pub mod wide_table_reader;

pub use wide_table_reader::WideTableReader;
