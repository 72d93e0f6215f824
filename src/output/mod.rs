pub mod text_writer;
