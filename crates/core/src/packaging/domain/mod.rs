pub mod archive_writer;
