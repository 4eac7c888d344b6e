pub mod audio_source;
pub mod backend;
pub mod frame_reader;
pub mod source_delegate;
pub mod terminal;
