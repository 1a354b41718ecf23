// src/lib.rs
pub mod colors;
pub mod entry;
pub mod error;
pub mod filter;
pub mod input_format;
pub mod output_format;
pub mod reader;
pub mod scanner;
pub mod timefmt;
pub mod writer;

pub use entry::{Entry, DEFAULT_PATTERN};
pub use error::{MatchError, SyntaxError};
pub use filter::Filter;
pub use input_format::ReadPattern;
pub use output_format::WritePattern;
pub use reader::Reader;
pub use scanner::Scanner;
pub use writer::{EntryWriter, JsonWriter, TextWriter};
