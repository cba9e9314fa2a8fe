//! Log record rendering: format selection flags, the hex dump, and the
//! per-chunk record layout.

pub mod flags;
pub mod hexdump;
pub mod record;

pub use flags::{FormatParseOutcome, LogFormat};
pub use hexdump::hex_dump;
pub use record::{error_line, format_record, Direction};
