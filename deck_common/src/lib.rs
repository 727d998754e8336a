mod helpers;
mod rupiah;

pub mod op;
mod secret;

pub use helpers::{parse_boolean_flag, parse_comma_list};
pub use rupiah::{Rupiah, RupiahConversionError, RUPIAH_CURRENCY_CODE};
pub use secret::Secret;
