//! Pure text helpers: number-to-words, masks, money and date rendering.
//!
//! Everything here is stateless and total; callers never need to handle an
//! error path.

pub mod dates;
pub mod extenso;
pub mod masks;
pub mod money;
