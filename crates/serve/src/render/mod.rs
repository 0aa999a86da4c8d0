pub mod blocks;
pub mod html;

pub use blocks::blocks_to_html;
pub use html::{body_wrapper_open, ensure_body_wrapper, escape_attr, escape_text};
