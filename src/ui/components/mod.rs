mod footer;
mod search_input;

pub use footer::draw_footer;
pub use search_input::{SearchInput, SearchResult};
