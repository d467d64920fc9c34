mod gallery;
mod history;
mod photo;

pub use gallery::GalleryView;
pub use history::HistoryView;
pub use photo::PhotoView;
