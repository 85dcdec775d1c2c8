pub mod js_json;
pub mod media;
pub mod page;
pub mod request;
pub mod thumbnails;
