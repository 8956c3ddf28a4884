pub mod html;
pub mod segmenter;
