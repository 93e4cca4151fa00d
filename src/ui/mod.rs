pub mod widget;

pub use widget::draw;
