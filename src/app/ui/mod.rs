mod controls;
mod fps;
mod panels;

pub(super) use controls::draw_source_picker;
