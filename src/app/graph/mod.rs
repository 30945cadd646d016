pub(super) mod interaction;
pub(super) mod scene;
mod view;
pub(super) mod viewport;
