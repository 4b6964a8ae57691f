//! HTTP API handlers organized by resource.

mod category;
mod gallery;
mod health;
mod homepage;
mod images;
mod settings;

// Re-export all handlers for use in routing
pub(crate) use category::{
    category_batch, category_edit_photo, category_list, category_remove_photo, category_rename,
    category_update,
};
pub(crate) use gallery::gallery;
pub(crate) use health::{health, prometheus_metrics};
pub(crate) use homepage::{
    homepage_add_pin, homepage_get, homepage_image, homepage_images, homepage_move_pin,
    homepage_remove_pin, homepage_replace,
};
pub(crate) use images::{images_create, images_delete, images_list, images_update_alt};
pub(crate) use settings::{settings_get, settings_save};
