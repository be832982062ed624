//! Upload path generation for recipe images.

use uuid::Uuid;

/// Generate the storage path for an uploaded recipe image.
///
/// The original filename is discarded in favor of a fresh UUIDv4, but
/// its extension is kept verbatim (including case): `"photo.JPG"`
/// becomes `uploads/recipe/<uuid>.JPG`. A dotless filename is treated
/// as if it were all extension.
pub fn recipe_image_path(original_filename: &str) -> String {
    let ext = original_filename
        .rsplit('.')
        .next()
        .unwrap_or(original_filename);
    format!("uploads/recipe/{}.{ext}", Uuid::new_v4())
}
