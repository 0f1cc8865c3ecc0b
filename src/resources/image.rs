use uuid::Uuid;

/// Decoded 8-bit RGBA pixels, ready for upload.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub id: Uuid,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl ImageData {
    #[must_use]
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            width,
            height,
            rgba,
        }
    }

    /// Decodes any format enabled on the `image` crate (PNG, JPEG, WebP, ...).
    pub fn decode(bytes: &[u8]) -> crate::errors::Result<Self> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self::new(width, height, img.into_raw()))
    }
}
