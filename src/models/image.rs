use base64::{ engine::general_purpose::STANDARD, Engine as _ };

const FALLBACK_MEDIA_TYPE: &str = "image/jpeg";

/// One uploaded image, held only for the duration of a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUpload {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Uses the declared content type when it names an image, JPEG otherwise.
    pub fn new(content_type: Option<&str>, bytes: Vec<u8>) -> Self {
        let media_type = content_type
            .map(str::trim)
            .filter(|ct| ct.starts_with("image/"))
            .unwrap_or(FALLBACK_MEDIA_TYPE)
            .to_string();
        Self { media_type, bytes }
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.bytes))
    }
}
