//! Synthesized responses for requests that neither cache nor network can serve

use crate::request::Response;

pub const PLACEHOLDER_CONTENT_TYPE: &str = "image/svg+xml";

const PLACEHOLDER_SVG: &str = r##"<svg width="400" height="300" xmlns="http://www.w3.org/2000/svg">
  <rect width="100%" height="100%" fill="#1a2332"/>
  <text x="50%" y="50%" text-anchor="middle" dy=".3em" fill="#4a5568" font-family="Arial, sans-serif" font-size="14">
    Sin conexión
  </text>
</svg>"##;

/// Offline placeholder served for image requests
pub fn offline_image() -> Response {
    Response::with_content_type(PLACEHOLDER_CONTENT_TYPE, PLACEHOLDER_SVG)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_svg() {
        let response = offline_image();
        assert!(response.is_ok());
        assert_eq!(response.content_type(), Some("image/svg+xml"));
        assert!(response.body.starts_with(b"<svg"));
    }
}
