/// API version prefix for all routes.
pub const API_PREFIX: &str = "/api/v0";

/// Extra request-body headroom on top of the configured video limit, for
/// multipart framing and the other form fields.
pub const BODY_LIMIT_SLACK_BYTES: usize = 2 * 1024 * 1024;
