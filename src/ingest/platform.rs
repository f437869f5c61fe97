//! Platform capabilities
//!
//! Resolved once at startup and handed to the ingestion service.

/// First platform API level with namespaced media inserts
pub const NAMESPACED_STORAGE_MIN_API_LEVEL: u32 = 29;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub api_level: u32,
    pub supports_namespaced_storage: bool,
}

impl Capabilities {
    pub fn resolve(api_level: u32) -> Self {
        Self {
            api_level,
            supports_namespaced_storage: api_level >= NAMESPACED_STORAGE_MIN_API_LEVEL,
        }
    }
}
