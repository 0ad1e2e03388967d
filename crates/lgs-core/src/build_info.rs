//! Identity of the running build, used by the update pipeline.

/// Package identifier baked into every released station build. A downloaded
/// update must declare the same identifier or it is rejected.
pub const APP_ID: &str = "com.thanesgroup.lgs";

/// Monotonically increasing build number. The version endpoint reports the
/// newest published build number; strictly greater means an update exists.
pub const VERSION_CODE: u64 = 2;

/// Human-readable version string shown to operators.
pub const VERSION_NAME: &str = env!("CARGO_PKG_VERSION");

/// Identity snapshot handed to the update pipeline. Tests construct their own
/// to simulate older or differently-named builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    pub package_id: String,
    pub version_code: u64,
    pub version_name: String,
}

impl AppIdentity {
    /// Identity of the binary we are running inside.
    pub fn current() -> Self {
        Self {
            package_id: APP_ID.to_string(),
            version_code: VERSION_CODE,
            version_name: VERSION_NAME.to_string(),
        }
    }
}
