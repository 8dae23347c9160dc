pub mod browser;
pub mod canon;
pub mod config;
pub mod context;
pub mod contract;
pub mod debug;
pub mod error;
pub mod markers;
pub mod nav;
pub mod reconcile;
pub mod records;
pub mod secret;
pub mod session;
pub mod wait;
pub mod workflows;
#[cfg(feature = "webdriver")]
pub mod webdriver;

#[cfg(feature = "webdriver")]
use config::DriverConfig;
#[cfg(feature = "webdriver")]
use session::Session;

/// Start a browser and wrap it in a session using the configured
/// credentials, overlaid with any `ARGOSYNC_*` environment variables.
/// This is the primary entry point for argosync-core.
#[cfg(feature = "webdriver")]
pub fn open_session(config: &DriverConfig) -> error::Result<Session> {
    let browser = webdriver::WebDriver::connect(config)?;
    let secrets = config.credentials.clone().with_env_overrides();
    Ok(Session::new(Box::new(browser), Box::new(secrets), config))
}
