use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use fake_user_agent::get_rua;
use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::scrapers::traits::PageSource;

/// Scoped handle over one headless Chrome instance.
///
/// The child process is killed when the handle drops, so every exit path
/// (normal completion, error, ctrl-c) releases it. One session drives one
/// tab; sessions are never shared across workers.
pub struct BrowserSession {
    // Held for its Drop impl, which tears down the Chrome process.
    _browser: Browser,
    tab: Arc<Tab>,
    nav_retries: u32,
    backoff_base: Duration,
    render_wait: Duration,
}

impl BrowserSession {
    /// Launch headless Chrome with a client identity randomized once per
    /// session. A missing browser binary is fatal.
    pub fn launch(config: &Config) -> Result<Self> {
        let user_agent = get_rua();

        info!("Launching headless Chrome...");
        let mut builder = LaunchOptions::default_builder();
        builder.headless(true);
        if let Some(path) = config.browser_path() {
            debug!("Using browser binary at {}", path.display());
            builder.path(Some(path));
        }
        let options = builder
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;
        let tab = browser.new_tab().context("Failed to open browser tab")?;
        tab.set_user_agent(user_agent, None, None)
            .context("Failed to set session user agent")?;
        debug!("Session identity: {}", user_agent);

        Ok(Self {
            _browser: browser,
            tab,
            nav_retries: config.limits.nav_retries,
            backoff_base: config.limits.backoff_base(),
            render_wait: config.limits.render_wait(),
        })
    }

    /// Navigate with bounded exponential backoff on transient failures.
    fn navigate(&self, url: &str) -> Result<()> {
        let mut attempt: u32 = 0;
        loop {
            match self.try_navigate(url) {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.nav_retries => {
                    let delay = self.backoff_base * 2u32.saturating_pow(attempt);
                    warn!(
                        "Navigation to {} failed (attempt {}): {:#}. Retrying in {:?}",
                        url,
                        attempt + 1,
                        e,
                        delay
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => {
                    return Err(e.context(format!(
                        "Navigation to {} failed after {} attempts",
                        url,
                        attempt + 1
                    )))
                }
            }
        }
    }

    fn try_navigate(&self, url: &str) -> Result<()> {
        self.tab.navigate_to(url)?;
        self.tab.wait_until_navigated()?;
        Ok(())
    }
}

impl PageSource for BrowserSession {
    fn page(&mut self, url: &str, marker: Option<&str>) -> Result<String> {
        self.navigate(url)?;

        if let Some(selector) = marker {
            match self
                .tab
                .wait_for_element_with_custom_timeout(selector, self.render_wait)
            {
                Ok(_) => debug!("Marker {} settled on {}", selector, url),
                // Absent marker means an empty result page, not a failure.
                Err(_) => warn!("Marker {} never appeared on {}", selector, url),
            }
        }

        self.tab
            .get_content()
            .context("Failed to read rendered document")
    }
}
