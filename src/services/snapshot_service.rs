//! Headless-browser variant: capture the chart card of the public quote page.
//!
//! The page's DOM is not a stable interface. When the site changes, adjust
//! the widget text or range button through configuration.

use std::sync::Arc;

use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::debug;

use crate::config::SnapshotSettings;
use crate::models::{ChartOutcome, RunContext};
use crate::services::producer_service::ChartProducer;
use crate::utils::{FetchError, PipelineError, RenderError};

const SNAPSHOT_LABEL: &str = "snapshot";

pub struct SnapshotProducer {
    // Keeps the Chromium process alive for as long as the tab is in use
    _browser: Browser,
    tab: Arc<Tab>,
    settings: SnapshotSettings,
}

impl SnapshotProducer {
    /// Launch a headless Chromium with the configured viewport
    pub fn launch(settings: SnapshotSettings) -> Result<Self, FetchError> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some(settings.viewport))
            .build()
            .map_err(|e| FetchError::Browser(format!("Invalid launch options: {}", e)))?;

        let browser = Browser::new(options)
            .map_err(|e| FetchError::Browser(format!("Failed to launch browser: {}", e)))?;
        let tab = browser
            .new_tab()
            .map_err(|e| FetchError::Browser(format!("Failed to open tab: {}", e)))?;

        Ok(Self {
            _browser: browser,
            tab,
            settings,
        })
    }
}

pub fn page_url(template: &str, symbol: &str) -> String {
    template.replace("{symbol}", symbol)
}

/// XPath for the card whose text contains `text`
pub fn widget_xpath(text: &str) -> String {
    format!("//section[contains(normalize-space(.), '{}')]", text)
}

/// XPath for a clickable control labelled exactly `text`
pub fn button_xpath(text: &str) -> String {
    format!("//*[normalize-space(text())='{}']", text)
}

fn capture(tab: &Tab, url: &str, settings: &SnapshotSettings) -> Result<Vec<u8>, FetchError> {
    tab.navigate_to(url)
        .and_then(|tab| tab.wait_until_navigated())
        .map_err(|e| FetchError::Browser(format!("Failed to load {}: {}", url, e)))?;

    if let Some(text) = &settings.range_button_text {
        match tab.find_element_by_xpath(&button_xpath(text)) {
            Ok(button) => {
                button
                    .click()
                    .map_err(|e| FetchError::Browser(format!("Failed to click '{}': {}", text, e)))?;
            }
            Err(_) => debug!("Range control '{}' not found, keeping page default", text),
        }
    }

    let widget = tab
        .wait_for_xpath(&widget_xpath(&settings.widget_text))
        .map_err(|e| {
            FetchError::Browser(format!("Chart widget '{}' not found: {}", settings.widget_text, e))
        })?;

    widget
        .capture_screenshot(CaptureScreenshotFormatOption::Png)
        .map_err(|e| FetchError::Browser(format!("Screenshot failed: {}", e)))
}

impl ChartProducer for SnapshotProducer {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn produce(&self, symbol: &str, ctx: &RunContext) -> Result<ChartOutcome, PipelineError> {
        let url = page_url(&self.settings.url_template, symbol);
        let tab = Arc::clone(&self.tab);
        let settings = self.settings.clone();

        debug!(symbol, "Capturing {}", url);
        let png = tokio::task::spawn_blocking(move || capture(&tab, &url, &settings))
            .await
            .map_err(|e| FetchError::Browser(format!("Browser task panicked: {}", e)))??;

        let artifact = ctx.artifact(symbol, SNAPSHOT_LABEL);
        tokio::fs::write(&artifact.path, png)
            .await
            .map_err(RenderError::from)?;

        Ok(ChartOutcome::Written(artifact))
    }
}
