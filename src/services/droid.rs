use async_trait::async_trait;
use thirtyfour::{ChromiumLikeCapabilities, DesiredCapabilities, WebDriver};

use crate::{
    configuration::BrowserSettings,
    domain::webpage::clean_html_content,
    error::{LeadError, Result},
};

use super::ContentFetcher;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const HIDE_WEBDRIVER_SCRIPT: &str =
    "Object.defineProperty(navigator, 'webdriver', {get: () => undefined})";

/// Headless Chrome driven over WebDriver. Each fetch gets a fresh session.
pub struct Droid {
    settings: BrowserSettings,
}

impl Droid {
    pub fn new(settings: BrowserSettings) -> Self {
        Droid { settings }
    }

    async fn start_session(&self) -> Result<WebDriver> {
        let mut caps = DesiredCapabilities::chrome();
        caps.set_headless()?;
        caps.set_disable_gpu()?;
        caps.set_no_sandbox()?;
        caps.set_disable_dev_shm_usage()?;
        caps.add_arg("--window-size=1920x1080")?;
        caps.add_arg("--disable-blink-features=AutomationControlled")?;
        caps.add_arg(&format!("user-agent={}", USER_AGENT))?;
        caps.add_experimental_option("excludeSwitches", vec!["enable-automation"])?;
        caps.add_experimental_option("useAutomationExtension", false)?;

        let driver = WebDriver::new(&self.settings.webdriver_url, caps).await?;
        driver
            .set_page_load_timeout(self.settings.page_load_timeout())
            .await?;

        Ok(driver)
    }

    async fn page_source(&self, driver: &WebDriver, url: &str) -> Result<String> {
        driver.goto(url).await?;
        driver.execute(HIDE_WEBDRIVER_SCRIPT, Vec::new()).await?;
        tokio::time::sleep(self.settings.settle_time()).await;

        Ok(driver.source().await?)
    }
}

#[async_trait]
impl ContentFetcher for Droid {
    async fn fetch(&self, url: &str) -> Result<String> {
        log::info!("Scraping: {}", url);

        let driver = self.start_session().await?;
        let page_source = self.page_source(&driver, url).await;

        if let Err(e) = driver.quit().await {
            log::warn!("Failed to quit browser session for {}: {:?}", url, e);
        }

        let content = clean_html_content(&page_source?);
        if content.is_empty() {
            return Err(LeadError::EmptyContent(url.to_string()));
        }

        log::info!("Scraped {} characters from {}", content.chars().count(), url);
        Ok(content)
    }
}
