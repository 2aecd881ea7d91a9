//! One launched browser, one page, driven over CDP.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType, MouseButton,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use ui_actions::{ActionError, ElementRect, PagePort};

use crate::config::SessionConfig;

/// Interval between element-existence probes.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A live browser session owning exactly one page.
pub struct CdpSession {
    page: Page,
    browser: Mutex<Option<Browser>>,
    handler: Mutex<Option<JoinHandle<()>>>,
}

impl CdpSession {
    /// Launch the configured browser and open a blank page. If the page
    /// cannot be created the half-launched browser is torn down before the
    /// error propagates, so acquisition never leaks a process.
    pub async fn launch(config: &SessionConfig) -> Result<Self, ActionError> {
        let browser_config = build_browser_config(config)?;

        let (mut browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|err| ActionError::CdpIo(format!("browser launch failed: {err}")))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(%err, "cdp handler event error");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(err) => {
                warn!(%err, "page creation failed, closing browser");
                let _ = browser.close().await;
                handler_task.abort();
                return Err(ActionError::CdpIo(format!("page creation failed: {err}")));
            }
        };

        info!("browser session launched");
        Ok(Self {
            page,
            browser: Mutex::new(Some(browser)),
            handler: Mutex::new(Some(handler_task)),
        })
    }

    async fn evaluate_value<T: serde::de::DeserializeOwned>(
        &self,
        expression: String,
    ) -> Result<T, ActionError> {
        let result = self
            .page
            .evaluate(expression)
            .await
            .map_err(|err| ActionError::CdpIo(err.to_string()))?;
        result
            .into_value::<T>()
            .map_err(|err| ActionError::CdpIo(format!("evaluate result decode failed: {err}")))
    }

    async fn dispatch_mouse(
        &self,
        kind: DispatchMouseEventType,
        x: f64,
        y: f64,
        with_button: bool,
    ) -> Result<(), ActionError> {
        let mut builder = DispatchMouseEventParams::builder()
            .r#type(kind)
            .x(x)
            .y(y);
        if with_button {
            builder = builder.button(MouseButton::Left).click_count(1);
        }
        let params = builder
            .build()
            .map_err(|err| ActionError::Internal(format!("mouse params: {err}")))?;

        self.page
            .execute(params)
            .await
            .map_err(|err| ActionError::CdpIo(err.to_string()))?;
        Ok(())
    }

    fn selector_literal(selector: &str) -> Result<String, ActionError> {
        serde_json::to_string(selector)
            .map_err(|err| ActionError::Internal(format!("selector literal: {err}")))
    }
}

fn build_browser_config(config: &SessionConfig) -> Result<BrowserConfig, ActionError> {
    let mut builder = BrowserConfig::builder()
        .window_size(config.window.0, config.window.1)
        .arg("--disable-infobars")
        .arg("--mute-audio");

    if config.headless {
        builder = builder.arg("--headless=new");
    } else {
        builder = builder.with_head();
    }

    if let Some(executable) = &config.executable {
        builder = builder.chrome_executable(executable);
    }

    builder
        .build()
        .map_err(|err| ActionError::Internal(format!("browser config: {err}")))
}

/// Outcome of the bounding-rect probe evaluated in the page.
#[derive(Debug, Deserialize)]
struct RectProbe {
    status: String,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default)]
    width: f64,
    #[serde(default)]
    height: f64,
}

#[async_trait]
impl PagePort for CdpSession {
    async fn goto(&self, url: &str, deadline: Duration) -> Result<(), ActionError> {
        match timeout(deadline, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(err)) => Err(ActionError::CdpIo(format!("navigation failed: {err}"))),
            Err(_) => Err(ActionError::WaitTimeout(format!("navigation to {url}"))),
        }
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        deadline: Duration,
    ) -> Result<(), ActionError> {
        let deadline_at = Instant::now() + deadline;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline_at {
                return Err(ActionError::WaitTimeout(selector.to_string()));
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_for_gone(&self, selector: &str, deadline: Duration) -> Result<(), ActionError> {
        let deadline_at = Instant::now() + deadline;
        loop {
            if self.page.find_element(selector).await.is_err() {
                return Ok(());
            }
            if Instant::now() >= deadline_at {
                return Err(ActionError::WaitTimeout(format!("{selector} still present")));
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn element_rect(&self, selector: &str, index: usize) -> Result<ElementRect, ActionError> {
        let literal = Self::selector_literal(selector)?;
        let expression = format!(
            "(() => {{\n    const nodes = document.querySelectorAll({literal});\n    if (nodes.length <= {index}) {{ return {{ status: 'not-found' }}; }}\n    const rect = nodes[{index}].getBoundingClientRect();\n    if (!rect.width && !rect.height) {{ return {{ status: 'no-box' }}; }}\n    return {{ status: 'ok', x: rect.left, y: rect.top, width: rect.width, height: rect.height }};\n}})()"
        );

        let probe: RectProbe = self.evaluate_value(expression).await?;
        match probe.status.as_str() {
            "ok" => Ok(ElementRect {
                x: probe.x,
                y: probe.y,
                width: probe.width,
                height: probe.height,
            }),
            "no-box" => Err(ActionError::NoBoundingBox(selector.to_string())),
            _ => Err(ActionError::ElementNotFound(selector.to_string())),
        }
    }

    async fn move_pointer(&self, x: f64, y: f64) -> Result<(), ActionError> {
        self.dispatch_mouse(DispatchMouseEventType::MouseMoved, x, y, false)
            .await
    }

    async fn press_pointer(&self, x: f64, y: f64) -> Result<(), ActionError> {
        self.dispatch_mouse(DispatchMouseEventType::MousePressed, x, y, true)
            .await
    }

    async fn release_pointer(&self, x: f64, y: f64) -> Result<(), ActionError> {
        self.dispatch_mouse(DispatchMouseEventType::MouseReleased, x, y, true)
            .await
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<(), ActionError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| ActionError::ElementNotFound(selector.to_string()))?;
        element
            .click()
            .await
            .map_err(|err| ActionError::CdpIo(err.to_string()))?;
        element
            .type_str(text)
            .await
            .map_err(|err| ActionError::CdpIo(err.to_string()))?;
        Ok(())
    }

    async fn press_key(&self, selector: &str, key: &str) -> Result<(), ActionError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| ActionError::ElementNotFound(selector.to_string()))?;
        element
            .press_key(key)
            .await
            .map_err(|err| ActionError::CdpIo(err.to_string()))?;
        Ok(())
    }

    async fn option_labels(&self, selector: &str) -> Result<Vec<String>, ActionError> {
        let literal = Self::selector_literal(selector)?;
        let expression = format!(
            "(() => {{\n    const nodes = document.querySelectorAll({literal});\n    return Array.from(nodes, (el) => (el.textContent || '').trim());\n}})()"
        );
        self.evaluate_value(expression).await
    }

    async fn close(&self) {
        if let Some(mut browser) = self.browser.lock().await.take() {
            if let Err(err) = browser.close().await {
                warn!(%err, "browser close failed");
            }
        }
        if let Some(task) = self.handler.lock().await.take() {
            task.abort();
        }
        info!("browser session released");
    }
}
