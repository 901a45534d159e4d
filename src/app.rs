use crate::browser::{PageDriver, Session, WaitPolicy, WebDriverBrowser};
use crate::config::Config;
use crate::digest::{classify, render};
use crate::notify::Mailer;
use crate::pipeline::Pipeline;
use crate::utils::fmt_duration;
use anyhow::Context;
use chrono::{Local, NaiveDateTime};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};

/// One scrape-and-notify run.
pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Start the browser, harvest, classify, render and mail the digest.
    ///
    /// Exit status 1 covers both a browser that cannot start and any later
    /// fatal error.
    pub async fn run(self) -> ExitCode {
        let now = Local::now().naive_local();

        let driver =
            match WebDriverBrowser::connect(&self.config.webdriver_url, self.config.headless).await
            {
                Ok(driver) => driver,
                Err(e) => {
                    error!(error = ?e, "Failed to initialize WebDriver");
                    return ExitCode::from(1);
                }
            };

        match self.execute(driver, now).await {
            Ok(()) => {
                info!("Run completed and digest email sent");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = ?e, "Run failed");
                ExitCode::from(1)
            }
        }
    }

    /// Everything after browser startup, against any [`PageDriver`].
    pub async fn execute<D: PageDriver>(
        &self,
        driver: D,
        now: NaiveDateTime,
    ) -> Result<(), anyhow::Error> {
        let start = Instant::now();
        let session = Session::new(driver, WaitPolicy::from_config(&self.config));
        let (records, _stats) = Pipeline::new(session, now)
            .run()
            .await
            .context("Failed to harvest appointments")?;

        let digest =
            classify(&records, now.date()).context("Failed to classify appointments by day")?;
        info!(
            date = %digest.date.format("%Y-%m-%d"),
            today = digest.today.len(),
            history = digest.history.len(),
            upcoming = digest.upcoming,
            elapsed = fmt_duration(start.elapsed()),
            "Today's appointments classified"
        );
        let html = render(&digest);

        let mailer = Mailer::new(&self.config).context("Failed to configure SMTP transport")?;
        mailer
            .send_digest(html)
            .await
            .context("Failed to send digest email")?;
        Ok(())
    }
}
