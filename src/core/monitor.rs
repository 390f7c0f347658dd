use crate::config::MonitorConfig;
use crate::core::alert::AlertDispatcher;
use crate::core::checks::{
    classify_certificate, classify_performance, classify_usage, days_remaining, parse_not_after,
};
use crate::domain::model::{Alert, CheckKind, CheckResult, CheckStatus, HttpSample};
use crate::domain::ports::{CommandRunner, CommandSpec, HttpProbe, ResourceProbe};
use crate::utils::error::{Result, SiteOpsError};
use chrono::{Local, Utc};
use std::future::Future;
use tokio::time::MissedTickBehavior;
use url::Url;

pub struct SiteMonitor<H: HttpProbe, R: CommandRunner, P: ResourceProbe> {
    http: H,
    runner: R,
    resources: P,
    alerts: AlertDispatcher,
    config: MonitorConfig,
}

impl<H: HttpProbe, R: CommandRunner, P: ResourceProbe> SiteMonitor<H, R, P> {
    pub fn new(http: H, runner: R, resources: P, config: MonitorConfig) -> Self {
        let alerts = AlertDispatcher::new(config.alert_email.clone(), config.timeout);
        Self {
            http,
            runner,
            resources,
            alerts,
            config,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// One full sequence: availability, performance, certificate, disk,
    /// memory. Every non-healthy result is alerted once.
    pub async fn run_checks(&self) -> Vec<CheckResult> {
        tracing::info!("Running checks for {}", self.config.url);
        let mut results = Vec::with_capacity(5);

        let (availability, sample) = self.check_availability().await;
        results.push(availability);
        if let Some(sample) = sample {
            results.push(self.check_performance(&sample));
        }
        if self.config.is_https() {
            results.push(self.check_certificate().await);
        }
        results.push(self.check_disk());
        results.push(self.check_memory());

        for result in &results {
            self.record(result).await;
        }
        results
    }

    async fn record(&self, result: &CheckResult) {
        if !result.status.needs_alert() {
            tracing::info!(
                check = %result.kind,
                status = %result.status,
                "{}",
                result.summary_line()
            );
            return;
        }

        tracing::warn!(
            check = %result.kind,
            status = %result.status,
            "{}",
            result.summary_line()
        );
        let alert = Alert {
            subject: format!(
                "[siteops] {} {} check for {}",
                result.status, result.kind, self.config.url
            ),
            body: format!(
                "{}\nURL: {}\nTime: {}",
                result.detail,
                self.config.url,
                Local::now().format("%Y-%m-%d %H:%M:%S")
            ),
        };
        self.alerts.dispatch(&self.runner, &alert).await;
    }

    /// The sample is returned only when the expected status came back, so
    /// performance is not judged on an error page.
    pub async fn check_availability(&self) -> (CheckResult, Option<HttpSample>) {
        match self.http.fetch(&self.config.url, self.config.timeout).await {
            Ok(sample) if sample.status == self.config.expected_status => {
                let millis = sample.elapsed.as_millis() as f64;
                let result = CheckResult::new(
                    CheckKind::Availability,
                    CheckStatus::Healthy,
                    format!("HTTP {} in {} ms", sample.status, millis),
                )
                .with_measurement(millis);
                (result, Some(sample))
            }
            Ok(sample) => (
                CheckResult::new(
                    CheckKind::Availability,
                    CheckStatus::Critical,
                    format!(
                        "HTTP {} (expected {})",
                        sample.status, self.config.expected_status
                    ),
                )
                .with_measurement(sample.elapsed.as_millis() as f64),
                None,
            ),
            Err(e) => (
                CheckResult::new(
                    CheckKind::Availability,
                    CheckStatus::Critical,
                    format!("Request failed: {}", e),
                ),
                None,
            ),
        }
    }

    pub fn check_performance(&self, sample: &HttpSample) -> CheckResult {
        let millis = sample.elapsed.as_millis() as u64;
        let tier = classify_performance(millis, &self.config.thresholds);
        CheckResult::new(
            CheckKind::Performance,
            tier.status(),
            format!("Load time {} ms ({:?})", millis, tier),
        )
        .with_measurement(millis as f64)
    }

    pub async fn check_certificate(&self) -> CheckResult {
        match self.certificate_days().await {
            Ok((days, expiry)) => {
                let status = classify_certificate(days, &self.config.thresholds);
                CheckResult::new(
                    CheckKind::Certificate,
                    status,
                    format!(
                        "Certificate expires in {} days ({})",
                        days,
                        expiry.format("%Y-%m-%d")
                    ),
                )
                .with_measurement(days as f64)
            }
            Err(e) => CheckResult::new(
                CheckKind::Certificate,
                CheckStatus::Critical,
                format!("Could not read certificate: {}", e),
            ),
        }
    }

    async fn certificate_days(&self) -> Result<(i64, chrono::DateTime<Utc>)> {
        let url = Url::parse(&self.config.url)
            .map_err(|e| SiteOpsError::config(format!("Invalid URL: {}", e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| SiteOpsError::config("URL has no host"))?;
        let port = url.port_or_known_default().unwrap_or(443);

        let fetch = CommandSpec::new("openssl", self.config.timeout)
            .arg("s_client")
            .arg("-connect")
            .arg(format!("{}:{}", host, port))
            .arg("-servername")
            .arg(host)
            .stdin(Vec::new());
        let handshake = self.runner.run(&fetch).await?;
        if handshake.stdout.is_empty() {
            return Err(SiteOpsError::command("openssl", handshake.stderr_text()));
        }

        let decode = CommandSpec::new("openssl", self.config.timeout)
            .arg("x509")
            .arg("-noout")
            .arg("-enddate")
            .stdin(handshake.stdout);
        let dates = self.runner.run(&decode).await?;
        if !dates.success {
            return Err(SiteOpsError::command("openssl", dates.stderr_text()));
        }

        let expiry = parse_not_after(&dates.stdout_text()).ok_or_else(|| {
            SiteOpsError::command(
                "openssl",
                format!("no notAfter date in '{}'", dates.stdout_text().trim()),
            )
        })?;
        Ok((days_remaining(expiry, Utc::now()), expiry))
    }

    pub fn check_disk(&self) -> CheckResult {
        let t = &self.config.thresholds;
        match self.resources.disk_usage_percent(&self.config.disk_path) {
            Ok(percent) => CheckResult::new(
                CheckKind::Disk,
                classify_usage(percent, t.disk_warning_percent, t.disk_critical_percent),
                format!(
                    "Disk usage {:.1}% on {}",
                    percent,
                    self.config.disk_path.display()
                ),
            )
            .with_measurement(percent),
            Err(e) => CheckResult::new(
                CheckKind::Disk,
                CheckStatus::Warning,
                format!("Disk usage unavailable: {}", e),
            ),
        }
    }

    pub fn check_memory(&self) -> CheckResult {
        let t = &self.config.thresholds;
        match self.resources.memory_usage_percent() {
            Ok(percent) => CheckResult::new(
                CheckKind::Memory,
                classify_usage(percent, t.memory_warning_percent, t.memory_critical_percent),
                format!("Memory usage {:.1}%", percent),
            )
            .with_measurement(percent),
            Err(e) => CheckResult::new(
                CheckKind::Memory,
                CheckStatus::Warning,
                format!("Memory usage unavailable: {}", e),
            ),
        }
    }

    /// Starts a check sequence every `interval` until `shutdown` resolves or
    /// `max_rounds` sequences have run. A sequence that overruns the interval
    /// delays the next one instead of bunching them up.
    pub async fn run_continuous<F>(&self, shutdown: F, max_rounds: Option<u64>) -> u64
    where
        F: Future<Output = ()>,
    {
        tracing::info!(
            "Monitoring {} every {}s",
            self.config.url,
            self.config.interval.as_secs()
        );
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut rounds = 0u64;
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }
            tokio::select! {
                _ = &mut shutdown => break,
                _ = self.run_checks() => {}
            }
            rounds += 1;
            if max_rounds.is_some_and(|max| rounds >= max) {
                break;
            }
        }

        tracing::info!("Monitoring stopped after {} rounds", rounds);
        rounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ok_output, FixedResources, RecordingRunner, ScriptedProbe};
    use std::time::Duration;

    fn config(url: &str) -> MonitorConfig {
        MonitorConfig {
            url: url.to_string(),
            alert_email: Some("ops@example.com".to_string()),
            ..MonitorConfig::default()
        }
    }

    fn openssl_expiring_in(days: i64) -> RecordingRunner {
        let expiry = Utc::now() + chrono::Duration::days(days) + chrono::Duration::hours(1);
        let line = format!("notAfter={}\n", expiry.format("%b %e %H:%M:%S %Y GMT"));
        RecordingRunner::new()
            .on("openssl s_client", |_| Ok(ok_output("-----BEGIN CERTIFICATE-----\n")))
            .on("openssl x509", move |_| Ok(ok_output(&line)))
    }

    #[tokio::test]
    async fn test_healthy_site_sends_no_alert() {
        let monitor = SiteMonitor::new(
            ScriptedProbe::with(vec![ScriptedProbe::status(200, 120)]),
            openssl_expiring_in(90),
            FixedResources::new(40.0, 50.0),
            config("https://example.com"),
        );

        let results = monitor.run_checks().await;

        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| r.status == CheckStatus::Healthy));
        assert!(monitor.runner.calls_to("mail").is_empty());
    }

    #[tokio::test]
    async fn test_error_status_alerts_exactly_once() {
        let monitor = SiteMonitor::new(
            ScriptedProbe::with(vec![ScriptedProbe::status(503, 40)]),
            RecordingRunner::new(),
            FixedResources::new(10.0, 10.0),
            config("http://example.com"),
        );

        let results = monitor.run_checks().await;

        let availability = &results[0];
        assert_eq!(availability.kind, CheckKind::Availability);
        assert_eq!(availability.status, CheckStatus::Critical);
        assert!(availability.detail.contains("503"));
        // no performance verdict on an error page, no certificate for http
        assert!(results.iter().all(|r| r.kind != CheckKind::Performance));
        let mails = monitor.runner.calls_to("mail");
        assert_eq!(mails.len(), 1);
        assert!(mails[0].args[1].contains("availability"));
    }

    #[tokio::test]
    async fn test_network_failure_is_critical() {
        let monitor = SiteMonitor::new(
            ScriptedProbe::with(vec![]),
            RecordingRunner::new(),
            FixedResources::new(10.0, 10.0),
            config("http://example.com"),
        );
        let (result, sample) = monitor.check_availability().await;
        assert_eq!(result.status, CheckStatus::Critical);
        assert!(sample.is_none());
        assert!(result.detail.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_slow_page_is_warning() {
        let monitor = SiteMonitor::new(
            ScriptedProbe::with(vec![ScriptedProbe::status(200, 4_500)]),
            RecordingRunner::new(),
            FixedResources::new(10.0, 10.0),
            config("http://example.com"),
        );
        let results = monitor.run_checks().await;
        let performance = results
            .iter()
            .find(|r| r.kind == CheckKind::Performance)
            .unwrap();
        assert_eq!(performance.status, CheckStatus::Warning);
        assert_eq!(performance.measurement, Some(4_500.0));
        assert_eq!(monitor.runner.calls_to("mail").len(), 1);
    }

    #[tokio::test]
    async fn test_certificate_tiers_from_openssl() {
        for (days, expected) in [
            (7, CheckStatus::Critical),
            (8, CheckStatus::Warning),
            (30, CheckStatus::Warning),
            (31, CheckStatus::Healthy),
        ] {
            let monitor = SiteMonitor::new(
                ScriptedProbe::default(),
                openssl_expiring_in(days),
                FixedResources::new(10.0, 10.0),
                config("https://example.com"),
            );
            let result = monitor.check_certificate().await;
            assert_eq!(result.status, expected, "days = {}", days);
            assert_eq!(result.measurement, Some(days as f64));

            let calls = monitor.runner.calls_to("openssl");
            assert_eq!(calls[0].args[..3], ["s_client", "-connect", "example.com:443"]);
            assert_eq!(calls[1].stdin.as_deref(), Some("-----BEGIN CERTIFICATE-----\n".as_bytes()));
        }
    }

    #[tokio::test]
    async fn test_certificate_failure_is_critical() {
        let runner = RecordingRunner::new().on("openssl s_client", |_| {
            Ok(crate::test_utils::failed_output("connect: Connection refused"))
        });
        let monitor = SiteMonitor::new(
            ScriptedProbe::default(),
            runner,
            FixedResources::new(10.0, 10.0),
            config("https://example.com"),
        );
        let result = monitor.check_certificate().await;
        assert_eq!(result.status, CheckStatus::Critical);
        assert!(result.detail.contains("Connection refused"));
    }

    #[tokio::test]
    async fn test_resource_tiers_alert() {
        let monitor = SiteMonitor::new(
            ScriptedProbe::with(vec![ScriptedProbe::status(200, 10)]),
            RecordingRunner::new(),
            FixedResources::new(85.0, 95.0),
            config("http://example.com"),
        );
        let results = monitor.run_checks().await;
        let disk = results.iter().find(|r| r.kind == CheckKind::Disk).unwrap();
        let memory = results.iter().find(|r| r.kind == CheckKind::Memory).unwrap();
        assert_eq!(disk.status, CheckStatus::Warning);
        assert_eq!(memory.status, CheckStatus::Critical);
        assert_eq!(monitor.runner.calls_to("mail").len(), 2);
        assert_eq!(
            monitor.resources.disk_paths.lock().unwrap()[0],
            std::path::PathBuf::from("/")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_continuous_mode_keeps_interval_between_starts() {
        let samples = (0..3).map(|_| ScriptedProbe::status(200, 5)).collect();
        let mut cfg = config("http://example.com");
        cfg.interval = Duration::from_secs(300);
        let monitor = SiteMonitor::new(
            TimedProbe(ScriptedProbe::with(samples), Default::default()),
            RecordingRunner::new(),
            FixedResources::new(10.0, 10.0),
            cfg,
        );

        let rounds = monitor
            .run_continuous(std::future::pending::<()>(), Some(3))
            .await;

        assert_eq!(rounds, 3);
        let starts = monitor.http.1.lock().unwrap().clone();
        assert_eq!(starts.len(), 3);
        assert_eq!(starts[1] - starts[0], Duration::from_secs(300));
        assert_eq!(starts[2] - starts[1], Duration::from_secs(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_continuous_mode_stops_on_shutdown() {
        let monitor = SiteMonitor::new(
            ScriptedProbe::with(vec![ScriptedProbe::status(200, 5)]),
            RecordingRunner::new(),
            FixedResources::new(10.0, 10.0),
            config("http://example.com"),
        );
        let rounds = monitor
            .run_continuous(tokio::time::sleep(Duration::from_secs(450)), None)
            .await;
        // ticks at 0 and 300, shutdown at 450
        assert_eq!(rounds, 2);
    }

    #[tokio::test]
    async fn test_unreadable_resources_warn_and_alert() {
        let monitor = SiteMonitor::new(
            ScriptedProbe::default(),
            RecordingRunner::new(),
            UnreadableResources,
            config("http://example.com"),
        );

        let disk = monitor.check_disk();
        assert_eq!(disk.status, CheckStatus::Warning);
        assert!(disk.detail.contains("no disk statistics"));
        assert_eq!(disk.measurement, None);

        let memory = monitor.check_memory();
        assert_eq!(memory.status, CheckStatus::Warning);
        assert!(memory.detail.contains("no memory statistics"));

        monitor.record(&disk).await;
        assert_eq!(monitor.runner.calls_to("mail").len(), 1);
        let mail = &monitor.runner.calls_to("mail")[0];
        assert!(mail.args[1].contains("WARNING disk"));
    }

    struct UnreadableResources;

    impl ResourceProbe for UnreadableResources {
        fn disk_usage_percent(&self, _path: &std::path::Path) -> Result<f64> {
            Err(SiteOpsError::processing("no disk statistics"))
        }

        fn memory_usage_percent(&self) -> Result<f64> {
            Err(SiteOpsError::processing("no memory statistics"))
        }
    }

    struct TimedProbe(ScriptedProbe, std::sync::Mutex<Vec<tokio::time::Instant>>);

    #[async_trait::async_trait]
    impl HttpProbe for TimedProbe {
        async fn fetch(&self, url: &str, timeout: Duration) -> Result<HttpSample> {
            self.1.lock().unwrap().push(tokio::time::Instant::now());
            self.0.fetch(url, timeout).await
        }
    }
}
