// src/probe.rs

//! Bounded health polling
//!
//! `wait` polls a health endpoint until it answers 200 or the attempt
//! budget runs out. The defaults mirror the generated deploy role, so
//! `mediashare wait` from a workstation behaves like the post-deploy
//! gate on the host.

use std::thread;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Attempts made before giving up, unless overridden
pub const DEFAULT_ATTEMPTS: u32 = 10;
/// Pause between attempts, unless overridden
pub const DEFAULT_DELAY_SECS: u64 = 5;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// How a successful wait went
#[derive(Debug, Clone, Copy)]
pub struct ProbeReport {
    /// Attempts spent, including the one that succeeded
    pub attempts_used: u32,
    pub elapsed: Duration,
}

pub struct Prober {
    client: reqwest::blocking::Client,
    attempts: u32,
    delay: Duration,
}

impl Prober {
    pub fn new(attempts: u32, delay: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("mediashare/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Prober {
            client,
            attempts,
            delay,
        })
    }

    /// Poll `url` until it returns 200
    ///
    /// Only a 200 counts as healthy. Connection errors and non-200
    /// statuses are logged and retried; there is no sleep after the
    /// final attempt.
    pub fn wait_until_healthy(&self, url: &str) -> Result<ProbeReport> {
        if self.attempts == 0 {
            return Err(Error::Probe("at least one attempt is required".to_string()));
        }

        let started = Instant::now();
        let mut last_failure = String::new();
        for attempt in 1..=self.attempts {
            match self.client.get(url).send() {
                Ok(response) if response.status() == StatusCode::OK => {
                    debug!(url, attempt, "healthy");
                    return Ok(ProbeReport {
                        attempts_used: attempt,
                        elapsed: started.elapsed(),
                    });
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    warn!(url, attempt, status, "endpoint not healthy yet");
                    last_failure = format!("status {status}");
                }
                Err(e) => {
                    warn!(url, attempt, error = %e, "endpoint not reachable yet");
                    last_failure = e.to_string();
                }
            }
            if attempt < self.attempts {
                thread::sleep(self.delay);
            }
        }

        Err(Error::Probe(format!(
            "{url} did not report healthy after {} attempts (last: {last_failure})",
            self.attempts
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// Serve one canned status per connection, then exit
    fn spawn_stub(statuses: Vec<u16>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            for status in statuses {
                let (mut stream, _) = listener.accept().unwrap();
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let response = format!(
                    "HTTP/1.1 {status} X\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{addr}/health")
    }

    #[test]
    fn test_succeeds_once_endpoint_recovers() {
        let url = spawn_stub(vec![500, 503, 200]);
        let prober = Prober::new(5, Duration::from_millis(10)).unwrap();

        let report = prober.wait_until_healthy(&url).unwrap();
        assert_eq!(report.attempts_used, 3);
    }

    #[test]
    fn test_first_attempt_can_succeed() {
        let url = spawn_stub(vec![200]);
        let prober = Prober::new(3, Duration::from_millis(10)).unwrap();

        let report = prober.wait_until_healthy(&url).unwrap();
        assert_eq!(report.attempts_used, 1);
    }

    #[test]
    fn test_gives_up_after_attempt_budget() {
        let url = spawn_stub(vec![500, 500]);
        let prober = Prober::new(2, Duration::from_millis(10)).unwrap();

        let err = prober.wait_until_healthy(&url).unwrap_err();
        assert!(matches!(err, Error::Probe(_)));
        assert!(err.to_string().contains("after 2 attempts"));
        assert!(err.to_string().contains("status 500"), "last failure is named: {err}");
    }

    #[test]
    fn test_connection_refused_is_retried_then_fails() {
        // Grab a port that nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let prober = Prober::new(2, Duration::from_millis(10)).unwrap();
        let err = prober
            .wait_until_healthy(&format!("http://{addr}/health"))
            .unwrap_err();
        assert!(matches!(err, Error::Probe(_)));
    }

    #[test]
    fn test_zero_attempts_is_rejected() {
        let prober = Prober::new(0, Duration::from_millis(10)).unwrap();
        let err = prober.wait_until_healthy("http://127.0.0.1:1/health").unwrap_err();
        assert!(err.to_string().contains("at least one attempt"));
    }

    #[test]
    fn test_non_200_success_statuses_do_not_count() {
        // 204 is a success class status but not the healthy contract.
        let url = spawn_stub(vec![204, 200]);
        let prober = Prober::new(3, Duration::from_millis(10)).unwrap();

        let report = prober.wait_until_healthy(&url).unwrap();
        assert_eq!(report.attempts_used, 2);
    }
}
