//! Recording transport for tests
//!
//! Serves canned `show running-config` output and records every submitted
//! command sequence instead of touching a device.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use quagga_cfgmgr_common::{CfgMgrError, CfgMgrResult, Transport, SHOW_RUNNING_CONFIG};

#[derive(Debug, Default)]
struct State {
    /// Served by the next read; the last one stays once the queue drains.
    running: VecDeque<String>,
    submitted: Vec<Vec<String>>,
    reads: usize,
    reject: Vec<String>,
    fail_reads: bool,
}

/// In-memory [`Transport`].
#[derive(Debug, Default)]
pub struct MockTransport {
    state: Mutex<State>,
}

impl MockTransport {
    /// Serves `running` for every read.
    pub fn new(running: impl Into<String>) -> Self {
        let transport = Self::default();
        transport.lock().running.push_back(running.into());
        transport
    }

    /// Serves each text for one read, in order, then keeps serving the last.
    pub fn with_sequence<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let transport = Self::default();
        transport
            .lock()
            .running
            .extend(texts.into_iter().map(Into::into));
        transport
    }

    /// Rejects any submitted sequence with a fragment containing `needle`.
    pub fn reject_containing(self, needle: impl Into<String>) -> Self {
        self.lock().reject.push(needle.into());
        self
    }

    /// Fails every `show running-config`.
    pub fn failing_reads(self) -> Self {
        self.lock().fail_reads = true;
        self
    }

    /// Sequences submitted so far, excluding reads.
    pub fn submitted(&self) -> Vec<Vec<String>> {
        self.lock().submitted.clone()
    }

    /// Number of `show running-config` reads served.
    pub fn reads(&self) -> usize {
        self.lock().reads
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, fragments: &[String]) -> CfgMgrResult<String> {
        let mut state = self.lock();

        if fragments.len() == 1 && fragments[0] == SHOW_RUNNING_CONFIG {
            if state.fail_reads {
                return Err(CfgMgrError::ShellCommandFailed {
                    command: SHOW_RUNNING_CONFIG.to_string(),
                    exit_code: 1,
                    output: "Exiting: failed to connect to any daemons.".to_string(),
                });
            }
            state.reads += 1;
            let text = if state.running.len() > 1 {
                state.running.pop_front()
            } else {
                state.running.front().cloned()
            };
            return Ok(text.unwrap_or_default());
        }

        let rejected = fragments
            .iter()
            .find(|fragment| state.reject.iter().any(|needle| fragment.contains(needle.as_str())))
            .cloned();
        state.submitted.push(fragments.to_vec());

        match rejected {
            Some(fragment) => Err(CfgMgrError::ShellCommandFailed {
                command: "vtysh".to_string(),
                exit_code: 1,
                output: format!("% Unknown command: {}", fragment),
            }),
            None => Ok(String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(fragments: &[&str]) -> Vec<String> {
        fragments.iter().map(|fragment| fragment.to_string()).collect()
    }

    #[tokio::test]
    async fn test_serves_running_config() {
        let transport = MockTransport::new("interface eth0\n");
        assert_eq!(transport.running_config().await.unwrap(), "interface eth0\n");
        assert_eq!(transport.running_config().await.unwrap(), "interface eth0\n");
        assert_eq!(transport.reads(), 2);
        assert!(transport.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_sequence_keeps_last() {
        let transport = MockTransport::with_sequence(["one", "two"]);
        assert_eq!(transport.running_config().await.unwrap(), "one");
        assert_eq!(transport.running_config().await.unwrap(), "two");
        assert_eq!(transport.running_config().await.unwrap(), "two");
    }

    #[tokio::test]
    async fn test_records_and_rejects() {
        let transport = MockTransport::new("").reject_containing("password");
        transport
            .execute(&lines(&["configure terminal", "end"]))
            .await
            .unwrap();
        let err = transport
            .execute(&lines(&["configure terminal", "neighbor x password y"]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("neighbor x password y"));
        assert_eq!(transport.submitted().len(), 2);
    }

    #[tokio::test]
    async fn test_failing_reads() {
        let transport = MockTransport::new("").failing_reads();
        assert!(transport.running_config().await.is_err());
        assert_eq!(transport.reads(), 0);
    }
}
