//! Shared fakes for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use zst_core::{
    AvailabilityPolicy, HttpProber, Pinger, ProbeError, ProbeRunner, ProbeTimeouts, Protocol,
    Result, ServiceControl,
};

/// Scripted network: unknown hosts fail, `delay` applies to every call
#[derive(Default)]
pub struct FakeNet {
    pub pings: HashMap<String, f64>,
    pub heads: HashMap<(String, Protocol), u16>,
    pub delays: HashMap<String, Duration>,
    pub panics: Vec<String>,
    in_flight: AtomicUsize,
    pub peak: AtomicUsize,
}

impl FakeNet {
    pub fn ping_ok(mut self, host: &str, ms: f64) -> Self {
        self.pings.insert(host.to_string(), ms);
        self
    }

    pub fn head_ok(mut self, host: &str, protocol: Protocol, code: u16) -> Self {
        self.heads.insert((host.to_string(), protocol), code);
        self
    }

    pub fn delay(mut self, host: &str, delay: Duration) -> Self {
        self.delays.insert(host.to_string(), delay);
        self
    }

    pub fn panic_on(mut self, host: &str) -> Self {
        self.panics.push(host.to_string());
        self
    }

    pub fn runner(self: &Arc<Self>) -> ProbeRunner {
        ProbeRunner::new(
            self.clone(),
            self.clone(),
            ProbeTimeouts::default(),
            AvailabilityPolicy::TlsRequired,
        )
    }

    async fn wait(&self, host: &str) {
        let delay = self.delays.get(host).copied().unwrap_or(Duration::from_millis(1));
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl Pinger for FakeNet {
    async fn ping(&self, host: &str, _timeout: Duration) -> std::result::Result<f64, ProbeError> {
        assert!(!self.panics.iter().any(|h| h == host), "probe of {host} blew up");

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.wait(host).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.pings.get(host).copied().ok_or(ProbeError::Exit(Some(1)))
    }
}

#[async_trait]
impl HttpProber for FakeNet {
    async fn head(
        &self,
        host: &str,
        protocol: Protocol,
        _timeout: Duration,
    ) -> std::result::Result<u16, ProbeError> {
        self.wait(host).await;
        self.heads
            .get(&(host.to_string(), protocol))
            .copied()
            .ok_or(ProbeError::Exit(Some(28)))
    }
}

/// Service that records calls
#[derive(Default)]
pub struct FakeService {
    pub active: AtomicBool,
    pub restarts: AtomicUsize,
    pub stops: AtomicUsize,
    pub log: Mutex<Vec<&'static str>>,
}

impl FakeService {
    pub fn running() -> Arc<Self> {
        let service = Self::default();
        service.active.store(true, Ordering::SeqCst);
        Arc::new(service)
    }
}

#[async_trait]
impl ServiceControl for FakeService {
    async fn is_active(&self) -> Result<bool> {
        self.log.lock().unwrap().push("is-active");
        Ok(self.active.load(Ordering::SeqCst))
    }

    async fn restart(&self) -> Result<()> {
        self.log.lock().unwrap().push("restart");
        self.restarts.fetch_add(1, Ordering::SeqCst);
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.log.lock().unwrap().push("stop");
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.active.store(false, Ordering::SeqCst);
        Ok(())
    }
}
