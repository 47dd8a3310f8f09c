//! fprintd D-Bus client
//!
//! Talks to the system fprintd daemon (`net.reactivated.Fprint`) for three
//! jobs: availability and enrollment probes ahead of a session, device
//! enumeration for diagnostics, and the claimed-scanner handle that drives
//! verification.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::time::timeout;
use tracing::debug;
use zbus::zvariant::OwnedObjectPath;
use zbus::Connection;

use fingwit_core::{CapabilityProbes, FingwitError, MatchSignal, StatusEvent};

use crate::error::{Result, VerifyError};
use crate::scanner::{ClaimedScanner, ScannerBackend};

/// Finger name passed to VerifyStart to accept any enrolled finger
const VERIFY_ANY_FINGER: &str = "any";

/// Error name fprintd raises for an identity with nothing enrolled
const NO_ENROLLED_PRINTS: &str = "net.reactivated.Fprint.Error.NoEnrolledPrints";

/// Upper bound on pre-session probes
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[zbus::proxy(
    interface = "net.reactivated.Fprint.Manager",
    default_service = "net.reactivated.Fprint",
    default_path = "/net/reactivated/Fprint/Manager",
    gen_blocking = false
)]
trait Manager {
    fn get_devices(&self) -> zbus::Result<Vec<OwnedObjectPath>>;

    fn get_default_device(&self) -> zbus::Result<OwnedObjectPath>;
}

#[zbus::proxy(
    interface = "net.reactivated.Fprint.Device",
    default_service = "net.reactivated.Fprint",
    gen_blocking = false
)]
trait Device {
    fn claim(&self, username: &str) -> zbus::Result<()>;

    fn release(&self) -> zbus::Result<()>;

    fn verify_start(&self, finger_name: &str) -> zbus::Result<()>;

    fn verify_stop(&self) -> zbus::Result<()>;

    fn list_enrolled_fingers(&self, username: &str) -> zbus::Result<Vec<String>>;

    #[zbus(property, name = "name")]
    fn name(&self) -> zbus::Result<String>;

    #[zbus(property, name = "scan-type")]
    fn scan_type(&self) -> zbus::Result<String>;

    #[zbus(signal)]
    fn verify_status(&self, result: String, done: bool) -> zbus::Result<()>;
}

/// Pick the device verification runs against
///
/// Prefers the daemon's default device; daemons without that call fall
/// back to the first listed device.
async fn select_device(connection: &Connection) -> Result<OwnedObjectPath> {
    let manager = ManagerProxy::new(connection).await?;
    match manager.get_default_device().await {
        Ok(path) => Ok(path),
        Err(err) => {
            debug!(error = %err, "no default device, listing devices instead");
            let mut devices = manager.get_devices().await?;
            if devices.is_empty() {
                return Err(VerifyError::NoDevices);
            }
            Ok(devices.remove(0))
        }
    }
}

/// Scanner backend speaking to fprintd over the system bus
pub struct FprintdBackend {
    connection: Connection,
}

impl FprintdBackend {
    /// Connect to the system bus
    ///
    /// The connection is held for the whole verification session, so every
    /// attempt claims through the same bus peer.
    pub async fn connect() -> Result<Self> {
        let connection = Connection::system().await?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl ScannerBackend for FprintdBackend {
    type Scanner = FprintdScanner;

    async fn claim(&self, username: &str) -> Result<FprintdScanner> {
        let path = select_device(&self.connection).await?;
        debug!(device = %path, "selected fingerprint device");

        let device = DeviceProxy::builder(&self.connection)
            .path(path)?
            .build()
            .await?;

        // Subscribe before claiming: the feed must be live before
        // VerifyStart can produce anything.
        let status_feed = device.receive_verify_status().await?;

        device
            .claim(username)
            .await
            .map_err(|err| VerifyError::Claim(err.to_string()))?;

        debug!(username, "claimed fingerprint device");

        Ok(FprintdScanner {
            device,
            status_feed,
        })
    }
}

/// A claimed fprintd device together with its live status feed
pub struct FprintdScanner {
    device: DeviceProxy<'static>,
    status_feed: VerifyStatusStream<'static>,
}

#[async_trait]
impl ClaimedScanner for FprintdScanner {
    async fn start_verify(&mut self) -> Result<()> {
        self.device
            .verify_start(VERIFY_ANY_FINGER)
            .await
            .map_err(|err| VerifyError::Protocol(format!("VerifyStart: {err}")))
    }

    async fn next_status(&mut self) -> Result<StatusEvent> {
        let signal = self
            .status_feed
            .next()
            .await
            .ok_or(VerifyError::FeedClosed)?;
        let args = signal
            .args()
            .map_err(|err| VerifyError::Protocol(format!("VerifyStatus: {err}")))?;
        Ok(StatusEvent {
            signal: MatchSignal::from_tag(args.result()),
            done: *args.done(),
        })
    }

    async fn stop_verify(&mut self) -> Result<()> {
        self.device
            .verify_stop()
            .await
            .map_err(|err| VerifyError::Protocol(format!("VerifyStop: {err}")))
    }

    async fn release(&mut self) -> Result<()> {
        self.device
            .release()
            .await
            .map_err(|err| VerifyError::Protocol(format!("Release: {err}")))
    }
}

/// Availability and enrollment probes against fprintd
///
/// Each probe dials its own short-lived connection and is bounded, so
/// classification can never hang on a wedged daemon.
pub struct FprintdProbes;

impl FprintdProbes {
    async fn device_count() -> Result<usize> {
        let connection = Connection::system().await?;
        let manager = ManagerProxy::new(&connection).await?;
        Ok(manager.get_devices().await?.len())
    }

    async fn enrolled_fingers(username: &str) -> Result<Vec<String>> {
        let connection = Connection::system().await?;
        let path = select_device(&connection).await?;
        let device = DeviceProxy::builder(&connection).path(path)?.build().await?;

        match device.list_enrolled_fingers(username).await {
            Ok(fingers) => Ok(fingers),
            Err(zbus::Error::MethodError(ref name, _, _)) if name.as_str() == NO_ENROLLED_PRINTS => {
                Ok(Vec::new())
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl CapabilityProbes for FprintdProbes {
    async fn service_ready(&self) -> fingwit_core::Result<bool> {
        match timeout(PROBE_TIMEOUT, Self::device_count()).await {
            Ok(Ok(count)) => Ok(count > 0),
            Ok(Err(err)) => Err(FingwitError::Probe(format!("fprintd devices: {err}"))),
            Err(_) => Err(FingwitError::Probe(
                "fprintd devices: probe timed out".to_string(),
            )),
        }
    }

    async fn enrollment_present(&self, username: &str) -> fingwit_core::Result<bool> {
        match timeout(PROBE_TIMEOUT, Self::enrolled_fingers(username)).await {
            Ok(Ok(fingers)) => Ok(!fingers.is_empty()),
            Ok(Err(err)) => Err(FingwitError::Probe(format!("fprintd enrollment: {err}"))),
            Err(_) => Err(FingwitError::Probe(
                "fprintd enrollment: probe timed out".to_string(),
            )),
        }
    }
}

/// Summary of one enumerated fingerprint device
#[derive(Debug, Clone)]
pub struct DeviceSummary {
    /// Human-readable device name
    pub name: String,
    /// Sensor scan type reported by the driver (press or swipe)
    pub scan_type: String,
}

/// Enumerate the fingerprint devices the daemon reports
pub async fn list_devices() -> Result<Vec<DeviceSummary>> {
    let connection = Connection::system().await?;
    let manager = ManagerProxy::new(&connection).await?;

    let mut devices = Vec::new();
    for path in manager.get_devices().await? {
        let device = DeviceProxy::builder(&connection).path(path)?.build().await?;
        devices.push(DeviceSummary {
            name: device.name().await?,
            scan_type: device.scan_type().await?,
        });
    }
    Ok(devices)
}
