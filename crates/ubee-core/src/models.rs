use std::fmt;
use std::time::Duration;

use crate::decode::FieldError;
use crate::error::AppError;

/// Admin credentials for the modem web UI.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The three data pages visited on every scrape, in visiting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    DocsisStatus,
    BasicStatus,
    Firmware,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::DocsisStatus, Page::BasicStatus, Page::Firmware];

    pub fn path(&self) -> &'static str {
        match self {
            Page::DocsisStatus => "/BasicCmState.asp",
            Page::BasicStatus => "/BasicStatus.asp",
            Page::Firmware => "/BasicFirmware.asp",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A UI tab. Which one a page renders as current is decided by the modem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Docsis,
    Status,
    Firmware,
}

impl Section {
    /// Maps a navigation tab label to a section. Unknown tabs yield `None`.
    pub fn from_tab_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Docsis" => Some(Section::Docsis),
            "Status" => Some(Section::Status),
            "Firmware" => Some(Section::Firmware),
            _ => None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Docsis => write!(f, "Docsis"),
            Section::Status => write!(f, "Status"),
            Section::Firmware => write!(f, "Firmware"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Downstream,
    Upstream,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownstreamChannel {
    pub channel: String,
    pub lock_status: String,
    pub modulation: String,
    /// Rendered label, e.g. `"602.00 Mhz"`.
    pub frequency: String,
    pub snr_db: f64,
    pub power_dbmv: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamChannel {
    pub channel: String,
    pub lock_status: String,
    pub channel_type: String,
    /// Rendered label, e.g. `"36.00 Mhz"`.
    pub frequency: String,
    pub power_dbmv: f64,
    /// Symbols per second.
    pub symbol_rate: f64,
}

/// One bonded channel row.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelMeasurement {
    Downstream(DownstreamChannel),
    Upstream(UpstreamChannel),
}

impl ChannelMeasurement {
    pub fn direction(&self) -> Direction {
        match self {
            ChannelMeasurement::Downstream(_) => Direction::Downstream,
            ChannelMeasurement::Upstream(_) => Direction::Upstream,
        }
    }

    /// Label values in exposition order: channel, lock status,
    /// modulation or channel type, frequency.
    pub fn labels(&self) -> [&str; 4] {
        match self {
            ChannelMeasurement::Downstream(ds) => {
                [
                    ds.channel.as_str(),
                    ds.lock_status.as_str(),
                    ds.modulation.as_str(),
                    ds.frequency.as_str(),
                ]
            }
            ChannelMeasurement::Upstream(us) => {
                [
                    us.channel.as_str(),
                    us.lock_status.as_str(),
                    us.channel_type.as_str(),
                    us.frequency.as_str(),
                ]
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterKind {
    CorrectableErrors,
    UncorrectableErrors,
    /// Timeouts listed in the provider's own counter table.
    ReportedTimeouts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterMeasurement {
    pub kind: CounterKind,
    /// Row label, only present for [`CounterKind::ReportedTimeouts`].
    pub name: Option<String>,
    pub value: u64,
}

/// Uptime and firmware, filled independently by different page visits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UptimeInfo {
    pub uptime: Option<Duration>,
    pub firmware: Option<String>,
}

/// Everything extracted from the pages of one session.
#[derive(Debug, Clone, Default)]
pub struct Measurements {
    pub channels: Vec<ChannelMeasurement>,
    pub counters: Vec<CounterMeasurement>,
    pub uptime: UptimeInfo,
    pub field_errors: Vec<FieldError>,
}

impl Measurements {
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
            && self.counters.is_empty()
            && self.uptime == UptimeInfo::default()
    }
}

#[derive(Debug)]
pub enum ScrapeStatus {
    Success,
    Failed(AppError),
}

/// Outcome of a single scrape attempt.
#[derive(Debug)]
pub struct ScrapeResult {
    pub status: ScrapeStatus,
    pub measurements: Measurements,
}

impl ScrapeResult {
    pub fn success(measurements: Measurements) -> Self {
        Self {
            status: ScrapeStatus::Success,
            measurements,
        }
    }

    /// A failed scrape carries no measurements.
    pub fn failed(error: AppError) -> Self {
        Self {
            status: ScrapeStatus::Failed(error),
            measurements: Measurements::default(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, ScrapeStatus::Success)
    }

    pub fn error(&self) -> Option<&AppError> {
        match &self.status {
            ScrapeStatus::Success => None,
            ScrapeStatus::Failed(e) => Some(e),
        }
    }
}
