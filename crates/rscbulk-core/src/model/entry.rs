use secrecy::{ExposeSecret, SecretString};

/// One device as supplied by the operator: where it lives and which
/// credentials to use.
#[derive(Debug, Clone)]
pub struct DeviceEntry {
    /// IP address or hostname (e.g. `rsc-8DD123FFF`). Identity key for
    /// logs and reports.
    pub address: String,
    /// Password currently set on the device.
    pub old_password: SecretString,
    /// Replacement password, applied only when the device demands a change.
    pub new_password: Option<SecretString>,
}

impl DeviceEntry {
    pub fn new(
        address: impl Into<String>,
        old_password: impl Into<String>,
        new_password: Option<String>,
    ) -> Self {
        Self {
            address: address.into(),
            old_password: SecretString::from(old_password.into()),
            new_password: new_password
                .filter(|p| !p.is_empty())
                .map(SecretString::from),
        }
    }

    pub fn has_new_password(&self) -> bool {
        self.new_password.is_some()
    }
}

/// Entries are the same device when address and current password match.
impl PartialEq for DeviceEntry {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
            && self.old_password.expose_secret() == other.old_password.expose_secret()
    }
}

impl Eq for DeviceEntry {}

/// Proxy and NTP values to push to every device before enrollment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkSettings {
    pub proxy: Option<String>,
    pub ntp: Option<String>,
}

impl NetworkSettings {
    pub fn new(proxy: Option<String>, ntp: Option<String>) -> Self {
        Self {
            proxy: proxy.filter(|p| !p.is_empty()),
            ntp: ntp.filter(|n| !n.is_empty()),
        }
    }

    /// Nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.proxy.is_none() && self.ntp.is_none()
    }
}
