// ── mDNS discovery ──
//
// Browses the local network for RSC service advertisements for a fixed
// window and hands the addresses back to the caller. Nothing outlives the
// call: the daemon is shut down before returning.

use std::net::IpAddr;
use std::time::Duration;

use mdns_sd::{ServiceDaemon, ServiceEvent};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CoreError;

/// Service type every RSC advertises.
pub const RSC_SERVICE_TYPE: &str = "_rsc._tcp.local.";

/// How long to listen for advertisements by default.
pub const DEFAULT_DISCOVERY_WINDOW: Duration = Duration::from_secs(5);

/// Listen for RSC advertisements for `window`, or until `cancel` fires.
///
/// Returns one address per advertising device, in the order they were
/// resolved. An empty list is not an error; mDNS traffic may simply be
/// blocked (UDP port 5353).
pub async fn discover(
    window: Duration,
    cancel: &CancellationToken,
) -> Result<Vec<String>, CoreError> {
    let daemon = ServiceDaemon::new().map_err(discovery_failed)?;
    let receiver = daemon.browse(RSC_SERVICE_TYPE).map_err(discovery_failed)?;
    debug!(service = RSC_SERVICE_TYPE, ?window, "browsing for RSCs");

    let mut found = Vec::new();
    let deadline = tokio::time::sleep(window);
    tokio::pin!(deadline);

    loop {
        let event = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            () = &mut deadline => None,
            event = receiver.recv_async() => event.ok(),
        };
        let Some(event) = event else {
            break;
        };
        if let ServiceEvent::ServiceResolved(service) = event {
            record(
                &mut found,
                service.get_hostname(),
                service.get_addresses().iter().copied(),
            );
        }
    }

    if let Err(err) = daemon.shutdown() {
        warn!("mDNS daemon did not shut down cleanly: {err}");
    }
    Ok(found)
}

fn discovery_failed(err: mdns_sd::Error) -> CoreError {
    CoreError::Discovery {
        reason: err.to_string(),
    }
}

/// Add the preferred address of one advertisement, once.
fn record(found: &mut Vec<String>, host: &str, addresses: impl IntoIterator<Item = IpAddr>) {
    let Some(address) = preferred_address(addresses) else {
        debug!(host, "advertisement without an address");
        return;
    };
    let address = address.to_string();
    if found.contains(&address) {
        return;
    }
    info!(host = host.trim_end_matches('.'), %address, "RSC discovered");
    found.push(address);
}

/// Lowest IPv4 address, falling back to the lowest IPv6 one.
fn preferred_address(addresses: impl IntoIterator<Item = IpAddr>) -> Option<IpAddr> {
    addresses.into_iter().min_by_key(|a| (a.is_ipv6(), *a))
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, Ipv6Addr};

    use super::*;

    #[test]
    fn prefers_ipv4() {
        let v6 = IpAddr::V6(Ipv6Addr::LOCALHOST);
        let high = IpAddr::V4(Ipv4Addr::new(192, 168, 0, 67));
        let low = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9));

        assert_eq!(preferred_address([v6, high, low]), Some(low));
        assert_eq!(preferred_address([v6]), Some(v6));
        assert_eq!(preferred_address(Vec::<IpAddr>::new()), None);
    }

    #[test]
    fn each_device_is_listed_once() {
        let mut found = Vec::new();
        let a = IpAddr::V4(Ipv4Addr::new(192, 168, 0, 67));
        let b = IpAddr::V4(Ipv4Addr::new(192, 168, 0, 17));

        record(&mut found, "rsc-8DD123FFF.local.", [a]);
        record(&mut found, "rsc-8DD123FFF.local.", [a]);
        record(&mut found, "rsc-8DD456AAA.local.", [b]);
        record(&mut found, "rsc-broken.local.", Vec::<IpAddr>::new());

        assert_eq!(found, ["192.168.0.67", "192.168.0.17"]);
    }
}
