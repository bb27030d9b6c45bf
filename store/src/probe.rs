use std::time::Duration;

use log::debug;
use tokio::net::TcpStream;

use crate::error::{self, Error};

/// Bound on the reachability probe's connect wait.
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(1500);

/// Splits `HOST:PORT` into its parts. Fails with [`Error::Format`] when the
/// string does not contain exactly one `:` or the port is not a number.
pub fn parse_endpoint(endpoint: &str) -> error::Result<(String, u16)> {
    let mut parts = endpoint.split(':');
    let (Some(host), Some(port), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(Error::Format(format!(
            "endpoint must look like HOST:PORT, got {endpoint:?}"
        )));
    };

    let port = port.parse::<u16>().map_err(|_| {
        Error::Format(format!("endpoint {endpoint:?} has a non-numeric port"))
    })?;

    Ok((host.to_string(), port))
}

/// One-shot TCP reachability check of a proxy endpoint. On success the
/// probed endpoint is echoed back. The connection is dropped as soon as the
/// outcome is known; it is never reused for traffic.
pub async fn probe_endpoint(endpoint: &str, timeout: Duration) -> error::Result<String> {
    let (host, port) = parse_endpoint(endpoint)?;

    debug!("probing {host}:{port}");
    match tokio::time::timeout(timeout, TcpStream::connect((host.as_str(), port))).await {
        Ok(Ok(_stream)) => Ok(endpoint.to_string()),
        Ok(Err(err)) => Err(Error::Connection(endpoint.to_string(), err)),
        Err(_) => Err(Error::Timeout(
            endpoint.to_string(),
            timeout.as_millis() as u64,
        )),
    }
}
