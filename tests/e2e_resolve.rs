
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use sitestress::domain::{Resolution, RunConfig};
use sitestress::http::{build_client, resolve_target};

use support_single::{always_ok, spawn_http_server_or_skip};

#[test]
fn e2e_resolver_falls_back_to_plain_http() -> Result<(), String> {
    let Some((addr, _server)) = spawn_http_server_or_skip(always_ok)? else {
        return Ok(());
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("runtime build failed: {}", err))?;

    let domain = runtime.block_on(async {
        let config = RunConfig::new(&[format!("https://{}/", addr)], Duration::from_secs(1))
            .map_err(|err| err.to_string())?;
        let client = build_client(&config).map_err(|err| err.to_string())?;
        let name = config
            .domains
            .first()
            .ok_or_else(|| "no domain after normalization".to_owned())?;
        resolve_target(&client, name)
            .await
            .map_err(|err| err.to_string())
    })?;

    if domain.name() != addr {
        return Err(format!("expected normalized name {}, got {}", addr, domain.name()));
    }
    if domain.url() != format!("http://{}", addr) {
        return Err(format!("expected plain http target, got {}", domain.url()));
    }
    if domain.resolution() != Resolution::Probed {
        return Err("expected a probed resolution".to_owned());
    }
    if !domain
        .addresses()
        .contains(&IpAddr::V4(Ipv4Addr::LOCALHOST))
    {
        return Err(format!("expected loopback address, got {:?}", domain.addresses()));
    }
    Ok(())
}
