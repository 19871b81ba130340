//! Command line interface.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;

use crate::config::{GatewayConfig, ServiceConfig};

#[derive(Debug, Parser)]
#[command(name = "backend-controller")]
#[command(about = "Service controller", long_about = "Provide proxy to backend services")]
pub struct Cli {
    /// TOML configuration file; built-in defaults when absent.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output (debug logging).
    #[arg(short, long)]
    pub verbose: bool,

    /// Port to serve endpoint on.
    #[arg(long, alias = "serve_port")]
    pub serve_port: Option<u16>,

    /// Hostname of course store.
    #[arg(long, alias = "coursestore_host")]
    pub coursestore_host: Option<String>,

    /// Port of course store.
    #[arg(long, alias = "coursestore_port")]
    pub coursestore_port: Option<u16>,

    /// Hostname of schedule store.
    #[arg(long, alias = "schedulestore_host")]
    pub schedulestore_host: Option<String>,

    /// Port of schedule store.
    #[arg(long, alias = "schedulestore_port")]
    pub schedulestore_port: Option<u16>,

    /// Authorize every proxied request with an empty identity.
    #[arg(long)]
    pub public: bool,

    /// Directory holding the web UI.
    #[arg(long)]
    pub static_dir: Option<String>,
}

impl Cli {
    /// Apply flag overrides on top of file or default configuration.
    pub fn apply(&self, config: &mut GatewayConfig) {
        if let Some(port) = self.serve_port {
            let ip = config
                .listener
                .bind_address
                .parse::<SocketAddr>()
                .map(|addr| addr.ip())
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
            config.listener.bind_address = SocketAddr::new(ip, port).to_string();
        }

        override_service(
            config,
            "course",
            "coursestore",
            self.coursestore_host.as_deref(),
            self.coursestore_port,
        );
        override_service(
            config,
            "schedule",
            "schedulestore",
            self.schedulestore_host.as_deref(),
            self.schedulestore_port,
        );

        if self.public {
            config.access.public = true;
        }
        if let Some(dir) = &self.static_dir {
            config.web.static_dir = dir.clone();
        }
    }
}

fn override_service(
    config: &mut GatewayConfig,
    name: &str,
    default_host: &str,
    host: Option<&str>,
    port: Option<u16>,
) {
    if host.is_none() && port.is_none() {
        return;
    }

    if config.service_mut(name).is_none() {
        config
            .services
            .push(ServiceConfig::http(name, default_host, None));
    }

    if let Some(service) = config.service_mut(name) {
        if let Some(host) = host {
            service.host = host.to_string();
        }
        if port.is_some() {
            service.port = port;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_leave_config_untouched() {
        let mut config = GatewayConfig::default();
        Cli::parse_from(["backend-controller"]).apply(&mut config);

        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.services[0].authority(), "coursestore");
        assert!(!config.access.public);
    }

    #[test]
    fn test_legacy_underscore_flags() {
        let cli = Cli::parse_from([
            "backend-controller",
            "--coursestore_host",
            "courses.internal",
            "--coursestore_port",
            "7001",
            "--serve_port",
            "8181",
            "-v",
        ]);
        let mut config = GatewayConfig::default();
        cli.apply(&mut config);

        assert!(cli.verbose);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8181");
        assert_eq!(config.services[0].authority(), "courses.internal:7001");
        assert_eq!(config.services[1].authority(), "schedulestore");
    }

    #[test]
    fn test_override_adds_missing_service() {
        let mut config = GatewayConfig::default();
        config.services.clear();

        Cli::parse_from(["backend-controller", "--schedulestore-port", "6000"]).apply(&mut config);

        assert_eq!(config.services.len(), 1);
        assert_eq!(config.services[0].name, "schedule");
        assert_eq!(config.services[0].authority(), "schedulestore:6000");
    }
}
