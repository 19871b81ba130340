//! Backend controller: authenticated reverse proxy for backend services.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                  BACKEND CONTROLLER                   │
//!                      │                                                       │
//!   Client Request     │  ┌──────────┐   /prx/*   ┌──────────┐   ┌───────────┐  │
//!   ───────────────────┼─▶│  http    │───────────▶│ routing  │──▶│ transport │──┼──▶ Backend
//!                      │  │  server  │            │ director │   │ authorize │  │    Service
//!                      │  └────┬─────┘            └──────────┘   └─────┬─────┘  │
//!                      │       │ /oauth/*                              │        │
//!                      │       ▼                                       ▼        │
//!                      │  ┌──────────┐   verify   ┌──────────┐   ┌───────────┐  │
//!                      │  │  oauth   │───────────▶│ identity │   │ security  │  │
//!                      │  │ callback │            │ provider │   │ identity  │  │
//!                      │  └────┬─────┘            └──────────┘   └─────┬─────┘  │
//!                      │       │ save                          load    │        │
//!                      │       └──────────────▶ session ◀──────────────┘        │
//!                      │                     (signed cookie)                   │
//!                      └──────────────────────────────────────────────────────┘
//! ```

use backend_controller::cli::Cli;
use backend_controller::lifecycle::startup;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    startup::run(Cli::parse()).await?;
    Ok(())
}
