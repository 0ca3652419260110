//! Rate-limit admission command
//!
//! Resolves the caller's request context and counts one request against the
//! windowed limiter. The exit status tells a front end whether to serve it.

use serde::Serialize;

use crate::cli::args::{GlobalOptions, OutputFormat};
use crate::clock;
use crate::config::Config;
use crate::context::{RequestContext, RequestParams};
use crate::error::Result;
use crate::limiter::{RateDecision, WindowLimiter};
use crate::output;

/// Admission result as printed
#[derive(Debug, Serialize)]
struct Admission<'a> {
    client: &'a str,
    admin: bool,
    #[serde(flatten)]
    decision: RateDecision,
}

/// Caller details for one admission check
#[derive(Debug, Clone)]
pub struct AdmitRequest<'a> {
    pub group: &'a str,
    pub remote_addr: &'a str,
    pub forwarded_for: Option<&'a str>,
    pub admin_token: Option<&'a str>,
}

/// Run the check and return whether the request is allowed.
pub fn run(opts: &GlobalOptions, request: &AdmitRequest<'_>) -> Result<bool> {
    let config = Config::load_at(opts.config_ref())?;
    let ctx = RequestContext::resolve(
        &config,
        request.remote_addr,
        request.forwarded_for,
        request.admin_token,
        RequestParams::new(),
    );

    let limiter = WindowLimiter::from_settings(
        config.rate_limit_dir(),
        &config.rate_limit,
        clock::system(),
    );
    let decision = limiter.allow(request.group, &ctx.client_ip);

    if !decision.allowed {
        log::info!(
            "Rate limited {} in '{}', retry after {}s",
            ctx.client_ip,
            request.group,
            decision.retry_after
        );
    }

    match opts.format {
        OutputFormat::Json => output::print_json(&Admission {
            client: &ctx.client_ip,
            admin: ctx.admin,
            decision,
        })?,
        OutputFormat::Table => {
            let verdict = if decision.allowed { "allowed" } else { "limited" };
            println!(
                "{} {}: {}/{} remaining, retry after {}s{}",
                ctx.client_ip,
                verdict,
                decision.remaining,
                decision.limit,
                decision.retry_after,
                if ctx.admin { " (admin)" } else { "" }
            );
        }
    }

    Ok(decision.allowed)
}
