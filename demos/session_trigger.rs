//! Session open demonstration.
//!
//! Runs the trigger for one principal against the real host, using an
//! in-memory session seeded from the process environment:
//! 1. Resolve and publish the dconf profile
//! 2. Apply machine policy if the host has no cache yet
//! 3. Apply user policy and print the resulting code
//!
//! Run with: `cargo run --example session_trigger -- <principal> [hook options...]`
//!
//! For a dry run, point the agent at a harmless binary:
//! `cargo run --example session_trigger -- 'EXAMPLE\alice' debug agent=/bin/true`

use adsys_session_trigger::{MemorySession, SessionTrigger, TriggerConfig};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(principal) = args.next() else {
        eprintln!(
            "usage: session_trigger <principal> [debug] [agent=<path>] \
             [policies_dir=<path>] [sssd_conf=<path>]"
        );
        std::process::exit(2);
    };
    let options: Vec<String> = args.collect();

    let config = TriggerConfig::from_args(&options);
    println!("=== Session Trigger Example ===\n");
    println!("principal:    {principal}");
    println!("agent:        {}", config.agent_path);
    println!("policies dir: {}", config.policies_dir.display());

    let mut session = MemorySession::new(principal);
    if let Ok(ccache) = std::env::var(&config.ccache_env) {
        println!("{}:   {ccache}", config.ccache_env);
        session = session.with_env(config.ccache_env.clone(), ccache);
    }

    let trigger = SessionTrigger::new(config);
    let code = trigger.open_session(&mut session);

    println!("\n--- Session environment ---");
    for (name, value) in session.env() {
        println!("{name}={value}");
    }
    println!("\n--- Messages ---");
    for message in session.messages() {
        println!("{message}");
    }
    println!("\nresult: {code} ({})", code.as_raw());

    if !code.allows_session() {
        std::process::exit(1);
    }
}
