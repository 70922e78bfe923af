//! Simulated end-to-end walkthrough of the dispatch loop.
//!
//! Drives a `LoraNode` against the scripted mock radio: a few packet
//! arrivals, a couple of user transmit requests, and finally a primed
//! re-arm failure so the run ends in the inspectable halted state.
//!
//! ```bash
//! cargo run --example simulated_link -- --packets 3 --presses 2
//! RUST_LOG=debug cargo run --example simulated_link
//! cargo run --example simulated_link -- --config channel.json
//! ```

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::info;

use lora_node_rs::{
    init_logger, Event, EventLatch, LogSink, LoraNode, MockRadio, RadioConfig, RadioError,
};

#[derive(Parser, Debug)]
#[command(
    name = "simulated_link",
    about = "Drive the LoRa node dispatch loop against a scripted radio"
)]
struct Args {
    /// Number of simulated packet arrivals
    #[arg(long, default_value_t = 3)]
    packets: u32,

    /// Number of simulated transmit button presses
    #[arg(long, default_value_t = 2)]
    presses: u32,

    /// Optional JSON file with the radio configuration
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let args = Args::parse();

    let config: RadioConfig = match &args.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => RadioConfig::default(),
    };
    info!(
        "channel: {} Hz, bw {} Hz, SF{}",
        config.frequency_hz, config.bandwidth_hz, config.spreading_factor
    );

    let radio = MockRadio::new();
    radio.set_rssi(-42.0);
    for i in 0..args.packets {
        radio.queue_packet(format!("Hello World! #{i}").as_bytes());
    }

    let latch = Arc::new(EventLatch::new());
    let mut node = LoraNode::new(radio.clone(), LogSink, Arc::clone(&latch), config);
    node.start()?;

    // Interrupt handlers would raise these flags; here the script does.
    for _ in 0..args.packets {
        latch.signal(Event::PacketReady);
        node.poll_once();
    }
    for _ in 0..args.presses {
        latch.signal(Event::TransmitRequested);
        node.poll_once();
    }

    // End the run the way a dead radio would: the next re-arm fails.
    radio.fail_next_start_receive(RadioError::Other(-2));
    radio.queue_read_error(RadioError::RxTimeout);
    latch.signal(Event::PacketReady);
    let fatal = node.run_until_halt();

    info!("node halted: {fatal}");
    info!(
        "final stats: {}",
        serde_json::to_string_pretty(&node.stats())?
    );
    Ok(())
}
