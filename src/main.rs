use clap::Parser;
use winit::event_loop::{ControlFlow, EventLoop};

use crate::{
    app::App,
    memory::Memory,
    visualizer::{PopMode, StackVisualizer},
};

mod app;
mod font;
mod memory;
mod screen;
#[cfg(feature = "audio")]
mod sound;
mod stack;
mod virtual_buffer;
mod visualizer;

/// Interactive visualizer for push and pop on an x86-64 style stack
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// What pop does with the removed value
    #[arg(long, value_enum, default_value_t = PopMode::Register)]
    pop_mode: PopMode,

    /// Address of the bottom stack slot: hex with a 0x prefix, otherwise decimal
    #[arg(long, value_parser = memory::parse_address, default_value = "0x7fff0000")]
    base_address: u64,

    /// Real pixels per virtual pixel
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=8))]
    scale: u8,

    /// Do not play sound cues
    #[cfg(feature = "audio")]
    #[arg(long)]
    mute: bool,
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    log::info!(
        "Starting with base address {:#x}, pop mode {:?}",
        args.base_address,
        args.pop_mode
    );
    let state = StackVisualizer::new(Memory::new(args.base_address), args.pop_mode);

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Error creating event loop: {:?}", e);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Wait);

    let app = App::new(state, args.scale.into());
    #[cfg(feature = "audio")]
    let app = if args.mute { app } else { app.with_sound() };

    let mut app = app;
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop failed: {:?}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_layout() {
        let args = Args::try_parse_from(["stack-viz"]).unwrap();
        assert_eq!(args.pop_mode, PopMode::Register);
        assert_eq!(args.base_address, memory::BASE_ADDRESS);
        assert_eq!(args.scale, 3);
    }

    #[test]
    fn options_are_parsed() {
        let args = Args::try_parse_from([
            "stack-viz",
            "--pop-mode",
            "discard",
            "--base-address",
            "0x1000",
            "--scale",
            "2",
        ])
        .unwrap();
        assert_eq!(args.pop_mode, PopMode::Discard);
        assert_eq!(args.base_address, 0x1000);
        assert_eq!(args.scale, 2);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(Args::try_parse_from(["stack-viz", "--base-address", "0x1001"]).is_err());
        assert!(Args::try_parse_from(["stack-viz", "--scale", "0"]).is_err());
        assert!(Args::try_parse_from(["stack-viz", "--pop-mode", "silent"]).is_err());
    }
}
