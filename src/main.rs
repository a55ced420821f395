use std::env;
use std::fs;
use std::process;

use anyhow::Context;
use threaded_cpu::device::Keyboard;
use threaded_cpu::hypervisor_controller::{disassemble_range, save_state};
use threaded_cpu::{Config, Machine};

fn usage(program:&str) -> ! {
    eprintln!("usage: {} <memory size in bytes> <memory_image.bin>", program);
    process::exit(1);
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args:Vec<String> = env::args().collect();
    let program = args.get(0).map(|s| s.as_str()).unwrap_or("threaded_cpu");
    if args.len() != 3 {
        usage(program);
    }

    let memory_size:usize = match args[1].parse() {
        Ok(size) => size,
        Err(_) => usage(program),
    };
    let mut config = Config::new(memory_size);
    config.apply_env_overrides()?;

    log::info!("loading memory image {}", args[2]);
    let image = fs::read(&args[2]).with_context(|| format!("failed to read {}", args[2]))?;
    if image.len() > memory_size {
        eprintln!("Image is too big to fit into memory! ({} > {} bytes)", image.len(), memory_size);
        process::exit(1);
    }

    let mut m0 = Machine::from_config(&config, &image)?;
    if log::log_enabled!(log::Level::Debug) && !image.is_empty() {
        let end = config.base_offset as usize + image.len() - 1;
        for line in disassemble_range(&m0, config.base_offset, end.min(u16::MAX as usize) as u16) {
            log::debug!("{}", line);
        }
    }

    m0.attach_device(Box::new(Keyboard::new()));
    m0.enable_devices();

    while !m0.is_halted() {
        m0.tick();
        log::trace!("\n{}", m0);
    }

    println!();
    match m0.halt_reason() {
        Some(reason) => println!("Halted! {}", reason),
        None => println!("Halted!"),
    }

    m0.disable_devices();

    if let Some(path) = &config.dump_state_path {
        save_state(&m0, path)?;
    }

    Ok(())
}
