use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use super::Device;
use crate::constants::{KEYBOARD_BUFFER_SIZE, KEYBOARD_MEMORY_LOCATION};

const NAME:&str = "Keyboard";

/// Reads stdin on a background thread so `has_interrupt` never blocks the engine.
/// Each key is one interrupt; the key is echoed to stdout and handed to the program.
pub struct Keyboard {
    keys: Option<Receiver<u8>>,
    pending: Option<u8>,
    key_buffer: VecDeque<u8>,
    echo: bool,
}

impl Keyboard {
    pub fn new() -> Keyboard {
        Keyboard {
            keys: None,
            pending: None,
            key_buffer: VecDeque::with_capacity(KEYBOARD_BUFFER_SIZE),
            echo: true,
        }
    }

    /// A keyboard fed from `keys` instead of stdin.
    pub fn from_receiver(keys:Receiver<u8>) -> Keyboard {
        Keyboard {
            keys: Some(keys),
            echo: false,
            ..Keyboard::new()
        }
    }

    /// The most recent keys, oldest first.
    pub fn key_buffer(&self) -> &VecDeque<u8> {
        &self.key_buffer
    }

    fn spawn_stdin_reader() -> Receiver<u8> {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for byte in io::stdin().bytes() {
                match byte {
                    Ok(b) => {
                        if tx.send(b).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        log::warn!("keyboard stopped reading stdin: {}", e);
                        break;
                    }
                }
            }
        });
        rx
    }
}

impl Default for Keyboard {
    fn default() -> Keyboard {
        Keyboard::new()
    }
}

impl Device for Keyboard {
    fn name(&self) -> &str {
        NAME
    }

    fn memory_location(&self) -> u16 {
        KEYBOARD_MEMORY_LOCATION
    }

    fn has_interrupt(&mut self) -> bool {
        if self.pending.is_some() {
            return true;
        }
        let received = match &self.keys {
            Some(keys) => keys.try_recv(),
            None => return false,
        };
        match received {
            Ok(key) => self.pending = Some(key),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                log::debug!("keyboard input closed");
                self.keys = None;
            }
        }
        self.pending.is_some()
    }

    fn handle_interrupt(&mut self, output:u8) -> u8 {
        log::trace!("keyboard interrupt, output byte {:#04x}", output);
        let key = match self.pending.take() {
            Some(key) => key,
            None => return 0,
        };

        if self.key_buffer.len() == KEYBOARD_BUFFER_SIZE {
            self.key_buffer.pop_front();
        }
        self.key_buffer.push_back(key);

        if self.echo {
            let mut stdout = io::stdout();
            if let Err(e) = stdout.write_all(&[key]).and_then(|_| stdout.flush()) {
                log::warn!("keyboard failed to echo key: {}", e);
            }
        }
        key
    }

    fn enable(&mut self) {
        log::info!("{} ({:#04x}) has been enabled", NAME, KEYBOARD_MEMORY_LOCATION);
        if self.keys.is_none() {
            self.keys = Some(Keyboard::spawn_stdin_reader());
        }
    }

    fn disable(&mut self) {
        log::info!("{} ({:#04x}) has been disabled", NAME, KEYBOARD_MEMORY_LOCATION);
        self.keys = None;
        self.pending = None;
    }
}
