//! `tracing` output and panics routed to the browser console.

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsValue;
use web_sys::console;

/// Hands out one buffered writer per event, tagged with its level.
#[derive(Debug, Clone, Copy, Default)]
pub struct Console;

pub struct ConsoleLine {
    level: Level,
    buf: Vec<u8>,
}

impl io::Write for ConsoleLine {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleLine {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        let text = text.trim_end();
        if text.is_empty() {
            return;
        }
        let line = JsValue::from_str(text);
        match self.level {
            Level::ERROR => console::error_1(&line),
            Level::WARN => console::warn_1(&line),
            Level::INFO => console::info_1(&line),
            _ => console::debug_1(&line),
        }
    }
}

impl<'a> MakeWriter<'a> for Console {
    type Writer = ConsoleLine;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleLine {
            level: Level::INFO,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleLine {
            level: *meta.level(),
            buf: Vec::new(),
        }
    }
}

/// Installs the console subscriber. `level` is a `tracing` level name;
/// unknown names mean `info`.
pub fn init(level: &str) {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    let installed = tracing_subscriber::fmt()
        .with_writer(Console)
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .try_init();
    if installed.is_err() {
        console::warn_1(&JsValue::from_str("portfolio_fx: a tracing subscriber is already set"));
    }
}

pub fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = match info.location() {
                Some(loc) => format!("panic at {}:{}:{}: {info}", loc.file(), loc.line(), loc.column()),
                None => format!("panic: {info}"),
            };
            console::error_1(&JsValue::from_str(&msg));
        }));
    });
}
