//! Process-wide logger setup.
//!
//! Lines look like `[2024-01-15T12:00:00+01:00 INFO reporter::scheduler] message`.
//! The level defaults to `info` and can be changed with `RUST_LOG`.

use std::io::Write;

use env_logger::{Builder, Env};

pub fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}] {}",
                chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();
}
