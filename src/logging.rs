//! Diagnostic logging on standard error
//!
//! Standard output belongs to the placement report, so log records always go to standard error.
//! The filter is read from `RUST_LOG` and defaults to `warn`. Once a process knows its
//! [`Placement`], every record is tagged with it, which keeps the interleaved output of a whole
//! job readable.
use std::io::Write;

use env_logger::{Builder, Env, Target};
use once_cell::sync::OnceCell;

use crate::placement::Placement;

/// Environment variable holding the log filter
pub const FILTER_ENV: &str = "RUST_LOG";

const DEFAULT_FILTER: &str = "warn";

static PLACEMENT: OnceCell<Placement> = OnceCell::new();

/// Install the logger. Later calls are ignored.
pub fn init() {
    let _ = builder().try_init();
}

/// Tag all further log records with `placement`. Only the first call has an effect.
pub fn set_placement(placement: Placement) {
    let _ = PLACEMENT.set(placement);
}

fn builder() -> Builder {
    let mut builder = Builder::from_env(Env::new().filter_or(FILTER_ENV, DEFAULT_FILTER));
    builder.target(Target::Stderr).format(|buf, record| {
        let tag = PLACEMENT
            .get()
            .map_or_else(|| String::from("-"), Placement::to_string);
        writeln!(
            buf,
            "[{} {} {}] {}",
            record.level(),
            tag,
            record.target(),
            record.args()
        )
    });
    builder
}
