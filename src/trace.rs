//! Optional text sink for compiler listings and per-instruction VM traces.

use std::{fmt, io::Write, sync::Arc};

use parking_lot::Mutex;
use tracing::warn;

#[derive(Clone)]
pub struct TraceSink(Arc<Mutex<Box<dyn Write + Send>>>);

impl TraceSink {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self(Arc::new(Mutex::new(Box::new(writer))))
    }

    pub fn write_line(&self, args: fmt::Arguments<'_>) {
        let mut writer = self.0.lock();
        if let Err(err) = writeln!(writer, "{}", args) {
            warn!(error = %err, "trace output failed");
        }
    }
}

impl fmt::Debug for TraceSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TraceSink")
    }
}
