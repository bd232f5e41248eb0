//! Logger writing to several sinks

use std::sync::Arc;

use super::traits::Logger;

/// Forwards every record to each inner logger in order
#[derive(Clone, Default)]
pub struct FanoutLogger {
    sinks: Vec<Arc<dyn Logger>>,
}

impl FanoutLogger {
    pub fn new(sinks: Vec<Arc<dyn Logger>>) -> Self {
        Self { sinks }
    }

    /// Add another sink
    pub fn with(mut self, sink: Arc<dyn Logger>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl Logger for FanoutLogger {
    fn debug(&self, message: &str) {
        self.sinks.iter().for_each(|s| s.debug(message));
    }

    fn info(&self, message: &str) {
        self.sinks.iter().for_each(|s| s.info(message));
    }

    fn warn(&self, message: &str) {
        self.sinks.iter().for_each(|s| s.warn(message));
    }

    fn error(&self, message: &str) {
        self.sinks.iter().for_each(|s| s.error(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recording(Mutex<Vec<String>>);

    impl Logger for Recording {
        fn debug(&self, m: &str) { self.0.lock().push(format!("debug:{m}")); }
        fn info(&self, m: &str) { self.0.lock().push(format!("info:{m}")); }
        fn warn(&self, m: &str) { self.0.lock().push(format!("warn:{m}")); }
        fn error(&self, m: &str) { self.0.lock().push(format!("error:{m}")); }
    }

    #[test]
    fn test_fanout_reaches_every_sink() {
        let a = Arc::new(Recording::default());
        let b = Arc::new(Recording::default());
        let logger = FanoutLogger::default().with(a.clone()).with(b.clone());

        logger.info("hello");
        logger.error("boom");

        assert_eq!(*a.0.lock(), vec!["info:hello", "error:boom"]);
        assert_eq!(*b.0.lock(), vec!["info:hello", "error:boom"]);
    }
}
