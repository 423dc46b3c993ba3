use std::sync::Arc;

use super::traits::Logger;

/// Sends every line to each inner logger, in order
#[derive(Clone, Default)]
pub struct FanoutLogger {
    loggers: Vec<Arc<dyn Logger>>,
}

impl FanoutLogger {
    pub fn new(loggers: Vec<Arc<dyn Logger>>) -> Self {
        Self { loggers }
    }

    pub fn push(&mut self, logger: Arc<dyn Logger>) {
        self.loggers.push(logger);
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

impl Logger for FanoutLogger {
    fn debug(&self, message: &str) {
        self.loggers.iter().for_each(|l| l.debug(message));
    }

    fn info(&self, message: &str) {
        self.loggers.iter().for_each(|l| l.info(message));
    }

    fn warn(&self, message: &str) {
        self.loggers.iter().for_each(|l| l.warn(message));
    }

    fn error(&self, message: &str) {
        self.loggers.iter().for_each(|l| l.error(message));
    }
}

impl std::fmt::Debug for FanoutLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutLogger")
            .field("loggers", &self.loggers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogLevel, MemoryLogger};

    #[test]
    fn test_fanout_reaches_every_logger() {
        let a = Arc::new(MemoryLogger::new());
        let b = Arc::new(MemoryLogger::new());
        let fanout = FanoutLogger::new(vec![a.clone(), b.clone()]);

        fanout.warn("careful");

        assert_eq!(fanout.len(), 2);
        assert_eq!(a.messages_at(LogLevel::Warn), vec!["careful".to_string()]);
        assert_eq!(b.messages_at(LogLevel::Warn), vec!["careful".to_string()]);
    }
}
