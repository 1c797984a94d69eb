use std::sync::Arc;

use crate::sink::{ConsoleSink, PayloadSink};

#[derive(Clone)]
pub struct AppState {
    pub sink: Arc<dyn PayloadSink>,
}

impl AppState {
    pub fn new(sink: Arc<dyn PayloadSink>) -> Self {
        Self { sink }
    }

    pub fn console() -> Self {
        Self::new(Arc::new(ConsoleSink))
    }
}
