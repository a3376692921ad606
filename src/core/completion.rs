use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Whether a stream relay reached its own end.
///
/// The relay sets the flag once the upstream is exhausted or has failed.
/// When the outbound body is dropped with the flag still unset, the caller
/// went away mid-stream.
#[derive(Clone, Debug, Default)]
pub struct RelayCompletion(Arc<AtomicBool>);

impl RelayCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_completed(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_completed(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_is_shared_between_clones() {
        let completion = RelayCompletion::new();
        let relay_side = completion.clone();
        assert!(!completion.is_completed());

        relay_side.mark_completed();
        assert!(completion.is_completed());
    }
}
